//! Built-in dashboard rows and their views

pub mod macros;

pub mod dispute;
pub mod negotiation;
pub mod payment;

pub use dispute::{DISPUTES, DisputeRow, disputes_view};
pub use negotiation::{NegotiationRow, OPEN_NEGOTIATIONS, open_negotiations_view};
pub use payment::{PAYMENTS, PaymentRow, payments_view};
