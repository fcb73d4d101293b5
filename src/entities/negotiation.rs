//! Open negotiations: offers exchanged with consumers that are still pending

use crate::core::auth::AuthPolicy;
use crate::core::view::{ColumnMap, ViewDefinition};
use chrono::NaiveDate;

pub const OPEN_NEGOTIATIONS: &str = "open_negotiations";

crate::impl_listable_row!(
    NegotiationRow,
    listed_on: last_offer_on,
    {
        consumer_name: String,
        account_number: String,
        offer_amount: f64,
        balance: f64,
        offer_type: String,
        last_offer_on: NaiveDate,
    }
);

/// The open negotiations view, newest offer first
pub fn open_negotiations_view() -> ViewDefinition {
    let columns = ColumnMap::new("last-offer-date", "last_offer_on")
        .with("consumer-name", "consumer_name")
        .with("account-number", "account_number")
        .with("offer-amount", "offer_amount")
        .with("balance", "balance")
        .with("offer-type", "offer_type")
        .with("status", "status");

    ViewDefinition::new(OPEN_NEGOTIATIONS, columns)
        .report_type("Open Negotiations")
        .search_on(["consumer_name", "account_number"])
        .export_column("Consumer Name", "consumer_name")
        .export_column("Account Number", "account_number")
        .export_column("Offer Type", "offer_type")
        .export_column("Offer Amount", "offer_amount")
        .export_column("Current Balance", "balance")
        .export_column("Last Offer Date", "last_offer_on")
        .export_column("Status", "status")
        .export_policy(AuthPolicy::Authenticated)
}
