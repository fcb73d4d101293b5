//! Scheduled and completed consumer payments

use crate::core::view::{ColumnMap, ViewDefinition};
use chrono::NaiveDate;

pub const PAYMENTS: &str = "payments";

crate::impl_listable_row!(
    PaymentRow,
    listed_on: scheduled_on,
    {
        consumer_name: String,
        account_number: String,
        amount: f64,
        method: String,
        scheduled_on: NaiveDate,
        paid_on: Option<NaiveDate>,
    }
);

pub fn payments_view() -> ViewDefinition {
    let columns = ColumnMap::new("date", "scheduled_on")
        .with("consumer-name", "consumer_name")
        .with("account-number", "account_number")
        .with("amount", "amount")
        .with("method", "method")
        .with("paid-on", "paid_on")
        .with("status", "status");

    ViewDefinition::new(PAYMENTS, columns)
        .report_type("Payments")
        .search_on(["consumer_name", "account_number", "method"])
        .export_column("Consumer Name", "consumer_name")
        .export_column("Account Number", "account_number")
        .export_column("Amount", "amount")
        .export_column("Method", "method")
        .export_column("Scheduled On", "scheduled_on")
        .export_column("Paid On", "paid_on")
        .export_column("Status", "status")
}
