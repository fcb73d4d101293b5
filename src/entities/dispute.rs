//! Disputed accounts
//!
//! Unlike the other views, disputes keep their sort in the URL so a sorted
//! list can be bookmarked and shared.

use crate::core::view::{ColumnMap, ViewDefinition};
use chrono::NaiveDate;

pub const DISPUTES: &str = "disputes";

crate::impl_listable_row!(
    DisputeRow,
    listed_on: disputed_on,
    {
        consumer_name: String,
        account_number: String,
        reason: String,
        balance: f64,
        disputed_on: NaiveDate,
    }
);

pub fn disputes_view() -> ViewDefinition {
    let columns = ColumnMap::new("disputed-on", "disputed_on")
        .with("consumer-name", "consumer_name")
        .with("account-number", "account_number")
        .with("reason", "reason")
        .with("balance", "balance");

    ViewDefinition::new(DISPUTES, columns)
        .report_type("Disputes")
        .persist_to_url(true)
        .search_on(["consumer_name", "account_number", "reason"])
        .export_column("Consumer Name", "consumer_name")
        .export_column("Account Number", "account_number")
        .export_column("Reason", "reason")
        .export_column("Balance", "balance")
        .export_column("Disputed On", "disputed_on")
}
