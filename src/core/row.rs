//! Row trait implemented by everything a dashboard view can list

use crate::core::field::FieldValue;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A row projection that can be listed, sorted, filtered and exported.
///
/// Rows always belong to exactly one tenant (a creditor company) and
/// optionally to one of its sub-clients. The listing pipeline only reads
/// rows, it never mutates them.
pub trait Listable: Clone + Send + Sync + Serialize + 'static {
    /// Stable identifier, also used as the tie-breaker when sorting
    fn id(&self) -> Uuid;

    /// Owning tenant
    fn tenant_id(&self) -> Uuid;

    /// Owning sub-client of the tenant, if any
    fn subclient_id(&self) -> Option<Uuid> {
        None
    }

    /// Status used by status filters
    fn status(&self) -> &str;

    /// Date matched against date-range filters
    fn listed_on(&self) -> NaiveDate;

    /// Soft deletion timestamp; deleted rows are never listed
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Value of a physical column
    fn field_value(&self, key: &str) -> Option<FieldValue>;

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }

    /// Value of a physical column, with the base columns always available
    fn column(&self, key: &str) -> FieldValue {
        match key {
            "id" => FieldValue::Uuid(self.id()),
            "status" => FieldValue::String(self.status().to_string()),
            _ => self.field_value(key).unwrap_or(FieldValue::Null),
        }
    }
}
