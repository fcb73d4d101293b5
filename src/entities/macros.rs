//! Macros for reducing boilerplate when defining dashboard rows
//!
//! Every row carries the same base fields (id, tenant, sub-client, status,
//! timestamps); the macro injects them and generates the `Listable`
//! implementation, so a row only declares what is specific to it.

/// Create a row struct with its `Listable` implementation
///
/// `listed_on` names the `NaiveDate` field matched by date-range filters.
/// Specific fields are exposed to sorting, searching and exporting under
/// their own name, as are `tenant_id`, `subclient_id` and `created_at`.
///
/// # Example
///
/// ```rust,ignore
/// use creditdesk::prelude::*;
///
/// impl_listable_row!(
///     RecallRow,
///     listed_on: recalled_on,
///     {
///         consumer_name: String,
///         recalled_on: NaiveDate,
///     }
/// );
///
/// let row = RecallRow::new(
///     tenant_id,
///     "recalled".to_string(),
///     "Jane Doe".to_string(),
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
/// );
/// ```
#[macro_export]
macro_rules! impl_listable_row {
    (
        $type:ident,
        listed_on: $listed_on:ident,
        {
            $( $specific_field:ident : $specific_type:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Unique identifier for this row
            pub id: ::uuid::Uuid,

            /// Creditor company owning the row
            pub tenant_id: ::uuid::Uuid,

            /// Sub-client of the creditor, if any
            pub subclient_id: Option<::uuid::Uuid>,

            /// Current status of the row
            pub status: String,

            /// When this row was created
            pub created_at: ::chrono::DateTime<::chrono::Utc>,

            /// When this row was soft-deleted (if applicable)
            pub deleted_at: Option<::chrono::DateTime<::chrono::Utc>>,
            $( pub $specific_field : $specific_type ),*
        }

        impl $crate::core::row::Listable for $type {
            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn tenant_id(&self) -> ::uuid::Uuid {
                self.tenant_id
            }

            fn subclient_id(&self) -> Option<::uuid::Uuid> {
                self.subclient_id
            }

            fn status(&self) -> &str {
                &self.status
            }

            fn listed_on(&self) -> ::chrono::NaiveDate {
                self.$listed_on
            }

            fn deleted_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.deleted_at
            }

            fn field_value(&self, key: &str) -> Option<$crate::core::field::FieldValue> {
                use $crate::core::field::FieldValue;

                match key {
                    "tenant_id" => return Some(FieldValue::from(self.tenant_id)),
                    "subclient_id" => return Some(FieldValue::from(self.subclient_id)),
                    "created_at" => return Some(FieldValue::from(self.created_at)),
                    _ => {}
                }
                $(
                    if key == stringify!($specific_field) {
                        return Some(FieldValue::from(self.$specific_field.clone()));
                    }
                )*
                None
            }
        }

        impl $type {
            /// Create a new row for `tenant_id`
            #[allow(clippy::too_many_arguments)]
            pub fn new(
                tenant_id: ::uuid::Uuid,
                status: String,
                $( $specific_field: $specific_type ),*
            ) -> Self {
                Self {
                    id: ::uuid::Uuid::new_v4(),
                    tenant_id,
                    subclient_id: None,
                    status,
                    created_at: ::chrono::Utc::now(),
                    deleted_at: None,
                    $( $specific_field ),*
                }
            }

            /// Attach the row to a sub-client
            pub fn for_subclient(mut self, subclient_id: ::uuid::Uuid) -> Self {
                self.subclient_id = Some(subclient_id);
                self
            }

            /// Soft delete this row (sets deleted_at timestamp)
            pub fn soft_delete(&mut self) {
                self.deleted_at = Some(::chrono::Utc::now());
            }
        }
    };
}
