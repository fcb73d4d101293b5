//! In-memory stores for testing and development
//!
//! Every store uses `Arc<RwLock<..>>` so clones share state and can be
//! handed to several views or handlers.

use crate::core::error::StorageError;
use crate::core::export::{ArtifactSink, ReportHistoryRecord, ReportHistoryStore};
use crate::core::row::Listable;
use crate::core::service::RecordSource;
use crate::core::session::{SessionKey, SortStateStore};
use crate::core::sort::SortPreference;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

fn poisoned<G>(store: &str) -> impl FnOnce(PoisonError<G>) -> StorageError + '_ {
    move |_| StorageError::LockPoisoned {
        store: store.to_string(),
    }
}

// =============================================================================
// Rows
// =============================================================================

/// In-memory tenant-scoped row store
pub struct InMemoryRecordSource<T: Listable> {
    rows: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Listable> Clone for InMemoryRecordSource<T> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

impl<T: Listable> InMemoryRecordSource<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a row
    pub fn insert(&self, row: T) -> Result<()> {
        let mut rows = self.rows.write().map_err(poisoned("record source"))?;
        rows.insert(row.id(), row);
        Ok(())
    }

    /// Insert many rows
    pub fn extend(&self, new_rows: impl IntoIterator<Item = T>) -> Result<()> {
        let mut rows = self.rows.write().map_err(poisoned("record source"))?;
        rows.extend(new_rows.into_iter().map(|row| (row.id(), row)));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Listable> Default for InMemoryRecordSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Listable> FromIterator<T> for InMemoryRecordSource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            rows: Arc::new(RwLock::new(
                iter.into_iter().map(|row| (row.id(), row)).collect(),
            )),
        }
    }
}

#[async_trait]
impl<T: Listable> RecordSource<T> for InMemoryRecordSource<T> {
    async fn rows_for_tenant(
        &self,
        tenant_id: &Uuid,
        subclient_id: Option<&Uuid>,
    ) -> Result<Vec<T>> {
        let rows = self.rows.read().map_err(poisoned("record source"))?;

        Ok(rows
            .values()
            .filter(|row| {
                &row.tenant_id() == tenant_id
                    && subclient_id.is_none_or(|s| row.subclient_id().as_ref() == Some(s))
            })
            .cloned()
            .collect())
    }
}

// =============================================================================
// Sort preferences
// =============================================================================

/// In-memory sort preference store, keyed by `sortable_{user}_{view}`
#[derive(Clone, Default)]
pub struct InMemorySortStateStore {
    entries: Arc<RwLock<HashMap<String, SortPreference>>>,
}

impl InMemorySortStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SortStateStore for InMemorySortStateStore {
    async fn load(&self, key: &SessionKey) -> Result<Option<SortPreference>> {
        let entries = self.entries.read().map_err(poisoned("sort state store"))?;
        Ok(entries.get(&key.to_string()).cloned())
    }

    async fn save(&self, key: &SessionKey, preference: SortPreference) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned("sort state store"))?;
        entries.insert(key.to_string(), preference);
        Ok(())
    }

    async fn forget(&self, key: &SessionKey) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned("sort state store"))?;
        entries.remove(&key.to_string());
        Ok(())
    }
}

// =============================================================================
// Report history
// =============================================================================

/// In-memory report history
#[derive(Clone, Default)]
pub struct InMemoryReportHistoryStore {
    records: Arc<RwLock<Vec<ReportHistoryRecord>>>,
}

impl InMemoryReportHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportHistoryStore for InMemoryReportHistoryStore {
    async fn record(&self, record: ReportHistoryRecord) -> Result<ReportHistoryRecord> {
        let mut records = self.records.write().map_err(poisoned("report history"))?;
        records.push(record.clone());
        Ok(record)
    }

    async fn list_for_tenant(
        &self,
        tenant_id: &Uuid,
        subclient_id: Option<&Uuid>,
    ) -> Result<Vec<ReportHistoryRecord>> {
        let records = self.records.read().map_err(poisoned("report history"))?;

        let mut found: Vec<ReportHistoryRecord> = records
            .iter()
            .filter(|r| {
                &r.tenant_id == tenant_id
                    && subclient_id.is_none_or(|s| r.subclient_id.as_ref() == Some(s))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn get(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<ReportHistoryRecord>> {
        let records = self.records.read().map_err(poisoned("report history"))?;
        Ok(records
            .iter()
            .find(|r| &r.id == id && &r.tenant_id == tenant_id)
            .cloned())
    }
}

// =============================================================================
// Artifacts
// =============================================================================

/// In-memory artifact sink
#[derive(Clone, Default)]
pub struct InMemoryArtifactSink {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths currently stored
    pub fn paths(&self) -> Vec<String> {
        self.files
            .read()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArtifactSink for InMemoryArtifactSink {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut files = self.files.write().map_err(poisoned("artifact sink"))?;
        files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let files = self.files.read().map_err(poisoned("artifact sink"))?;
        Ok(files.get(path).cloned())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut files = self.files.write().map_err(poisoned("artifact sink"))?;
        files.remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::DateRange;
    use chrono::{Duration, Utc};

    fn history_record(tenant_id: Uuid, minutes_ago: i64) -> ReportHistoryRecord {
        ReportHistoryRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            tenant_id,
            subclient_id: None,
            report_type: "payments".to_string(),
            record_count: 3,
            date_range: DateRange::default(),
            filename: "payments.csv".to_string(),
            path: "download-report/payments/x.csv".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_sort_store_save_and_load() {
        let store = InMemorySortStateStore::new();
        let key = SessionKey::new(Uuid::new_v4(), "payments");

        assert!(store.load(&key).await.unwrap().is_none());

        let preference = SortPreference {
            sort_col: "amount".to_string(),
            sort_asc: true,
        };
        store.save(&key, preference.clone()).await.unwrap();
        assert_eq!(store.load(&key).await.unwrap(), Some(preference));

        store.forget(&key).await.unwrap();
        assert!(store.load(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sort_store_keys_are_per_user_and_view() {
        let store = InMemorySortStateStore::new();
        let user = Uuid::new_v4();
        let preference = SortPreference {
            sort_col: "amount".to_string(),
            sort_asc: true,
        };
        store
            .save(&SessionKey::new(user, "payments"), preference)
            .await
            .unwrap();

        assert!(
            store
                .load(&SessionKey::new(user, "disputes"))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .load(&SessionKey::new(Uuid::new_v4(), "payments"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_history_is_tenant_scoped_and_newest_first() {
        let store = InMemoryReportHistoryStore::new();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        let old = store.record(history_record(tenant_a, 30)).await.unwrap();
        let new = store.record(history_record(tenant_a, 1)).await.unwrap();
        let foreign = store.record(history_record(tenant_b, 5)).await.unwrap();

        let listed = store.list_for_tenant(&tenant_a, None).await.unwrap();
        assert_eq!(listed, vec![new.clone(), old]);

        assert!(store.get(&tenant_a, &foreign.id).await.unwrap().is_none());
        assert_eq!(store.get(&tenant_a, &new.id).await.unwrap(), Some(new));
    }

    #[tokio::test]
    async fn test_artifact_sink_roundtrip() {
        let sink = InMemoryArtifactSink::new();
        sink.put("a/b.csv", b"x,y\n").await.unwrap();
        assert_eq!(sink.get("a/b.csv").await.unwrap(), Some(b"x,y\n".to_vec()));
        assert_eq!(sink.get("missing.csv").await.unwrap(), None);
        assert_eq!(sink.paths(), vec!["a/b.csv".to_string()]);
    }
}
