//! Sort preference persistence keyed by user and view

use crate::core::sort::SortPreference;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

/// Key under which a user's sort choice for one view is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user_id: Uuid,
    pub view: String,
}

impl SessionKey {
    pub fn new(user_id: Uuid, view: impl Into<String>) -> Self {
        Self {
            user_id,
            view: view.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sortable_{}_{}", self.user_id, self.view)
    }
}

/// Store for per-user, per-view sort preferences
///
/// A missing entry is not an error: callers fall back to the view default.
#[async_trait]
pub trait SortStateStore: Send + Sync {
    /// Load the stored preference, if any
    async fn load(&self, key: &SessionKey) -> Result<Option<SortPreference>>;

    /// Store a preference, replacing the previous one
    async fn save(&self, key: &SessionKey, preference: SortPreference) -> Result<()>;

    /// Drop the stored preference
    async fn forget(&self, key: &SessionKey) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_format() {
        let user_id = Uuid::nil();
        let key = SessionKey::new(user_id, "open_negotiations");
        assert_eq!(
            key.to_string(),
            "sortable_00000000-0000-0000-0000-000000000000_open_negotiations"
        );
    }
}
