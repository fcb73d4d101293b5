//! Filesystem artifact sink

use crate::core::error::StorageError;
use crate::core::export::ArtifactSink;
use anyhow::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Stores export artifacts as files under a root directory
#[derive(Debug, Clone)]
pub struct FsArtifactSink {
    root: PathBuf,
}

impl FsArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative artifact path under the root
    ///
    /// Absolute paths and `..` components are refused.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || path.is_empty() {
            return Err(StorageError::PathOutsideRoot {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

fn io_error(err: std::io::Error) -> StorageError {
    StorageError::Io {
        message: err.to_string(),
    }
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&target, bytes).await.map_err(io_error)?;
        tracing::debug!(path = %target.display(), bytes = bytes.len(), "artifact stored");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(err).into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());

        sink.put("download-report/payments/a.csv", b"h\n1\n")
            .await
            .unwrap();

        let on_disk = std::fs::read(dir.path().join("download-report/payments/a.csv")).unwrap();
        assert_eq!(on_disk, b"h\n1\n");
        assert_eq!(
            sink.get("download-report/payments/a.csv").await.unwrap(),
            Some(b"h\n1\n".to_vec())
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        assert_eq!(sink.get("nothing/here.csv").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());

        sink.put("download-report/payments/a.csv", b"h\n").await.unwrap();
        sink.delete("download-report/payments/a.csv").await.unwrap();
        assert_eq!(sink.get("download-report/payments/a.csv").await.unwrap(), None);

        sink.delete("download-report/payments/a.csv").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());

        for path in ["../evil.csv", "/etc/passwd", "a/../../b.csv", ""] {
            let err = sink.put(path, b"x").await.unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<StorageError>(),
                    Some(StorageError::PathOutsideRoot { .. })
                ),
                "path {path:?} should be refused"
            );
        }
    }
}
