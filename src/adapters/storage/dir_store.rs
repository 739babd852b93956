//! Implements ObjectStore on a local directory. Keys map to relative paths.

use crate::domain::DomainError;
use crate::ports::ObjectStore;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct DirStore {
    base_dir: PathBuf,
}

impl DirStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Rejects keys that would escape the base directory.
    fn object_path(&self, key: &str) -> Result<PathBuf, DomainError> {
        let rel = Path::new(key);
        if key.is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(DomainError::Storage(format!("invalid object key '{}'", key)));
        }
        Ok(self.base_dir.join(rel))
    }
}

#[async_trait::async_trait]
impl ObjectStore for DirStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), DomainError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Storage(e.to_string()))?;
        }
        fs::write(&path, &body)
            .await
            .map_err(|e| DomainError::Storage(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), bytes = body.len(), content_type, "stored object");
        Ok(())
    }
}
