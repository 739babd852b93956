//! In-memory ObjectStore for tests. Can be told to fail specific keys.

use crate::domain::DomainError;
use crate::ports::ObjectStore;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    failing: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().ok()?.get(key).cloned()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), DomainError> {
        if self.failing.contains(key) {
            return Err(DomainError::Storage(format!("refused '{}'", key)));
        }
        self.objects
            .lock()
            .map_err(|e| DomainError::Storage(e.to_string()))?
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }
}
