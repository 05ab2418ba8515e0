//! In-memory storage for tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::storage::DocumentStorage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.documents().keys().cloned().collect()
    }

    fn documents(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStorage for MemoryStorage {
    fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.documents().get(key).cloned())
    }

    fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.documents().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
