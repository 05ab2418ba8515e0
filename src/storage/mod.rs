//! Storage abstractions for the dataset documents.
//!
//! Every document lives under a relative key:
//!
//! ```text
//! {root}/
//! ├── config.toml           # Tooling configuration
//! ├── classificados.json    # Authoritative record array
//! ├── estatisticas.json     # Last computed statistics
//! ├── CHANGELOG.md          # Rendered change log
//! ├── package.json          # Version manifest
//! └── history/
//!     └── changes.json      # Capped snapshot ledger
//! ```
//!
//! Documents are read and written wholesale; there is no locking, the last
//! writer wins.

pub mod local;
pub mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::Record;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Key/value document storage.
pub trait DocumentStorage {
    /// Read bytes, returning `None` if the document doesn't exist.
    fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the document with `bytes`.
    fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Human-readable location of a key, for log lines.
    fn location(&self, key: &str) -> String;

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.read_bytes(key)?.is_some())
    }

    /// Read a UTF-8 text document.
    fn read_text(&self, key: &str) -> Result<Option<String>> {
        match self.read_bytes(key)? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            }),
            None => Ok(None),
        }
    }

    fn write_text(&self, key: &str, text: &str) -> Result<()> {
        self.write_bytes(key, text.as_bytes())
    }

    /// Read JSON data.
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.read_bytes(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Write JSON data, pretty-printed with 2-space indentation.
    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes)
    }
}

/// Accessor for the authoritative record array.
///
/// A missing or malformed record document is always an error: it is the
/// source of truth and is never silently replaced.
pub struct RecordStore<'a, S: DocumentStorage> {
    storage: &'a S,
    key: String,
}

impl<'a, S: DocumentStorage> RecordStore<'a, S> {
    pub fn new(storage: &'a S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn location(&self) -> String {
        self.storage.location(&self.key)
    }

    pub fn exists(&self) -> Result<bool> {
        self.storage.exists(&self.key)
    }

    /// Raw JSON document, for structural validation.
    pub fn load_document(&self) -> Result<Value> {
        self.storage
            .read_json(&self.key)?
            .ok_or_else(|| AppError::not_found(self.location()))
    }

    /// Records as raw JSON objects, for edits that must leave every other
    /// field untouched.
    pub fn load_raw(&self) -> Result<Vec<Value>> {
        Ok(serde_json::from_value(self.load_document()?)?)
    }

    pub fn save_raw(&self, records: &[Value]) -> Result<()> {
        self.storage.write_json(&self.key, records)
    }

    pub fn load(&self) -> Result<Vec<Record>> {
        self.storage
            .read_json(&self.key)?
            .ok_or_else(|| AppError::not_found(self.location()))
    }

    pub fn save(&self, records: &[Record]) -> Result<()> {
        self.storage.write_json(&self.key, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_store_is_not_found() {
        let storage = MemoryStorage::new();
        let store = RecordStore::new(&storage, "classificados.json");

        assert!(!store.exists().unwrap());
        assert!(matches!(store.load(), Err(AppError::NotFound(_))));
        assert!(matches!(store.load_document(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_store_is_json_error() {
        let storage = MemoryStorage::new();
        storage.write_text("classificados.json", "[{ not json").unwrap();
        let store = RecordStore::new(&storage, "classificados.json");

        assert!(matches!(store.load(), Err(AppError::Json(_))));
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let storage = MemoryStorage::new();
        let store = RecordStore::new(&storage, "classificados.json");

        store.save(&[Record::new("a1", "Guitarrista")]).unwrap();
        let text = storage.read_text("classificados.json").unwrap().unwrap();

        assert!(text.starts_with("[\n  {\n    \"id\": \"a1\""));
        assert_eq!(store.load().unwrap()[0].titulo, "Guitarrista");
    }

    #[test]
    fn test_raw_round_trip_keeps_layout() {
        let storage = MemoryStorage::new();
        let original = "[\n  {\n    \"id\": \"a1\",\n    \"titulo\": \"Guitarrista\",\n    \"descricao\": \"Banda de rock\",\n    \"funcoes\": [],\n    \"expiracaoEm\": null\n  }\n]";
        storage.write_text("classificados.json", original).unwrap();
        let store = RecordStore::new(&storage, "classificados.json");

        let records = store.load_raw().unwrap();
        store.save_raw(&records).unwrap();
        assert_eq!(storage.read_text("classificados.json").unwrap().unwrap(), original);
    }

    #[test]
    fn test_raw_load_rejects_non_array() {
        let storage = MemoryStorage::new();
        storage.write_text("classificados.json", "{}").unwrap();
        let store = RecordStore::new(&storage, "classificados.json");

        assert!(matches!(store.load_raw(), Err(AppError::Json(_))));
    }
}
