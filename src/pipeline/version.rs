//! Content-based version classification and the package manifest.
//!
//! Records are matched by title here, not by id: a retitled ad counts as a
//! new one and forces a minor bump.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{BumpKind, Version};
use crate::storage::DocumentStorage;

/// Field ignored when comparing two versions of the same record.
const VOLATILE_FIELD: &str = "ultimaAtualizacao";

/// Index by `titulo`; later records with the same title win.
fn by_title(records: &[Value]) -> HashMap<&str, &Value> {
    records
        .iter()
        .map(|r| (r.get("titulo").and_then(Value::as_str).unwrap_or_default(), r))
        .collect()
}

fn without_volatile(record: &Value) -> Value {
    let mut record = record.clone();
    if let Some(object) = record.as_object_mut() {
        object.remove(VOLATILE_FIELD);
    }
    record
}

/// Bump implied by going from `previous` to `current`.
///
/// Any new title gives `Minor`. Otherwise any content difference on a shared
/// title, ignoring `ultimaAtualizacao`, gives `Patch`. Removals alone don't
/// bump.
pub fn classify(previous: &[Value], current: &[Value]) -> Option<BumpKind> {
    let prev = by_title(previous);
    let curr = by_title(current);

    if curr.keys().any(|title| !prev.contains_key(title)) {
        return Some(BumpKind::Minor);
    }

    let changed = curr.iter().any(|(title, record)| {
        prev.get(title)
            .is_some_and(|old| without_volatile(old) != without_volatile(record))
    });

    changed.then_some(BumpKind::Patch)
}

/// The package manifest holding the dataset version.
///
/// Every other key is carried through untouched and in order.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionManifest {
    fields: Map<String, Value>,
    version: Version,
}

impl VersionManifest {
    pub fn parse(text: &str) -> Result<Self> {
        let fields: Map<String, Value> = serde_json::from_str(text)?;
        let version = fields
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::version("", "manifest has no \"version\" string"))?
            .parse()?;
        Ok(Self { fields, version })
    }

    pub fn load<S: DocumentStorage>(storage: &S, key: &str) -> Result<Self> {
        let text = storage
            .read_text(key)?
            .ok_or_else(|| AppError::not_found(storage.location(key)))?;
        Self::parse(&text)
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
        self.fields
            .insert("version".to_string(), Value::String(version.to_string()));
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_text(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(&self.fields)?;
        text.push('\n');
        Ok(text)
    }

    pub fn save<S: DocumentStorage>(&self, storage: &S, key: &str) -> Result<()> {
        storage.write_text(key, &self.to_text()?)
    }
}
