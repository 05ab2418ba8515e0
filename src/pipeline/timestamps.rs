//! Backfill and refresh of record timestamps.
//!
//! Works on the raw record document so untouched fields keep their values
//! and their position.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::utils::time::format_timestamp;

const CREATED: &str = "cadastroEm";
const UPDATED: &str = "ultimaAtualizacao";

/// Absent, `null` or empty.
fn is_blank(record: &Map<String, Value>, field: &str) -> bool {
    match record.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Fill in missing timestamps. `ultimaAtualizacao` falls back to
/// `cadastroEm`, then `cadastroEm` falls back to `ultimaAtualizacao`, and
/// `now` covers records with neither.
///
/// Returns how many records were modified.
pub fn normalize(records: &mut [Value], now: DateTime<Utc>) -> usize {
    let now = Value::String(format_timestamp(now));
    let mut changed = 0;

    for record in records.iter_mut().filter_map(Value::as_object_mut) {
        let mut touched = false;

        if is_blank(record, UPDATED) {
            let value = if is_blank(record, CREATED) {
                now.clone()
            } else {
                record.get(CREATED).cloned().unwrap_or_else(|| now.clone())
            };
            record.insert(UPDATED.to_string(), value);
            touched = true;
        }

        if is_blank(record, CREATED) {
            let value = record.get(UPDATED).cloned().unwrap_or_else(|| now.clone());
            record.insert(CREATED.to_string(), value);
            touched = true;
        }

        if touched {
            changed += 1;
        }
    }

    changed
}

/// Stamp every active record with `now`. Returns how many were stamped.
pub fn touch_active(records: &mut [Value], now: DateTime<Utc>) -> usize {
    let now = Value::String(format_timestamp(now));
    let mut touched = 0;

    for record in records
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .filter(|r| r.get("status").and_then(Value::as_str) == Some("ativo"))
    {
        record.insert(UPDATED.to_string(), now.clone());
        touched += 1;
    }

    touched
}
