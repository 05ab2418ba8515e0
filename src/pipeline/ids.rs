//! Short content-derived ids for records that lack one.

use serde_json::Value;
use sha1::{Digest, Sha1};

const ID_LEN: usize = 8;

/// First 8 hex chars of SHA-1 over `<titulo>_<cadastroEm>`.
pub fn generate_id(titulo: &str, cadastro_em: &str) -> String {
    let digest = Sha1::digest(format!("{titulo}_{cadastro_em}").as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(ID_LEN);
    id
}

/// Text a field contributes to the id input. Absent fields hash as
/// `undefined` and nulls as `null`, so ids match the ones already in the
/// dataset.
fn id_input(field: Option<&Value>) -> String {
    match field {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn has_id(record: &serde_json::Map<String, Value>) -> bool {
    match record.get("id") {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Assign ids to records without one. Existing ids are left alone.
///
/// Returns how many ids were assigned.
pub fn assign_missing(records: &mut [Value]) -> usize {
    let mut assigned = 0;

    for record in records.iter_mut().filter_map(Value::as_object_mut) {
        if has_id(record) {
            continue;
        }

        let titulo = id_input(record.get("titulo"));
        let id = generate_id(&titulo, &id_input(record.get("cadastroEm")));
        log::info!("Assigned id {id} to \"{titulo}\"");
        record.insert("id".to_string(), Value::String(id));
        assigned += 1;
    }

    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id("Guitarrista", "2025-01-01T00:00:00.000Z");
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, generate_id("Guitarrista", "2025-01-01T00:00:00.000Z"));
        assert_ne!(id, generate_id("Guitarrista", "2025-01-02T00:00:00.000Z"));
    }

    #[test]
    fn test_known_ids() {
        assert_eq!(generate_id("abc", ""), "752ac1f6");
        assert_eq!(generate_id("Baixista", "2025-01-01T00:00:00.000Z"), "36611283");
    }

    #[test]
    fn test_missing_registration_hashes_as_undefined() {
        let mut records = vec![json!({"titulo": "Vocalista"})];
        assert_eq!(assign_missing(&mut records), 1);
        assert_eq!(records[0]["id"], "9a3b1a3a");
    }

    #[test]
    fn test_assign_missing_keeps_existing_and_position() {
        let mut records = vec![
            json!({"id": "keep-me", "titulo": "Guitarrista"}),
            json!({
                "id": "  ",
                "titulo": "Baixista",
                "cadastroEm": "2025-01-01T00:00:00.000Z"
            }),
        ];

        assert_eq!(assign_missing(&mut records), 1);
        assert_eq!(records[0]["id"], "keep-me");
        assert_eq!(records[1]["id"], "36611283");
        assert_eq!(records[1].as_object().unwrap().keys().next().unwrap(), "id");
        assert_eq!(assign_missing(&mut records), 0);
    }
}
