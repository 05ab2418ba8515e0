//! End-to-end runs of the pipeline over a temporary storage directory.

use classificados::error::AppError;
use classificados::models::{Config, Snapshot};
use classificados::pipeline::{self, ValidationRun, Validator};
use classificados::services::{GitCli, SourceControl};
use classificados::storage::{DocumentStorage, LocalStorage};
use classificados::utils::FixedClock;
use serde_json::{Value, json};
use tempfile::TempDir;

fn ad(id: &str, titulo: &str, status: &str) -> Value {
    json!({
        "id": id,
        "titulo": titulo,
        "funcoes": ["Guitarra"],
        "generos": ["rock"],
        "local": {"cidade": "Recife", "estado": "PE"},
        "status": status,
        "cadastroEm": "2025-04-01T10:00:00.000Z",
        "ultimaAtualizacao": "2025-04-02T10:00:00.000Z",
        "contato": {"email": "banda@example.com"}
    })
}

fn write_records(dir: &TempDir, records: &Value) {
    let text = serde_json::to_string_pretty(records).unwrap();
    std::fs::write(dir.path().join("classificados.json"), text).unwrap();
}

fn read_changelog(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap()
}

#[test]
fn changelog_tracks_changes_across_days() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path());
    let config = Config::default();

    write_records(&dir, &json!([ad("a1", "Guitarrista", "ativo")]));
    let day1 = FixedClock::at("2025-05-01T09:00:00Z");
    let run = pipeline::run_changelog(&config, &storage, day1).unwrap();
    assert_eq!(run.summary.added, 1);

    write_records(
        &dir,
        &json!([ad("a1", "Guitarrista", "pausado"), ad("b2", "Baixista", "ativo")]),
    );
    let day2 = FixedClock::at("2025-05-02T09:00:00Z");
    let run = pipeline::run_changelog(&config, &storage, day2).unwrap();
    assert_eq!(run.summary.added, 1);
    assert_eq!(run.summary.status_changed, 1);
    assert_eq!(run.ledger_len, Some(2));

    let changelog = read_changelog(&dir);
    let day2_pos = changelog.find("## 2025-05-02").unwrap();
    let day1_pos = changelog.find("## 2025-05-01").unwrap();
    assert!(day2_pos < day1_pos);
    assert!(changelog.contains("- **Guitarrista**: ativo → pausado"));
    assert!(changelog.contains("- **Baixista** (Guitarra) - Recife, PE"));

    let history: Vec<Snapshot> = storage.read_json("history/changes.json").unwrap().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].date, "2025-05-02");
    assert_eq!(history[1].active_count, 1);

    // Unchanged data on the same day persists nothing.
    let again = pipeline::run_changelog(&config, &storage, day2).unwrap();
    assert!(!again.summary.has_changes());
    assert_eq!(read_changelog(&dir), changelog);
}

#[test]
fn corrupt_history_is_recovered() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path());
    let config = Config::default();

    write_records(&dir, &json!([ad("a1", "Guitarrista", "ativo")]));
    std::fs::create_dir_all(dir.path().join("history")).unwrap();
    std::fs::write(dir.path().join("history/changes.json"), "not json").unwrap();

    let run = pipeline::run_changelog(&config, &storage, FixedClock::at("2025-05-01T09:00:00Z"))
        .unwrap();
    assert!(run.warning.is_some());
    assert_eq!(run.ledger_len, Some(1));
}

#[test]
fn maintenance_preserves_unknown_fields() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path());
    let config = Config::default();

    let mut fresh = ad("", "Vocalista", "ativo");
    fresh.as_object_mut().unwrap().remove("ultimaAtualizacao");
    write_records(&dir, &json!([ad("a1", "Guitarrista", "ativo"), fresh]));

    assert_eq!(pipeline::run_ids(&config, &storage).unwrap(), 1);
    let clock = FixedClock::at("2025-05-01T09:00:00Z");
    assert_eq!(pipeline::run_timestamps(&config, &storage, &clock, false).unwrap(), 1);

    let saved: Value = storage.read_json("classificados.json").unwrap().unwrap();
    assert_eq!(saved[1]["id"].as_str().unwrap().len(), 8);
    assert_eq!(saved[1]["ultimaAtualizacao"], "2025-04-01T10:00:00.000Z");
    assert_eq!(saved[1]["contato"]["email"], "banda@example.com");

    let raw = std::fs::read_to_string(dir.path().join("classificados.json")).unwrap();
    assert!(raw.starts_with("[\n  {\n    \"id\""));
}

#[test]
fn maintenance_leaves_untouched_fields_in_place() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path());
    let config = Config::default();

    let record = json!({
        "id": "",
        "titulo": "Baterista",
        "descricao": "Banda de post-rock procura baterista",
        "funcoes": ["Bateria"],
        "status": "arquivado",
        "cadastroEm": "2025-01-01T00:00:00.000Z",
        "expiracaoEm": null
    });
    write_records(&dir, &json!([record]));

    assert_eq!(pipeline::run_ids(&config, &storage).unwrap(), 1);
    let clock = FixedClock::at("2025-05-01T09:00:00Z");
    assert_eq!(pipeline::run_timestamps(&config, &storage, &clock, false).unwrap(), 1);
    assert_eq!(pipeline::run_timestamps(&config, &storage, &clock, true).unwrap(), 0);

    let saved: Value = storage.read_json("classificados.json").unwrap().unwrap();
    let keys: Vec<&str> = saved[0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec![
            "id",
            "titulo",
            "descricao",
            "funcoes",
            "status",
            "cadastroEm",
            "expiracaoEm",
            "ultimaAtualizacao"
        ]
    );
    assert_eq!(saved[0]["expiracaoEm"], Value::Null);
    assert_eq!(saved[0]["status"], "arquivado");
    assert!(saved[0].get("local").is_none());
    assert_eq!(saved[0]["ultimaAtualizacao"], "2025-01-01T00:00:00.000Z");
}

#[test]
fn validation_collects_everything() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path());
    let config = Config::default();
    let validator = Validator::new().unwrap();

    write_records(
        &dir,
        &json!([ad("a1", "Guitarrista", "ativo"), ad("b2", "Baixista", "pausado")]),
    );
    match pipeline::run_validation(&config, &storage, &validator, None::<&GitCli>).unwrap() {
        ValidationRun::Valid(summary) => {
            assert_eq!(summary.total, 2);
            assert_eq!(summary.paused, 1);
        }
        ValidationRun::Skipped => panic!("full validation never skips"),
    }

    write_records(
        &dir,
        &json!([ad("a1", "Guitarrista", "sumido"), ad("a1", "Baixista", "ativo")]),
    );
    let err = pipeline::run_validation(&config, &storage, &validator, None::<&GitCli>)
        .unwrap_err();
    assert!(matches!(err, AppError::Invalid(2)));
}

#[test]
fn missing_record_store_fails_every_task() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path());
    let config = Config::default();
    let clock = FixedClock::at("2025-05-01T09:00:00Z");

    assert!(matches!(
        pipeline::run_stats(&config, &storage, &clock),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        pipeline::run_ids(&config, &storage),
        Err(AppError::NotFound(_))
    ));
    assert!(!storage.exists("estatisticas.json").unwrap());
}

#[test]
fn git_outside_repository_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let git = GitCli::new(dir.path());

    // Either git is absent or the directory isn't a repository; both read
    // as "no such file" rather than an error.
    assert_eq!(git.show_file("HEAD", "classificados.json").unwrap(), None);
}
