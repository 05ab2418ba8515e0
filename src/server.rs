//! Read-only HTTP access to the dataset documents.
//!
//! Endpoints:
//! - GET /                    - Plain text menu
//! - GET /classificados.json  - Full record array
//! - GET /classificado/{id}   - One record by id
//! - GET /estatisticas.json   - Last computed statistics
//!
//! Documents are read from disk on every request, so the server always
//! reflects the latest pipeline run.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::error::Result;
use crate::models::Config;

const MENU: &str = "\nIndiefolio Classificados API\n\
============================\n\n\
1. Listar classificados: GET /classificados.json\n\
2. Obter classificado específico: GET /classificado/{id}\n\
3. Obter estatísticas: GET /estatisticas.json\n\n";

struct ServerState {
    records: PathBuf,
    statistics: PathBuf,
}

fn not_found(message: String) -> Response {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Read and parse a JSON document, mapping every failure to a response.
async fn read_document(path: &std::path::Path) -> std::result::Result<Value, Response> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Could not read {}: {}", path.display(), e);
            return Err(not_found(format!("{} not found", path.display())));
        }
    };

    serde_json::from_slice(&bytes).map_err(|e| {
        log::error!("Malformed JSON in {}: {}", path.display(), e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "malformed document" })),
        )
            .into_response()
    })
}

/// Record with the given id from a record array document.
pub fn find_record<'a>(document: &'a Value, id: &str) -> Option<&'a Value> {
    document
        .as_array()?
        .iter()
        .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
}

async fn handle_menu() -> &'static str {
    MENU
}

async fn handle_records(State(state): State<Arc<ServerState>>) -> Response {
    match read_document(&state.records).await {
        Ok(document) => Json(document).into_response(),
        Err(response) => response,
    }
}

async fn handle_record(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    let document = match read_document(&state.records).await {
        Ok(document) => document,
        Err(response) => return response,
    };

    match find_record(&document, &id) {
        Some(record) => Json(record.clone()).into_response(),
        None => not_found(format!("classificado {id} not found")),
    }
}

async fn handle_statistics(State(state): State<Arc<ServerState>>) -> Response {
    match read_document(&state.statistics).await {
        Ok(document) => Json(document).into_response(),
        Err(response) => response,
    }
}

async fn handle_not_found() -> Response {
    not_found("not found".to_string())
}

/// Build the router serving documents under `root`.
pub fn router(config: &Config, root: impl Into<PathBuf>) -> Router {
    let root = root.into();
    let state = Arc::new(ServerState {
        records: root.join(&config.paths.records),
        statistics: root.join(&config.paths.statistics),
    });

    Router::new()
        .route("/", get(handle_menu))
        .route("/classificados.json", get(handle_records))
        .route("/classificado/{id}", get(handle_record))
        .route("/estatisticas.json", get(handle_statistics))
        .fallback(handle_not_found)
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn serve(config: &Config, root: impl Into<PathBuf>, port: u16) -> Result<()> {
    let app = router(config, root);
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Serving on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {e}");
        return;
    }
    log::info!("Received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_find_record() {
        let doc = json!([
            {"id": "a1", "titulo": "Guitarrista"},
            {"id": "b2", "titulo": "Baixista"}
        ]);

        assert_eq!(find_record(&doc, "b2").unwrap()["titulo"], "Baixista");
        assert!(find_record(&doc, "zz").is_none());
        assert!(find_record(&json!({"id": "a1"}), "a1").is_none());
    }

    #[tokio::test]
    async fn test_read_document_missing_is_404() {
        let dir = TempDir::new().unwrap();
        let response = read_document(&dir.path().join("estatisticas.json"))
            .await
            .unwrap_err();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_read_document_parses_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("classificados.json");
        std::fs::write(&path, r#"[{"id": "a1"}]"#).unwrap();

        let doc = read_document(&path).await.unwrap();
        assert_eq!(doc[0]["id"], "a1");
    }

    #[tokio::test]
    async fn test_record_handler_404_for_unknown_id() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("classificados.json"), r#"[{"id": "a1"}]"#).unwrap();
        let state = Arc::new(ServerState {
            records: dir.path().join("classificados.json"),
            statistics: dir.path().join("estatisticas.json"),
        });

        let found = handle_record(State(state.clone()), Path("a1".to_string())).await;
        assert_eq!(found.status(), StatusCode::OK);

        let missing = handle_record(State(state), Path("zz".to_string())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
