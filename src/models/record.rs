//! Classified ad record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::time::parse_timestamp;

/// Lifecycle status of an ad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Ativo,
    Pausado,
    Finalizado,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ativo => "ativo",
            Status::Pausado => "pausado",
            Status::Finalizado => "finalizado",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the ad is located. Both parts are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
}

impl Location {
    pub fn new(cidade: impl Into<String>, estado: impl Into<String>) -> Self {
        Self {
            cidade: Some(cidade.into()),
            estado: Some(estado.into()),
        }
    }

    /// "cidade, estado" with blank parts skipped, `None` when both are blank.
    pub fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [self.cidade.as_deref(), self.estado.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// A classified ad ("classificado") as stored in the record file.
///
/// Fields this crate does not interpret (contact data, descriptions, links)
/// are kept in `extra` so a load/save cycle never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Short stable identifier; empty until the id generator runs
    #[serde(default)]
    pub id: String,

    /// Ad title
    #[serde(default)]
    pub titulo: String,

    /// Roles being sought, in author order
    #[serde(default)]
    pub funcoes: Vec<String>,

    /// Musical genres, in author order
    #[serde(default)]
    pub generos: Vec<String>,

    #[serde(default)]
    pub local: Location,

    #[serde(default)]
    pub status: Status,

    /// Creation timestamp (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadastro_em: Option<String>,

    /// Last modification timestamp (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ultima_atualizacao: Option<String>,

    /// Optional expiration timestamp (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiracao_em: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, titulo: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            titulo: titulo.into(),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Ativo
    }

    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        self.cadastro_em.as_deref().and_then(parse_timestamp)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.ultima_atualizacao.as_deref().and_then(parse_timestamp)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiracao_em.as_deref().and_then(parse_timestamp)
    }
}
