//! History snapshots and the changes they record.

use serde::{Deserialize, Serialize};

use super::record::{Location, Record, Status};

/// Reduced copy of a record kept inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: String,
    pub titulo: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub funcoes: Vec<String>,
    #[serde(default)]
    pub generos: Vec<String>,
    #[serde(default)]
    pub local: Location,
}

impl From<&Record> for SnapshotRecord {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            titulo: record.titulo.clone(),
            status: record.status,
            funcoes: record.funcoes.clone(),
            generos: record.generos.clone(),
            local: record.local.clone(),
        }
    }
}

/// Point-in-time capture of the dataset, appended to the history ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// `YYYY-MM-DD`
    pub date: String,

    /// RFC 3339 instant of capture
    pub timestamp: String,

    #[serde(rename = "totalClassificados", default)]
    pub total: usize,

    #[serde(rename = "classificadosAtivos", default)]
    pub active_count: usize,

    #[serde(rename = "classificados", default)]
    pub records: Vec<SnapshotRecord>,

    #[serde(default)]
    pub changes: Vec<Change>,
}

/// Minimal reference to a record: id and title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: String,
    pub titulo: String,
}

/// Reference carried by an `add` change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedRecord {
    pub id: String,
    pub titulo: String,
    #[serde(default)]
    pub funcoes: Vec<String>,
    #[serde(default)]
    pub local: Location,
}

/// `{from, to}` pair of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: Status,
    pub to: Status,
}

/// One detected difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    Add {
        date: String,
        #[serde(rename = "classificado")]
        record: AddedRecord,
        message: String,
    },
    Remove {
        date: String,
        #[serde(rename = "classificado")]
        record: RecordRef,
        message: String,
    },
    StatusChange {
        date: String,
        #[serde(rename = "classificado")]
        record: RecordRef,
        message: String,
        details: StatusTransition,
    },
}

impl Change {
    pub fn added(date: &str, record: &Record) -> Self {
        Change::Add {
            date: date.to_string(),
            record: AddedRecord {
                id: record.id.clone(),
                titulo: record.titulo.clone(),
                funcoes: record.funcoes.clone(),
                local: record.local.clone(),
            },
            message: format!("Novo classificado: {}", record.titulo),
        }
    }

    pub fn removed(date: &str, record: &SnapshotRecord) -> Self {
        Change::Remove {
            date: date.to_string(),
            record: RecordRef {
                id: record.id.clone(),
                titulo: record.titulo.clone(),
            },
            message: format!("Classificado removido: {}", record.titulo),
        }
    }

    pub fn status_changed(date: &str, record: &Record, from: Status) -> Self {
        Change::StatusChange {
            date: date.to_string(),
            record: RecordRef {
                id: record.id.clone(),
                titulo: record.titulo.clone(),
            },
            message: format!(
                "Status alterado de \"{}\" para \"{}\": {}",
                from, record.status, record.titulo
            ),
            details: StatusTransition {
                from,
                to: record.status,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Change::Add { .. } => "add",
            Change::Remove { .. } => "remove",
            Change::StatusChange { .. } => "status_change",
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Change::Add { date, .. }
            | Change::Remove { date, .. }
            | Change::StatusChange { date, .. } => date,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Change::Add { record, .. } => &record.id,
            Change::Remove { record, .. } | Change::StatusChange { record, .. } => &record.id,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Change::Add { message, .. }
            | Change::Remove { message, .. }
            | Change::StatusChange { message, .. } => message,
        }
    }
}
