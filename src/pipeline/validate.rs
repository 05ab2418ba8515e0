// src/pipeline/validate.rs

//! Structural and business-rule validation of the record document.
//!
//! Both passes always run to completion and their findings are returned
//! together; nothing short-circuits on the first problem.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Record, Status, Summary};
use crate::services::SourceControl;
use crate::utils::time::parse_timestamp;

/// Schema used when the configuration doesn't point at another one.
pub const DEFAULT_SCHEMA: &str = include_str!("../../schema/classificado-schema.json");

/// A structural schema failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaViolation {
    /// JSON pointer to the failing value, e.g. `/3/status`
    pub path: String,
    pub message: String,
    pub value: Value,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "root" } else { &self.path };
        write!(f, "{}: {} (received {})", path, self.message, self.value)
    }
}

/// A cross-record business-rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleViolation {
    /// Every id that occurs more than once, reported together
    DuplicateIds { ids: Vec<String> },
    UpdatedBeforeCreated { id: String },
    ExpiresBeforeCreated { id: String },
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleViolation::DuplicateIds { ids } => {
                write!(f, "duplicate ids found: {}", ids.join(", "))
            }
            RuleViolation::UpdatedBeforeCreated { id } => {
                write!(f, "record {id}: last update precedes registration")
            }
            RuleViolation::ExpiresBeforeCreated { id } => {
                write!(f, "record {id}: expiration precedes registration")
            }
        }
    }
}

/// Every problem found in one validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub schema: Vec<SchemaViolation>,
    pub rules: Vec<RuleViolation>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.schema.is_empty() && self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.schema.len() + self.rules.len()
    }

    /// One line per problem, structural first.
    pub fn lines(&self) -> Vec<String> {
        self.schema
            .iter()
            .map(ToString::to_string)
            .chain(self.rules.iter().map(ToString::to_string))
            .collect()
    }
}

/// Compiled schema plus the business rules.
pub struct Validator {
    schema: jsonschema::Validator,
}

impl Validator {
    /// Validator for the embedded schema.
    pub fn new() -> Result<Self> {
        let schema: Value = serde_json::from_str(DEFAULT_SCHEMA)?;
        Self::from_schema(&schema)
    }

    pub fn from_schema(schema: &Value) -> Result<Self> {
        let schema = jsonschema::options()
            .should_validate_formats(true)
            .build(schema)
            .map_err(AppError::schema)?;
        Ok(Self { schema })
    }

    /// Validator for a schema file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let schema: Value = serde_json::from_str(&content)?;
        Self::from_schema(&schema)
    }

    /// Every structural violation of `document`.
    pub fn check_structure(&self, document: &Value) -> Vec<SchemaViolation> {
        self.schema
            .iter_errors(document)
            .map(|error| SchemaViolation {
                path: error.instance_path.to_string(),
                message: error.to_string(),
                value: error.instance.clone().into_owned(),
            })
            .collect()
    }

    /// Validate a raw record document.
    ///
    /// Returns the dataset summary when both passes are clean, otherwise the
    /// full report.
    pub fn validate(&self, document: &Value) -> std::result::Result<Summary, ValidationReport> {
        let mut report = ValidationReport {
            schema: self.check_structure(document),
            rules: document.as_array().map(|r| check_rules(r)).unwrap_or_default(),
        };

        if !report.is_empty() {
            return Err(report);
        }

        match serde_json::from_value::<Vec<Record>>(document.clone()) {
            Ok(records) => Ok(summarize(&records)),
            Err(e) => {
                report.schema.push(SchemaViolation {
                    path: String::new(),
                    message: e.to_string(),
                    value: Value::Null,
                });
                Err(report)
            }
        }
    }
}

/// Business rules over the whole array: unique ids and timestamp ordering.
///
/// Works on raw JSON so it can run on documents the schema rejected.
/// Unparseable timestamps are left to the structural pass.
pub fn check_rules(records: &[Value]) -> Vec<RuleViolation> {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let id = record.get("id").and_then(Value::as_str);
        let label = id.map_or_else(|| format!("#{index}"), String::from);

        if let Some(id) = id {
            if !seen.insert(id) && !duplicates.iter().any(|d| d == id) {
                duplicates.push(id.to_string());
            }
        }

        let timestamp = |field: &str| {
            record
                .get(field)
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
        };
        let created = timestamp("cadastroEm");

        if let (Some(created), Some(updated)) = (created, timestamp("ultimaAtualizacao")) {
            if updated < created {
                violations.push(RuleViolation::UpdatedBeforeCreated { id: label.clone() });
            }
        }

        if let (Some(created), Some(expires)) = (created, timestamp("expiracaoEm")) {
            if expires < created {
                violations.push(RuleViolation::ExpiresBeforeCreated { id: label });
            }
        }
    }

    if !duplicates.is_empty() {
        violations.push(RuleViolation::DuplicateIds { ids: duplicates });
    }

    violations
}

/// Sorted distinct non-blank values.
fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Counts and distinct values reported after a clean validation.
pub fn summarize(records: &[Record]) -> Summary {
    let count = |status: Status| records.iter().filter(|r| r.status == status).count();

    Summary {
        total: records.len(),
        active: count(Status::Ativo),
        paused: count(Status::Pausado),
        finished: count(Status::Finalizado),
        roles: distinct(records.iter().flat_map(|r| &r.funcoes)),
        genres: distinct(records.iter().flat_map(|r| &r.generos)),
        states: distinct(records.iter().filter_map(|r| r.local.estado.as_ref())),
        cities: distinct(records.iter().filter_map(|r| r.local.cidade.as_ref())),
    }
}

/// Whether an incremental run has anything to check: true when the record
/// document is staged, or when staged files can't be determined.
pub fn record_file_staged<G: SourceControl>(scm: &G, records_key: &str) -> bool {
    match scm.staged_files() {
        Ok(files) => {
            log::debug!("Staged files: {files:?}");
            files.iter().any(|f| f == records_key)
        }
        Err(e) => {
            log::warn!("Could not list staged files ({e}), validating everything");
            true
        }
    }
}
