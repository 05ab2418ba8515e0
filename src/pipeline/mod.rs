//! Dataset pipeline stages.
//!
//! - `validate`: structural and business-rule checks
//! - `diff` / `history` / `changelog`: change tracking across runs
//! - `version` / `release`: content-driven version bumps
//! - `stats`, `timestamps`, `ids`: derived data and maintenance
//! - `tasks`: entry points used by the binary

pub mod changelog;
pub mod diff;
pub mod history;
pub mod ids;
pub mod release;
pub mod stats;
pub mod tasks;
pub mod timestamps;
pub mod validate;
pub mod version;

pub use changelog::{ChangelogDocument, ChangelogRenderer};
pub use diff::{ChangeSummary, DiffCalculator, calculate_changes};
pub use history::{AppendReport, HistoryLedger, LoadedLedger};
pub use release::{ReleaseOutcome, ReleaseWorkflow};
pub use tasks::{
    ChangelogRun, ValidationRun, build_validator, run_changelog, run_ids, run_release, run_stats,
    run_timestamps, run_validation,
};
pub use validate::{RuleViolation, SchemaViolation, ValidationReport, Validator};
pub use version::{VersionManifest, classify};
