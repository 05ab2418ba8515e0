// src/models/mod.rs

//! Domain models for the classificados tooling.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod snapshot;
mod stats;
mod version;

// Re-export all public types
pub use config::{Config, HistoryConfig, PathsConfig, ReleaseConfig, ServerConfig};
pub use record::{Location, Record, Status};
pub use snapshot::{AddedRecord, Change, RecordRef, Snapshot, SnapshotRecord, StatusTransition};
pub use stats::{GenreCount, RankedCounts, RecentRecord, RoleCount, Statistics, Summary};
pub use version::{BumpKind, Version};
