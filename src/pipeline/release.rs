//! Version bump, tag and push after a dataset change.
//!
//! Compares the record document at two revisions, bumps the manifest version
//! when the content warrants it, then commits, tags and pushes. Any failing
//! source-control step aborts the remaining ones.

use serde_json::Value;

use crate::error::Result;
use crate::models::{BumpKind, ReleaseConfig, Version};
use crate::services::SourceControl;
use crate::storage::DocumentStorage;

use super::version::{VersionManifest, classify};

/// What a release run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// One of the revisions had no readable record document
    Unavailable,
    /// Nothing relevant changed; no bump
    Unchanged,
    /// Dry run: the version that would have been released
    Planned {
        kind: BumpKind,
        from: Version,
        to: Version,
    },
    Released {
        kind: BumpKind,
        from: Version,
        to: Version,
    },
}

pub struct ReleaseWorkflow<'a, G: SourceControl, S: DocumentStorage> {
    scm: &'a G,
    storage: &'a S,
    config: &'a ReleaseConfig,
    records_key: &'a str,
    manifest_key: &'a str,
}

impl<'a, G: SourceControl, S: DocumentStorage> ReleaseWorkflow<'a, G, S> {
    pub fn new(
        scm: &'a G,
        storage: &'a S,
        config: &'a ReleaseConfig,
        records_key: &'a str,
        manifest_key: &'a str,
    ) -> Self {
        Self {
            scm,
            storage,
            config,
            records_key,
            manifest_key,
        }
    }

    /// Record array at `revision`, `None` if missing or not an array.
    fn records_at(&self, revision: &str) -> Result<Option<Vec<Value>>> {
        let Some(text) = self.scm.show_file(revision, self.records_key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(records) => Ok(Some(records)),
            Err(e) => {
                log::warn!("{} at {} is not a record array: {}", self.records_key, revision, e);
                Ok(None)
            }
        }
    }

    pub fn run(&self, dry_run: bool) -> Result<ReleaseOutcome> {
        let previous = self.records_at(&self.config.base_ref)?;
        let current = self.records_at(&self.config.head_ref)?;
        let (Some(previous), Some(current)) = (previous, current) else {
            log::info!(
                "Could not read {} at {} and {}, skipping release",
                self.records_key,
                self.config.base_ref,
                self.config.head_ref
            );
            return Ok(ReleaseOutcome::Unavailable);
        };

        let Some(kind) = classify(&previous, &current) else {
            log::info!("No relevant change detected");
            return Ok(ReleaseOutcome::Unchanged);
        };

        let mut manifest = VersionManifest::load(self.storage, self.manifest_key)?;
        let from = manifest.version();
        let to = from.bump(kind);

        if dry_run {
            log::info!("Dry run: would release {} ({kind} bump from {from})", to.tag());
            return Ok(ReleaseOutcome::Planned { kind, from, to });
        }

        manifest.set_version(to);
        manifest.save(self.storage, self.manifest_key)?;

        let tag = to.tag();
        self.scm.add(self.manifest_key)?;
        self.scm
            .commit(&format!("chore: bump version to {tag} [skip ci]"))?;
        self.scm.tag(&tag, &tag)?;
        self.scm.push(&self.config.remote, &self.config.branch)?;

        log::info!("Released {tag} ({kind})");
        Ok(ReleaseOutcome::Released { kind, from, to })
    }
}
