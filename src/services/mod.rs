//! External collaborators.

pub mod git;

pub use git::{GitCli, SourceControl};
