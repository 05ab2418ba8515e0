//! Semantic version descriptor and bump kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Increment category implied by a content diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    Minor,
    Patch,
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpKind::Minor => f.write_str("minor"),
            BumpKind::Patch => f.write_str("patch"),
        }
    }
}

/// `major.minor.patch`. Field order gives the derived ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Apply a bump. Major is never incremented here.
    #[must_use]
    pub fn bump(self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpKind::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }

    /// Git tag name for this version.
    pub fn tag(&self) -> String {
        format!("v{self}")
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(AppError::version(s, "expected major.minor.patch"));
        }

        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|e| AppError::version(s, format!("component '{part}': {e}")))
        };

        Ok(Self::new(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let v: Version = "1.4.2".parse().unwrap();
        assert_eq!(v, Version::new(1, 4, 2));
        assert_eq!(v.to_string(), "1.4.2");
        assert_eq!(v.tag(), "v1.4.2");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("1.4".parse::<Version>().is_err());
        assert!("1.x.0".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn test_minor_resets_patch() {
        assert_eq!(Version::new(1, 4, 2).bump(BumpKind::Minor), Version::new(1, 5, 0));
    }

    #[test]
    fn test_patch_keeps_major_minor() {
        let v = Version::new(2, 0, 9);
        let bumped = v.bump(BumpKind::Patch);
        assert_eq!(bumped, Version::new(2, 0, 10));
        assert_eq!(bumped.major, v.major);
        assert_eq!(bumped.minor, v.minor);
    }

    #[test]
    fn test_bumps_are_monotonic() {
        for v in [
            Version::new(0, 0, 0),
            Version::new(0, 9, 41),
            Version::new(3, 0, 0),
            Version::new(1, 2, 3),
        ] {
            let minor = v.bump(BumpKind::Minor);
            let patch = v.bump(BumpKind::Patch);
            assert!(minor > patch, "{minor} > {patch}");
            assert!(patch > v, "{patch} > {v}");
        }
    }
}
