// src/version/mod.rs

//! Version parsing and canonicalisation for package descriptors
//!
//! A descriptor carries one version string shared by every package it
//! produces. Before it is stamped into package metadata it is parsed and
//! rewritten into a canonical form:
//!
//! - an optional leading `v` is dropped
//! - numeric segments lose leading zeros
//! - fewer than three segments are padded with zeros
//! - prerelease and build metadata are kept as written
//!
//! ```
//! use pkgen::version::PackageVersion;
//!
//! assert_eq!(PackageVersion::parse("1.2").unwrap().to_string(), "1.2.0");
//! assert_eq!(PackageVersion::parse("v01.2.3-rc1").unwrap().to_string(), "1.2.3-rc1");
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^v?([0-9]+(?:\.[0-9]+)*)",
        r"(?:-([0-9A-Za-z~-]+(?:\.[0-9A-Za-z~-]+)*)|([A-Za-z~][0-9A-Za-z~-]*(?:\.[0-9A-Za-z~-]+)*))?",
        r"(?:\+([0-9A-Za-z~-]+(?:\.[0-9A-Za-z~-]+)*))?$",
    ))
    .unwrap()
});

/// Minimum number of numeric segments in a canonical version
const MIN_SEGMENTS: usize = 3;

/// A parsed descriptor version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageVersion {
    /// Numeric segments, padded to at least three entries
    segments: Vec<u64>,
    /// Prerelease tag (`1.0.0-rc1` -> `rc1`)
    prerelease: Option<String>,
    /// Build metadata (`1.0.0+git5` -> `git5`)
    metadata: Option<String>,
}

impl PackageVersion {
    /// Parse a version string
    ///
    /// Examples:
    /// - "1.2.3" -> segments=[1, 2, 3]
    /// - "1.2" -> segments=[1, 2, 0]
    /// - "1.2.3.4" -> segments=[1, 2, 3, 4]
    /// - "2.0-beta.1+r7" -> segments=[2, 0, 0], prerelease="beta.1", metadata="r7"
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidVersion {
            version: s.to_string(),
            reason,
        };

        let caps = VERSION_RE
            .captures(s.trim())
            .ok_or_else(|| invalid("expected dotted numeric segments".to_string()))?;

        let mut segments = caps[1]
            .split('.')
            .map(|seg| {
                seg.parse::<u64>()
                    .map_err(|e| invalid(format!("segment '{}': {}", seg, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        while segments.len() < MIN_SEGMENTS {
            segments.push(0);
        }

        let prerelease = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string());
        let metadata = caps.get(4).map(|m| m.as_str().to_string());

        Ok(Self {
            segments,
            prerelease,
            metadata,
        })
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(ref meta) = self.metadata {
            write!(f, "+{}", meta)?;
        }
        Ok(())
    }
}

impl FromStr for PackageVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
