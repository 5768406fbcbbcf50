//! Semantic version parsing for `openapi` version strings
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Semantic version representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_release: Option<String>,
    pub build_metadata: Option<String>,
}

impl SchemaVersion {
    /// Create a new version
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
            build_metadata: None,
        }
    }

    /// Parse a `major.minor.patch[-pre][+build]` version string
    pub fn parse(version_str: &str) -> Result<Self, VersionError> {
        // Split on '+' for build metadata
        let (version_part, build_metadata) = match version_str.split_once('+') {
            Some((version, build)) => (version, Some(non_empty(build, "build metadata")?)),
            None => (version_str, None),
        };

        // Split on '-' for pre-release
        let (version_part, pre_release) = match version_part.split_once('-') {
            Some((version, pre)) => (version, Some(non_empty(pre, "pre-release")?)),
            None => (version_part, None),
        };

        let parts: Vec<&str> = version_part.split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat(format!(
                "expected major.minor.patch, got '{}'",
                version_str
            )));
        }

        Ok(Self {
            major: component(parts[0], "major")?,
            minor: component(parts[1], "minor")?,
            patch: component(parts[2], "patch")?,
            pre_release,
            build_metadata,
        })
    }

    /// Check if this is a pre-release version
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    /// Check if this version satisfies a version range
    pub fn satisfies(&self, range: &VersionRange) -> bool {
        range.matches(self)
    }
}

fn component(part: &str, name: &str) -> Result<u32, VersionError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::InvalidFormat(format!(
            "invalid {} version '{}'",
            name, part
        )));
    }
    part.parse()
        .map_err(|_| VersionError::InvalidFormat(format!("{} version '{}' is out of range", name, part)))
}

fn non_empty(part: &str, name: &str) -> Result<String, VersionError> {
    if part.is_empty() {
        return Err(VersionError::InvalidFormat(format!("empty {}", name)));
    }
    Ok(part.to_string())
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.pre_release {
            write!(f, "-{}", pre)?;
        }
        if let Some(ref build) = self.build_metadata {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| {
                // Pre-release versions have lower precedence
                match (&self.pre_release, &other.pre_release) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(a), Some(b)) => a.cmp(b),
                }
            })
    }
}

/// Version range specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRange {
    /// Exact version match
    Exact(SchemaVersion),
    /// Every patch and pre-release of one minor line (`3.1.x`)
    Series { major: u32, minor: u32 },
    /// Any version
    Any,
}

impl VersionRange {
    /// Parse `*`, `X.Y.x` or an exact version
    pub fn parse(range_str: &str) -> Result<Self, VersionError> {
        let range_str = range_str.trim();

        if range_str == "*" || range_str.is_empty() {
            return Ok(VersionRange::Any);
        }

        if let Some(prefix) = range_str.strip_suffix(".x") {
            let (major, minor) = prefix.split_once('.').ok_or_else(|| {
                VersionError::InvalidRange(format!("expected X.Y.x, got '{}'", range_str))
            })?;
            return Ok(VersionRange::Series {
                major: component(major, "major")?,
                minor: component(minor, "minor")?,
            });
        }

        Ok(VersionRange::Exact(SchemaVersion::parse(range_str)?))
    }

    /// Check if a version matches this range
    pub fn matches(&self, version: &SchemaVersion) -> bool {
        match self {
            VersionRange::Any => true,
            VersionRange::Exact(v) => version == v,
            VersionRange::Series { major, minor } => {
                version.major == *major && version.minor == *minor
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Any => write!(f, "*"),
            VersionRange::Exact(v) => write!(f, "{}", v),
            VersionRange::Series { major, minor } => write!(f, "{}.{}.x", major, minor),
        }
    }
}

/// Version parsing error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
    #[error("Invalid version range: {0}")]
    InvalidRange(String),
}
