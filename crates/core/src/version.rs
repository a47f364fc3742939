//! Entity version numbers.
//!
//! A version is a three-component `major.minor.update` value. The merge
//! algorithm bumps only the update component; major and minor bumps are the
//! editor's business and must never be rolled back here.

use serde::{Deserialize, Serialize};

use crate::errors::VersionError;

/// A `major.minor.update` version, ordered component-wise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub update: u32,
}

impl Version {
    /// Create a version from its components.
    pub fn new(major: u32, minor: u32, update: u32) -> Self {
        Self {
            major,
            minor,
            update,
        }
    }

    /// Parse a version string.
    ///
    /// Up to three dot-separated components are accepted; missing components
    /// default to zero, so `"1"` parses as `1.0.0`. Anything else is a
    /// [`VersionError::Malformed`].
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Malformed(s.to_string()));
        }
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() > 3 {
            return Err(VersionError::Malformed(s.to_string()));
        }
        let mut components = [0u32; 3];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u32>()
                .map_err(|_| VersionError::Malformed(s.to_string()))?;
        }
        Ok(Self::new(components[0], components[1], components[2]))
    }

    /// Return a copy with the update component incremented.
    ///
    /// Only the least-significant component changes; the result is strictly
    /// greater than `self` under component-wise ordering. The increment
    /// saturates at `u32::MAX` rather than overflowing.
    pub fn inc_update(self) -> Self {
        Self {
            update: self.update.saturating_add(1),
            ..self
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.update)
    }
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
