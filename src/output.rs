//! Versioned output directory resolution.
//!
//! Every artifact of one run lands under `<root>/build-<version>`. The path is
//! resolved once and handed to each stage; no stage recomputes it.

use crate::config::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix of every versioned output directory name.
pub const BUILD_DIR_PREFIX: &str = "build-";

/// `MAJOR.MINOR.PATCH`, each a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for Version {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidVersion(s.to_string());

        let mut parts = s.split('.');
        let mut next = || -> Result<u64, ConfigError> {
            let part = parts.next().ok_or_else(invalid)?;
            // `u64::from_str` accepts a leading `+`; only ASCII digits are valid here
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let version = Self {
            major: next()?,
            minor: next()?,
            patch: next()?,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The artifact directory of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedOutputPath {
    root: PathBuf,
    version: Version,
    path: PathBuf,
}

impl VersionedOutputPath {
    /// `<root>/build-<version>`
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn version(&self) -> Version {
        self.version
    }

    /// Hidden sibling the pipeline populates before publishing.
    pub fn staging(&self) -> PathBuf {
        self.root
            .join(format!(".{BUILD_DIR_PREFIX}{}.staging", self.version))
    }

    /// Where the published directory waits while its replacement is renamed
    /// into place.
    pub fn previous(&self) -> PathBuf {
        self.root
            .join(format!(".{BUILD_DIR_PREFIX}{}.previous", self.version))
    }

    /// Directory name as it appears in URLs: `build-<version>`.
    pub fn dir_name(&self) -> String {
        format!("{BUILD_DIR_PREFIX}{}", self.version)
    }
}

/// Resolve the versioned output directory for `version` under `root`.
pub fn resolve(root: &Path, version: &str) -> Result<VersionedOutputPath, ConfigError> {
    let version: Version = version.trim().parse()?;
    Ok(VersionedOutputPath {
        root: root.to_path_buf(),
        version,
        path: root.join(format!("{BUILD_DIR_PREFIX}{version}")),
    })
}
