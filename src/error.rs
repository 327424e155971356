//! Errors raised by the pipeline stages.
//!
//! Configuration problems live in [`crate::config::ConfigError`]; patching has
//! its own [`crate::patch::PatchError`] because a missing optional target is
//! a skip rather than a failure.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    /// A generated artifact could not be written.
    #[error("failed to write `{path}`")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An icon family has no source file; the install experience would be
    /// broken on at least one platform.
    #[error("no {family} icon matching `{pattern}` in `{root}`")]
    MissingIconAsset {
        family: &'static str,
        pattern: String,
        root: PathBuf,
    },

    /// A canonical icon name could not be produced.
    #[error("cannot rename `{from}` to `{to}`")]
    RenameFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    /// The bundler output directory does not exist.
    #[error("bundle directory `{0}` does not exist")]
    MissingBundle(PathBuf),

    #[error("IO error on `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StageError {
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StageResult<T> = Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = StageError::MissingIconAsset {
            family: "windows tile",
            pattern: "mstile-150x150.png".into(),
            root: PathBuf::from("icons"),
        };
        assert_eq!(
            err.to_string(),
            "no windows tile icon matching `mstile-150x150.png` in `icons`"
        );

        let err = StageError::write("out/manifest.json", io::Error::other("disk full"));
        assert_eq!(err.to_string(), "failed to write `out/manifest.json`");
        assert!(std::error::Error::source(&err).is_some());
    }
}
