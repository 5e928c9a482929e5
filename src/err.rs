//! Error types of the variant pipeline.

use std::path::PathBuf;

/// Errors raised by adapters and the enrichment pipeline.
///
/// Missing optional data and lookup misses are never errors; see the
/// individual enrichers.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid configuration, e.g., a pedigree describing more than one family.
    #[error("configuration error in {path:?}: {msg}")]
    Config { path: PathBuf, msg: String },
    /// The variant source could not be opened or does not have the expected
    /// structure.
    #[error("invalid backend {path:?}: {msg}")]
    InvalidBackend {
        path: PathBuf,
        msg: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// A record lacks mandatory positional fields.
    #[error("could not parse record: {0}")]
    Parse(String),
    /// Underlying I/O problem.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Construct a configuration error for `path`.
    pub fn config<P: Into<PathBuf>, S: Into<String>>(path: P, msg: S) -> Self {
        Error::Config {
            path: path.into(),
            msg: msg.into(),
        }
    }

    /// Construct an invalid-backend error wrapping the underlying storage error.
    pub fn invalid_backend<P, S, E>(path: P, msg: S, source: E) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::InvalidBackend {
            path: path.into(),
            msg: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error signals a broken variant source.
    pub fn is_invalid_backend(&self) -> bool {
        matches!(self, Error::InvalidBackend { .. })
    }
}
