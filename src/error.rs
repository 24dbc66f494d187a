//! Error types for composing and sequencing
//!
//! Every failure is scoped to a single invocation. Resolution misses inside a
//! description never reach this type: they are logged and the offending event
//! is skipped.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for one compose/sequence invocation
#[derive(Debug, Error)]
pub enum ComposerError {
    /// The description JSON was malformed, missed a required field or
    /// violates a hard invariant
    #[error("invalid music description: {0}")]
    Description(String),

    /// The SMF could not be serialized
    #[error("midi write error: {0}")]
    Midi(String),

    /// Reading or writing an artifact failed
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The description generator failed or timed out
    #[error("description generator failed: {0}")]
    Generator(String),

    /// The external synthesizer failed; the MIDI artifact is still valid
    #[error("audio render failed: {0}")]
    Render(String),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ComposerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ComposerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ComposerError>;
