//! Error type shared by the labeling pipeline and its I/O glue.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a labeling run.
///
/// Parameter-file truncation is not represented here; it is
/// reported through [`crate::io::ParseStatus`] because it never aborts a run.
#[derive(Error, Debug)]
pub enum LabelError {
    /// A required per-particle field array is absent.
    #[error("missing required field '{name}'")]
    MissingField { name: String },

    /// A field array exists but its shape does not match the point count.
    #[error("field '{name}' has {found} values, expected {expected} ({components} per point)")]
    FieldShape {
        name: String,
        components: usize,
        expected: usize,
        found: usize,
    },

    /// An atlas dataset carries no ground-truth `ChestType` labels.
    #[error("atlas {index} has no '{field}' labels")]
    MissingAtlasLabels { index: usize, field: String },

    /// Number of labels does not match the number of particles.
    #[error("label count {found} does not match particle count {expected}")]
    LabelCount { expected: usize, found: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid configuration values.
    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, LabelError>;

impl LabelError {
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField { name: name.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
