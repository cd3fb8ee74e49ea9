//! Error types for the simulator.

use std::path::PathBuf;

/// Errors produced by loading, transforming, and saving images.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The input file is missing or could not be decoded.
    #[error("failed to load image from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The output file could not be encoded or written.
    #[error("failed to save image to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The buffer is not a list of 3-channel samples.
    #[error("unsupported image format: {reason}")]
    Format { reason: String },

    /// No registry entry matches the requested name.
    #[error("unknown condition: {0:?}")]
    UnknownCondition(String),

    /// A figure layout whose cells do not fill its grid.
    #[error("invalid figure layout: {0}")]
    Layout(String),

    /// A configuration file could not be parsed.
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Simulation was requested before any image was loaded.
    #[error("no image loaded")]
    NoImage,

    /// Simulation was requested with an empty selection.
    #[error("no simulation type selected")]
    NoSelection,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }
}

/// Result alias for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;
