//! Error types shared across ReelForge crates.

use std::fmt;
use std::path::PathBuf;

/// Stream metadata field compared by the concat compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Width,
    Height,
    Codec,
    Fps,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetadataField::Width => "width",
            MetadataField::Height => "height",
            MetadataField::Codec => "codec",
            MetadataField::Fps => "fps",
        };
        f.write_str(name)
    }
}

/// Top-level error type for ReelForge operations.
#[derive(Debug, thiserror::Error)]
pub enum ReelforgeError {
    #[error("Probe error for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    #[error("Clips {first} and {second} are incompatible: {field} differs")]
    Incompatible {
        field: MetadataField,
        first: usize,
        second: usize,
    },

    #[error("Engine error during {operation}: {diagnostic}")]
    Engine {
        operation: String,
        diagnostic: String,
    },

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Pipeline stage {stage} ({name}) failed: {source}")]
    Pipeline {
        stage: usize,
        name: &'static str,
        #[source]
        source: Box<ReelforgeError>,
    },

    #[error("Scene {index} has {video_layers} video layers; exactly one is supported")]
    UnsupportedScene { index: usize, video_layers: usize },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Pipeline stage {stage} timed out")]
    Timeout { stage: usize },

    #[error("Pipeline cancelled before stage {stage}")]
    Cancelled { stage: usize },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ReelforgeError.
pub type ReelforgeResult<T> = Result<T, ReelforgeError>;

impl ReelforgeError {
    pub fn probe(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn engine(operation: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self::Engine {
            operation: operation.into(),
            diagnostic: diagnostic.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a stage failure with its position in the pipeline.
    pub fn pipeline(stage: usize, name: &'static str, cause: ReelforgeError) -> Self {
        Self::Pipeline {
            stage,
            name,
            source: Box::new(cause),
        }
    }
}
