//! Error types for blueprint3d

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlueprintError {
    #[error("{what} not found: {}", .path.display())]
    ResourceNotFound { what: &'static str, path: PathBuf },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Debug directory is not empty: {}", .0.display())]
    DebugDirNotEmpty(PathBuf),

    #[error("Font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BlueprintError {
    pub fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        BlueprintError::ResourceNotFound {
            what,
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BlueprintError>;
