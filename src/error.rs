use std::path::PathBuf;

use thiserror::Error;

/// Failures while fitting and persisting the model.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("i/o error during training: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize metadata sidecar: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("failed to save model record to {path}: {reason}")]
    Record { path: PathBuf, reason: String },
}

/// Failures while classifying a single image.
///
/// The three families the binaries report distinctly: problems with the
/// input image, problems with the persisted model, and problems translating
/// data in or out of the engine.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("failed to read input image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("model parameters not found at {0}; run the trainer first")]
    ModelNotFound(PathBuf),

    #[error("failed to load training config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("failed to load model record {path}: {reason}")]
    Record { path: PathBuf, reason: String },

    #[error("translation failed: {0}")]
    Translate(String),
}
