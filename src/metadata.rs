use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{error::TrainError, training::TrainingSummary};

/// Descriptive sidecar written next to the weights at the end of training.
///
/// Free-form by design: nothing at inference time depends on these values,
/// they exist so a human (or a model registry) can tell what a weight file
/// is without loading it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub architecture: String,
    pub epochs: usize,
    pub training_loss: f32,
    pub training_accuracy: f32,
    pub validation_loss: f32,
    pub validation_accuracy: f32,
    /// RFC 3339 UTC timestamp of the end of training.
    pub timestamp: String,
}

impl ModelMetadata {
    pub fn new(epochs: usize, summary: &TrainingSummary) -> Self {
        Self {
            architecture: "MLP".to_string(),
            epochs,
            training_loss: summary.train_loss,
            training_accuracy: summary.train_accuracy,
            validation_loss: summary.valid_loss,
            validation_accuracy: summary.valid_accuracy,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), TrainError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, TrainError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Path of the metadata sidecar for a given artifact directory.
pub fn metadata_path(artifact_dir: &str, model_name: &str) -> PathBuf {
    Path::new(artifact_dir).join(format!("{model_name}-metadata.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_round_trips_through_json() {
        let summary = TrainingSummary {
            train_loss: 0.12,
            train_accuracy: 0.965,
            valid_loss: 0.15,
            valid_accuracy: 0.951,
        };
        let metadata = ModelMetadata::new(2, &summary);

        let json = serde_json::to_string(&metadata).unwrap();
        let restored: ModelMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.architecture, "MLP");
        assert_eq!(restored.epochs, 2);
        assert_eq!(restored.validation_accuracy, metadata.validation_accuracy);
        assert_eq!(restored.timestamp, metadata.timestamp);
    }

    #[test]
    fn sidecar_is_named_after_the_model() {
        let path = metadata_path("artifacts/mnist", "mnist");
        assert!(path.ends_with("mnist-metadata.json"));
    }
}
