use std::path::Path;

use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use log::info;

use crate::{
    error::PredictError,
    metadata::{metadata_path, ModelMetadata},
    model::{Model, IMAGE_HEIGHT, IMAGE_WIDTH},
    training::{weights_stem, TrainingConfig, MODEL_NAME},
    translator::{self, Classifications},
};

/// Classifies a single image file against the weights persisted in
/// `artifact_dir`.
///
/// The model is rebuilt from the persisted training config, so the
/// topology always matches the one the weights were trained with.
pub fn predict<B: Backend>(
    artifact_dir: &str,
    image_path: &Path,
    device: &B::Device,
) -> Result<Classifications, PredictError> {
    let config_path = format!("{artifact_dir}/config.json");
    let config = TrainingConfig::load(&config_path).map_err(|err| PredictError::Config {
        path: config_path.into(),
        reason: err.to_string(),
    })?;

    let weights = weights_stem(artifact_dir, config.num_epochs);
    if !weights.with_extension("mpk").exists() {
        return Err(PredictError::ModelNotFound(weights.with_extension("mpk")));
    }
    info!("found model parameters at {}", weights.display());

    let record = CompactRecorder::new()
        .load(weights.clone(), device)
        .map_err(|err| PredictError::Record {
            path: weights,
            reason: err.to_string(),
        })?;
    let model: Model<B> = config.model.init::<B>(device).load_record(record);

    if let Ok(metadata) = ModelMetadata::load(&metadata_path(artifact_dir, MODEL_NAME)) {
        info!(
            "loaded {} model trained {} (validation accuracy {:.4})",
            metadata.architecture, metadata.timestamp, metadata.validation_accuracy
        );
    }

    info!("loading image {}", image_path.display());
    let image = image::open(image_path).map_err(|err| PredictError::Image {
        path: image_path.to_path_buf(),
        source: err,
    })?;

    let input = translator::image_to_input(&image);
    let input = Tensor::<B, 2>::from_data(
        TensorData::new(input, [1, IMAGE_HEIGHT * IMAGE_WIDTH]),
        device,
    );

    let output = model.forward(input);
    let scores = output
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|err| PredictError::Translate(format!("failed to read model output: {err:?}")))?;

    Ok(Classifications::from_scores(
        translator::digit_labels(),
        &scores,
    ))
}
