use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::vision::MnistDataset,
    },
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::AdamConfig,
    prelude::*,
    record::CompactRecorder,
    tensor::{backend::AutodiffBackend, ElementConversion},
    train::{
        metric::{AccuracyMetric, LossMetric},
        ClassificationOutput, LearnerBuilder, TrainOutput, TrainStep, ValidStep,
    },
};
use log::info;

use crate::{
    data::{MnistBatch, MnistBatcher},
    error::TrainError,
    metadata::{metadata_path, ModelMetadata},
    model::{Model, ModelConfig},
};

/// Name the weight file and metadata sidecar are derived from.
pub const MODEL_NAME: &str = "mnist";
/// Where training writes and inference reads by default.
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts/mnist";

#[derive(Config)]
pub struct TrainingConfig {
    pub model: ModelConfig,
    pub optimizer: AdamConfig,
    #[config(default = 2)]
    pub num_epochs: usize,
    #[config(default = 32)]
    pub batch_size: usize,
    #[config(default = 4)]
    pub num_workers: usize,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 1.0e-3)]
    pub learning_rate: f64,
}

/// End-of-training evaluation over both splits. Feeds the metadata sidecar
/// and nothing else.
#[derive(Debug, Clone, Copy)]
pub struct TrainingSummary {
    pub train_loss: f32,
    pub train_accuracy: f32,
    pub valid_loss: f32,
    pub valid_accuracy: f32,
}

/// Weight file path (without the recorder's extension) for a given epoch
/// count, e.g. `artifacts/mnist/mnist-0002`.
pub fn weights_stem(artifact_dir: &str, num_epochs: usize) -> PathBuf {
    Path::new(artifact_dir).join(format!("{MODEL_NAME}-{num_epochs:04}"))
}

impl<B: Backend> Model<B> {
    pub fn forward_classification(
        &self,
        images: Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput::new(loss, output, targets)
    }
}

impl<B: AutodiffBackend> TrainStep<MnistBatch<B>, ClassificationOutput<B>> for Model<B> {
    fn step(&self, batch: MnistBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        let item = self.forward_classification(batch.images, batch.targets);

        TrainOutput::new(self, item.loss.backward(), item)
    }
}

impl<B: Backend> ValidStep<MnistBatch<B>, ClassificationOutput<B>> for Model<B> {
    fn step(&self, batch: MnistBatch<B>) -> ClassificationOutput<B> {
        self.forward_classification(batch.images, batch.targets)
    }
}

/// Fits the model on MNIST and persists config, weights and metadata into
/// `artifact_dir`.
///
/// The loss, evaluators, checkpointing and the epoch loop itself are the
/// engine's; this function wires them up, then runs one evaluation pass
/// over both splits to stamp the metadata sidecar.
pub fn train<B: AutodiffBackend>(
    artifact_dir: &str,
    config: TrainingConfig,
    device: B::Device,
) -> Result<TrainingSummary, TrainError> {
    create_artifact_dir(artifact_dir)?;
    config.save(format!("{artifact_dir}/config.json"))?;

    B::seed(config.seed);

    let batcher_train = MnistBatcher::<B>::new(device.clone());
    let batcher_valid = MnistBatcher::<B::InnerBackend>::new(device.clone());

    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(MnistDataset::train());

    let dataloader_test = DataLoaderBuilder::new(batcher_valid.clone())
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(MnistDataset::test());

    info!(
        "starting MNIST training: {} epochs, batch size {}, artifacts in {artifact_dir}",
        config.num_epochs, config.batch_size
    );

    let learner = LearnerBuilder::new(artifact_dir)
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(vec![device.clone()])
        .num_epochs(config.num_epochs)
        .summary()
        .build(
            config.model.init::<B>(&device),
            config.optimizer.init(),
            config.learning_rate,
        );

    let model_trained = learner.fit(dataloader_train, dataloader_test);

    // Metrics for the metadata sidecar come from a plain evaluation pass
    // after the loop; no save-listener callback needed.
    let model_valid = model_trained.valid();
    let (train_loss, train_accuracy) = evaluate(
        &model_valid,
        DataLoaderBuilder::new(batcher_valid.clone())
            .batch_size(config.batch_size)
            .build(MnistDataset::train()),
    );
    let (valid_loss, valid_accuracy) = evaluate(
        &model_valid,
        DataLoaderBuilder::new(batcher_valid)
            .batch_size(config.batch_size)
            .build(MnistDataset::test()),
    );
    let summary = TrainingSummary {
        train_loss,
        train_accuracy,
        valid_loss,
        valid_accuracy,
    };

    let weights = weights_stem(artifact_dir, config.num_epochs);
    model_trained
        .save_file(weights.clone(), &CompactRecorder::new())
        .map_err(|err| TrainError::Record {
            path: weights.clone(),
            reason: err.to_string(),
        })?;

    ModelMetadata::new(config.num_epochs, &summary).save(&metadata_path(artifact_dir, MODEL_NAME))?;

    info!(
        "model saved to {} (validation accuracy {:.4}, loss {:.4})",
        weights.display(),
        summary.valid_accuracy,
        summary.valid_loss
    );

    Ok(summary)
}

fn create_artifact_dir(artifact_dir: &str) -> Result<(), TrainError> {
    // Stale checkpoints from a previous run would confuse the learner.
    if Path::new(artifact_dir).exists() {
        fs::remove_dir_all(artifact_dir)?;
    }
    fs::create_dir_all(artifact_dir)?;
    Ok(())
}

fn evaluate<B: Backend>(
    model: &Model<B>,
    loader: Arc<dyn DataLoader<MnistBatch<B>>>,
) -> (f32, f32) {
    let mut total_loss = 0.0f64;
    let mut total_correct = 0usize;
    let mut total_items = 0usize;

    for batch in loader.iter() {
        let output = model.forward_classification(batch.images, batch.targets);
        let batch_items = output.targets.dims()[0];

        let loss = output.loss.into_scalar().elem::<f32>();
        total_loss += loss as f64 * batch_items as f64;

        let predictions = output.output.argmax(1).squeeze::<1>(1);
        let correct = predictions
            .equal(output.targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;

        total_correct += correct;
        total_items += batch_items;
    }

    (
        (total_loss / total_items as f64) as f32,
        total_correct as f32 / total_items as f32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_run() {
        let config = TrainingConfig::new(ModelConfig::new(), AdamConfig::new());
        assert_eq!(config.num_epochs, 2);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn weight_files_are_named_by_model_and_epoch_count() {
        let stem = weights_stem("artifacts/mnist", 2);
        assert!(stem.ends_with("mnist-0002"));
    }
}
