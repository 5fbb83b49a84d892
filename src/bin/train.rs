use burn::optim::AdamConfig;
use log::{error, info};

use mnist_trainer::{
    backend,
    model::ModelConfig,
    training::{self, TrainingConfig, DEFAULT_ARTIFACT_DIR},
};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = TrainingConfig::new(ModelConfig::new(), AdamConfig::new());
    let device = backend::device();

    match training::train::<backend::Train>(DEFAULT_ARTIFACT_DIR, config, device) {
        Ok(summary) => info!(
            "training finished: train accuracy {:.4}, validation accuracy {:.4}",
            summary.train_accuracy, summary.valid_accuracy
        ),
        Err(err) => {
            error!("training failed: {err}");
            std::process::exit(1);
        }
    }
}
