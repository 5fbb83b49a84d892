use std::{env, path::PathBuf, process};

use log::error;

use mnist_trainer::{backend, inference, training::DEFAULT_ARTIFACT_DIR};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = env::args().skip(1);
    let (Some(image_path), None) = (args.next(), args.next()) else {
        eprintln!("usage: predict <image-path>");
        process::exit(1);
    };
    let image_path = PathBuf::from(image_path);

    let device = backend::device();
    match inference::predict::<backend::Inference>(DEFAULT_ARTIFACT_DIR, &image_path, &device) {
        Ok(result) => {
            println!("prediction result:\n{result}");
            if let Some(best) = result.best() {
                println!(
                    "best class: {} (probability: {:.2}%)",
                    best.class_name,
                    best.probability * 100.0
                );
            }
        }
        Err(err) => {
            error!("{err}");
            process::exit(1);
        }
    }
}
