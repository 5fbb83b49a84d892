use burn::{
    data::{dataloader::batcher::Batcher, dataset::vision::MnistItem},
    prelude::*,
    tensor::ElementConversion,
};

use crate::model::{IMAGE_HEIGHT, IMAGE_WIDTH};

/// Turns dataset items into batched tensors on a fixed device.
#[derive(Clone)]
pub struct MnistBatcher<B: Backend> {
    device: B::Device,
}

/// One batch of flattened images and their integer labels.
#[derive(Clone, Debug)]
pub struct MnistBatch<B: Backend> {
    /// Images `[batch, 784]`, intensities scaled to [0, 1].
    pub images: Tensor<B, 2>,
    /// Digit labels `[batch]`.
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> MnistBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<MnistItem, MnistBatch<B>> for MnistBatcher<B> {
    fn batch(&self, items: Vec<MnistItem>) -> MnistBatch<B> {
        // Plain [0, 1] scaling, matching what the inference translator feeds
        // the model. No mean/std standardization.
        let images = items
            .iter()
            .map(|item| TensorData::from(item.image).convert::<B::FloatElem>())
            .map(|data| Tensor::<B, 2>::from_data(data, &self.device))
            .map(|tensor| tensor.reshape([1, IMAGE_HEIGHT * IMAGE_WIDTH]))
            .map(|tensor| tensor / 255)
            .collect();

        let targets = items
            .iter()
            .map(|item| {
                Tensor::<B, 1, Int>::from_data(
                    TensorData::from([(item.label as i64).elem::<B::IntElem>()]),
                    &self.device,
                )
            })
            .collect();

        let images = Tensor::cat(images, 0);
        let targets = Tensor::cat(targets, 0);

        MnistBatch { images, targets }
    }
}

#[cfg(all(test, feature = "ndarray"))]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn item(intensity: f32, label: u8) -> MnistItem {
        MnistItem {
            image: [[intensity; IMAGE_WIDTH]; IMAGE_HEIGHT],
            label,
        }
    }

    #[test]
    fn batches_items_into_flat_normalized_tensors() {
        let batcher = MnistBatcher::<TestBackend>::new(Default::default());

        let batch = batcher.batch(vec![item(255.0, 7), item(0.0, 3)]);

        assert_eq!(batch.images.dims(), [2, IMAGE_HEIGHT * IMAGE_WIDTH]);
        assert_eq!(batch.targets.dims(), [2]);

        let images = batch.images.into_data().convert::<f32>();
        let images = images.to_vec::<f32>().unwrap();
        assert!(images[..IMAGE_HEIGHT * IMAGE_WIDTH]
            .iter()
            .all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(images[IMAGE_HEIGHT * IMAGE_WIDTH..]
            .iter()
            .all(|&v| v.abs() < 1e-6));

        let targets = batch.targets.into_data().convert::<i64>();
        assert_eq!(targets.to_vec::<i64>().unwrap(), vec![7, 3]);
    }
}
