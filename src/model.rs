use burn::{
    nn::{Linear, LinearConfig, Relu},
    prelude::*,
};

/// Height of a dataset image in pixels.
pub const IMAGE_HEIGHT: usize = 28;
/// Width of a dataset image in pixels.
pub const IMAGE_WIDTH: usize = 28;
/// Number of digit classes.
pub const NUM_CLASSES: usize = 10;

/// Shape of the multilayer perceptron.
///
/// The defaults reproduce the 784 → 128 → 64 → 10 topology the weights are
/// trained with. The inference site rebuilds the model from the persisted
/// copy of this config, so both sites always agree on the topology.
#[derive(Config, Debug)]
pub struct ModelConfig {
    #[config(default = 128)]
    pub hidden1: usize,
    #[config(default = 64)]
    pub hidden2: usize,
}

/// Fully connected digit classifier.
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    hidden1: Linear<B>,
    hidden2: Linear<B>,
    output: Linear<B>,
    activation: Relu,
}

impl ModelConfig {
    /// Returns an initialized model on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        Model {
            hidden1: LinearConfig::new(IMAGE_HEIGHT * IMAGE_WIDTH, self.hidden1).init(device),
            hidden2: LinearConfig::new(self.hidden1, self.hidden2).init(device),
            output: LinearConfig::new(self.hidden2, NUM_CLASSES).init(device),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> Model<B> {
    /// Maps flattened images `[batch, 784]` to class logits `[batch, 10]`.
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.hidden1.forward(images));
        let x = self.activation.forward(self.hidden2.forward(x));
        self.output.forward(x)
    }
}
