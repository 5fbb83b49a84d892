//! MNIST digit classification on top of the [Burn](https://burn.dev) engine.
//!
//! The crate is orchestration, not machine learning plumbing: tensor math,
//! autograd, the fit loop, dataset download and the weight codec all belong
//! to Burn. What lives here is the model shape (784 → 128 → 64 → 10), the
//! training configuration, the persistence of weights plus a metadata
//! sidecar, and an inference pipeline whose only bespoke algorithm is the
//! image translator in [`translator`].
//!
//! Two binaries drive it: `train` (no arguments) fits the model and writes
//! the artifact directory, `predict <image-path>` classifies a single image
//! file against the persisted weights.

pub mod backend;
pub mod data;
pub mod error;
pub mod inference;
pub mod metadata;
pub mod model;
pub mod training;
pub mod translator;
