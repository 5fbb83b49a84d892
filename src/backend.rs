//! Backend selection behind feature flags, the same way the engine's own
//! example applications pick their backend.

#[cfg(not(any(feature = "ndarray", feature = "wgpu")))]
compile_error!("enable at least one backend feature: `ndarray` or `wgpu`");

#[cfg(feature = "ndarray")]
mod select {
    use burn::backend::ndarray::NdArrayDevice;

    pub type Inference = burn::backend::NdArray;

    pub fn device() -> NdArrayDevice {
        NdArrayDevice::Cpu
    }
}

#[cfg(all(feature = "wgpu", not(feature = "ndarray")))]
mod select {
    use burn::backend::wgpu::WgpuDevice;

    pub type Inference = burn::backend::Wgpu;

    pub fn device() -> WgpuDevice {
        WgpuDevice::default()
    }
}

pub use select::{device, Inference};

/// Autodiff-decorated backend used by the trainer.
pub type Train = burn::backend::Autodiff<Inference>;
