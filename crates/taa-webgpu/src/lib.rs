//! WebGPU backend for [awsm_taa].
//!
//! [WebGpuHistoryBackend] allocates, seeds and destroys history textures on a
//! `GpuDevice`, and [ResolveUniformBuffer] uploads the per-camera resolve
//! parameters for the filtering kernel.

pub mod backend;
pub mod blit;
pub mod error;
pub mod texture;
pub mod uniform_buffer;

pub mod taa {
    pub use awsm_taa::*;
}

pub use backend::WebGpuHistoryBackend;
pub use error::{AwsmWebGpuError, Result};
pub use uniform_buffer::ResolveUniformBuffer;

/// TAA feature instance over WebGPU textures.
pub type AwsmTaaWebGpu = awsm_taa::AwsmTaa<web_sys::GpuTexture>;
