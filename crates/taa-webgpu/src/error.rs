use std::sync::LazyLock;

use awsm_taa::AwsmTaaError;
use thiserror::Error;
use wasm_bindgen::prelude::*;

pub type Result<T> = std::result::Result<T, AwsmWebGpuError>;

#[derive(Error, Debug)]
pub enum AwsmWebGpuError {
    #[error("Failed to create WebGPU Texture: {0}")]
    TextureCreation(String),

    #[error("Failed to create WebGPU Texture View: {0}")]
    TextureView(String),

    #[error("Failed to create WebGPU Pipeline from valid descriptor: {0}")]
    PipelineCreation(String),

    #[error("Failed to create WebGPU RenderPass Command: {0}")]
    CommandRenderPass(String),

    #[error("WebGPU failed copy texture to texture command: {0}")]
    CommandCopyTextureToTexture(String),

    #[error("WebGPU failed create buffer: {0}")]
    BufferCreation(String),

    #[error("WebGPU failed write buffer: {0}")]
    BufferWrite(String),

    #[error("No seed blit pipeline for {0:?}")]
    MissingBlitPipeline(web_sys::GpuTextureFormat),
}

static ERROR_UNKNOWN: LazyLock<String> = LazyLock::new(|| "Unknown error".to_string());

impl AwsmWebGpuError {
    pub fn texture_creation(err: JsValue) -> Self {
        Self::TextureCreation(err.as_string().unwrap_or_else(|| ERROR_UNKNOWN.clone()))
    }

    pub fn texture_view(err: JsValue) -> Self {
        Self::TextureView(err.as_string().unwrap_or_else(|| ERROR_UNKNOWN.clone()))
    }

    pub fn pipeline_creation(err: JsValue) -> Self {
        match err.dyn_into::<web_sys::GpuPipelineError>() {
            Ok(err) => {
                let reason = match err.reason() {
                    web_sys::GpuPipelineErrorReason::Validation => "Validation",
                    web_sys::GpuPipelineErrorReason::Internal => "Internal",
                    _ => "Unknown",
                };

                Self::PipelineCreation(format!(
                    "Pipeline creation [{}] error: {}",
                    reason,
                    err.message()
                ))
            }
            Err(err) => {
                Self::PipelineCreation(err.as_string().unwrap_or_else(|| ERROR_UNKNOWN.clone()))
            }
        }
    }

    pub fn command_render_pass(err: JsValue) -> Self {
        Self::CommandRenderPass(err.as_string().unwrap_or_else(|| ERROR_UNKNOWN.clone()))
    }

    pub fn command_copy_texture_to_texture(err: JsValue) -> Self {
        Self::CommandCopyTextureToTexture(err.as_string().unwrap_or_else(|| ERROR_UNKNOWN.clone()))
    }

    pub fn buffer_creation(err: JsValue) -> Self {
        Self::BufferCreation(err.as_string().unwrap_or_else(|| ERROR_UNKNOWN.clone()))
    }

    pub fn buffer_write(err: JsValue) -> Self {
        Self::BufferWrite(err.as_string().unwrap_or_else(|| ERROR_UNKNOWN.clone()))
    }
}

impl From<AwsmWebGpuError> for AwsmTaaError {
    fn from(err: AwsmWebGpuError) -> Self {
        AwsmTaaError::backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_into_backend_error() {
        let err: AwsmTaaError =
            AwsmWebGpuError::TextureCreation("out of memory".to_string()).into();
        match err {
            AwsmTaaError::Backend(message) => {
                assert_eq!(message, "Failed to create WebGPU Texture: out of memory");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
