use awsm_taa::{AwsmTaaLogging, CameraTaaFrame, ResolveUniforms};

use crate::error::{AwsmWebGpuError, Result};

/// GPU copy of [ResolveUniforms], one per camera.
pub struct ResolveUniformBuffer {
    uniforms: ResolveUniforms,
    pub gpu_buffer: web_sys::GpuBuffer,
}

impl ResolveUniformBuffer {
    pub fn new(device: &web_sys::GpuDevice) -> Result<Self> {
        let descriptor = web_sys::GpuBufferDescriptor::new(
            ResolveUniforms::BYTE_SIZE as f64,
            web_sys::gpu_buffer_usage::UNIFORM | web_sys::gpu_buffer_usage::COPY_DST,
        );
        descriptor.set_label("TAA resolve uniforms");

        let gpu_buffer = device
            .create_buffer(&descriptor)
            .map_err(AwsmWebGpuError::buffer_creation)?;

        Ok(Self {
            uniforms: ResolveUniforms::new(),
            gpu_buffer,
        })
    }

    pub fn update<T>(&mut self, frame: &CameraTaaFrame<'_, T>) {
        frame.write_uniforms(&mut self.uniforms);
    }

    pub fn uniforms(&self) -> &ResolveUniforms {
        &self.uniforms
    }

    // only writes when the data changed since the last write
    pub fn write_gpu(&mut self, logging: &AwsmTaaLogging, queue: &web_sys::GpuQueue) -> Result<()> {
        if let Some(bytes) = self.uniforms.take_dirty() {
            let _maybe_span_guard = if logging.frame_timings {
                Some(tracing::span!(tracing::Level::INFO, "TAA uniforms GPU write").entered())
            } else {
                None
            };

            queue
                .write_buffer_with_f64_and_u8_slice(&self.gpu_buffer, 0.0, bytes)
                .map_err(AwsmWebGpuError::buffer_write)?;
        }

        Ok(())
    }
}
