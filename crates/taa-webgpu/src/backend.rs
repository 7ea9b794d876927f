use awsm_taa::{AwsmTaaLogging, HistoryBackend, HistoryDescriptor, HistoryFormat};

use crate::{
    blit::SeedBlitPipeline,
    error::{AwsmWebGpuError, Result},
    texture::{history_texture_format, HistoryTextureDescriptor, TextureFormat},
};

/// Device feature that makes rg11b10ufloat usable as a render target.
pub const RG11B10_RENDERABLE_FEATURE: &str = "rg11b10ufloat-renderable";

/// [HistoryBackend] over a WebGPU device.
///
/// The color target passed to `prepare_camera` must be created with
/// `COPY_SRC` (same format as history) or `TEXTURE_BINDING` (otherwise).
pub struct WebGpuHistoryBackend {
    device: web_sys::GpuDevice,
    color_format: TextureFormat,
    rg11b10_renderable: bool,
    rgba16float_history: bool,
    blit_pipelines: Vec<SeedBlitPipeline>,
    logging: AwsmTaaLogging,
}

impl WebGpuHistoryBackend {
    /// `color_format` is the format of the color target history is seeded from.
    pub async fn new(device: web_sys::GpuDevice, color_format: TextureFormat) -> Result<Self> {
        let rg11b10_renderable = device.features().has(RG11B10_RENDERABLE_FEATURE);

        let mut blit_pipelines = Vec::new();
        for format in [HistoryFormat::Rgba16Float, HistoryFormat::Rg11b10Ufloat] {
            let dst_format = history_texture_format(format, rg11b10_renderable);
            if dst_format != color_format
                && !blit_pipelines
                    .iter()
                    .any(|pipeline: &SeedBlitPipeline| pipeline.dst_format == dst_format)
            {
                blit_pipelines.push(SeedBlitPipeline::new(&device, dst_format).await?);
            }
        }

        tracing::debug!(
            "TAA history backend: color {color_format:?}, rg11b10 renderable: {rg11b10_renderable}"
        );

        Ok(Self {
            device,
            color_format,
            rg11b10_renderable,
            rgba16float_history: true,
            blit_pipelines,
            logging: AwsmTaaLogging::default(),
        })
    }

    /// rgba16float is core WebGPU, but it can be turned off to halve
    /// history bandwidth at the cost of the alpha channel.
    pub fn with_rgba16float_history(mut self, enabled: bool) -> Self {
        self.rgba16float_history = enabled;
        self
    }

    pub fn with_logging(mut self, logging: AwsmTaaLogging) -> Self {
        self.logging = logging;
        self
    }

    pub fn device(&self) -> &web_sys::GpuDevice {
        &self.device
    }

    pub fn color_format(&self) -> TextureFormat {
        self.color_format
    }

    pub fn texture_format(&self, format: HistoryFormat) -> TextureFormat {
        history_texture_format(format, self.rg11b10_renderable)
    }

    fn create_texture(&self, descriptor: &HistoryDescriptor) -> Result<web_sys::GpuTexture> {
        let descriptor = HistoryTextureDescriptor::new(descriptor, self.rg11b10_renderable);
        self.device
            .create_texture(&descriptor.into())
            .map_err(AwsmWebGpuError::texture_creation)
    }

    fn encode_seed(
        &self,
        encoder: &web_sys::GpuCommandEncoder,
        source: &web_sys::GpuTexture,
        dest: &web_sys::GpuTexture,
        descriptor: &HistoryDescriptor,
    ) -> Result<()> {
        let dst_format = self.texture_format(descriptor.format);

        if dst_format == self.color_format {
            let size = web_sys::GpuExtent3dDict::new(descriptor.width);
            size.set_height(descriptor.height);

            encoder
                .copy_texture_to_texture_with_gpu_extent_3d_dict(
                    &web_sys::GpuTexelCopyTextureInfo::new(source),
                    &web_sys::GpuTexelCopyTextureInfo::new(dest),
                    &size,
                )
                .map_err(AwsmWebGpuError::command_copy_texture_to_texture)
        } else {
            self.blit_pipelines
                .iter()
                .find(|pipeline| pipeline.dst_format == dst_format)
                .ok_or(AwsmWebGpuError::MissingBlitPipeline(dst_format))?
                .encode(&self.device, encoder, source, dest)
        }
    }
}

impl HistoryBackend for WebGpuHistoryBackend {
    type Texture = web_sys::GpuTexture;

    fn supports_rgba16float_history(&self) -> bool {
        self.rgba16float_history
    }

    fn allocate(
        &mut self,
        descriptor: &HistoryDescriptor,
    ) -> awsm_taa::Result<web_sys::GpuTexture> {
        let texture = self.create_texture(descriptor)?;

        if self.logging.allocations {
            tracing::info!(
                "allocated {} {}x{} {:?}",
                descriptor.label,
                descriptor.width,
                descriptor.height,
                self.texture_format(descriptor.format)
            );
        }

        Ok(texture)
    }

    fn seed(
        &mut self,
        source: &web_sys::GpuTexture,
        dest: &web_sys::GpuTexture,
        descriptor: &HistoryDescriptor,
    ) -> awsm_taa::Result<()> {
        let encoder_descriptor = web_sys::GpuCommandEncoderDescriptor::new();
        encoder_descriptor.set_label("TAA history seed");
        let encoder = self
            .device
            .create_command_encoder_with_descriptor(&encoder_descriptor);

        self.encode_seed(&encoder, source, dest, descriptor)?;

        if self.logging.allocations {
            tracing::info!(
                "seeding {} from {} ({})",
                descriptor.label,
                source.label(),
                if self.texture_format(descriptor.format) == self.color_format {
                    "copy"
                } else {
                    "blit"
                }
            );
        }

        self.device
            .queue()
            .submit(&js_sys::Array::of1(&encoder.finish()));

        Ok(())
    }

    fn release(&mut self, texture: web_sys::GpuTexture) {
        if self.logging.allocations {
            tracing::info!(
                "releasing {} {}x{}",
                texture.label(),
                texture.width(),
                texture.height()
            );
        }
        texture.destroy();
    }
}
