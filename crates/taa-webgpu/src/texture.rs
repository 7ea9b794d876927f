use awsm_taa::{HistoryDescriptor, HistoryFormat};

pub type TextureFormat = web_sys::GpuTextureFormat;

/// WebGPU format backing a logical history format.
///
/// rg11b10ufloat can only be resolved into when the device exposes
/// `rg11b10ufloat-renderable`, otherwise the reduced history is stored as
/// rgba16float and simply never carries alpha.
pub fn history_texture_format(format: HistoryFormat, rg11b10_renderable: bool) -> TextureFormat {
    match format {
        HistoryFormat::Rgba16Float => TextureFormat::Rgba16float,
        HistoryFormat::Rg11b10Ufloat if rg11b10_renderable => TextureFormat::Rg11b10ufloat,
        HistoryFormat::Rg11b10Ufloat => TextureFormat::Rgba16float,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryTextureUsage {
    // https://rustwasm.github.io/wasm-bindgen/api/web_sys/gpu_texture_usage/index.html
    pub copy_dst: bool,
    pub copy_src: bool,
    pub render_attachment: bool,
    pub storage_binding: bool,
    pub texture_binding: bool,
}

impl HistoryTextureUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sampled by the resolve, rendered or copied into when seeding and
    /// resolving, copied out by debugging tools
    pub fn history() -> Self {
        Self::new()
            .with_texture_binding()
            .with_render_attachment()
            .with_copy_dst()
            .with_copy_src()
    }

    pub fn as_u32(&self) -> u32 {
        let mut usage = 0;
        if self.copy_dst { usage |= web_sys::gpu_texture_usage::COPY_DST; }
        if self.copy_src { usage |= web_sys::gpu_texture_usage::COPY_SRC; }
        if self.render_attachment { usage |= web_sys::gpu_texture_usage::RENDER_ATTACHMENT; }
        if self.storage_binding { usage |= web_sys::gpu_texture_usage::STORAGE_BINDING; }
        if self.texture_binding { usage |= web_sys::gpu_texture_usage::TEXTURE_BINDING; }
        usage
    }

    pub fn with_copy_dst(mut self) -> Self {
        self.copy_dst = true;
        self
    }

    pub fn with_copy_src(mut self) -> Self {
        self.copy_src = true;
        self
    }

    pub fn with_render_attachment(mut self) -> Self {
        self.render_attachment = true;
        self
    }

    pub fn with_storage_binding(mut self) -> Self {
        self.storage_binding = true;
        self
    }

    pub fn with_texture_binding(mut self) -> Self {
        self.texture_binding = true;
        self
    }
}

/// Everything needed to create one history texture.
#[derive(Debug, Clone)]
pub struct HistoryTextureDescriptor<'a> {
    pub format: TextureFormat,
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub usage: HistoryTextureUsage,
}

impl<'a> HistoryTextureDescriptor<'a> {
    pub fn new(descriptor: &'a HistoryDescriptor, rg11b10_renderable: bool) -> Self {
        Self {
            format: history_texture_format(descriptor.format, rg11b10_renderable),
            label: &descriptor.label,
            width: descriptor.width,
            height: descriptor.height,
            sample_count: HistoryDescriptor::SAMPLE_COUNT,
            usage: HistoryTextureUsage::history(),
        }
    }
}

impl From<HistoryTextureDescriptor<'_>> for web_sys::GpuTextureDescriptor {
    fn from(descriptor: HistoryTextureDescriptor) -> Self {
        // https://developer.mozilla.org/en-US/docs/Web/API/GPUDevice/createTexture#size
        let size = web_sys::GpuExtent3dDict::new(descriptor.width);
        size.set_height(descriptor.height);

        let descriptor_js =
            web_sys::GpuTextureDescriptor::new(descriptor.format, &size, descriptor.usage.as_u32());
        descriptor_js.set_label(descriptor.label);
        descriptor_js.set_sample_count(descriptor.sample_count);
        descriptor_js.set_mip_level_count(1);
        descriptor_js.set_dimension(web_sys::GpuTextureDimension::N2d);

        descriptor_js
    }
}
