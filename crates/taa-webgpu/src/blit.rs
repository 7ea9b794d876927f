//! Fullscreen blit used to seed history when the color target and the
//! history texture differ in format, which rules out a texture copy.

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::{
    error::{AwsmWebGpuError, Result},
    texture::TextureFormat,
};

static SHADER_SOURCE: &str = r#"
    @group(0) @binding(0) var src_tex: texture_2d<f32>;

    struct FragmentInput {
        @builtin(position) full_screen_quad_position: vec4<f32>,
    }

    @vertex
    fn vert_main(@builtin(vertex_index) vertex_index: u32) -> FragmentInput {
        var out: FragmentInput;

        // oversized triangle: 0 -> (-1,-1), 1 -> (3,-1), 2 -> (-1,3)
        let x = f32((vertex_index << 1u) & 2u) * 2.0 - 1.0;
        let y = f32(vertex_index & 2u) * 2.0 - 1.0;

        out.full_screen_quad_position = vec4<f32>(x, y, 0.0, 1.0);

        return out;
    }

    @fragment
    fn frag_main(in: FragmentInput) -> @location(0) vec4<f32> {
        let coords = vec2<i32>(in.full_screen_quad_position.xy);

        return textureLoad(src_tex, coords, 0);
    }
"#;

/// Blit pipeline rendering into one destination format.
#[derive(Debug, Clone)]
pub struct SeedBlitPipeline {
    pub dst_format: TextureFormat,
    pub render_pipeline: web_sys::GpuRenderPipeline,
    pub bind_group_layout: web_sys::GpuBindGroupLayout,
}

impl SeedBlitPipeline {
    pub async fn new(device: &web_sys::GpuDevice, dst_format: TextureFormat) -> Result<Self> {
        let shader_descriptor = web_sys::GpuShaderModuleDescriptor::new(SHADER_SOURCE);
        shader_descriptor.set_label("TAA seed blit shader");
        let shader_module = device.create_shader_module(&shader_descriptor);

        let vertex = web_sys::GpuVertexState::new(&shader_module);
        vertex.set_entry_point("vert_main");

        let targets = js_sys::Array::of1(&web_sys::GpuColorTargetState::new(dst_format));
        let fragment = web_sys::GpuFragmentState::new(&shader_module, &targets);
        fragment.set_entry_point("frag_main");

        let pipeline_descriptor =
            web_sys::GpuRenderPipelineDescriptor::new(&JsValue::from_str("auto"), &vertex);
        pipeline_descriptor.set_label("TAA seed blit");
        pipeline_descriptor.set_fragment(&fragment);

        let render_pipeline: web_sys::GpuRenderPipeline =
            JsFuture::from(device.create_render_pipeline_async(&pipeline_descriptor))
                .await
                .map_err(AwsmWebGpuError::pipeline_creation)?
                .unchecked_into();

        let bind_group_layout = render_pipeline.get_bind_group_layout(0);

        Ok(Self {
            dst_format,
            render_pipeline,
            bind_group_layout,
        })
    }

    /// Records a pass drawing `src` over the whole of `dst`.
    pub fn encode(
        &self,
        device: &web_sys::GpuDevice,
        encoder: &web_sys::GpuCommandEncoder,
        src: &web_sys::GpuTexture,
        dst: &web_sys::GpuTexture,
    ) -> Result<()> {
        let src_view = src.create_view().map_err(AwsmWebGpuError::texture_view)?;
        let dst_view = dst.create_view().map_err(AwsmWebGpuError::texture_view)?;

        let entries = js_sys::Array::of1(&web_sys::GpuBindGroupEntry::new(0, &src_view));
        let bind_group_descriptor =
            web_sys::GpuBindGroupDescriptor::new(&entries, &self.bind_group_layout);
        bind_group_descriptor.set_label("TAA seed blit bind group");
        let bind_group = device.create_bind_group(&bind_group_descriptor);

        let color_attachments = js_sys::Array::of1(&web_sys::GpuRenderPassColorAttachment::new(
            web_sys::GpuLoadOp::Clear,
            web_sys::GpuStoreOp::Store,
            &dst_view,
        ));
        let pass_descriptor = web_sys::GpuRenderPassDescriptor::new(&color_attachments);
        pass_descriptor.set_label("TAA seed blit pass");

        let render_pass = encoder
            .begin_render_pass(&pass_descriptor)
            .map_err(AwsmWebGpuError::command_render_pass)?;

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, Some(&bind_group));
        render_pass.draw(3);
        render_pass.end();

        Ok(())
    }
}
