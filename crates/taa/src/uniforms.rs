use crate::resolve::ResolveParams;

/// CPU side of the resolve uniform block.
///
/// ```text
/// offset  size  field
///   0      64   previous view-projection (column major)
///  64      16   jitter.xy, normalized jitter.xy
///  80      16   sharpen, anti-flicker intensity, contrast ceiling, sharpen history
///  96      16   sharpen blend, stationary blend, motion blend, pad
/// 112      16   quality (u32), feature flags (u32), frame index (u32), pad
/// ```
#[derive(Debug, Clone)]
pub struct ResolveUniforms {
    raw_data: [u8; Self::BYTE_SIZE],
    gpu_dirty: bool,
}

impl Default for ResolveUniforms {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolveUniforms {
    pub const BYTE_SIZE: usize = 128; // see `update()` for details

    pub const JITTER_OFFSET: usize = 64;
    pub const COEFFICIENTS_OFFSET: usize = 80;
    pub const BLEND_OFFSET: usize = 96;
    pub const FLAGS_OFFSET: usize = 112;

    pub fn new() -> Self {
        Self {
            raw_data: [0; Self::BYTE_SIZE],
            gpu_dirty: true,
        }
    }

    // cheap, may be called several times before the upload
    pub fn update(&mut self, params: &ResolveParams, frame_index: u32) {
        let mut offset = 0;

        write_f32_slice(
            &mut self.raw_data,
            &mut offset,
            &params.previous_view_projection.to_cols_array(),
        );

        write_f32_slice(
            &mut self.raw_data,
            &mut offset,
            &[
                params.jitter.x,
                params.jitter.y,
                params.normalized_jitter.x,
                params.normalized_jitter.y,
            ],
        );

        write_f32_slice(
            &mut self.raw_data,
            &mut offset,
            &[
                params.sharpen_strength,
                params.anti_flicker_intensity,
                params.contrast_ceiling,
                params.sharpen_history_strength,
            ],
        );

        write_f32_slice(
            &mut self.raw_data,
            &mut offset,
            &[
                params.sharpen_blend,
                params.stationary_blend,
                params.motion_blend,
                0.0,
            ],
        );

        write_u32(&mut self.raw_data, &mut offset, params.quality.as_index());
        write_u32(&mut self.raw_data, &mut offset, params.features.as_u32());
        write_u32(&mut self.raw_data, &mut offset, frame_index);
        write_u32(&mut self.raw_data, &mut offset, 0);

        debug_assert_eq!(offset, Self::BYTE_SIZE);

        self.gpu_dirty = true;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw_data
    }

    pub fn is_dirty(&self) -> bool {
        self.gpu_dirty
    }

    /// Returns the bytes if they changed since the last take.
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if self.gpu_dirty {
            self.gpu_dirty = false;
            Some(&self.raw_data)
        } else {
            None
        }
    }
}

fn write_f32_slice(buffer: &mut [u8], offset: &mut usize, values: &[f32]) {
    for value in values {
        buffer[*offset..*offset + 4].copy_from_slice(&value.to_ne_bytes());
        *offset += 4;
    }
}

fn write_u32(buffer: &mut [u8], offset: &mut usize, value: u32) {
    buffer[*offset..*offset + 4].copy_from_slice(&value.to_ne_bytes());
    *offset += 4;
}
