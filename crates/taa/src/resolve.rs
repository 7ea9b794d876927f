//! Per-frame parameters for the resolve kernel.

use glam::{Mat4, Vec2};

use crate::{
    camera::CameraKind,
    history::HistoryFormat,
    settings::{TaaQuality, TaaSettings},
};

/// Independent kernel code paths. Any combination is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResolveFeatures {
    pub motion_vectors: bool,
    /// Tonemap before blending
    pub tonemap: bool,
    pub bicubic: bool,
    /// History carries an extra alpha channel
    pub alpha_history: bool,
}

impl ResolveFeatures {
    pub const MOTION_VECTORS: u32 = 1 << 0;
    pub const TONEMAP: u32 = 1 << 1;
    pub const BICUBIC: u32 = 1 << 2;
    pub const ALPHA_HISTORY: u32 = 1 << 3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_u32(&self) -> u32 {
        let mut flags = 0;
        if self.motion_vectors { flags |= Self::MOTION_VECTORS; }
        if self.tonemap { flags |= Self::TONEMAP; }
        if self.bicubic { flags |= Self::BICUBIC; }
        if self.alpha_history { flags |= Self::ALPHA_HISTORY; }
        flags
    }

    pub fn with_motion_vectors(mut self) -> Self {
        self.motion_vectors = true;
        self
    }

    pub fn with_tonemap(mut self) -> Self {
        self.tonemap = true;
        self
    }

    pub fn with_bicubic(mut self) -> Self {
        self.bicubic = true;
        self
    }

    pub fn with_alpha_history(mut self) -> Self {
        self.alpha_history = true;
        self
    }
}

/// Per-camera values the settings alone don't determine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveInputs {
    pub previous_view_projection: Mat4,
    /// Pixels
    pub jitter: Vec2,
    /// Jitter divided by target resolution
    pub normalized_jitter: Vec2,
    pub camera_kind: CameraKind,
    pub history_format: HistoryFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolveParams {
    pub previous_view_projection: Mat4,
    pub jitter: Vec2,
    pub normalized_jitter: Vec2,
    pub sharpen_strength: f32,
    pub anti_flicker_intensity: f32,
    pub contrast_ceiling: f32,
    pub sharpen_history_strength: f32,
    pub sharpen_blend: f32,
    pub stationary_blend: f32,
    pub motion_blend: f32,
    pub quality: TaaQuality,
    pub features: ResolveFeatures,
}

impl ResolveParams {
    pub const MAX_ANTI_FLICKER_INTENSITY: f32 = 3.5;
    pub const BASE_CONTRAST_CEILING: f32 = 0.7;
    pub const CONTRAST_CEILING_REDUCTION: f32 = 0.3;

    /// Total function of the settings (sanitized first) and the per-camera inputs.
    pub fn compute(settings: &TaaSettings, inputs: ResolveInputs) -> Self {
        let settings = settings.sanitized();
        let anti_flicker = settings.anti_flicker;

        let features = ResolveFeatures {
            motion_vectors: settings.use_motion_vectors && !inputs.camera_kind.is_scene_preview(),
            tonemap: settings.use_tonemapping,
            bicubic: settings.use_bicubic,
            alpha_history: inputs.history_format.has_alpha(),
        };

        Self {
            previous_view_projection: inputs.previous_view_projection,
            jitter: inputs.jitter,
            normalized_jitter: inputs.normalized_jitter,
            sharpen_strength: settings.sharpen_strength,
            anti_flicker_intensity: lerp(0.0, Self::MAX_ANTI_FLICKER_INTENSITY, anti_flicker),
            contrast_ceiling: Self::BASE_CONTRAST_CEILING
                - lerp(
                    0.0,
                    Self::CONTRAST_CEILING_REDUCTION,
                    smoothstep(0.5, 1.0, anti_flicker),
                ),
            sharpen_history_strength: settings.sharpen_history_strength,
            sharpen_blend: settings.sharpen_blend,
            stationary_blend: settings.stationary_blending,
            motion_blend: settings.motion_blending,
            quality: settings.quality,
            features,
        }
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite interpolation, 0 at or below `edge0` and 1 at or above `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
