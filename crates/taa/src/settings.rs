use strum::{Display, EnumIter, EnumString, FromRepr};

use crate::{debug::AwsmTaaLogging, jitter::JitterTickPolicy};

/// Resolve quality tier, selects the filtering kernel variant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, FromRepr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[strum(ascii_case_insensitive)]
#[repr(u32)]
pub enum TaaQuality {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
}

impl TaaQuality {
    /// Unrecognized indices fall back to Medium
    pub fn from_index(index: u32) -> Self {
        Self::from_repr(index).unwrap_or_default()
    }

    /// Unrecognized names fall back to Medium
    pub fn parse_or_default(name: &str) -> Self {
        name.trim().parse().unwrap_or_default()
    }

    pub fn as_index(self) -> u32 {
        self as u32
    }
}

// Names and indices both go through the Medium fallback, so an unknown tier
// in a settings file is never a load error.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TaaQuality {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum QualityRepr {
            Index(i64),
            Name(String),
            Other(serde::de::IgnoredAny),
        }

        Ok(match QualityRepr::deserialize(deserializer)? {
            QualityRepr::Index(index) => u32::try_from(index)
                .map(Self::from_index)
                .unwrap_or_default(),
            QualityRepr::Name(name) => Self::parse_or_default(&name),
            QualityRepr::Other(_) => Self::default(),
        })
    }
}

/// User-facing settings, read once per frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TaaSettings {
    pub quality: TaaQuality,
    /// Also run on scene-preview cameras
    pub preview_in_scene_view: bool,
    /// Use motion vectors for reprojection (never on scene-preview cameras)
    pub use_motion_vectors: bool,
    /// Tonemap before blending, reduces flicker at the cost of some highlight bleed
    pub use_tonemapping: bool,
    /// History weight for stationary pixels, [0, 0.99]
    pub stationary_blending: f32,
    /// History weight for clearly moving pixels, [0, 0.99]
    pub motion_blending: f32,
    /// [0, 1]
    pub anti_flicker: f32,
    /// [0, 0.5], the kernel only applies it on High
    pub sharpen_strength: f32,
    /// [0, 1]
    pub sharpen_history_strength: f32,
    /// [0, 1]
    pub sharpen_blend: f32,
    /// Bicubic history resampling
    pub use_bicubic: bool,
}

impl Default for TaaSettings {
    fn default() -> Self {
        Self {
            quality: TaaQuality::Medium,
            preview_in_scene_view: false,
            use_motion_vectors: false,
            use_tonemapping: false,
            stationary_blending: 0.95,
            motion_blending: 0.7,
            anti_flicker: 0.5,
            sharpen_strength: 0.15,
            sharpen_history_strength: 0.35,
            sharpen_blend: 0.2,
            use_bicubic: false,
        }
    }
}

impl TaaSettings {
    pub const MAX_BLENDING: f32 = 0.99;
    pub const MAX_SHARPEN_STRENGTH: f32 = 0.5;

    /// Clamps every field into its documented range.
    /// NaN is treated as the lower bound.
    pub fn sanitized(&self) -> Self {
        Self {
            stationary_blending: clamp_or_min(self.stationary_blending, 0.0, Self::MAX_BLENDING),
            motion_blending: clamp_or_min(self.motion_blending, 0.0, Self::MAX_BLENDING),
            anti_flicker: clamp_or_min(self.anti_flicker, 0.0, 1.0),
            sharpen_strength: clamp_or_min(self.sharpen_strength, 0.0, Self::MAX_SHARPEN_STRENGTH),
            sharpen_history_strength: clamp_or_min(self.sharpen_history_strength, 0.0, 1.0),
            sharpen_blend: clamp_or_min(self.sharpen_blend, 0.0, 1.0),
            ..self.clone()
        }
    }

    pub fn with_quality(mut self, quality: TaaQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_motion_vectors(mut self, use_motion_vectors: bool) -> Self {
        self.use_motion_vectors = use_motion_vectors;
        self
    }

    pub fn with_tonemapping(mut self, use_tonemapping: bool) -> Self {
        self.use_tonemapping = use_tonemapping;
        self
    }

    pub fn with_bicubic(mut self, use_bicubic: bool) -> Self {
        self.use_bicubic = use_bicubic;
        self
    }

    pub fn with_anti_flicker(mut self, anti_flicker: f32) -> Self {
        self.anti_flicker = anti_flicker;
        self
    }

    pub fn with_preview_in_scene_view(mut self, preview_in_scene_view: bool) -> Self {
        self.preview_in_scene_view = preview_in_scene_view;
        self
    }
}

fn clamp_or_min(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Feature-instance configuration, fixed for the lifetime of an [crate::AwsmTaa].
#[derive(Debug, Clone, Default)]
pub struct TaaConfig {
    pub tick_policy: JitterTickPolicy,
    pub logging: AwsmTaaLogging,
}

impl TaaConfig {
    pub fn with_tick_policy(mut self, tick_policy: JitterTickPolicy) -> Self {
        self.tick_policy = tick_policy;
        self
    }

    pub fn with_logging(mut self, logging: AwsmTaaLogging) -> Self {
        self.logging = logging;
        self
    }
}
