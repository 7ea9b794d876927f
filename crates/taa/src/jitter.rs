//! Sub-pixel jitter sequence.
//!
//! Halton (2, 3) offsets over a short cycle. Index 0 of the underlying
//! sequence is never evaluated, it yields the degenerate (0, 0) point.

use glam::Vec2;

/// Number of jitter samples before the sequence repeats
pub const SAMPLE_COUNT: u32 = 8;

const HALTON_INDEX_MASK: u32 = 1023;

/// Radical inverse of `index` in `base`, in [0, 1). `base` must be at least 2.
fn halton(index: u32, base: u32) -> f32 {
    let mut result = 0.0;
    let mut fraction = 1.0 / base as f32;
    let mut i = index;

    while i > 0 {
        result += (i % base) as f32 * fraction;
        i /= base;
        fraction /= base as f32;
    }

    result
}

/// Token for one logical frame, issued by [crate::AwsmTaa::begin_frame].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameTick(u64);

impl FrameTick {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// When the shared jitter index advances if several cameras render in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JitterTickPolicy {
    /// One advance per frame tick, every camera in the frame shares the offset
    #[default]
    PerFrame,
    /// One advance per camera processed, cameras in the same frame see
    /// consecutive samples
    PerCamera,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterSample {
    /// Offset in pixels, each component in (-0.5, 0.5)
    pub offset: Vec2,
    /// Sample index the offset was generated from, before advancing
    pub frame_index: u32,
}

/// The single jitter counter shared by every camera of a feature instance.
#[derive(Debug, Clone, Default)]
pub struct JitterSequence {
    sample_index: u32,
    last_tick: Option<(FrameTick, JitterSample)>,
}

impl JitterSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_index(&self) -> u32 {
        self.sample_index
    }

    /// Offset for a sample index without touching any state.
    pub fn offset_at(sample_index: u32) -> Vec2 {
        let index = (sample_index & HALTON_INDEX_MASK) + 1;
        Vec2::new(halton(index, 2) - 0.5, halton(index, 3) - 0.5)
    }

    /// Emits the current offset and advances, wrapping at [SAMPLE_COUNT].
    pub fn next(&mut self) -> JitterSample {
        let sample = JitterSample {
            offset: Self::offset_at(self.sample_index),
            frame_index: self.sample_index,
        };

        self.sample_index += 1;
        if self.sample_index >= SAMPLE_COUNT {
            self.sample_index = 0;
        }

        sample
    }

    /// Like [Self::next], but under [JitterTickPolicy::PerFrame] repeated
    /// calls with the same tick return the same sample without advancing.
    pub fn sample(&mut self, tick: FrameTick, policy: JitterTickPolicy) -> JitterSample {
        match (policy, self.last_tick) {
            (JitterTickPolicy::PerFrame, Some((last, sample))) if last == tick => sample,
            _ => {
                let sample = self.next();
                self.last_tick = Some((tick, sample));
                sample
            }
        }
    }

    pub fn reset(&mut self) {
        self.sample_index = 0;
        self.last_tick = None;
    }
}
