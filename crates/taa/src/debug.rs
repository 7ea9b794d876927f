//! Logging flags.

/// Temporal anti-aliasing logging flags.
#[derive(Clone, Debug, Default)]
pub struct AwsmTaaLogging {
    /// Wraps each per-camera prepare in a tracing span.
    pub frame_timings: bool,
    /// Logs every history allocation, seed and release, plus per-slot updates.
    pub allocations: bool,
}

impl AwsmTaaLogging {
    pub fn verbose() -> Self {
        Self {
            frame_timings: true,
            allocations: true,
        }
    }
}
