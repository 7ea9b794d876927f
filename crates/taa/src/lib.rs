//! Temporal anti-aliasing state.
//!
//! Owns everything a TAA resolve needs to carry between frames: the shared
//! sub-pixel jitter sequence, per-camera history textures with their
//! ping-pong order, the previous view-projection matrix, and the resolve
//! parameters derived from [TaaSettings]. The actual filtering happens in an
//! external kernel, and GPU resources go through a [HistoryBackend].

pub mod camera;
pub mod debug;
pub mod error;
pub mod history;
pub mod jitter;
pub mod projection;
pub mod registry;
pub mod resolve;
pub mod settings;
pub mod uniforms;

#[cfg(test)]
pub(crate) mod test_backend;

use glam::{Mat4, Vec2};

pub use camera::{CameraFrameInput, CameraKind, PingPong};
pub use debug::AwsmTaaLogging;
pub use error::{AwsmTaaError, Result};
pub use history::{HistoryBackend, HistoryDescriptor, HistoryFormat, SlotUpdate};
pub use jitter::{FrameTick, JitterTickPolicy};
pub use registry::CameraKey;
pub use resolve::{ResolveFeatures, ResolveParams};
pub use settings::{TaaConfig, TaaQuality, TaaSettings};
pub use uniforms::ResolveUniforms;

use history::history_format;
use jitter::JitterSequence;
use projection::apply_jitter;
use registry::CameraContextRegistry;
use resolve::ResolveInputs;

/// One TAA feature instance. `T` is the backend's texture type.
pub struct AwsmTaa<T> {
    settings: TaaSettings,
    config: TaaConfig,
    enabled: bool,
    jitter: JitterSequence,
    cameras: CameraContextRegistry<T>,
    frame_tick: FrameTick,
    // backend last reported no rgba16float history
    format_fallback: bool,
}

/// Everything the resolve kernel needs for one camera this frame.
#[derive(Debug)]
pub struct CameraTaaFrame<'a, T> {
    pub camera: CameraKey,
    pub jittered_projection: Mat4,
    /// Pixels, each component in (-0.5, 0.5)
    pub jitter: Vec2,
    pub normalized_jitter: Vec2,
    /// Jitter sample index, before advancing
    pub frame_index: u32,
    pub previous_view_projection: Mat4,
    pub ping_pong: PingPong,
    /// Last frame's accepted history
    pub read_history: &'a T,
    /// This frame's resolve target
    pub write_history: &'a T,
    pub history_format: HistoryFormat,
    pub history_updates: [SlotUpdate; 2],
    pub params: ResolveParams,
}

impl<T> CameraTaaFrame<'_, T> {
    /// Any history slot got a new texture this frame
    pub fn history_reallocated(&self) -> bool {
        self.history_updates.iter().any(|update| update.was_reallocated())
    }

    pub fn write_uniforms(&self, uniforms: &mut ResolveUniforms) {
        uniforms.update(&self.params, self.frame_index);
    }
}

impl<T> AwsmTaa<T> {
    pub fn new(config: TaaConfig) -> Self {
        Self {
            settings: TaaSettings::default(),
            config,
            enabled: true,
            jitter: JitterSequence::new(),
            cameras: CameraContextRegistry::new(),
            frame_tick: FrameTick::default(),
            format_fallback: false,
        }
    }

    pub fn with_settings(mut self, settings: TaaSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &TaaSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: TaaSettings) {
        self.settings = settings;
    }

    pub fn config(&self) -> &TaaConfig {
        &self.config
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling frees every camera's history, the same as [Self::teardown].
    pub fn set_enabled<B>(&mut self, backend: &mut B, enabled: bool)
    where
        B: HistoryBackend<Texture = T>,
    {
        if self.enabled && !enabled {
            self.teardown(backend);
        }
        self.enabled = enabled;
    }

    pub fn register_camera(&mut self) -> CameraKey {
        self.cameras.register_camera()
    }

    pub fn cameras(&self) -> &CameraContextRegistry<T> {
        &self.cameras
    }

    /// Starts a new logical frame. Pass the returned tick to every
    /// [Self::prepare_camera] call of that frame.
    pub fn begin_frame(&mut self) -> FrameTick {
        self.frame_tick = self.frame_tick.next();
        self.frame_tick
    }

    /// Runs the per-camera temporal bookkeeping for one frame.
    ///
    /// Returns `Ok(None)` when the feature is disabled or the camera is a
    /// scene preview and previews are off; no state is touched then.
    /// History is brought up to date before anything else changes, so a
    /// failed allocation leaves jitter, matrix and ping-pong state as they
    /// were and the next attempt starts from the same place.
    pub fn prepare_camera<B>(
        &mut self,
        backend: &mut B,
        tick: FrameTick,
        camera: CameraKey,
        input: &CameraFrameInput,
        source: &T,
    ) -> Result<Option<CameraTaaFrame<'_, T>>>
    where
        B: HistoryBackend<Texture = T>,
    {
        if !self.enabled
            || (input.kind.is_scene_preview() && !self.settings.preview_in_scene_view)
        {
            return Ok(None);
        }

        let _maybe_span_guard = if self.config.logging.frame_timings {
            Some(tracing::span!(tracing::Level::INFO, "TAA prepare camera").entered())
        } else {
            None
        };

        let supports_rgba16float = backend.supports_rgba16float_history();
        let format = history_format(input.kind, supports_rgba16float);
        self.track_format_fallback(!supports_rgba16float);

        let context = self.cameras.get_or_create(camera)?;

        let history_updates =
            context.ensure_history(backend, input.width, input.height, format, source)?;
        if history_updates.iter().any(|update| update.was_reallocated()) {
            tracing::debug!(
                "camera {camera:?} history now {}x{} {format}",
                input.width,
                input.height
            );
            if self.config.logging.allocations {
                for (slot, update) in history_updates.iter().enumerate() {
                    tracing::info!("camera {camera:?} history slot {slot}: {update:?}");
                }
            }
        }

        let sample = self.jitter.sample(tick, self.config.tick_policy);
        let jittered = apply_jitter(
            input.projection,
            sample.offset,
            input.width,
            input.height,
            input.projection_kind(),
        );

        let previous_view_projection = context.record_and_get_previous(input.view_projection());
        let ping_pong = context.select_ping_pong();

        let params = ResolveParams::compute(
            &self.settings,
            ResolveInputs {
                previous_view_projection,
                jitter: sample.offset,
                normalized_jitter: jittered.normalized_offset,
                camera_kind: input.kind,
                history_format: format,
            },
        );

        let context = &*context;
        let (Some(read_history), Some(write_history)) = context.history_pair(ping_pong) else {
            return Err(AwsmTaaError::MissingHistory(camera));
        };

        Ok(Some(CameraTaaFrame {
            camera,
            jittered_projection: jittered.matrix,
            jitter: sample.offset,
            normalized_jitter: jittered.normalized_offset,
            frame_index: sample.frame_index,
            previous_view_projection,
            ping_pong,
            read_history,
            write_history,
            history_format: format,
            history_updates,
            params,
        }))
    }

    /// Logs once each time the backend's rgba16float support flips.
    /// Returns whether it did.
    fn track_format_fallback(&mut self, fallback: bool) -> bool {
        if fallback == self.format_fallback {
            return false;
        }

        self.format_fallback = fallback;
        if fallback {
            tracing::info!(
                "rgba16float history unsupported, falling back to {}",
                HistoryFormat::Rg11b10Ufloat
            );
        } else {
            tracing::info!("rgba16float history available again");
        }
        true
    }

    /// Frees the camera's history and retires its key.
    pub fn release_camera<B>(&mut self, backend: &mut B, camera: CameraKey)
    where
        B: HistoryBackend<Texture = T>,
    {
        self.cameras.release(backend, camera);
    }

    /// Frees every camera's history and restarts the jitter cycle.
    /// Camera keys stay valid.
    pub fn teardown<B>(&mut self, backend: &mut B)
    where
        B: HistoryBackend<Texture = T>,
    {
        self.cameras.release_all(backend);
        self.jitter.reset();
        tracing::debug!("TAA teardown");
    }
}
