use glam::Mat4;

use crate::{
    error::Result,
    history::{HistoryBackend, HistoryDescriptor, HistoryFormat, HistorySlot, SlotUpdate},
    projection::ProjectionKind,
};

/// What a camera renders for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CameraKind {
    #[default]
    Game,
    /// Editor scene view
    ScenePreview,
}

impl CameraKind {
    pub fn is_scene_preview(self) -> bool {
        matches!(self, Self::ScenePreview)
    }
}

/// Per-frame camera state handed in by the render pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFrameInput {
    /// Unjittered projection
    pub projection: Mat4,
    pub world_to_camera: Mat4,
    pub width: u32,
    pub height: u32,
    pub orthographic: bool,
    pub kind: CameraKind,
}

impl CameraFrameInput {
    pub fn new(projection: Mat4, world_to_camera: Mat4, width: u32, height: u32) -> Self {
        Self {
            projection,
            world_to_camera,
            width,
            height,
            orthographic: false,
            kind: CameraKind::Game,
        }
    }

    pub fn with_orthographic(mut self, orthographic: bool) -> Self {
        self.orthographic = orthographic;
        self
    }

    pub fn with_kind(mut self, kind: CameraKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.world_to_camera
    }

    pub fn projection_kind(&self) -> ProjectionKind {
        ProjectionKind::from_orthographic(self.orthographic)
    }
}

/// Which history slot to read last frame's result from and which to resolve into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PingPong {
    pub read: usize,
    pub write: usize,
}

/// Everything one camera carries from frame to frame.
#[derive(Debug)]
pub struct CameraTemporalContext<T> {
    // Mat4::ZERO until the first frame is recorded
    previous_view_projection: Mat4,
    slots: [HistorySlot<T>; 2],
    ping_pong_index: usize,
}

impl<T> Default for CameraTemporalContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CameraTemporalContext<T> {
    pub const SLOT_COUNT: usize = 2;

    pub fn new() -> Self {
        Self {
            previous_view_projection: Mat4::ZERO,
            slots: [HistorySlot::Empty, HistorySlot::Empty],
            ping_pong_index: 0,
        }
    }

    pub fn has_recorded_frame(&self) -> bool {
        self.previous_view_projection != Mat4::ZERO
    }

    /// Returns last frame's view-projection and stores `current` in its place.
    /// The very first call returns `current` itself, so the first frame
    /// reprojects with zero camera motion.
    pub fn record_and_get_previous(&mut self, current: Mat4) -> Mat4 {
        let previous = if self.has_recorded_frame() {
            self.previous_view_projection
        } else {
            current
        };

        self.previous_view_projection = current;
        previous
    }

    /// Flips the ping-pong bit. Call exactly once per frame.
    pub fn select_ping_pong(&mut self) -> PingPong {
        let read = self.ping_pong_index;
        self.ping_pong_index = 1 - self.ping_pong_index;

        PingPong {
            read,
            write: self.ping_pong_index,
        }
    }

    pub fn ping_pong_index(&self) -> usize {
        self.ping_pong_index
    }

    pub fn slot(&self, index: usize) -> Option<&HistorySlot<T>> {
        self.slots.get(index)
    }

    /// Read and write textures for a ping-pong pair.
    pub fn history_pair(&self, ping_pong: PingPong) -> (Option<&T>, Option<&T>) {
        (
            self.slots.get(ping_pong.read).and_then(HistorySlot::texture),
            self.slots.get(ping_pong.write).and_then(HistorySlot::texture),
        )
    }

    /// Brings both history slots to `width`x`height` in `format`, seeding
    /// any new texture from `source`.
    ///
    /// All-or-nothing: every replacement is allocated and seeded before any
    /// slot changes. On failure the textures created so far are released and
    /// both slots keep what they held.
    pub fn ensure_history<B>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
        format: HistoryFormat,
        source: &T,
    ) -> Result<[SlotUpdate; 2]>
    where
        B: HistoryBackend<Texture = T>,
    {
        let descriptors: [HistoryDescriptor; 2] =
            std::array::from_fn(|index| HistoryDescriptor::for_slot(index, width, height, format));

        let mut prepared: [Option<T>; 2] = [None, None];
        for (index, slot) in self.slots.iter().enumerate() {
            match slot.prepare(backend, &descriptors[index], source) {
                Ok(texture) => prepared[index] = texture,
                Err(err) => {
                    for texture in prepared.into_iter().flatten() {
                        backend.release(texture);
                    }
                    return Err(err);
                }
            }
        }

        let mut updates = [SlotUpdate::Unchanged; 2];
        for (index, (slot, texture)) in self.slots.iter_mut().zip(prepared).enumerate() {
            if let Some(texture) = texture {
                updates[index] = slot.commit(backend, texture, &descriptors[index]);
            }
        }

        Ok(updates)
    }

    /// Frees both slots. The recorded matrix and ping-pong bit reset too,
    /// so a context reused after release starts like a new one.
    pub fn release<B>(&mut self, backend: &mut B)
    where
        B: HistoryBackend<Texture = T>,
    {
        for slot in self.slots.iter_mut() {
            slot.release(backend);
        }
        self.previous_view_projection = Mat4::ZERO;
        self.ping_pong_index = 0;
    }
}
