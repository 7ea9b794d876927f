//! History textures and the allocation seam.
//!
//! The core never talks to a GPU API. It describes what it needs with a
//! [HistoryDescriptor] and a [HistoryBackend] does the actual allocation,
//! seeding and release.

use strum::Display;

use crate::{
    camera::CameraKind,
    error::{AwsmTaaError, Result},
};

/// Pixel format of a history texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HistoryFormat {
    /// 4-channel half float, carries an extra alpha channel through history
    Rgba16Float,
    /// Packed 3-channel float, no alpha
    Rg11b10Ufloat,
}

impl HistoryFormat {
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba16Float)
    }
}

/// Game cameras get the alpha-carrying format when the backend can sample it,
/// scene previews always get the reduced one.
pub fn history_format(kind: CameraKind, supports_rgba16float: bool) -> HistoryFormat {
    if !kind.is_scene_preview() && supports_rgba16float {
        HistoryFormat::Rgba16Float
    } else {
        HistoryFormat::Rg11b10Ufloat
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: HistoryFormat,
    pub label: String,
}

impl HistoryDescriptor {
    /// History is never multisampled and has no depth
    pub const SAMPLE_COUNT: u32 = 1;
    pub const LABEL_PREFIX: &'static str = "_TemporalHistory";

    pub fn new(width: u32, height: u32, format: HistoryFormat) -> Self {
        Self {
            width,
            height,
            format,
            label: Self::LABEL_PREFIX.to_string(),
        }
    }

    pub fn for_slot(slot: usize, width: u32, height: u32, format: HistoryFormat) -> Self {
        Self::new(width, height, format).with_label(format!("{}_{slot}", Self::LABEL_PREFIX))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn same_size(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Size or format changed. The label alone never forces a new texture.
    pub fn needs_reallocation(&self, other: &Self) -> bool {
        !self.same_size(other) || self.format != other.format
    }
}

/// Allocation primitives for history textures.
///
/// `seed` copies the full extent of `source` (the current frame's color
/// target) into a freshly allocated `dest`. Implementations are free to
/// convert formats while doing so.
pub trait HistoryBackend {
    type Texture;

    /// Whether 4-channel half float history can be sampled. Assumed static.
    fn supports_rgba16float_history(&self) -> bool;

    fn allocate(&mut self, descriptor: &HistoryDescriptor) -> Result<Self::Texture>;

    fn seed(
        &mut self,
        source: &Self::Texture,
        dest: &Self::Texture,
        descriptor: &HistoryDescriptor,
    ) -> Result<()>;

    fn release(&mut self, texture: Self::Texture);
}

/// What [HistorySlot::ensure_size] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotUpdate {
    /// Existing texture kept as is
    Unchanged,
    /// First texture for an empty slot
    Allocated,
    /// Old texture replaced after a size or format change
    Reallocated,
}

impl SlotUpdate {
    /// True whenever a new texture was created, including the first one
    pub fn was_reallocated(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// One history texture plus the descriptor it was last allocated with.
#[derive(Debug)]
pub enum HistorySlot<T> {
    Empty,
    Allocated {
        texture: T,
        descriptor: HistoryDescriptor,
    },
}

impl<T> Default for HistorySlot<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> HistorySlot<T> {
    pub fn texture(&self) -> Option<&T> {
        match self {
            Self::Empty => None,
            Self::Allocated { texture, .. } => Some(texture),
        }
    }

    pub fn descriptor(&self) -> Option<&HistoryDescriptor> {
        match self {
            Self::Empty => None,
            Self::Allocated { descriptor, .. } => Some(descriptor),
        }
    }

    pub fn is_allocated(&self) -> bool {
        matches!(self, Self::Allocated { .. })
    }

    /// Makes sure the slot holds a texture matching `descriptor`.
    ///
    /// A new texture is seeded from `source` before the old one (if any) is
    /// handed back to the backend. If allocation or seeding fails the slot
    /// keeps whatever it held before.
    pub fn ensure_size<B>(
        &mut self,
        backend: &mut B,
        descriptor: &HistoryDescriptor,
        source: &T,
    ) -> Result<SlotUpdate>
    where
        B: HistoryBackend<Texture = T>,
    {
        match self.prepare(backend, descriptor, source)? {
            Some(texture) => Ok(self.commit(backend, texture, descriptor)),
            None => Ok(SlotUpdate::Unchanged),
        }
    }

    /// First half of [Self::ensure_size]: allocates and seeds a replacement
    /// texture if `descriptor` calls for one, without touching the slot.
    ///
    /// Returns `None` when the current texture already matches. A texture
    /// whose seed failed is released before the error is returned.
    pub fn prepare<B>(
        &self,
        backend: &mut B,
        descriptor: &HistoryDescriptor,
        source: &T,
    ) -> Result<Option<T>>
    where
        B: HistoryBackend<Texture = T>,
    {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(AwsmTaaError::ZeroSizedHistory {
                width: descriptor.width,
                height: descriptor.height,
            });
        }

        if let Self::Allocated {
            descriptor: current,
            ..
        } = self
        {
            if !current.needs_reallocation(descriptor) {
                return Ok(None);
            }
        }

        let texture = backend.allocate(descriptor)?;
        if let Err(err) = backend.seed(source, &texture, descriptor) {
            backend.release(texture);
            return Err(err);
        }

        Ok(Some(texture))
    }

    /// Second half of [Self::ensure_size]: installs a prepared texture and
    /// releases the one it replaces.
    pub fn commit<B>(
        &mut self,
        backend: &mut B,
        texture: T,
        descriptor: &HistoryDescriptor,
    ) -> SlotUpdate
    where
        B: HistoryBackend<Texture = T>,
    {
        let previous = std::mem::replace(
            self,
            Self::Allocated {
                texture,
                descriptor: descriptor.clone(),
            },
        );

        match previous {
            Self::Empty => SlotUpdate::Allocated,
            Self::Allocated { texture, .. } => {
                backend.release(texture);
                SlotUpdate::Reallocated
            }
        }
    }

    /// Hands the texture back to the backend and leaves the slot empty.
    pub fn release<B>(&mut self, backend: &mut B)
    where
        B: HistoryBackend<Texture = T>,
    {
        if let Self::Allocated { texture, .. } = std::mem::take(self) {
            backend.release(texture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_backend::{BackendEvent, RecordingBackend};

    #[test]
    fn format_follows_camera_kind_and_capability() {
        assert_eq!(history_format(CameraKind::Game, true), HistoryFormat::Rgba16Float);
        assert_eq!(history_format(CameraKind::Game, false), HistoryFormat::Rg11b10Ufloat);
        assert_eq!(history_format(CameraKind::ScenePreview, true), HistoryFormat::Rg11b10Ufloat);
        assert_eq!(history_format(CameraKind::ScenePreview, false), HistoryFormat::Rg11b10Ufloat);
    }

    #[test]
    fn slot_label() {
        let descriptor = HistoryDescriptor::for_slot(1, 4, 4, HistoryFormat::Rgba16Float);
        assert_eq!(descriptor.label, "_TemporalHistory_1");
    }

    #[test]
    fn first_use_allocates_and_seeds() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(1920, 1080, 7);
        let mut slot = HistorySlot::Empty;

        let descriptor = HistoryDescriptor::for_slot(0, 1920, 1080, HistoryFormat::Rgba16Float);
        let update = slot.ensure_size(&mut backend, &descriptor, &source).unwrap();

        assert_eq!(update, SlotUpdate::Allocated);
        assert!(update.was_reallocated());
        assert_eq!(slot.descriptor(), Some(&descriptor));
        let texture = slot.texture().unwrap();
        assert_eq!(backend.content_of(texture), Some(7));
        assert_eq!(backend.live_count(), 1);
    }

    #[test]
    fn unchanged_descriptor_keeps_texture() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(640, 480, 1);
        let mut slot = HistorySlot::Empty;
        let descriptor = HistoryDescriptor::new(640, 480, HistoryFormat::Rg11b10Ufloat);

        slot.ensure_size(&mut backend, &descriptor, &source).unwrap();
        let id = slot.texture().unwrap().id;

        let newer = backend.color_target(640, 480, 2);
        let update = slot.ensure_size(&mut backend, &descriptor, &newer).unwrap();

        assert_eq!(update, SlotUpdate::Unchanged);
        assert!(!update.was_reallocated());
        assert_eq!(slot.texture().unwrap().id, id);
        // not reseeded
        assert_eq!(backend.content_of(slot.texture().unwrap()), Some(1));
        assert_eq!(backend.allocation_count(), 1);
    }

    #[test]
    fn resize_reallocates_seeds_then_releases() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(640, 480, 1);
        let mut slot = HistorySlot::Empty;

        slot.ensure_size(
            &mut backend,
            &HistoryDescriptor::new(640, 480, HistoryFormat::Rgba16Float),
            &source,
        )
        .unwrap();
        let old_id = slot.texture().unwrap().id;

        let resized = backend.color_target(320, 240, 9);
        let update = slot
            .ensure_size(
                &mut backend,
                &HistoryDescriptor::new(320, 240, HistoryFormat::Rgba16Float),
                &resized,
            )
            .unwrap();

        assert_eq!(update, SlotUpdate::Reallocated);
        let texture = slot.texture().unwrap();
        assert_ne!(texture.id, old_id);
        assert_eq!((texture.width, texture.height), (320, 240));
        assert_eq!(backend.content_of(texture), Some(9));
        assert_eq!(backend.live_count(), 1);

        let new_id = texture.id;
        let events = backend.events();
        assert_eq!(
            events[events.len() - 3..].to_vec(),
            vec![
                BackendEvent::Allocate(new_id),
                BackendEvent::Seed {
                    source: resized.id,
                    dest: new_id
                },
                BackendEvent::Release(old_id),
            ]
        );
    }

    #[test]
    fn format_change_reallocates() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(64, 64, 1);
        let mut slot = HistorySlot::Empty;

        slot.ensure_size(
            &mut backend,
            &HistoryDescriptor::new(64, 64, HistoryFormat::Rgba16Float),
            &source,
        )
        .unwrap();
        let update = slot
            .ensure_size(
                &mut backend,
                &HistoryDescriptor::new(64, 64, HistoryFormat::Rg11b10Ufloat),
                &source,
            )
            .unwrap();

        assert_eq!(update, SlotUpdate::Reallocated);
        assert_eq!(slot.descriptor().unwrap().format, HistoryFormat::Rg11b10Ufloat);
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(1, 1, 0);
        let mut slot = HistorySlot::Empty;

        let err = slot
            .ensure_size(
                &mut backend,
                &HistoryDescriptor::new(0, 720, HistoryFormat::Rgba16Float),
                &source,
            )
            .unwrap_err();

        assert!(matches!(
            err,
            AwsmTaaError::ZeroSizedHistory {
                width: 0,
                height: 720
            }
        ));
        assert!(!slot.is_allocated());
        assert_eq!(backend.allocation_count(), 0);
    }

    #[test]
    fn failed_allocation_keeps_previous_texture() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(64, 64, 1);
        let mut slot = HistorySlot::Empty;
        let descriptor = HistoryDescriptor::new(64, 64, HistoryFormat::Rgba16Float);
        slot.ensure_size(&mut backend, &descriptor, &source).unwrap();
        let id = slot.texture().unwrap().id;

        backend.fail_allocations(true);
        let err = slot
            .ensure_size(
                &mut backend,
                &HistoryDescriptor::new(128, 128, HistoryFormat::Rgba16Float),
                &source,
            )
            .unwrap_err();

        assert!(matches!(err, AwsmTaaError::Backend(_)));
        assert_eq!(slot.texture().unwrap().id, id);
        assert_eq!(slot.descriptor(), Some(&descriptor));
        assert_eq!(backend.live_count(), 1);
    }

    #[test]
    fn prepare_leaves_slot_alone_until_commit() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(64, 64, 1);
        let mut slot = HistorySlot::Empty;
        let descriptor = HistoryDescriptor::new(64, 64, HistoryFormat::Rgba16Float);
        slot.ensure_size(&mut backend, &descriptor, &source).unwrap();
        let old_id = slot.texture().unwrap().id;

        assert!(slot.prepare(&mut backend, &descriptor, &source).unwrap().is_none());

        let resized = HistoryDescriptor::new(32, 32, HistoryFormat::Rgba16Float);
        let texture = slot.prepare(&mut backend, &resized, &source).unwrap().unwrap();
        assert_eq!(slot.texture().unwrap().id, old_id);
        assert_eq!(backend.live_count(), 2);

        let new_id = texture.id;
        assert_eq!(slot.commit(&mut backend, texture, &resized), SlotUpdate::Reallocated);
        assert_eq!(slot.texture().unwrap().id, new_id);
        assert_eq!(slot.descriptor(), Some(&resized));
        assert_eq!(backend.events().last(), Some(&BackendEvent::Release(old_id)));
        assert_eq!(backend.live_count(), 1);
    }

    #[test]
    fn release_empties_slot() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(8, 8, 1);
        let mut slot = HistorySlot::Empty;
        slot.ensure_size(
            &mut backend,
            &HistoryDescriptor::new(8, 8, HistoryFormat::Rgba16Float),
            &source,
        )
        .unwrap();

        slot.release(&mut backend);
        assert!(!slot.is_allocated());
        assert_eq!(backend.live_count(), 0);

        // releasing an empty slot is a no-op
        slot.release(&mut backend);
        assert_eq!(backend.release_count(), 1);
    }
}
