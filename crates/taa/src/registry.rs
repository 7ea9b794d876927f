use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::{
    camera::CameraTemporalContext,
    error::{AwsmTaaError, Result},
    history::HistoryBackend,
};

/// Temporal contexts by camera. Contexts are created lazily on first use
/// and only freed through [Self::release] or [Self::release_all].
#[derive(Debug)]
pub struct CameraContextRegistry<T> {
    cameras: SlotMap<CameraKey, ()>,
    contexts: SecondaryMap<CameraKey, CameraTemporalContext<T>>,
}

impl<T> Default for CameraContextRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CameraContextRegistry<T> {
    pub fn new() -> Self {
        Self {
            cameras: SlotMap::with_key(),
            contexts: SecondaryMap::new(),
        }
    }

    /// Issues a handle for a new camera. No history is allocated yet.
    pub fn register_camera(&mut self) -> CameraKey {
        self.cameras.insert(())
    }

    pub fn contains(&self, key: CameraKey) -> bool {
        self.cameras.contains_key(key)
    }

    pub fn get(&self, key: CameraKey) -> Option<&CameraTemporalContext<T>> {
        self.contexts.get(key)
    }

    pub fn get_or_create(&mut self, key: CameraKey) -> Result<&mut CameraTemporalContext<T>> {
        if !self.cameras.contains_key(key) {
            return Err(AwsmTaaError::StaleCamera(key));
        }

        match self.contexts.entry(key) {
            Some(entry) => Ok(entry.or_insert_with(|| {
                tracing::debug!("creating temporal context for camera {key:?}");
                CameraTemporalContext::new()
            })),
            None => Err(AwsmTaaError::StaleCamera(key)),
        }
    }

    /// Frees the camera's history and retires its key. Unknown or already
    /// released keys are ignored.
    pub fn release<B>(&mut self, backend: &mut B, key: CameraKey)
    where
        B: HistoryBackend<Texture = T>,
    {
        if let Some(mut context) = self.contexts.remove(key) {
            context.release(backend);
            tracing::debug!("released temporal context for camera {key:?}");
        }
        self.cameras.remove(key);
    }

    /// Frees every context's history. Registered keys stay valid, so the
    /// next frame recreates their contexts from scratch.
    pub fn release_all<B>(&mut self, backend: &mut B)
    where
        B: HistoryBackend<Texture = T>,
    {
        let count = self.contexts.len();
        for (_, mut context) in self.contexts.drain() {
            context.release(backend);
        }
        if count > 0 {
            tracing::debug!("released {count} temporal contexts");
        }
    }

    /// Number of cameras with a live context
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }
}

new_key_type! {
    pub struct CameraKey;
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::{
        history::HistoryFormat,
        test_backend::{MockTexture, RecordingBackend},
    };

    #[test]
    fn contexts_are_created_lazily() {
        let mut registry = CameraContextRegistry::<MockTexture>::new();
        let key = registry.register_camera();

        assert!(registry.contains(key));
        assert!(registry.get(key).is_none());
        assert!(registry.is_empty());

        let context = registry.get_or_create(key).unwrap();
        assert!(!context.has_recorded_frame());
        assert_eq!(context.ping_pong_index(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn existing_context_is_returned() {
        let mut registry = CameraContextRegistry::<MockTexture>::new();
        let key = registry.register_camera();

        registry
            .get_or_create(key)
            .unwrap()
            .record_and_get_previous(Mat4::IDENTITY);

        assert!(registry.get_or_create(key).unwrap().has_recorded_frame());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn cameras_are_isolated() {
        let mut registry = CameraContextRegistry::<MockTexture>::new();
        let game = registry.register_camera();
        let preview = registry.register_camera();
        assert_ne!(game, preview);

        registry.get_or_create(game).unwrap().select_ping_pong();

        assert_eq!(registry.get_or_create(game).unwrap().ping_pong_index(), 1);
        assert_eq!(registry.get_or_create(preview).unwrap().ping_pong_index(), 0);
    }

    #[test]
    fn released_key_is_stale_and_never_reused() {
        let mut backend = RecordingBackend::new(true);
        let source = backend.color_target(32, 32, 1);
        let mut registry = CameraContextRegistry::new();
        let key = registry.register_camera();

        registry
            .get_or_create(key)
            .unwrap()
            .ensure_history(&mut backend, 32, 32, HistoryFormat::Rgba16Float, &source)
            .unwrap();
        registry.release(&mut backend, key);

        assert_eq!(backend.live_count(), 0);
        assert!(!registry.contains(key));
        assert!(matches!(
            registry.get_or_create(key),
            Err(AwsmTaaError::StaleCamera(stale)) if stale == key
        ));

        let next = registry.register_camera();
        assert_ne!(next, key);
        assert!(registry.get_or_create(next).is_ok());
    }

    #[test]
    fn release_all_keeps_keys() {
        let mut backend = RecordingBackend::new(false);
        let source = backend.color_target(32, 32, 1);
        let mut registry = CameraContextRegistry::new();
        let a = registry.register_camera();
        let b = registry.register_camera();

        for key in [a, b] {
            registry
                .get_or_create(key)
                .unwrap()
                .ensure_history(&mut backend, 32, 32, HistoryFormat::Rg11b10Ufloat, &source)
                .unwrap();
        }
        assert_eq!(backend.live_count(), 4);

        registry.release_all(&mut backend);

        assert_eq!(backend.live_count(), 0);
        assert!(registry.is_empty());
        assert_eq!(registry.camera_count(), 2);
        assert!(registry.get_or_create(a).is_ok());
    }
}
