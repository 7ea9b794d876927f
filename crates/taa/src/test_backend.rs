//! In-memory [HistoryBackend] that records every call.

use std::collections::HashMap;

use crate::{
    error::{AwsmTaaError, Result},
    history::{HistoryBackend, HistoryDescriptor, HistoryFormat},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTexture {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    /// None for color targets
    pub format: Option<HistoryFormat>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Allocate(u32),
    Seed { source: u32, dest: u32 },
    Release(u32),
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    supports_rgba16float: bool,
    fail_allocations: bool,
    fail_after: Option<usize>,
    next_id: u32,
    events: Vec<BackendEvent>,
    allocations: Vec<HistoryDescriptor>,
    /// Content marker per texture id, copied on seed
    contents: HashMap<u32, u64>,
    live: HashMap<u32, MockTexture>,
}

impl RecordingBackend {
    pub fn new(supports_rgba16float: bool) -> Self {
        Self {
            supports_rgba16float,
            ..Default::default()
        }
    }

    pub fn fail_allocations(&mut self, fail: bool) {
        self.fail_allocations = fail;
    }

    /// Succeed until `count` allocations have been made in total, fail after
    pub fn fail_allocations_after(&mut self, count: usize) {
        self.fail_after = Some(count);
    }

    pub fn set_supports_rgba16float(&mut self, supported: bool) {
        self.supports_rgba16float = supported;
    }

    /// A rendered frame to seed from, tagged with `content`
    pub fn color_target(&mut self, width: u32, height: u32, content: u64) -> MockTexture {
        let id = self.bump_id();
        self.contents.insert(id, content);
        MockTexture {
            id,
            width,
            height,
            format: None,
            label: "color".to_string(),
        }
    }

    pub fn content_of(&self, texture: &MockTexture) -> Option<u64> {
        self.contents.get(&texture.id).copied()
    }

    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    pub fn allocations(&self) -> &[HistoryDescriptor] {
        &self.allocations
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }

    pub fn seed_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, BackendEvent::Seed { .. }))
            .count()
    }

    pub fn release_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, BackendEvent::Release(_)))
            .count()
    }

    /// History textures allocated and not yet released
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn bump_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl HistoryBackend for RecordingBackend {
    type Texture = MockTexture;

    fn supports_rgba16float_history(&self) -> bool {
        self.supports_rgba16float
    }

    fn allocate(&mut self, descriptor: &HistoryDescriptor) -> Result<MockTexture> {
        let over_limit = self
            .fail_after
            .is_some_and(|count| self.allocations.len() >= count);
        if self.fail_allocations || over_limit {
            return Err(AwsmTaaError::backend("out of memory"));
        }

        let id = self.bump_id();
        let texture = MockTexture {
            id,
            width: descriptor.width,
            height: descriptor.height,
            format: Some(descriptor.format),
            label: descriptor.label.clone(),
        };

        self.events.push(BackendEvent::Allocate(id));
        self.allocations.push(descriptor.clone());
        self.live.insert(id, texture.clone());

        Ok(texture)
    }

    fn seed(
        &mut self,
        source: &MockTexture,
        dest: &MockTexture,
        _descriptor: &HistoryDescriptor,
    ) -> Result<()> {
        if !self.live.contains_key(&dest.id) {
            return Err(AwsmTaaError::backend(format!("seed into dead texture {}", dest.id)));
        }

        self.events.push(BackendEvent::Seed {
            source: source.id,
            dest: dest.id,
        });
        match self.contents.get(&source.id).copied() {
            Some(content) => {
                self.contents.insert(dest.id, content);
            }
            None => {
                self.contents.remove(&dest.id);
            }
        }

        Ok(())
    }

    fn release(&mut self, texture: MockTexture) {
        self.events.push(BackendEvent::Release(texture.id));
        self.live.remove(&texture.id);
        self.contents.remove(&texture.id);
    }
}
