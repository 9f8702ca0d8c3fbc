use tracing::{debug, warn};

use crate::apply::RenderSink;

use super::types::{
    select_level, validate_levels, LodError, LodHandle, LodLevel, ObjectId, RepresentationId, Vec3,
};

#[derive(Debug, Clone)]
pub struct LodEntry {
    handle: LodHandle,
    object: ObjectId,
    position: Vec3,
    levels: Vec<LodLevel>,
    current_level: Option<usize>,
}

impl LodEntry {
    pub fn handle(&self) -> LodHandle {
        self.handle
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    pub fn current_level(&self) -> Option<usize> {
        self.current_level
    }

    pub fn visible_representation(&self) -> Option<RepresentationId> {
        self.current_level
            .and_then(|index| self.levels.get(index))
            .map(|level| level.representation)
    }
}

#[derive(Debug, Default)]
pub struct LodHandleAllocator {
    next: u64,
}

impl LodHandleAllocator {
    pub fn allocate(&mut self) -> LodHandle {
        let handle = LodHandle(self.next);
        self.next = self.next.saturating_add(1);
        handle
    }
}

/// Tracked objects in registration order. Handles are allocated monotonically,
/// so the table stays sorted by handle.
#[derive(Debug, Default)]
pub struct LodRegistry {
    allocator: LodHandleAllocator,
    entries: Vec<LodEntry>,
}

impl LodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        object: ObjectId,
        position: Vec3,
        levels: Vec<LodLevel>,
    ) -> Result<LodHandle, LodError> {
        validate_levels(object, &levels)?;
        let handle = self.allocator.allocate();
        debug!(
            handle = handle.raw(),
            object = object.0,
            levels = levels.len(),
            "lod_registered"
        );
        self.entries.push(LodEntry {
            handle,
            object,
            position,
            levels,
            current_level: None,
        });
        Ok(handle)
    }

    pub fn unregister(&mut self, handle: LodHandle) -> bool {
        match self.index_of(handle) {
            Some(index) => {
                self.entries.remove(index);
                debug!(handle = handle.raw(), "lod_unregistered");
                true
            }
            None => false,
        }
    }

    pub fn set_position(&mut self, handle: LodHandle, position: Vec3) -> bool {
        match self.entry_mut(handle) {
            Some(entry) => {
                entry.position = position;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, handle: LodHandle) -> Option<&LodEntry> {
        self.index_of(handle).map(|index| &self.entries[index])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LodEntry> {
        self.entries.iter()
    }

    /// Returns `true` when the visible representation changed.
    pub fn update<S: RenderSink + ?Sized>(
        &mut self,
        handle: LodHandle,
        camera: Vec3,
        multiplier: f32,
        sink: &mut S,
    ) -> bool {
        let multiplier = effective_multiplier(multiplier);
        match self.entry_mut(handle) {
            Some(entry) => update_entry(entry, camera, multiplier, sink),
            None => false,
        }
    }

    /// Updates every entry in registration order; returns how many switched.
    pub fn update_all<S: RenderSink + ?Sized>(
        &mut self,
        camera: Vec3,
        multiplier: f32,
        sink: &mut S,
    ) -> usize {
        let multiplier = effective_multiplier(multiplier);
        let mut switched = 0;
        for entry in &mut self.entries {
            if update_entry(entry, camera, multiplier, sink) {
                switched += 1;
            }
        }
        switched
    }

    fn index_of(&self, handle: LodHandle) -> Option<usize> {
        self.entries
            .binary_search_by_key(&handle.0, |entry| entry.handle.0)
            .ok()
    }

    fn entry_mut(&mut self, handle: LodHandle) -> Option<&mut LodEntry> {
        self.index_of(handle).map(|index| &mut self.entries[index])
    }
}

fn effective_multiplier(multiplier: f32) -> f32 {
    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    }
}

fn update_entry<S: RenderSink + ?Sized>(
    entry: &mut LodEntry,
    camera: Vec3,
    multiplier: f32,
    sink: &mut S,
) -> bool {
    let distance = entry.position.distance(camera);
    let next = select_level(&entry.levels, distance, multiplier);
    if entry.current_level == Some(next) {
        return false;
    }

    if let Some(previous) = entry.visible_representation() {
        if let Err(error) = sink.set_representation_visible(previous, false) {
            warn!(
                handle = entry.handle.raw(),
                representation = previous.0,
                error = %error,
                "lod_hide_failed"
            );
        }
    }
    let shown = entry.levels[next].representation;
    if let Err(error) = sink.set_representation_visible(shown, true) {
        warn!(
            handle = entry.handle.raw(),
            representation = shown.0,
            error = %error,
            "lod_show_failed"
        );
    }

    debug!(
        handle = entry.handle.raw(),
        from = ?entry.current_level,
        to = next,
        distance,
        "lod_level_changed"
    );
    entry.current_level = Some(next);
    true
}
