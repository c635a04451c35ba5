//! Authoritative object state and identifier allocation.

use std::collections::BTreeMap;

use tilequest_core::{Capabilities, ObjectId, ObjectKind, ObjectTemplate, Sound, WorldRect};

/// Object stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct ObjectState {
    /// Name authored in the map.
    pub(crate) name: String,
    /// Behaviour and variant-specific state.
    pub(crate) kind: ObjectKind,
    /// World-space footprint.
    pub(crate) bounds: WorldRect,
    /// Capability flags; may change as the object is used.
    pub(crate) capabilities: Capabilities,
    /// Paint order used for hit-test priority.
    pub(crate) render_layer: u32,
    /// Sound requested on successful interaction.
    pub(crate) sound: Option<Sound>,
}

impl From<ObjectTemplate> for ObjectState {
    fn from(template: ObjectTemplate) -> Self {
        Self {
            name: template.name,
            kind: template.kind,
            bounds: template.bounds,
            capabilities: template.capabilities,
            render_layer: template.render_layer,
            sound: template.sound,
        }
    }
}

/// Registry that stores objects and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ObjectRegistry {
    entries: BTreeMap<ObjectId, ObjectState>,
    next_object_id: ObjectId,
}

impl ObjectRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_object_id: ObjectId::new(0),
        }
    }

    /// Stores the template and returns the identifier allocated for it.
    pub(crate) fn insert(&mut self, template: ObjectTemplate) -> ObjectId {
        let id = self.next_object_id;
        self.next_object_id = ObjectId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, ObjectState::from(template));
        id
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<ObjectState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: ObjectId) -> Option<&ObjectState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut ObjectState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectState)> {
        self.entries.iter().map(|(id, state)| (*id, state))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut ObjectState)> {
        self.entries.iter_mut().map(|(id, state)| (*id, state))
    }

    /// Drops every object and restarts identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_object_id = ObjectId::new(0);
    }
}
