//! Minimal ECS scaffolding for the client world.
//!
//! A single simulation thread owns the [`World`]; entities are spawned by the
//! synchronization layer (networked units) and by the streaming loader
//! (placements). Components live in one record per entity so spawn/despawn
//! stay atomic — there is no scenario where an entity exists with half its
//! baseline components attached.

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools
)]

pub mod components;

use std::collections::HashMap;

use components::Components;

/// Entity handle local to this world (opaque, never reused within a session).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u32);

impl Entity {
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// The client-side entity store. Despawn is a first-class operation here
/// (server destroys, disconnect teardown), so records live in a map rather
/// than an append-only column.
#[derive(Default, Debug)]
pub struct World {
    next_id: u32,
    ents: HashMap<Entity, Components>,
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ents: HashMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ents.is_empty()
    }

    pub fn spawn(&mut self, c: Components) -> Entity {
        let e = Entity(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        if self.next_id == 0 {
            self.next_id = 1;
        }
        self.ents.insert(e, c);
        e
    }

    /// Remove an entity. Returns its components so callers can release
    /// attached resources (model instances, physics bodies) after the fact.
    pub fn despawn(&mut self, e: Entity) -> Option<Components> {
        self.ents.remove(&e)
    }

    #[must_use]
    pub fn contains(&self, e: Entity) -> bool {
        self.ents.contains_key(&e)
    }

    #[must_use]
    pub fn get(&self, e: Entity) -> Option<&Components> {
        self.ents.get(&e)
    }

    pub fn get_mut(&mut self, e: Entity) -> Option<&mut Components> {
        self.ents.get_mut(&e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &Components)> {
        self.ents.iter().map(|(e, c)| (*e, c))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut Components)> {
        self.ents.iter_mut().map(|(e, c)| (*e, c))
    }
}
