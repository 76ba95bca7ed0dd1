//! Proximity trigger volumes.
//!
//! The server replicates axis-aligned trigger boxes; every tick the index is
//! queried with the local player position and diffed against the previous
//! occupancy set to produce enter/stay/exit deltas. Server-authoritative
//! triggers own the enter edge; the client requests it from the server
//! instead of firing locally.

pub mod bvh;

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use net_core::message::{
    TRIGGER_FLAG_SERVER_AUTH, TRIGGER_OP_ADD, TRIGGER_OP_MOVE, TRIGGER_OP_REMOVE,
};

use bvh::{Aabb, AabbTree};

#[derive(Debug, Clone, Copy)]
struct Trigger {
    aabb: Aabb,
    flags: u32,
}

/// Occupancy change for one tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TriggerDeltas {
    pub entered: Vec<u32>,
    pub stayed: Vec<u32>,
    pub exited: Vec<u32>,
}

#[derive(Debug, Default)]
pub struct TriggerIndex {
    tree: AabbTree,
    triggers: HashMap<u32, Trigger>,
    /// Boxes changed since the last update; reinserted just before the query
    /// so a burst of moves costs one tree pass.
    dirty: Vec<u32>,
    inside: HashSet<u32>,
    scratch: Vec<u32>,
}

impl TriggerIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Apply one replicated trigger operation. Unknown ops are a protocol
    /// violation and return false.
    pub fn apply(&mut self, trigger: u32, op: u8, flags: u32, min: Vec3, max: Vec3) -> bool {
        match op {
            TRIGGER_OP_ADD | TRIGGER_OP_MOVE => {
                let aabb = Aabb::new(min, max);
                self.triggers.insert(trigger, Trigger { aabb, flags });
                self.dirty.push(trigger);
                true
            }
            TRIGGER_OP_REMOVE => {
                self.remove(trigger);
                true
            }
            _ => {
                log::error!("trigger {trigger}: unknown op {op}");
                false
            }
        }
    }

    pub fn remove(&mut self, trigger: u32) {
        self.triggers.remove(&trigger);
        self.tree.remove(trigger);
        // Occupancy is kept; the next update diffs the exit, so scripting
        // never stays stuck inside a vanished volume.
    }

    #[must_use]
    pub fn server_authoritative(&self, trigger: u32) -> bool {
        self.triggers
            .get(&trigger)
            .is_some_and(|t| t.flags & TRIGGER_FLAG_SERVER_AUTH != 0)
    }

    /// Flush pending box changes and diff occupancy at `pos`.
    pub fn update(&mut self, pos: Vec3) -> TriggerDeltas {
        for key in std::mem::take(&mut self.dirty) {
            if let Some(t) = self.triggers.get(&key) {
                self.tree.move_proxy(key, t.aabb);
            }
        }

        self.scratch.clear();
        self.tree.query_point(pos, &mut self.scratch);
        let mut now: HashSet<u32> = HashSet::with_capacity(self.scratch.len());
        for &key in &self.scratch {
            // Narrow-phase: the tree stores fattened boxes.
            if self
                .triggers
                .get(&key)
                .is_some_and(|t| t.aabb.contains_point(pos))
            {
                now.insert(key);
            }
        }

        let mut deltas = TriggerDeltas::default();
        for &key in &now {
            if self.inside.contains(&key) {
                deltas.stayed.push(key);
            } else {
                deltas.entered.push(key);
            }
        }
        for &key in &self.inside {
            if !now.contains(&key) {
                deltas.exited.push(key);
            }
        }
        deltas.entered.sort_unstable();
        deltas.stayed.sort_unstable();
        deltas.exited.sort_unstable();
        self.inside = now;
        deltas
    }

    /// Drop every volume and the occupancy set (map unload, disconnect).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
