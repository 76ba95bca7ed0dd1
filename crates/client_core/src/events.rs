//! Script event surface.
//!
//! Handlers publish into the back buffer; the queue swaps at the top of each
//! tick, so scripting always reads a stable snapshot and never observes
//! events published mid-iteration.

use ecs_core::components::NetId;

/// Events surfaced to scripting/UI. Network handlers and the trigger index
/// are the only publishers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEvent {
    EntityCreated { id: NetId },
    EntityDestroyed { id: NetId },
    DisplayChanged { id: NetId, display_id: u32 },
    ResourcesChanged { id: NetId, kind: u8 },
    ContainerChanged { container: u8, slot: u16 },
    Combat {
        attacker: NetId,
        target: NetId,
        amount: i32,
        kind: u8,
    },
    TriggerEntered { trigger: u32 },
    TriggerStay { trigger: u32 },
    TriggerExited { trigger: u32 },
    MapLoaded { map_id: u32 },
    Disconnected,
}

/// Double-buffered event queue. `publish` is always safe to call, including
/// from code running inside a `drain` consumer's tick.
#[derive(Debug)]
pub struct EventQueue<T> {
    front: Vec<T>,
    back: Vec<T>,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self {
            front: Vec::new(),
            back: Vec::new(),
        }
    }
}

impl<T> EventQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, ev: T) {
        self.back.push(ev);
    }

    /// Rotate buffers: everything published since the last swap becomes
    /// readable. Called once at the top of each tick. Events still in the
    /// front buffer (never drained) are dropped.
    pub fn swap(&mut self) {
        self.front.clear();
        std::mem::swap(&mut self.front, &mut self.back);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.front.drain(..)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.back.len()
    }
}
