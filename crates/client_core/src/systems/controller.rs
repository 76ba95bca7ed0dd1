//! Bridges the character controller into the entity world.

use ecs_core::World;

use crate::input::InputState;
use crate::mover::MoverState;

/// Run the controller for one frame and mirror the result onto the bound
/// entity. The mover's dirty bit transfers to the component so the outbound
/// flush sees exactly one pending `MoveUpdate` no matter how many sub-steps
/// ran.
pub fn update(world: &mut World, mover: &mut MoverState, input: &InputState, dt: f32) {
    let Some(entity) = mover.entity() else {
        return;
    };
    // A dead unit keeps simulating (gravity, landing) but ignores intent.
    let alive = world.get(entity).map_or(true, |c| c.resources.alive());
    let neutral = InputState::default();
    let input = if alive { input } else { &neutral };
    mover.update(input, dt);
    let dirty = mover.take_dirty();
    let Some(c) = world.get_mut(entity) else {
        log::warn!("mover bound to despawned entity {entity:?}");
        mover.unbind();
        return;
    };
    c.tr.translation = mover.position();
    c.tr.set_yaw(mover.yaw());
    c.movement.flags = mover.flags;
    if dirty {
        c.movement.dirty = true;
    }
}
