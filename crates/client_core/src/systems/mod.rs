//! Per-tick simulation systems and their ordering.

pub mod controller;

use glam::Vec3;

use ecs_core::World;
use net_core::channel::Rx;
use net_core::opcode::SocketId;

use crate::input::InputState;
use crate::replication::{self, SessionCtx};
use crate::events::ScriptEvent;

/// One simulation tick. Ordering is load-bearing:
/// 1. swap the script event queue (last tick's events become readable)
/// 2. apply inbound messages
/// 3. advance authoritative interpolation
/// 4. run the local character controller
/// 5. diff trigger occupancy at the post-move position
/// 6. pump the streaming loader and forward its lifecycle events
///
/// Returns false when a protocol violation forced a disconnect; the teardown
/// has already run by then.
pub fn run_tick(
    ctx: &mut SessionCtx<'_>,
    socket: SocketId,
    rx: &Rx,
    input: &InputState,
    dt: f32,
) -> bool {
    ctx.events.swap();

    if !replication::drain_inbound(ctx, socket, rx) {
        replication::disconnect(ctx);
        return false;
    }

    advance_interpolation(ctx.world, dt);
    controller::update(ctx.world, ctx.mover, input, dt);

    if let Some(pos) = ctx
        .rep
        .local_player
        .and_then(|e| ctx.world.get(e))
        .map(|c| c.tr.translation)
    {
        apply_trigger_deltas(ctx, pos);
    }

    ctx.loader.pump(ctx.world);
    for ev in ctx.loader.drain_events() {
        if let asset_core::loader::StreamEvent::MapLoaded { map_id, spawn } = ev {
            ctx.events.publish(ScriptEvent::MapLoaded { map_id });
            // Fresh map: re-seat the controller at the entry point.
            if let Some(entity) = ctx.mover.entity() {
                let yaw = ctx.mover.yaw();
                ctx.mover.bind(entity, spawn, yaw);
                if let Some(c) = ctx.world.get_mut(entity) {
                    c.tr.translation = spawn;
                }
            }
        }
    }
    true
}

/// Ease replicated positions toward their latest authoritative sample.
pub fn advance_interpolation(world: &mut World, dt: f32) {
    for (_, c) in world.iter_mut() {
        let Some(seg) = &mut c.interp else {
            continue;
        };
        seg.t += dt;
        let t = if seg.dur > 0.0 {
            (seg.t / seg.dur).min(1.0)
        } else {
            1.0
        };
        c.tr.translation = seg.start.lerp(seg.end, t);
        if t >= 1.0 {
            c.interp = None;
        }
    }
}

fn apply_trigger_deltas(ctx: &mut SessionCtx<'_>, pos: Vec3) {
    let deltas = ctx.triggers.update(pos);
    for trigger in deltas.entered {
        if ctx.triggers.server_authoritative(trigger) {
            // The server owns the enter; ask rather than fire locally.
            ctx.rep
                .queue_outbound(replication::trigger_enter_frame(trigger));
        } else {
            ctx.events.publish(ScriptEvent::TriggerEntered { trigger });
        }
    }
    // Only the enter edge is server-owned; stays and exits fire locally.
    for trigger in deltas.stayed {
        ctx.events.publish(ScriptEvent::TriggerStay { trigger });
    }
    for trigger in deltas.exited {
        ctx.events.publish(ScriptEvent::TriggerExited { trigger });
    }
}
