//! Outbound mover replication: at most one `MoveUpdate` per tick, and only
//! when movement state actually changed.

mod common;

use client_core::input::InputState;
use ecs_core::components::{MoveFlags, NetId};
use net_core::message::{EntityCreate, MoveUpdate, SetMover};
use net_core::opcode::Opcode;
use net_core::wire::WireDecode;

fn move_updates(frames: &[Vec<u8>]) -> Vec<MoveUpdate> {
    frames
        .iter()
        .filter_map(|f| {
            let (op, mut payload) = net_core::frame::read_msg(f).ok()?;
            (op == Opcode::MoveUpdate as u16)
                .then(|| MoveUpdate::decode(&mut payload).ok())
                .flatten()
        })
        .collect()
}

#[test]
fn one_move_update_per_dirty_tick() {
    let mut h = common::Harness::connected();
    let id = NetId::new(NetId::TAG_PLAYER, 1).0;
    h.send(
        Opcode::EntityCreate,
        &EntityCreate {
            id,
            pos: [0.0; 3],
            yaw: 0.0,
            scale: 1.0,
            display_id: 0,
        },
    );
    h.send(Opcode::SetMover, &SetMover { id });
    assert!(h.idle_tick());
    let _ = h.flush(1.0 / 60.0);

    // A 100ms frame runs six sub-steps; still exactly one update.
    let run = InputState {
        forward: true,
        ..InputState::default()
    };
    assert!(h.tick(&run, 0.1));
    let ups = move_updates(&h.flush(0.1));
    assert_eq!(ups.len(), 1);
    assert!(ups[0].pos[2] > 0.0);
    assert!(MoveFlags(ups[0].flags).contains(MoveFlags::FORWARD));

    // Releasing the key changes flags: one more update.
    assert!(h.idle_tick());
    assert_eq!(move_updates(&h.flush(1.0 / 60.0)).len(), 1);

    // Fully idle and unchanged: silence.
    assert!(h.idle_tick());
    assert!(move_updates(&h.flush(1.0 / 60.0)).is_empty());
}
