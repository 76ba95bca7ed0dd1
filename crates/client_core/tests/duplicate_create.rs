//! Stale and duplicate entity references are consumed without disconnecting.

mod common;

use client_core::events::ScriptEvent;
use ecs_core::components::NetId;
use net_core::message::{EntityCreate, EntityDestroy};
use net_core::opcode::Opcode;

fn create(id: u32) -> EntityCreate {
    EntityCreate {
        id,
        pos: [1.0, 0.0, 2.0],
        yaw: 0.3,
        scale: 1.0,
        display_id: common::DISPLAY_HUMAN,
    }
}

#[test]
fn duplicate_create_spawns_once() {
    let mut h = common::Harness::connected();
    let id = NetId::new(NetId::TAG_UNIT, 5).0;
    h.send(Opcode::EntityCreate, &create(id));
    h.send(Opcode::EntityCreate, &create(id));
    assert!(h.idle_tick());

    assert_eq!(h.rep.map.len(), 1);
    assert_eq!(h.world.len(), 1);
    let events = h.drain_events();
    let creates = events
        .iter()
        .filter(|e| matches!(e, ScriptEvent::EntityCreated { .. }))
        .count();
    assert_eq!(creates, 1);
}

#[test]
fn unknown_destroy_is_consumed() {
    let mut h = common::Harness::connected();
    h.send(
        Opcode::EntityDestroy,
        &EntityDestroy {
            id: NetId::new(NetId::TAG_UNIT, 999).0,
        },
    );
    // Stale reference, not a protocol violation: the session stays up.
    assert!(h.idle_tick());
    assert!(h.world.is_empty());
}

#[test]
fn create_then_destroy_releases_everything() {
    let mut h = common::Harness::connected();
    let id = NetId::new(NetId::TAG_UNIT, 5).0;
    h.send(Opcode::EntityCreate, &create(id));
    assert!(h.idle_tick());
    let entity = h.rep.map.entity(NetId(id)).expect("mapped");
    assert!(h.world.get(entity).unwrap().model.loaded);
    assert!(h.loader.instance_for_entity(entity).is_some());

    h.send(Opcode::EntityDestroy, &EntityDestroy { id });
    assert!(h.idle_tick());
    assert!(h.rep.map.is_empty());
    assert!(!h.world.contains(entity));
    assert!(h.loader.instance_for_entity(entity).is_none());
    assert_eq!(h.loader.live_instances(), 0);
}
