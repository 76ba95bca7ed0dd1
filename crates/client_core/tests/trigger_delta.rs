//! Trigger occupancy over the session: local triggers fire script events,
//! server-authoritative ones turn into outbound enter requests.

mod common;

use client_core::events::ScriptEvent;
use client_core::input::InputState;
use ecs_core::components::NetId;
use net_core::message::{
    EntityCreate, SetMover, TriggerEnterRequest, TriggerUpdate, TRIGGER_FLAG_SERVER_AUTH,
    TRIGGER_OP_ADD,
};
use net_core::opcode::Opcode;
use net_core::wire::WireDecode;

fn setup_player(h: &mut common::Harness) {
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
}

fn trigger(id: u32, center: f32, flags: u32) -> TriggerUpdate {
    TriggerUpdate {
        trigger: id,
        op: TRIGGER_OP_ADD,
        flags,
        min: [center - 1.0; 3],
        max: [center + 1.0; 3],
    }
}

#[test]
fn local_trigger_enter_and_exit_events() {
    let mut h = common::Harness::connected();
    setup_player(&mut h);
    h.send(Opcode::TriggerUpdate, &trigger(5, 0.0, 0));
    assert!(h.idle_tick());
    let events = h.drain_events();
    assert!(events.contains(&ScriptEvent::TriggerEntered { trigger: 5 }));

    // Standing still inside: stay, not a re-enter.
    assert!(h.idle_tick());
    let events = h.drain_events();
    assert!(events.contains(&ScriptEvent::TriggerStay { trigger: 5 }));
    assert!(!events.contains(&ScriptEvent::TriggerEntered { trigger: 5 }));

    // Walk out of the volume.
    let run = InputState {
        forward: true,
        ..InputState::default()
    };
    assert!(h.tick(&run, 1.0));
    let events = h.drain_events();
    assert!(events.contains(&ScriptEvent::TriggerExited { trigger: 5 }));
    assert!(!events.contains(&ScriptEvent::TriggerEntered { trigger: 5 }));
}

#[test]
fn server_auth_trigger_requests_instead_of_firing() {
    let mut h = common::Harness::connected();
    setup_player(&mut h);
    h.send(
        Opcode::TriggerUpdate,
        &trigger(9, 0.0, TRIGGER_FLAG_SERVER_AUTH),
    );
    assert!(h.idle_tick());
    let events = h.drain_events();
    assert!(!events.contains(&ScriptEvent::TriggerEntered { trigger: 9 }));

    let frames = h.flush(1.0 / 60.0);
    let req = frames
        .iter()
        .find_map(|f| {
            let (op, mut payload) = net_core::frame::read_msg(f).ok()?;
            (op == Opcode::TriggerEnterRequest as u16)
                .then(|| TriggerEnterRequest::decode(&mut payload).ok())
                .flatten()
        })
        .expect("enter request queued");
    assert_eq!(req.trigger, 9);
}
