//! Failed loads restore the previous hash; later successes overwrite both
//! fields consistently. `loaded=true` with a never-loaded hash must be
//! impossible.

mod common;

use asset_core::format::{AssetKind, ParsedAsset};
use asset_core::hash::hash_path;
use asset_core::loader::{LoadState, StreamEvent};
use ecs_core::components::Components;
use ecs_core::World;

fn model(verts: u32) -> ParsedAsset {
    ParsedAsset {
        kind: AssetKind::Model,
        vertex_count: verts,
        index_count: verts,
        physics_blob: None,
    }
}

#[test]
fn failure_rolls_back_to_previous_hash() {
    let mut rig = common::rig();
    let old = rig.loader.register_asset("units/old.cmdl", model(10));
    let newer = rig.loader.register_asset("units/newer.cmdl", model(12));
    rig.loader.finish_discovery();

    let mut world = World::new();
    let e = world.spawn(Components::default());

    rig.loader.load_model_for_entity(&mut world, e, old);
    rig.loader.pump(&mut world);
    assert!(world.get(e).unwrap().model.loaded);
    let _ = rig.loader.drain_events();

    // Request an asset that was never discovered: content-absent failure.
    let missing = hash_path("units/missing.cmdl");
    rig.loader.load_model_for_entity(&mut world, e, missing);
    assert!(!world.get(e).unwrap().model.loaded);
    rig.loader.pump(&mut world);

    let m = world.get(e).unwrap().model;
    assert_eq!(m.hash, old, "previous hash restored");
    assert!(!m.loaded, "rollback never claims loaded");
    assert_eq!(rig.loader.load_state(missing), LoadState::Failed);

    let events = rig.loader.drain_events();
    let Some(StreamEvent::Model(ev)) = events.first() else {
        panic!("expected a lifecycle event, got {events:?}");
    };
    assert!(ev.rolled_back);
    assert!(!ev.loaded);
    assert_eq!(ev.hash, old);

    // A later success for a different hash overwrites both fields.
    rig.loader.load_model_for_entity(&mut world, e, newer);
    rig.loader.pump(&mut world);
    let m = world.get(e).unwrap().model;
    assert!(m.loaded);
    assert_eq!(m.hash, newer);
}

#[test]
fn failed_hash_is_never_retried() {
    let mut rig = common::rig();
    rig.loader.finish_discovery();
    let missing = hash_path("units/ghost.cmdl");

    let mut world = World::new();
    let e = world.spawn(Components::default());
    rig.loader.load_model_for_entity(&mut world, e, missing);
    rig.loader.pump(&mut world);
    assert_eq!(rig.loader.load_state(missing), LoadState::Failed);

    // Re-request: state stays Failed, no decode runs.
    rig.loader.load_model_for_entity(&mut world, e, missing);
    rig.loader.pump(&mut world);
    assert_eq!(rig.loader.load_state(missing), LoadState::Failed);
    assert_eq!(rig.loader.decodes_performed(), 0);
}
