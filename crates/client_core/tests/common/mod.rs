//! Full-session harness: world, loader with null engine backends, display
//! table, and a loopback transport channel.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use asset_core::format::{AssetKind, ParsedAsset};
use asset_core::loader::{PhysicsWorld, RendererUpload, StreamingLoader};
use client_core::events::{EventQueue, ScriptEvent};
use client_core::input::InputState;
use client_core::mover::{FlatGroundBody, MoverState};
use client_core::replication::{self, Replication, SessionCtx};
use client_core::systems;
use client_core::triggers::TriggerIndex;
use data_runtime::configs::mover::MoverTuning;
use data_runtime::configs::streaming::StreamingBudget;
use data_runtime::display::{DisplayRecord, DisplayTable};
use ecs_core::components::{BodyId, InstanceId, ModelId, Transform};
use ecs_core::{Entity, World};
use net_core::channel::{channel_bounded, Rx, Tx};
use net_core::message::encode_framed;
use net_core::opcode::{Opcode, SocketId};
use net_core::wire::WireEncode;

#[derive(Default)]
pub struct NullRenderer {
    next: AtomicU32,
}

impl RendererUpload for NullRenderer {
    fn load_model(&self, _name: &str, _asset: &ParsedAsset) -> ModelId {
        ModelId(self.next.fetch_add(1, Ordering::Relaxed))
    }
    fn add_placement_instance(
        &self,
        _entity: Entity,
        _model: ModelId,
        _hash: u32,
        _transform: &Transform,
        _doodad_set: u16,
    ) -> InstanceId {
        InstanceId(self.next.fetch_add(1, Ordering::Relaxed))
    }
    fn add_instance(
        &self,
        _entity: Entity,
        _model: ModelId,
        _hash: u32,
        _transform: &Transform,
    ) -> InstanceId {
        InstanceId(self.next.fetch_add(1, Ordering::Relaxed))
    }
    fn modify_instance(&self, _instance: InstanceId, _model: ModelId) {}
    fn remove_instance(&self, _instance: InstanceId) {}
}

#[derive(Default)]
pub struct NullPhysics {
    next: AtomicU32,
}

impl PhysicsWorld for NullPhysics {
    fn create_static_body(&self, _shape: &[u8], _transform: &Transform) -> Option<BodyId> {
        Some(BodyId(self.next.fetch_add(1, Ordering::Relaxed)))
    }
    fn create_kinematic_body(&self, _shape: &[u8], _transform: &Transform) -> Option<BodyId> {
        Some(BodyId(self.next.fetch_add(1, Ordering::Relaxed)))
    }
    fn remove_body(&self, _body: BodyId) {}
}

pub struct Harness {
    pub world: World,
    pub loader: StreamingLoader,
    pub display: DisplayTable,
    pub rep: Replication,
    pub mover: MoverState,
    pub triggers: TriggerIndex,
    pub events: EventQueue<ScriptEvent>,
    pub tx: Tx,
    pub rx: Rx,
    pub now_ms: u32,
}

pub const DISPLAY_HUMAN: u32 = 100;
pub const DISPLAY_BEAR: u32 = 200;
pub const MODEL_HUMAN: &str = "units/human/human.cmdl";
pub const MODEL_BEAR: &str = "units/bear/bear.cmdl";
/// Resolvable display id whose model file was never discovered.
pub const DISPLAY_GHOST: u32 = 300;

fn parsed_model() -> ParsedAsset {
    ParsedAsset {
        kind: AssetKind::Model,
        vertex_count: 12,
        index_count: 18,
        physics_blob: None,
    }
}

#[allow(dead_code)]
impl Harness {
    pub fn connected() -> Self {
        let mut loader = StreamingLoader::new(
            Arc::new(NullRenderer::default()),
            Arc::new(NullPhysics::default()),
            StreamingBudget::default(),
        );
        loader.register_asset(MODEL_HUMAN, parsed_model());
        loader.register_asset(MODEL_BEAR, parsed_model());
        loader.finish_discovery();

        let display = DisplayTable::from_records(vec![
            DisplayRecord {
                id: DISPLAY_HUMAN,
                model: MODEL_HUMAN.to_string(),
                variants: Vec::new(),
            },
            DisplayRecord {
                id: DISPLAY_BEAR,
                model: MODEL_BEAR.to_string(),
                variants: Vec::new(),
            },
            DisplayRecord {
                id: DISPLAY_GHOST,
                model: "units/ghost/ghost.cmdl".to_string(),
                variants: Vec::new(),
            },
        ]);

        let mut world = World::new();
        let mut mover =
            MoverState::new(Box::new(FlatGroundBody::new(0.0)), MoverTuning::default());
        let mut rep = Replication::new();
        rep.begin_connect();
        rep.on_connected(&mut world, &mut loader, &mut mover);

        let (tx, rx) = channel_bounded(256);
        Self {
            world,
            loader,
            display,
            rep,
            mover,
            triggers: TriggerIndex::new(),
            events: EventQueue::new(),
            tx,
            rx,
            now_ms: 0,
        }
    }

    pub fn send<M: WireEncode>(&self, opcode: Opcode, msg: &M) {
        assert!(self.tx.try_send(encode_framed(opcode, msg)), "channel full");
    }

    pub fn tick(&mut self, input: &InputState, dt: f32) -> bool {
        let mut ctx = SessionCtx {
            world: &mut self.world,
            loader: &mut self.loader,
            display: &self.display,
            rep: &mut self.rep,
            mover: &mut self.mover,
            triggers: &mut self.triggers,
            events: &mut self.events,
            now_ms: self.now_ms,
        };
        systems::run_tick(&mut ctx, SocketId(1), &self.rx, input, dt)
    }

    pub fn idle_tick(&mut self) -> bool {
        self.tick(&InputState::default(), 1.0 / 60.0)
    }

    pub fn flush(&mut self, dt: f32) -> Vec<Vec<u8>> {
        replication::flush_outbound(&mut self.rep, &mut self.world, dt, self.now_ms)
    }

    pub fn disconnect(&mut self) {
        let mut ctx = SessionCtx {
            world: &mut self.world,
            loader: &mut self.loader,
            display: &self.display,
            rep: &mut self.rep,
            mover: &mut self.mover,
            triggers: &mut self.triggers,
            events: &mut self.events,
            now_ms: self.now_ms,
        };
        replication::disconnect(&mut ctx);
    }

    /// Events published during the last tick (they become readable after the
    /// next swap, so run one idle tick first).
    pub fn drain_events(&mut self) -> Vec<ScriptEvent> {
        self.events.swap();
        self.events.drain().collect()
    }
}
