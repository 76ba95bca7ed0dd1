//! Entity synchronization: inbound message application and outbound
//! replication of the local mover.
//!
//! Handlers run on the simulation thread between input sampling and the
//! controller update. Stale references (an id the client no longer knows) are
//! consumed with a warning; only malformed frames and protocol violations
//! report `false`, which the session answers by disconnecting.

use glam::Vec3;

use asset_core::loader::StreamingLoader;
use data_runtime::display::DisplayTable;
use ecs_core::components::{
    Components, DisplayInfo, MoveFlags, MoveInterp, NetId, NetKind, EQUIPMENT_SLOTS,
};
use ecs_core::{Entity, World};
use net_core::channel::Rx;
use net_core::dispatch::HandlerTable;
use net_core::frame;
use net_core::message::{
    encode_framed, CombatEvent, ContainerAdd, ContainerRemove, ContainerSwap, DisplayInfoMsg,
    EntityCreate, EntityDestroy, EntityMove, EntityMoveStop, MoveUpdate, Ping, Pong,
    ResourceUpdate, SetMover, TriggerEnterRequest, TriggerUpdate, RESOURCE_HEALTH,
    RESOURCE_POWER,
};
use net_core::opcode::{ConnectionStatus, Opcode, SocketId};
use net_core::wire::WireDecode;

use crate::events::{EventQueue, ScriptEvent};
use crate::mover::MoverState;
use crate::triggers::TriggerIndex;

/// Seconds over which an authoritative position sample is eased in.
const INTERP_WINDOW: f32 = 0.1;

/// Ping cadence, seconds.
const PING_INTERVAL: f32 = 5.0;

/// Fixed-size ring of one-way latency samples (RTT/2); the average smooths
/// over jitter.
#[derive(Debug, Clone, Copy)]
pub struct PingRing {
    samples: [f32; 16],
    len: usize,
    next: usize,
}

impl Default for PingRing {
    fn default() -> Self {
        Self {
            samples: [0.0; 16],
            len: 0,
            next: 0,
        }
    }
}

impl PingRing {
    pub fn push(&mut self, latency_ms: f32) {
        self.samples[self.next] = latency_ms;
        self.next = (self.next + 1) % self.samples.len();
        self.len = (self.len + 1).min(self.samples.len());
    }

    #[must_use]
    pub fn average_ms(&self) -> Option<f32> {
        if self.len == 0 {
            return None;
        }
        Some(self.samples[..self.len].iter().sum::<f32>() / self.len as f32)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Bidirectional id map between server ids and local entity handles.
#[derive(Debug, Default)]
pub struct NetMap {
    by_net: std::collections::HashMap<NetId, Entity>,
    by_ent: std::collections::HashMap<Entity, NetId>,
}

impl NetMap {
    pub fn insert(&mut self, id: NetId, entity: Entity) {
        self.by_net.insert(id, entity);
        self.by_ent.insert(entity, id);
    }

    #[must_use]
    pub fn entity(&self, id: NetId) -> Option<Entity> {
        self.by_net.get(&id).copied()
    }

    #[must_use]
    pub fn net_id(&self, entity: Entity) -> Option<NetId> {
        self.by_ent.get(&entity).copied()
    }

    pub fn remove(&mut self, id: NetId) -> Option<Entity> {
        let entity = self.by_net.remove(&id)?;
        self.by_ent.remove(&entity);
        Some(entity)
    }

    pub fn drain_entities(&mut self) -> Vec<Entity> {
        let out: Vec<Entity> = self.by_ent.keys().copied().collect();
        self.by_net.clear();
        self.by_ent.clear();
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_net.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_net.is_empty()
    }
}

/// Connection-scoped synchronization state.
pub struct Replication {
    pub status: ConnectionStatus,
    pub map: NetMap,
    pub ping: PingRing,
    /// Entity the server granted input authority over.
    pub local_player: Option<Entity>,
    outbound: Vec<Vec<u8>>,
    next_ping: f32,
}

impl Default for Replication {
    fn default() -> Self {
        Self::new()
    }
}

impl Replication {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            map: NetMap::default(),
            ping: PingRing::default(),
            local_player: None,
            outbound: Vec::new(),
            next_ping: 0.0,
        }
    }

    pub fn begin_connect(&mut self) {
        self.status = ConnectionStatus::Connecting;
    }

    /// Transport handshake finished; full message traffic is now legal. The
    /// login placeholder goes away here, before `SetMover` names the real
    /// mover, so no `MoveUpdate` is ever sent for an entity without a
    /// network id.
    pub fn on_connected(
        &mut self,
        world: &mut World,
        loader: &mut StreamingLoader,
        mover: &mut MoverState,
    ) {
        self.status = ConnectionStatus::Connected;
        self.next_ping = 0.0;
        if let Some(placeholder) = self.local_player.take() {
            mover.unbind();
            loader.request_unload(placeholder);
            world.despawn(placeholder);
        }
    }

    pub fn queue_outbound(&mut self, frame: Vec<u8>) {
        self.outbound.push(frame);
    }
}

/// Everything the inbound handlers may touch, borrowed for one drain call.
pub struct SessionCtx<'a> {
    pub world: &'a mut World,
    pub loader: &'a mut StreamingLoader,
    pub display: &'a DisplayTable,
    pub rep: &'a mut Replication,
    pub mover: &'a mut MoverState,
    pub triggers: &'a mut TriggerIndex,
    pub events: &'a mut EventQueue<ScriptEvent>,
    /// Monotonic session clock, milliseconds. Pong RTT math needs it.
    pub now_ms: u32,
}

fn handler_table<'a>() -> HandlerTable<SessionCtx<'a>> {
    use ConnectionStatus::Connected;
    let mut t = HandlerTable::new();
    t.register(
        Opcode::EntityCreate,
        Connected,
        EntityCreate::MIN_LEN,
        on_entity_create,
    );
    t.register(
        Opcode::EntityDestroy,
        Connected,
        EntityDestroy::MIN_LEN,
        on_entity_destroy,
    );
    t.register(
        Opcode::EntityMove,
        Connected,
        EntityMove::MIN_LEN,
        on_entity_move,
    );
    t.register(
        Opcode::EntityMoveStop,
        Connected,
        EntityMoveStop::MIN_LEN,
        on_entity_move_stop,
    );
    t.register(
        Opcode::DisplayInfo,
        Connected,
        DisplayInfoMsg::MIN_LEN,
        on_display_info,
    );
    t.register(
        Opcode::ResourceUpdate,
        Connected,
        ResourceUpdate::MIN_LEN,
        on_resource_update,
    );
    t.register(Opcode::SetMover, Connected, SetMover::MIN_LEN, on_set_mover);
    t.register(
        Opcode::ContainerAdd,
        Connected,
        ContainerAdd::MIN_LEN,
        on_container_add,
    );
    t.register(
        Opcode::ContainerRemove,
        Connected,
        ContainerRemove::MIN_LEN,
        on_container_remove,
    );
    t.register(
        Opcode::ContainerSwap,
        Connected,
        ContainerSwap::MIN_LEN,
        on_container_swap,
    );
    t.register(
        Opcode::CombatEvent,
        Connected,
        CombatEvent::MIN_LEN,
        on_combat_event,
    );
    t.register(
        Opcode::TriggerUpdate,
        Connected,
        TriggerUpdate::MIN_LEN,
        on_trigger_update,
    );
    t.register(Opcode::Pong, Connected, Pong::MIN_LEN, on_pong);
    t
}

/// Drain every frame waiting on the transport channel. Returns false when a
/// protocol violation requires the session to disconnect.
pub fn drain_inbound(ctx: &mut SessionCtx<'_>, socket: SocketId, rx: &Rx) -> bool {
    let table = handler_table();
    for buf in rx.drain() {
        let (opcode, payload) = match frame::read_msg(&buf) {
            Ok(x) => x,
            Err(e) => {
                log::error!("inbound frame rejected: {e:#}");
                return false;
            }
        };
        let status = ctx.rep.status;
        if !table.dispatch(ctx, socket, status, opcode, payload) {
            return false;
        }
    }
    true
}

/// Flush the outbound side for one tick: at most one `MoveUpdate`, any queued
/// trigger-enter requests, and a `Ping` on its cadence.
pub fn flush_outbound(
    rep: &mut Replication,
    world: &mut World,
    dt: f32,
    now_ms: u32,
) -> Vec<Vec<u8>> {
    let mut out = std::mem::take(&mut rep.outbound);
    if rep.status != ConnectionStatus::Connected {
        out.clear();
        return out;
    }
    if let Some(entity) = rep.local_player {
        if let Some(c) = world.get_mut(entity) {
            if std::mem::take(&mut c.movement.dirty) {
                out.push(encode_framed(
                    Opcode::MoveUpdate,
                    &MoveUpdate {
                        pos: c.tr.translation.to_array(),
                        yaw: c.tr.yaw(),
                        flags: c.movement.flags.0,
                    },
                ));
            }
        }
    }
    rep.next_ping -= dt;
    if rep.next_ping <= 0.0 {
        rep.next_ping = PING_INTERVAL;
        out.push(encode_framed(
            Opcode::Ping,
            &Ping {
                client_time_ms: now_ms,
            },
        ));
    }
    out
}

/// Full teardown on disconnect: every networked entity despawns (instances
/// released through the loader), id maps and ping history clear, and a fresh
/// placeholder entity keeps the local controller alive for the login scene.
pub fn disconnect(ctx: &mut SessionCtx<'_>) {
    for entity in ctx.rep.map.drain_entities() {
        ctx.loader.request_unload(entity);
        ctx.world.despawn(entity);
    }
    ctx.triggers.clear();
    ctx.rep.ping.reset();
    ctx.rep.outbound.clear();
    ctx.rep.status = ConnectionStatus::Disconnected;

    let mut c = Components::default();
    c.is_player = true;
    let placeholder = ctx.world.spawn(c);
    ctx.rep.local_player = Some(placeholder);
    ctx.mover.bind(placeholder, Vec3::ZERO, 0.0);
    ctx.events.publish(ScriptEvent::Disconnected);
}

// ---- inbound handlers ------------------------------------------------------

fn decode<M: WireDecode>(cur: &mut &[u8]) -> Option<M> {
    match M::decode(cur) {
        Ok(m) => Some(m),
        Err(e) => {
            log::error!("malformed payload: {e:#}");
            None
        }
    }
}

fn on_entity_create(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<EntityCreate>(cur) else {
        return false;
    };
    let id = NetId(msg.id);
    if ctx.rep.map.entity(id).is_some() {
        // Duplicate create: the server resent state we already hold.
        log::warn!("entity create for known id {:#010x}", id.0);
        return true;
    }
    let mut c = Components::default();
    c.tr.translation = Vec3::from_array(msg.pos);
    c.tr.set_yaw(msg.yaw);
    c.tr.scale = Vec3::splat(msg.scale);
    c.is_player = id.kind() == NetKind::Player;
    let entity = ctx.world.spawn(c);
    ctx.rep.map.insert(id, entity);
    if msg.display_id != 0 {
        ctx.loader.load_display_for_entity(
            ctx.world,
            entity,
            ctx.display,
            DisplayInfo {
                display_id: msg.display_id,
                ..DisplayInfo::default()
            },
        );
    }
    ctx.events.publish(ScriptEvent::EntityCreated { id });
    true
}

fn on_entity_destroy(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<EntityDestroy>(cur) else {
        return false;
    };
    let id = NetId(msg.id);
    let Some(entity) = ctx.rep.map.remove(id) else {
        log::warn!("entity destroy for unknown id {:#010x}", id.0);
        return true;
    };
    if ctx.rep.local_player == Some(entity) {
        log::warn!("server destroyed the local mover {:#010x}", id.0);
        ctx.rep.local_player = None;
        ctx.mover.unbind();
    }
    ctx.loader.request_unload(entity);
    ctx.world.despawn(entity);
    ctx.events.publish(ScriptEvent::EntityDestroyed { id });
    true
}

fn on_entity_move(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<EntityMove>(cur) else {
        return false;
    };
    let Some(entity) = ctx.rep.map.entity(NetId(msg.id)) else {
        log::warn!("entity move for unknown id {:#010x}", msg.id);
        return true;
    };
    let Some(c) = ctx.world.get_mut(entity) else {
        return true;
    };
    // Position eases in over the interp window; rotation snaps.
    c.interp = Some(MoveInterp {
        start: c.tr.translation,
        end: Vec3::from_array(msg.pos),
        t: 0.0,
        dur: INTERP_WINDOW,
    });
    c.tr.set_yaw(msg.yaw);
    c.movement.flags = MoveFlags(msg.flags);
    true
}

fn on_entity_move_stop(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<EntityMoveStop>(cur) else {
        return false;
    };
    // Reserved protocol surface: validate the reference, mutate nothing.
    if ctx.rep.map.entity(NetId(msg.id)).is_none() {
        log::warn!("move stop for unknown id {:#010x}", msg.id);
    }
    true
}

fn on_display_info(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<DisplayInfoMsg>(cur) else {
        return false;
    };
    let id = NetId(msg.id);
    let Some(entity) = ctx.rep.map.entity(id) else {
        log::warn!("display info for unknown id {:#010x}", msg.id);
        return true;
    };
    ctx.loader.load_display_for_entity(
        ctx.world,
        entity,
        ctx.display,
        DisplayInfo {
            display_id: msg.display_id,
            race: msg.race,
            gender: msg.gender,
            variant: msg.variant,
        },
    );
    ctx.events.publish(ScriptEvent::DisplayChanged {
        id,
        display_id: msg.display_id,
    });
    true
}

fn on_resource_update(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<ResourceUpdate>(cur) else {
        return false;
    };
    let id = NetId(msg.id);
    let Some(entity) = ctx.rep.map.entity(id) else {
        log::warn!("resource update for unknown id {:#010x}", msg.id);
        return true;
    };
    let Some(c) = ctx.world.get_mut(entity) else {
        return true;
    };
    let stat = match msg.kind {
        RESOURCE_HEALTH => &mut c.resources.health,
        RESOURCE_POWER => &mut c.resources.power,
        k => {
            log::error!("resource update with unknown kind {k}");
            return false;
        }
    };
    // Server values overwrite wholesale; never clamped or interpolated.
    stat.current = msg.current;
    stat.base = msg.base;
    stat.max = msg.max;
    ctx.events
        .publish(ScriptEvent::ResourcesChanged { id, kind: msg.kind });
    true
}

fn on_set_mover(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<SetMover>(cur) else {
        return false;
    };
    let Some(entity) = ctx.rep.map.entity(NetId(msg.id)) else {
        log::warn!("set mover for unknown id {:#010x}", msg.id);
        return true;
    };
    ctx.rep.local_player = Some(entity);
    if let Some(c) = ctx.world.get_mut(entity) {
        c.is_player = true;
        c.interp = None;
        let (pos, yaw) = (c.tr.translation, c.tr.yaw());
        ctx.mover.bind(entity, pos, yaw);
    }
    true
}

fn on_container_add(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<ContainerAdd>(cur) else {
        return false;
    };
    if usize::from(msg.slot) >= EQUIPMENT_SLOTS {
        log::error!("container add slot {} out of range", msg.slot);
        return false;
    }
    if let Some(c) = local_components(ctx) {
        c.equipment.slots[usize::from(msg.slot)] = msg.item;
    }
    ctx.events.publish(ScriptEvent::ContainerChanged {
        container: msg.container,
        slot: msg.slot,
    });
    true
}

fn on_container_remove(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<ContainerRemove>(cur) else {
        return false;
    };
    if usize::from(msg.slot) >= EQUIPMENT_SLOTS {
        log::error!("container remove slot {} out of range", msg.slot);
        return false;
    }
    if let Some(c) = local_components(ctx) {
        c.equipment.slots[usize::from(msg.slot)] = 0;
    }
    ctx.events.publish(ScriptEvent::ContainerChanged {
        container: msg.container,
        slot: msg.slot,
    });
    true
}

fn on_container_swap(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<ContainerSwap>(cur) else {
        return false;
    };
    let (a, b) = (usize::from(msg.slot_a), usize::from(msg.slot_b));
    if a >= EQUIPMENT_SLOTS || b >= EQUIPMENT_SLOTS {
        log::error!("container swap slots {a}/{b} out of range");
        return false;
    }
    if let Some(c) = local_components(ctx) {
        c.equipment.slots.swap(a, b);
    }
    ctx.events.publish(ScriptEvent::ContainerChanged {
        container: msg.container,
        slot: msg.slot_a,
    });
    true
}

fn on_combat_event(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<CombatEvent>(cur) else {
        return false;
    };
    // Pure notification; entity state is only changed by resource updates.
    ctx.events.publish(ScriptEvent::Combat {
        attacker: NetId(msg.attacker),
        target: NetId(msg.target),
        amount: msg.amount,
        kind: msg.kind,
    });
    true
}

fn on_trigger_update(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<TriggerUpdate>(cur) else {
        return false;
    };
    ctx.triggers.apply(
        msg.trigger,
        msg.op,
        msg.flags,
        Vec3::from_array(msg.min),
        Vec3::from_array(msg.max),
    )
}

fn on_pong(ctx: &mut SessionCtx<'_>, _s: SocketId, cur: &mut &[u8]) -> bool {
    let Some(msg) = decode::<Pong>(cur) else {
        return false;
    };
    // The ring holds one-way latency, so half the measured round trip.
    let rtt = ctx.now_ms.saturating_sub(msg.client_time_ms);
    ctx.rep.ping.push(rtt as f32 / 2.0);
    true
}

fn local_components<'a>(ctx: &'a mut SessionCtx<'_>) -> Option<&'a mut Components> {
    let entity = ctx.rep.local_player?;
    ctx.world.get_mut(entity)
}

/// Build the outbound frame asking the server to fire a server-auth trigger.
#[must_use]
pub fn trigger_enter_frame(trigger: u32) -> Vec<u8> {
    encode_framed(Opcode::TriggerEnterRequest, &TriggerEnterRequest { trigger })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_map_stays_symmetric() {
        let mut world = World::new();
        let mut map = NetMap::default();
        let id = NetId::new(NetId::TAG_UNIT, 3);
        let e = world.spawn(Components::default());
        map.insert(id, e);
        assert_eq!(map.entity(id), Some(e));
        assert_eq!(map.net_id(e), Some(id));

        assert_eq!(map.remove(id), Some(e));
        assert!(map.entity(id).is_none());
        assert!(map.net_id(e).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn drain_clears_both_directions() {
        let mut world = World::new();
        let mut map = NetMap::default();
        for i in 0..4 {
            let e = world.spawn(Components::default());
            map.insert(NetId::new(NetId::TAG_UNIT, i), e);
        }
        let drained = map.drain_entities();
        assert_eq!(drained.len(), 4);
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }
}
