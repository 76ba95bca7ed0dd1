//! Client message schema.
//!
//! One struct per opcode; every type carries its `OPCODE` and the minimum
//! payload length the dispatch table gates on before the handler runs.
//! Fixed-size messages have `MIN_LEN` equal to their exact encoded size.

use crate::opcode::Opcode;
use crate::wire::{
    read_f32, read_i32, read_u16, read_u32, read_u8, read_vec3, write_f32, write_i32, write_u16,
    write_u32, write_u8, write_vec3, WireDecode, WireEncode,
};

/// Spawn a networked entity. `display_id` of zero means "no visual yet".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityCreate {
    pub id: u32,
    pub pos: [f32; 3],
    pub yaw: f32,
    pub scale: f32,
    pub display_id: u32,
}

impl EntityCreate {
    pub const OPCODE: Opcode = Opcode::EntityCreate;
    pub const MIN_LEN: usize = 4 + 12 + 4 + 4 + 4;
}

impl WireEncode for EntityCreate {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.id);
        write_vec3(out, self.pos);
        write_f32(out, self.yaw);
        write_f32(out, self.scale);
        write_u32(out, self.display_id);
    }
}

impl WireDecode for EntityCreate {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            id: read_u32(inp)?,
            pos: read_vec3(inp)?,
            yaw: read_f32(inp)?,
            scale: read_f32(inp)?,
            display_id: read_u32(inp)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDestroy {
    pub id: u32,
}

impl EntityDestroy {
    pub const OPCODE: Opcode = Opcode::EntityDestroy;
    pub const MIN_LEN: usize = 4;
}

impl WireEncode for EntityDestroy {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.id);
    }
}

impl WireDecode for EntityDestroy {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self { id: read_u32(inp)? })
    }
}

/// Authoritative movement sample. Position is interpolated client-side;
/// rotation is applied immediately; flags reconcile the jump state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityMove {
    pub id: u32,
    pub pos: [f32; 3],
    pub yaw: f32,
    pub flags: u16,
}

impl EntityMove {
    pub const OPCODE: Opcode = Opcode::EntityMove;
    pub const MIN_LEN: usize = 4 + 12 + 4 + 2;
}

impl WireEncode for EntityMove {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.id);
        write_vec3(out, self.pos);
        write_f32(out, self.yaw);
        write_u16(out, self.flags);
    }
}

impl WireDecode for EntityMove {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            id: read_u32(inp)?,
            pos: read_vec3(inp)?,
            yaw: read_f32(inp)?,
            flags: read_u16(inp)?,
        })
    }
}

/// Currently-unused protocol surface; the handler validates the id and
/// otherwise does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMoveStop {
    pub id: u32,
}

impl EntityMoveStop {
    pub const OPCODE: Opcode = Opcode::EntityMoveStop;
    pub const MIN_LEN: usize = 4;
}

impl WireEncode for EntityMoveStop {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.id);
    }
}

impl WireDecode for EntityMoveStop {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self { id: read_u32(inp)? })
    }
}

/// Appearance change; triggers a display-id model re-resolve on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfoMsg {
    pub id: u32,
    pub display_id: u32,
    pub race: u8,
    pub gender: u8,
    pub variant: u8,
}

impl DisplayInfoMsg {
    pub const OPCODE: Opcode = Opcode::DisplayInfo;
    pub const MIN_LEN: usize = 4 + 4 + 3;
}

impl WireEncode for DisplayInfoMsg {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.id);
        write_u32(out, self.display_id);
        write_u8(out, self.race);
        write_u8(out, self.gender);
        write_u8(out, self.variant);
    }
}

impl WireDecode for DisplayInfoMsg {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            id: read_u32(inp)?,
            display_id: read_u32(inp)?,
            race: read_u8(inp)?,
            gender: read_u8(inp)?,
            variant: read_u8(inp)?,
        })
    }
}

pub const RESOURCE_HEALTH: u8 = 0;
pub const RESOURCE_POWER: u8 = 1;

/// Direct overwrite of a stat triple; never interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceUpdate {
    pub id: u32,
    pub kind: u8,
    pub current: i32,
    pub base: i32,
    pub max: i32,
}

impl ResourceUpdate {
    pub const OPCODE: Opcode = Opcode::ResourceUpdate;
    pub const MIN_LEN: usize = 4 + 1 + 12;
}

impl WireEncode for ResourceUpdate {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.id);
        write_u8(out, self.kind);
        write_i32(out, self.current);
        write_i32(out, self.base);
        write_i32(out, self.max);
    }
}

impl WireDecode for ResourceUpdate {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            id: read_u32(inp)?,
            kind: read_u8(inp)?,
            current: read_i32(inp)?,
            base: read_i32(inp)?,
            max: read_i32(inp)?,
        })
    }
}

/// Server hands local input authority over `id` to this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetMover {
    pub id: u32,
}

impl SetMover {
    pub const OPCODE: Opcode = Opcode::SetMover;
    pub const MIN_LEN: usize = 4;
}

impl WireEncode for SetMover {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.id);
    }
}

impl WireDecode for SetMover {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self { id: read_u32(inp)? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerAdd {
    pub container: u8,
    pub slot: u16,
    pub item: u32,
    pub count: u32,
}

impl ContainerAdd {
    pub const OPCODE: Opcode = Opcode::ContainerAdd;
    pub const MIN_LEN: usize = 1 + 2 + 4 + 4;
}

impl WireEncode for ContainerAdd {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u8(out, self.container);
        write_u16(out, self.slot);
        write_u32(out, self.item);
        write_u32(out, self.count);
    }
}

impl WireDecode for ContainerAdd {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            container: read_u8(inp)?,
            slot: read_u16(inp)?,
            item: read_u32(inp)?,
            count: read_u32(inp)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRemove {
    pub container: u8,
    pub slot: u16,
}

impl ContainerRemove {
    pub const OPCODE: Opcode = Opcode::ContainerRemove;
    pub const MIN_LEN: usize = 1 + 2;
}

impl WireEncode for ContainerRemove {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u8(out, self.container);
        write_u16(out, self.slot);
    }
}

impl WireDecode for ContainerRemove {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            container: read_u8(inp)?,
            slot: read_u16(inp)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSwap {
    pub container: u8,
    pub slot_a: u16,
    pub slot_b: u16,
}

impl ContainerSwap {
    pub const OPCODE: Opcode = Opcode::ContainerSwap;
    pub const MIN_LEN: usize = 1 + 2 + 2;
}

impl WireEncode for ContainerSwap {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u8(out, self.container);
        write_u16(out, self.slot_a);
        write_u16(out, self.slot_b);
    }
}

impl WireDecode for ContainerSwap {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            container: read_u8(inp)?,
            slot_a: read_u16(inp)?,
            slot_b: read_u16(inp)?,
        })
    }
}

/// Transient combat notification; forwarded to scripting, no entity mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatEvent {
    pub attacker: u32,
    pub target: u32,
    pub amount: i32,
    pub kind: u8,
}

impl CombatEvent {
    pub const OPCODE: Opcode = Opcode::CombatEvent;
    pub const MIN_LEN: usize = 4 + 4 + 4 + 1;
}

impl WireEncode for CombatEvent {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.attacker);
        write_u32(out, self.target);
        write_i32(out, self.amount);
        write_u8(out, self.kind);
    }
}

impl WireDecode for CombatEvent {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            attacker: read_u32(inp)?,
            target: read_u32(inp)?,
            amount: read_i32(inp)?,
            kind: read_u8(inp)?,
        })
    }
}

pub const TRIGGER_OP_ADD: u8 = 0;
pub const TRIGGER_OP_MOVE: u8 = 1;
pub const TRIGGER_OP_REMOVE: u8 = 2;

/// Trigger-volume flag: the server is the source of truth for enter events;
/// the client must request rather than fire locally.
pub const TRIGGER_FLAG_SERVER_AUTH: u32 = 1;

/// Create, move, or remove a proximity trigger volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerUpdate {
    pub trigger: u32,
    pub op: u8,
    pub flags: u32,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl TriggerUpdate {
    pub const OPCODE: Opcode = Opcode::TriggerUpdate;
    pub const MIN_LEN: usize = 4 + 1 + 4 + 24;
}

impl WireEncode for TriggerUpdate {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.trigger);
        write_u8(out, self.op);
        write_u32(out, self.flags);
        write_vec3(out, self.min);
        write_vec3(out, self.max);
    }
}

impl WireDecode for TriggerUpdate {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            trigger: read_u32(inp)?,
            op: read_u8(inp)?,
            flags: read_u32(inp)?,
            min: read_vec3(inp)?,
            max: read_vec3(inp)?,
        })
    }
}

/// Pong carries back the client's send timestamp for RTT measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pong {
    pub client_time_ms: u32,
}

impl Pong {
    pub const OPCODE: Opcode = Opcode::Pong;
    pub const MIN_LEN: usize = 4;
}

impl WireEncode for Pong {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.client_time_ms);
    }
}

impl WireDecode for Pong {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            client_time_ms: read_u32(inp)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub client_time_ms: u32,
}

impl Ping {
    pub const OPCODE: Opcode = Opcode::Ping;
    pub const MIN_LEN: usize = 4;
}

impl WireEncode for Ping {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.client_time_ms);
    }
}

impl WireDecode for Ping {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            client_time_ms: read_u32(inp)?,
        })
    }
}

/// Outbound mover replication; sent only when movement state changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveUpdate {
    pub pos: [f32; 3],
    pub yaw: f32,
    pub flags: u16,
}

impl MoveUpdate {
    pub const OPCODE: Opcode = Opcode::MoveUpdate;
    pub const MIN_LEN: usize = 12 + 4 + 2;
}

impl WireEncode for MoveUpdate {
    fn encode(&self, out: &mut Vec<u8>) {
        write_vec3(out, self.pos);
        write_f32(out, self.yaw);
        write_u16(out, self.flags);
    }
}

impl WireDecode for MoveUpdate {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            pos: read_vec3(inp)?,
            yaw: read_f32(inp)?,
            flags: read_u16(inp)?,
        })
    }
}

/// Ask the server to fire a server-authoritative trigger's enter event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEnterRequest {
    pub trigger: u32,
}

impl TriggerEnterRequest {
    pub const OPCODE: Opcode = Opcode::TriggerEnterRequest;
    pub const MIN_LEN: usize = 4;
}

impl WireEncode for TriggerEnterRequest {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32(out, self.trigger);
    }
}

impl WireDecode for TriggerEnterRequest {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self> {
        Ok(Self {
            trigger: read_u32(inp)?,
        })
    }
}

/// Encode a message into a framed byte buffer ready for the transport.
pub fn encode_framed<M: WireEncode>(opcode: Opcode, msg: &M) -> Vec<u8> {
    let mut payload = Vec::new();
    msg.encode(&mut payload);
    let mut out = Vec::with_capacity(payload.len() + 7);
    crate::frame::write_msg(&mut out, opcode as u16, &payload);
    out
}
