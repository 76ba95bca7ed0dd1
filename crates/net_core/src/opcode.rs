//! Opcode table and connection status.

/// Message opcodes. Server→client in the `0x0*`/`0x1*` range, client→server
/// in `0x2*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    EntityCreate = 0x01,
    EntityDestroy = 0x02,
    EntityMove = 0x03,
    EntityMoveStop = 0x04,
    DisplayInfo = 0x05,
    ResourceUpdate = 0x06,
    SetMover = 0x07,
    ContainerAdd = 0x10,
    ContainerRemove = 0x11,
    ContainerSwap = 0x12,
    CombatEvent = 0x13,
    TriggerUpdate = 0x14,
    Pong = 0x15,
    MoveUpdate = 0x20,
    TriggerEnterRequest = 0x21,
    Ping = 0x22,
}

impl Opcode {
    #[must_use]
    pub fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            0x01 => Self::EntityCreate,
            0x02 => Self::EntityDestroy,
            0x03 => Self::EntityMove,
            0x04 => Self::EntityMoveStop,
            0x05 => Self::DisplayInfo,
            0x06 => Self::ResourceUpdate,
            0x07 => Self::SetMover,
            0x10 => Self::ContainerAdd,
            0x11 => Self::ContainerRemove,
            0x12 => Self::ContainerSwap,
            0x13 => Self::CombatEvent,
            0x14 => Self::TriggerUpdate,
            0x15 => Self::Pong,
            0x20 => Self::MoveUpdate,
            0x21 => Self::TriggerEnterRequest,
            0x22 => Self::Ping,
            _ => return None,
        })
    }
}

/// Connection-level state machine: `Disconnected → Connecting → Connected`
/// and back to `Disconnected` on any teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Identifies the transport socket a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(pub u32);
