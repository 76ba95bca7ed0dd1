//! Component definitions shared across the loader and synchronization crates.
//!
//! The id newtypes here are the only identities that cross crate (and thread)
//! boundaries: `NetId` is server-assigned, the renderer/physics handles are
//! opaque slots owned by their respective engines.

use glam::{Mat4, Quat, Vec3};

/// Server-assigned network identifier, globally unique for the session.
/// The top byte embeds the entity-type tag (see [`NetKind`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetId(pub u32);

/// Entity classification embedded in a [`NetId`]'s top byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetKind {
    Player,
    Unit,
    GameObject,
    Trigger,
    Unknown,
}

impl NetId {
    pub const TAG_PLAYER: u8 = 0x01;
    pub const TAG_UNIT: u8 = 0x02;
    pub const TAG_GAMEOBJECT: u8 = 0x03;
    pub const TAG_TRIGGER: u8 = 0x04;

    #[must_use]
    pub fn new(tag: u8, index: u32) -> Self {
        Self((u32::from(tag) << 24) | (index & 0x00ff_ffff))
    }

    #[must_use]
    pub fn kind(self) -> NetKind {
        match (self.0 >> 24) as u8 {
            Self::TAG_PLAYER => NetKind::Player,
            Self::TAG_UNIT => NetKind::Unit,
            Self::TAG_GAMEOBJECT => NetKind::GameObject,
            Self::TAG_TRIGGER => NetKind::Trigger,
            _ => NetKind::Unknown,
        }
    }
}

/// Renderer instance slot attached to one entity (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u32);

/// Renderer model slot (one per loaded asset hash, opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

/// Physics body handle (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Yaw (rotation about +Y), used by the controller's movement basis.
    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.rotation.to_euler(glam::EulerRot::YXZ).0
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.rotation = Quat::from_rotation_y(yaw);
    }
}

/// Movement-flags bitset, replicated on the wire as a raw `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveFlags(pub u16);

impl MoveFlags {
    pub const FORWARD: u16 = 1 << 0;
    pub const BACKWARD: u16 = 1 << 1;
    pub const LEFT: u16 = 1 << 2;
    pub const RIGHT: u16 = 1 << 3;
    pub const GROUNDED: u16 = 1 << 4;
    pub const JUMPING: u16 = 1 << 5;
    pub const JUST_GROUNDED: u16 = 1 << 6;
    pub const JUST_ENDED_JUMP: u16 = 1 << 7;

    #[must_use]
    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    pub fn set(&mut self, bit: u16, on: bool) {
        if on {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    /// Strip the one-tick edge bits; they must never persist across frames.
    pub fn clear_edges(&mut self) {
        self.0 &= !(Self::JUST_GROUNDED | Self::JUST_ENDED_JUMP);
    }
}

/// Model attachment state. `loaded` and `hash` are stamped synchronously at
/// load-request intake (last writer wins on intent); the streaming loader's
/// result application is the only place `loaded` flips back to `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelState {
    pub hash: u32,
    pub loaded: bool,
    pub instance: Option<InstanceId>,
}

/// Replicated movement state for entities other than the local mover.
#[derive(Debug, Clone, Copy, Default)]
pub struct Movement {
    pub flags: MoveFlags,
    /// Set when the networked transform changed and must be replicated out.
    pub dirty: bool,
}

/// One authoritative interpolation segment (entity-move reconciliation).
/// Positions ease from `start` to `end` over `dur` seconds; rotation is
/// applied immediately and never interpolated.
#[derive(Debug, Clone, Copy)]
pub struct MoveInterp {
    pub start: Vec3,
    pub end: Vec3,
    pub t: f32,
    pub dur: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub current: i32,
    pub base: i32,
    pub max: i32,
}

impl Default for Stat {
    fn default() -> Self {
        Self {
            current: 1,
            base: 1,
            max: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Resources {
    pub health: Stat,
    pub power: Stat,
}

impl Resources {
    #[must_use]
    pub fn alive(&self) -> bool {
        self.health.current > 0
    }
}

pub const EQUIPMENT_SLOTS: usize = 19;

/// Visible equipment by slot; zero means empty.
#[derive(Debug, Clone)]
pub struct Equipment {
    pub slots: [u32; EQUIPMENT_SLOTS],
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            slots: [0; EQUIPMENT_SLOTS],
        }
    }
}

/// Database display identity (resolved to a model via the display table).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayInfo {
    pub display_id: u32,
    pub race: u8,
    pub gender: u8,
    pub variant: u8,
}

/// Full per-entity component record.
#[derive(Debug, Clone, Default)]
pub struct Components {
    pub tr: Transform,
    pub model: ModelState,
    pub movement: Movement,
    pub interp: Option<MoveInterp>,
    pub resources: Resources,
    pub equipment: Equipment,
    pub display: DisplayInfo,
    pub is_player: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_id_kind_tag() {
        assert_eq!(NetId::new(NetId::TAG_PLAYER, 7).kind(), NetKind::Player);
        assert_eq!(NetId::new(NetId::TAG_TRIGGER, 1).kind(), NetKind::Trigger);
        assert_eq!(NetId(0xff00_0001).kind(), NetKind::Unknown);
        assert_eq!(NetId::new(NetId::TAG_UNIT, 0x00ff_ffff).0 & 0x00ff_ffff, 0x00ff_ffff);
    }

    #[test]
    fn move_flags_edges_clear() {
        let mut f = MoveFlags::default();
        f.set(MoveFlags::FORWARD, true);
        f.set(MoveFlags::JUST_GROUNDED, true);
        f.clear_edges();
        assert!(f.contains(MoveFlags::FORWARD));
        assert!(!f.contains(MoveFlags::JUST_GROUNDED));
    }

    #[test]
    fn yaw_roundtrip() {
        let mut t = Transform::default();
        t.set_yaw(1.25);
        assert!((t.yaw() - 1.25).abs() < 1e-5);
    }
}
