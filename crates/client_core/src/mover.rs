//! Local character controller.
//!
//! The physics backend is abstracted behind [`CharacterBody`] so the
//! controller state machine runs (and tests) without a live physics engine.
//! The boxed body owns its engine-side resources; dropping or replacing the
//! box releases them.

use glam::Vec3;

use data_runtime::configs::mover::MoverTuning;
use ecs_core::components::MoveFlags;
use ecs_core::Entity;

use crate::input::InputState;

/// Keyboard turn rate, radians/second.
const TURN_SPEED: f32 = std::f32::consts::PI;

/// Gravity value the shipped `jump_power` was tuned against. A config that
/// raises gravity raises the impulse so jump height stays constant.
const DEFAULT_GRAVITY: f32 = 19.291_105;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundState {
    OnGround,
    InAir,
    /// Standing on a slope too steep to count as ground; gravity still
    /// applies and jumping is disallowed.
    OnSteepGround,
}

/// Physics-backed character volume. Implementations perform collide-and-slide
/// in `step` and report contact state afterwards.
pub trait CharacterBody: Send {
    fn ground_state(&self) -> GroundState;
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, v: Vec3);
    fn position(&self) -> Vec3;
    /// Integrate one fixed sub-step at the current velocity.
    fn step(&mut self, dt: f32);
    fn rebuild_shape(&mut self, radius: f32, half_height: f32);
    fn teleport(&mut self, pos: Vec3);
}

/// Jump state machine. `Begin` covers the rising arc, `Fall` everything from
/// apex to landing; falling off a ledge goes straight to `Fall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpPhase {
    #[default]
    None,
    Begin,
    Fall,
}

/// Linear-ease blend for the strafe lean applied to spine/head/waist bones.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoneBlend {
    start: f32,
    current: f32,
    target: f32,
    elapsed: f32,
}

impl BoneBlend {
    fn retarget(&mut self, target: f32) {
        if (target - self.target).abs() > f32::EPSILON {
            self.start = self.current;
            self.target = target;
            self.elapsed = 0.0;
        }
    }

    fn advance(&mut self, dt: f32, duration: f32) {
        self.elapsed = (self.elapsed + dt).min(duration.max(0.0));
        let t = if duration > 0.0 {
            self.elapsed / duration
        } else {
            1.0
        };
        self.current = self.start + (self.target - self.start) * t;
    }

    #[must_use]
    pub fn angle(&self) -> f32 {
        self.current
    }
}

/// Controller state for the one entity the server granted input authority
/// over. Physics only ever sees whole fixed sub-steps; variable frame dt
/// accumulates and is consumed in `fixed_step` slices.
pub struct MoverState {
    entity: Option<Entity>,
    body: Box<dyn CharacterBody>,
    tuning: MoverTuning,
    pub flags: MoveFlags,
    jump: JumpPhase,
    lean: BoneBlend,
    yaw: f32,
    accum: f32,
    dirty: bool,
    was_grounded: bool,
}

impl MoverState {
    #[must_use]
    pub fn new(mut body: Box<dyn CharacterBody>, tuning: MoverTuning) -> Self {
        body.rebuild_shape(tuning.capsule_radius, tuning.capsule_half_height);
        Self {
            entity: None,
            body,
            tuning,
            flags: MoveFlags::default(),
            jump: JumpPhase::None,
            lean: BoneBlend::default(),
            yaw: 0.0,
            accum: 0.0,
            dirty: false,
            was_grounded: false,
        }
    }

    /// Take input authority over `entity`, snapping the body to its current
    /// position. Clears all transient controller state.
    pub fn bind(&mut self, entity: Entity, pos: Vec3, yaw: f32) {
        self.entity = Some(entity);
        self.body.teleport(pos);
        self.body.set_velocity(Vec3::ZERO);
        self.flags = MoveFlags::default();
        self.jump = JumpPhase::None;
        self.lean = BoneBlend::default();
        self.yaw = yaw;
        self.accum = 0.0;
        self.dirty = false;
        self.was_grounded = self.grounded();
    }

    pub fn unbind(&mut self) {
        self.entity = None;
    }

    #[must_use]
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    /// Swap tuning at runtime; the capsule is rebuilt only when its
    /// dimensions actually changed.
    pub fn set_tuning(&mut self, tuning: MoverTuning) {
        let resize = (tuning.capsule_radius - self.tuning.capsule_radius).abs() > f32::EPSILON
            || (tuning.capsule_half_height - self.tuning.capsule_half_height).abs()
                > f32::EPSILON;
        self.tuning = tuning;
        if resize {
            self.body
                .rebuild_shape(tuning.capsule_radius, tuning.capsule_half_height);
        }
    }

    #[must_use]
    pub fn tuning(&self) -> &MoverTuning {
        &self.tuning
    }

    /// Grounded means standing on walkable ground and not moving upward.
    /// A body at the apex of a jump can momentarily report `OnGround` from a
    /// shallow ceiling contact; the velocity check filters that out.
    #[must_use]
    pub fn grounded(&self) -> bool {
        self.body.ground_state() == GroundState::OnGround && self.body.velocity().y <= 0.0
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn jump_phase(&self) -> JumpPhase {
        self.jump
    }

    #[must_use]
    pub fn lean_angle(&self) -> f32 {
        self.lean.angle()
    }

    /// True when movement state changed since the last call; drives the
    /// at-most-one-`MoveUpdate`-per-tick outbound rule.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Advance the controller by one frame of wall time. Edge flags
    /// (`JUST_GROUNDED`, `JUST_ENDED_JUMP`) reflect transitions anywhere in
    /// this frame and are cleared at the next call.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        if self.entity.is_none() {
            return;
        }
        self.flags.clear_edges();
        let mut input = *input;
        self.accum += dt;
        let step = self.tuning.fixed_step;
        while self.accum >= step {
            self.accum -= step;
            self.substep(&input, step);
            // One-shot press: only the first sub-step of the frame sees it.
            input.jump_pressed = false;
        }
    }

    fn substep(&mut self, input: &InputState, dt: f32) {
        let prev_flags = self.flags;
        let prev_pos = self.body.position();

        self.flags.set(MoveFlags::FORWARD, input.forward);
        self.flags.set(MoveFlags::BACKWARD, input.backward);
        self.flags.set(MoveFlags::LEFT, input.strafe_left);
        self.flags.set(MoveFlags::RIGHT, input.strafe_right);

        if input.turn_left {
            self.yaw = wrap_angle(self.yaw + TURN_SPEED * dt);
        }
        if input.turn_right {
            self.yaw = wrap_angle(self.yaw - TURN_SPEED * dt);
        }

        // Horizontal intent in the yaw basis. Backpedal wins over forward.
        let fwd_axis = match (input.forward, input.backward) {
            (_, true) => -1.0,
            (true, false) => 1.0,
            _ => 0.0,
        };
        let strafe_axis = match (input.strafe_left, input.strafe_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let speed = if fwd_axis < 0.0 {
            self.tuning.run_speed * self.tuning.backpedal_factor
        } else {
            self.tuning.run_speed
        };
        let (s, c) = self.yaw.sin_cos();
        let basis_fwd = Vec3::new(s, 0.0, c);
        let basis_right = Vec3::new(c, 0.0, -s);
        let mut horizontal = basis_fwd * fwd_axis + basis_right * strafe_axis;
        if horizontal.length_squared() > f32::EPSILON {
            horizontal = horizontal.normalize() * speed;
        }

        let grounded = self.grounded();
        let mut vy = self.body.velocity().y;
        if grounded && input.jump_pressed {
            vy = self.tuning.jump_power
                * (self.tuning.gravity_modifier / DEFAULT_GRAVITY).sqrt();
            self.jump = JumpPhase::Begin;
            self.flags.set(MoveFlags::JUMPING, true);
        } else if grounded {
            vy = 0.0;
        } else {
            vy -= self.tuning.gravity_modifier * dt;
        }
        self.body
            .set_velocity(Vec3::new(horizontal.x, vy, horizontal.z));
        self.body.step(dt);

        if self.jump == JumpPhase::Begin && self.body.velocity().y <= 0.0 {
            self.jump = JumpPhase::Fall;
        }
        let now_grounded = self.grounded();
        self.flags.set(MoveFlags::GROUNDED, now_grounded);
        if now_grounded && !self.was_grounded {
            self.flags.set(MoveFlags::JUST_GROUNDED, true);
            if self.jump != JumpPhase::None {
                self.flags.set(MoveFlags::JUST_ENDED_JUMP, true);
                self.flags.set(MoveFlags::JUMPING, false);
                self.jump = JumpPhase::None;
            }
        }
        if !now_grounded && self.jump == JumpPhase::None {
            // Walked off a ledge: falling without a jump.
            self.flags.set(MoveFlags::JUMPING, false);
        }
        self.was_grounded = now_grounded;

        self.lean.retarget(self.tuning.lean_angle * strafe_axis);
        self.lean.advance(dt, self.tuning.bone_blend_duration);

        let moved = (self.body.position() - prev_pos).length_squared() > 1e-10;
        if moved || self.flags != prev_flags {
            self.dirty = true;
        }
    }
}

fn wrap_angle(a: f32) -> f32 {
    let mut x = a;
    while x > std::f32::consts::PI {
        x -= std::f32::consts::TAU;
    }
    while x < -std::f32::consts::PI {
        x += std::f32::consts::TAU;
    }
    x
}

/// Built-in body: collide-and-slide against a flat ground plane. Stands in
/// for the engine body in headless runs and tests.
#[derive(Debug)]
pub struct FlatGroundBody {
    pos: Vec3,
    vel: Vec3,
    ground: f32,
}

impl FlatGroundBody {
    #[must_use]
    pub fn new(ground_height: f32) -> Self {
        Self {
            pos: Vec3::new(0.0, ground_height, 0.0),
            vel: Vec3::ZERO,
            ground: ground_height,
        }
    }

    pub fn set_ground_height(&mut self, h: f32) {
        self.ground = h;
    }
}

impl CharacterBody for FlatGroundBody {
    fn ground_state(&self) -> GroundState {
        if self.pos.y <= self.ground + 1e-4 {
            GroundState::OnGround
        } else {
            GroundState::InAir
        }
    }

    fn velocity(&self) -> Vec3 {
        self.vel
    }

    fn set_velocity(&mut self, v: Vec3) {
        self.vel = v;
    }

    fn position(&self) -> Vec3 {
        self.pos
    }

    fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        if self.pos.y <= self.ground {
            self.pos.y = self.ground;
            if self.vel.y < 0.0 {
                self.vel.y = 0.0;
            }
        }
    }

    fn rebuild_shape(&mut self, _radius: f32, _half_height: f32) {}

    fn teleport(&mut self, pos: Vec3) {
        self.pos = pos;
    }
}
