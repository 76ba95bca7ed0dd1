//! Character-controller tuning.
//!
//! The odd-looking constants are the shipped gameplay values; they are
//! load-bearing for game feel and must not be "cleaned up" to rounder
//! numbers. Overridable via `data/config/mover.json`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MoverTuning {
    /// Forward run speed, units/second.
    pub run_speed: f32,
    /// Multiplier applied when moving backward.
    pub backpedal_factor: f32,
    /// Downward acceleration applied by the character physics.
    pub gravity_modifier: f32,
    /// Base upward impulse at jump start, scaled by `gravity_modifier`
    /// relative to its default.
    pub jump_power: f32,
    /// Fixed physics sub-step, seconds. Variable frame dt accumulates into
    /// whole sub-steps; physics never sees a variable dt.
    pub fixed_step: f32,
    /// Linear-ease duration for spine/head/waist lean blending, seconds.
    pub bone_blend_duration: f32,
    /// Lean angle (radians) at full strafe.
    pub lean_angle: f32,
    /// Capsule approximating the humanoid silhouette.
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
}

impl Default for MoverTuning {
    fn default() -> Self {
        Self {
            run_speed: 7.1111,
            backpedal_factor: 0.5,
            gravity_modifier: 19.291_105,
            jump_power: 7.9555,
            fixed_step: 1.0 / 60.0,
            bone_blend_duration: 0.15,
            lean_angle: 0.261_799, // 15 degrees
            capsule_radius: 0.4,
            capsule_half_height: 0.9,
        }
    }
}

impl MoverTuning {
    pub fn load_default() -> Result<Self> {
        crate::loader::load_json_or_default("config/mover.json")
    }
}
