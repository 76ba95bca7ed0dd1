//! Client-side session logic: message application, the local character
//! controller, proximity triggers, and the scripting event surface.
//!
//! The simulation thread owns everything in this crate. Inbound frames are
//! drained from the transport channel once per tick, applied through the
//! dispatch table, and the controller/trigger systems run afterwards; the
//! renderer only ever reads the resulting component state.

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools,
    clippy::cast_precision_loss
)]

pub mod events;
pub mod mover;
pub mod replication;
pub mod systems;
pub mod telemetry;
pub mod triggers;

pub mod input {
    /// Input snapshot for one frame of local player intent.
    #[derive(Default, Debug, Clone, Copy)]
    pub struct InputState {
        pub forward: bool,
        pub backward: bool,
        pub strafe_left: bool,
        pub strafe_right: bool,
        pub turn_left: bool,
        pub turn_right: bool,
        /// One-shot jump press for this frame. The platform layer sets this
        /// on key-press and clears it after the snapshot is consumed so
        /// holding Space does not repeat-jump.
        pub jump_pressed: bool,
    }

    impl InputState {
        pub fn clear(&mut self) {
            *self = Self::default();
        }
    }
}
