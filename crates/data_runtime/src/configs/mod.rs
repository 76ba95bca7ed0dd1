//! Config structs with shipped-tuning defaults.

pub mod mover;
pub mod streaming;
