//! `net_core`: wire schema + in-proc replication plumbing.
//!
//! Scope
//! - Little-endian wire codec traits and the full client message schema
//! - Versioned opcode framing and the opcode→handler dispatch table
//! - Bounded byte channels for the network-thread → sim-thread handoff
//!
//! Handlers never panic and never return errors across the dispatch
//! boundary; a `false` return means "malformed, close the connection".

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod channel;
pub mod dispatch;
pub mod frame;
pub mod message;
pub mod opcode;
pub mod wire;
