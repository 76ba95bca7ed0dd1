//! `asset_core`: the asynchronous streaming model/terrain pipeline.
//!
//! Flow: the discovery scanner enumerates asset files once per map load and
//! hashes their logical paths; load requests then resolve against that
//! registry, fan decode work across a fork-join worker pool, and apply all
//! renderer/physics/ECS mutation back on the simulation thread inside
//! [`loader::StreamingLoader::pump`].
//!
//! Identity rule: after discovery, the 32-bit path hash is the only asset
//! identity that crosses a thread boundary — raw paths never do.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod discovery;
pub mod format;
pub mod hash;
pub mod io;
pub mod jobs;
pub mod loader;
