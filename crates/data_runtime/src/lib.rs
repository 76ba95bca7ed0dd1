//! `data_runtime`: JSON-backed configuration and database tables.
//!
//! Everything here deserializes with serde and carries defaults matching the
//! shipped tuning, so a missing file never blocks startup — callers get the
//! defaults and a log line instead of an error dialog.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod configs;
pub mod display;
pub mod loader;
