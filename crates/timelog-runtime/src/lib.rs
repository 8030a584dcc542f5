//! Runtime layer for timelog.
//!
//! Runs the periodic timestamp recorder as a background tokio task.

pub mod recorder;

pub use timelog_core as core;
