//! Data layer for timelog.
//!
//! Reads the timestamp log, normalises stamps to quanta, builds sessions,
//! aggregates them into calendar views and runs the top-level analysis
//! pipeline.

pub mod aggregator;
pub mod analysis;
pub mod analyzer;
pub mod reader;

pub use timelog_core as core;
