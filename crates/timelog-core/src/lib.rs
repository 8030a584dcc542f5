//! Shared types for the timelog workspace.
//!
//! Holds the time-log data model (instants, quanta, interval markers,
//! sessions), calendar bucket keys, the timestamp parser, the error type,
//! CLI settings and number/duration formatting.

pub mod buckets;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, TimelogError};
