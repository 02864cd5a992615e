//! Temporal interaction graph state
//!
//! This module implements the long-lived state shared by every pass:
//! - Identifier dictionary compressing external ids into dense ids
//! - Node record store with per-pass fields
//! - The owning `TemporalGraph` keeping both in lockstep

pub mod dictionary;
pub mod record;
pub mod store;
pub mod types;

// Re-export main types
pub use dictionary::Dictionary;
pub use record::{ColoredAdjacency, NodeMetrics, NodeRecord};
pub use store::{GraphError, GraphResult, Presence, TemporalGraph};
pub use types::{EventTime, ExternalId, NodeIdx, RecordError, Status};
