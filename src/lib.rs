//! Motifweek
//!
//! Builds a temporal interaction graph period by period from signup and
//! interaction logs, filters degree/frequency outliers, and writes a
//! label-aware motif census for a sample of the surviving nodes.
//!
//! # Architecture
//!
//! - `graph`: identifier dictionary and node record store, kept in lockstep
//! - `ingest`: the three streaming passes (label, outlier, graph)
//! - `algo`: percentile cutoffs, motif aggregation, sampling
//! - `output`: motif files and the JSON-lines period report
//! - `period`: the driver running the passes in order for every period
//!
//! The census itself is in the `motifweek-census` crate.
//!
//! ## Example Usage
//!
//! ```rust
//! use motifweek::graph::{ExternalId, Presence, Status, TemporalGraph};
//!
//! let mut graph = TemporalGraph::new();
//!
//! // `L` ids live in namespace 0, `F` ids in namespace 1
//! let alice = ExternalId::parse("L45485508").unwrap();
//! let bob = ExternalId::parse("F10822145").unwrap();
//!
//! let a = graph.insert(alice, Status::Existing).live().unwrap();
//! graph.insert(bob, Status::Unobserved);
//!
//! assert_eq!(graph.resolve(alice), Presence::Live(a));
//! assert_eq!(graph.len(), 2);
//!
//! // Eviction drops the dictionary entry and the record together
//! graph.evict(&[a]);
//! assert_eq!(graph.resolve(alice), Presence::Absent);
//! assert!(graph.check_consistency().is_ok());
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod graph;
pub mod ingest;
pub mod output;
pub mod period;

// Re-export main types for convenience
pub use graph::{
    EventTime, ExternalId, GraphError, GraphResult, NodeIdx, NodeRecord, Presence, Status,
    TemporalGraph,
};

pub use ingest::{
    graph_pass, label_pass, outlier_pass, GraphReport, IngestError, IngestResult, LabelReport,
    OutlierParams, OutlierReport, PeriodWindow,
};

pub use algo::{
    aggregate_motifs, organize, Cutoffs, EgoCensus, MotifAggregator, SampleRetention, SampleSpec,
    Sampler,
};

pub use config::{ConfigError, ConfigResult, PipelineConfig};

pub use output::{MotifWriter, OutputError, OutputFilter};

pub use period::{PeriodDriver, PeriodReport, PipelineError, PipelineResult, Schedule};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
