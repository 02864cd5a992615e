//! Label pass: signup log ingestion
//!
//! Signup status is re-derived every period from the three-way time split:
//!
//! ```text
//!   ---------- | start | ---------- | boundary | ---------- | horizon |
//!    existing             existing                adopted      (not read)
//! ```
//!
//! A record at or after the boundary only counts as an adoption when no
//! earlier signup before the boundary is on file for the node.

use super::reader::{LogStream, RecordKind};
use super::{DayProgress, IngestResult, PeriodWindow, StreamStats};
use crate::graph::{EventTime, Presence, Status, TemporalGraph};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Summary of one label pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelReport {
    /// Signup records applied
    pub records: u64,
    pub new_nodes: usize,
    pub updated: usize,
    /// Records for ids whose record had been evicted
    pub skipped_evicted: u64,
    /// Live nodes after the pass
    pub total_nodes: usize,
    pub existing: usize,
    pub adopted: usize,
    /// Time of the last record applied
    pub last_time: Option<EventTime>,
    pub stream: StreamStats,
}

/// Status for a signup at `time`, given the earliest signup already on file
pub fn classify(time: EventTime, first_seen: Option<EventTime>, boundary: EventTime) -> Status {
    if time < boundary || first_seen.is_some_and(|seen| seen < boundary) {
        Status::Existing
    } else {
        Status::Adopted
    }
}

/// Read the signup log up to the window horizon (or until more than
/// `node_cap` dense ids have been allocated) and update node status.
pub fn label_pass(
    graph: &mut TemporalGraph,
    log: impl AsRef<Path>,
    window: &PeriodWindow,
    node_cap: Option<usize>,
) -> IngestResult<LabelReport> {
    let mut stream = LogStream::open(&[log.as_ref()], RecordKind::Signup);
    let mut report = LabelReport::default();
    let mut progress = DayProgress::default();

    while let Some(event) = stream.next_event()? {
        if event.time >= window.horizon || node_cap.is_some_and(|cap| graph.allocated() > cap) {
            break;
        }
        progress.tick("label pass", event.time);
        report.last_time = Some(event.time);
        report.records += 1;

        match graph.resolve(event.sender) {
            Presence::Absent => {
                let status = classify(event.time, None, window.boundary);
                if let Some(record) = graph
                    .insert(event.sender, status)
                    .live()
                    .and_then(|id| graph.get_mut(id))
                {
                    record.observe(event.time);
                    report.new_nodes += 1;
                }
            }
            Presence::Live(id) => {
                if let Some(record) = graph.get_mut(id) {
                    record.set_status(classify(event.time, record.first_seen, window.boundary));
                    record.observe(event.time);
                    report.updated += 1;
                }
            }
            Presence::Evicted(_) => report.skipped_evicted += 1,
        }
    }

    report.stream = stream.finish("label pass");
    report.total_nodes = graph.len();
    for record in graph.records() {
        match record.status() {
            Status::Existing => report.existing += 1,
            Status::Adopted => report.adopted += 1,
            Status::Unobserved => {}
        }
    }

    info!(
        "Label pass done: {} records, {} new nodes, {} nodes now, last record at {}",
        report.records,
        report.new_nodes,
        report.total_nodes,
        report.last_time.map_or_else(|| "-".to_string(), |t| t.to_string())
    );
    Ok(report)
}
