//! Graph pass: builds the label-colored adjacency
//!
//! Interactions in `[start, boundary)` are replayed once more. Only records
//! whose endpoints both survived the outlier pass become edges.

use super::reader::{LogStream, RecordKind};
use super::{DayProgress, IngestResult, PeriodWindow, StreamStats};
use crate::graph::TemporalGraph;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Summary of one graph pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphReport {
    /// Records turned into edges
    pub records: u64,
    /// Distinct directed edges after the pass
    pub edges: usize,
    /// Records with an endpoint that is not a live node
    pub skipped_absent: u64,
    /// Nodes with a colored adjacency
    pub linked_nodes: usize,
    pub stream: StreamStats,
}

/// Replay interactions for the window into the colored adjacency
pub fn graph_pass<P: AsRef<Path>>(
    graph: &mut TemporalGraph,
    logs: &[P],
    window: &PeriodWindow,
) -> IngestResult<GraphReport> {
    let mut report = GraphReport::default();
    let mut stream = LogStream::open(logs, RecordKind::Interaction);
    let mut progress = DayProgress::default();

    while let Some(event) = stream.next_event()? {
        if event.time < window.start {
            continue;
        }
        if event.time >= window.boundary {
            break;
        }
        let Some(receiver) = event.receiver else {
            continue;
        };
        progress.tick("graph pass", event.time);

        let (Some(sid), Some(rid)) = (
            graph.resolve(event.sender).live(),
            graph.resolve(receiver).live(),
        ) else {
            report.skipped_absent += 1;
            continue;
        };

        if sid == rid {
            if let Some(record) = graph.get_mut(sid) {
                let labelled = record.status().is_labelled();
                record.link_to(rid, labelled);
                record.link_from(sid, labelled);
            }
        } else if let Some((s, r)) = graph.get_pair_mut(sid, rid) {
            let s_labelled = s.status().is_labelled();
            let r_labelled = r.status().is_labelled();
            s.link_to(rid, r_labelled);
            r.link_from(sid, s_labelled);
        }
        report.records += 1;
    }
    report.stream = stream.finish("graph pass");

    for record in graph.records() {
        if let Some(colored) = record.colored() {
            report.linked_nodes += 1;
            report.edges += colored.send().count();
        }
    }

    info!(
        "Graph pass done: {} records, {} edges over {} nodes, {} skipped",
        report.records, report.edges, report.linked_nodes, report.skipped_absent
    );
    Ok(report)
}
