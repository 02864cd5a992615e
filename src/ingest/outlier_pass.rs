//! Outlier pass: degree/frequency filtering
//!
//! 1. Stream interactions in `[start, boundary)`, counting contacts per pair
//! 2. Compute percentile cutoffs over nodes active this period
//! 3. Remove one-sided high-volume nodes and nodes above any cutoff
//! 4. Thin weak edges and remove nodes left without edges
//! 5. Clear working neighbour sets of the survivors

use super::reader::{LogStream, RecordKind};
use super::{DayProgress, IngestResult, PeriodWindow, StreamStats};
use crate::algo::quantile::Cutoffs;
use crate::graph::{NodeIdx, Presence, Status, TemporalGraph};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Thresholds for the outlier pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierParams {
    /// Maximum records for a node that only sends or only receives
    pub hard_cap_asym: u64,
    /// Percentile used for the six cutoffs
    pub percentile: f64,
    /// Minimum records per pair for an edge to count
    pub hard_thre: u32,
    /// Skip records where exactly one endpoint is already known
    pub indep: bool,
}

impl Default for OutlierParams {
    fn default() -> Self {
        Self {
            hard_cap_asym: 1000,
            percentile: 0.99,
            hard_thre: 2,
            indep: false,
        }
    }
}

/// Summary of one outlier pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutlierReport {
    /// Interaction records applied
    pub records: u64,
    /// Records skipped because only one endpoint was known (`indep`)
    pub skipped_lopsided: u64,
    pub new_nodes: usize,
    /// Nodes that entered the percentile distributions
    pub active_nodes: usize,
    pub cutoffs: Cutoffs,
    pub removed_one_sided: usize,
    pub removed_percentile: usize,
    pub removed_isolated: usize,
    pub surviving: usize,
    pub stream: StreamStats,
}

impl OutlierReport {
    pub fn removed(&self) -> usize {
        self.removed_one_sided + self.removed_percentile + self.removed_isolated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Keep,
    OneSided,
    Percentile,
    Isolated,
}

/// Stream interactions for the window and remove outliers from the graph.
pub fn outlier_pass<P: AsRef<Path>>(
    graph: &mut TemporalGraph,
    logs: &[P],
    window: &PeriodWindow,
    params: &OutlierParams,
    node_cap: Option<usize>,
) -> IngestResult<OutlierReport> {
    let mut report = OutlierReport::default();

    for record in graph.records_mut() {
        record.begin_period();
    }

    let allocated_before = graph.allocated();
    let mut stream = LogStream::open(logs, RecordKind::Interaction);
    let mut progress = DayProgress::default();

    while let Some(event) = stream.next_event()? {
        if event.time < window.start {
            continue;
        }
        if event.time >= window.boundary || node_cap.is_some_and(|cap| graph.allocated() > cap) {
            break;
        }
        let Some(receiver) = event.receiver else {
            continue;
        };
        progress.tick("outlier pass", event.time);

        if params.indep
            && graph.dictionary().contains(event.sender) != graph.dictionary().contains(receiver)
        {
            report.skipped_lopsided += 1;
            continue;
        }

        let sender = graph.insert(event.sender, Status::Unobserved);
        let receiver = graph.insert(receiver, Status::Unobserved);
        let (Presence::Live(sid), Presence::Live(rid)) = (sender, receiver) else {
            debug!("Skipping contact with an evicted endpoint at {}", event.time);
            continue;
        };

        if sid == rid {
            if let Some(record) = graph.get_mut(sid) {
                record.send_to(rid);
                record.receive_from(sid);
            }
        } else if let Some((s, r)) = graph.get_pair_mut(sid, rid) {
            s.send_to(rid);
            r.receive_from(sid);
        }
        report.records += 1;
    }
    report.stream = stream.finish("outlier pass");
    report.new_nodes = graph.allocated() - allocated_before;

    // carried-over nodes without activity stay out of the distributions
    let active: Vec<_> = graph
        .records()
        .filter(|r| r.is_active())
        .map(|r| r.metrics())
        .collect();
    report.active_nodes = active.len();
    report.cutoffs = Cutoffs::compute(active, params.percentile);

    let ids: Vec<NodeIdx> = graph.ids().collect();
    let mut evicted = Vec::new();
    for id in ids {
        let Some(record) = graph.get_mut(id) else {
            continue;
        };
        let metrics = record.metrics();
        let verdict = if metrics.freq > params.hard_cap_asym
            && metrics.in_freq * metrics.out_freq == 0
        {
            Verdict::OneSided
        } else if report.cutoffs.exceeded_by(&metrics) {
            Verdict::Percentile
        } else {
            record.thin(params.hard_thre);
            if record.working_edges() == 0 {
                Verdict::Isolated
            } else {
                Verdict::Keep
            }
        };

        match verdict {
            Verdict::Keep => continue,
            Verdict::OneSided => report.removed_one_sided += 1,
            Verdict::Percentile => report.removed_percentile += 1,
            Verdict::Isolated => report.removed_isolated += 1,
        }
        evicted.push(id);
    }
    graph.evict(&evicted);

    for record in graph.records_mut() {
        record.reset_working();
    }
    report.surviving = graph.len();

    info!(
        "Outlier pass done: {} records, {} new nodes, removed {} (one-sided {}, percentile {}, isolated {}), {} nodes remain",
        report.records,
        report.new_nodes,
        report.removed(),
        report.removed_one_sided,
        report.removed_percentile,
        report.removed_isolated,
        report.surviving
    );
    debug!("Cutoffs: {:?}", report.cutoffs);
    Ok(report)
}
