//! Graph analytics over the period graph
//!
//! The census itself lives in the `motifweek-census` crate.
//! This module provides the integration/adapter layer plus the
//! statistics and sampling used around it.

pub mod quantile;
pub mod sampler;

use crate::graph::{GraphError, GraphResult, NodeIdx, TemporalGraph};
use motifweek_census::{GraphView, NodeId as AlgoNodeId};
use tracing::info;

// Re-export algorithms
pub use motifweek_census::{motif_census, MotifProfile, CANONICAL_NAMES, MOTIF_LEN};
pub use quantile::{percentile, Cutoffs};
pub use sampler::{SampleRetention, SampleSpec, Sampler};

/// Computes one motif profile per view node, aligned with view indices
pub trait MotifAggregator {
    fn aggregate(&self, view: &GraphView) -> Vec<MotifProfile>;
}

/// Label-aware ego census with neighbour sums
#[derive(Debug, Clone, Copy, Default)]
pub struct EgoCensus;

impl MotifAggregator for EgoCensus {
    fn aggregate(&self, view: &GraphView) -> Vec<MotifProfile> {
        motif_census(view)
    }
}

/// Build a GraphView of the live nodes from their colored adjacency.
///
/// Every live node gets an index, in dictionary order, so nodes without
/// edges still receive a (zero) profile.
pub fn organize(graph: &TemporalGraph) -> GraphView {
    // 1. Collect live nodes
    let index_to_node: Vec<AlgoNodeId> = graph.ids().map(|id| id.as_u32() as AlgoNodeId).collect();
    let node_count = index_to_node.len();

    // 2. Index mapping, dense id -> view index
    let mut position = vec![usize::MAX; graph.allocated()];
    for (idx, &node) in index_to_node.iter().enumerate() {
        position[node as usize] = idx;
    }
    let index_of = |id: NodeIdx| {
        position
            .get(id.as_usize())
            .copied()
            .filter(|&idx| idx != usize::MAX)
    };

    // 3. Adjacency lists and labels
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut labels = vec![false; node_count];

    for (u_idx, &node) in index_to_node.iter().enumerate() {
        let Some(record) = graph.get(NodeIdx::new(node as u32)) else {
            continue;
        };
        labels[u_idx] = record.status().is_labelled();
        if let Some(colored) = record.colored() {
            outgoing[u_idx].extend(colored.send().filter_map(index_of));
            incoming[u_idx].extend(colored.recv().filter_map(index_of));
        }
    }

    // 4. Convert to CSR
    GraphView::from_adjacency_list(index_to_node, outgoing, incoming, labels)
}

/// Run `aggregator` over the organized graph and store each node's profile.
///
/// Returns the number of nodes that received a profile.
pub fn aggregate_motifs<A: MotifAggregator + ?Sized>(
    graph: &mut TemporalGraph,
    aggregator: &A,
) -> GraphResult<usize> {
    let view = organize(graph);
    let profiles = aggregator.aggregate(&view);
    if profiles.len() != view.node_count {
        return Err(GraphError::ProfileCount {
            expected: view.node_count,
            found: profiles.len(),
        });
    }

    for (&node, profile) in view.index_to_node.iter().zip(profiles) {
        let id = NodeIdx::new(node as u32);
        graph.get_mut(id).ok_or(GraphError::NodeNotFound(id))?.motifs = Some(profile);
    }

    info!(
        "Motif aggregation done: {} nodes, {} edges",
        view.node_count,
        view.out_targets.len()
    );
    Ok(view.node_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ExternalId, Status};
    use ndarray::Array1;

    fn node(graph: &mut TemporalGraph, raw: u64, status: Status) -> NodeIdx {
        graph.insert(ExternalId(raw), status).live().unwrap()
    }

    fn link(graph: &mut TemporalGraph, from: NodeIdx, to: NodeIdx) {
        let (s, r) = graph.get_pair_mut(from, to).unwrap();
        let (s_labelled, r_labelled) = (s.status().is_labelled(), r.status().is_labelled());
        s.link_to(to, r_labelled);
        r.link_from(from, s_labelled);
    }

    #[test]
    fn test_organize_maps_live_nodes() {
        let mut graph = TemporalGraph::new();
        let a = node(&mut graph, 1, Status::Existing);
        let gone = node(&mut graph, 2, Status::Existing);
        let b = node(&mut graph, 3, Status::Adopted);
        link(&mut graph, a, b);
        graph.evict(&[gone]);

        let view = organize(&graph);
        assert_eq!(view.node_count, 2);
        assert_eq!(view.index_to_node, vec![a.as_u32() as u64, b.as_u32() as u64]);
        assert_eq!(view.successors(0), &[1]);
        assert_eq!(view.predecessors(1), &[0]);
        assert_eq!(view.labels, vec![true, false]);
    }

    #[test]
    fn test_aggregate_writes_profiles() {
        let mut graph = TemporalGraph::new();
        let a = node(&mut graph, 1, Status::Existing);
        let b = node(&mut graph, 2, Status::Existing);
        let lonely = node(&mut graph, 3, Status::Adopted);
        link(&mut graph, a, b);
        link(&mut graph, b, a);

        assert_eq!(aggregate_motifs(&mut graph, &EgoCensus).unwrap(), 3);

        let profile = graph.get(a).unwrap().motifs.clone().unwrap();
        // one mutual tie with a label-1 peer, canonical slot 5
        assert_eq!(profile.own[5], 1.0);
        assert_eq!(profile.own.sum(), 1.0);
        assert_eq!(profile.from_label1.sum(), 1.0);
        assert_eq!(profile.from_label0.sum(), 0.0);

        let empty = graph.get(lonely).unwrap().motifs.clone().unwrap();
        assert_eq!(empty.own, Array1::<f64>::zeros(MOTIF_LEN));
    }

    struct Truncated;

    impl MotifAggregator for Truncated {
        fn aggregate(&self, _view: &GraphView) -> Vec<MotifProfile> {
            Vec::new()
        }
    }

    #[test]
    fn test_misaligned_aggregator_is_rejected() {
        let mut graph = TemporalGraph::new();
        node(&mut graph, 1, Status::Existing);
        assert_eq!(
            aggregate_motifs(&mut graph, &Truncated),
            Err(GraphError::ProfileCount { expected: 1, found: 0 })
        );
    }
}
