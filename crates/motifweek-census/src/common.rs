//! Shared utilities for the motif census
//!
//! Provides a read-only, label-colored view of the graph topology for census execution.

use std::collections::HashMap;

/// Node Identifier type (dense id assigned by the caller)
pub type NodeId = u64;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// Neighbour slices are sorted and free of duplicates, so membership tests
/// can binary search.
pub struct GraphView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to NodeId
    pub index_to_node: Vec<NodeId>,
    /// Mapping from NodeId to dense index
    pub node_to_index: HashMap<NodeId, usize>,

    /// Outgoing edges CSR structure
    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,

    /// Incoming edges CSR structure (Compressed Sparse Column effectively)
    /// Offsets into `in_sources`. Size = node_count + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of source node indices
    pub in_sources: Vec<usize>,

    /// Binary node label (peer outcome color), aligned with indices
    pub labels: Vec<bool>,
}

impl GraphView {
    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get the in-degree of a node (by index)
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_targets[start..end]
    }

    /// Get incoming neighbors (predecessors) of a node
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_sources[start..end]
    }

    /// Label of a node (by index)
    pub fn label(&self, idx: usize) -> bool {
        self.labels[idx]
    }

    /// True when there is an edge between `a` and `b` in either direction
    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        self.successors(a).binary_search(&b).is_ok()
            || self.predecessors(a).binary_search(&b).is_ok()
    }

    /// Build a view from per-node adjacency lists.
    ///
    /// Lists are sorted and deduplicated here; self loops are dropped since
    /// they carry no structure for an ego census.
    pub fn from_adjacency_list(
        index_to_node: Vec<NodeId>,
        mut outgoing: Vec<Vec<usize>>,
        mut incoming: Vec<Vec<usize>>,
        labels: Vec<bool>,
    ) -> Self {
        let node_count = index_to_node.len();
        let node_to_index = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_sources = Vec::new();

        out_offsets.push(0);
        for (i, neighbors) in outgoing.iter_mut().enumerate() {
            neighbors.sort_unstable();
            neighbors.dedup();
            out_targets.extend(neighbors.iter().copied().filter(|&n| n != i));
            out_offsets.push(out_targets.len());
        }

        in_offsets.push(0);
        for (i, sources) in incoming.iter_mut().enumerate() {
            sources.sort_unstable();
            sources.dedup();
            in_sources.extend(sources.iter().copied().filter(|&n| n != i));
            in_offsets.push(in_sources.len());
        }

        GraphView {
            node_count,
            index_to_node,
            node_to_index,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
            labels,
        }
    }
}
