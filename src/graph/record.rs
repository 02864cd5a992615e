//! Per-node record
//!
//! One record type serves every pass. Each pass writes only its own fields:
//! - label pass: `status`, `first_seen`
//! - outlier pass: frequencies and contact counts
//! - graph pass: the label-colored adjacency
//! - motif aggregation: `motifs`

use super::types::{EventTime, ExternalId, NodeIdx, Status};
use motifweek_census::MotifProfile;
use rustc_hash::{FxHashMap, FxHashSet};

/// Neighbour sets built by the graph pass, split by the peer's label
#[derive(Debug, Clone, Default)]
pub struct ColoredAdjacency {
    /// Receivers this node sent to, with label 1 / label 0
    pub send_label1: FxHashSet<NodeIdx>,
    pub send_label0: FxHashSet<NodeIdx>,
    /// Senders this node received from, with label 1 / label 0
    pub recv_label1: FxHashSet<NodeIdx>,
    pub recv_label0: FxHashSet<NodeIdx>,
}

impl ColoredAdjacency {
    pub fn send(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.send_label1.iter().chain(self.send_label0.iter()).copied()
    }

    pub fn recv(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.recv_label1.iter().chain(self.recv_label0.iter()).copied()
    }

    pub fn contains(&self, id: NodeIdx) -> bool {
        self.send_label1.contains(&id)
            || self.send_label0.contains(&id)
            || self.recv_label1.contains(&id)
            || self.recv_label0.contains(&id)
    }
}

/// Degree and frequency measurements taken during the outlier pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeMetrics {
    pub in_degree: u64,
    pub out_degree: u64,
    pub degree: u64,
    pub in_freq: u64,
    pub out_freq: u64,
    pub freq: u64,
}

#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub id: NodeIdx,
    pub external: ExternalId,

    /// Earliest signup time seen by the label pass
    pub first_seen: Option<EventTime>,

    status: Status,

    /// Records received / sent in the current period
    pub in_freq: u32,
    pub out_freq: u32,

    /// Working adjacency of the outlier pass: neighbour -> records in that direction
    sent: FxHashMap<NodeIdx, u32>,
    received: FxHashMap<NodeIdx, u32>,

    /// Final adjacency, present once the graph pass has touched the node
    colored: Option<ColoredAdjacency>,

    pub motifs: Option<MotifProfile>,
}

impl NodeRecord {
    pub fn new(id: NodeIdx, external: ExternalId) -> Self {
        NodeRecord {
            id,
            external,
            first_seen: None,
            status: Status::Unobserved,
            in_freq: 0,
            out_freq: 0,
            sent: FxHashMap::default(),
            received: FxHashMap::default(),
            colored: None,
            motifs: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn outcome(&self) -> i8 {
        self.status.outcome()
    }

    pub fn label(&self) -> u8 {
        self.status.label()
    }

    /// Keep the earliest observed signup time
    pub fn observe(&mut self, time: EventTime) {
        self.first_seen = Some(match self.first_seen {
            Some(seen) if seen <= time => seen,
            _ => time,
        });
    }

    /// Count one record sent to `to`
    pub fn send_to(&mut self, to: NodeIdx) {
        *self.sent.entry(to).or_insert(0) += 1;
        self.out_freq += 1;
    }

    /// Count one record received from `from`
    pub fn receive_from(&mut self, from: NodeIdx) {
        *self.received.entry(from).or_insert(0) += 1;
        self.in_freq += 1;
    }

    pub fn total_freq(&self) -> u64 {
        self.in_freq as u64 + self.out_freq as u64
    }

    /// True when the node had any interaction this period
    pub fn is_active(&self) -> bool {
        self.total_freq() > 0
    }

    pub fn send_set(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.sent.keys().copied()
    }

    pub fn recv_set(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.received.keys().copied()
    }

    /// Working edge count: |send set| + |recv set|
    pub fn working_edges(&self) -> usize {
        self.sent.len() + self.received.len()
    }

    /// Records exchanged with `peer` in either direction
    pub fn contacts_with(&self, peer: NodeIdx) -> u32 {
        self.sent.get(&peer).copied().unwrap_or(0) + self.received.get(&peer).copied().unwrap_or(0)
    }

    pub fn metrics(&self) -> NodeMetrics {
        let degree = self.sent.len()
            + self
                .received
                .keys()
                .filter(|peer| !self.sent.contains_key(peer))
                .count();
        NodeMetrics {
            in_degree: self.received.len() as u64,
            out_degree: self.sent.len() as u64,
            degree: degree as u64,
            in_freq: self.in_freq as u64,
            out_freq: self.out_freq as u64,
            freq: self.total_freq(),
        }
    }

    /// Keep only neighbours with at least `min_contacts` records in either direction
    pub fn thin(&mut self, min_contacts: u32) {
        let weak: Vec<NodeIdx> = self
            .sent
            .keys()
            .chain(self.received.keys())
            .copied()
            .filter(|&peer| self.contacts_with(peer) < min_contacts)
            .collect();
        for peer in weak {
            self.sent.remove(&peer);
            self.received.remove(&peer);
        }
    }

    /// Clear working neighbour sets and contact counts.
    ///
    /// Period frequency totals are left readable until [`Self::begin_period`].
    pub fn reset_working(&mut self) {
        self.sent.clear();
        self.received.clear();
    }

    /// Drop everything the previous period derived from interaction logs
    pub fn begin_period(&mut self) {
        self.reset_working();
        self.in_freq = 0;
        self.out_freq = 0;
        self.colored = None;
        self.motifs = None;
    }

    /// Record a graph-pass edge to `to`
    pub fn link_to(&mut self, to: NodeIdx, to_labelled: bool) {
        let colored = self.colored.get_or_insert_with(ColoredAdjacency::default);
        if to_labelled {
            colored.send_label1.insert(to);
        } else {
            colored.send_label0.insert(to);
        }
    }

    /// Record a graph-pass edge from `from`
    pub fn link_from(&mut self, from: NodeIdx, from_labelled: bool) {
        let colored = self.colored.get_or_insert_with(ColoredAdjacency::default);
        if from_labelled {
            colored.recv_label1.insert(from);
        } else {
            colored.recv_label0.insert(from);
        }
    }

    pub fn colored(&self) -> Option<&ColoredAdjacency> {
        self.colored.as_ref()
    }

    /// Current neighbours for sampling: the colored adjacency once built,
    /// otherwise the working sets
    pub fn neighbours(&self) -> Vec<NodeIdx> {
        match &self.colored {
            Some(colored) => colored.send().chain(colored.recv()).collect(),
            None => self.send_set().chain(self.recv_set()).collect(),
        }
    }
}
