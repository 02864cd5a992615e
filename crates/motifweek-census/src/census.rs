//! Label-aware ego motif census
//!
//! Every node gets three vectors:
//! - its own census over the ego network (dyads with each neighbour and
//!   triads with each pair of neighbours), split by neighbour label
//! - the sum of its label-1 neighbours' own vectors
//! - the sum of its label-0 neighbours' own vectors
//!
//! Raw component layout (before [`crate::order::canonical`]):
//! `kind * 2 + label` for dyads (kind: mutual = 0, out = 1, in = 2), then
//! `DYAD_LEN + closed * 3 + label1_count` for triads.

use super::common::GraphView;
use super::order::canonical;
use ndarray::Array1;

/// Number of dyad components (3 kinds x 2 labels)
pub const DYAD_LEN: usize = 6;

/// Number of triad components (open/closed x 0..=2 label-1 neighbours)
pub const TRIAD_LEN: usize = 6;

/// Length of every motif vector
pub const MOTIF_LEN: usize = DYAD_LEN + TRIAD_LEN;

/// Direction of the tie between the ego and one neighbour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DyadKind {
    Mutual = 0,
    Out = 1,
    In = 2,
}

/// Census result for one node, in canonical order
#[derive(Debug, Clone, PartialEq)]
pub struct MotifProfile {
    /// The node's own census
    pub own: Array1<f64>,
    /// Sum of own censuses over neighbours with label 1
    pub from_label1: Array1<f64>,
    /// Sum of own censuses over neighbours with label 0
    pub from_label0: Array1<f64>,
}

/// Merge successors and predecessors of `idx` into one sorted neighbour list
pub fn neighbourhood(view: &GraphView, idx: usize) -> Vec<(usize, DyadKind)> {
    let out = view.successors(idx);
    let inc = view.predecessors(idx);
    let mut merged = Vec::with_capacity(out.len() + inc.len());
    let (mut i, mut j) = (0, 0);

    while i < out.len() && j < inc.len() {
        if out[i] == inc[j] {
            merged.push((out[i], DyadKind::Mutual));
            i += 1;
            j += 1;
        } else if out[i] < inc[j] {
            merged.push((out[i], DyadKind::Out));
            i += 1;
        } else {
            merged.push((inc[j], DyadKind::In));
            j += 1;
        }
    }
    merged.extend(out[i..].iter().map(|&n| (n, DyadKind::Out)));
    merged.extend(inc[j..].iter().map(|&n| (n, DyadKind::In)));
    merged
}

/// Own census of one node in raw layout
pub fn ego_census(view: &GraphView, idx: usize) -> Array1<f64> {
    let mut counts = Array1::<f64>::zeros(MOTIF_LEN);
    let neighbours = neighbourhood(view, idx);

    for &(n, kind) in &neighbours {
        counts[kind as usize * 2 + view.label(n) as usize] += 1.0;
    }

    for (a, &(u, _)) in neighbours.iter().enumerate() {
        for &(w, _) in &neighbours[a + 1..] {
            let closed = view.adjacent(u, w) as usize;
            let label1 = view.label(u) as usize + view.label(w) as usize;
            counts[DYAD_LEN + closed * 3 + label1] += 1.0;
        }
    }

    counts
}

/// Sums of the neighbours' raw own vectors, split by neighbour label
pub fn neighbour_sums(
    view: &GraphView,
    own: &[Array1<f64>],
    idx: usize,
) -> (Array1<f64>, Array1<f64>) {
    let mut label1 = Array1::<f64>::zeros(MOTIF_LEN);
    let mut label0 = Array1::<f64>::zeros(MOTIF_LEN);

    for (n, _) in neighbourhood(view, idx) {
        if view.label(n) {
            label1 += &own[n];
        } else {
            label0 += &own[n];
        }
    }

    (label1, label0)
}

/// Run the full census over every node of the view.
///
/// Own vectors are computed for all nodes before any neighbour sum is taken,
/// and the canonical reordering is applied last. Results are aligned with
/// view indices.
pub fn motif_census(view: &GraphView) -> Vec<MotifProfile> {
    let own: Vec<Array1<f64>> = (0..view.node_count)
        .map(|idx| ego_census(view, idx))
        .collect();

    let sums: Vec<(Array1<f64>, Array1<f64>)> = (0..view.node_count)
        .map(|idx| neighbour_sums(view, &own, idx))
        .collect();

    own.iter()
        .zip(sums)
        .map(|(own, (label1, label0))| MotifProfile {
            own: canonical(own),
            from_label1: canonical(&label1),
            from_label0: canonical(&label0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 <-> 1, 0 -> 2, 2 -> 1; labels: 0 = true, 1 = false, 2 = true
    fn small_view() -> GraphView {
        GraphView::from_adjacency_list(
            vec![0, 1, 2],
            vec![vec![1, 2], vec![0], vec![1]],
            vec![vec![1], vec![0, 2], vec![0]],
            vec![true, false, true],
        )
    }

    #[test]
    fn test_neighbourhood_kinds() {
        let view = small_view();
        assert_eq!(
            neighbourhood(&view, 0),
            vec![(1, DyadKind::Mutual), (2, DyadKind::Out)]
        );
        assert_eq!(
            neighbourhood(&view, 1),
            vec![(0, DyadKind::Mutual), (2, DyadKind::In)]
        );
    }

    #[test]
    fn test_ego_census_counts() {
        let view = small_view();
        let own = ego_census(&view, 0);

        // mutual with label-0 node 1
        assert_eq!(own[DyadKind::Mutual as usize * 2], 1.0);
        // out to label-1 node 2
        assert_eq!(own[DyadKind::Out as usize * 2 + 1], 1.0);
        // closed triad (1, 2) with one label-1 neighbour
        assert_eq!(own[DYAD_LEN + 3 + 1], 1.0);
        assert_eq!(own.sum(), 3.0);
    }

    #[test]
    fn test_neighbour_sums_split_by_label() {
        let view = small_view();
        let own: Vec<_> = (0..3).map(|i| ego_census(&view, i)).collect();
        let (label1, label0) = neighbour_sums(&view, &own, 1);

        // node 1 neighbours: 0 (label 1) and 2 (label 1)
        assert_eq!(label1, &own[0] + &own[2]);
        assert_eq!(label0.sum(), 0.0);
    }

    #[test]
    fn test_census_is_canonical() {
        let view = small_view();
        let profiles = motif_census(&view);

        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].own, canonical(&ego_census(&view, 0)));
        assert_eq!(profiles[0].from_label0.sum(), ego_census(&view, 1).sum());
    }

    #[test]
    fn test_isolated_node() {
        let view = GraphView::from_adjacency_list(vec![7], vec![vec![]], vec![vec![]], vec![false]);
        let profiles = motif_census(&view);
        assert_eq!(profiles[0].own.sum(), 0.0);
        assert_eq!(profiles[0].from_label1.len(), MOTIF_LEN);
    }
}
