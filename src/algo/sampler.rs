//! Output sampling
//!
//! Selects surviving nodes for output. Independent sampling scans the
//! population in dictionary order and greedily admits nodes none of whose
//! neighbours have appeared yet, so the result is an independent set but
//! not a uniformly random one.

use crate::graph::{NodeIdx, Status, TemporalGraph};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// One sampling call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSpec {
    /// Maximum number of ids drawn, `None` for the whole population
    pub len: Option<usize>,
    /// Only draw nodes with this status
    pub outcome: Option<Status>,
    /// Draw a set of pairwise non-adjacent nodes
    pub indep: bool,
}

/// What happens to the sample when a new period begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRetention {
    /// Keep growing the sample across periods
    #[default]
    Accumulate,
    ResetEachPeriod,
}

/// Holds the persistent sample and its random source
#[derive(Debug)]
pub struct Sampler {
    sample: BTreeSet<NodeIdx>,
    rng: StdRng,
    retention: SampleRetention,
}

impl Sampler {
    /// Seeded samplers draw the same ids for the same graph
    pub fn new(seed: Option<u64>, retention: SampleRetention) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            sample: BTreeSet::new(),
            rng,
            retention,
        }
    }

    pub fn retention(&self) -> SampleRetention {
        self.retention
    }

    pub fn begin_period(&mut self) {
        if self.retention == SampleRetention::ResetEachPeriod {
            self.sample.clear();
        }
    }

    /// Draw according to `spec` and union the draw into the sample.
    ///
    /// Returns the number of ids new to the sample.
    pub fn sample(&mut self, graph: &TemporalGraph, spec: &SampleSpec) -> usize {
        let population: Vec<NodeIdx> = graph
            .ids()
            .filter(|&id| match spec.outcome {
                Some(status) => graph.get(id).is_some_and(|r| r.status() == status),
                None => true,
            })
            .collect();
        let eligible = population.len();

        let mut candidates = if spec.indep {
            independent(graph, population)
        } else {
            population
        };
        candidates.shuffle(&mut self.rng);
        candidates.truncate(spec.len.unwrap_or(usize::MAX));

        let before = self.sample.len();
        self.sample.extend(candidates);
        let added = self.sample.len() - before;

        debug!(
            "Sampled {} new ids from {} eligible (outcome filter {:?}, indep {})",
            added, eligible, spec.outcome, spec.indep
        );
        added
    }

    pub fn contains(&self, id: NodeIdx) -> bool {
        self.sample.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }

    /// Sampled ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.sample.iter().copied()
    }
}

/// Greedy independent set over `population`, scanned in order
fn independent(graph: &TemporalGraph, population: Vec<NodeIdx>) -> Vec<NodeIdx> {
    let mut appeared: FxHashSet<NodeIdx> = FxHashSet::default();
    let mut admitted = Vec::new();

    for id in population {
        let Some(record) = graph.get(id) else {
            continue;
        };
        let neighbours = record.neighbours();
        if appeared.contains(&id) || neighbours.iter().any(|n| appeared.contains(n)) {
            continue;
        }
        appeared.insert(id);
        appeared.extend(neighbours);
        admitted.push(id);
    }
    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ExternalId;

    /// Path 0 - 1 - 2 - 3 - 4 plus isolated 5; even nodes existing
    fn path_graph() -> (TemporalGraph, Vec<NodeIdx>) {
        let mut graph = TemporalGraph::new();
        let ids: Vec<NodeIdx> = (0..6)
            .map(|i| {
                let status = if i % 2 == 0 { Status::Existing } else { Status::Adopted };
                graph.insert(ExternalId(100 + i), status).live().unwrap()
            })
            .collect();
        for pair in ids[..5].windows(2) {
            let (s, r) = graph.get_pair_mut(pair[0], pair[1]).unwrap();
            s.link_to(pair[1], false);
            r.link_from(pair[0], false);
        }
        (graph, ids)
    }

    fn adjacent(graph: &TemporalGraph, a: NodeIdx, b: NodeIdx) -> bool {
        graph.get(a).unwrap().neighbours().contains(&b)
    }

    #[test]
    fn test_sample_bound_and_population() {
        let (graph, _) = path_graph();
        let mut sampler = Sampler::new(Some(7), SampleRetention::Accumulate);
        let spec = SampleSpec {
            len: Some(2),
            outcome: Some(Status::Existing),
            indep: false,
        };

        assert_eq!(sampler.sample(&graph, &spec), 2);
        for id in sampler.ids() {
            assert_eq!(graph.get(id).unwrap().status(), Status::Existing);
        }

        let before = sampler.len();
        let added = sampler.sample(&graph, &spec);
        assert!(sampler.len() <= before + 2);
        assert_eq!(sampler.len(), before + added);
        assert!(sampler.len() <= 3);
    }

    #[test]
    fn test_unlimited_draws_everything() {
        let (graph, ids) = path_graph();
        let mut sampler = Sampler::new(None, SampleRetention::Accumulate);
        sampler.sample(&graph, &SampleSpec::default());
        assert_eq!(sampler.ids().collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_independent_sample_is_non_adjacent() {
        let (graph, ids) = path_graph();
        let mut sampler = Sampler::new(Some(1), SampleRetention::Accumulate);
        let spec = SampleSpec {
            indep: true,
            ..SampleSpec::default()
        };
        sampler.sample(&graph, &spec);

        let picked: Vec<NodeIdx> = sampler.ids().collect();
        // 0 marks 1 as appeared, which blocks 2; 3 then blocks 4
        assert_eq!(picked, vec![ids[0], ids[3], ids[5]]);
        for (i, &a) in picked.iter().enumerate() {
            for &b in &picked[i + 1..] {
                assert!(!adjacent(&graph, a, b));
            }
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let (graph, _) = path_graph();
        let spec = SampleSpec {
            len: Some(3),
            ..SampleSpec::default()
        };
        let draw = |seed| {
            let mut sampler = Sampler::new(Some(seed), SampleRetention::Accumulate);
            sampler.sample(&graph, &spec);
            sampler.ids().collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_retention() {
        let (graph, _) = path_graph();
        let spec = SampleSpec::default();

        let mut keep = Sampler::new(Some(3), SampleRetention::Accumulate);
        keep.sample(&graph, &spec);
        keep.begin_period();
        assert_eq!(keep.len(), 6);

        let mut reset = Sampler::new(Some(3), SampleRetention::ResetEachPeriod);
        reset.sample(&graph, &spec);
        reset.begin_period();
        assert!(reset.is_empty());
    }
}
