//! Percentile cutoffs over per-node degree and frequency distributions

use crate::graph::NodeMetrics;
use serde::Serialize;

/// Nearest-rank percentile: the smallest value with at least `p * n` values
/// at or below it. `p` is clamped to `[0, 1]`; an empty slice has no cutoff.
///
/// The slice is reordered in place.
pub fn percentile(values: &mut [u64], p: f64) -> Option<u64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len();
    let rank = ((p.clamp(0.0, 1.0) * n as f64).ceil() as usize).clamp(1, n);
    let (_, value, _) = values.select_nth_unstable(rank - 1);
    Some(*value)
}

/// Cutoffs for the six measured distributions. `None` means no cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cutoffs {
    pub in_degree: Option<u64>,
    pub out_degree: Option<u64>,
    pub degree: Option<u64>,
    pub in_freq: Option<u64>,
    pub out_freq: Option<u64>,
    pub freq: Option<u64>,
}

impl Cutoffs {
    /// Compute every cutoff independently at percentile `p`
    pub fn compute(metrics: impl IntoIterator<Item = NodeMetrics>, p: f64) -> Self {
        let mut columns: [Vec<u64>; 6] = Default::default();
        for m in metrics {
            columns[0].push(m.in_degree);
            columns[1].push(m.out_degree);
            columns[2].push(m.degree);
            columns[3].push(m.in_freq);
            columns[4].push(m.out_freq);
            columns[5].push(m.freq);
        }
        let [in_degree, out_degree, degree, in_freq, out_freq, freq] =
            columns.map(|mut column| percentile(&mut column, p));
        Cutoffs {
            in_degree,
            out_degree,
            degree,
            in_freq,
            out_freq,
            freq,
        }
    }

    /// True when any measure is strictly above its cutoff
    pub fn exceeded_by(&self, m: &NodeMetrics) -> bool {
        let above = |value: u64, cutoff: Option<u64>| cutoff.is_some_and(|c| value > c);
        above(m.in_degree, self.in_degree)
            || above(m.out_degree, self.out_degree)
            || above(m.degree, self.degree)
            || above(m.in_freq, self.in_freq)
            || above(m.out_freq, self.out_freq)
            || above(m.freq, self.freq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_nearest_rank() {
        let mut values: Vec<u64> = (1..=100).rev().collect();
        assert_eq!(percentile(&mut values, 0.99), Some(99));
        assert_eq!(percentile(&mut values, 0.5), Some(50));
        assert_eq!(percentile(&mut values, 1.0), Some(100));
        assert_eq!(percentile(&mut values, 0.0), Some(1));
    }

    #[test]
    fn test_percentile_small_and_empty() {
        assert_eq!(percentile(&mut [], 0.99), None);
        assert_eq!(percentile(&mut [7], 0.99), Some(7));
        // ceil(0.99 * 3) = 3 -> the maximum
        assert_eq!(percentile(&mut [3, 1, 2], 0.99), Some(3));
    }

    #[test]
    fn test_ties_at_cutoff_are_kept() {
        let metrics: Vec<NodeMetrics> = [1u64, 2, 2, 2]
            .iter()
            .map(|&f| NodeMetrics { freq: f, ..Default::default() })
            .collect();
        let cutoffs = Cutoffs::compute(metrics.iter().copied(), 0.5);
        assert_eq!(cutoffs.freq, Some(2));
        assert!(!cutoffs.exceeded_by(&metrics[1]));
        assert!(cutoffs.exceeded_by(&NodeMetrics { freq: 3, ..Default::default() }));
    }

    #[test]
    fn test_strictly_above_is_removed() {
        let metrics: Vec<NodeMetrics> = (1..=100u64)
            .map(|d| NodeMetrics { out_degree: d, ..Default::default() })
            .collect();
        let cutoffs = Cutoffs::compute(metrics.iter().copied(), 0.99);
        let removed: Vec<u64> = metrics
            .iter()
            .filter(|m| cutoffs.exceeded_by(m))
            .map(|m| m.out_degree)
            .collect();
        assert_eq!(removed, vec![100]);
    }

    #[test]
    fn test_empty_distribution_has_no_cutoff() {
        let cutoffs = Cutoffs::compute(std::iter::empty(), 0.99);
        assert_eq!(cutoffs, Cutoffs::default());
        assert!(!cutoffs.exceeded_by(&NodeMetrics { freq: u64::MAX, ..Default::default() }));
    }
}
