//! Period driver
//!
//! Splits `[start, end)` into fixed-length periods and runs the full cycle
//! for each one, in order:
//!
//! 1. label pass (signups up to the horizon)
//! 2. outlier pass (interactions, statistics, removal)
//! 3. graph pass (colored adjacency)
//! 4. motif aggregation over all live nodes
//! 5. sampling
//! 6. motif files and period report
//!
//! The graph and the sample carry over from one period to the next.

use crate::algo::{aggregate_motifs, Cutoffs, EgoCensus, MotifAggregator, Sampler};
use crate::config::{ConfigError, PipelineConfig};
use crate::graph::{EventTime, GraphError, Status, TemporalGraph};
use crate::ingest::{
    graph_pass, label_pass, outlier_pass, GraphReport, IngestError, LabelReport, OutlierReport,
    PeriodWindow,
};
use crate::output::{append_report, MotifWriter, OutputError, OutputFilter};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Fixed-length periods starting at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start: EventTime,
    pub period_days: u32,
    pub periods: usize,
}

impl Schedule {
    /// `floor(days(start, end) / period_days)` whole periods
    pub fn new(start: EventTime, end: EventTime, period_days: u32) -> Self {
        let days = (end.day() - start.day()).max(0);
        let periods = if period_days == 0 {
            0
        } else {
            (days / period_days as i64) as usize
        };
        Self {
            start,
            period_days,
            periods,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let schedule = &config.schedule;
        Ok(Self::new(schedule.start_time()?, schedule.end_time()?, schedule.period_days))
    }

    /// Period `i`: `T0 = start + i*p`, `T1 = T0 + p`, `T2 = T1 + p`
    pub fn window(&self, index: usize) -> Option<PeriodWindow> {
        if index >= self.periods {
            return None;
        }
        let period = self.period_days as i64 * EventTime::SECONDS_PER_DAY;
        let start = EventTime(self.start.as_secs() + index as i64 * period);
        let boundary = EventTime(start.as_secs() + period);
        let horizon = EventTime(boundary.as_secs() + period);
        PeriodWindow::new(index, start, boundary, horizon)
    }

    pub fn windows(&self) -> impl Iterator<Item = PeriodWindow> + '_ {
        (0..self.periods).filter_map(|i| self.window(i))
    }
}

/// Lines written per motif file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WrittenCounts {
    pub all: usize,
    pub adopted: usize,
    pub unobserved: usize,
}

/// Everything one period did, written as one JSON line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub window: PeriodWindow,
    pub label: LabelReport,
    pub outlier: OutlierReport,
    pub graph: GraphReport,
    /// Nodes that received a motif profile
    pub profiled: usize,
    pub sample_size: usize,
    pub sampled_new: usize,
    pub written: WrittenCounts,
}

impl PeriodReport {
    pub fn cutoffs(&self) -> &Cutoffs {
        &self.outlier.cutoffs
    }
}

/// Runs the per-period cycle over a long-lived graph and sample
pub struct PeriodDriver<A: MotifAggregator = EgoCensus> {
    config: PipelineConfig,
    graph: TemporalGraph,
    sampler: Sampler,
    aggregator: A,
}

impl PeriodDriver<EgoCensus> {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        Self::with_aggregator(config, EgoCensus)
    }
}

impl<A: MotifAggregator> PeriodDriver<A> {
    pub fn with_aggregator(config: PipelineConfig, aggregator: A) -> PipelineResult<Self> {
        config.validate()?;
        let sampler = Sampler::new(config.sampling.seed, config.sampling.retention);
        Ok(Self {
            config,
            graph: TemporalGraph::new(),
            sampler,
            aggregator,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn graph(&self) -> &TemporalGraph {
        &self.graph
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Run every scheduled period. The first error stops the run.
    pub fn run(&mut self) -> PipelineResult<Vec<PeriodReport>> {
        let schedule = Schedule::from_config(&self.config)?;
        info!(
            "{} periods of {} days from {}",
            schedule.periods, schedule.period_days, schedule.start
        );

        let mut reports = Vec::with_capacity(schedule.periods);
        for window in schedule.windows() {
            reports.push(self.run_period(&window)?);
        }
        Ok(reports)
    }

    pub fn run_period(&mut self, window: &PeriodWindow) -> PipelineResult<PeriodReport> {
        info!(
            "Period {}: interactions {} to {}, signups up to {}",
            window.index, window.start, window.boundary, window.horizon
        );
        let cap = self.config.node_cap;

        let label = label_pass(&mut self.graph, &self.config.signup_log, window, cap)?;
        let outlier = outlier_pass(
            &mut self.graph,
            &self.config.interaction_logs,
            window,
            &self.config.filter,
            cap,
        )?;
        let graph = graph_pass(&mut self.graph, &self.config.interaction_logs, window)?;
        let profiled = aggregate_motifs(&mut self.graph, &self.aggregator)?;

        self.sampler.begin_period();
        let mut sampled_new = 0;
        for spec in &self.config.sampling.calls {
            sampled_new += self.sampler.sample(&self.graph, spec);
        }
        info!("Sample of nodes now: {}", self.sampler.len());

        let written = self.write_outputs(window.index)?;
        let report = PeriodReport {
            window: *window,
            label,
            outlier,
            graph,
            profiled,
            sample_size: self.sampler.len(),
            sampled_new,
            written,
        };
        if let Some(path) = &self.config.output.report {
            append_report(path, &report)?;
        }

        #[cfg(debug_assertions)]
        self.graph.check_consistency()?;

        Ok(report)
    }

    fn write_outputs(&self, period: usize) -> PipelineResult<WrittenCounts> {
        let output = &self.config.output;
        let writer = MotifWriter {
            max_entries: output.max_entries,
            include_neighbour: output.include_neighbour,
        };
        let files = [
            (&output.all, OutputFilter::All),
            (&output.adopted, OutputFilter::Status(Status::Adopted)),
            (&output.unobserved, OutputFilter::Status(Status::Unobserved)),
        ];

        let mut counts = [0usize; 3];
        for (count, (header, filter)) in counts.iter_mut().zip(files) {
            let path = output.period_file(header, period);
            *count = writer.write_file(&path, &self.graph, self.sampler.ids(), filter)?;
        }
        let [all, adopted, unobserved] = counts;
        Ok(WrittenCounts {
            all,
            adopted,
            unobserved,
        })
    }

    /// Hand back the graph and sample after a run
    pub fn into_parts(self) -> (TemporalGraph, Sampler) {
        (self.graph, self.sampler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> EventTime {
        EventTime::parse_boundary(raw).unwrap()
    }

    #[test]
    fn test_schedule_periods() {
        let schedule = Schedule::new(date("080701"), date("080801"), 7);
        assert_eq!(schedule.periods, 4);

        let w = schedule.window(1).unwrap();
        assert_eq!(w.start, date("080708"));
        assert_eq!(w.boundary, date("080715"));
        assert_eq!(w.horizon, date("080722"));
        assert!(schedule.window(4).is_none());
        assert_eq!(schedule.windows().count(), 4);
    }

    #[test]
    fn test_short_schedule_is_empty() {
        assert_eq!(Schedule::new(date("080701"), date("080707"), 7).periods, 0);
        assert_eq!(Schedule::new(date("080701"), date("080708"), 7).periods, 1);
        assert_eq!(Schedule::new(date("080708"), date("080701"), 7).periods, 0);
    }
}
