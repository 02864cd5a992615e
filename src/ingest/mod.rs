//! Ingestion passes
//!
//! Three ordered streaming passes populate and mutate the temporal graph for
//! one period:
//! - label pass: signup log, assigns `Status` per time bucket
//! - outlier pass: interaction logs, degree/frequency statistics, removal
//! - graph pass: interaction logs again, label-colored adjacency
//!
//! Each pass reads its logs once, front to back, and may stop early once the
//! time horizon is crossed.

pub mod graph_pass;
pub mod label_pass;
pub mod outlier_pass;
pub mod reader;

pub use graph_pass::{graph_pass, GraphReport};
pub use label_pass::{classify, label_pass, LabelReport};
pub use outlier_pass::{outlier_pass, OutlierParams, OutlierReport};
pub use reader::{parse_line, LogEvent, LogStream, RecordKind, StreamStats};

use crate::graph::EventTime;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal ingestion errors
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to open log {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read log {path:?} at line {line}: {source}")]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Time split of one period: `start <= boundary <= horizon`.
///
/// Interactions are read over `[start, boundary)`; signups are classified
/// against `boundary` and read up to `horizon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub index: usize,
    pub start: EventTime,
    pub boundary: EventTime,
    pub horizon: EventTime,
}

impl PeriodWindow {
    /// Returns `None` unless `start <= boundary <= horizon`
    pub fn new(index: usize, start: EventTime, boundary: EventTime, horizon: EventTime) -> Option<Self> {
        (start <= boundary && boundary <= horizon).then_some(Self {
            index,
            start,
            boundary,
            horizon,
        })
    }

    /// True for interaction times inside `[start, boundary)`
    pub fn observes(&self, time: EventTime) -> bool {
        self.start <= time && time < self.boundary
    }
}

/// Logs one `debug!` line each time the stream enters a new day
#[derive(Debug, Default)]
pub(crate) struct DayProgress {
    day: Option<i64>,
}

impl DayProgress {
    pub(crate) fn tick(&mut self, pass: &str, time: EventTime) {
        let day = time.day();
        if self.day.map_or(true, |seen| day > seen) {
            self.day = Some(day);
            tracing::debug!("{}: reached {}", pass, time);
        }
    }
}

#[cfg(test)]
pub(crate) fn write_log(dir: &std::path::Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut body = lines.join("\n");
    body.push('\n');
    std::fs::write(&path, body).unwrap();
    path
}
