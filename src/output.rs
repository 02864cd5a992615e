//! Per-period motif files and the JSON-lines period report

use crate::graph::{NodeIdx, NodeRecord, Status, TemporalGraph};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Which sampled nodes go into a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFilter {
    All,
    Status(Status),
}

impl OutputFilter {
    pub fn admits(&self, record: &NodeRecord) -> bool {
        match self {
            OutputFilter::All => true,
            OutputFilter::Status(status) => record.status() == *status,
        }
    }
}

/// Formats motif lines: `external  label  outcome  own  [from_label1  from_label0]`
#[derive(Debug, Clone, Copy)]
pub struct MotifWriter {
    pub max_entries: usize,
    pub include_neighbour: bool,
}

impl MotifWriter {
    /// `None` for a node without a motif profile
    pub fn write_line(&self, record: &NodeRecord) -> Option<String> {
        let motifs = record.motifs.as_ref()?;
        let mut line = format!(
            "{}\t{}\t{}\t{}",
            record.external,
            record.label(),
            record.outcome(),
            self.join(motifs.own.iter())
        );
        if self.include_neighbour {
            line.push('\t');
            line.push_str(&self.join(motifs.from_label1.iter()));
            line.push('\t');
            line.push_str(&self.join(motifs.from_label0.iter()));
        }
        Some(line)
    }

    fn join<'a>(&self, values: impl Iterator<Item = &'a f64>) -> String {
        values
            .take(self.max_entries)
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Write every sampled, live node admitted by `filter`, in dense id order.
    ///
    /// Returns the number of lines written.
    pub fn write_file(
        &self,
        path: &Path,
        graph: &TemporalGraph,
        sample: impl IntoIterator<Item = NodeIdx>,
        filter: OutputFilter,
    ) -> OutputResult<usize> {
        let io_err = |source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut out = BufWriter::new(File::create(path).map_err(io_err)?);

        let mut written = 0;
        for id in sample {
            let Some(record) = graph.get(id) else {
                continue;
            };
            if !filter.admits(record) {
                continue;
            }
            if let Some(line) = self.write_line(record) {
                writeln!(out, "{}", line).map_err(io_err)?;
                written += 1;
            }
        }
        out.flush().map_err(io_err)?;

        info!("Wrote {} nodes to {:?}", written, path);
        Ok(written)
    }
}

/// Append one JSON line to `path`, creating the file if needed
pub fn append_report<T: Serialize>(path: &Path, report: &T) -> OutputResult<()> {
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let line = serde_json::to_string(report)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    writeln!(file, "{}", line).map_err(io_err)?;
    Ok(())
}
