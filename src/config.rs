//! Pipeline configuration
//!
//! Loaded from YAML. Everything except the logs and the schedule has a
//! default.

use crate::algo::{SampleRetention, SampleSpec};
use crate::graph::{EventTime, RecordError};
use crate::ingest::OutlierParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid {field} date: {source}")]
    Date {
        field: &'static str,
        #[source]
        source: RecordError,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Reporting periods between two `yyMMdd` dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub start: String,
    pub end: String,
    #[serde(default = "default_period_days")]
    pub period_days: u32,
}

fn default_period_days() -> u32 {
    7
}

impl ScheduleConfig {
    pub fn start_time(&self) -> ConfigResult<EventTime> {
        EventTime::parse_boundary(&self.start).map_err(|source| ConfigError::Date {
            field: "start",
            source,
        })
    }

    pub fn end_time(&self) -> ConfigResult<EventTime> {
        EventTime::parse_boundary(&self.end).map_err(|source| ConfigError::Date {
            field: "end",
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sampling calls made every period, in order
    pub calls: Vec<SampleSpec>,
    pub seed: Option<u64>,
    pub retention: SampleRetention,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            calls: vec![SampleSpec::default()],
            seed: None,
            retention: SampleRetention::Accumulate,
        }
    }
}

/// Where motif files go. Period `i` writes `<dir>/<header>{i}.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub all: String,
    pub adopted: String,
    pub unobserved: String,
    /// Components kept per vector
    pub max_entries: usize,
    /// Append the two neighbour-sum vectors
    pub include_neighbour: bool,
    /// JSON-lines period report
    pub report: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            all: "all".to_string(),
            adopted: "adopted".to_string(),
            unobserved: "unobserved".to_string(),
            max_entries: 120,
            include_neighbour: true,
            report: None,
        }
    }
}

impl OutputConfig {
    pub fn period_file(&self, header: &str, period: usize) -> PathBuf {
        self.dir.join(format!("{}{}.txt", header, period))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub signup_log: PathBuf,
    /// Read in the order given
    pub interaction_logs: Vec<PathBuf>,
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub filter: OutlierParams,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Stop reading once this many dense ids have been allocated
    #[serde(default)]
    pub node_cap: Option<usize>,
}

impl PipelineConfig {
    /// Config with default filter, sampling and output settings
    pub fn new(
        signup_log: impl Into<PathBuf>,
        interaction_logs: Vec<PathBuf>,
        start: &str,
        end: &str,
    ) -> Self {
        Self {
            signup_log: signup_log.into(),
            interaction_logs,
            schedule: ScheduleConfig {
                start: start.to_string(),
                end: end.to_string(),
                period_days: default_period_days(),
            },
            filter: OutlierParams::default(),
            sampling: SamplingConfig::default(),
            output: OutputConfig::default(),
            node_cap: None,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without validating it, so callers can patch
    /// fields before calling [`PipelineConfig::validate`]
    pub fn read(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.interaction_logs.is_empty() {
            return Err(ConfigError::Invalid("no interaction logs".to_string()));
        }
        if self.schedule.period_days == 0 {
            return Err(ConfigError::Invalid("period_days must be positive".to_string()));
        }
        if self.schedule.start_time()? >= self.schedule.end_time()? {
            return Err(ConfigError::Invalid(format!(
                "schedule must start before it ends ({} >= {})",
                self.schedule.start, self.schedule.end
            )));
        }
        if !(self.filter.percentile > 0.0 && self.filter.percentile <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "percentile {} outside (0, 1]",
                self.filter.percentile
            )));
        }
        if self.output.max_entries == 0 {
            return Err(ConfigError::Invalid("max_entries must be positive".to_string()));
        }
        Ok(())
    }
}
