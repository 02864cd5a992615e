//! Core type definitions for the temporal interaction graph

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Dense node identifier.
///
/// Allocated monotonically by the dictionary and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    pub fn new(id: u32) -> Self {
        NodeIdx(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIdx({})", self.0)
    }
}

impl From<u32> for NodeIdx {
    fn from(id: u32) -> Self {
        NodeIdx(id)
    }
}

/// Reasons a log line cannot be turned into an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("empty field {0}")]
    EmptyField(usize),

    #[error("empty identifier")]
    EmptyIdentifier,

    #[error("unknown identifier namespace '{0}'")]
    UnknownNamespace(char),

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid time '{0}'")]
    InvalidTime(String),
}

/// External actor identifier after namespace normalization.
///
/// The leading namespace character is substituted by a digit
/// (`L` -> 0, `F` -> 1, `N` -> 2) and the whole string is read as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ExternalId(pub u64);

impl ExternalId {
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let mut chars = raw.chars();
        let prefix = chars.next().ok_or(RecordError::EmptyIdentifier)?;
        let digit: u64 = match prefix {
            'L' => 0,
            'F' => 1,
            'N' => 2,
            other => return Err(RecordError::UnknownNamespace(other)),
        };

        let rest = chars.as_str();
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RecordError::InvalidIdentifier(raw.to_string()));
        }
        let number: u64 = rest
            .parse()
            .map_err(|_| RecordError::InvalidIdentifier(raw.to_string()))?;
        let scale = 10u64
            .checked_pow(rest.len() as u32)
            .ok_or_else(|| RecordError::InvalidIdentifier(raw.to_string()))?;
        digit
            .checked_mul(scale)
            .and_then(|head| head.checked_add(number))
            .map(ExternalId)
            .ok_or_else(|| RecordError::InvalidIdentifier(raw.to_string()))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event time in seconds since the Unix epoch (naive, no timezone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EventTime(pub i64);

impl EventTime {
    pub const SECONDS_PER_DAY: i64 = 86_400;

    /// Parse a `yyMMdd` date and `HH:MM:SS` time pair
    pub fn parse(date: &str, time: &str) -> Result<Self, RecordError> {
        let day = NaiveDate::parse_from_str(date, "%y%m%d")
            .map_err(|_| RecordError::InvalidDate(date.to_string()))?;
        let clock = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .map_err(|_| RecordError::InvalidTime(time.to_string()))?;
        Ok(EventTime(day.and_time(clock).and_utc().timestamp()))
    }

    /// Midnight of a `yyMMdd` boundary date
    pub fn parse_boundary(date: &str) -> Result<Self, RecordError> {
        let day = NaiveDate::parse_from_str(date, "%y%m%d")
            .map_err(|_| RecordError::InvalidDate(date.to_string()))?;
        Ok(Self::from_date(day))
    }

    pub fn from_date(day: NaiveDate) -> Self {
        EventTime(day.and_time(NaiveTime::MIN).and_utc().timestamp())
    }

    /// Whole days since the epoch, used for progress logging
    pub fn day(&self) -> i64 {
        self.0.div_euclid(Self::SECONDS_PER_DAY)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match chrono::DateTime::from_timestamp(self.0, 0) {
            Some(dt) => write!(f, "{}", dt.naive_utc().format("%y%m%d|%H:%M:%S")),
            None => write!(f, "{}s", self.0),
        }
    }
}

/// Signup status of a node relative to the current period's time split.
///
/// Outcome and label only ever change together through this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Never seen in the signup log
    #[default]
    Unobserved,
    /// Signed up before the period boundary
    Existing,
    /// Signed up between the boundary and the horizon
    Adopted,
}

impl Status {
    /// Regression outcome: -1 existing, +1 adopted, 0 unobserved
    pub fn outcome(&self) -> i8 {
        match self {
            Status::Unobserved => 0,
            Status::Existing => -1,
            Status::Adopted => 1,
        }
    }

    /// Peer label: 1 for existing users, 0 otherwise
    pub fn label(&self) -> u8 {
        match self {
            Status::Existing => 1,
            Status::Unobserved | Status::Adopted => 0,
        }
    }

    pub fn is_labelled(&self) -> bool {
        self.label() == 1
    }
}
