//! Line-oriented log reader
//!
//! Lines look like `L45485508|L10822145|080703|09:40:55|20|170|172`:
//! sender, receiver, date, time, amount, sender tower, receiver tower.

use super::{IngestError, IngestResult};
use crate::graph::{EventTime, ExternalId, RecordError};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FIELD_SENDER: usize = 0;
const FIELD_RECEIVER: usize = 1;
const FIELD_DATE: usize = 2;
const FIELD_TIME: usize = 3;
const FIELD_AMOUNT: usize = 4;
const MIN_FIELDS: usize = FIELD_AMOUNT + 1;

/// Which actors a pass needs from each line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Sender only
    Signup,
    /// Sender and receiver
    Interaction,
}

/// One parsed log record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEvent {
    pub time: EventTime,
    pub sender: ExternalId,
    /// Always `Some` for [`RecordKind::Interaction`]
    pub receiver: Option<ExternalId>,
}

/// Line counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub lines: u64,
    /// Lines whose amount starts with `-`
    pub missing: u64,
    pub malformed: u64,
}

/// Parse one line. `Ok(None)` marks a record with a missing amount.
pub fn parse_line(line: &str, kind: RecordKind) -> Result<Option<LogEvent>, RecordError> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < MIN_FIELDS {
        return Err(RecordError::TooFewFields {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }

    let amount = fields[FIELD_AMOUNT];
    if amount.is_empty() {
        return Err(RecordError::EmptyField(FIELD_AMOUNT));
    }
    if amount.starts_with('-') {
        return Ok(None);
    }

    let time = EventTime::parse(fields[FIELD_DATE], fields[FIELD_TIME])?;
    let sender = ExternalId::parse(fields[FIELD_SENDER])?;
    let receiver = match kind {
        RecordKind::Signup => None,
        RecordKind::Interaction => Some(ExternalId::parse(fields[FIELD_RECEIVER])?),
    };

    Ok(Some(LogEvent {
        time,
        sender,
        receiver,
    }))
}

/// Streams events from a list of files, front to back, in the order given.
///
/// Files are opened lazily, so a pass that stops early never touches the
/// remaining files.
pub struct LogStream {
    paths: Vec<PathBuf>,
    next_file: usize,
    current: Option<(PathBuf, BufReader<File>)>,
    line_no: u64,
    buf: Vec<u8>,
    kind: RecordKind,
    stats: StreamStats,
}

impl LogStream {
    pub fn open<P: AsRef<Path>>(paths: &[P], kind: RecordKind) -> Self {
        Self {
            paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
            next_file: 0,
            current: None,
            line_no: 0,
            buf: Vec::new(),
            kind,
            stats: StreamStats::default(),
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Next well-formed event, skipping missing and malformed lines
    pub fn next_event(&mut self) -> IngestResult<Option<LogEvent>> {
        loop {
            if self.current.is_none() {
                let Some(path) = self.paths.get(self.next_file).cloned() else {
                    return Ok(None);
                };
                self.next_file += 1;
                let file = File::open(&path).map_err(|source| IngestError::Open {
                    path: path.clone(),
                    source,
                })?;
                debug!("Streaming {:?}", path);
                self.current = Some((path, BufReader::new(file)));
                self.line_no = 0;
            }

            let Some((path, reader)) = self.current.as_mut() else {
                continue;
            };
            self.buf.clear();
            let read = reader.read_until(b'\n', &mut self.buf).map_err(|source| IngestError::Read {
                path: path.clone(),
                line: self.line_no + 1,
                source,
            })?;
            if read == 0 {
                self.current = None;
                continue;
            }
            self.line_no += 1;
            self.stats.lines += 1;

            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(e) => {
                    self.stats.malformed += 1;
                    debug!("Skipping {:?} line {}: {}", path, self.line_no, e);
                    continue;
                }
            };
            match parse_line(line.trim_end_matches(['\r', '\n']), self.kind) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => self.stats.missing += 1,
                Err(e) => {
                    self.stats.malformed += 1;
                    debug!("Skipping {:?} line {}: {}", path, self.line_no, e);
                }
            }
        }
    }

    /// Emit one warning if any malformed line was skipped
    pub fn finish(&self, pass: &str) -> StreamStats {
        if self.stats.malformed > 0 {
            warn!(
                "{}: skipped {} malformed of {} lines",
                pass, self.stats.malformed, self.stats.lines
            );
        }
        self.stats
    }
}
