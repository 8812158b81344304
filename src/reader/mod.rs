//! Log reader for convergence-study runs.
//!
//! Scans simulation log lines in order and accumulates one `Record` per
//! "Problem Name" block. The reader is a small state machine: each
//! recognized line either opens/closes a block or overwrites one field of
//! the record being built. Unrecognized lines are skipped.

pub mod trigger;

pub use trigger::Trigger;

use crate::models::{Record, RecordTable};
use crate::scanner::InputSource;
use std::io::{self, BufRead};
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;
use tracing::{debug, info, trace};
use trigger::value_after_separator;

/// Why a recognized line could not be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("'{trigger}' line has no ': ' separator")]
    MissingSeparator { trigger: Trigger },

    #[error("'{trigger}' value '{value}' is not a valid integer: {source}")]
    InvalidInteger {
        trigger: Trigger,
        value: String,
        source: ParseIntError,
    },

    #[error("'{trigger}' value '{value}' is not a valid number: {source}")]
    InvalidFloat {
        trigger: Trigger,
        value: String,
        source: ParseFloatError,
    },

    #[error("'{trigger}' value '{value}' has no field at position {position}")]
    MissingComponent {
        trigger: Trigger,
        value: String,
        position: usize,
    },

    #[error("'Basis Nodes' must be at least 1 to derive a degree")]
    ZeroBasisNodes,
}

/// Errors raised while reading log sources.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {source_name}")]
    Io {
        source_name: String,
        #[source]
        error: io::Error,
    },

    #[error("{source_name}:{line}: cannot parse '{text}'")]
    Parse {
        source_name: String,
        line: usize,
        text: String,
        #[source]
        error: FieldError,
    },
}

/// Incremental reader state. Construct a fresh one per scan.
#[derive(Debug, Clone, Default)]
pub struct LogReader {
    current: Record,
    block_open: bool,
    records: RecordTable,
}

impl LogReader {
    /// Create a reader with default record state and no output.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record currently being accumulated.
    #[cfg(test)]
    pub fn current(&self) -> &Record {
        &self.current
    }

    /// Records completed so far (excludes an open block).
    #[cfg(test)]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Classify and apply one line. Returns the trigger that matched, if any.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<Trigger>, FieldError> {
        let Some(trigger) = Trigger::classify(line) else {
            return Ok(None);
        };

        let value = value_after_separator(line).ok_or(FieldError::MissingSeparator { trigger })?;
        self.apply(trigger, value)?;

        Ok(Some(trigger))
    }

    /// Read every line of one source, continuing the current block state.
    pub fn read_source<R: BufRead>(&mut self, mut input: R, source_name: &str) -> Result<(), ReadError> {
        let mut buf = Vec::new();
        let mut line_number = 0;
        let mut matched = 0;

        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .map_err(|error| ReadError::Io {
                    source_name: source_name.to_string(),
                    error,
                })?;
            if read == 0 {
                break;
            }
            line_number += 1;

            let raw = String::from_utf8_lossy(&buf);
            let line = raw.trim_end_matches(&['\n', '\r'][..]);

            match self.feed_line(line) {
                Ok(Some(_)) => matched += 1,
                Ok(None) => {}
                Err(error) => {
                    return Err(ReadError::Parse {
                        source_name: source_name.to_string(),
                        line: line_number,
                        text: line.trim().to_string(),
                        error,
                    })
                }
            }
        }

        debug!(
            "Scanned {}: {} lines, {} recognized",
            source_name, line_number, matched
        );
        Ok(())
    }

    /// Close any open block and return the table.
    pub fn finish(mut self) -> RecordTable {
        self.close_block();
        self.records
    }

    fn apply(&mut self, trigger: Trigger, value: &str) -> Result<(), FieldError> {
        match trigger {
            Trigger::Ranks => {
                let num_procs = parse_int(trigger, value)?;
                self.close_block();
                self.current = Record {
                    num_procs,
                    ..Record::default()
                };
            }
            Trigger::ProblemName => {
                self.close_block();
                self.current.problem = value.trim().to_string();
                self.block_open = true;
            }
            Trigger::BoxFaces => {
                let second = value.split(',').nth(1).ok_or_else(|| FieldError::MissingComponent {
                    trigger,
                    value: value.trim().to_string(),
                    position: 2,
                })?;
                self.current.mesh_res = parse_int(trigger, second)?;
            }
            Trigger::BasisNodes => {
                let nodes: u32 = parse_int(trigger, value)?;
                self.current.degree = nodes.checked_sub(1).ok_or(FieldError::ZeroBasisNodes)?;
            }
            Trigger::QuadraturePoints => {
                self.current.quadrature_pts = parse_int(trigger, value)?;
            }
            Trigger::GlobalDofs => {
                self.current.num_unknowns = parse_int(trigger, value)?;
            }
            Trigger::MaxError => {
                let text = value.trim();
                self.current.max_error = text.parse().map_err(|source| FieldError::InvalidFloat {
                    trigger,
                    value: text.to_string(),
                    source,
                })?;
            }
        }

        Ok(())
    }

    fn close_block(&mut self) {
        if self.block_open {
            trace!("Block complete: {}", self.current);
            self.records.push(self.current.clone());
            self.block_open = false;
        }
    }
}

fn parse_int<T>(trigger: Trigger, value: &str) -> Result<T, FieldError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    let text = value.trim();
    text.parse().map_err(|source| FieldError::InvalidInteger {
        trigger,
        value: text.to_string(),
        source,
    })
}

/// Read all sources in order into one table.
///
/// Sources are treated as one continuous stream, so a block left open at
/// the end of one file continues into the next.
pub fn read_logs(sources: &[InputSource]) -> Result<RecordTable, ReadError> {
    let mut reader = LogReader::new();

    for source in sources {
        let source_name = source.to_string();
        let input = source.open().map_err(|error| ReadError::Io {
            source_name: source_name.clone(),
            error,
        })?;
        reader.read_source(input, &source_name)?;
    }

    let records = reader.finish();
    info!(
        "Parsed {} record(s) from {} source(s)",
        records.len(),
        sources.len()
    );
    Ok(records)
}
