//! Streaming GFF reader for CUGO segmentation.
//!
//! Reads the nine-column GFF records in file order, keeps coding features
//! and the single non-coding record that directly follows a coding run,
//! and exposes every coding feature together with its retained neighbours.

use log::debug;
use std::io::{self, BufRead};
use thiserror::Error;

use crate::config::Config;
use crate::types::{FeatureRecord, Strand};

/// Number of tab-separated columns in a well-formed GFF record.
pub const GFF_FIELD_COUNT: usize = 9;

/// Fatal errors raised while reading a GFF stream.
#[derive(Error, Debug)]
pub enum GffError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid coordinate at line {line}: '{value}'")]
    Coordinate { line: usize, value: String },

    #[error("Invalid strand at line {line}: '{value}' (expected '+' or '-')")]
    Strand { line: usize, value: String },

    #[error("Missing feature id in annotation column at line {line}")]
    MissingId { line: usize },
}

/// A record that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retained {
    Coding(FeatureRecord),
    /// A non-coding feature directly after a coding one. Only its contig
    /// matters: it terminates the coding run before it.
    NonCoding { parent: String },
}

impl Retained {
    fn neighbor(&self) -> Neighbor {
        match self {
            Retained::Coding(feature) => Neighbor::Coding {
                parent: feature.parent.clone(),
                strand: feature.strand,
            },
            Retained::NonCoding { parent } => Neighbor::NonCoding {
                parent: parent.clone(),
            },
        }
    }
}

/// What the classifier needs to know about an adjacent retained record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Neighbor {
    Coding { parent: String, strand: Strand },
    NonCoding { parent: String },
}

/// The record before the current coding feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookback {
    StartOfStream,
    Record(Neighbor),
}

/// The record after the current coding feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookahead {
    EndOfStream,
    Record(Neighbor),
}

/// A coding feature with one retained record of context on either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub prev: Lookback,
    pub current: FeatureRecord,
    pub next: Lookahead,
}

/// Streaming GFF reader.
///
/// Lines without exactly nine columns are skipped. Non-coding records are
/// kept only when the previously retained record was coding.
pub struct GffReader<R> {
    reader: R,
    config: Config,
    line: String,
    line_number: usize,
    prev_coding: bool,
    skipped_lines: usize,
}

impl<R: BufRead> GffReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R, config: Config) -> Self {
        GffReader {
            reader,
            config,
            line: String::new(),
            line_number: 0,
            prev_coding: false,
            skipped_lines: 0,
        }
    }

    /// Number of lines dropped for having the wrong field count.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Read the next retained record, or `None` at end of stream.
    pub fn next_record(&mut self) -> Result<Option<Retained>, GffError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let fields: Vec<&str> = self.line.trim().split('\t').collect();
            if fields.len() != GFF_FIELD_COUNT {
                debug!(
                    "Skipping line {}: {} fields",
                    self.line_number,
                    fields.len()
                );
                self.skipped_lines += 1;
                continue;
            }

            if !self.config.is_coding(fields[2]) {
                if !self.prev_coding {
                    continue;
                }
                self.prev_coding = false;
                return Ok(Some(Retained::NonCoding {
                    parent: fields[0].to_string(),
                }));
            }

            self.prev_coding = true;
            let feature = parse_coding_fields(&fields, self.line_number, &self.config)?;
            return Ok(Some(Retained::Coding(feature)));
        }
    }

    /// Turn the reader into an iterator of coding-feature windows.
    pub fn windows(self) -> Windows<R> {
        Windows {
            reader: self,
            prev: Lookback::StartOfStream,
            pending: None,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for GffReader<R> {
    type Item = Result<Retained, GffError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Iterator over [`Window`]s, one per coding feature in file order.
///
/// Holds the lookback, the current record and the lookahead; the lookahead
/// read for one window becomes the current record of the next.
pub struct Windows<R> {
    reader: GffReader<R>,
    prev: Lookback,
    pending: Option<Retained>,
    failed: bool,
}

impl<R> Windows<R> {
    /// Access the underlying reader (e.g. for skip statistics).
    pub fn reader(&self) -> &GffReader<R> {
        &self.reader
    }
}

impl<R: BufRead> Windows<R> {
    fn read(&mut self) -> Result<Option<Retained>, GffError> {
        match self.pending.take() {
            Some(record) => Ok(Some(record)),
            None => self.reader.next_record(),
        }
    }
}

impl<R: BufRead> Iterator for Windows<R> {
    type Item = Result<Window, GffError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let current = match self.read() {
                Ok(Some(record)) => record,
                Ok(None) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            let next = match self.reader.next_record() {
                Ok(next) => next,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            let lookback =
                std::mem::replace(&mut self.prev, Lookback::Record(current.neighbor()));
            let lookahead = match &next {
                Some(record) => Lookahead::Record(record.neighbor()),
                None => Lookahead::EndOfStream,
            };
            self.pending = next;

            match current {
                Retained::Coding(feature) => {
                    return Some(Ok(Window {
                        prev: lookback,
                        current: feature,
                        next: lookahead,
                    }))
                }
                Retained::NonCoding { .. } => continue,
            }
        }
    }
}

/// Build a coding feature from the nine GFF columns.
fn parse_coding_fields(
    fields: &[&str],
    line: usize,
    config: &Config,
) -> Result<FeatureRecord, GffError> {
    let start = parse_coordinate(fields[3], line)?;
    let end = parse_coordinate(fields[4], line)?;
    let strand = fields[6].parse::<Strand>().map_err(|_| GffError::Strand {
        line,
        value: fields[6].to_string(),
    })?;

    let mut entries = fields[8].split(';');
    let id = entries
        .next()
        .map(attribute_value)
        .map(|raw| config.normalize_id(raw))
        .filter(|id| !id.is_empty())
        .ok_or(GffError::MissingId { line })?;
    let tag = entries
        .next()
        .map(attribute_value)
        .filter(|tag| !tag.is_empty())
        .unwrap_or(config.missing_tag.as_str())
        .to_string();

    Ok(FeatureRecord::new(
        fields[0].to_string(),
        id,
        tag,
        start,
        end,
        strand,
    ))
}

/// Coordinates are 1-based, so zero and negatives are rejected.
fn parse_coordinate(value: &str, line: usize) -> Result<u64, GffError> {
    match value.parse::<u64>() {
        Ok(coordinate) if coordinate > 0 => Ok(coordinate),
        _ => Err(GffError::Coordinate {
            line,
            value: value.to_string(),
        }),
    }
}

/// Value of a `key=value` annotation entry; entries without `=` are taken whole.
fn attribute_value(entry: &str) -> &str {
    match entry.split_once('=') {
        Some((_, value)) => value,
        None => entry,
    }
}
