//! Core data structures for cugo.
//!
//! This module contains the fundamental types shared by the GFF reader,
//! the segmentation state machine and the output writer.

use std::fmt;
use std::str::FromStr;

/// Strand orientation for genomic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Positive,
    Negative,
}

/// Error type for parsing strand from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+' or '-'")
    }
}

impl std::error::Error for ParseStrandError {}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Positive),
            "-" => Ok(Strand::Negative),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a CUGO starts or ends where it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// The group continues past this side (interior member).
    None,
    /// First or last coding feature of its contig.
    SequenceEdge,
    /// Neighbour on this side lies on the opposite strand.
    StrandChange,
}

/// Error type for parsing a boundary kind from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBoundaryKindError;

impl fmt::Display for ParseBoundaryKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid boundary kind: expected 'NA', 'sequence_edge' or 'strand_change'"
        )
    }
}

impl std::error::Error for ParseBoundaryKindError {}

impl FromStr for BoundaryKind {
    type Err = ParseBoundaryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NA" | "none" => Ok(BoundaryKind::None),
            "sequence_edge" => Ok(BoundaryKind::SequenceEdge),
            "strand_change" => Ok(BoundaryKind::StrandChange),
            _ => Err(ParseBoundaryKindError),
        }
    }
}

impl BoundaryKind {
    /// Table representation; continuation is written as `NA`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryKind::None => "NA",
            BoundaryKind::SequenceEdge => "sequence_edge",
            BoundaryKind::StrandChange => "strand_change",
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A protein-coding feature parsed from one GFF line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    /// Contig / scaffold the feature lives on.
    pub parent: String,
    /// External identifier (first annotation entry).
    pub id: String,
    /// Secondary annotation tag, or the configured missing sentinel.
    pub tag: String,
    /// 1-based, inclusive.
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl FeatureRecord {
    /// Create a new feature record.
    pub fn new(
        parent: String,
        id: String,
        tag: String,
        start: u64,
        end: u64,
        strand: Strand,
    ) -> Self {
        FeatureRecord {
            parent,
            id,
            tag,
            start,
            end,
            strand,
        }
    }

    /// Nucleotide length (|end - start| + 1).
    pub fn nuc_length(&self) -> u64 {
        self.end.abs_diff(self.start) + 1
    }

    /// Amino-acid length (integer division of the nucleotide length).
    pub fn aa_length(&self) -> u64 {
        self.nuc_length() / 3
    }
}

/// One output row: a coding feature with its CUGO assignment.
///
/// `size` stays `None` until the group is closed and the row is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CugoRow {
    pub feature: FeatureRecord,
    pub cugo: u64,
    pub start_kind: BoundaryKind,
    pub end_kind: BoundaryKind,
    pub size: Option<usize>,
}
