//! Boundary classification for a single coding feature.
//!
//! This module implements the decision table that assigns a coding feature
//! its place inside a CUGO from its two neighbours, including the strand
//! mirroring of start/end boundaries for reverse-strand groups.

use crate::parser::gff::{Lookahead, Lookback, Neighbor};
use crate::types::{BoundaryKind, FeatureRecord, Strand};

/// How a coding feature relates to the retained record on one side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Same contig, same strand, coding: the group continues.
    Continues,
    /// Stream end, another contig, or a non-coding record.
    SequenceEdge,
    /// Coding neighbour on the same contig but the opposite strand.
    StrandChange,
}

impl Relation {
    /// Boundary reported on this side of the feature.
    pub fn boundary(self) -> BoundaryKind {
        match self {
            Relation::Continues => BoundaryKind::None,
            Relation::SequenceEdge => BoundaryKind::SequenceEdge,
            Relation::StrandChange => BoundaryKind::StrandChange,
        }
    }

    /// Relation to the previously retained record.
    pub fn from_prev(prev: &Lookback, current: &FeatureRecord) -> Self {
        match prev {
            Lookback::StartOfStream => Relation::SequenceEdge,
            Lookback::Record(neighbor) => Relation::from_neighbor(neighbor, current),
        }
    }

    /// Relation to the next retained record.
    ///
    /// The last record of the stream has no lookahead and always closes its
    /// group at a sequence edge.
    pub fn from_next(next: &Lookahead, current: &FeatureRecord) -> Self {
        match next {
            Lookahead::EndOfStream => Relation::SequenceEdge,
            Lookahead::Record(neighbor) => Relation::from_neighbor(neighbor, current),
        }
    }

    fn from_neighbor(neighbor: &Neighbor, current: &FeatureRecord) -> Self {
        match neighbor {
            Neighbor::NonCoding { .. } => Relation::SequenceEdge,
            Neighbor::Coding { parent, .. } if *parent != current.parent => {
                Relation::SequenceEdge
            }
            Neighbor::Coding { strand, .. } if *strand != current.strand => {
                Relation::StrandChange
            }
            Neighbor::Coding { .. } => Relation::Continues,
        }
    }
}

/// The mutually exclusive situations a coding feature can be in, in
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// Same contig and strand as both neighbours.
    Interior,
    /// First feature after a contig edge.
    ContigStart,
    /// Last feature before a contig edge.
    ContigEnd,
    /// First feature after a strand reversal.
    StrandStart,
    /// Last feature before a strand reversal.
    StrandEnd,
}

/// Outcome of classifying one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub case: Case,
    /// The feature cannot continue the previous group.
    pub opens: bool,
    /// The next feature cannot continue this group.
    pub closes: bool,
    /// Boundary at the CUGO's own (strand-relative) start.
    pub start: BoundaryKind,
    /// Boundary at the CUGO's own (strand-relative) end.
    pub end: BoundaryKind,
}

/// Classify a coding feature from its relations to both neighbours.
///
/// `left` is the genome-order predecessor side and `right` the successor side.
///
/// CRITICAL: reverse-strand CUGOs are read tail first, so for `-` features
/// the left (lower coordinate) side is the CUGO end and the right side is
/// the CUGO start.
///
/// ```text
///   contig  |====================================================|
///   + CUGO      [start ->  ->  ->  end]
///   - CUGO                              [end <-  <-  <-  start]
/// ```
pub fn classify(left: Relation, right: Relation, strand: Strand) -> Classification {
    let case = match (left, right) {
        (Relation::Continues, Relation::Continues) => Case::Interior,
        (Relation::SequenceEdge, _) => Case::ContigStart,
        (_, Relation::SequenceEdge) => Case::ContigEnd,
        (Relation::StrandChange, _) => Case::StrandStart,
        (_, Relation::StrandChange) => Case::StrandEnd,
    };

    let (start, end) = match strand {
        Strand::Positive => (left.boundary(), right.boundary()),
        Strand::Negative => (right.boundary(), left.boundary()),
    };

    Classification {
        case,
        opens: left != Relation::Continues,
        closes: right != Relation::Continues,
        start,
        end,
    }
}
