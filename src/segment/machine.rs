//! The CUGO segmentation state machine.
//!
//! Consumes [`Window`]s in genome order and assigns every coding feature a
//! CUGO number and boundary kinds. Group numbers advance only when a group
//! closes, so the open group's number is shared by all of its members.

use log::debug;
use std::io::BufRead;

use crate::parser::gff::{GffError, Window, Windows};
use crate::segment::classify::{classify, Relation};
use crate::segment::sizes::SizeAggregator;
use crate::types::CugoRow;

/// Persistent state carried from one coding feature to the next.
#[derive(Debug, Default)]
pub struct SegmentationState {
    /// Number of the open group, or of the next group to open.
    next_id: u64,
    sizes: SizeAggregator,
}

impl SegmentationState {
    /// Fresh state; group numbering starts at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one window and advance the state.
    ///
    /// The returned row has no size yet; sizes are attached once the whole
    /// stream has been consumed.
    pub fn step(&mut self, window: Window) -> CugoRow {
        let Window {
            prev,
            current,
            next,
        } = window;

        let left = Relation::from_prev(&prev, &current);
        let right = Relation::from_next(&next, &current);
        let class = classify(left, right, current.strand);

        let id = self.next_id;
        self.sizes.add(id);

        if class.closes {
            let size = self.sizes.close(id).unwrap_or_default();
            debug!(
                "Closed CUGO {} on {} ({} members, {:?})",
                id, current.parent, size, class.case
            );
            self.next_id += 1;
        }

        CugoRow {
            feature: current,
            cugo: id,
            start_kind: class.start,
            end_kind: class.end,
            size: None,
        }
    }

    /// Number of groups closed so far.
    pub fn groups_closed(&self) -> u64 {
        self.next_id
    }

    /// Sizes of the groups closed so far.
    pub fn sizes(&self) -> &SizeAggregator {
        &self.sizes
    }

    /// Consume the state, returning the finalized sizes.
    pub fn into_sizes(self) -> SizeAggregator {
        self.sizes
    }
}

/// Rows and group sizes produced by one pass over a GFF stream.
#[derive(Debug)]
pub struct Segmentation {
    /// One row per coding feature, in input order, sizes not yet attached.
    pub rows: Vec<CugoRow>,
    pub sizes: SizeAggregator,
    /// Lines dropped for not having nine fields.
    pub skipped_lines: usize,
}

/// Run the state machine over every window of a GFF stream.
///
/// The first error aborts the pass.
pub fn segment<R: BufRead>(mut windows: Windows<R>) -> Result<Segmentation, GffError> {
    let mut state = SegmentationState::new();
    let mut rows = Vec::new();

    for window in windows.by_ref() {
        rows.push(state.step(window?));
    }

    Ok(Segmentation {
        rows,
        sizes: state.into_sizes(),
        skipped_lines: windows.reader().skipped_lines(),
    })
}
