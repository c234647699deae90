//! Member counts per CUGO.

use ahash::AHashMap;

/// Accumulates group id -> member count as groups are built and closed.
///
/// Only one group is open at a time; its count is final once it is closed.
#[derive(Debug, Default, Clone)]
pub struct SizeAggregator {
    open: Option<(u64, usize)>,
    closed: AHashMap<u64, usize>,
}

impl SizeAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more member for group `id`, opening it if needed.
    pub fn add(&mut self, id: u64) {
        debug_assert!(
            !self.closed.contains_key(&id),
            "CUGO {id} received a member after closing"
        );
        if let Some((open_id, count)) = &mut self.open {
            if *open_id == id {
                *count += 1;
                return;
            }
        }
        debug_assert!(self.open.is_none(), "CUGO opened while another is open");
        self.open = Some((id, 1));
    }

    /// Finalize group `id` and return its size.
    ///
    /// Returns `None`, and records nothing, when `id` is not the open group.
    pub fn close(&mut self, id: u64) -> Option<usize> {
        match self.open {
            Some((open_id, count)) if open_id == id => {
                self.open = None;
                self.closed.insert(id, count);
                Some(count)
            }
            _ => {
                debug_assert!(false, "CUGO {id} closed while not open");
                None
            }
        }
    }

    /// Size of a closed group.
    pub fn size_of(&self, id: u64) -> Option<usize> {
        self.closed.get(&id).copied()
    }

    /// Id and running count of the group currently being built.
    pub fn open_group(&self) -> Option<(u64, usize)> {
        self.open
    }

    /// Number of closed groups.
    pub fn len(&self) -> usize {
        self.closed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closed.is_empty()
    }

    /// Sum of all closed group sizes.
    pub fn total_members(&self) -> usize {
        self.closed.values().sum()
    }
}
