//! Change notifications emitted by row collections.

use std::ops::Range;
use std::sync::Arc;

use swarmdeck_core::Signal;

/// Signals emitted by a [`RowCollection`](super::RowCollection).
///
/// Every mutating operation emits exactly one of these after the mutation is
/// complete and the collection's lock has been released, so slots may query
/// the collection freely. Slots must not mutate it.
pub struct ModelSignals {
    /// Rows were inserted. The range is in post-insert indices.
    pub rows_inserted: Signal<Range<usize>>,

    /// Rows were removed. The range is in pre-remove indices.
    pub rows_removed: Signal<Range<usize>>,

    /// Row values changed in place. Emitted once per `refresh()` for the
    /// whole table, and once per recycled row.
    pub rows_updated: Signal<Range<usize>>,

    /// The whole collection was reordered in one step.
    ///
    /// The permutation maps new positions to old ones: `perm[new] == old`.
    pub rows_reordered: Signal<Arc<[usize]>>,

    /// All rows were discarded.
    pub model_reset: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            rows_updated: Signal::new(),
            rows_reordered: Signal::new(),
            model_reset: Signal::new(),
        }
    }

    /// Total number of connected slots across all signals.
    pub fn connection_count(&self) -> usize {
        self.rows_inserted.connection_count()
            + self.rows_removed.connection_count()
            + self.rows_updated.connection_count()
            + self.rows_reordered.connection_count()
            + self.model_reset.connection_count()
    }
}
