//! The row contract.
//!
//! A [`Row`] is a stable, mutable projection of one external domain object
//! (a download, an upload, a shared file) into typed cell values. The row
//! collection owns rows; rows only reference their domain object.
//!
//! # Lifecycle
//!
//! 1. [`Row::create`] when a domain object is added to a collection.
//! 2. [`Row::update`] on every refresh tick, re-deriving cells from the
//!    (possibly mutated) domain object.
//! 3. Optionally [`Row::initialize`] again with a *different* domain object of
//!    the same kind, to recycle the row in place without a remove/insert pair.
//! 4. [`Row::cleanup`] once, when the row is permanently removed.

use crate::error::Result;

use super::cell::CellValue;
use super::column::ColumnSpec;

/// A table-model projection of one external domain object.
///
/// The column set is a static property of the implementing type: a row's
/// column count and column definitions never change during its lifetime,
/// only cell values do.
pub trait Row: Send + Sync + 'static {
    /// Handle to the domain object this row projects, typically an
    /// `Arc<dyn Downloader>`.
    type Source: Clone + Send + Sync + 'static;

    /// Create and initialize a row for `source`.
    fn create(source: Self::Source) -> Self
    where
        Self: Sized;

    /// Bind (or re-bind) the row to `source` and derive its cell values.
    ///
    /// Re-binding to another domain object of the same kind must leave the
    /// row in the same state as a freshly created row for that object.
    fn initialize(&mut self, source: Self::Source);

    /// The domain object this row currently projects.
    fn source(&self) -> &Self::Source;

    /// Identity check against a domain object.
    fn is_source(&self, source: &Self::Source) -> bool;

    /// The static column declarations of this row type.
    fn columns() -> &'static [ColumnSpec]
    where
        Self: Sized;

    /// Number of columns. Always `columns().len()`.
    fn column_count(&self) -> usize
    where
        Self: Sized,
    {
        Self::columns().len()
    }

    /// Whether a column's value may change between refreshes.
    fn is_dynamic(column: usize) -> bool
    where
        Self: Sized,
    {
        Self::columns().get(column).is_some_and(|c| c.dynamic)
    }

    /// The current value of a column. Pure; never mutates the row.
    ///
    /// Out-of-range columns yield `CellValue::Empty`.
    fn value_at(&self, column: usize) -> CellValue;

    /// Re-derive cell values from the domain object.
    ///
    /// Side-effect only. Never adds or removes rows; that is the collection's
    /// job.
    fn update(&mut self);

    /// Whether the row is in a terminal/inactive state (completed, aborted,
    /// failed). Drives "clear completed" style actions.
    fn is_inactive(&self) -> bool {
        false
    }

    /// Whether this row may be re-bound to `source` in place.
    ///
    /// The default never recycles. Transfer rows override this with their
    /// "same target and currently inactive" equivalence.
    fn can_recycle(&self, _source: &Self::Source) -> bool {
        false
    }

    /// Release resources the row opened independently of its domain object.
    ///
    /// Must be safe to call more than once. A failure is logged by the
    /// collection and does not keep the row in the collection.
    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}
