//! The row collection (table model).
//!
//! [`RowCollection`] owns an ordered set of [`Row`]s and keeps them in
//! insertion order or sorted on one column. Every mutation fires exactly one
//! notification on [`ModelSignals`], after the mutation is complete.
//!
//! # Example
//!
//! ```ignore
//! use swarmdeck::model::{RowCollection, SortOrder};
//!
//! let downloads = RowCollection::<DownloadRow>::new();
//! downloads.add(downloader.clone());
//! downloads.set_sort(PRIORITY, SortOrder::Ascending);
//!
//! // Once per UI tick:
//! let any_inactive = downloads.refresh();
//! if downloads.needs_resort() {
//!     downloads.resort();
//! }
//! ```
//!
//! # Resorting
//!
//! `refresh()` never reorders rows. When a refresh changes the value of the
//! active sort column (only possible for dynamic columns) the collection just
//! raises [`RowCollection::needs_resort`]; the caller decides when to pay for
//! [`RowCollection::resort`], typically once per refresh tick.
//!
//! # Locking
//!
//! Methods take `&self` and lock internally. Guards returned by
//! [`RowCollection::row`] must be dropped before calling any mutating method.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use swarmdeck_core::invariant;
use swarmdeck_core::logging::{span_names, targets};

use super::cell::CellValue;
use super::column::ColumnSpec;
use super::row::Row;
use super::signals::ModelSignals;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// The active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub order: SortOrder,
}

struct Slot<R> {
    row: R,
    /// Insertion sequence number; breaks sort ties in insertion order.
    seq: u64,
}

struct Inner<R> {
    slots: Vec<Slot<R>>,
    sort: Option<SortState>,
    needs_resort: bool,
    next_seq: u64,
}

impl<R: Row> Inner<R> {
    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn compare(&self, sort: SortState, a: &Slot<R>, b: &Slot<R>) -> Ordering {
        let spec = &R::columns()[sort.column];
        let ordering = spec.compare(&a.row.value_at(sort.column), &b.row.value_at(sort.column));
        let ordering = match sort.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        ordering.then(a.seq.cmp(&b.seq))
    }

    /// Reorder all slots in one step. Returns the `perm[new] == old` mapping.
    fn reorder(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.slots.len()).collect();
        match self.sort {
            Some(sort) => {
                let spec = &R::columns()[sort.column];
                let keys: Vec<CellValue> =
                    self.slots.iter().map(|s| s.row.value_at(sort.column)).collect();
                order.sort_by(|&a, &b| {
                    let ordering = spec.compare(&keys[a], &keys[b]);
                    let ordering = match sort.order {
                        SortOrder::Ascending => ordering,
                        SortOrder::Descending => ordering.reverse(),
                    };
                    ordering.then(self.slots[a].seq.cmp(&self.slots[b].seq))
                });
            }
            None => order.sort_by_key(|&i| self.slots[i].seq),
        }

        let mut taken: Vec<Option<Slot<R>>> =
            std::mem::take(&mut self.slots).into_iter().map(Some).collect();
        self.slots = order.iter().filter_map(|&i| taken[i].take()).collect();
        self.needs_resort = false;
        order
    }

    fn position(&self, source: &R::Source) -> Option<usize> {
        self.slots.iter().position(|s| s.row.is_source(source))
    }

    fn sort_key(&self, index: usize) -> Option<(usize, CellValue)> {
        let sort = self.sort?;
        if !R::is_dynamic(sort.column) {
            return None;
        }
        self.slots
            .get(index)
            .map(|s| (sort.column, s.row.value_at(sort.column)))
    }
}

/// An ordered, sortable, incrementally updated collection of rows.
pub struct RowCollection<R: Row> {
    inner: RwLock<Inner<R>>,
    signals: ModelSignals,
}

impl<R: Row> Default for RowCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Row> RowCollection<R> {
    /// Creates an empty collection in insertion order.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                slots: Vec::new(),
                sort: None,
                needs_resort: false,
                next_seq: 0,
            }),
            signals: ModelSignals::new(),
        }
    }

    /// Creates an empty collection wrapped in an `Arc`, ready to be shared
    /// with a view and read-only observers.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Change notifications.
    pub fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    /// The static column declarations of the row type.
    pub fn columns(&self) -> &'static [ColumnSpec] {
        R::columns()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        R::columns().len()
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Appends a row for `source`. Returns its index.
    pub fn add(&self, source: R::Source) -> usize {
        let row = R::create(source);
        let index = {
            let mut inner = self.inner.write();
            let seq = inner.next_seq();
            inner.slots.push(Slot { row, seq });
            inner.slots.len() - 1
        };
        tracing::debug!(target: targets::MODEL, index, "row added");
        self.signals.rows_inserted.emit(index..index + 1);
        index
    }

    /// Inserts a row for `source` at the position dictated by the active sort.
    ///
    /// Ties go after existing equal rows, so equal rows stay in insertion
    /// order. Without an active sort this is [`add`](Self::add).
    pub fn add_sorted(&self, source: R::Source) -> usize {
        let row = R::create(source);
        let index = {
            let mut inner = self.inner.write();
            let seq = inner.next_seq();
            let slot = Slot { row, seq };
            let index = match inner.sort {
                Some(sort) => inner
                    .slots
                    .partition_point(|existing| inner.compare(sort, existing, &slot) == Ordering::Less),
                None => inner.slots.len(),
            };
            inner.slots.insert(index, slot);
            index
        };
        tracing::debug!(target: targets::MODEL, index, "row added in sort position");
        self.signals.rows_inserted.emit(index..index + 1);
        index
    }

    /// Inserts a row for `source` at `index` (clamped to the row count).
    ///
    /// An explicit position may break the active sort order; the collection
    /// is flagged for a resort.
    pub fn insert(&self, index: usize, source: R::Source) -> usize {
        let row = R::create(source);
        let index = {
            let mut inner = self.inner.write();
            let seq = inner.next_seq();
            let index = index.min(inner.slots.len());
            inner.slots.insert(index, Slot { row, seq });
            if inner.sort.is_some() {
                inner.needs_resort = true;
            }
            index
        };
        tracing::debug!(target: targets::MODEL, index, "row inserted");
        self.signals.rows_inserted.emit(index..index + 1);
        index
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// The active sort, or `None` for insertion order.
    pub fn sort_state(&self) -> Option<SortState> {
        self.inner.read().sort
    }

    /// Toggle sorting on `column`.
    ///
    /// If `column` is already the sort column its direction flips; otherwise
    /// it becomes the sort column, ascending. Reorders the collection once and
    /// fires one `rows_reordered` notification.
    pub fn sort(&self, column: usize) {
        let order = match self.sort_state() {
            Some(state) if state.column == column => state.order.reversed(),
            _ => SortOrder::Ascending,
        };
        self.set_sort(column, order);
    }

    /// Sort on `column` in the given direction.
    ///
    /// Out-of-range columns are ignored.
    pub fn set_sort(&self, column: usize, order: SortOrder) {
        if column >= R::columns().len() {
            tracing::warn!(target: targets::MODEL, column, "ignoring sort on unknown column");
            return;
        }
        let _span = tracing::debug_span!(target: targets::MODEL, span_names::SORT, column).entered();
        let perm = {
            let mut inner = self.inner.write();
            inner.sort = Some(SortState { column, order });
            inner.reorder()
        };
        tracing::debug!(target: targets::MODEL, column, ?order, "collection sorted");
        self.signals.rows_reordered.emit(perm.into());
    }

    /// Return to insertion order.
    pub fn clear_sort(&self) {
        let perm = {
            let mut inner = self.inner.write();
            if inner.sort.is_none() {
                return;
            }
            inner.sort = None;
            inner.reorder()
        };
        self.signals.rows_reordered.emit(perm.into());
    }

    /// Whether a refresh changed sort-column values since the last sort.
    pub fn needs_resort(&self) -> bool {
        self.inner.read().needs_resort
    }

    /// Re-apply the active sort if a refresh may have violated it.
    ///
    /// Returns `true` if rows actually moved. Fires one `rows_reordered`
    /// notification only in that case.
    pub fn resort(&self) -> bool {
        let perm = {
            let mut inner = self.inner.write();
            if !inner.needs_resort || inner.sort.is_none() {
                inner.needs_resort = false;
                return false;
            }
            inner.reorder()
        };
        if perm.iter().enumerate().all(|(new, &old)| new == old) {
            return false;
        }
        tracing::trace!(target: targets::MODEL, rows = perm.len(), "collection resorted");
        self.signals.rows_reordered.emit(perm.into());
        true
    }

    // =========================================================================
    // Updating
    // =========================================================================

    /// Update every row from its domain object.
    ///
    /// All rows are updated before the single `rows_updated` notification for
    /// the whole range fires. Returns whether at least one row is now
    /// inactive.
    pub fn refresh(&self) -> bool {
        let _span = tracing::trace_span!(target: targets::MODEL, span_names::REFRESH).entered();
        let (len, any_inactive) = {
            let mut inner = self.inner.write();
            let sort_column = inner
                .sort
                .map(|s| s.column)
                .filter(|&column| R::is_dynamic(column));
            let mut sort_values_changed = false;
            let mut any_inactive = false;

            for slot in inner.slots.iter_mut() {
                let before = sort_column.map(|column| slot.row.value_at(column));
                slot.row.update();
                if let (Some(column), Some(before)) = (sort_column, before)
                    && slot.row.value_at(column) != before
                {
                    sort_values_changed = true;
                }
                any_inactive |= slot.row.is_inactive();
            }

            if sort_values_changed {
                inner.needs_resort = true;
            }
            (inner.slots.len(), any_inactive)
        };
        self.signals.rows_updated.emit(0..len);
        any_inactive
    }

    /// Recycle a row for `source` using [`Row::can_recycle`].
    ///
    /// See [`update_with`](Self::update_with).
    pub fn update(&self, source: R::Source) -> Option<usize> {
        self.update_with(source.clone(), |row| row.can_recycle(&source))
    }

    /// Re-bind the first row matching `equivalent` to `source`.
    ///
    /// The row keeps its index; no insert or remove notification fires, only
    /// one `rows_updated` for that row. Returns `None` if no row matches.
    pub fn update_with<F>(&self, source: R::Source, equivalent: F) -> Option<usize>
    where
        F: Fn(&R) -> bool,
    {
        let index = {
            let mut inner = self.inner.write();
            let index = inner.slots.iter().position(|s| equivalent(&s.row))?;
            let before = inner.sort_key(index);
            inner.slots[index].row.initialize(source.clone());
            invariant::check(
                inner.slots[index].row.is_source(&source),
                "RowCollection::update_with",
                || format!("row {index} does not report the source it was re-bound to"),
            );
            if let Some((column, before)) = before
                && inner.slots[index].row.value_at(column) != before
            {
                inner.needs_resort = true;
            }
            index
        };
        tracing::debug!(target: targets::MODEL, index, "row recycled");
        self.signals.rows_updated.emit(index..index + 1);
        Some(index)
    }

    /// Mutate the first row matching `matches` in place.
    ///
    /// Used to write values computed off the UI thread back into a row. Fires
    /// one `rows_updated` for that row. Returns `None` if no row matches.
    pub fn modify<P, F>(&self, matches: P, f: F) -> Option<usize>
    where
        P: Fn(&R) -> bool,
        F: FnOnce(&mut R),
    {
        let index = {
            let mut inner = self.inner.write();
            let index = inner.slots.iter().position(|s| matches(&s.row))?;
            let before = inner.sort_key(index);
            f(&mut inner.slots[index].row);
            if let Some((column, before)) = before
                && inner.slots[index].row.value_at(column) != before
            {
                inner.needs_resort = true;
            }
            index
        };
        self.signals.rows_updated.emit(index..index + 1);
        Some(index)
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes the row at `index`, returning its domain object.
    ///
    /// The row's `cleanup()` runs before the notification; a cleanup failure
    /// is logged and the row is removed regardless.
    pub fn remove(&self, index: usize) -> Option<R::Source> {
        let mut slot = {
            let mut inner = self.inner.write();
            if index >= inner.slots.len() {
                return None;
            }
            inner.slots.remove(index)
        };
        Self::cleanup_row(&mut slot.row);
        tracing::debug!(target: targets::MODEL, index, "row removed");
        self.signals.rows_removed.emit(index..index + 1);
        Some(slot.row.source().clone())
    }

    /// Removes the row projecting `source`. Returns whether one was found.
    pub fn remove_source(&self, source: &R::Source) -> bool {
        let index = self.get_row(source);
        index.and_then(|i| self.remove(i)).is_some()
    }

    /// Removes every inactive row, highest index first, one notification per
    /// row. Returns the number removed.
    pub fn remove_inactive(&self) -> usize {
        let indices: Vec<usize> = {
            let inner = self.inner.read();
            inner
                .slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.row.is_inactive())
                .map(|(i, _)| i)
                .collect()
        };
        indices
            .into_iter()
            .rev()
            .filter_map(|i| self.remove(i))
            .count()
    }

    /// Removes all rows and fires `model_reset`.
    pub fn clear(&self) {
        let slots = std::mem::take(&mut self.inner.write().slots);
        for mut slot in slots {
            Self::cleanup_row(&mut slot.row);
        }
        self.inner.write().needs_resort = false;
        self.signals.model_reset.emit(());
    }

    fn cleanup_row(row: &mut R) {
        if let Err(err) = row.cleanup() {
            tracing::warn!(target: targets::MODEL, error = %err, "row cleanup failed; removing anyway");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.inner.read().slots.len()
    }

    /// Returns `true` if the collection has no rows.
    pub fn is_empty(&self) -> bool {
        self.inner.read().slots.is_empty()
    }

    /// Index of the row projecting `source`, if any.
    pub fn get_row(&self, source: &R::Source) -> Option<usize> {
        self.inner.read().position(source)
    }

    /// Whether a row projects `source`.
    pub fn contains(&self, source: &R::Source) -> bool {
        self.get_row(source).is_some()
    }

    /// Index of the first row matching `predicate`.
    pub fn find<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&R) -> bool,
    {
        self.inner.read().slots.iter().position(|s| predicate(&s.row))
    }

    /// Read access to the row at `index`.
    ///
    /// The guard holds the collection's read lock; drop it before mutating.
    pub fn row(&self, index: usize) -> Option<MappedRwLockReadGuard<'_, R>> {
        RwLockReadGuard::try_map(self.inner.read(), |inner| {
            inner.slots.get(index).map(|s| &s.row)
        })
        .ok()
    }

    /// Runs `f` with the row at `index`.
    pub fn with_row<F, T>(&self, index: usize, f: F) -> Option<T>
    where
        F: FnOnce(&R) -> T,
    {
        self.inner.read().slots.get(index).map(|s| f(&s.row))
    }

    /// The value at (`row`, `column`), or `Empty` when out of range.
    pub fn value_at(&self, row: usize, column: usize) -> CellValue {
        self.with_row(row, |r| r.value_at(column)).unwrap_or_default()
    }

    /// The domain object of the row at `index`.
    pub fn source_at(&self, index: usize) -> Option<R::Source> {
        self.with_row(index, |r| r.source().clone())
    }

    /// Domain objects of all rows, in row order.
    pub fn sources(&self) -> Vec<R::Source> {
        self.inner.read().slots.iter().map(|s| s.row.source().clone()).collect()
    }

    /// Number of inactive rows.
    pub fn inactive_count(&self) -> usize {
        self.inner.read().slots.iter().filter(|s| s.row.is_inactive()).count()
    }
}

impl<R: Row> fmt::Debug for RowCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("RowCollection")
            .field("rows", &inner.slots.len())
            .field("sort", &inner.sort)
            .field("needs_resort", &inner.needs_resort)
            .finish()
    }
}
