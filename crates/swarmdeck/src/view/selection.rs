//! Row selection for table and tree views.
//!
//! [`SelectionModel`] stores selection as model row indices and follows the
//! model's structural changes (`rows_inserted`, `rows_removed`,
//! `rows_reordered`, `model_reset`) so selected rows stay attached to the
//! same logical rows.
//!
//! Queries take the live row count and clamp against it. Even if the model
//! shrank between the last selection event and the query, no returned index
//! is ever past the end of the model.
//!
//! # Example
//!
//! ```ignore
//! use swarmdeck::view::{SelectionFlags, SelectionMode, SelectionModel};
//!
//! let mut selection = SelectionModel::new();
//! selection.set_selection_mode(SelectionMode::Extended);
//! selection.select(2, SelectionFlags::CLEAR_SELECT_CURRENT);
//!
//! assert_eq!(selection.selected_indices(model.row_count()), vec![2]);
//! ```

use std::collections::BTreeSet;
use std::ops::Range;

/// How many rows may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No rows can be selected.
    None,
    /// At most one row (default).
    #[default]
    Single,
    /// Every click toggles a row.
    Multi,
    /// Click selects one row, Ctrl+click toggles, Shift+click extends.
    Extended,
}

/// Flags controlling a selection operation.
///
/// Combine the constants or use the `with_*` builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionFlags {
    /// Deselect everything first.
    pub clear: bool,
    /// Add the row.
    pub select: bool,
    /// Remove the row.
    pub deselect: bool,
    /// Flip the row.
    pub toggle: bool,
    /// Make the row the current (lead) row.
    pub current: bool,
    /// Make the row the anchor for range selection.
    pub anchor: bool,
}

impl SelectionFlags {
    pub const NONE: Self = Self::empty();

    pub const CLEAR: Self = Self {
        clear: true,
        ..Self::empty()
    };

    pub const SELECT: Self = Self {
        select: true,
        ..Self::empty()
    };

    pub const DESELECT: Self = Self {
        deselect: true,
        ..Self::empty()
    };

    pub const TOGGLE: Self = Self {
        toggle: true,
        ..Self::empty()
    };

    pub const CLEAR_AND_SELECT: Self = Self {
        clear: true,
        select: true,
        ..Self::empty()
    };

    /// What a plain click does.
    pub const CLEAR_SELECT_CURRENT: Self = Self {
        clear: true,
        select: true,
        current: true,
        anchor: true,
        ..Self::empty()
    };

    const fn empty() -> Self {
        Self {
            clear: false,
            select: false,
            deselect: false,
            toggle: false,
            current: false,
            anchor: false,
        }
    }

    pub fn with_clear(mut self) -> Self {
        self.clear = true;
        self
    }

    pub fn with_current(mut self) -> Self {
        self.current = true;
        self
    }

    pub fn with_anchor(mut self) -> Self {
        self.anchor = true;
        self
    }
}

/// Rows that entered and left the selection in one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub selected: Vec<usize>,
    pub deselected: Vec<usize>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

/// Selection state over model row indices.
///
/// Mutating operations return a [`SelectionChange`] instead of emitting, so
/// the owner can notify after releasing whatever lock guards the model.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    mode: SelectionMode,
    rows: BTreeSet<usize>,
    anchor: Option<usize>,
    lead: Option<usize>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selection model in the given mode.
    pub fn with_mode(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changes the selection mode, trimming the selection to fit it.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) -> SelectionChange {
        self.mode = mode;
        match mode {
            SelectionMode::None => self.clear(),
            SelectionMode::Single if self.rows.len() > 1 => {
                let keep = self.lead.filter(|r| self.rows.contains(r));
                let keep = keep.or_else(|| self.rows.last().copied());
                let deselected = self.rows.iter().copied().filter(|&r| Some(r) != keep).collect();
                self.rows = keep.into_iter().collect();
                SelectionChange {
                    selected: Vec::new(),
                    deselected,
                }
            }
            _ => SelectionChange::default(),
        }
    }

    // =========================================================================
    // Raw state
    // =========================================================================

    /// Whether `row` is selected.
    pub fn is_selected(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    pub fn has_selection(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Number of selected rows, without clamping.
    pub fn selected_count(&self) -> usize {
        self.rows.len()
    }

    /// The range anchor, if any.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn set_anchor(&mut self, row: Option<usize>) {
        self.anchor = row;
    }

    /// The current (lead) row, if any.
    pub fn lead(&self) -> Option<usize> {
        self.lead
    }

    // =========================================================================
    // Clamped queries
    // =========================================================================

    /// The lowest selected row, or `None` if nothing is selected or the lowest
    /// selected row no longer exists.
    pub fn selected_index(&self, row_count: usize) -> Option<usize> {
        self.rows.first().copied().filter(|&row| row < row_count)
    }

    /// All selected rows that exist, ascending.
    ///
    /// Rows at or past `row_count` form a suffix of the sorted selection and
    /// are dropped.
    pub fn selected_indices(&self, row_count: usize) -> Vec<usize> {
        self.rows.range(..row_count).copied().collect()
    }

    /// The current row if it still exists.
    pub fn current_row(&self, row_count: usize) -> Option<usize> {
        self.lead.filter(|&row| row < row_count)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Applies `flags` to `row`.
    pub fn select(&mut self, row: usize, flags: SelectionFlags) -> SelectionChange {
        if self.mode == SelectionMode::None {
            return SelectionChange::default();
        }
        let before = self.rows.clone();

        if flags.clear {
            self.rows.clear();
        }
        if flags.toggle {
            if !self.rows.remove(&row) {
                self.rows.insert(row);
            }
        } else if flags.select {
            self.rows.insert(row);
        } else if flags.deselect {
            self.rows.remove(&row);
        }

        if self.mode == SelectionMode::Single && self.rows.len() > 1 {
            self.rows.retain(|&r| r == row);
        }
        if flags.current {
            self.lead = Some(row);
        }
        if flags.anchor {
            self.anchor = Some(row);
        }
        self.diff(&before)
    }

    /// Selects `start..=end` (either order).
    ///
    /// In single mode only `end` is selected.
    pub fn select_range(&mut self, start: usize, end: usize, flags: SelectionFlags) -> SelectionChange {
        match self.mode {
            SelectionMode::None => return SelectionChange::default(),
            SelectionMode::Single => {
                return self.select(end, flags.with_clear());
            }
            SelectionMode::Multi | SelectionMode::Extended => {}
        }
        let before = self.rows.clone();
        if flags.clear {
            self.rows.clear();
        }
        let (first, last) = if start <= end { (start, end) } else { (end, start) };
        if flags.deselect {
            self.rows.retain(|r| !(first..=last).contains(r));
        } else {
            self.rows.extend(first..=last);
        }
        if flags.current {
            self.lead = Some(end);
        }
        if flags.anchor {
            self.anchor = Some(start);
        }
        self.diff(&before)
    }

    /// Flips `row` and makes it current.
    pub fn toggle(&mut self, row: usize) -> SelectionChange {
        self.select(row, SelectionFlags::TOGGLE.with_current().with_anchor())
    }

    /// Selects every row in `0..row_count`. No-op outside multi modes.
    pub fn select_all(&mut self, row_count: usize) -> SelectionChange {
        if !matches!(self.mode, SelectionMode::Multi | SelectionMode::Extended) || row_count == 0 {
            return SelectionChange::default();
        }
        let before = self.rows.clone();
        self.rows = (0..row_count).collect();
        self.diff(&before)
    }

    /// Deselects everything and forgets anchor and lead.
    pub fn clear(&mut self) -> SelectionChange {
        let deselected: Vec<usize> = std::mem::take(&mut self.rows).into_iter().collect();
        self.anchor = None;
        self.lead = None;
        SelectionChange {
            selected: Vec::new(),
            deselected,
        }
    }

    fn diff(&self, before: &BTreeSet<usize>) -> SelectionChange {
        SelectionChange {
            selected: self.rows.difference(before).copied().collect(),
            deselected: before.difference(&self.rows).copied().collect(),
        }
    }

    // =========================================================================
    // Model tracking
    // =========================================================================

    /// Rows were inserted at `range` (post-insert indices).
    pub fn rows_inserted(&mut self, range: Range<usize>) {
        let shift = range.len();
        if shift == 0 {
            return;
        }
        let at = range.start;
        let moved = |row: usize| if row >= at { row + shift } else { row };
        self.rows = self.rows.iter().map(|&r| moved(r)).collect();
        self.anchor = self.anchor.map(moved);
        self.lead = self.lead.map(moved);
    }

    /// Rows in `range` (pre-remove indices) were removed.
    ///
    /// Selected rows inside the range are dropped; later rows shift down.
    /// Returns the rows that left the selection.
    pub fn rows_removed(&mut self, range: Range<usize>) -> SelectionChange {
        let shift = range.len();
        if shift == 0 {
            return SelectionChange::default();
        }
        let moved = |row: usize| -> Option<usize> {
            if range.contains(&row) {
                None
            } else if row >= range.end {
                Some(row - shift)
            } else {
                Some(row)
            }
        };
        let deselected = self.rows.iter().copied().filter(|r| range.contains(r)).collect();
        self.rows = self.rows.iter().filter_map(|&r| moved(r)).collect();
        self.anchor = self.anchor.and_then(moved);
        self.lead = self.lead.and_then(moved);
        SelectionChange {
            selected: Vec::new(),
            deselected,
        }
    }

    /// The model reordered itself with `perm[new] == old`.
    ///
    /// Rows the permutation does not cover are stale and dropped.
    pub fn rows_reordered(&mut self, perm: &[usize]) {
        let mut new_of_old = vec![usize::MAX; perm.len()];
        for (new, &old) in perm.iter().enumerate() {
            if let Some(slot) = new_of_old.get_mut(old) {
                *slot = new;
            }
        }
        let moved = |row: usize| new_of_old.get(row).copied().filter(|&n| n != usize::MAX);
        self.rows = self.rows.iter().filter_map(|&r| moved(r)).collect();
        self.anchor = self.anchor.and_then(moved);
        self.lead = self.lead.and_then(moved);
    }

    /// The model discarded all rows.
    pub fn model_reset(&mut self) -> SelectionChange {
        self.clear()
    }
}
