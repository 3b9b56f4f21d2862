//! View-to-model column mapping.
//!
//! A [`ColumnMap`] decides which model columns a view shows, in which order
//! and how wide. Hiding or moving a column never changes the model's column
//! indices; rows keep projecting the same values into the same model columns.

use crate::model::ColumnSpec;

/// Smallest width a column can be resized to.
pub const MINIMUM_COLUMN_WIDTH: f32 = 20.0;

/// Visual order, visibility and width of a view's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    /// Model columns in visual order, hidden ones included.
    order: Vec<usize>,
    /// Indexed by model column.
    hidden: Vec<bool>,
    /// Indexed by model column.
    widths: Vec<f32>,
}

impl ColumnMap {
    /// Identity mapping over `count` visible columns of default width.
    pub fn new(count: usize) -> Self {
        Self {
            order: (0..count).collect(),
            hidden: vec![false; count],
            widths: vec![100.0; count],
        }
    }

    /// Mapping initialized from static column declarations.
    pub fn from_specs(specs: &[ColumnSpec]) -> Self {
        Self {
            order: (0..specs.len()).collect(),
            hidden: specs.iter().map(|c| !c.visible_by_default).collect(),
            widths: specs.iter().map(|c| c.default_width.max(MINIMUM_COLUMN_WIDTH)).collect(),
        }
    }

    /// Number of model columns, hidden ones included.
    pub fn model_column_count(&self) -> usize {
        self.hidden.len()
    }

    /// Number of visible columns.
    pub fn view_column_count(&self) -> usize {
        self.hidden.iter().filter(|hidden| !**hidden).count()
    }

    /// Visible model columns in visual order.
    pub fn visible_columns(&self) -> Vec<usize> {
        self.order.iter().copied().filter(|&c| !self.hidden[c]).collect()
    }

    /// The model column shown at view position `view`.
    pub fn view_to_model(&self, view: usize) -> Option<usize> {
        self.order.iter().copied().filter(|&c| !self.hidden[c]).nth(view)
    }

    /// The view position of `model`, or `None` when hidden or unknown.
    pub fn model_to_view(&self, model: usize) -> Option<usize> {
        if *self.hidden.get(model)? {
            return None;
        }
        self.order
            .iter()
            .copied()
            .filter(|&c| !self.hidden[c])
            .position(|c| c == model)
    }

    pub fn is_hidden(&self, model: usize) -> bool {
        self.hidden.get(model).copied().unwrap_or(true)
    }

    /// Sets the visibility of a model column. Returns whether it changed.
    pub fn set_hidden(&mut self, model: usize, hidden: bool) -> bool {
        match self.hidden.get_mut(model) {
            Some(current) if *current != hidden => {
                *current = hidden;
                true
            }
            _ => false,
        }
    }

    pub fn hide(&mut self, model: usize) -> bool {
        self.set_hidden(model, true)
    }

    pub fn show(&mut self, model: usize) -> bool {
        self.set_hidden(model, false)
    }

    /// Moves the column at view position `from` to view position `to`.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        let count = self.view_column_count();
        if from >= count || to >= count || from == to {
            return false;
        }
        let (Some(moving), Some(target)) = (self.view_to_model(from), self.view_to_model(to)) else {
            return false;
        };
        let Some(old) = self.order.iter().position(|&c| c == moving) else {
            return false;
        };
        self.order.remove(old);
        let Some(at) = self.order.iter().position(|&c| c == target) else {
            return false;
        };
        let at = if to > from { at + 1 } else { at };
        self.order.insert(at, moving);
        true
    }

    pub fn width(&self, model: usize) -> f32 {
        self.widths.get(model).copied().unwrap_or(0.0)
    }

    /// Resizes a model column, clamped to [`MINIMUM_COLUMN_WIDTH`].
    pub fn set_width(&mut self, model: usize, width: f32) {
        if let Some(w) = self.widths.get_mut(model) {
            *w = width.max(MINIMUM_COLUMN_WIDTH);
        }
    }

    /// Left edge of a visible model column.
    pub fn column_x(&self, model: usize) -> Option<f32> {
        let mut x = 0.0;
        for column in self.visible_columns() {
            if column == model {
                return Some(x);
            }
            x += self.widths[column];
        }
        None
    }

    /// The visible model column spanning horizontal position `x`.
    pub fn column_at_x(&self, x: f32) -> Option<usize> {
        if x < 0.0 {
            return None;
        }
        let mut left = 0.0;
        for column in self.visible_columns() {
            let right = left + self.widths[column];
            if x < right {
                return Some(column);
            }
            left = right;
        }
        None
    }

    /// Combined width of the visible columns.
    pub fn total_width(&self) -> f32 {
        self.visible_columns().iter().map(|&c| self.widths[c]).sum()
    }
}
