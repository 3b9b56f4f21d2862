//! The table view bound to one row collection.
//!
//! [`TableView`] owns everything view-side about a table: the selection, the
//! column layout, scroll geometry and hover state. It never caches rows. Each
//! query goes back to the collection, and the selection follows the
//! collection's structural signals.
//!
//! # Example
//!
//! ```ignore
//! use swarmdeck::input::{DragArbiter, InputPipeline, RecordingRecognizer};
//! use swarmdeck::view::TableView;
//!
//! let mut view = TableView::new(downloads.clone());
//! view.set_exporter(|row: &DownloadRow| row.export_entry());
//!
//! let mut pipeline = InputPipeline::new(DragArbiter::new(recognizer));
//! TableView::install_listeners(&mut pipeline);
//! pipeline.dispatch(&mut view, event);
//! ```

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use parking_lot::RwLock;
use swarmdeck_core::logging::targets;
use swarmdeck_core::{ConnectionGuard, Point, Signal, Size};

use super::columns::ColumnMap;
use super::render::{
    CellDescription, CellState, GraphemeMetrics, TextMeasure, clipped_tooltip, describe_cell,
};
use super::selection::{SelectionChange, SelectionFlags, SelectionMode, SelectionModel};
use crate::input::{
    DragPayload, DragSurface, ExportEntry, InputPipeline, MouseButton, PointerEvent, PointerKind,
};
use crate::model::{Row, RowCollection, SortOrder, column_index};
use crate::settings::TableSettings;

/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: f32 = 20.0;
/// Default header height in pixels.
pub const DEFAULT_HEADER_HEIGHT: f32 = 24.0;

type RowExporter<R> = Box<dyn Fn(&R) -> Option<ExportEntry> + Send + Sync>;

/// A table bound to a [`RowCollection`].
pub struct TableView<R: Row> {
    model: Arc<RowCollection<R>>,
    selection: Arc<RwLock<SelectionModel>>,
    selection_changed: Arc<Signal<SelectionChange>>,
    columns: ColumnMap,
    row_height: f32,
    header_height: f32,
    viewport: Size,
    scroll_y: f32,
    hovered: Option<(usize, usize)>,
    tooltip: Option<String>,
    measure: Box<dyn TextMeasure + Send + Sync>,
    exporter: Option<RowExporter<R>>,
    _subscriptions: Vec<ConnectionGuard>,
}

impl<R: Row> TableView<R> {
    /// Binds a new view to `model` in extended selection mode.
    pub fn new(model: Arc<RowCollection<R>>) -> Self {
        let selection = Arc::new(RwLock::new(SelectionModel::with_mode(SelectionMode::Extended)));
        let selection_changed = Arc::new(Signal::new());
        let subscriptions = Self::track_model(&model, &selection, &selection_changed);

        Self {
            columns: ColumnMap::from_specs(R::columns()),
            model,
            selection,
            selection_changed,
            row_height: DEFAULT_ROW_HEIGHT,
            header_height: DEFAULT_HEADER_HEIGHT,
            viewport: Size::ZERO,
            scroll_y: 0.0,
            hovered: None,
            tooltip: None,
            measure: Box::new(GraphemeMetrics::default()),
            exporter: None,
            _subscriptions: subscriptions,
        }
    }

    fn track_model(
        model: &RowCollection<R>,
        selection: &Arc<RwLock<SelectionModel>>,
        changed: &Arc<Signal<SelectionChange>>,
    ) -> Vec<ConnectionGuard> {
        let signals = model.signals();
        let inserted = {
            let selection = selection.clone();
            signals
                .rows_inserted
                .connect_scoped(move |range| selection.write().rows_inserted(range.clone()))
        };
        let removed = {
            let selection = selection.clone();
            let changed = changed.clone();
            signals.rows_removed.connect_scoped(move |range| {
                let change = selection.write().rows_removed(range.clone());
                if !change.is_empty() {
                    changed.emit(change);
                }
            })
        };
        let reordered = {
            let selection = selection.clone();
            signals
                .rows_reordered
                .connect_scoped(move |perm| selection.write().rows_reordered(perm))
        };
        let reset = {
            let selection = selection.clone();
            let changed = changed.clone();
            signals.model_reset.connect_scoped(move |_| {
                let change = selection.write().model_reset();
                if !change.is_empty() {
                    changed.emit(change);
                }
            })
        };
        vec![inserted, removed, reordered, reset]
    }

    /// Registers the view's selection and hover handlers on `pipeline`.
    pub fn install_listeners(pipeline: &mut InputPipeline<Self>) {
        pipeline.add_input_listener(|view: &mut Self, event: &mut PointerEvent| {
            view.handle_selection_press(event);
        });
        pipeline.add_hover_listener(|view: &mut Self, event: &PointerEvent| {
            view.handle_hover(event);
        });
    }

    pub fn model(&self) -> &Arc<RowCollection<R>> {
        &self.model
    }

    /// Emitted when rows enter or leave the selection.
    pub fn selection_changed(&self) -> &Signal<SelectionChange> {
        &self.selection_changed
    }

    /// Sets how a row becomes a drag export entry. Rows yielding `None`
    /// are left out of the payload.
    pub fn set_exporter<F>(&mut self, exporter: F)
    where
        F: Fn(&R) -> Option<ExportEntry> + Send + Sync + 'static,
    {
        self.exporter = Some(Box::new(exporter));
    }

    /// Replaces the text measurer used for tooltip decisions.
    pub fn set_text_measure(&mut self, measure: impl TextMeasure + Send + Sync + 'static) {
        self.measure = Box::new(measure);
    }

    // =========================================================================
    // Columns
    // =========================================================================

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut ColumnMap {
        &mut self.columns
    }

    /// Toggle the model's sort on the column shown at `view_column`.
    pub fn sort_by_view_column(&self, view_column: usize) -> bool {
        match self.columns.view_to_model(view_column) {
            Some(column) => {
                self.model.sort(column);
                true
            }
            None => false,
        }
    }

    /// View column and direction of the active sort, if that column is shown.
    pub fn sort_indicator(&self) -> Option<(usize, SortOrder)> {
        let state = self.model.sort_state()?;
        Some((self.columns.model_to_view(state.column)?, state.order))
    }

    /// Applies persisted table settings.
    ///
    /// `hidden_columns` is authoritative: listed columns are hidden, all
    /// others shown. Unknown column ids are logged and skipped.
    pub fn apply_settings(&mut self, settings: &TableSettings) {
        let specs = R::columns();
        for id in &settings.hidden_columns {
            if column_index(specs, id).is_none() {
                tracing::warn!(target: targets::VIEW, column = %id, "unknown column in hidden_columns");
            }
        }
        for (index, spec) in specs.iter().enumerate() {
            let hidden = settings.hidden_columns.iter().any(|id| id == spec.id);
            self.columns.set_hidden(index, hidden);
        }

        if let Some(id) = &settings.sort_column {
            match column_index(specs, id) {
                Some(column) => {
                    let order = if settings.descending {
                        SortOrder::Descending
                    } else {
                        SortOrder::Ascending
                    };
                    self.model.set_sort(column, order);
                }
                None => {
                    tracing::warn!(target: targets::VIEW, column = %id, "unknown sort column");
                }
            }
        }

        if let Some(height) = settings.row_height {
            self.set_row_height(height);
        }
    }

    /// Captures the current layout as table settings.
    pub fn table_settings(&self) -> TableSettings {
        let specs = R::columns();
        let sort = self.model.sort_state();
        TableSettings {
            hidden_columns: (0..specs.len())
                .filter(|&c| self.columns.is_hidden(c))
                .map(|c| specs[c].id.to_owned())
                .collect(),
            sort_column: sort.map(|s| specs[s.column].id.to_owned()),
            descending: sort.is_some_and(|s| s.order == SortOrder::Descending),
            row_height: Some(self.row_height),
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn set_row_height(&mut self, height: f32) {
        self.row_height = height.max(1.0);
        self.set_scroll_y(self.scroll_y);
    }

    pub fn set_header_height(&mut self, height: f32) {
        self.header_height = height.max(0.0);
    }

    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
        self.set_scroll_y(self.scroll_y);
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Scrolls vertically, clamped to the content.
    pub fn set_scroll_y(&mut self, y: f32) {
        let content = self.model.row_count() as f32 * self.row_height;
        let visible = (self.viewport.height - self.header_height).max(0.0);
        self.scroll_y = y.clamp(0.0, (content - visible).max(0.0));
    }

    /// Scrolls the least amount needed to show `row`.
    ///
    /// No-op until the view has a viewport.
    pub fn scroll_to(&mut self, row: usize) {
        let top = row as f32 * self.row_height;
        let visible = (self.viewport.height - self.header_height).max(0.0);
        if visible <= 0.0 {
            return;
        }
        if top < self.scroll_y {
            self.set_scroll_y(top);
        } else if top + self.row_height > self.scroll_y + visible {
            self.set_scroll_y(top + self.row_height - visible);
        }
    }

    /// Rows at least partly inside the viewport.
    pub fn visible_rows(&self) -> Range<usize> {
        let count = self.model.row_count();
        let visible = (self.viewport.height - self.header_height).max(0.0);
        let first = ((self.scroll_y / self.row_height).floor() as usize).min(count);
        let last = (((self.scroll_y + visible) / self.row_height).ceil() as usize).min(count);
        first..last
    }

    /// The row under `point`, if any.
    pub fn row_at(&self, point: Point) -> Option<usize> {
        if point.x < 0.0 || point.y < self.header_height {
            return None;
        }
        let row = ((point.y - self.header_height + self.scroll_y) / self.row_height).floor() as usize;
        (row < self.model.row_count()).then_some(row)
    }

    /// The model column under `point`, if any.
    pub fn column_at(&self, point: Point) -> Option<usize> {
        self.columns.column_at_x(point.x)
    }

    /// Row and model column under `point`.
    pub fn cell_at(&self, point: Point) -> Option<(usize, usize)> {
        Some((self.row_at(point)?, self.column_at(point)?))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.read().selection_mode()
    }

    pub fn set_selection_mode(&self, mode: SelectionMode) {
        let change = self.selection.write().set_selection_mode(mode);
        self.notify(change);
    }

    /// The lowest selected row, never past the end of the model.
    pub fn selected_index(&self) -> Option<usize> {
        self.selection.read().selected_index(self.model.row_count())
    }

    /// Selected rows that exist, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection.read().selected_indices(self.model.row_count())
    }

    /// Domain objects of the selected rows, in row order.
    pub fn selected_sources(&self) -> Vec<R::Source> {
        self.selected_indices()
            .into_iter()
            .filter_map(|row| self.model.source_at(row))
            .collect()
    }

    pub fn is_row_selected(&self, row: usize) -> bool {
        row < self.model.row_count() && self.selection.read().is_selected(row)
    }

    /// Applies `flags` to `row`. Rows past the end are ignored.
    pub fn select_row(&self, row: usize, flags: SelectionFlags) {
        if row >= self.model.row_count() {
            return;
        }
        let change = self.selection.write().select(row, flags);
        self.notify(change);
    }

    pub fn select_all(&self) {
        let change = self.selection.write().select_all(self.model.row_count());
        self.notify(change);
    }

    pub fn clear_selection(&self) {
        let change = self.selection.write().clear();
        self.notify(change);
    }

    fn notify(&self, change: SelectionChange) {
        if !change.is_empty() {
            tracing::trace!(
                target: targets::VIEW,
                selected = change.selected.len(),
                deselected = change.deselected.len(),
                "selection changed"
            );
            self.selection_changed.emit(change);
        }
    }

    /// Click, Ctrl+click and Shift+click selection.
    ///
    /// Acts on unconsumed left-button presses only. A press below the last
    /// row clears the selection.
    pub fn handle_selection_press(&mut self, event: &mut PointerEvent) {
        if event.kind != PointerKind::Press || event.button != Some(MouseButton::Left) {
            return;
        }
        let row = self.row_at(event.position);
        let mut selection = self.selection.write();
        let change = match (selection.selection_mode(), row) {
            (SelectionMode::None, _) => SelectionChange::default(),
            (_, None) => selection.clear(),
            (SelectionMode::Single, Some(row)) => selection.select(row, SelectionFlags::CLEAR_SELECT_CURRENT),
            (SelectionMode::Multi, Some(row)) => selection.toggle(row),
            (SelectionMode::Extended, Some(row)) => {
                if event.modifiers.shift {
                    let anchor = selection.anchor().unwrap_or(row);
                    selection.select_range(anchor, row, SelectionFlags::CLEAR.with_current())
                } else if event.modifiers.control {
                    selection.toggle(row)
                } else {
                    selection.select(row, SelectionFlags::CLEAR_SELECT_CURRENT)
                }
            }
        };
        drop(selection);
        if let Some(row) = row {
            self.scroll_to(row);
        }
        self.notify(change);
    }

    // =========================================================================
    // Hover and rendering
    // =========================================================================

    /// The hovered cell as (row, model column).
    pub fn hovered_cell(&self) -> Option<(usize, usize)> {
        self.hovered
    }

    /// Tooltip for the hovered cell, if its text is clipped.
    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Tracks the hovered cell and recomputes its tooltip.
    pub fn handle_hover(&mut self, event: &PointerEvent) {
        let cell = match event.kind {
            PointerKind::Exit => None,
            _ => self.cell_at(event.position),
        };
        self.hovered = cell;
        self.tooltip = cell.and_then(|(row, column)| self.tooltip_for(row, column));
    }

    fn tooltip_for(&self, row: usize, column: usize) -> Option<String> {
        let spec = R::columns().get(column)?;
        let text = self.model.value_at(row, column).display_text();
        clipped_tooltip(&text, spec, self.columns.width(column), self.measure.as_ref())
    }

    /// Describes the visible cells of `row`, in view column order.
    pub fn describe_row(&self, row: usize) -> Vec<CellDescription> {
        let specs = R::columns();
        let selected = self.is_row_selected(row);
        let Some((inactive, values)) = self.model.with_row(row, |r| {
            let values: Vec<_> = self
                .columns
                .visible_columns()
                .into_iter()
                .map(|c| (c, r.value_at(c)))
                .collect();
            (r.is_inactive(), values)
        }) else {
            return Vec::new();
        };
        values
            .into_iter()
            .map(|(column, value)| {
                let state = CellState {
                    selected,
                    hovered: self.hovered == Some((row, column)),
                    inactive,
                };
                describe_cell(&value, &specs[column], state)
            })
            .collect()
    }
}

impl<R: Row> DragSurface for TableView<R> {
    fn is_in_selection(&self, point: Point) -> bool {
        self.row_at(point).is_some_and(|row| self.selection.read().is_selected(row))
    }

    fn export_payload(&self) -> DragPayload {
        let mut payload = DragPayload::new();
        let Some(exporter) = &self.exporter else {
            return payload;
        };
        for row in self.selected_indices() {
            if let Some(Some(entry)) = self.model.with_row(row, |r| exporter(r)) {
                payload.push(entry);
            }
        }
        payload
    }
}

impl<R: Row> fmt::Debug for TableView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableView")
            .field("model", &self.model)
            .field("selection", &*self.selection.read())
            .field("columns", &self.columns)
            .field("row_height", &self.row_height)
            .field("scroll_y", &self.scroll_y)
            .finish()
    }
}
