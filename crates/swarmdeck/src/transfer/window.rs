//! Per-window mediator between a collection, its table and the input
//! pipeline.

use std::fmt;
use std::sync::Arc;

use swarmdeck_core::Signal;
use swarmdeck_core::logging::{span_names, targets};

use crate::input::{DispatchResult, DragArbiter, DragOutcome, DragRecognizer, InputPipeline, PointerEvent};
use crate::model::{Row, RowCollection};
use crate::settings::{RefreshSettings, Settings};
use crate::view::TableView;

use super::{DownloadRow, LibraryRow, UploadRow};

/// One transfer window: a row collection, the table bound to it, and the
/// pointer pipeline feeding the table.
///
/// Constructed explicitly by the application with its settings and platform
/// drag recognizer; nothing here is global.
pub struct TransferWindow<R: Row> {
    name: String,
    model: Arc<RowCollection<R>>,
    view: TableView<R>,
    pipeline: InputPipeline<TableView<R>>,
    refresh: RefreshSettings,
    clear_enabled: bool,
    /// Emitted when "Clear Completed" becomes available or unavailable.
    pub clear_enabled_changed: Signal<bool>,
}

impl<R: Row> TransferWindow<R> {
    /// Builds a window named `name`, applying `settings.tables[name]` when
    /// present. Without an entry, columns keep their declared defaults.
    pub fn new(
        name: impl Into<String>,
        settings: &Settings,
        recognizer: impl DragRecognizer + 'static,
    ) -> Self {
        let name = name.into();
        let model = RowCollection::shared();
        let mut view = TableView::new(model.clone());
        if let Some(table) = settings.tables.get(&name) {
            view.apply_settings(table);
        }

        let arbiter = DragArbiter::new(recognizer).with_settings(&settings.input);
        let mut pipeline = InputPipeline::new(arbiter);
        TableView::install_listeners(&mut pipeline);

        Self {
            name,
            model,
            view,
            pipeline,
            refresh: settings.refresh.clone(),
            clear_enabled: false,
            clear_enabled_changed: Signal::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Arc<RowCollection<R>> {
        &self.model
    }

    pub fn view(&self) -> &TableView<R> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TableView<R> {
        &mut self.view
    }

    pub fn refresh_settings(&self) -> &RefreshSettings {
        &self.refresh
    }

    /// Whether "Clear Completed" is currently enabled.
    pub fn is_clear_enabled(&self) -> bool {
        self.clear_enabled
    }

    /// Adds a transfer, recycling a finished row for the same target when
    /// the row type allows it. Returns the row index.
    pub fn add(&self, source: R::Source) -> usize {
        match self.model.update(source.clone()) {
            Some(index) => index,
            None => self.model.add_sorted(source),
        }
    }

    /// One refresh tick: update every row, resort once if a sorted column
    /// changed, and re-evaluate "Clear Completed".
    pub fn tick(&mut self) {
        let _span = tracing::debug_span!(span_names::REFRESH, window = %self.name).entered();
        let any_inactive = self.model.refresh();
        if self.refresh.resort_on_tick && self.model.needs_resort() {
            self.model.resort();
        }
        self.set_clear_enabled(any_inactive);
    }

    /// Removes every inactive row. Returns the number removed.
    pub fn clear_inactive(&mut self) -> usize {
        let removed = self.model.remove_inactive();
        tracing::debug!(target: targets::TRANSFER, window = %self.name, removed, "cleared inactive rows");
        self.set_clear_enabled(self.model.inactive_count() > 0);
        removed
    }

    /// Feeds one pointer event through the arbiter and the table.
    pub fn dispatch(&mut self, event: PointerEvent) -> DispatchResult {
        self.pipeline.dispatch(&mut self.view, event)
    }

    /// The platform reports the end of a drag started by this window.
    pub fn drag_finished(&mut self, outcome: DragOutcome) {
        self.pipeline.drag_finished(outcome);
    }

    /// Focus loss or window close.
    pub fn cancel_input(&mut self) -> bool {
        self.pipeline.cancel()
    }

    /// Writes this window's column and sort state back into `settings`.
    pub fn save_settings(&self, settings: &mut Settings) {
        settings.set_table(self.name.clone(), self.view.table_settings());
    }

    fn set_clear_enabled(&mut self, enabled: bool) {
        if self.clear_enabled != enabled {
            self.clear_enabled = enabled;
            self.clear_enabled_changed.emit(enabled);
        }
    }
}

impl TransferWindow<DownloadRow> {
    /// The downloads window. Dragging exports the saved files, resolving
    /// unfinished ones at drop time.
    pub fn downloads(settings: &Settings, recognizer: impl DragRecognizer + 'static) -> Self {
        let mut window = Self::new("downloads", settings, recognizer);
        window.view.set_exporter(|row: &DownloadRow| Some(row.export_entry()));
        window
    }
}

impl TransferWindow<UploadRow> {
    pub fn uploads(settings: &Settings, recognizer: impl DragRecognizer + 'static) -> Self {
        let mut window = Self::new("uploads", settings, recognizer);
        window.view.set_exporter(UploadRow::export_entry);
        window
    }
}

impl TransferWindow<LibraryRow> {
    pub fn library(settings: &Settings, recognizer: impl DragRecognizer + 'static) -> Self {
        let mut window = Self::new("library", settings, recognizer);
        window
            .view
            .set_exporter(|row: &LibraryRow| Some(crate::input::ExportEntry::Ready(row.path().to_path_buf())));
        window
    }
}

impl<R: Row> fmt::Debug for TransferWindow<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferWindow")
            .field("name", &self.name)
            .field("rows", &self.model.row_count())
            .field("clear_enabled", &self.clear_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ExportEntry, KeyboardModifiers, RecordingRecognizer};
    use crate::transfer::{DownloadState, Downloader, TransferId, download_columns};
    use crate::model::SortOrder;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use swarmdeck_core::Point;

    struct FakeDownload {
        id: u64,
        name: String,
        state: Mutex<DownloadState>,
        done: Mutex<u64>,
    }

    impl Downloader for FakeDownload {
        fn id(&self) -> TransferId {
            TransferId(self.id)
        }
        fn state(&self) -> DownloadState {
            *self.state.lock()
        }
        fn file_name(&self) -> String {
            self.name.clone()
        }
        fn total_bytes(&self) -> u64 {
            100
        }
        fn bytes_done(&self) -> u64 {
            *self.done.lock()
        }
        fn rate(&self) -> f64 {
            10.0
        }
        fn source_count(&self) -> usize {
            1
        }
        fn save_path(&self) -> Option<PathBuf> {
            Some(PathBuf::from("/dl").join(&self.name))
        }
    }

    fn download(id: u64, name: &str, done: u64) -> Arc<FakeDownload> {
        Arc::new(FakeDownload {
            id,
            name: name.to_owned(),
            state: Mutex::new(DownloadState::Downloading),
            done: Mutex::new(done),
        })
    }

    fn window() -> TransferWindow<DownloadRow> {
        TransferWindow::downloads(&Settings::default(), RecordingRecognizer::new())
    }

    #[test]
    fn test_tick_toggles_clear_enabled() {
        let mut window = window();
        let enabled = Arc::new(Mutex::new(Vec::new()));
        {
            let enabled = enabled.clone();
            window.clear_enabled_changed.connect(move |&on| enabled.lock().push(on));
        }
        let a = download(1, "a", 10);
        window.add(a.clone());
        window.add(download(2, "b", 20));

        window.tick();
        assert!(!window.is_clear_enabled());

        *a.state.lock() = DownloadState::Complete;
        window.tick();
        window.tick();
        assert!(window.is_clear_enabled());

        assert_eq!(window.clear_inactive(), 1);
        assert!(!window.is_clear_enabled());
        assert_eq!(*enabled.lock(), vec![true, false]);
    }

    #[test]
    fn test_tick_resorts_dynamic_column() {
        let mut window = window();
        let a = download(1, "a", 10);
        window.add(a.clone());
        window.add(download(2, "b", 50));
        window.model().set_sort(download_columns::PROGRESS, SortOrder::Descending);
        assert_eq!(window.model().value_at(0, download_columns::NAME).display_text(), "b");

        *a.done.lock() = 90;
        window.tick();
        assert!(!window.model().needs_resort());
        assert_eq!(window.model().value_at(0, download_columns::NAME).display_text(), "a");
    }

    #[test]
    fn test_resort_deferred_when_disabled() {
        let mut settings = Settings::default();
        settings.refresh.resort_on_tick = false;
        let mut window = TransferWindow::<DownloadRow>::downloads(&settings, RecordingRecognizer::new());
        let a = download(1, "a", 10);
        window.add(a.clone());
        window.add(download(2, "b", 50));
        window.model().set_sort(download_columns::PROGRESS, SortOrder::Descending);

        *a.done.lock() = 90;
        window.tick();
        assert!(window.model().needs_resort());
        assert_eq!(window.model().value_at(0, download_columns::NAME).display_text(), "b");
    }

    #[test]
    fn test_add_recycles_finished_download() {
        let window = window();
        let first = download(1, "a.iso", 100);
        *first.state.lock() = DownloadState::Aborted;
        window.add(first);
        window.add(download(2, "b.iso", 0));

        assert_eq!(window.add(download(3, "a.iso", 0)), 0);
        assert_eq!(window.model().row_count(), 2);
    }

    #[test]
    fn test_drag_exports_selected_downloads() {
        let recorder = RecordingRecognizer::new();
        let mut window = TransferWindow::downloads(&Settings::default(), recorder.clone());
        window.add(download(1, "a.iso", 0));
        window.add(download(2, "b.iso", 0));

        let row0 = Point::new(10.0, 24.0 + 10.0);
        window.dispatch(PointerEvent::press(row0, KeyboardModifiers::NONE));
        window.dispatch(PointerEvent::release(row0));
        assert_eq!(window.view().selected_indices(), vec![0]);

        window.dispatch(PointerEvent::press(row0, KeyboardModifiers::NONE));
        window.dispatch(PointerEvent::drag_move(Point::new(60.0, 34.0)));
        let started = recorder.started();
        assert_eq!(started.len(), 1);
        assert!(matches!(&started[0].payload.entries()[0], ExportEntry::Ready(p) if p.ends_with("a.iso")));
        window.drag_finished(crate::input::DragOutcome::Dropped);
    }

    #[test]
    fn test_save_settings_round_trip() {
        let mut settings = Settings::default();
        let window = window();
        window.view().sort_by_view_column(download_columns::SIZE);
        window.save_settings(&mut settings);
        assert_eq!(settings.table("downloads").sort_column.as_deref(), Some("size"));
    }

    #[test]
    fn test_table_settings_applied_by_name() {
        let window = window();
        assert!(window.view().columns().is_hidden(download_columns::HOST));

        let mut settings = Settings::default();
        settings.set_table(
            "downloads",
            crate::settings::TableSettings {
                hidden_columns: vec!["speed".into()],
                sort_column: Some("name".into()),
                descending: true,
                row_height: Some(30.0),
            },
        );
        let window = TransferWindow::downloads(&settings, RecordingRecognizer::new());
        assert!(window.view().columns().is_hidden(download_columns::SPEED));
        assert!(!window.view().columns().is_hidden(download_columns::HOST));
        assert_eq!(window.view().row_height(), 30.0);
        assert_eq!(
            window.model().sort_state().map(|s| (s.column, s.order)),
            Some((download_columns::NAME, SortOrder::Descending))
        );
    }
}
