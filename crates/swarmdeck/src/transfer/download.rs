//! Download rows.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::input::{ExportEntry, LazyFile};
use crate::model::{CellValue, ColumnSpec, Row};

use super::TransferId;

/// Lifecycle of a download as reported by the networking core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadState {
    Queued,
    Connecting,
    Downloading,
    Paused,
    /// No source is currently sending data.
    Stalled,
    /// All bytes received; hashing before the move to the save location.
    Verifying,
    Complete,
    Aborted,
    /// Ran out of disk space or hit a write error.
    DiskProblem,
    /// The finished file did not match its hash.
    Corrupt,
}

impl DownloadState {
    pub fn label(self) -> &'static str {
        match self {
            DownloadState::Queued => "Queued",
            DownloadState::Connecting => "Connecting",
            DownloadState::Downloading => "Downloading",
            DownloadState::Paused => "Paused",
            DownloadState::Stalled => "Stalled",
            DownloadState::Verifying => "Verifying",
            DownloadState::Complete => "Complete",
            DownloadState::Aborted => "Aborted",
            DownloadState::DiskProblem => "Disk Problem",
            DownloadState::Corrupt => "Corrupt",
        }
    }

    /// Terminal states. Inactive rows are what "Clear Completed" removes.
    pub fn is_inactive(self) -> bool {
        match self {
            DownloadState::Complete
            | DownloadState::Aborted
            | DownloadState::DiskProblem
            | DownloadState::Corrupt => true,
            DownloadState::Queued
            | DownloadState::Connecting
            | DownloadState::Downloading
            | DownloadState::Paused
            | DownloadState::Stalled
            | DownloadState::Verifying => false,
        }
    }

    /// Sort rank: transfers making progress first, finished ones last.
    fn rank(self) -> u16 {
        match self {
            DownloadState::Downloading => 0,
            DownloadState::Verifying => 1,
            DownloadState::Connecting => 2,
            DownloadState::Stalled => 3,
            DownloadState::Queued => 4,
            DownloadState::Paused => 5,
            DownloadState::Complete => 6,
            DownloadState::DiskProblem => 7,
            DownloadState::Corrupt => 8,
            DownloadState::Aborted => 9,
        }
    }

    pub fn to_cell(self) -> CellValue {
        CellValue::status(self.rank(), self.label())
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A download owned by the networking core.
pub trait Downloader: Send + Sync {
    fn id(&self) -> TransferId;
    fn state(&self) -> DownloadState;
    /// Name of the file being downloaded.
    fn file_name(&self) -> String;
    /// Expected size in bytes; 0 when not yet known.
    fn total_bytes(&self) -> u64;
    fn bytes_done(&self) -> u64;
    /// Current rate in bytes per second.
    fn rate(&self) -> f64;
    /// Number of peers sending data.
    fn source_count(&self) -> usize;
    /// Where the file lives once complete. `None` until then.
    fn save_path(&self) -> Option<PathBuf>;
    /// Address of the first source, if any.
    fn host(&self) -> Option<String> {
        None
    }
    /// Position in the download queue while waiting for a slot.
    fn queue_position(&self) -> Option<u32> {
        None
    }
}

pub const DOWNLOAD_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("name", "Name").clippable().width(240.0),
    ColumnSpec::new("size", "Size").width(80.0),
    ColumnSpec::new("progress", "Progress").dynamic().width(120.0),
    ColumnSpec::new("speed", "Speed").dynamic().width(80.0),
    ColumnSpec::new("remaining", "Time").dynamic().width(70.0),
    ColumnSpec::new("sources", "Sources").dynamic().width(60.0),
    ColumnSpec::new("status", "Status").dynamic().width(100.0),
    ColumnSpec::new("host", "Host").dynamic().clippable().hidden_by_default(),
    ColumnSpec::new("queue", "Queue").dynamic().width(50.0).hidden_by_default(),
];

/// Column indices of [`DOWNLOAD_COLUMNS`].
pub mod download_columns {
    pub const NAME: usize = 0;
    pub const SIZE: usize = 1;
    pub const PROGRESS: usize = 2;
    pub const SPEED: usize = 3;
    pub const REMAINING: usize = 4;
    pub const SOURCES: usize = 5;
    pub const STATUS: usize = 6;
    pub const HOST: usize = 7;
    pub const QUEUE: usize = 8;
}

/// One row of the downloads table.
pub struct DownloadRow {
    source: Arc<dyn Downloader>,
    name: String,
    state: DownloadState,
    total: u64,
    done: u64,
    rate: f64,
    sources: usize,
    host: Option<String>,
    queue: Option<u32>,
}

impl DownloadRow {
    pub fn state(&self) -> DownloadState {
        self.state
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    fn remaining(&self) -> CellValue {
        if self.state.is_inactive() || self.total == 0 {
            return CellValue::Empty;
        }
        if self.rate < 1.0 {
            return CellValue::Remaining(None);
        }
        let left = self.total.saturating_sub(self.done) as f64;
        CellValue::Remaining(Some(Duration::from_secs_f64(left / self.rate)))
    }

    /// Drag export entry: the saved file when complete, otherwise a lazy
    /// entry that asks the downloader for its save path at drop time.
    pub fn export_entry(&self) -> ExportEntry {
        if let Some(path) = self.source.save_path() {
            return ExportEntry::Ready(path);
        }
        let source = self.source.clone();
        let name = self.name.clone();
        ExportEntry::Lazy(Arc::new(LazyFile::new(self.name.clone(), move || {
            source
                .save_path()
                .ok_or_else(|| crate::Error::resolve(name, "download has not been saved yet"))
        })))
    }
}

impl Row for DownloadRow {
    type Source = Arc<dyn Downloader>;

    fn create(source: Self::Source) -> Self {
        let mut row = DownloadRow {
            source: source.clone(),
            name: String::new(),
            state: DownloadState::Queued,
            total: 0,
            done: 0,
            rate: 0.0,
            sources: 0,
            host: None,
            queue: None,
        };
        row.initialize(source);
        row
    }

    fn initialize(&mut self, source: Self::Source) {
        self.name = source.file_name();
        self.source = source;
        self.update();
    }

    fn source(&self) -> &Self::Source {
        &self.source
    }

    fn is_source(&self, source: &Self::Source) -> bool {
        self.source.id() == source.id()
    }

    fn columns() -> &'static [ColumnSpec] {
        DOWNLOAD_COLUMNS
    }

    fn value_at(&self, column: usize) -> CellValue {
        use download_columns::*;
        match column {
            NAME => CellValue::from(self.name.as_str()),
            SIZE if self.total > 0 => CellValue::Bytes(self.total),
            PROGRESS => CellValue::progress_of(self.done, self.total),
            SPEED if !self.state.is_inactive() => CellValue::Rate(self.rate),
            REMAINING => self.remaining(),
            SOURCES if !self.state.is_inactive() => CellValue::Integer(self.sources as i64),
            STATUS => self.state.to_cell(),
            HOST => self.host.as_deref().map(CellValue::from).unwrap_or_default(),
            QUEUE => self
                .queue
                .map(|pos| CellValue::Integer(i64::from(pos)))
                .unwrap_or_default(),
            _ => CellValue::Empty,
        }
    }

    fn update(&mut self) {
        self.state = self.source.state();
        self.total = self.source.total_bytes();
        self.done = self.source.bytes_done();
        self.rate = self.source.rate().max(0.0);
        self.sources = self.source.source_count();
        self.host = self.source.host();
        self.queue = match self.state {
            DownloadState::Queued => self.source.queue_position(),
            _ => None,
        };
    }

    fn is_inactive(&self) -> bool {
        self.state.is_inactive()
    }

    /// A new download of a file whose previous attempt is finished reuses
    /// that attempt's row.
    fn can_recycle(&self, source: &Self::Source) -> bool {
        self.is_inactive() && !self.is_source(source) && self.name == source.file_name()
    }
}
