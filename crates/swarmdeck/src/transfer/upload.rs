//! Upload rows.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::input::ExportEntry;
use crate::model::{CellValue, ColumnSpec, Row};

use super::TransferId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadState {
    Queued,
    Uploading,
    /// The remote peer is listing our shared files.
    Browsing,
    Complete,
    /// The peer disconnected before the transfer finished.
    Interrupted,
    /// The peer is over its upload slot limit.
    LimitReached,
    /// The file is no longer shared.
    FileGone,
}

impl UploadState {
    pub fn label(self) -> &'static str {
        match self {
            UploadState::Queued => "Queued",
            UploadState::Uploading => "Uploading",
            UploadState::Browsing => "Browse Host",
            UploadState::Complete => "Complete",
            UploadState::Interrupted => "Interrupted",
            UploadState::LimitReached => "Limit Reached",
            UploadState::FileGone => "File Not Shared",
        }
    }

    pub fn is_inactive(self) -> bool {
        match self {
            UploadState::Complete
            | UploadState::Interrupted
            | UploadState::LimitReached
            | UploadState::FileGone => true,
            UploadState::Queued | UploadState::Uploading | UploadState::Browsing => false,
        }
    }

    fn rank(self) -> u16 {
        match self {
            UploadState::Uploading => 0,
            UploadState::Browsing => 1,
            UploadState::Queued => 2,
            UploadState::Complete => 3,
            UploadState::LimitReached => 4,
            UploadState::Interrupted => 5,
            UploadState::FileGone => 6,
        }
    }

    pub fn to_cell(self) -> CellValue {
        CellValue::status(self.rank(), self.label())
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An upload owned by the networking core.
pub trait Uploader: Send + Sync {
    fn id(&self) -> TransferId;
    fn state(&self) -> UploadState;
    fn file_name(&self) -> String;
    /// Local path of the shared file being sent, if it is a file transfer.
    fn file_path(&self) -> Option<PathBuf>;
    fn total_bytes(&self) -> u64;
    fn bytes_sent(&self) -> u64;
    fn rate(&self) -> f64;
    /// Remote peer address.
    fn host(&self) -> String;
    /// Peer client name, when it announced one.
    fn client(&self) -> Option<String> {
        None
    }
}

pub const UPLOAD_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("name", "Name").clippable().width(240.0),
    ColumnSpec::new("host", "Host").clippable().width(120.0),
    ColumnSpec::new("progress", "Progress").dynamic().width(120.0),
    ColumnSpec::new("speed", "Speed").dynamic().width(80.0),
    ColumnSpec::new("status", "Status").dynamic().width(100.0),
    ColumnSpec::new("client", "Client").clippable().hidden_by_default(),
];

/// Column indices of [`UPLOAD_COLUMNS`].
pub mod upload_columns {
    pub const NAME: usize = 0;
    pub const HOST: usize = 1;
    pub const PROGRESS: usize = 2;
    pub const SPEED: usize = 3;
    pub const STATUS: usize = 4;
    pub const CLIENT: usize = 5;
}

pub struct UploadRow {
    source: Arc<dyn Uploader>,
    name: String,
    host: String,
    client: Option<String>,
    state: UploadState,
    total: u64,
    sent: u64,
    rate: f64,
}

impl UploadRow {
    pub fn state(&self) -> UploadState {
        self.state
    }

    /// The shared file, when there is one to drag out.
    pub fn export_entry(&self) -> Option<ExportEntry> {
        self.source.file_path().map(ExportEntry::Ready)
    }
}

impl Row for UploadRow {
    type Source = Arc<dyn Uploader>;

    fn create(source: Self::Source) -> Self {
        let mut row = UploadRow {
            source: source.clone(),
            name: String::new(),
            host: String::new(),
            client: None,
            state: UploadState::Queued,
            total: 0,
            sent: 0,
            rate: 0.0,
        };
        row.initialize(source);
        row
    }

    fn initialize(&mut self, source: Self::Source) {
        self.name = source.file_name();
        self.host = source.host();
        self.client = source.client();
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
        UPLOAD_COLUMNS
    }

    fn value_at(&self, column: usize) -> CellValue {
        use upload_columns::*;
        match column {
            NAME => CellValue::from(self.name.as_str()),
            HOST => CellValue::from(self.host.as_str()),
            PROGRESS if self.state != UploadState::Browsing => {
                CellValue::progress_of(self.sent, self.total)
            }
            SPEED if !self.state.is_inactive() => CellValue::Rate(self.rate),
            STATUS => self.state.to_cell(),
            CLIENT => self.client.as_deref().map(CellValue::from).unwrap_or_default(),
            _ => CellValue::Empty,
        }
    }

    fn update(&mut self) {
        self.state = self.source.state();
        self.total = self.source.total_bytes();
        self.sent = self.source.bytes_sent();
        self.rate = self.source.rate().max(0.0);
    }

    fn is_inactive(&self) -> bool {
        self.state.is_inactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct FakeUpload {
        state: Mutex<UploadState>,
    }

    impl Uploader for FakeUpload {
        fn id(&self) -> TransferId {
            TransferId(9)
        }
        fn state(&self) -> UploadState {
            *self.state.lock()
        }
        fn file_name(&self) -> String {
            "notes.txt".into()
        }
        fn file_path(&self) -> Option<PathBuf> {
            Some(PathBuf::from("/share/notes.txt"))
        }
        fn total_bytes(&self) -> u64 {
            400
        }
        fn bytes_sent(&self) -> u64 {
            100
        }
        fn rate(&self) -> f64 {
            50.0
        }
        fn host(&self) -> String {
            "10.0.0.7:6346".into()
        }
    }

    #[test]
    fn test_upload_cells() {
        let fake = Arc::new(FakeUpload {
            state: Mutex::new(UploadState::Uploading),
        });
        let mut row = UploadRow::create(fake.clone());
        assert_eq!(row.value_at(upload_columns::HOST), CellValue::from("10.0.0.7:6346"));
        assert_eq!(row.value_at(upload_columns::PROGRESS), CellValue::Progress(0.25));
        assert_eq!(row.value_at(upload_columns::CLIENT), CellValue::Empty);
        assert!(!row.is_inactive());

        *fake.state.lock() = UploadState::Interrupted;
        row.update();
        assert!(row.is_inactive());
        assert_eq!(row.value_at(upload_columns::SPEED), CellValue::Empty);
        assert_eq!(row.value_at(upload_columns::STATUS).display_text(), "Interrupted");
        assert!(matches!(row.export_entry(), Some(ExportEntry::Ready(_))));
    }

    #[test]
    fn test_uploads_never_recycle() {
        let fake: Arc<dyn Uploader> = Arc::new(FakeUpload {
            state: Mutex::new(UploadState::Complete),
        });
        let row = UploadRow::create(fake.clone());
        assert!(!row.can_recycle(&fake));
        assert!(row.is_source(&fake));
    }
}
