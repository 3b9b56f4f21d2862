//! The shared-file library table.
//!
//! The file manager reports changes as a stream of [`FileManagerEvent`]s;
//! [`LibraryTable::apply`] turns each into the matching collection operation.
//! A rename re-binds the existing row in place so its selection survives.
//!
//! The "Type" column is computed in the background, since classifying a file
//! may mean reading it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use swarmdeck_core::CancellationToken;
use swarmdeck_core::logging::targets;

use crate::deferred::{DeferredCells, DeferredRow};
use crate::model::{CellValue, ColumnSpec, Row, RowCollection};

/// A shared file as known to the file manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Arc<Self> {
        Arc::new(Self {
            path: path.into(),
            size,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEventKind {
    Add,
    Remove,
    /// The file moved; `from` is its previous path.
    Rename { from: PathBuf },
    /// Size or metadata changed.
    Change,
}

/// One change reported by the file manager.
#[derive(Debug, Clone)]
pub struct FileManagerEvent {
    pub kind: FileEventKind,
    pub file: Arc<FileRecord>,
}

impl FileManagerEvent {
    pub fn add(file: Arc<FileRecord>) -> Self {
        Self {
            kind: FileEventKind::Add,
            file,
        }
    }

    pub fn remove(file: Arc<FileRecord>) -> Self {
        Self {
            kind: FileEventKind::Remove,
            file,
        }
    }

    pub fn rename(from: impl Into<PathBuf>, file: Arc<FileRecord>) -> Self {
        Self {
            kind: FileEventKind::Rename { from: from.into() },
            file,
        }
    }

    pub fn change(file: Arc<FileRecord>) -> Self {
        Self {
            kind: FileEventKind::Change,
            file,
        }
    }
}

pub const LIBRARY_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::new("name", "Name").clippable().width(260.0),
    ColumnSpec::new("size", "Size").width(80.0),
    ColumnSpec::new("type", "Type").clippable().width(100.0),
    ColumnSpec::new("path", "Location").clippable().hidden_by_default(),
];

/// Column indices of [`LIBRARY_COLUMNS`].
pub mod library_columns {
    pub const NAME: usize = 0;
    pub const SIZE: usize = 1;
    pub const TYPE: usize = 2;
    pub const PATH: usize = 3;
}

pub struct LibraryRow {
    record: Arc<FileRecord>,
    name: String,
    kind: CellValue,
    pending: Vec<CancellationToken>,
}

impl LibraryRow {
    pub fn path(&self) -> &Path {
        &self.record.path
    }

    /// Keep `token` so the computation is cancelled if the row goes away.
    fn track(&mut self, token: CancellationToken) {
        self.pending.push(token);
    }

    fn cancel_pending(&mut self) {
        for token in self.pending.drain(..) {
            token.cancel();
        }
    }
}

impl Row for LibraryRow {
    type Source = Arc<FileRecord>;

    fn create(source: Self::Source) -> Self {
        LibraryRow {
            name: source.file_name(),
            record: source,
            kind: CellValue::Empty,
            pending: Vec::new(),
        }
    }

    fn initialize(&mut self, source: Self::Source) {
        self.cancel_pending();
        self.name = source.file_name();
        self.record = source;
        self.kind = CellValue::Empty;
    }

    fn source(&self) -> &Self::Source {
        &self.record
    }

    fn is_source(&self, source: &Self::Source) -> bool {
        self.record.path == source.path
    }

    fn columns() -> &'static [ColumnSpec] {
        LIBRARY_COLUMNS
    }

    fn value_at(&self, column: usize) -> CellValue {
        match column {
            library_columns::NAME => CellValue::from(self.name.as_str()),
            library_columns::SIZE => CellValue::Bytes(self.record.size),
            library_columns::TYPE => self.kind.clone(),
            library_columns::PATH => self
                .record
                .path
                .parent()
                .map(|p| CellValue::from(p.display().to_string()))
                .unwrap_or_default(),
            _ => CellValue::Empty,
        }
    }

    fn update(&mut self) {}

    fn cleanup(&mut self) -> crate::Result<()> {
        self.cancel_pending();
        Ok(())
    }
}

impl DeferredRow for LibraryRow {
    type Key = PathBuf;

    fn has_key(&self, key: &PathBuf) -> bool {
        &self.record.path == key
    }

    fn set_deferred(&mut self, column: usize, value: CellValue) {
        if column == library_columns::TYPE {
            self.kind = value;
            self.pending.clear();
        }
    }
}

/// Type description from the file extension.
pub fn describe_file_type(path: &Path) -> CellValue {
    let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
        return CellValue::from("File");
    };
    let kind = match ext.as_str() {
        "mp3" | "ogg" | "flac" | "wav" | "m4a" | "aac" => "Audio",
        "mp4" | "mkv" | "avi" | "webm" | "mov" | "wmv" => "Video",
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" => "Image",
        "pdf" | "txt" | "doc" | "docx" | "odt" | "epub" | "rtf" => "Document",
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" => "Archive",
        "exe" | "msi" | "dmg" | "deb" | "rpm" | "appimage" => "Program",
        _ => return CellValue::from(format!("{} File", ext.to_uppercase())),
    };
    CellValue::from(kind)
}

type Classifier = Arc<dyn Fn(&Path) -> CellValue + Send + Sync>;

/// The library collection plus its event translation.
pub struct LibraryTable {
    model: Arc<RowCollection<LibraryRow>>,
    types: DeferredCells<PathBuf>,
    classify: Classifier,
}

impl Default for LibraryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryTable {
    pub fn new() -> Self {
        Self::with_classifier(describe_file_type)
    }

    /// Uses `classify` to compute the "Type" column off the UI thread.
    pub fn with_classifier<F>(classify: F) -> Self
    where
        F: Fn(&Path) -> CellValue + Send + Sync + 'static,
    {
        Self::with_model(RowCollection::shared(), classify)
    }

    /// Translates events into an existing collection, typically one owned by
    /// a [`TransferWindow`](super::TransferWindow).
    pub fn with_model<F>(model: Arc<RowCollection<LibraryRow>>, classify: F) -> Self
    where
        F: Fn(&Path) -> CellValue + Send + Sync + 'static,
    {
        Self {
            model,
            types: DeferredCells::new(),
            classify: Arc::new(classify),
        }
    }

    pub fn model(&self) -> &Arc<RowCollection<LibraryRow>> {
        &self.model
    }

    /// Apply one file manager event. Returns the affected row, if any.
    pub fn apply(&self, event: FileManagerEvent) -> Option<usize> {
        let FileManagerEvent { kind, file } = event;
        tracing::debug!(target: targets::TRANSFER, ?kind, path = %file.path.display(), "library event");
        match kind {
            FileEventKind::Add => match self.rebind(&file.path, file.clone()) {
                Some(index) => Some(index),
                None => Some(self.insert(file)),
            },
            FileEventKind::Remove => {
                let index = self.model.find(|row| row.path() == file.path)?;
                self.model.remove(index);
                Some(index)
            }
            FileEventKind::Rename { from } => match self.rebind(&from, file.clone()) {
                Some(index) => Some(index),
                None => Some(self.insert(file)),
            },
            FileEventKind::Change => self.rebind(&file.path, file.clone()),
        }
    }

    /// Apply type descriptions computed since the last call. Call on the UI
    /// thread, typically once per refresh tick.
    pub fn poll(&self) -> usize {
        self.types.drain(&self.model)
    }

    /// Type computations not yet finished.
    pub fn pending_types(&self) -> usize {
        self.types.pending()
    }

    fn insert(&self, file: Arc<FileRecord>) -> usize {
        let path = file.path.clone();
        let index = self.model.add_sorted(file);
        self.request_type(path);
        index
    }

    fn rebind(&self, path: &Path, file: Arc<FileRecord>) -> Option<usize> {
        let new_path = file.path.clone();
        let index = self.model.update_with(file, |row| row.path() == path)?;
        self.request_type(new_path);
        Some(index)
    }

    fn request_type(&self, path: PathBuf) {
        let classify = self.classify.clone();
        let target = path.clone();
        let token = self
            .types
            .request(path.clone(), library_columns::TYPE, move |token| {
                if token.is_cancelled() {
                    CellValue::Empty
                } else {
                    classify(&target)
                }
            });
        self.model.modify(|row| row.has_key(&path), |row| row.track(token));
    }
}
