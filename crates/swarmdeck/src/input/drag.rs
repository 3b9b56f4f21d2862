//! Drag payloads and the platform drag recognizer seam.
//!
//! A [`DragPayload`] is the ordered list of files a drag exports. Entries are
//! either paths known up front or [`LazyFile`]s whose path is only known at
//! drop time (a download that has not been moved to its save location yet).
//! A lazy entry's resolver runs at most once; its outcome is cached.
//!
//! The platform side is abstracted by [`DragRecognizer`]. Headless builds and
//! tests use [`RecordingRecognizer`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use swarmdeck_core::Size;
use swarmdeck_core::logging::targets;
use url::Url;

use crate::error::{DragError, Error, Result};

/// Standard MIME types used in drag operations.
pub mod mime {
    /// URI list MIME type (for file paths and URLs).
    pub const TEXT_URI_LIST: &str = "text/uri-list";
}

/// Default distance in pixels the pointer must travel before a press turns
/// into a drag.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 4.0;

type Resolver = Box<dyn FnOnce() -> Result<PathBuf> + Send>;

enum LazyState {
    Pending(Resolver),
    Resolved(PathBuf),
    Failed(String),
    /// The resolver panicked or is running on another thread.
    Taken,
}

/// A file whose path is resolved at drop time.
pub struct LazyFile {
    name: String,
    state: Mutex<LazyState>,
}

impl LazyFile {
    pub fn new<F>(name: impl Into<String>, resolver: F) -> Self
    where
        F: FnOnce() -> Result<PathBuf> + Send + 'static,
    {
        Self {
            name: name.into(),
            state: Mutex::new(LazyState::Pending(Box::new(resolver))),
        }
    }

    /// Display name of the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the resolver has run.
    pub fn is_resolved(&self) -> bool {
        !matches!(*self.state.lock(), LazyState::Pending(_))
    }

    /// Resolve the path, running the resolver on first call only.
    pub fn resolve(&self) -> Result<PathBuf> {
        let mut state = self.state.lock();
        if let LazyState::Pending(_) = &*state {
            let LazyState::Pending(resolver) = std::mem::replace(&mut *state, LazyState::Taken) else {
                return Err(Error::resolve(&self.name, "resolver unavailable"));
            };
            *state = match resolver() {
                Ok(path) => LazyState::Resolved(path),
                Err(err) => LazyState::Failed(err.to_string()),
            };
        }
        match &*state {
            LazyState::Resolved(path) => Ok(path.clone()),
            LazyState::Failed(message) => Err(Error::resolve(&self.name, message.clone())),
            LazyState::Pending(_) | LazyState::Taken => {
                Err(Error::resolve(&self.name, "resolver unavailable"))
            }
        }
    }
}

impl fmt::Debug for LazyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyFile")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// One exported file.
#[derive(Debug, Clone)]
pub enum ExportEntry {
    Ready(PathBuf),
    Lazy(Arc<LazyFile>),
}

impl ExportEntry {
    /// The path, resolving a lazy entry if needed.
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            ExportEntry::Ready(path) => Ok(path.clone()),
            ExportEntry::Lazy(lazy) => lazy.resolve(),
        }
    }
}

/// The ordered set of files a drag exports.
#[derive(Debug, Clone, Default)]
pub struct DragPayload {
    entries: Vec<ExportEntry>,
}

impl DragPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload of known paths.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            entries: paths.into_iter().map(ExportEntry::Ready).collect(),
        }
    }

    pub fn push(&mut self, entry: ExportEntry) {
        self.entries.push(entry);
    }

    pub fn push_path(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(ExportEntry::Ready(path.into()));
    }

    /// Add a file whose path `resolver` produces at drop time.
    pub fn push_lazy<F>(&mut self, name: impl Into<String>, resolver: F)
    where
        F: FnOnce() -> Result<PathBuf> + Send + 'static,
    {
        self.entries
            .push(ExportEntry::Lazy(Arc::new(LazyFile::new(name, resolver))));
    }

    pub fn entries(&self) -> &[ExportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths known without resolving anything.
    pub fn ready_paths(&self) -> Vec<&Path> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                ExportEntry::Ready(path) => Some(path.as_path()),
                ExportEntry::Lazy(_) => None,
            })
            .collect()
    }

    /// Resolve every entry in order. Entries that fail to resolve are logged
    /// and left out.
    pub fn resolve_all(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter_map(|entry| match entry.resolve() {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::warn!(target: targets::INPUT, error = %err, "dropping unresolved export entry");
                    None
                }
            })
            .collect()
    }

    /// Render the resolved payload as `text/uri-list`.
    ///
    /// Relative paths cannot be expressed as `file:` URIs and are skipped.
    pub fn uri_list(&self) -> String {
        let mut out = String::new();
        for path in self.resolve_all() {
            match Url::from_file_path(&path) {
                Ok(url) => {
                    out.push_str(url.as_str());
                    out.push_str("\r\n");
                }
                Err(()) => {
                    tracing::warn!(target: targets::INPUT, path = %path.display(), "skipping non-absolute export path");
                }
            }
        }
        out
    }
}

/// Thumbnail shown under the pointer while dragging.
#[derive(Debug, Clone, PartialEq)]
pub struct DragImage {
    pub size: Size,
    pub label: String,
}

impl DragImage {
    /// A badge naming the number of exported files.
    pub fn for_payload(payload: &DragPayload) -> Self {
        let label = match payload.len() {
            1 => match &payload.entries()[0] {
                ExportEntry::Ready(path) => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "1 file".to_owned()),
                ExportEntry::Lazy(lazy) => lazy.name().to_owned(),
            },
            n => format!("{n} files"),
        };
        Self {
            size: Size::new(160.0, 24.0),
            label,
        }
    }
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Dropped,
    Cancelled,
}

/// The platform's drag gesture machinery.
pub trait DragRecognizer: Send {
    /// Pointer travel in pixels that turns a press into a drag.
    fn threshold(&self) -> f32 {
        DEFAULT_DRAG_THRESHOLD
    }

    /// Whether the platform can render a drag thumbnail.
    fn supports_drag_image(&self) -> bool;

    /// Hand a payload to the platform and start the drag.
    fn start_drag(&mut self, payload: DragPayload, image: Option<DragImage>) -> std::result::Result<(), DragError>;
}

/// A drag handed to a [`RecordingRecognizer`].
#[derive(Debug, Clone)]
pub struct StartedDrag {
    pub payload: DragPayload,
    pub image: Option<DragImage>,
}

/// In-memory recognizer that records every drag it is asked to start.
///
/// Clones share the same record, so a test can keep one clone and hand the
/// other to an arbiter.
#[derive(Debug, Clone)]
pub struct RecordingRecognizer {
    threshold: f32,
    drag_images: bool,
    failure: Option<DragError>,
    started: Arc<Mutex<Vec<StartedDrag>>>,
}

impl Default for RecordingRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRecognizer {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_DRAG_THRESHOLD,
            drag_images: true,
            failure: None,
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Simulate a platform without drag thumbnails.
    pub fn without_drag_images(mut self) -> Self {
        self.drag_images = false;
        self
    }

    /// Make every `start_drag` fail with `error`.
    pub fn failing_with(mut self, error: DragError) -> Self {
        self.failure = Some(error);
        self
    }

    /// All drags started so far.
    pub fn started(&self) -> Vec<StartedDrag> {
        self.started.lock().clone()
    }

    pub fn started_count(&self) -> usize {
        self.started.lock().len()
    }
}

impl DragRecognizer for RecordingRecognizer {
    fn threshold(&self) -> f32 {
        self.threshold
    }

    fn supports_drag_image(&self) -> bool {
        self.drag_images
    }

    fn start_drag(&mut self, payload: DragPayload, image: Option<DragImage>) -> std::result::Result<(), DragError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.started.lock().push(StartedDrag { payload, image });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lazy_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = LazyFile::new("movie.avi", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(PathBuf::from("/downloads/movie.avi"))
        });
        assert!(!lazy.is_resolved());
        assert_eq!(lazy.resolve().ok(), Some(PathBuf::from("/downloads/movie.avi")));
        assert_eq!(lazy.resolve().ok(), Some(PathBuf::from("/downloads/movie.avi")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(lazy.is_resolved());
    }

    #[test]
    fn test_lazy_failure_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = LazyFile::new("gone.txt", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::resolve("gone.txt", "download aborted"))
        });
        assert!(matches!(lazy.resolve(), Err(Error::Resolve { .. })));
        assert!(lazy.resolve().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_payload_order_and_resolve_all() {
        let mut payload = DragPayload::new();
        payload.push_path("/shared/a.txt");
        payload.push_lazy("b.txt", || Ok(PathBuf::from("/incomplete/b.txt")));
        payload.push_lazy("c.txt", || Err(Error::resolve("c.txt", "no save path")));
        payload.push_path("/shared/d.txt");

        assert_eq!(payload.len(), 4);
        assert_eq!(payload.ready_paths().len(), 2);
        assert_eq!(
            payload.resolve_all(),
            vec![
                PathBuf::from("/shared/a.txt"),
                PathBuf::from("/incomplete/b.txt"),
                PathBuf::from("/shared/d.txt"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_uri_list() {
        let mut payload = DragPayload::from_paths([PathBuf::from("/shared/my file.txt")]);
        payload.push_path("relative.txt");
        assert_eq!(payload.uri_list(), "file:///shared/my%20file.txt\r\n");
    }

    #[test]
    fn test_drag_image_label() {
        let single = DragPayload::from_paths([PathBuf::from("/shared/a.txt")]);
        assert_eq!(DragImage::for_payload(&single).label, "a.txt");
        let many = DragPayload::from_paths([PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(DragImage::for_payload(&many).label, "2 files");
    }

    #[test]
    fn test_recording_recognizer_shares_record() {
        let recorder = RecordingRecognizer::new().without_drag_images();
        let mut handle = recorder.clone();
        assert!(!handle.supports_drag_image());
        handle
            .start_drag(DragPayload::from_paths([PathBuf::from("/a")]), None)
            .expect("drag starts");
        assert_eq!(recorder.started_count(), 1);

        let mut failing = RecordingRecognizer::new().failing_with(DragError::Unsupported);
        assert_eq!(failing.start_drag(DragPayload::new(), None), Err(DragError::Unsupported));
    }
}
