//! Swarmdeck - live table bindings for a peer-to-peer file-sharing client.
//!
//! The networking core owns downloads, uploads and the shared library. This
//! crate projects them into tables that stay consistent while the data under
//! them changes every second:
//!
//! - [`model`]: rows, typed cells and the sortable [`RowCollection`]
//! - [`view`]: the [`TableView`] and its selection layer, which never
//!   reports a row past the end of the table
//! - [`input`]: the pointer pipeline and the drag/selection arbiter
//! - [`deferred`]: cell values computed off the UI thread
//! - [`transfer`]: download, upload and library rows, and the
//!   [`TransferWindow`] mediator
//! - [`settings`]: TOML preferences
//!
//! # Example
//!
//! ```
//! use swarmdeck::{RecordingRecognizer, Settings, TransferWindow};
//! use swarmdeck::transfer::DownloadRow;
//!
//! let settings = Settings::default();
//! let mut downloads: TransferWindow<DownloadRow> =
//!     TransferWindow::downloads(&settings, RecordingRecognizer::new());
//!
//! // Called by the application's refresh timer.
//! downloads.tick();
//! assert!(!downloads.is_clear_enabled());
//! ```
//!
//! All operations run on the UI thread. The only background work is
//! [`deferred::DeferredCells`], whose results are applied on the UI thread.

pub mod deferred;
mod error;
pub mod input;
pub mod model;
pub mod settings;
pub mod transfer;
pub mod view;

pub use error::{DragError, Error, Result};

pub use deferred::{DeferredCells, DeferredRow};
pub use input::{
    DragArbiter, DragPayload, DragRecognizer, DragSurface, InputPipeline, PointerEvent,
    RecordingRecognizer,
};
pub use model::{CellValue, ColumnSpec, ModelSignals, Row, RowCollection, SortOrder};
pub use settings::{InputSettings, RefreshSettings, Settings, TableSettings};
pub use transfer::{ActivitySummary, LibraryTable, TransferWindow};
pub use view::{SelectionFlags, SelectionMode, SelectionModel, TableView};

pub use swarmdeck_core::{CancellationToken, ConnectionGuard, Point, Signal, Size};

static_assertions::assert_impl_all!(RowCollection<transfer::DownloadRow>: Send, Sync);
static_assertions::assert_impl_all!(TableView<transfer::LibraryRow>: Send);
