//! Bindings for the transfer and library windows.
//!
//! The networking core is consumed through narrow collaborator traits
//! ([`Downloader`], [`Uploader`]) and a stream of [`FileManagerEvent`]s. This
//! module projects those into rows and wires each collection to a
//! [`TransferWindow`].

mod download;
mod library;
mod summary;
mod upload;
mod window;

use std::fmt;

pub use download::{DOWNLOAD_COLUMNS, DownloadRow, DownloadState, Downloader, download_columns};
pub use library::{
    FileEventKind, FileManagerEvent, FileRecord, LIBRARY_COLUMNS, LibraryRow, LibraryTable,
    describe_file_type, library_columns,
};
pub use summary::ActivitySummary;
pub use upload::{UPLOAD_COLUMNS, UploadRow, UploadState, Uploader, upload_columns};
pub use window::TransferWindow;

/// Identity of one transfer as assigned by the networking core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(pub u64);

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_id_display() {
        assert_eq!(TransferId(17).to_string(), "#17");
        assert!(TransferId(1) < TransferId(2));
    }
}
