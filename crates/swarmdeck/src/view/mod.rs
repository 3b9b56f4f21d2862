//! Views bound to row collections.
//!
//! - [`TableView`]: a table over one [`RowCollection`](crate::model::RowCollection)
//! - [`SelectionModel`]: selection that never reports a row past the end
//! - [`ColumnMap`]: which model columns are shown, where, and how wide
//! - [`FolderTree`]: the folder picker tree
//! - [`render`]: pure cell descriptions and the tooltip policy

mod columns;
mod folder_tree;
pub mod render;
mod selection;
mod table;

pub use columns::{ColumnMap, MINIMUM_COLUMN_WIDTH};
pub use folder_tree::{FolderId, FolderTree};
pub use render::{
    Alignment, CellDescription, CellState, GraphemeMetrics, TextMeasure, Tone, clipped_tooltip,
    describe_cell, elide_right,
};
pub use selection::{SelectionChange, SelectionFlags, SelectionMode, SelectionModel};
pub use table::{DEFAULT_HEADER_HEIGHT, DEFAULT_ROW_HEIGHT, TableView};
