//! Row and collection model.
//!
//! This module provides the data side of every live table:
//!
//! - [`Row`]: projection of one domain object into typed cells
//! - [`CellValue`]: a typed, sortable cell value
//! - [`ColumnSpec`]: static column declarations of a row type
//! - [`RowCollection`]: the ordered, sortable table model
//! - [`ModelSignals`]: change notifications consumed by views
//!
//! # Data flow
//!
//! ```text
//! domain objects ──► Row::update ──► RowCollection ──► ModelSignals ──► views
//!                                         ▲
//!                         refresh tick ───┘
//! ```
//!
//! The collection is the only owner of rows. Views hold an `Arc` to the
//! collection and react to its signals; they never hold row references across
//! calls.

mod cell;
mod collection;
mod column;
mod row;
mod signals;

pub use cell::{CellValue, format_bytes, format_duration};
pub use collection::{RowCollection, SortOrder, SortState};
pub use column::{CellComparator, ColumnSpec, column_index};
pub use row::Row;
pub use signals::ModelSignals;
