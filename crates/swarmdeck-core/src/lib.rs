//! Core systems for Swarmdeck.
//!
//! This crate provides the foundational pieces shared by every Swarmdeck
//! window binding:
//!
//! - **Signal/Slot System**: Type-safe change notification between row
//!   collections, views and read-only observers
//! - **Geometry**: Points and rectangles for hit-testing and drag thresholds
//! - **Logging**: `tracing` targets and span names per subsystem
//! - **Invariants**: Fatal-in-debug, logged-in-release reporting of
//!   programming errors
//! - **Cancellation**: Tokens shared with background work
//!
//! # Signal/Slot Example
//!
//! ```
//! use swarmdeck_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod cancel;
pub mod geometry;
pub mod invariant;
pub mod logging;
pub mod signal;

pub use cancel::CancellationToken;
pub use geometry::{Point, Rect, Size};
pub use invariant::InvariantViolation;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
