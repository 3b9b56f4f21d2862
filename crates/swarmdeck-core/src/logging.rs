//! Logging facilities for Swarmdeck.
//!
//! Swarmdeck uses the `tracing` crate for instrumentation and never installs
//! a subscriber itself. Applications opt in:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("swarmdeck=debug,swarmdeck::input=trace")
//!     .init();
//! ```
//!
//! Levels follow one convention across crates: signal emission is `trace`,
//! model mutations are `debug`, degraded platform features and swallowed
//! cleanup failures are `warn`, invariant violations are `error`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "swarmdeck_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "swarmdeck_core::signal";
    /// Invariant violation reports.
    pub const INVARIANT: &str = "swarmdeck_core::invariant";
    /// Row collections (table models).
    pub const MODEL: &str = "swarmdeck::model";
    /// Table and tree views, selection, tooltips.
    pub const VIEW: &str = "swarmdeck::view";
    /// Pointer input pipeline and drag arbitration.
    pub const INPUT: &str = "swarmdeck::input";
    /// Download/upload/library bindings.
    pub const TRANSFER: &str = "swarmdeck::transfer";
    /// Settings loading.
    pub const SETTINGS: &str = "swarmdeck::settings";
}

/// Span names used throughout Swarmdeck for tracing.
pub mod span_names {
    /// One `refresh()` pass over a row collection.
    pub const REFRESH: &str = "swarmdeck::refresh";
    /// A full reorder of a row collection.
    pub const SORT: &str = "swarmdeck::sort";
    /// Dispatch of one pointer event through an input pipeline.
    pub const DISPATCH: &str = "swarmdeck::dispatch";
}
