//! Cooperative cancellation for background work.
//!
//! A [`CancellationToken`] is shared between the UI-side owner of a request
//! (typically a row) and the background closure computing its result. The
//! owner cancels on cleanup; the background side checks before doing work and
//! the UI side checks again before applying a result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A clonable token used to request cancellation of background work.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
