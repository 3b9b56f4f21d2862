//! Cell values computed off the UI thread.
//!
//! Some cells are expensive to derive (a file type description, a media
//! duration read from disk). [`DeferredCells`] runs those computations on the
//! rayon pool and sends the results back over a channel. Nothing is written
//! into a row from a worker thread: the UI thread calls
//! [`DeferredCells::drain`] on its own schedule and the results are applied
//! there.
//!
//! Each request returns a [`CancellationToken`]. A row keeps the tokens of
//! its outstanding requests and cancels them in `cleanup()`; cancelled
//! results are never applied.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use swarmdeck_core::CancellationToken;
use swarmdeck_core::logging::targets;

use crate::model::{CellValue, Row, RowCollection};

/// A row that accepts deferred cell values.
pub trait DeferredRow: Row {
    /// Key identifying the row across re-binding and reordering.
    type Key: PartialEq + Send + 'static;

    /// Whether this row is the one `key` was requested for.
    fn has_key(&self, key: &Self::Key) -> bool;

    /// Store a computed value.
    fn set_deferred(&mut self, column: usize, value: CellValue);
}

struct Completed<K> {
    key: K,
    column: usize,
    value: CellValue,
    token: CancellationToken,
}

/// Background cell computations for one collection.
pub struct DeferredCells<K> {
    sender: Sender<Completed<K>>,
    receiver: Receiver<Completed<K>>,
    pending: Arc<AtomicUsize>,
}

impl<K: Send + 'static> Default for DeferredCells<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Send + 'static> DeferredCells<K> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Compute `column` of the row identified by `key` in the background.
    ///
    /// `compute` may poll the token to stop early.
    pub fn request<F>(&self, key: K, column: usize, compute: F) -> CancellationToken
    where
        F: FnOnce(&CancellationToken) -> CellValue + Send + 'static,
    {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let sender = self.sender.clone();
        let pending = self.pending.clone();
        pending.fetch_add(1, Ordering::AcqRel);

        rayon::spawn(move || {
            if !worker_token.is_cancelled() {
                let value = compute(&worker_token);
                if !worker_token.is_cancelled() {
                    let _ = sender.send(Completed {
                        key,
                        column,
                        value,
                        token: worker_token,
                    });
                }
            }
            pending.fetch_sub(1, Ordering::AcqRel);
        });
        token
    }

    /// Number of computations still running or queued on the pool.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Whether completed results are waiting to be drained.
    pub fn has_results(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Apply every completed result to `collection`. Call on the UI thread.
    ///
    /// Results for cancelled requests or rows no longer in the collection are
    /// dropped. Returns the number applied.
    pub fn drain<R>(&self, collection: &RowCollection<R>) -> usize
    where
        R: DeferredRow<Key = K>,
    {
        let mut applied = 0;
        for done in self.receiver.try_iter() {
            if done.token.is_cancelled() {
                continue;
            }
            let Completed { key, column, value, .. } = done;
            let found = collection.modify(|row| row.has_key(&key), |row| row.set_deferred(column, value));
            match found {
                Some(_) => applied += 1,
                None => {
                    tracing::trace!(target: targets::MODEL, column, "deferred value for a row that is gone");
                }
            }
        }
        applied
    }
}

impl<K> fmt::Debug for DeferredCells<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredCells")
            .field("pending", &self.pending.load(Ordering::Acquire))
            .field("completed", &self.receiver.len())
            .finish()
    }
}
