//! Signal/slot system for Swarmdeck.
//!
//! Signals are the change-notification channel between row collections and
//! the views or observers bound to them. A signal owns any number of slots
//! (closures); [`Signal::emit`] invokes each connected slot synchronously, in
//! connection order, on the calling thread.
//!
//! All model mutation happens on the UI thread, so there is no queued or
//! cross-thread delivery here. Background work hands its results to the UI
//! thread first and only then mutates a model, which in turn emits.
//!
//! # Example
//!
//! ```
//! use swarmdeck_core::Signal;
//!
//! let rows_changed = Signal::<usize>::new();
//!
//! let id = rows_changed.connect(|count| {
//!     println!("{count} rows now");
//! });
//!
//! rows_changed.emit(3);
//! rows_changed.disconnect(id);
//! ```
//!
//! # Re-entrancy
//!
//! The slot list is snapshotted before invocation, so a slot may connect or
//! disconnect slots (including itself) while the signal is being emitted.
//! Changes take effect on the next emission.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle returned by [`Signal::connect`], accepted by [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
/// Slots tagged with their connection sequence. `SlotMap` reuses freed
/// entries, so iteration order alone is not connection order.
type SlotTable<Args> = Mutex<SlotMap<ConnectionId, (u64, Slot<Args>)>>;

/// A notification source with any number of listeners.
///
/// Listeners receive `&Args`. Row collections use tuples such as
/// `(first, count)`; argument-less notifications use `()`.
pub struct Signal<Args> {
    /// All active connections. Shared with [`ConnectionGuard`]s through a weak
    /// reference so a guard never outlives the table it points into.
    slots: Arc<SlotTable<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
    next_seq: AtomicU64,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// A signal nobody listens to yet.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(SlotMap::with_key())),
            blocked: AtomicBool::new(false),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Registers `slot` until [`disconnect`](Self::disconnect) is called
    /// with the returned id.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let slot: Slot<Args> = Arc::new(slot);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.slots.lock().insert((seq, slot))
    }

    /// Like [`connect`](Self::connect), but the slot lives only as long as
    /// the returned guard.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicI32, Ordering};
    /// use swarmdeck_core::Signal;
    ///
    /// let signal = Signal::<i32>::new();
    /// let total = Arc::new(AtomicI32::new(0));
    /// {
    ///     let total = total.clone();
    ///     let _guard = signal.connect_scoped(move |&n| {
    ///         total.fetch_add(n, Ordering::SeqCst);
    ///     });
    ///     signal.emit(42);
    /// }
    /// signal.emit(43);
    /// assert_eq!(total.load(Ordering::SeqCst), 42);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        let table: Weak<SlotTable<Args>> = Arc::downgrade(&self.slots);
        ConnectionGuard {
            disconnect: Some(Box::new(move || {
                if let Some(table) = table.upgrade() {
                    table.lock().remove(id);
                }
            })),
        }
    }

    /// `false` if `id` was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Drops every listener.
    pub fn disconnect_all(&self) {
        self.slots.lock().clear();
    }

    /// Live listener count.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Suppresses [`emit`](Self::emit) until unblocked. Emissions made while
    /// blocked are lost, not queued.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Calls every listener with `args`, oldest connection first.
    #[tracing::instrument(skip_all, target = "swarmdeck_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        // Snapshot so slots can (dis)connect without deadlocking on the table.
        let mut snapshot: Vec<(u64, Slot<Args>)> = self.slots.lock().values().cloned().collect();
        snapshot.sort_unstable_by_key(|(seq, _)| *seq);
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        for (_, slot) in snapshot {
            slot(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);

/// Disconnects its slot on drop.
///
/// Views hold guards for their model subscriptions, so dropping a view
/// detaches it from the model. The guard does not keep the signal alive; if
/// the signal is dropped first, dropping the guard is a no-op.
#[must_use = "the connection is removed as soon as the guard is dropped"]
pub struct ConnectionGuard {
    disconnect: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ConnectionGuard {
    /// Detach the guard; the slot then stays connected until the signal dies.
    pub fn forget(mut self) {
        self.disconnect = None;
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl std::fmt::Debug for ConnectionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("active", &self.disconnect.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> (ConnectionId, Arc<Mutex<Vec<T>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = signal.connect(move |value: &T| sink.lock().push(value.clone()));
        (id, seen)
    }

    #[test]
    fn test_row_ranges_delivered_in_order() {
        let inserted = Signal::<(usize, usize)>::new();
        let (_, seen) = recorder(&inserted);

        inserted.emit((0, 3));
        inserted.emit((3, 1));

        assert_eq!(*seen.lock(), vec![(0, 3), (3, 1)]);
    }

    #[test]
    fn test_disconnected_listener_misses_later_rows() {
        let removed = Signal::<usize>::new();
        let (id, seen) = recorder(&removed);

        removed.emit(7);
        assert!(removed.disconnect(id));
        removed.emit(8);

        assert!(!removed.disconnect(id));
        assert_eq!(*seen.lock(), vec![7]);
        assert_eq!(removed.connection_count(), 0);
    }

    #[test]
    fn test_blocked_emissions_are_dropped() {
        let reset = Signal::<&'static str>::new();
        let (_, seen) = recorder(&reset);

        reset.set_blocked(true);
        assert!(reset.is_blocked());
        reset.emit("while blocked");
        reset.set_blocked(false);
        reset.emit("after");

        assert_eq!(*seen.lock(), vec!["after"]);
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for n in 0..4 {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(n));
        }

        signal.emit(());
        assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reused_slot_keeps_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let listener = |name: &'static str| {
            let order = order.clone();
            move |_: &()| order.lock().push(name)
        };

        let old_view = signal.connect(listener("old view"));
        signal.connect(listener("summary"));
        assert!(signal.disconnect(old_view));
        signal.connect(listener("new view"));

        signal.emit(());
        assert_eq!(*order.lock(), vec!["summary", "new view"]);
    }

    #[test]
    fn test_dropping_view_guard_detaches() {
        let updated = Signal::<usize>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let view_guard = {
            let seen = seen.clone();
            updated.connect_scoped(move |&row| seen.lock().push(row))
        };
        updated.emit(2);
        assert_eq!(updated.connection_count(), 1);

        drop(view_guard);
        updated.emit(5);
        assert_eq!(*seen.lock(), vec![2]);
        assert_eq!(updated.connection_count(), 0);
    }

    #[test]
    fn test_forgotten_guard_stays_connected() {
        let signal = Signal::<u8>::new();
        let (_, seen) = recorder(&signal);
        signal.connect_scoped(|_| {}).forget();

        signal.emit(1);
        assert_eq!(signal.connection_count(), 2);
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_guard_outliving_signal() {
        let signal = Signal::<()>::new();
        let guard = signal.connect_scoped(|_| {});
        drop(signal);
        drop(guard);
    }

    #[test]
    fn test_disconnect_during_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let hits = Arc::new(Mutex::new(0));

        let weak = Arc::downgrade(&signal);
        signal.connect(move |_| {
            if let Some(signal) = weak.upgrade() {
                signal.disconnect_all();
            }
        });
        let hits_clone = hits.clone();
        signal.connect(move |_| *hits_clone.lock() += 1);

        // Snapshot taken before the first slot disconnects everything.
        signal.emit(());
        signal.emit(());
        assert_eq!(*hits.lock(), 1);
    }
}
