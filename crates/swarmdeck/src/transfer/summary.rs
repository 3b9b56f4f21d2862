//! "N active / M total" status line for a transfer collection.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use swarmdeck_core::{ConnectionGuard, Signal};

use crate::model::{Row, RowCollection};

#[derive(Default)]
struct Counts {
    active: AtomicUsize,
    total: AtomicUsize,
    /// Emitted with `(active, total)` whenever either count changes.
    changed: Signal<(usize, usize)>,
}

impl Counts {
    fn recount<R: Row>(&self, model: &RowCollection<R>) {
        let total = model.row_count();
        let active = total.saturating_sub(model.inactive_count());
        let old_total = self.total.swap(total, Ordering::AcqRel);
        let old_active = self.active.swap(active, Ordering::AcqRel);
        if old_total != total || old_active != active {
            self.changed.emit((active, total));
        }
    }
}

fn recounter<R: Row>(
    counts: &Arc<Counts>,
    model: &Arc<RowCollection<R>>,
) -> impl Fn() + Send + Sync + use<R> {
    let counts = counts.clone();
    let model: Weak<RowCollection<R>> = Arc::downgrade(model);
    move || {
        if let Some(model) = model.upgrade() {
            counts.recount(&model);
        }
    }
}

/// Read-only observer of a collection. Never mutates what it watches.
pub struct ActivitySummary {
    counts: Arc<Counts>,
    _subscriptions: Vec<ConnectionGuard>,
}

impl ActivitySummary {
    pub fn new<R: Row>(model: &Arc<RowCollection<R>>) -> Self {
        let counts = Arc::new(Counts::default());
        counts.recount(model);

        let signals = model.signals();
        let subscriptions = vec![
            {
                let recount = recounter(&counts, model);
                signals.rows_inserted.connect_scoped(move |_| recount())
            },
            {
                let recount = recounter(&counts, model);
                signals.rows_removed.connect_scoped(move |_| recount())
            },
            {
                let recount = recounter(&counts, model);
                signals.rows_updated.connect_scoped(move |_| recount())
            },
            {
                let recount = recounter(&counts, model);
                signals.model_reset.connect_scoped(move |_| recount())
            },
        ];

        Self {
            counts,
            _subscriptions: subscriptions,
        }
    }

    pub fn active(&self) -> usize {
        self.counts.active.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.counts.total.load(Ordering::Acquire)
    }

    pub fn changed(&self) -> &Signal<(usize, usize)> {
        &self.counts.changed
    }

    pub fn text(&self) -> String {
        format!("{} active / {} total", self.active(), self.total())
    }
}

impl fmt::Debug for ActivitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivitySummary")
            .field("active", &self.active())
            .field("total", &self.total())
            .finish()
    }
}
