//! Ordered delivery of pointer events to a widget's listeners.
//!
//! Listener order is fixed:
//!
//! 1. the [`DragArbiter`], which may consume the event;
//! 2. input listeners (selection handling), skipped once the event is
//!    consumed;
//! 3. hover listeners (tooltips), which see every event, consumed or not.
//!
//! When the arbiter hands back a press to replay, that press goes through
//! the input listeners first, then the triggering event continues.

use swarmdeck_core::logging::{span_names, targets};

use super::arbiter::{DragArbiter, DragSurface};
use super::drag::DragOutcome;
use super::event::PointerEvent;

/// A listener that may act on, and consume, unconsumed events.
pub type InputListener<W> = Box<dyn FnMut(&mut W, &mut PointerEvent) + Send>;

/// A listener that observes every event.
pub type HoverListener<W> = Box<dyn FnMut(&mut W, &PointerEvent) + Send>;

/// What happened to one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// The event ended up consumed.
    pub consumed: bool,
    /// A previously consumed press was replayed before the event.
    pub replayed_press: bool,
}

/// The pointer pipeline of one widget.
pub struct InputPipeline<W> {
    arbiter: DragArbiter,
    input: Vec<InputListener<W>>,
    hover: Vec<HoverListener<W>>,
}

impl<W: DragSurface> InputPipeline<W> {
    pub fn new(arbiter: DragArbiter) -> Self {
        Self {
            arbiter,
            input: Vec::new(),
            hover: Vec::new(),
        }
    }

    pub fn arbiter(&self) -> &DragArbiter {
        &self.arbiter
    }

    pub fn arbiter_mut(&mut self) -> &mut DragArbiter {
        &mut self.arbiter
    }

    /// Appends an input listener. Listeners run in the order added.
    pub fn add_input_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&mut W, &mut PointerEvent) + Send + 'static,
    {
        self.input.push(Box::new(listener));
    }

    /// Appends a hover listener. Listeners run in the order added.
    pub fn add_hover_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&mut W, &PointerEvent) + Send + 'static,
    {
        self.hover.push(Box::new(listener));
    }

    /// Deliver `event` to `widget`'s listeners.
    pub fn dispatch(&mut self, widget: &mut W, mut event: PointerEvent) -> DispatchResult {
        let _span = tracing::trace_span!(target: targets::INPUT, span_names::DISPATCH, kind = ?event.kind).entered();

        let replay = self.arbiter.handle(&*widget, &mut event);
        let replayed_press = replay.is_some();
        if let Some(mut press) = replay {
            self.deliver_input(widget, &mut press);
        }

        self.deliver_input(widget, &mut event);
        for listener in &mut self.hover {
            listener(widget, &event);
        }

        DispatchResult {
            consumed: event.is_consumed(),
            replayed_press,
        }
    }

    fn deliver_input(&mut self, widget: &mut W, event: &mut PointerEvent) {
        for listener in &mut self.input {
            if event.is_consumed() {
                break;
            }
            listener(widget, event);
        }
    }

    /// Forward a platform drag-end notification.
    pub fn drag_finished(&mut self, outcome: DragOutcome) {
        self.arbiter.drag_finished(outcome);
    }

    /// Abort the current gesture.
    pub fn cancel(&mut self) -> bool {
        self.arbiter.cancel()
    }
}
