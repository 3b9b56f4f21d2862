//! Drag versus selection arbitration.
//!
//! A press on an already selected row is ambiguous: it may start a drag of
//! the selection, or it may be a plain click that should collapse the
//! selection to that row. [`DragArbiter`] runs before the selection handler
//! and resolves the ambiguity:
//!
//! ```text
//!            press on selection                 move >= threshold
//!   Idle ─────────────────────────► Armed ─────────────────────────► Dragging
//!    ▲    (press consumed, kept)      │                                 │
//!    │                                │ release before threshold        │
//!    ├────────────────────────────────┘ (press un-consumed, replayed)   │
//!    │                                                                  │
//!    └──────────────────── drop / cancel / release ─────────────────────┘
//! ```
//!
//! While armed, the retained press is owned by the arbiter alone. A move
//! without the left button held means the release went elsewhere; the press
//! is replayed as a click. Cancelling from any state returns to `Idle` and
//! drops it.

use std::fmt;

use swarmdeck_core::Point;
use swarmdeck_core::logging::targets;

use super::drag::{DragImage, DragOutcome, DragPayload, DragRecognizer};
use super::event::{MouseButton, PointerEvent, PointerKind};
use crate::error::DragError;
use crate::settings::InputSettings;

/// A widget the arbiter can drag from.
///
/// Table and tree views differ only in how they answer these two questions.
pub trait DragSurface {
    /// Whether `point` lies on an already selected item.
    fn is_in_selection(&self, point: Point) -> bool;

    /// The files the current selection exports.
    fn export_payload(&self) -> DragPayload;
}

/// Arbitration state.
#[derive(Debug, Clone, Default)]
pub enum ArbiterState {
    #[default]
    Idle,
    /// A press landed on the selection and was consumed.
    Armed { press: PointerEvent },
    /// The platform is running a drag.
    Dragging,
}

/// State without the retained event, for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterPhase {
    Idle,
    Armed,
    Dragging,
}

/// Decides per gesture whether pointer input selects rows or drags them.
pub struct DragArbiter {
    state: ArbiterState,
    recognizer: Box<dyn DragRecognizer>,
    threshold: f32,
    drag_images: bool,
    last_error: Option<DragError>,
}

impl DragArbiter {
    /// Creates an arbiter using the recognizer's own threshold.
    pub fn new(recognizer: impl DragRecognizer + 'static) -> Self {
        let threshold = recognizer.threshold();
        Self {
            state: ArbiterState::Idle,
            recognizer: Box::new(recognizer),
            threshold,
            drag_images: true,
            last_error: None,
        }
    }

    /// Applies the `[input]` settings section.
    pub fn with_settings(mut self, settings: &InputSettings) -> Self {
        self.apply_settings(settings);
        self
    }

    pub fn apply_settings(&mut self, settings: &InputSettings) {
        self.threshold = settings.drag_threshold.max(0.0);
        self.drag_images = settings.drag_images;
    }

    pub fn state(&self) -> &ArbiterState {
        &self.state
    }

    pub fn phase(&self) -> ArbiterPhase {
        match self.state {
            ArbiterState::Idle => ArbiterPhase::Idle,
            ArbiterState::Armed { .. } => ArbiterPhase::Armed,
            ArbiterState::Dragging => ArbiterPhase::Dragging,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Why the most recent drag attempt did not start, if it failed.
    /// Cleared when the next press arms.
    pub fn last_error(&self) -> Option<&DragError> {
        self.last_error.as_ref()
    }

    /// Feed one event through the arbiter.
    ///
    /// May consume `event`. Returns the retained press, already un-consumed,
    /// when it must be replayed to the input listeners before `event`
    /// continues.
    pub fn handle<S>(&mut self, surface: &S, event: &mut PointerEvent) -> Option<PointerEvent>
    where
        S: DragSurface + ?Sized,
    {
        match (event.kind, &self.state) {
            (PointerKind::Press, ArbiterState::Idle) => {
                if event.button == Some(MouseButton::Left) && surface.is_in_selection(event.position) {
                    event.consume();
                    self.last_error = None;
                    self.state = ArbiterState::Armed { press: *event };
                    tracing::trace!(target: targets::INPUT, position = ?event.position, "armed for drag");
                }
                None
            }
            (PointerKind::Press, ArbiterState::Armed { .. }) => {
                // A second press without a release in between. Give up on the
                // first gesture and judge this press on its own.
                tracing::debug!(target: targets::INPUT, "unexpected press while armed, disarming");
                self.state = ArbiterState::Idle;
                self.handle(surface, event)
            }
            (PointerKind::Move, ArbiterState::Armed { .. }) if event.button != Some(MouseButton::Left) => {
                let ArbiterState::Armed { mut press } = std::mem::take(&mut self.state) else {
                    return None;
                };
                press.unconsume();
                tracing::debug!(target: targets::INPUT, "button released elsewhere, replaying press");
                Some(press)
            }
            (PointerKind::Move, ArbiterState::Armed { press }) => {
                if press.position.distance_to(event.position) < self.threshold {
                    event.consume();
                    return None;
                }
                self.begin_drag(surface, event)
            }
            (PointerKind::Release, ArbiterState::Armed { .. }) => {
                let ArbiterState::Armed { mut press } = std::mem::take(&mut self.state) else {
                    return None;
                };
                press.unconsume();
                tracing::trace!(target: targets::INPUT, "click on selection, replaying press");
                Some(press)
            }
            (PointerKind::Release, ArbiterState::Dragging) => {
                event.consume();
                self.state = ArbiterState::Idle;
                None
            }
            (PointerKind::Press | PointerKind::Move, ArbiterState::Dragging) => {
                event.consume();
                None
            }
            (PointerKind::Exit, _)
            | (PointerKind::Move | PointerKind::Release, ArbiterState::Idle) => None,
        }
    }

    fn begin_drag<S>(&mut self, surface: &S, event: &mut PointerEvent) -> Option<PointerEvent>
    where
        S: DragSurface + ?Sized,
    {
        let ArbiterState::Armed { mut press } = std::mem::take(&mut self.state) else {
            return None;
        };

        let payload = surface.export_payload();
        if payload.is_empty() {
            // Nothing to export; behave as if the press had not been armed.
            tracing::debug!(target: targets::INPUT, "selection exports nothing, replaying press");
            self.last_error = Some(DragError::EmptyPayload);
            press.unconsume();
            return Some(press);
        }

        let image = if !self.drag_images {
            None
        } else if self.recognizer.supports_drag_image() {
            Some(DragImage::for_payload(&payload))
        } else {
            tracing::debug!(target: targets::INPUT, "platform has no drag images, dragging without thumbnail");
            None
        };

        let count = payload.len();
        match self.recognizer.start_drag(payload, image) {
            Ok(()) => {
                event.consume();
                self.state = ArbiterState::Dragging;
                tracing::debug!(target: targets::INPUT, files = count, "drag started");
            }
            Err(err) => {
                tracing::warn!(target: targets::INPUT, error = %err, "platform refused drag");
                self.last_error = Some(err);
            }
        }
        None
    }

    /// The platform reports the drag ended.
    pub fn drag_finished(&mut self, outcome: DragOutcome) {
        match self.state {
            ArbiterState::Dragging => {
                tracing::debug!(target: targets::INPUT, ?outcome, "drag finished");
                self.state = ArbiterState::Idle;
            }
            _ => {
                tracing::debug!(target: targets::INPUT, ?outcome, "ignoring drag end outside a drag");
            }
        }
    }

    /// Abort whatever gesture is in progress. Returns `false` if idle.
    pub fn cancel(&mut self) -> bool {
        let was = self.phase();
        self.state = ArbiterState::Idle;
        if was != ArbiterPhase::Idle {
            tracing::debug!(target: targets::INPUT, from = ?was, "gesture cancelled");
        }
        was != ArbiterPhase::Idle
    }
}

impl fmt::Debug for DragArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragArbiter")
            .field("state", &self.state)
            .field("threshold", &self.threshold)
            .field("drag_images", &self.drag_images)
            .field("last_error", &self.last_error)
            .finish()
    }
}
