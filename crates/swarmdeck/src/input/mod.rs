//! Pointer input and drag/selection arbitration.
//!
//! Two consumers react to the same presses on a table: the platform's drag
//! recognizer and the table's selection handler. This module keeps them from
//! corrupting each other's state:
//!
//! - [`PointerEvent`]: events with a first-class `consumed` flag
//! - [`InputPipeline`]: fixed listener order (arbiter, input, hover)
//! - [`DragArbiter`]: the `Idle`/`Armed`/`Dragging` state machine
//! - [`DragPayload`], [`DragRecognizer`]: what is exported and who exports it

mod arbiter;
mod drag;
mod event;
mod pipeline;

pub use arbiter::{ArbiterPhase, ArbiterState, DragArbiter, DragSurface};
pub use drag::{
    DEFAULT_DRAG_THRESHOLD, DragImage, DragOutcome, DragPayload, DragRecognizer, ExportEntry,
    LazyFile, RecordingRecognizer, StartedDrag, mime,
};
pub use event::{EventBase, KeyboardModifiers, MouseButton, PointerEvent, PointerKind};
pub use pipeline::{DispatchResult, HoverListener, InputListener, InputPipeline};
