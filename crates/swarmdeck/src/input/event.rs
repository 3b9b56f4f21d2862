//! Pointer events as seen by the input pipeline.
//!
//! Events carry a first-class `consumed` flag. A listener that consumes an
//! event tells later input listeners not to act on it. Hover listeners
//! ignore the flag and see every event.

use swarmdeck_core::Point;

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyboardModifiers {
    pub shift: bool,
    /// Control (Cmd on macOS).
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyboardModifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Whether no modifier is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Common data for all pointer events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventBase {
    consumed: bool,
}

impl EventBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an earlier listener claimed the event.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Claim the event so later input listeners skip it.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Release a claim so the event can be delivered again.
    pub fn unconsume(&mut self) {
        self.consumed = false;
    }
}

/// What happened to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Release,
    Move,
    /// The pointer left the widget.
    Exit,
}

/// A pointer event in widget-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// The button that changed state. For moves, the held button, if any.
    pub button: Option<MouseButton>,
    pub position: Point,
    pub modifiers: KeyboardModifiers,
    pub base: EventBase,
}

impl PointerEvent {
    pub fn new(
        kind: PointerKind,
        button: Option<MouseButton>,
        position: Point,
        modifiers: KeyboardModifiers,
    ) -> Self {
        Self {
            kind,
            button,
            position,
            modifiers,
            base: EventBase::new(),
        }
    }

    /// A left-button press.
    pub fn press(position: Point, modifiers: KeyboardModifiers) -> Self {
        Self::new(PointerKind::Press, Some(MouseButton::Left), position, modifiers)
    }

    /// A left-button release.
    pub fn release(position: Point) -> Self {
        Self::new(
            PointerKind::Release,
            Some(MouseButton::Left),
            position,
            KeyboardModifiers::NONE,
        )
    }

    /// A move with the left button held.
    pub fn drag_move(position: Point) -> Self {
        Self::new(
            PointerKind::Move,
            Some(MouseButton::Left),
            position,
            KeyboardModifiers::NONE,
        )
    }

    /// A move with no button held.
    pub fn hover(position: Point) -> Self {
        Self::new(PointerKind::Move, None, position, KeyboardModifiers::NONE)
    }

    pub fn exit() -> Self {
        Self::new(PointerKind::Exit, None, Point::ZERO, KeyboardModifiers::NONE)
    }

    pub fn is_consumed(&self) -> bool {
        self.base.is_consumed()
    }

    pub fn consume(&mut self) {
        self.base.consume();
    }

    pub fn unconsume(&mut self) {
        self.base.unconsume();
    }
}
