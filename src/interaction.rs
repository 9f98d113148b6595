//! Pointer state machine: right-drag rotates the bomb, left-click picks a
//! zone, the wheel is swallowed.
//!
//! The controller only turns raw events into [`PointerAction`]s; applying
//! them (spinning the pivot, casting the pick ray) is the caller's business.

use winit::dpi::PhysicalPosition;
use winit::event::{MouseButton, WindowEvent};

/// Where a drag currently stands. `Rotating` carries the cursor position the
/// next delta is measured against, so the state can never be "rotating but
/// with no anchor".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Rotating { last: PhysicalPosition<f64> },
}

/// What the caller should do about the event it just fed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    None,
    /// Apply this cursor delta (in pixels) to the scene rotation.
    Rotate { dx: f32, dy: f32 },
    /// Run a pick at this cursor position.
    Click { position: PhysicalPosition<f64> },
}

pub struct InteractionController {
    state: DragState,
    cursor: PhysicalPosition<f64>,
    attached: bool,
    pub sensitivity: f32,
}

impl InteractionController {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            state: DragState::Idle,
            cursor: PhysicalPosition::new(0.0, 0.0),
            attached: true,
            sensitivity,
        }
    }

    /// Dispatch a window event to the matching handler. Events the
    /// controller does not care about fall through as [`PointerAction::None`].
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> PointerAction {
        match event {
            WindowEvent::CursorMoved { position, .. } => self.on_cursor_moved(*position),
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_button(*button, state.is_pressed())
            }
            WindowEvent::CursorLeft { .. } => {
                self.on_cursor_left();
                PointerAction::None
            }
            WindowEvent::MouseWheel { .. } => self.on_wheel(),
            _ => PointerAction::None,
        }
    }

    pub fn on_button(&mut self, button: MouseButton, pressed: bool) -> PointerAction {
        if !self.attached {
            return PointerAction::None;
        }
        match (button, pressed) {
            (MouseButton::Right, true) => {
                self.state = DragState::Rotating { last: self.cursor };
                PointerAction::None
            }
            (MouseButton::Right, false) => {
                self.state = DragState::Idle;
                PointerAction::None
            }
            (MouseButton::Left, true) => PointerAction::Click {
                position: self.cursor,
            },
            _ => PointerAction::None,
        }
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) -> PointerAction {
        if !self.attached {
            return PointerAction::None;
        }
        self.cursor = position;
        if let DragState::Rotating { last } = &mut self.state {
            let dx = (position.x - last.x) as f32;
            let dy = (position.y - last.y) as f32;
            *last = position;
            return PointerAction::Rotate { dx, dy };
        }
        PointerAction::None
    }

    /// Leaving the window ends any drag; re-entry starts clean.
    pub fn on_cursor_left(&mut self) {
        if self.attached {
            self.state = DragState::Idle;
        }
    }

    /// Scroll is swallowed: the viewer never zooms, and the wheel must not
    /// leak through to whatever hosts the window.
    pub fn on_wheel(&mut self) -> PointerAction {
        PointerAction::None
    }

    /// Stop reacting to input, as if the listeners were torn off. Any drag
    /// in progress is abandoned.
    pub fn detach(&mut self) {
        self.state = DragState::Idle;
        self.attached = false;
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_rotating(&self) -> bool {
        matches!(self.state, DragState::Rotating { .. })
    }
}
