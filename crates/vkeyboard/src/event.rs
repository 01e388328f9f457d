//! Input events.
//!
//! Hosts describe their native input with the [`InputEvent`] family of types
//! and pass it through an [`EventAdapter`], which produces the small
//! [`Event`] vocabulary the keyboard consumes. Events the keyboard has no use
//! for translate to `None`.

use tracing::trace;

use crate::geom::{Direction, Expanse, Point};

/// Cursor motion within the text box.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CursorMotion {
    /// One character towards the start.
    Left,
    /// One character towards the end.
    Right,
    /// To the start of the text.
    Home,
    /// To the end of the text.
    End,
}

/// A normalized keyboard event.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Event {
    /// Pointer pressed at a location.
    PointerDown(Point),
    /// Pointer released at a location.
    PointerUp(Point),
    /// Move the selection highlight.
    DirectionalMove(Direction),
    /// Press and release the selected key.
    DirectionalActivate,
    /// Move the text cursor.
    Cursor(CursorMotion),
}

/// Mouse button codes.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Button {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
    /// No button (for move/scroll).
    None,
}

/// Mouse action kinds.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Action {
    /// Button press.
    Down,
    /// Button release.
    Up,
    /// Mouse drag with button held.
    Drag,
    /// Mouse moved without button.
    Moved,
    /// Scroll wheel down.
    ScrollDown,
    /// Scroll wheel up.
    ScrollUp,
}

/// A host mouse event in surface pixels.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct MouseEvent {
    /// Mouse action type.
    pub action: Action,
    /// Mouse button.
    pub button: Button,
    /// Location on the surface.
    pub location: Point,
}

/// Touch phases.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum TouchAction {
    /// Finger down.
    Down,
    /// Finger up.
    Up,
    /// Finger moved.
    Motion,
}

/// Host key codes the keyboard reacts to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum KeyCode {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Enter or return.
    Enter,
    /// Anything else.
    Other,
}

/// A native host event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Mouse input.
    Mouse(MouseEvent),
    /// A key press.
    Key(KeyCode),
    /// Touch input. Coordinates are normalized to `0.0..=1.0` of the surface.
    Touch {
        /// Touch phase.
        action: TouchAction,
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
}

/// Translates host events for a surface of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventAdapter {
    /// Surface size, used to scale touch coordinates.
    surface: Expanse,
    /// Route arrows and enter to the selection instead of the cursor.
    navigation: bool,
}

impl EventAdapter {
    /// An adapter for a surface, with or without directional navigation.
    pub fn new(surface: Expanse, navigation: bool) -> Self {
        Self {
            surface,
            navigation,
        }
    }

    /// Update the surface size after a resize.
    pub fn set_surface(&mut self, surface: Expanse) {
        self.surface = surface;
    }

    /// Is directional navigation on?
    pub fn navigation(&self) -> bool {
        self.navigation
    }

    /// Translate one host event.
    pub fn translate(&self, e: &InputEvent) -> Option<Event> {
        let ev = match *e {
            InputEvent::Mouse(m) => match (m.action, m.button) {
                (Action::Down, Button::Left) => Some(Event::PointerDown(m.location)),
                (Action::Up, Button::Left) => Some(Event::PointerUp(m.location)),
                _ => None,
            },
            InputEvent::Touch { action, x, y } => {
                let p = self.scale(x, y);
                match action {
                    TouchAction::Down => Some(Event::PointerDown(p)),
                    TouchAction::Up => Some(Event::PointerUp(p)),
                    TouchAction::Motion => None,
                }
            }
            InputEvent::Key(k) => self.translate_key(k),
        };
        trace!(?e, ?ev, "translated event");
        ev
    }

    /// Translate a batch of host events, dropping the ones that don't apply.
    pub fn translate_all<'a>(&self, events: impl IntoIterator<Item = &'a InputEvent>) -> Vec<Event> {
        events.into_iter().filter_map(|e| self.translate(e)).collect()
    }

    /// Map a key to directional navigation or cursor motion.
    fn translate_key(&self, k: KeyCode) -> Option<Event> {
        let nav = |d| {
            if self.navigation {
                Some(Event::DirectionalMove(d))
            } else {
                None
            }
        };
        match k {
            KeyCode::Up => nav(Direction::Up),
            KeyCode::Down => nav(Direction::Down),
            KeyCode::Left => nav(Direction::Left).or(Some(Event::Cursor(CursorMotion::Left))),
            KeyCode::Right => nav(Direction::Right).or(Some(Event::Cursor(CursorMotion::Right))),
            KeyCode::Home => Some(Event::Cursor(CursorMotion::Home)),
            KeyCode::End => Some(Event::Cursor(CursorMotion::End)),
            KeyCode::Enter if self.navigation => Some(Event::DirectionalActivate),
            KeyCode::Enter | KeyCode::Other => None,
        }
    }

    /// Scale normalized touch coordinates to surface pixels.
    fn scale(&self, x: f32, y: f32) -> Point {
        let px = |v: f32, extent: u32| (v.clamp(0.0, 1.0) * extent as f32) as u32;
        Point {
            x: px(x, self.surface.w).min(self.surface.w.saturating_sub(1)),
            y: px(y, self.surface.h).min(self.surface.h.saturating_sub(1)),
        }
    }
}
