//! Core of an on-screen virtual keyboard widget.
//!
//! A [`Keyboard`] maps a row-based [`Layout`] onto pixel geometry, tracks the
//! state of every key, and collects typed characters in a text buffer,
//! calling a consumer whenever the text changes. Hosts feed it normalized
//! [`Event`]s and hand it a [`render::Canvas`] to draw into; only the regions
//! that changed are redrawn.

pub mod buffer;
pub mod error;
pub mod event;
pub use geom;
pub mod key;
pub mod keyboard;
pub mod layout;
pub mod measure;
pub mod navigation;
pub mod presets;
pub mod render;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Public exports
pub use buffer::TextBuffer;
pub use error::{Error, Result};
pub use event::{CursorMotion, Event, EventAdapter, InputEvent};
pub use key::{Key, KeyState};
pub use keyboard::{Keyboard, KeyboardBuilder, Variant};
pub use layout::{KeyKind, KeySpec, Layout, LayoutBuilder, LayoutConfig};
pub use measure::TextMeasure;
pub use render::{Canvas, Color, Renderer, Theme};

// Export commonly used geometry types at the root
pub use geom::{Direction, Expanse, Point, Rect};
