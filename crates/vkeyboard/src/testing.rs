//! Helpers for testing keyboards without a real display.

pub use crate::measure::MonospaceMeasure;
use crate::{
    Error, Result,
    geom::{Point, Rect},
    render::{Canvas, Color},
};

/// A recorded drawing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// A solid fill.
    Fill {
        /// Filled area.
        rect: Rect,
        /// Fill color.
        color: Color,
    },
    /// A run of text.
    Text {
        /// Top-left corner.
        at: Point,
        /// The text drawn.
        text: String,
        /// Font size.
        font_size: u32,
        /// Text color.
        color: Color,
    },
}

/// A canvas that records every call instead of drawing.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    /// Calls in the order they were made.
    pub ops: Vec<DrawOp>,
    /// Fail every call with a render error once this many calls are recorded.
    pub fail_after: Option<usize>,
}

impl RecordingCanvas {
    /// All fills, in order.
    pub fn fills(&self) -> Vec<(Rect, Color)> {
        self.ops
            .iter()
            .filter_map(|o| match o {
                DrawOp::Fill { rect, color } => Some((*rect, *color)),
                DrawOp::Text { .. } => None,
            })
            .collect()
    }

    /// All text runs, in order.
    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|o| match o {
                DrawOp::Text { text, .. } => Some(text.clone()),
                DrawOp::Fill { .. } => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Record a call, or fail if the failure threshold has been reached.
    fn record(&mut self, op: DrawOp) -> Result<()> {
        if self.fail_after.is_some_and(|n| self.ops.len() >= n) {
            return Err(Error::Render("canvas unavailable".into()));
        }
        self.ops.push(op);
        Ok(())
    }
}

impl Canvas for RecordingCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.record(DrawOp::Fill { rect, color })
    }

    fn draw_text(&mut self, at: Point, text: &str, font_size: u32, color: Color) -> Result<()> {
        self.record(DrawOp::Text {
            at,
            text: text.to_owned(),
            font_size,
            color,
        })
    }
}
