//! Drawing.
//!
//! The keyboard owns no pixels. Hosts implement [`Canvas`] over their own
//! surface; a [`Renderer`] decides what keys, backgrounds and the text box
//! look like, and draws them through a [`Painter`].

/// Built-in themes.
mod theme;

pub use theme::{StateColors, Theme};

use crate::{
    Result,
    geom::{Frame, Point, Rect},
    key::Key,
    measure::TextMeasure,
};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Construct a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Macro to create a Color from a hex string at compile time
#[macro_export]
macro_rules! rgb {
    ($hex:literal) => {{
        const fn hex_char_to_num(c: u8) -> u8 {
            match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                b'A'..=b'F' => c - b'A' + 10,
                _ => panic!("Invalid hex character"),
            }
        }

        const fn parse_hex_byte(high: u8, low: u8) -> u8 {
            hex_char_to_num(high) * 16 + hex_char_to_num(low)
        }

        let bytes = $hex.as_bytes();
        let start = if bytes[0] == b'#' { 1 } else { 0 };

        if bytes.len() - start != 6 {
            panic!("Invalid hex color: must be 6 hex digits");
        }

        $crate::render::Color::new(
            parse_hex_byte(bytes[start], bytes[start + 1]),
            parse_hex_byte(bytes[start + 2], bytes[start + 3]),
            parse_hex_byte(bytes[start + 4], bytes[start + 5]),
        )
    }};
}

/// A host drawing surface.
pub trait Canvas {
    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    /// Draw text with its top-left corner at `at`.
    fn draw_text(&mut self, at: Point, text: &str, font_size: u32, color: Color) -> Result<()>;
}

/// The text box as it should appear on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextView<'a> {
    /// Outer rectangle of the box.
    pub rect: Rect,
    /// Area available to text.
    pub inner: Rect,
    /// The part of the text that is in view. It never extends past the right
    /// edge of `inner`.
    pub visible: &'a str,
    /// Character index of the first visible character.
    pub first: usize,
    /// Font size that fits the inner height.
    pub font_size: u32,
    /// Where the cursor goes.
    pub cursor: Rect,
}

/// Drawing operations handed to a [`Renderer`]: a host canvas plus the text
/// measurement capability.
pub struct Painter<'a> {
    /// Target surface.
    canvas: &'a mut dyn Canvas,
    /// Text sizes.
    measure: &'a dyn TextMeasure,
}

impl<'a> Painter<'a> {
    /// Wrap a canvas and a text measure.
    pub fn new(canvas: &'a mut dyn Canvas, measure: &'a dyn TextMeasure) -> Self {
        Self { canvas, measure }
    }

    /// The text measure renderers should lay text out with.
    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure
    }

    /// Fill a rectangle. Zero-sized rectangles are skipped.
    pub fn fill(&mut self, rect: Rect, color: Color) -> Result<()> {
        if rect.is_zero() {
            return Ok(());
        }
        self.canvas.fill_rect(rect, color)
    }

    /// Draw text at a location.
    pub fn text(&mut self, at: Point, text: &str, font_size: u32, color: Color) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.canvas.draw_text(at, text, font_size, color)
    }

    /// Draw text centred in a rectangle.
    pub fn text_centered(
        &mut self,
        rect: Rect,
        text: &str,
        font_size: u32,
        color: Color,
    ) -> Result<()> {
        let sz = self.measure.text_size(text, font_size);
        let at = Point {
            x: rect.tl.x + rect.w.saturating_sub(sz.w) / 2,
            y: rect.tl.y + rect.h.saturating_sub(sz.h) / 2,
        };
        self.text(at, text, font_size, color)
    }

    /// Draw a border of the given width just inside `rect`.
    pub fn outline(&mut self, rect: Rect, width: u32, color: Color) -> Result<()> {
        for r in Frame::new(rect, width).strips() {
            self.fill(r, color)?;
        }
        Ok(())
    }
}

/// A visual theme for the keyboard.
pub trait Renderer {
    /// Clear the keyboard area.
    fn draw_background(&self, p: &mut Painter<'_>, area: Rect) -> Result<()>;

    /// Draw a key according to its kind and state.
    fn draw_key(&self, p: &mut Painter<'_>, key: &Key) -> Result<()>;

    /// Draw the text box and its visible text.
    fn draw_text_box(&self, p: &mut Painter<'_>, view: &TextView<'_>) -> Result<()>;

    /// Draw the text cursor.
    fn draw_cursor(&self, p: &mut Painter<'_>, rect: Rect) -> Result<()>;
}
