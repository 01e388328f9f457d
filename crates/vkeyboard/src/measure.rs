//! Text measurement.
//!
//! The keyboard never loads fonts. Hosts provide a [`TextMeasure`] that
//! reports how large a string renders at a given font size, and the helpers
//! here build font fitting and text truncation on top of it.

use crate::geom::Expanse;

/// A sample with a wide range of glyph heights, used when fitting fonts.
const FIT_SAMPLE: &str = "?/|!()§&@0123456789azertyuiopqsdfghjklmwxcvbnAZERTYUIOPQSDFGHJKLMWXCVBN";

/// Reports rendered text sizes.
pub trait TextMeasure {
    /// The size of `text` drawn at `font_size`.
    fn text_size(&self, text: &str, font_size: u32) -> Expanse;

    /// The width of `text` drawn at `font_size`.
    fn text_width(&self, text: &str, font_size: u32) -> u32 {
        self.text_size(text, font_size).w
    }
}

/// Every glyph has the same advance, a fixed fraction of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    /// Glyph advance as a fraction of the font size.
    pub advance: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn text_size(&self, text: &str, font_size: u32) -> Expanse {
        let glyph = ((font_size as f32 * self.advance).round() as u32).max(1);
        Expanse::new(glyph * text.chars().count() as u32, font_size)
    }
}

/// Split `text` at character index `n`.
fn prefix(text: &str, n: usize) -> &str {
    text.char_indices()
        .nth(n)
        .map_or(text, |(i, _)| &text[..i])
}

/// The longest prefix of `text` that fits in `max_width`, as a character count
/// and its width. With `nearest`, the prefix one character longer is returned
/// instead when its width is closer to `max_width`.
pub fn truncate(
    m: &dyn TextMeasure,
    text: &str,
    font_size: u32,
    max_width: u32,
    nearest: bool,
) -> (usize, u32) {
    let len = text.chars().count();
    let (mut start, mut end) = (0, len);
    let mut width = 0;
    while start < end {
        let k = (start + end) / 2;
        let w = m.text_width(prefix(text, k + 1), font_size);
        if w > max_width {
            end = k;
        } else {
            width = w;
            start = k + 1;
        }
    }
    if nearest && start < len {
        let next = m.text_width(prefix(text, start + 1), font_size);
        if next.abs_diff(max_width) < width.abs_diff(max_width) {
            return (start + 1, next);
        }
    }
    (start, width)
}

/// The largest font size whose rendered height fits in `max_height`. Never
/// less than 1.
pub fn fit_font_size(m: &dyn TextMeasure, max_height: u32) -> u32 {
    let (mut lo, mut hi) = (1, max_height.saturating_mul(2).max(1));
    while lo < hi {
        let k = (lo + hi).div_ceil(2);
        if m.text_size(FIT_SAMPLE, k).h > max_height {
            hi = k - 1;
        } else {
            lo = k;
        }
    }
    lo
}

/// The first visible character when `text` is shown in a box `width` wide
/// with the cursor at character index `cursor`. The tail of the text up to
/// the cursor stays in view.
pub fn window_start(
    m: &dyn TextMeasure,
    text: &str,
    cursor: usize,
    font_size: u32,
    width: u32,
) -> usize {
    let head = prefix(text, cursor);
    let (mut lo, mut hi) = (0, cursor);
    while lo < hi {
        let k = (lo + hi) / 2;
        let tail = head.chars().skip(k).collect::<String>();
        if m.text_width(&tail, font_size) > width {
            lo = k + 1;
        } else {
            hi = k;
        }
    }
    lo
}
