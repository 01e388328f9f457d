use super::Rect;

/// The border strips of a rectangle, used to outline keys. Edges exclude the
/// corners, so the eight strips never overlap.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Frame {
    /// Top edge.
    pub top: Rect,
    /// Bottom edge.
    pub bottom: Rect,
    /// Left edge.
    pub left: Rect,
    /// Right edge.
    pub right: Rect,
    /// Top left corner.
    pub topleft: Rect,
    /// Top right corner.
    pub topright: Rect,
    /// Bottom left corner.
    pub bottomleft: Rect,
    /// Bottom right corner.
    pub bottomright: Rect,
}

impl Frame {
    /// Split the border of `rect` into strips `border` pixels thick. A rect
    /// too small to leave an interior gets an empty frame.
    pub fn new(rect: Rect, border: u32) -> Self {
        let twice = border.saturating_mul(2);
        if rect.w <= twice || rect.h <= twice {
            return Self::default();
        }
        let (x, y) = (rect.tl.x, rect.tl.y);
        let (right, bottom) = (rect.right() - border, rect.bottom() - border);
        let (w, h) = (rect.w - twice, rect.h - twice);
        Self {
            top: Rect::new(x + border, y, w, border),
            bottom: Rect::new(x + border, bottom, w, border),
            left: Rect::new(x, y + border, border, h),
            right: Rect::new(right, y + border, border, h),
            topleft: Rect::new(x, y, border, border),
            topright: Rect::new(right, y, border, border),
            bottomleft: Rect::new(x, bottom, border, border),
            bottomright: Rect::new(right, bottom, border, border),
        }
    }

    /// All eight strips.
    pub fn strips(&self) -> [Rect; 8] {
        [
            self.topleft,
            self.top,
            self.topright,
            self.left,
            self.right,
            self.bottomleft,
            self.bottom,
            self.bottomright,
        ]
    }
}
