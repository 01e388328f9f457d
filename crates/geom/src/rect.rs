use super::{Expanse, Point};
use crate::{Error, Result};

/// A rectangle in pixel space.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner
    pub tl: Point,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle from a location and a size.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// A zero-sized rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Does this rectangle have no area?
    pub fn is_zero(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// The size of this rectangle.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// The x co-ordinate one past the right edge.
    pub fn right(&self) -> u32 {
        self.tl.x + self.w
    }

    /// The y co-ordinate one past the bottom edge.
    pub fn bottom(&self) -> u32 {
        self.tl.y + self.h
    }

    /// The centre of the rectangle, rounded towards the top-left.
    pub fn center(&self) -> Point {
        Point {
            x: self.tl.x + self.w / 2,
            y: self.tl.y + self.h / 2,
        }
    }

    /// Does this rectangle contain the point?
    pub fn contains_point(&self, p: Point) -> bool {
        if p.x < self.tl.x || p.x >= self.right() {
            false
        } else {
            !(p.y < self.tl.y || p.y >= self.bottom())
        }
    }

    /// Does this rectangle completely enclose the other?
    pub fn contains_rect(&self, other: Self) -> bool {
        if other.is_zero() {
            return self.contains_point(other.tl);
        }
        // The rectangle is completely contained if both the upper left and the
        // lower right points are inside self.
        self.contains_point(other.tl)
            && self.contains_point(Point {
                x: other.right() - 1,
                y: other.bottom() - 1,
            })
    }

    /// Extracts an inner rectangle, given a border width.
    pub fn inner(&self, border: u32) -> Result<Self> {
        if self.w < (border * 2) || self.h < (border * 2) {
            return Err(Error::Geometry("rectangle too small".into()));
        }
        Ok(Self {
            tl: Point {
                x: self.tl.x + border,
                y: self.tl.y + border,
            },
            w: self.w - (border * 2),
            h: self.h - (border * 2),
        })
    }

    /// Grow the rectangle by `n` on every side. Growth towards the origin
    /// stops at zero.
    pub fn expand(&self, n: u32) -> Self {
        let x = self.tl.x.saturating_sub(n);
        let y = self.tl.y.saturating_sub(n);
        Self {
            tl: Point { x, y },
            w: self.right().saturating_add(n) - x,
            h: self.bottom().saturating_add(n) - y,
        }
    }

    /// The smallest rectangle enclosing both self and other. Zero-sized
    /// rectangles are ignored.
    pub fn union(&self, other: &Self) -> Self {
        if other.is_zero() {
            return *self;
        }
        if self.is_zero() {
            return *other;
        }
        let x = self.tl.x.min(other.tl.x);
        let y = self.tl.y.min(other.tl.y);
        Self {
            tl: Point { x, y },
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }

    /// The overlapping region of two rectangles, if any.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x = self.tl.x.max(other.tl.x);
        let y = self.tl.y.max(other.tl.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        if r > x && b > y {
            Some(Self::new(x, y, r - x, b - y))
        } else {
            None
        }
    }
}

impl From<Expanse> for Rect {
    fn from(e: Expanse) -> Self {
        e.rect()
    }
}
