//! A cell-grid canvas over a crossterm terminal. Every cell is one pixel.

use std::io::{self, Write};

use crossterm::{QueueableCommand, cursor as ccursor, event as cevent, style};
use unicode_width::UnicodeWidthStr;
use vkeyboard::{
    Canvas, Color, Error, Expanse, InputEvent, Point, Rect, Result, TextMeasure,
    event::{Action, Button, KeyCode, MouseEvent},
};

/// Display width in cells, one row high at any font size.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasure;

impl TextMeasure for CellMeasure {
    fn text_size(&self, text: &str, _font_size: u32) -> Expanse {
        Expanse::new(text.width() as u32, 1)
    }
}

/// A terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    /// Glyph.
    ch: char,
    /// Glyph color.
    fg: Color,
    /// Cell color.
    bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::new(255, 255, 255),
            bg: Color::new(0, 0, 0),
        }
    }
}

/// An off-screen grid of cells that the keyboard draws into. Changed regions
/// are copied to the terminal with [`CellCanvas::flush`].
#[derive(Debug, Clone)]
pub struct CellCanvas {
    /// Grid size.
    size: Expanse,
    /// Cells in row-major order.
    cells: Vec<Cell>,
}

impl CellCanvas {
    /// A blank grid.
    pub fn new(size: Expanse) -> Self {
        Self {
            size,
            cells: vec![Cell::default(); size.area() as usize],
        }
    }

    /// Grid size.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// Discard the contents and change the grid size.
    pub fn resize(&mut self, size: Expanse) {
        *self = Self::new(size);
    }

    /// The part of `r` that lies on the grid.
    fn clip(&self, r: Rect) -> Option<Rect> {
        r.intersect(&self.size.rect())
    }

    /// Index of the cell at `p`. The point must be on the grid.
    fn idx(&self, p: Point) -> usize {
        (p.y * self.size.w + p.x) as usize
    }

    /// The glyphs of one grid row, for inspection.
    pub fn line(&self, y: u32) -> String {
        if y >= self.size.h {
            return String::new();
        }
        let start = self.idx(Point { x: 0, y });
        self.cells[start..start + self.size.w as usize]
            .iter()
            .map(|c| c.ch)
            .collect()
    }

    /// Write the given regions of the grid to the terminal.
    pub fn flush(&self, out: &mut impl Write, rects: &[Rect]) -> io::Result<()> {
        for r in rects.iter().filter_map(|r| self.clip(*r)) {
            for y in r.tl.y..r.bottom() {
                out.queue(ccursor::MoveTo(r.tl.x as u16, y as u16))?;
                for x in r.tl.x..r.right() {
                    let c = self.cells[self.idx(Point { x, y })];
                    out.queue(style::SetBackgroundColor(translate_color(c.bg)))?;
                    out.queue(style::SetForegroundColor(translate_color(c.fg)))?;
                    out.queue(style::Print(c.ch))?;
                }
            }
        }
        out.queue(style::ResetColor)?;
        out.flush()
    }
}

impl Canvas for CellCanvas {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        let r = self
            .clip(rect)
            .ok_or_else(|| Error::Render(format!("{rect:?} is off screen")))?;
        for y in r.tl.y..r.bottom() {
            for x in r.tl.x..r.right() {
                let i = self.idx(Point { x, y });
                self.cells[i] = Cell {
                    ch: ' ',
                    fg: self.cells[i].fg,
                    bg: color,
                };
            }
        }
        Ok(())
    }

    fn draw_text(&mut self, at: Point, text: &str, _font_size: u32, color: Color) -> Result<()> {
        if at.y >= self.size.h {
            return Ok(());
        }
        for (x, ch) in (at.x..self.size.w).zip(text.chars()) {
            let i = self.idx(Point { x, y: at.y });
            self.cells[i].ch = ch;
            self.cells[i].fg = color;
        }
        Ok(())
    }
}

fn translate_color(c: Color) -> style::Color {
    style::Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

fn translate_button(b: cevent::MouseButton) -> Button {
    match b {
        cevent::MouseButton::Left => Button::Left,
        cevent::MouseButton::Right => Button::Right,
        cevent::MouseButton::Middle => Button::Middle,
    }
}

/// Translate a crossterm event into a keyboard host event.
pub fn translate_event(e: &cevent::Event) -> Option<InputEvent> {
    match e {
        cevent::Event::Key(k) if k.kind != cevent::KeyEventKind::Release => {
            Some(InputEvent::Key(match k.code {
                cevent::KeyCode::Left => KeyCode::Left,
                cevent::KeyCode::Right => KeyCode::Right,
                cevent::KeyCode::Up => KeyCode::Up,
                cevent::KeyCode::Down => KeyCode::Down,
                cevent::KeyCode::Home => KeyCode::Home,
                cevent::KeyCode::End => KeyCode::End,
                cevent::KeyCode::Enter => KeyCode::Enter,
                _ => KeyCode::Other,
            }))
        }
        cevent::Event::Mouse(m) => {
            let (action, button) = match m.kind {
                cevent::MouseEventKind::Down(b) => (Action::Down, translate_button(b)),
                cevent::MouseEventKind::Up(b) => (Action::Up, translate_button(b)),
                cevent::MouseEventKind::Drag(b) => (Action::Drag, translate_button(b)),
                cevent::MouseEventKind::Moved => (Action::Moved, Button::None),
                cevent::MouseEventKind::ScrollDown => (Action::ScrollDown, Button::None),
                cevent::MouseEventKind::ScrollUp => (Action::ScrollUp, Button::None),
                cevent::MouseEventKind::ScrollLeft | cevent::MouseEventKind::ScrollRight => {
                    return None;
                }
            };
            Some(InputEvent::Mouse(MouseEvent {
                action,
                button,
                location: Point {
                    x: u32::from(m.column),
                    y: u32::from(m.row),
                },
            }))
        }
        _ => None,
    }
}
