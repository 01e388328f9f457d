use std::{collections::BTreeSet, fmt, sync::Arc};

use tracing::{debug, trace, warn};

use crate::{
    Result,
    buffer::{Consumer, TextBuffer},
    error::Error,
    event::{CursorMotion, Event, EventAdapter},
    geom::{Direction, Expanse, Point, Rect},
    key::{Key, KeyState},
    layout::{KeyKind, KeySpec, Layout, Metrics},
    measure::{MonospaceMeasure, TextMeasure, fit_font_size, truncate, window_start},
    navigation,
    presets,
    render::{Canvas, Painter, Renderer, TextView, Theme},
};

/// Width of the text cursor in pixels.
const CURSOR_WIDTH: u32 = 2;

/// The active key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// The layout as given.
    Lowercase,
    /// The layout with shifted characters.
    Uppercase,
    /// The special character layout.
    Special,
}

/// Screen regions that need redrawing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Damage {
    /// Everything.
    full: bool,
    /// Individual keys, by index.
    keys: BTreeSet<usize>,
    /// The text box.
    text_box: bool,
}

impl Damage {
    /// Is anything damaged?
    fn is_empty(&self) -> bool {
        !self.full && !self.text_box && self.keys.is_empty()
    }
}

/// Pixel placement of everything the keyboard draws.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Geometry {
    /// Area covered by the keys and the padding around them.
    keyboard: Rect,
    /// Text box above the keyboard, if shown.
    text_box: Option<Rect>,
    /// Key metrics shared by both layouts.
    metrics: Metrics,
    /// Placement of the primary layout.
    primary: Vec<(KeySpec, Rect)>,
    /// Placement of the special layout.
    special: Vec<(KeySpec, Rect)>,
}

impl Geometry {
    /// Place the layouts and the text box in `area`.
    fn compute(
        area: Rect,
        layout: &Layout,
        special: Option<&Layout>,
        show_text_box: bool,
    ) -> Result<Self> {
        let mut metrics = layout.metrics(area.expanse())?;
        if let Some(s) = special {
            metrics = synchronize(layout, s, metrics, s.metrics(area.expanse())?);
        }

        let keyboard = Rect::new(
            area.tl.x,
            area.bottom() - metrics.height,
            area.w,
            metrics.height,
        );
        let text_box = if show_text_box {
            let p = layout.padding();
            let h = metrics.key.h + 2 * p;
            if keyboard.tl.y < area.tl.y + h {
                return Err(Error::config(format!(
                    "no room for a {h}px text box above a {}px keyboard in {}px",
                    metrics.height, area.h
                )));
            }
            Some(Rect::new(area.tl.x, keyboard.tl.y - h, area.w, h))
        } else {
            None
        };

        let geometry = Self {
            keyboard,
            text_box,
            metrics,
            primary: layout.place(area, metrics),
            special: special.map(|s| s.place(area, metrics)).unwrap_or_default(),
        };
        debug!(?keyboard, ?text_box, keys = geometry.primary.len(), "keyboard geometry");
        Ok(geometry)
    }
}

/// Make two layouts share a key size and height so switching between them
/// never moves the keyboard.
fn synchronize(primary: &Layout, special: &Layout, a: Metrics, b: Metrics) -> Metrics {
    let key = Expanse::new(a.key.w.min(b.key.w), a.key.h.min(b.key.h));
    if a.key != b.key {
        warn!(primary = ?a.key, special = ?b.key, ?key, "normalizing key size across layouts");
    }
    let height = |l: &Layout| {
        let rows = l.rows().len() as u32;
        key.h * rows + l.padding() * (rows + 1)
    };
    Metrics {
        key,
        height: height(primary).max(height(special)),
    }
}

/// Fluent builder for [`Keyboard`].
pub struct KeyboardBuilder {
    /// Target drawing region.
    area: Rect,
    /// Text change callback.
    consumer: Option<Consumer>,
    /// Primary layout. Defaults to AZERTY.
    layout: Option<Arc<Layout>>,
    /// Layout for the special variant.
    special_layout: Option<Arc<Layout>>,
    /// Visual theme.
    renderer: Box<dyn Renderer>,
    /// Text measurement.
    measure: Box<dyn TextMeasure>,
    /// Show a text box above the keys.
    show_text_box: bool,
    /// Enable directional navigation.
    navigation: bool,
    /// Extra distance in pixels a release may land from the pressed key.
    release_tolerance: u32,
}

impl KeyboardBuilder {
    /// Start a keyboard for a target area.
    pub fn new(area: impl Into<Rect>) -> Self {
        Self {
            area: area.into(),
            consumer: None,
            layout: None,
            special_layout: None,
            renderer: Box::new(Theme::DEFAULT),
            measure: Box::new(MonospaceMeasure::default()),
            show_text_box: false,
            navigation: false,
            release_tolerance: 0,
        }
    }

    /// Callback invoked with the full text whenever it changes.
    pub fn consumer(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.consumer = Some(Box::new(f));
        self
    }

    /// The primary layout.
    pub fn layout(mut self, layout: impl Into<Arc<Layout>>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// The layout used while the special variant is active. Defaults to the
    /// special character preset when the primary layout has a special
    /// toggle.
    pub fn special_layout(mut self, layout: impl Into<Arc<Layout>>) -> Self {
        self.special_layout = Some(layout.into());
        self
    }

    /// The visual theme.
    pub fn renderer(mut self, r: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(r);
        self
    }

    /// The text measure used for labels and the text box.
    pub fn measure(mut self, m: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(m);
        self
    }

    /// Show a text box above the keys.
    pub fn show_text_box(mut self, show: bool) -> Self {
        self.show_text_box = show;
        self
    }

    /// Enable selection movement and activation.
    pub fn navigation(mut self, enabled: bool) -> Self {
        self.navigation = enabled;
        self
    }

    /// How far outside the pressed key a release may land and still fire.
    pub fn release_tolerance(mut self, px: u32) -> Self {
        self.release_tolerance = px;
        self
    }

    /// Validate the configuration and lay the keyboard out.
    pub fn build(self) -> Result<Keyboard> {
        let layout = match self.layout {
            Some(l) => l,
            None => Arc::new(Layout::new(presets::AZERTY)?),
        };
        let special = match (self.special_layout, layout.allow_special_chars()) {
            (Some(s), true) => {
                if !s.allow_special_chars() {
                    return Err(Error::config(
                        "special layout has no special toggle to switch back with",
                    ));
                }
                Some(s)
            }
            (Some(_), false) => {
                return Err(Error::config(
                    "special layout given but the primary layout has no special toggle",
                ));
            }
            (None, true) => Some(Arc::new(
                Layout::builder(presets::SPECIAL)
                    .padding(layout.padding())
                    .build()?,
            )),
            (None, false) => None,
        };
        let geometry = Geometry::compute(
            self.area,
            &layout,
            special.as_deref(),
            self.show_text_box,
        )?;

        let mut buffer = TextBuffer::new();
        if let Some(c) = self.consumer {
            buffer.set_consumer(c);
        }
        Ok(Keyboard {
            area: self.area,
            layout,
            special,
            renderer: self.renderer,
            measure: self.measure,
            navigation: self.navigation,
            release_tolerance: self.release_tolerance,
            show_text_box: self.show_text_box,
            geometry,
            enabled: false,
            shift: false,
            special_mode: false,
            keys: Vec::new(),
            pressed: None,
            selected: None,
            buffer,
            damage: Damage::default(),
        })
    }
}

/// An on-screen keyboard.
///
/// A keyboard starts disabled. While disabled it ignores input and draws
/// nothing. Every input operation returns the rectangles whose appearance
/// changed; the same regions are remembered and redrawn by the next call to
/// [`Keyboard::draw`].
pub struct Keyboard {
    /// Target drawing region.
    area: Rect,
    /// Primary layout.
    layout: Arc<Layout>,
    /// Special character layout.
    special: Option<Arc<Layout>>,
    /// Visual theme.
    renderer: Box<dyn Renderer>,
    /// Text measurement.
    measure: Box<dyn TextMeasure>,
    /// Directional navigation enabled.
    navigation: bool,
    /// Release tolerance in pixels.
    release_tolerance: u32,
    /// Text box requested.
    show_text_box: bool,
    /// Current placement.
    geometry: Geometry,
    /// Accepting input?
    enabled: bool,
    /// Characters shifted to uppercase.
    shift: bool,
    /// Special layout active.
    special_mode: bool,
    /// Keys of the active variant, in reading order.
    keys: Vec<Key>,
    /// Index of the pressed key.
    pressed: Option<usize>,
    /// Index of the selected key.
    selected: Option<usize>,
    /// Typed text.
    buffer: TextBuffer,
    /// Regions to redraw.
    damage: Damage,
}

impl fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyboard")
            .field("area", &self.area)
            .field("enabled", &self.enabled)
            .field("variant", &self.variant())
            .field("pressed", &self.pressed)
            .field("selected", &self.selected)
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl Keyboard {
    /// Start building a keyboard for a target area.
    pub fn builder(area: impl Into<Rect>) -> KeyboardBuilder {
        KeyboardBuilder::new(area)
    }

    /// Accept input, starting from the lowercase variant. Does nothing if the
    /// keyboard is already enabled.
    pub fn enable(&mut self) -> Vec<Rect> {
        if self.enabled {
            return Vec::new();
        }
        self.enabled = true;
        self.shift = false;
        self.special_mode = false;
        self.pressed = None;
        self.selected = None;
        self.keys = self.build_keys();
        self.damage = Damage {
            full: true,
            ..Damage::default()
        };
        debug!("keyboard enabled");
        vec![self.bounds()]
    }

    /// Stop accepting input. The text is kept; the pressed key and the
    /// selection are dropped. Returns the area the host should repaint.
    pub fn disable(&mut self) -> Vec<Rect> {
        if !self.enabled {
            return Vec::new();
        }
        self.enabled = false;
        self.pressed = None;
        self.selected = None;
        self.damage = Damage::default();
        debug!("keyboard disabled");
        vec![self.bounds()]
    }

    /// Is the keyboard accepting input?
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The active key set.
    pub fn variant(&self) -> Variant {
        if self.special_mode {
            Variant::Special
        } else if self.shift {
            Variant::Uppercase
        } else {
            Variant::Lowercase
        }
    }

    /// Keys of the active variant, in reading order. Empty until the keyboard
    /// is first enabled.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Index of the selected key.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Index of the pressed key.
    pub fn pressed(&self) -> Option<usize> {
        self.pressed
    }

    /// The primary layout.
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// The current text.
    pub fn get_text(&self) -> &str {
        self.buffer.text()
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    /// Replace the text and move the cursor to its end. Works while disabled.
    pub fn set_text(&mut self, text: &str) -> Vec<Rect> {
        let mut out = Vec::new();
        if self.buffer.replace_all(text) {
            self.damage_text_box(&mut out);
        }
        out
    }

    /// Area covered by the keyboard and its text box.
    pub fn get_bounds(&self) -> Rect {
        self.bounds()
    }

    /// Size of a standard one-unit key.
    pub fn key_size(&self) -> Expanse {
        self.geometry.metrics.key
    }

    /// Area covered by the keys.
    pub fn keyboard_rect(&self) -> Rect {
        self.geometry.keyboard
    }

    /// The text box, if shown.
    pub fn text_box_rect(&self) -> Option<Rect> {
        self.geometry.text_box
    }

    /// An event adapter matching this keyboard's area and navigation mode.
    pub fn adapter(&self) -> EventAdapter {
        EventAdapter::new(
            Expanse::new(self.area.right(), self.area.bottom()),
            self.navigation,
        )
    }

    /// Lay the keyboard out again for a new target area. Keys are rebuilt
    /// and the pressed key is dropped. On failure the keyboard is left
    /// unchanged.
    pub fn resize(&mut self, area: impl Into<Rect>) -> Result<()> {
        let area = area.into();
        self.geometry = Geometry::compute(
            area,
            &self.layout,
            self.special.as_deref(),
            self.show_text_box,
        )?;
        self.area = area;
        self.pressed = None;
        if self.enabled {
            self.regenerate();
        }
        Ok(())
    }

    /// Process a frame's worth of events. The resulting damage is picked up
    /// by the next [`Keyboard::draw`].
    pub fn update(&mut self, events: &[Event]) {
        for e in events {
            let changed = match *e {
                Event::PointerDown(p) => self.press(p),
                Event::PointerUp(p) => self.release(p),
                Event::DirectionalMove(d) => self.move_select(d),
                Event::DirectionalActivate => self.activate_selected(),
                Event::Cursor(m) => self.move_cursor(m),
            };
            trace!(event = ?e, ?changed, "keyboard event");
        }
    }

    /// Press the key under `p`. A press inside the text box moves the cursor
    /// instead. Pressing a key while another is held releases the first
    /// without firing it.
    pub fn press(&mut self, p: Point) -> Vec<Rect> {
        let mut out = Vec::new();
        if !self.enabled {
            return out;
        }
        if self.geometry.text_box.is_some_and(|r| r.contains_point(p)) {
            let idx = self.cursor_at(p);
            if self.buffer.set_cursor(idx) {
                self.damage_text_box(&mut out);
            }
            return out;
        }
        let Some(i) = self.keys.iter().position(|k| k.contains(p)) else {
            return out;
        };
        if let Some(prev) = self.pressed.take() {
            self.rest(prev, &mut out);
        }
        self.keys[i].state = KeyState::Pressed;
        self.pressed = Some(i);
        self.damage_key(i, &mut out);
        trace!(key = ?self.keys[i].spec, "pressed");
        out
    }

    /// Release the pressed key. Its action fires if `p` is within the key,
    /// grown by the release tolerance.
    pub fn release(&mut self, p: Point) -> Vec<Rect> {
        let mut out = Vec::new();
        if !self.enabled {
            return out;
        }
        let Some(i) = self.pressed.take() else {
            return out;
        };
        self.rest(i, &mut out);
        if self.keys[i]
            .rect
            .expand(self.release_tolerance)
            .contains_point(p)
        {
            self.fire(i, &mut out);
        } else {
            trace!(key = ?self.keys[i].spec, "release outside key");
        }
        out
    }

    /// Move the selection to the nearest key in a direction. With no
    /// selection, the first key is selected.
    pub fn move_select(&mut self, d: Direction) -> Vec<Rect> {
        let mut out = Vec::new();
        if !self.enabled || !self.navigation || self.keys.is_empty() {
            return out;
        }
        let target = match self.selected {
            None => Some(0),
            Some(cur) => {
                let rects: Vec<Rect> = self.keys.iter().map(|k| k.rect).collect();
                navigation::find_target(cur, d, &rects)
            }
        };
        let Some(t) = target else {
            return out;
        };
        if let Some(old) = self.selected.replace(t) {
            self.rest(old, &mut out);
        }
        self.rest(t, &mut out);
        out
    }

    /// Fire the selected key.
    pub fn activate_selected(&mut self) -> Vec<Rect> {
        let mut out = Vec::new();
        if !self.enabled || !self.navigation {
            return out;
        }
        let Some(i) = self.selected else {
            return out;
        };
        if let Some(prev) = self.pressed.take() {
            self.rest(prev, &mut out);
        }
        self.damage_key(i, &mut out);
        self.fire(i, &mut out);
        out
    }

    /// Move the text cursor without changing the text.
    pub fn move_cursor(&mut self, m: CursorMotion) -> Vec<Rect> {
        let mut out = Vec::new();
        if !self.enabled {
            return out;
        }
        let moved = match m {
            CursorMotion::Left => self.buffer.left(),
            CursorMotion::Right => self.buffer.right(),
            CursorMotion::Home => self.buffer.home(),
            CursorMotion::End => self.buffer.end(),
        };
        if moved {
            self.damage_text_box(&mut out);
        }
        out
    }

    /// Draw everything that changed since the last draw, and return the
    /// rectangles drawn. A disabled keyboard draws nothing.
    pub fn draw(&mut self, canvas: &mut dyn Canvas) -> Result<Vec<Rect>> {
        let mut drawn = Vec::new();
        if !self.enabled || self.damage.is_empty() {
            return Ok(drawn);
        }
        let mut p = Painter::new(canvas, &*self.measure);
        let r = &*self.renderer;
        if self.damage.full {
            r.draw_background(&mut p, self.geometry.keyboard)?;
            drawn.push(self.geometry.keyboard);
            for k in &self.keys {
                r.draw_key(&mut p, k)?;
            }
        } else {
            for &i in &self.damage.keys {
                if let Some(k) = self.keys.get(i) {
                    r.draw_key(&mut p, k)?;
                    drawn.push(k.rect);
                }
            }
        }
        if self.damage.full || self.damage.text_box {
            if let Some(view) = self.text_view() {
                r.draw_text_box(&mut p, &view)?;
                r.draw_cursor(&mut p, view.cursor)?;
                drawn.push(view.rect);
            }
        }
        self.damage = Damage::default();
        Ok(drawn)
    }

    /// Keyboard and text box area.
    fn bounds(&self) -> Rect {
        self.geometry
            .text_box
            .map_or(self.geometry.keyboard, |t| t.union(&self.geometry.keyboard))
    }

    /// Keys for the active variant.
    fn build_keys(&self) -> Vec<Key> {
        let source = if self.special_mode {
            &self.geometry.special
        } else {
            &self.geometry.primary
        };
        source
            .iter()
            .map(|(spec, rect)| {
                let spec = if self.shift { spec.with_case(true) } else { *spec };
                let mut k = Key::new(spec, *rect);
                k.active = match spec.kind {
                    KeyKind::UppercaseToggle => self.shift,
                    KeyKind::SpecialToggle => self.special_mode,
                    _ => false,
                };
                k
            })
            .collect()
    }

    /// Rebuild the key set after a variant or geometry change. A selection on
    /// a special key follows it into the new set.
    fn regenerate(&mut self) {
        let prev = self.selected.map(|i| (i, self.keys[i].spec.kind));
        self.keys = self.build_keys();
        self.pressed = None;
        self.selected = prev.and_then(|(i, kind)| {
            if kind == KeyKind::Character {
                (!self.keys.is_empty()).then(|| i.min(self.keys.len() - 1))
            } else {
                self.keys.iter().position(|k| k.spec.kind == kind)
            }
        });
        if let Some(s) = self.selected {
            self.keys[s].state = KeyState::Selected;
        }
        self.damage.full = true;
        debug!(variant = ?self.variant(), keys = self.keys.len(), "keys rebuilt");
    }

    /// Apply the action of key `i`.
    fn fire(&mut self, i: usize, out: &mut Vec<Rect>) {
        let spec = self.keys[i].spec;
        trace!(key = ?spec, "fired");
        match spec.kind {
            KeyKind::Character | KeyKind::Space => {
                let inserted = spec.insertion().is_some_and(|c| self.buffer.insert(c));
                if inserted {
                    self.damage_text_box(out);
                }
            }
            KeyKind::Backspace => {
                if self.buffer.delete_before_cursor() {
                    self.damage_text_box(out);
                }
            }
            KeyKind::UppercaseToggle => {
                self.shift = !self.shift;
                self.regenerate();
                out.push(self.geometry.keyboard);
            }
            KeyKind::SpecialToggle => {
                if self.special.is_none() {
                    return;
                }
                self.special_mode = !self.special_mode;
                self.regenerate();
                out.push(self.geometry.keyboard);
            }
        }
    }

    /// Return key `i` to its resting state: Selected if it is the selected
    /// key, Released otherwise. A key that is still held stays Pressed.
    fn rest(&mut self, i: usize, out: &mut Vec<Rect>) {
        self.keys[i].state = if self.pressed == Some(i) {
            KeyState::Pressed
        } else if self.selected == Some(i) {
            KeyState::Selected
        } else {
            KeyState::Released
        };
        self.damage_key(i, out);
    }

    /// Mark a key for redraw.
    fn damage_key(&mut self, i: usize, out: &mut Vec<Rect>) {
        self.damage.keys.insert(i);
        out.push(self.keys[i].rect);
    }

    /// Mark the text box for redraw, if there is one and it is visible.
    fn damage_text_box(&mut self, out: &mut Vec<Rect>) {
        if !self.enabled {
            return;
        }
        if let Some(r) = self.geometry.text_box {
            self.damage.text_box = true;
            out.push(r);
        }
    }

    /// How the text box looks right now.
    fn text_view(&self) -> Option<TextView<'_>> {
        let rect = self.geometry.text_box?;
        let inner = rect.inner(self.layout.padding()).unwrap_or(rect);
        let m = &*self.measure;
        let font_size = fit_font_size(m, inner.h);
        let text = self.buffer.text();
        let cursor = self.buffer.cursor();
        let start = window_start(
            m,
            text,
            cursor,
            font_size,
            inner.w.saturating_sub(CURSOR_WIDTH),
        );
        let tail = text
            .char_indices()
            .nth(start)
            .map_or("", |(b, _)| &text[b..]);
        let (n, _) = truncate(m, tail, font_size, inner.w, false);
        let visible = tail.char_indices().nth(n).map_or(tail, |(b, _)| &tail[..b]);
        let head: String = visible.chars().take(cursor - start).collect();
        let x = inner.tl.x
            + m.text_width(&head, font_size)
                .min(inner.w.saturating_sub(CURSOR_WIDTH));
        Some(TextView {
            rect,
            inner,
            visible,
            first: start,
            font_size,
            cursor: Rect::new(x, inner.tl.y, CURSOR_WIDTH, inner.h),
        })
    }

    /// The character boundary nearest to a point in the text box.
    fn cursor_at(&self, p: Point) -> usize {
        let Some(view) = self.text_view() else {
            return self.buffer.cursor();
        };
        let (n, _) = truncate(
            &*self.measure,
            view.visible,
            view.font_size,
            p.x.saturating_sub(view.inner.tl.x),
            true,
        );
        view.first + n
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{DrawOp, RecordingCanvas};

    /// A numeric keyboard with no special keys besides backspace.
    fn numeric() -> Result<(Keyboard, Rc<RefCell<Vec<String>>>)> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let layout = Layout::builder(presets::NUMBER)
            .allow_uppercase(false)
            .allow_special_chars(false)
            .allow_space(false)
            .build()?;
        let kb = Keyboard::builder(Rect::new(0, 0, 320, 1000))
            .layout(layout)
            .show_text_box(true)
            .consumer(move |t| sink.borrow_mut().push(t.to_owned()))
            .build()?;
        Ok((kb, log))
    }

    fn key_index(kb: &Keyboard, pred: impl Fn(&Key) -> bool) -> usize {
        kb.keys().iter().position(pred).unwrap_or(usize::MAX)
    }

    fn tap(kb: &mut Keyboard, i: usize) -> Vec<Rect> {
        let c = kb.keys()[i].rect.center();
        let mut out = kb.press(c);
        out.extend(kb.release(c));
        out
    }

    #[test]
    fn starts_disabled() -> Result<()> {
        let (mut kb, _) = numeric()?;
        assert!(!kb.is_enabled());
        assert!(kb.keys().is_empty());
        assert!(kb.press(Point { x: 50, y: 950 }).is_empty());
        let mut c = RecordingCanvas::default();
        assert!(kb.draw(&mut c)?.is_empty());
        assert!(c.ops.is_empty());
        Ok(())
    }

    #[test]
    fn typing_reports_damage() -> Result<()> {
        let (mut kb, log) = numeric()?;
        kb.enable();
        let five = key_index(&kb, |k| k.spec.value == Some('5'));
        let rects = tap(&mut kb, five);
        let key = kb.keys()[five].rect;
        assert!(rects.contains(&key));
        assert!(kb.text_box_rect().is_some_and(|t| rects.contains(&t)));
        assert_eq!(kb.get_text(), "5");
        assert_eq!(*log.borrow(), vec!["5"]);
        assert_eq!(kb.keys()[five].state, KeyState::Released);
        Ok(())
    }

    #[test]
    fn draw_full_then_incremental() -> Result<()> {
        let (mut kb, _) = numeric()?;
        kb.enable();
        let mut c = RecordingCanvas::default();
        let drawn = kb.draw(&mut c)?;
        assert_eq!(drawn[0], kb.keyboard_rect());
        assert_eq!(drawn.len(), 2);
        assert!(kb.draw(&mut c)?.is_empty());

        let one = key_index(&kb, |k| k.spec.value == Some('1'));
        kb.press(kb.keys()[one].rect.center());
        c.clear();
        assert_eq!(kb.draw(&mut c)?, vec![kb.keys()[one].rect]);
        Ok(())
    }

    #[test]
    fn failed_draw_keeps_damage() -> Result<()> {
        let (mut kb, _) = numeric()?;
        kb.enable();
        let mut broken = RecordingCanvas {
            fail_after: Some(0),
            ..RecordingCanvas::default()
        };
        assert!(matches!(kb.draw(&mut broken), Err(Error::Render(_))));
        let mut c = RecordingCanvas::default();
        assert_eq!(kb.draw(&mut c)?.len(), 2);
        Ok(())
    }

    #[test]
    fn release_elsewhere_does_not_fire() -> Result<()> {
        let (mut kb, log) = numeric()?;
        kb.enable();
        let one = key_index(&kb, |k| k.spec.value == Some('1'));
        let r = kb.keys()[one].rect;
        kb.press(r.center());
        assert_eq!(kb.keys()[one].state, KeyState::Pressed);
        kb.release(Point { x: r.right() + 1, y: r.tl.y });
        assert_eq!(kb.get_text(), "");
        assert_eq!(kb.keys()[one].state, KeyState::Released);
        assert!(log.borrow().is_empty());
        assert!(kb.release(r.center()).is_empty());
        Ok(())
    }

    #[test]
    fn release_tolerance() -> Result<()> {
        let layout = Layout::builder(presets::NUMBER)
            .allow_uppercase(false)
            .allow_special_chars(false)
            .allow_space(false)
            .build()?;
        let mut kb = Keyboard::builder(Rect::new(0, 0, 320, 1000))
            .layout(layout)
            .release_tolerance(3)
            .build()?;
        kb.enable();
        let r = kb.keys()[0].rect;
        kb.press(r.center());
        kb.release(Point { x: r.right() + 2, y: r.tl.y });
        assert_eq!(kb.get_text(), "1");
        kb.press(r.center());
        kb.release(Point { x: r.right() + 3, y: r.tl.y });
        assert_eq!(kb.get_text(), "1");
        Ok(())
    }

    #[test]
    fn second_press_resets_first() -> Result<()> {
        let (mut kb, _) = numeric()?;
        kb.enable();
        let (a, b) = (kb.keys()[0].rect, kb.keys()[1].rect);
        kb.press(a.center());
        let out = kb.press(b.center());
        assert_eq!(out, vec![a, b]);
        assert_eq!(kb.keys()[0].state, KeyState::Released);
        kb.release(b.center());
        assert_eq!(kb.get_text(), "2");
        Ok(())
    }

    #[test]
    fn uppercase_and_special_variants() -> Result<()> {
        let mut kb = Keyboard::builder(Rect::new(0, 0, 800, 1200)).build()?;
        kb.enable();
        let shift = key_index(&kb, |k| k.spec.kind == KeyKind::UppercaseToggle);
        tap(&mut kb, shift);
        assert_eq!(kb.variant(), Variant::Uppercase);
        assert!(kb.keys()[shift].active);
        let a = key_index(&kb, |k| k.spec.value == Some('A'));
        tap(&mut kb, a);

        let special = key_index(&kb, |k| k.spec.kind == KeyKind::SpecialToggle);
        tap(&mut kb, special);
        assert_eq!(kb.variant(), Variant::Special);
        let at = key_index(&kb, |k| k.spec.value == Some('@'));
        tap(&mut kb, at);

        let back = key_index(&kb, |k| k.spec.kind == KeyKind::SpecialToggle);
        tap(&mut kb, back);
        assert_eq!(kb.variant(), Variant::Uppercase);
        assert_eq!(kb.get_text(), "A@");
        Ok(())
    }

    #[test]
    fn layouts_share_bounds() -> Result<()> {
        let mut kb = Keyboard::builder(Rect::new(0, 0, 800, 1200)).build()?;
        kb.enable();
        let bounds = kb.get_bounds();
        let primary_w = kb.keys()[0].rect.w;
        let special = key_index(&kb, |k| k.spec.kind == KeyKind::SpecialToggle);
        tap(&mut kb, special);
        assert_eq!(kb.get_bounds(), bounds);
        assert_eq!(kb.keys()[0].rect.w, primary_w);
        assert!(kb.keys().iter().all(|k| bounds.contains_rect(k.rect)));
        Ok(())
    }

    #[test]
    fn navigation() -> Result<()> {
        let layout = Layout::builder(presets::NUMBER)
            .allow_uppercase(false)
            .allow_special_chars(false)
            .allow_space(false)
            .build()?;
        let mut kb = Keyboard::builder(Rect::new(0, 0, 320, 1000))
            .layout(layout)
            .navigation(true)
            .build()?;
        kb.enable();
        assert!(kb.activate_selected().is_empty());
        kb.move_select(Direction::Right);
        assert_eq!(kb.selected(), Some(0));
        kb.move_select(Direction::Right);
        kb.move_select(Direction::Down);
        assert_eq!(kb.selected(), Some(4));
        assert_eq!(kb.keys()[4].state, KeyState::Selected);
        assert_eq!(kb.keys()[1].state, KeyState::Released);

        kb.activate_selected();
        assert_eq!(kb.get_text(), "5");
        assert_eq!(kb.keys()[4].state, KeyState::Selected);

        // Nothing above the top row.
        kb.move_select(Direction::Up);
        assert!(kb.move_select(Direction::Up).is_empty());
        assert_eq!(kb.selected(), Some(1));
        Ok(())
    }

    #[test]
    fn navigation_requires_opt_in() -> Result<()> {
        let (mut kb, _) = numeric()?;
        kb.enable();
        assert!(kb.move_select(Direction::Down).is_empty());
        assert_eq!(kb.selected(), None);
        Ok(())
    }

    #[test]
    fn selection_follows_toggle() -> Result<()> {
        let mut kb = Keyboard::builder(Rect::new(0, 0, 800, 1200))
            .navigation(true)
            .build()?;
        kb.enable();
        kb.move_select(Direction::Down);
        let shift = key_index(&kb, |k| k.spec.kind == KeyKind::UppercaseToggle);
        while kb.selected() != Some(shift) {
            let before = kb.selected();
            let d = match kb.selected().map(|s| kb.keys()[s].rect.center()) {
                Some(c) if c.y < kb.keys()[shift].rect.center().y => Direction::Down,
                _ => Direction::Left,
            };
            kb.move_select(d);
            assert_ne!(kb.selected(), before);
        }
        kb.activate_selected();
        assert_eq!(kb.variant(), Variant::Uppercase);
        assert_eq!(kb.selected(), Some(shift));
        assert_eq!(kb.keys()[shift].state, KeyState::Selected);
        Ok(())
    }

    #[test]
    fn text_box_click_moves_cursor() -> Result<()> {
        let (mut kb, log) = numeric()?;
        kb.set_text("1234");
        kb.enable();
        let inner = kb
            .text_box_rect()
            .and_then(|r| r.inner(kb.layout().padding()).ok())
            .unwrap_or_default();
        kb.press(Point {
            x: inner.tl.x + 1,
            y: inner.tl.y,
        });
        assert_eq!(kb.cursor(), 0);
        kb.move_cursor(CursorMotion::Right);
        kb.move_cursor(CursorMotion::Right);
        assert_eq!(kb.cursor(), 2);
        let back = key_index(&kb, |k| k.spec.kind == KeyKind::Backspace);
        tap(&mut kb, back);
        assert_eq!(kb.get_text(), "134");
        assert_eq!(kb.cursor(), 1);
        kb.move_cursor(CursorMotion::End);
        assert_eq!(kb.cursor(), 3);
        assert_eq!(log.borrow().len(), 2);
        Ok(())
    }

    #[test]
    fn long_text_stays_in_text_box() -> Result<()> {
        let (mut kb, _) = numeric()?;
        kb.set_text(&"1".repeat(200));
        kb.enable();
        let rect = kb.text_box_rect().unwrap_or_default();
        let inner = rect.inner(kb.layout().padding())?;
        let m = MonospaceMeasure::default();
        for motion in [CursorMotion::Home, CursorMotion::End] {
            kb.move_cursor(motion);
            let mut c = RecordingCanvas::default();
            kb.draw(&mut c)?;
            let runs: Vec<_> = c
                .ops
                .iter()
                .filter_map(|o| match o {
                    DrawOp::Text {
                        at,
                        text,
                        font_size,
                        ..
                    } if rect.contains_point(*at) => Some((*at, text.clone(), *font_size)),
                    _ => None,
                })
                .collect();
            assert_eq!(runs.len(), 1);
            for (at, text, font_size) in runs {
                assert!(!text.is_empty());
                assert!(at.x + m.text_width(&text, font_size) <= inner.right());
            }
        }

        // Clicking near the left edge after Home lands at the start.
        kb.move_cursor(CursorMotion::Home);
        kb.press(Point {
            x: inner.tl.x + 1,
            y: inner.tl.y,
        });
        assert_eq!(kb.cursor(), 0);
        Ok(())
    }

    #[test]
    fn disable_drops_pressed_key() -> Result<()> {
        let (mut kb, _) = numeric()?;
        kb.enable();
        kb.set_text("12");
        let three = key_index(&kb, |k| k.spec.value == Some('3'));
        kb.press(kb.keys()[three].rect.center());
        assert_eq!(kb.disable(), vec![kb.get_bounds()]);
        assert!(kb.disable().is_empty());
        assert_eq!(kb.get_text(), "12");
        kb.enable();
        assert!(kb.keys().iter().all(|k| k.state == KeyState::Released));
        assert_eq!(kb.pressed(), None);
        Ok(())
    }

    #[test]
    fn resize_recomputes() -> Result<()> {
        let (mut kb, _) = numeric()?;
        kb.enable();
        kb.press(kb.keys()[0].rect.center());
        kb.resize(Rect::new(0, 0, 640, 2000))?;
        assert_eq!(kb.pressed(), None);
        assert_eq!(kb.keyboard_rect().bottom(), 2000);
        assert!(kb.resize(Rect::new(0, 0, 20, 20)).is_err());
        assert_eq!(kb.keyboard_rect().bottom(), 2000);
        Ok(())
    }

    #[test]
    fn special_layout_must_toggle_back() -> Result<()> {
        let stuck = Layout::builder(presets::SPECIAL)
            .allow_special_chars(false)
            .build()?;
        let kb = Keyboard::builder(Rect::new(0, 0, 480, 800))
            .layout(Layout::new(presets::QWERTY)?)
            .special_layout(stuck)
            .build();
        assert!(matches!(kb, Err(Error::Configuration(_))));

        let mut kb = Keyboard::builder(Rect::new(0, 0, 480, 800))
            .layout(Layout::new(presets::QWERTY)?)
            .special_layout(Layout::new(presets::SPECIAL)?)
            .build()?;
        kb.enable();
        let toggle = key_index(&kb, |k| k.spec.kind == KeyKind::SpecialToggle);
        tap(&mut kb, toggle);
        assert_eq!(kb.variant(), Variant::Special);
        let back = key_index(&kb, |k| k.spec.kind == KeyKind::SpecialToggle);
        tap(&mut kb, back);
        assert_eq!(kb.variant(), Variant::Lowercase);
        Ok(())
    }

    #[test]
    fn huge_padding_is_a_config_error() -> Result<()> {
        let layout = Layout::builder(presets::AZERTY)
            .padding(u32::MAX / 4)
            .build()?;
        let kb = Keyboard::builder(Rect::new(0, 0, 800, 600))
            .layout(layout)
            .build();
        assert!(matches!(kb, Err(Error::Configuration(_))));
        Ok(())
    }

    #[test]
    fn special_layout_needs_a_toggle() -> Result<()> {
        let layout = Layout::builder(presets::QWERTY)
            .allow_special_chars(false)
            .build()?;
        let kb = Keyboard::builder(Rect::new(0, 0, 480, 800))
            .layout(layout)
            .special_layout(Layout::new(presets::SPECIAL)?)
            .build();
        assert!(matches!(kb, Err(Error::Configuration(_))));
        Ok(())
    }

    #[test]
    fn text_box_must_fit() -> Result<()> {
        let layout = Layout::builder(presets::NUMBER)
            .allow_special_chars(false)
            .key_size((20, 20))
            .build()?;
        let rows = layout.rows().len() as u32;
        let height = 20 * rows + 5 * (rows + 1);
        let kb = Keyboard::builder(Rect::new(0, 0, 300, height))
            .layout(layout)
            .show_text_box(true)
            .build();
        assert!(matches!(kb, Err(Error::Configuration(_))));
        Ok(())
    }
}
