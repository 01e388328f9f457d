//! The declarative keyboard model and its mapping onto pixel geometry.
//!
//! A [`Layout`] is an ordered list of rows of [`KeySpec`]s. It is built from a
//! character model (one string per row) by a [`LayoutBuilder`], which also
//! inserts the special keys the layout allows. Layouts are immutable once
//! built and can be shared between keyboards.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    geom::{Expanse, Rect},
};

/// Default gap between keys and rows, in pixels.
pub const DEFAULT_PADDING: u32 = 5;

/// Default minimum key width and height, in pixels.
pub const DEFAULT_MIN_KEY_SIZE: u32 = 8;

/// Smallest width of a space bar, in key units.
pub const MIN_SPACE_WIDTH: usize = 3;

/// Computed keyboards never take more than 1/MAX_HEIGHT_DIVISOR of the target
/// height.
const MAX_HEIGHT_DIVISOR: u32 = 2;

/// The kind of a key, which determines what happens when it is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    /// Inserts its character.
    Character,
    /// Inserts a space.
    Space,
    /// Deletes the character before the cursor.
    Backspace,
    /// Switches between lowercase and uppercase.
    UppercaseToggle,
    /// Switches to and from the special character layout.
    SpecialToggle,
}

/// A key in the layout model, independent of geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    /// What the key does.
    pub kind: KeyKind,
    /// The character of a `Character` key.
    pub value: Option<char>,
}

impl KeySpec {
    /// A key that inserts `c`.
    pub fn character(c: char) -> Self {
        Self {
            kind: KeyKind::Character,
            value: Some(c),
        }
    }

    /// A non-character key of the given kind.
    pub fn special(kind: KeyKind) -> Self {
        Self { kind, value: None }
    }

    /// The character inserted into the buffer when this key fires, if any.
    pub fn insertion(&self) -> Option<char> {
        match self.kind {
            KeyKind::Character => self.value,
            KeyKind::Space => Some(' '),
            _ => None,
        }
    }

    /// This spec with its character shifted to upper or lower case. Characters
    /// without a single-character case mapping are left alone.
    pub fn with_case(&self, uppercase: bool) -> Self {
        let Some(c) = self.value else {
            return *self;
        };
        let mut mapped = if uppercase {
            c.to_uppercase().collect::<Vec<_>>()
        } else {
            c.to_lowercase().collect::<Vec<_>>()
        };
        match (mapped.pop(), mapped.is_empty()) {
            (Some(m), true) => Self {
                kind: self.kind,
                value: Some(m),
            },
            _ => *self,
        }
    }
}

/// Pixel metrics of a layout rendered into a specific area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Size of a standard one-unit key.
    pub key: Expanse,
    /// Total keyboard height, padding included.
    pub height: u32,
}

/// An immutable keyboard model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Key rows, top to bottom.
    rows: Vec<Vec<KeySpec>>,
    /// Was an uppercase toggle requested?
    allow_uppercase: bool,
    /// Was a special character toggle requested?
    allow_special_chars: bool,
    /// Was a space bar requested?
    allow_space: bool,
    /// Gap between keys and rows.
    padding: u32,
    /// Fixed key size, if any.
    key_size: Option<Expanse>,
    /// Width of the space bar in key units.
    space_width: usize,
    /// Stretch every row to the full width.
    stretch_rows: bool,
    /// Smallest legible key dimension.
    min_key_size: u32,
}

impl Layout {
    /// Start building a layout from a character model.
    pub fn builder<S: AsRef<str>>(model: &[S]) -> LayoutBuilder {
        LayoutBuilder::new(model)
    }

    /// Build a layout from a character model with default options.
    pub fn new<S: AsRef<str>>(model: &[S]) -> Result<Self> {
        LayoutBuilder::new(model).build()
    }

    /// The key rows, special keys included.
    pub fn rows(&self) -> &[Vec<KeySpec>] {
        &self.rows
    }

    /// Gap between keys and rows, in pixels.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// The fixed key size, if one was configured.
    pub fn key_size(&self) -> Option<Expanse> {
        self.key_size
    }

    /// Does the layout include an uppercase toggle?
    pub fn allow_uppercase(&self) -> bool {
        self.allow_uppercase
    }

    /// Does the layout include a special character toggle?
    pub fn allow_special_chars(&self) -> bool {
        self.allow_special_chars
    }

    /// Does the layout include a space bar?
    pub fn allow_space(&self) -> bool {
        self.allow_space
    }

    /// Width of the space bar in key units.
    pub fn space_width(&self) -> usize {
        self.space_width
    }

    /// Every character a `Character` key of this layout can insert.
    pub fn characters(&self) -> impl Iterator<Item = char> + '_ {
        self.rows
            .iter()
            .flatten()
            .filter(|k| k.kind == KeyKind::Character)
            .filter_map(|k| k.value)
    }

    /// Width of a key in units.
    fn units(&self, spec: &KeySpec) -> usize {
        if spec.kind == KeyKind::Space {
            self.space_width
        } else {
            1
        }
    }

    /// Width of the widest row in key units. This is the sizing basis.
    pub fn basis(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.iter().map(|k| self.units(k)).sum::<usize>())
            .max()
            .unwrap_or(0)
    }

    /// Width in pixels of a key spanning `units` standard keys.
    fn span(&self, units: usize, key_w: u32) -> u32 {
        let units = units as u32;
        units
            .saturating_mul(key_w)
            .saturating_add(units.saturating_sub(1).saturating_mul(self.padding))
    }

    /// Compute key metrics for a target area.
    ///
    /// Without a fixed key size, keys are square and sized so that the widest
    /// row fits the area width. The resulting keyboard is capped at half the
    /// area height. A fixed key size must fit the area as given.
    pub fn metrics(&self, area: Expanse) -> Result<Metrics> {
        let rows = self.rows.len() as u32;
        let basis = self.basis() as u32;
        let p = self.padding;
        let overflow = || Error::config(format!("padding of {p}px or key size overflows"));
        let outer = |n: u32| p.checked_mul(n + 1).ok_or_else(overflow);
        let extent = |key: u32, n: u32| {
            key.checked_mul(n)
                .and_then(|k| k.checked_add(outer(n).ok()?))
                .ok_or_else(overflow)
        };

        let metrics = match self.key_size {
            Some(key) => {
                let width = extent(key.w, basis)?;
                let height = extent(key.h, rows)?;
                if width > area.w || height > area.h {
                    return Err(Error::config(format!(
                        "key size {}x{} needs {}x{}px, area is {}x{}px",
                        key.w, key.h, width, height, area.w, area.h
                    )));
                }
                Metrics { key, height }
            }
            None => {
                let avail = area.w.checked_sub(outer(basis)?).ok_or_else(|| {
                    Error::config(format!(
                        "padding of {p}px leaves no room for {basis} keys in {}px",
                        area.w
                    ))
                })?;
                let mut side = avail / basis;
                let mut height = extent(side, rows)?;
                let limit = area.h / MAX_HEIGHT_DIVISOR;
                if height > limit {
                    warn!(
                        height,
                        limit, "computed keyboard height exceeds target area, reducing key size"
                    );
                    side = limit.saturating_sub(outer(rows)?) / rows;
                    height = extent(side, rows)?;
                    warn!("normalized key size to {side}px");
                }
                Metrics {
                    key: Expanse::new(side, side),
                    height,
                }
            }
        };

        if metrics.key.w < self.min_key_size || metrics.key.h < self.min_key_size {
            return Err(Error::config(format!(
                "key size {}x{} is below the legible minimum of {}px",
                metrics.key.w, metrics.key.h, self.min_key_size
            )));
        }
        debug!(?metrics, ?area, "layout metrics");
        Ok(metrics)
    }

    /// Place every key, anchoring the keyboard to the bottom of `area`.
    /// `metrics.height` may exceed this layout's own height, which is how two
    /// layouts share the same bounds.
    pub fn place(&self, area: Rect, metrics: Metrics) -> Vec<(KeySpec, Rect)> {
        let p = self.padding;
        let key = metrics.key;
        let mut y = area.bottom().saturating_sub(metrics.height).saturating_add(p);
        let mut placed = Vec::with_capacity(self.rows.iter().map(Vec::len).sum());

        for row in &self.rows {
            let widths = if self.stretch_rows {
                self.stretched_widths(row, area.w, key.w)
            } else {
                row.iter()
                    .map(|k| self.span(self.units(k), key.w))
                    .collect()
            };
            let inner = widths
                .iter()
                .fold(0u32, |a, w| a.saturating_add(*w))
                .saturating_add(p.saturating_mul(widths.len() as u32 - 1));
            let mut x = area.tl.x + area.w.saturating_sub(inner) / 2;
            for (spec, w) in row.iter().zip(widths) {
                placed.push((*spec, Rect::new(x, y, w, key.h)));
                x = x.saturating_add(w).saturating_add(p);
            }
            y = y.saturating_add(key.h).saturating_add(p);
        }
        placed
    }

    /// Key widths for a row that spans the full area width. Space bars keep
    /// their unit width, the remaining keys share what is left.
    fn stretched_widths(&self, row: &[KeySpec], area_w: u32, key_w: u32) -> Vec<u32> {
        let avail = area_w.saturating_sub(self.padding.saturating_mul(row.len() as u32 + 1));
        let fixed: u32 = row
            .iter()
            .filter(|k| k.kind == KeyKind::Space)
            .map(|k| self.span(self.units(k), key_w))
            .fold(0u32, u32::saturating_add);
        let flexible = row.iter().filter(|k| k.kind != KeyKind::Space).count() as u32;
        let (share, mut extra) = if flexible == 0 {
            (0, 0)
        } else {
            let rest = avail.saturating_sub(fixed);
            (rest / flexible, rest % flexible)
        };
        row.iter()
            .map(|k| {
                if k.kind == KeyKind::Space {
                    self.span(self.units(k), key_w)
                } else if extra > 0 {
                    extra -= 1;
                    share + 1
                } else {
                    share
                }
            })
            .collect()
    }

    /// Map the layout onto `area`: every key with its rectangle, in reading
    /// order.
    pub fn compute_geometry(&self, area: Rect) -> Result<Vec<(KeySpec, Rect)>> {
        let metrics = self.metrics(area.expanse())?;
        Ok(self.place(area, metrics))
    }
}

/// Fluent builder for [`Layout`].
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    /// Character rows.
    model: Vec<Vec<char>>,
    /// Gap between keys.
    padding: u32,
    /// Fixed key size.
    key_size: Option<Expanse>,
    /// Include an uppercase toggle.
    allow_uppercase: bool,
    /// Include a special character toggle.
    allow_special_chars: bool,
    /// Include a space bar.
    allow_space: bool,
    /// Explicit space bar width in units.
    space_width: Option<usize>,
    /// Stretch rows to the full width.
    stretch_rows: bool,
    /// Smallest legible key dimension.
    min_key_size: u32,
}

impl LayoutBuilder {
    /// Start from a character model, one string per row.
    pub fn new<S: AsRef<str>>(model: &[S]) -> Self {
        Self {
            model: model.iter().map(|r| r.as_ref().chars().collect()).collect(),
            padding: DEFAULT_PADDING,
            key_size: None,
            allow_uppercase: true,
            allow_special_chars: true,
            allow_space: true,
            space_width: None,
            stretch_rows: false,
            min_key_size: DEFAULT_MIN_KEY_SIZE,
        }
    }

    /// Gap between keys and rows.
    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Use a fixed key size instead of computing one from the target area.
    pub fn key_size(mut self, size: impl Into<Expanse>) -> Self {
        self.key_size = Some(size.into());
        self
    }

    /// Include an uppercase toggle.
    pub fn allow_uppercase(mut self, allow: bool) -> Self {
        self.allow_uppercase = allow;
        self
    }

    /// Include a special character toggle.
    pub fn allow_special_chars(mut self, allow: bool) -> Self {
        self.allow_special_chars = allow;
        self
    }

    /// Include a space bar.
    pub fn allow_space(mut self, allow: bool) -> Self {
        self.allow_space = allow;
        self
    }

    /// Width of the space bar in key units.
    pub fn space_width(mut self, units: usize) -> Self {
        self.space_width = Some(units);
        self
    }

    /// Stretch every row to the full target width.
    pub fn stretch_rows(mut self, stretch: bool) -> Self {
        self.stretch_rows = stretch;
        self
    }

    /// Smallest legible key width or height.
    pub fn min_key_size(mut self, px: u32) -> Self {
        self.min_key_size = px;
        self
    }

    /// Validate the model and insert special keys.
    pub fn build(self) -> Result<Layout> {
        if self.model.is_empty() {
            return Err(Error::config("empty layout model"));
        }
        if let Some(i) = self.model.iter().position(Vec::is_empty) {
            return Err(Error::config(format!("layout row {i} is empty")));
        }
        if let Some(units) = self.space_width {
            if !self.allow_space {
                return Err(Error::config("space width set but space bar is disabled"));
            }
            if units < MIN_SPACE_WIDTH {
                return Err(Error::config(format!(
                    "space width of {units} is below the minimum of {MIN_SPACE_WIDTH} keys"
                )));
            }
        }
        if self.key_size.is_some_and(|k| k.is_empty()) {
            return Err(Error::config("key size must not be zero"));
        }

        let mut rows: Vec<Vec<KeySpec>> = self
            .model
            .iter()
            .map(|r| r.iter().copied().map(KeySpec::character).collect())
            .collect();
        let derived = insert_special_keys(
            &mut rows,
            self.allow_uppercase,
            self.allow_special_chars,
            self.allow_space,
        );
        let space_width = self
            .space_width
            .unwrap_or_else(|| derived.max(MIN_SPACE_WIDTH));

        Ok(Layout {
            rows,
            allow_uppercase: self.allow_uppercase,
            allow_special_chars: self.allow_special_chars,
            allow_space: self.allow_space,
            padding: self.padding,
            key_size: self.key_size,
            space_width,
            stretch_rows: self.stretch_rows,
            min_key_size: self.min_key_size,
        })
    }
}

/// Insert backspace, the allowed toggles and the space bar into `rows`.
///
/// Special keys first fill the gaps of rows shorter than the longest one,
/// starting from the bottom row, alternately appended and prepended. Whatever
/// does not fit goes to an extra bottom row alongside the space bar. Returns
/// the space bar width in units implied by the surrounding rows.
fn insert_special_keys(
    rows: &mut Vec<Vec<KeySpec>>,
    uppercase: bool,
    special: bool,
    space: bool,
) -> usize {
    let longest = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut pending: VecDeque<KeySpec> = VecDeque::from([KeySpec::special(KeyKind::Backspace)]);
    if uppercase {
        pending.push_back(KeySpec::special(KeyKind::UppercaseToggle));
    }
    if special {
        pending.push_back(KeySpec::special(KeyKind::SpecialToggle));
    }

    let mut i = rows.len() - 1;
    while !pending.is_empty() {
        let mut prepend = false;
        while rows[i].len() < longest {
            let Some(k) = pending.pop_front() else {
                break;
            };
            if prepend {
                rows[i].insert(0, k);
            } else {
                rows[i].push(k);
            }
            prepend = !prepend;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }
    let derived = rows[i].len().saturating_sub(pending.len());

    let mut extra = VecDeque::new();
    if space {
        extra.push_back(KeySpec::special(KeyKind::Space));
    }
    let mut prepend = true;
    while let Some(k) = pending.pop_front() {
        if prepend {
            extra.push_front(k);
        } else {
            extra.push_back(k);
        }
        prepend = !prepend;
    }
    if !extra.is_empty() {
        rows.push(extra.into());
    }
    derived
}

/// Serializable layout description, for hosts that keep layouts in their
/// own configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Character rows.
    pub model: Vec<String>,
    /// Gap between keys and rows.
    pub padding: u32,
    /// Fixed key size as `[width, height]`.
    pub key_size: Option<[u32; 2]>,
    /// Include an uppercase toggle.
    pub allow_uppercase: bool,
    /// Include a special character toggle.
    pub allow_special_chars: bool,
    /// Include a space bar.
    pub allow_space: bool,
    /// Space bar width in key units.
    pub space_width: Option<usize>,
    /// Stretch rows to the full width.
    pub stretch_rows: bool,
    /// Smallest legible key dimension.
    pub min_key_size: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            model: crate::presets::AZERTY.iter().map(|r| r.to_string()).collect(),
            padding: DEFAULT_PADDING,
            key_size: None,
            allow_uppercase: true,
            allow_special_chars: true,
            allow_space: true,
            space_width: None,
            stretch_rows: false,
            min_key_size: DEFAULT_MIN_KEY_SIZE,
        }
    }
}

impl TryFrom<LayoutConfig> for Layout {
    type Error = Error;

    fn try_from(c: LayoutConfig) -> Result<Self> {
        let mut b = LayoutBuilder::new(&c.model)
            .padding(c.padding)
            .allow_uppercase(c.allow_uppercase)
            .allow_special_chars(c.allow_special_chars)
            .allow_space(c.allow_space)
            .stretch_rows(c.stretch_rows)
            .min_key_size(c.min_key_size);
        if let Some([w, h]) = c.key_size {
            b = b.key_size((w, h));
        }
        if let Some(units) = c.space_width {
            b = b.space_width(units);
        }
        b.build()
    }
}
