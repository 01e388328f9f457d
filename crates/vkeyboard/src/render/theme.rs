use super::{Color, Painter, Renderer, TextView};
use crate::{
    Result,
    geom::Rect,
    key::{Key, KeyState},
    layout::KeyKind,
    measure::fit_font_size,
    rgb,
};

/// One color per key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateColors {
    /// Color of a key at rest.
    pub released: Color,
    /// Color of a pressed key.
    pub pressed: Color,
    /// Color of a selected key.
    pub selected: Color,
}

impl StateColors {
    /// The color for a key state.
    pub fn get(&self, state: KeyState) -> Color {
        match state {
            KeyState::Released => self.released,
            KeyState::Pressed => self.pressed,
            KeyState::Selected => self.selected,
        }
    }
}

/// A flat-color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Theme {
    /// Keyboard background.
    pub background: Color,
    /// Key labels.
    pub text: StateColors,
    /// Character and space key fill.
    pub key: StateColors,
    /// Fill for backspace and the toggles. Falls back to `key`.
    pub special: Option<StateColors>,
    /// Outline drawn around the selected key.
    pub outline: Color,
    /// Text box fill.
    pub text_box: Color,
    /// Text box text.
    pub text_box_text: Color,
    /// Text cursor.
    pub cursor: Color,
}

impl Theme {
    /// Black on white.
    pub const DEFAULT: Self = Self {
        background: rgb!("#ffffff"),
        text: StateColors {
            released: rgb!("#000000"),
            pressed: rgb!("#ffffff"),
            selected: rgb!("#000000"),
        },
        key: StateColors {
            released: rgb!("#ffffff"),
            pressed: rgb!("#000000"),
            selected: rgb!("#ffffff"),
        },
        special: Some(StateColors {
            released: rgb!("#b4b4b4"),
            pressed: rgb!("#000000"),
            selected: rgb!("#b4b4b4"),
        }),
        outline: rgb!("#3c78d8"),
        text_box: rgb!("#dcdcdc"),
        text_box_text: rgb!("#000000"),
        cursor: rgb!("#000000"),
    };

    /// Light grey on charcoal.
    pub const DARK: Self = Self {
        background: rgb!("#282923"),
        text: StateColors {
            released: rgb!("#c8c8c8"),
            pressed: rgb!("#ffffff"),
            selected: rgb!("#c8c8c8"),
        },
        key: StateColors {
            released: rgb!("#414243"),
            pressed: rgb!("#2f3033"),
            selected: rgb!("#414243"),
        },
        special: Some(StateColors {
            released: rgb!("#787878"),
            pressed: rgb!("#000000"),
            selected: rgb!("#787878"),
        }),
        outline: rgb!("#8ab4f8"),
        text_box: rgb!("#505050"),
        text_box_text: rgb!("#c8c8c8"),
        cursor: rgb!("#ffffff"),
    };

    /// Look up a built-in theme by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" | "light" => Some(Self::DEFAULT),
            "dark" => Some(Self::DARK),
            _ => None,
        }
    }

    /// Fill palette for a key.
    fn fill_for(&self, key: &Key) -> StateColors {
        match (key.spec.kind, self.special) {
            (KeyKind::Character | KeyKind::Space, _) | (_, None) => self.key,
            (_, Some(s)) => s,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Renderer for Theme {
    fn draw_background(&self, p: &mut Painter<'_>, area: Rect) -> Result<()> {
        p.fill(area, self.background)
    }

    fn draw_key(&self, p: &mut Painter<'_>, key: &Key) -> Result<()> {
        p.fill(key.rect, self.fill_for(key).get(key.state))?;
        if key.state == KeyState::Selected {
            p.outline(key.rect, 1, self.outline)?;
        }

        let label = key.label();
        let mut size = fit_font_size(p.measure(), key.rect.h);
        while size > 1 && p.measure().text_width(&label, size) > key.rect.w {
            size -= 1;
        }
        p.text_centered(key.rect, &label, size, self.text.get(key.state))
    }

    fn draw_text_box(&self, p: &mut Painter<'_>, view: &TextView<'_>) -> Result<()> {
        p.fill(view.rect, self.text_box)?;
        p.text(view.inner.tl, view.visible, view.font_size, self.text_box_text)
    }

    fn draw_cursor(&self, p: &mut Painter<'_>, rect: Rect) -> Result<()> {
        p.fill(rect, self.cursor)
    }
}
