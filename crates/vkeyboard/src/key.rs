use crate::{
    geom::{Point, Rect},
    layout::{KeyKind, KeySpec},
};

/// Visual state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyState {
    /// At rest.
    #[default]
    Released,
    /// Held down by a pointer or by activation.
    Pressed,
    /// Highlighted by directional navigation.
    Selected,
}

/// A key of the active keyboard variant: a [`KeySpec`] placed on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    /// What the key is.
    pub spec: KeySpec,
    /// Where the key is drawn.
    pub rect: Rect,
    /// Current visual state.
    pub state: KeyState,
    /// Is the mode this key toggles currently on? Only meaningful for the
    /// uppercase and special toggles.
    pub active: bool,
}

impl Key {
    /// A released key.
    pub fn new(spec: KeySpec, rect: Rect) -> Self {
        Self {
            spec,
            rect,
            state: KeyState::Released,
            active: false,
        }
    }

    /// Does the key contain the point?
    pub fn contains(&self, p: Point) -> bool {
        self.rect.contains_point(p)
    }

    /// The text drawn on the key.
    pub fn label(&self) -> String {
        match self.spec.kind {
            KeyKind::Character => self.spec.value.map(String::from).unwrap_or_default(),
            KeyKind::Space => "space".into(),
            KeyKind::Backspace => "\u{2190}".into(),
            KeyKind::UppercaseToggle if self.active => "\u{21ea}".into(),
            KeyKind::UppercaseToggle => "\u{21e7}".into(),
            KeyKind::SpecialToggle if self.active => "Ab".into(),
            KeyKind::SpecialToggle => "#".into(),
        }
    }

    /// Is this one of the non-character keys?
    pub fn is_special(&self) -> bool {
        !matches!(self.spec.kind, KeyKind::Character)
    }
}
