//! Built-in layout models. Each model is a list of rows, one string per row,
//! one key per character.

/// French AZERTY layout.
pub const AZERTY: &[&str] = &["1234567890", "azertyuiop", "qsdfghjklm", "wxcvbn"];

/// QWERTY layout.
pub const QWERTY: &[&str] = &["1234567890", "qwertyuiop", "asdfghjkl", "wzxcvbnm"];

/// Numeric keypad.
pub const NUMBER: &[&str] = &["123", "456", "789", "0"];

/// Special characters, used for the special variant of a keyboard.
pub const SPECIAL: &[&str] = &[
    "&é\"'(§è!çà)",
    "°_-^$¨*ù`%£",
    ",;:=?.@+<>#",
    "[]{}/\\|",
];

/// Look up a preset model by name.
pub fn by_name(name: &str) -> Option<&'static [&'static str]> {
    match name.to_ascii_lowercase().as_str() {
        "azerty" => Some(AZERTY),
        "qwerty" => Some(QWERTY),
        "number" | "numeric" => Some(NUMBER),
        "special" => Some(SPECIAL),
        _ => None,
    }
}
