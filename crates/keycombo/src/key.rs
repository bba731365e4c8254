use std::fmt;

// Canonical named keys and the aliases accepted when parsing.
// Extend this list to cover more named keys.
const NAMED_KEYS: &[(&str, &[&str])] = &[
    ("SPACE", &["space", "spacebar"]),
    ("ENTER", &["enter", "return", "ret"]),
    ("TAB", &["tab"]),
    ("ESC", &["esc", "escape"]),
    ("BACKSPACE", &["backspace"]),
    ("DELETE", &["delete", "del"]),
    ("INSERT", &["insert", "ins"]),
    ("HOME", &["home"]),
    ("END", &["end"]),
    ("PAGEUP", &["pageup", "pgup"]),
    ("PAGEDOWN", &["pagedown", "pgdn"]),
    ("UP", &["up", "arrowup"]),
    ("DOWN", &["down", "arrowdown"]),
    ("LEFT", &["left", "arrowleft"]),
    ("RIGHT", &["right", "arrowright"]),
];

const PUNCTUATION: &[char] = &['-', '=', '[', ']', '\\', ';', '\'', ',', '.', '/', '`'];

/// Highest function key number accepted (`F1`..`F24`).
const MAX_FUNCTION_KEY: u8 = 24;

/// A validated non-modifier key in canonical form.
///
/// Letters are upper-case (`X`), digits and punctuation are literal, function
/// keys are `F1`..`F24`, and named keys use the upper-case names above
/// (`SPACE`, `UP`, `PAGEDOWN`, ...).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Key(String);

impl Key {
    /// Parses a key token, returning its canonical form.
    pub fn from_token(s: &str) -> Option<Self> {
        let t = s.trim();
        let mut chars = t.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphanumeric() {
                return Some(Self(c.to_ascii_uppercase().to_string()));
            }
            if PUNCTUATION.contains(&c) {
                return Some(Self(c.to_string()));
            }
            return None;
        }

        let lower = t.to_ascii_lowercase();
        if let Some(n) = lower.strip_prefix('f')
            && let Ok(num) = n.parse::<u8>()
            && (1..=MAX_FUNCTION_KEY).contains(&num)
            && !n.starts_with('0')
        {
            return Some(Self(format!("F{num}")));
        }

        NAMED_KEYS
            .iter()
            .find(|(_, aliases)| aliases.contains(&lower.as_str()))
            .map(|(name, _)| Self((*name).to_string()))
    }

    /// Canonical token for this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
