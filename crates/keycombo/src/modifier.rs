use std::fmt;

/// Modifier keys accepted in a combo.
///
/// Declaration order is the canonical order used when rendering a combo.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Modifier {
    /// `CTRL`
    Ctrl,
    /// `ALT` (Option on macOS)
    Alt,
    /// `SHIFT`
    Shift,
    /// `CMD` (Super/Windows elsewhere)
    Cmd,
}

impl Modifier {
    /// All modifiers in canonical order.
    pub const ALL: [Self; 4] = [Self::Ctrl, Self::Alt, Self::Shift, Self::Cmd];

    /// Parses a modifier token.
    ///
    /// Case-insensitive. Accepts the canonical tokens plus common aliases
    /// (`control`, `option`/`opt`, `command`/`super`/`meta`).
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::Ctrl),
            "alt" | "option" | "opt" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            "cmd" | "command" | "super" | "meta" => Some(Self::Cmd),
            _ => None,
        }
    }

    /// Returns the canonical upper-case token.
    pub fn token(self) -> &'static str {
        match self {
            Self::Ctrl => "CTRL",
            Self::Alt => "ALT",
            Self::Shift => "SHIFT",
            Self::Cmd => "CMD",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_tokens() {
        assert_eq!(Modifier::from_token("ctrl"), Some(Modifier::Ctrl));
        assert_eq!(Modifier::from_token("Control"), Some(Modifier::Ctrl));
        assert_eq!(Modifier::from_token("ALT"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_token("opt"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_token("super"), Some(Modifier::Cmd));
        assert_eq!(Modifier::from_token("x"), None);

        for m in Modifier::ALL {
            assert_eq!(Modifier::from_token(m.token()), Some(m));
        }
    }
}
