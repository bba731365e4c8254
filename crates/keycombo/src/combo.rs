use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::{Error, Key, Modifier, Result};

/// A key combo: a set of modifiers plus a single key.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Combo {
    /// Modifier keys held down for this combo.
    pub modifiers: BTreeSet<Modifier>,
    /// The non-modifier key.
    pub key: Key,
}

impl Combo {
    /// Parses a combo of the form `ALT+X` or `ctrl+shift+F5`.
    ///
    /// - Case-insensitive for modifiers and the key.
    /// - Components are separated by `+`; the last component is the key.
    /// - Each modifier may appear once.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Empty);
        }
        let mut parts: Vec<&str> = trimmed.split('+').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::EmptyToken {
                combo: trimmed.to_string(),
            });
        }
        // split always yields at least one element
        let key_raw = parts.pop().unwrap_or_default();

        let mut modifiers = BTreeSet::new();
        for token in parts {
            let m = Modifier::from_token(token).ok_or_else(|| Error::UnknownModifier {
                token: token.to_string(),
            })?;
            if !modifiers.insert(m) {
                return Err(Error::DuplicateModifier {
                    token: m.token().to_string(),
                });
            }
        }

        if Modifier::from_token(key_raw).is_some() {
            return Err(Error::MissingKey {
                combo: trimmed.to_string(),
            });
        }
        let key = Key::from_token(key_raw).ok_or_else(|| Error::UnknownKey {
            token: key_raw.to_string(),
        })?;
        Ok(Self { modifiers, key })
    }

    /// Parses `s` and returns its canonical string form.
    pub fn canonicalize(s: &str) -> Result<String> {
        Ok(Self::parse(s)?.to_string())
    }

    /// Canonical tokens in render order: modifiers (CTRL, ALT, SHIFT, CMD) then the key.
    pub fn tokens(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.modifiers.iter().map(|m| m.token()).collect();
        out.push(self.key.as_str());
        out
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join("+"))
    }
}

impl FromStr for Combo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parse_basic_combo() {
        let c = Combo::parse("ALT+X").expect("parse");
        assert!(c.modifiers.contains(&Modifier::Alt));
        assert_eq!(c.key.as_str(), "X");
        assert_eq!(c.to_string(), "ALT+X");
    }

    #[test]
    fn canonical_order_and_case() {
        assert_eq!(
            Combo::canonicalize("shift+cmd+ctrl+k").expect("parse"),
            "CTRL+SHIFT+CMD+K"
        );
        assert_eq!(Combo::canonicalize(" alt + c ").expect("parse"), "ALT+C");
        assert_eq!(Combo::canonicalize("f5").expect("parse"), "F5");
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(Combo::parse(""), Err(Error::Empty));
        assert!(matches!(
            Combo::parse("ALT++X"),
            Err(Error::EmptyToken { .. })
        ));
        assert!(matches!(
            Combo::parse("ALT+SHIFT"),
            Err(Error::MissingKey { .. })
        ));
        assert!(matches!(
            Combo::parse("HYPER+X"),
            Err(Error::UnknownModifier { .. })
        ));
        assert!(matches!(
            Combo::parse("ALT+alt+X"),
            Err(Error::DuplicateModifier { .. })
        ));
        assert!(matches!(
            Combo::parse("ALT+banana"),
            Err(Error::UnknownKey { .. })
        ));
    }

    fn combo_strategy() -> impl Strategy<Value = String> {
        (
            proptest::sample::subsequence(vec!["ctrl", "Alt", "SHIFT", "cmd"], 0..=4),
            prop_oneof![
                "[a-zA-Z0-9]",
                (1u8..=24).prop_map(|n| format!("f{n}")),
                Just("up".to_string()),
                Just("Space".to_string()),
            ],
        )
            .prop_map(|(mods, key)| {
                let mut parts: Vec<String> = mods.into_iter().map(str::to_string).collect();
                parts.push(key);
                parts.join("+")
            })
    }

    proptest! {
        #[test]
        fn canonical_form_is_a_fixed_point(s in combo_strategy()) {
            let once = Combo::canonicalize(&s).expect("parse generated combo");
            let twice = Combo::canonicalize(&once).expect("reparse canonical");
            prop_assert_eq!(once, twice);
        }
    }
}
