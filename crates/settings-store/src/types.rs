use std::fmt;

use keycombo::Combo;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Logical actions a hotkey can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Translate the current text selection.
    Select,
    /// Translate the clipboard contents.
    Clip,
}

impl Action {
    /// Every declared action, in default document order.
    pub const ALL: [Self; 2] = [Self::Select, Self::Clip];

    /// Stable name used in logs and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "Select",
            Self::Clip => "Clip",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One hotkey: which action it triggers, whether it is enabled, and its combo.
///
/// The aliases accept documents written by older releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    /// The action this binding triggers. Unique within a document.
    #[serde(alias = "use")]
    pub action: Action,
    /// Whether the binding should be registered with the host.
    #[serde(alias = "isOpen", default)]
    pub enabled: bool,
    /// User-facing description.
    #[serde(alias = "desc", default)]
    pub description: String,
    /// Canonical combo string, e.g. `ALT+X`.
    #[serde(alias = "keys")]
    pub combo: String,
}

/// The whole persisted settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    /// Identifier of the selected translation backend; empty when none.
    #[serde(alias = "defaultApi", default)]
    pub selected_backend: String,
    /// Translate automatically when text arrives.
    #[serde(alias = "autoTrans", default)]
    pub auto_translate: bool,
    /// Hotkey bindings, one per action, in display order.
    #[serde(alias = "hotKeyList", default)]
    pub hotkeys: Vec<HotkeyBinding>,
}

impl SettingsDocument {
    /// Look up the binding for `action`.
    pub fn binding(&self, action: Action) -> Option<&HotkeyBinding> {
        self.hotkeys.iter().find(|b| b.action == action)
    }

    /// Mutable lookup of the binding for `action`.
    pub fn binding_mut(&mut self, action: Action) -> Option<&mut HotkeyBinding> {
        self.hotkeys.iter_mut().find(|b| b.action == action)
    }

    /// Find an enabled binding other than `except` that uses `combo`.
    pub fn enabled_holder_of(&self, combo: &str, except: Action) -> Option<Action> {
        self.hotkeys
            .iter()
            .find(|b| b.enabled && b.action != except && b.combo == combo)
            .map(|b| b.action)
    }

    /// Enforce one binding per action, each with a canonical combo.
    ///
    /// Duplicate bindings are dropped (first wins) and actions missing from
    /// the document are appended from `defaults`. Combos are rewritten in
    /// canonical form; one that does not parse is replaced by the default
    /// combo and its binding disabled. Returns true if anything changed.
    pub fn normalize(&mut self, defaults: &Self) -> bool {
        let before = self.hotkeys.len();
        let mut seen = Vec::with_capacity(Action::ALL.len());
        self.hotkeys.retain(|b| {
            if seen.contains(&b.action) {
                false
            } else {
                seen.push(b.action);
                true
            }
        });
        let mut changed = self.hotkeys.len() != before;

        for d in &defaults.hotkeys {
            if !seen.contains(&d.action) {
                self.hotkeys.push(d.clone());
                changed = true;
            }
        }

        for b in &mut self.hotkeys {
            match Combo::canonicalize(&b.combo) {
                Ok(c) if c == b.combo => {}
                Ok(c) => {
                    b.combo = c;
                    changed = true;
                }
                Err(e) => {
                    let fallback = defaults.binding(b.action).map(|d| d.combo.clone());
                    warn!(action = %b.action, combo = %b.combo, error = %e, "stored_combo_invalid");
                    b.combo = fallback.unwrap_or_default();
                    b.enabled = false;
                    changed = true;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(action: Action, combo: &str, enabled: bool) -> HotkeyBinding {
        HotkeyBinding {
            action,
            enabled,
            description: String::new(),
            combo: combo.into(),
        }
    }

    #[test]
    fn action_names() {
        assert_eq!(Action::from_name("select"), Some(Action::Select));
        assert_eq!(Action::from_name(" CLIP "), Some(Action::Clip));
        assert_eq!(Action::from_name("paste"), None);
        assert_eq!(Action::Clip.to_string(), "Clip");
    }

    #[test]
    fn normalize_dedupes_and_fills() {
        let defaults = SettingsDocument::default();
        let mut doc = SettingsDocument {
            selected_backend: "youdao".into(),
            auto_translate: true,
            hotkeys: vec![
                binding(Action::Select, "ALT+Q", true),
                binding(Action::Select, "ALT+W", false),
            ],
        };
        assert!(doc.normalize(&defaults));
        assert_eq!(doc.hotkeys.len(), 2);
        assert_eq!(doc.binding(Action::Select).map(|b| b.combo.as_str()), Some("ALT+Q"));
        assert_eq!(doc.binding(Action::Clip).map(|b| b.combo.as_str()), Some("ALT+C"));

        let mut again = doc.clone();
        assert!(!again.normalize(&defaults));
        assert_eq!(again, doc);
    }

    #[test]
    fn normalize_canonicalizes_combos() {
        let defaults = SettingsDocument::default();
        let mut doc = SettingsDocument {
            selected_backend: String::new(),
            auto_translate: false,
            hotkeys: vec![
                binding(Action::Select, "shift+alt+x", true),
                binding(Action::Clip, "HYPER+Q", true),
            ],
        };
        assert!(doc.normalize(&defaults));
        assert_eq!(
            doc.binding(Action::Select),
            Some(&binding(Action::Select, "ALT+SHIFT+X", true))
        );
        assert_eq!(
            doc.binding(Action::Clip),
            Some(&binding(Action::Clip, "ALT+C", false))
        );
        assert!(!doc.normalize(&defaults));
    }

    #[test]
    fn enabled_holder_ignores_disabled_and_self() {
        let doc = SettingsDocument {
            selected_backend: String::new(),
            auto_translate: false,
            hotkeys: vec![
                binding(Action::Select, "ALT+X", true),
                binding(Action::Clip, "ALT+C", false),
            ],
        };
        assert_eq!(doc.enabled_holder_of("ALT+X", Action::Clip), Some(Action::Select));
        assert_eq!(doc.enabled_holder_of("ALT+X", Action::Select), None);
        assert_eq!(doc.enabled_holder_of("ALT+C", Action::Select), None);
    }

    #[test]
    fn reads_legacy_field_names() {
        let json = r#"{
            "defaultApi": "youdao",
            "autoTrans": true,
            "hotKeyList": [
                {"use": "Select", "isOpen": true, "desc": "sel", "keys": "ALT+X"},
                {"use": "Clip", "isOpen": false, "desc": "clip", "keys": "ALT+C"}
            ]
        }"#;
        let doc: SettingsDocument = serde_json::from_str(json).expect("legacy doc");
        assert_eq!(doc.selected_backend, "youdao");
        assert!(doc.auto_translate);
        let sel = doc.binding(Action::Select).expect("select binding");
        assert!(sel.enabled);
        assert_eq!(sel.description, "sel");
        assert_eq!(sel.combo, "ALT+X");
    }

    #[test]
    fn writes_current_field_names() {
        let v = serde_json::to_value(SettingsDocument::default()).expect("encode");
        assert!(v.get("selectedBackend").is_some());
        assert!(v.get("autoTranslate").is_some());
        let first = &v["hotkeys"][0];
        assert_eq!(first["action"], "Select");
        assert_eq!(first["combo"], "ALT+X");
        assert_eq!(first["enabled"], false);
    }
}
