//! Built-in default document, seeded with descriptions in the user's language.

use crate::{Action, HotkeyBinding, SettingsDocument};

/// Default combo for each action.
fn default_combo(action: Action) -> &'static str {
    match action {
        Action::Select => "ALT+X",
        Action::Clip => "ALT+C",
    }
}

/// Description of `action` for the given BCP-47-ish locale tag.
///
/// Chinese locales (`zh*`) get Chinese descriptions; everything else gets English.
pub fn default_description(action: Action, locale: &str) -> &'static str {
    let zh = locale.to_ascii_lowercase().starts_with("zh");
    match (action, zh) {
        (Action::Select, true) => "获取选中文本",
        (Action::Clip, true) => "获取粘贴文本",
        (Action::Select, false) => "Translate selected text",
        (Action::Clip, false) => "Translate clipboard text",
    }
}

/// The current system locale, falling back to `en`.
pub fn system_locale() -> String {
    sys_locale::get_locale().unwrap_or_else(|| "en".to_string())
}

impl SettingsDocument {
    /// Default document for `locale`: both hotkeys disabled, no backend, auto-translate off.
    pub fn seeded(locale: &str) -> Self {
        Self {
            selected_backend: String::new(),
            auto_translate: false,
            hotkeys: Action::ALL
                .into_iter()
                .map(|action| HotkeyBinding {
                    action,
                    enabled: false,
                    description: default_description(action, locale).to_string(),
                    combo: default_combo(action).to_string(),
                })
                .collect(),
        }
    }
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self::seeded("en")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_disabled() {
        let doc = SettingsDocument::default();
        assert_eq!(doc.selected_backend, "");
        assert!(!doc.auto_translate);
        assert_eq!(doc.hotkeys.len(), 2);
        assert!(doc.hotkeys.iter().all(|b| !b.enabled));
        assert_eq!(doc.hotkeys[0].action, Action::Select);
        assert_eq!(doc.hotkeys[0].combo, "ALT+X");
        assert_eq!(doc.hotkeys[1].action, Action::Clip);
        assert_eq!(doc.hotkeys[1].combo, "ALT+C");
    }

    #[test]
    fn chinese_descriptions() {
        let doc = SettingsDocument::seeded("zh-CN");
        assert_eq!(doc.hotkeys[0].description, "获取选中文本");
        assert_eq!(doc.hotkeys[1].description, "获取粘贴文本");
        assert_eq!(
            default_description(Action::Select, "en-US"),
            "Translate selected text"
        );
    }
}
