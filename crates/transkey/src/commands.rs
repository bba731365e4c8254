//! Offline edits of the persisted settings document.

use std::sync::Arc;

use keycombo::{Combo, display_glyphs};
use parking_lot::Mutex;
use settings_store::{Action, DocumentStorage, SettingsDocument, SettingsStore};
use tracing::{debug, info};

use crate::{
    cli::Commands,
    error::{Error, Result},
};

/// Open the stored settings for editing.
///
/// Unlike the application, an unreadable file is an error here: falling
/// back to defaults would overwrite it on the next save.
pub async fn open(storage: Arc<dyn DocumentStorage>, locale: &str) -> Result<SettingsStore> {
    let loaded = SettingsStore::load(storage, SettingsDocument::seeded(locale)).await;
    match loaded.warning {
        Some(e) => Err(e.into()),
        None => Ok(loaded.store),
    }
}

/// Run `command` against `store`, returning the text to print.
pub async fn run(store: &SettingsStore, command: &Commands, locale: &str) -> Result<String> {
    let save_error = Arc::new(Mutex::new(None));
    let hook_slot = save_error.clone();
    store.set_save_error_hook(Arc::new(move |e: &settings_store::Error| {
        *hook_slot.lock() = Some(e.clone());
    }));

    let out = match command {
        Commands::Show => return Ok(render(&store.snapshot())),
        Commands::SetBackend { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidArgument("backend name is empty".into()));
            }
            store.update(|d| d.selected_backend = name.to_string()).await;
            format!("backend: {name}")
        }
        Commands::AutoTranslate { state } => {
            store.update(|d| d.auto_translate = state.is_on()).await;
            format!("auto-translate: {}", on_off(state.is_on()))
        }
        Commands::Bind { action, combo } => bind(store, *action, combo).await?,
        Commands::Enable { action } => set_enabled(store, *action, true).await?,
        Commands::Disable { action } => set_enabled(store, *action, false).await?,
        Commands::Reset => {
            store.update(|d| *d = SettingsDocument::seeded(locale)).await;
            "settings reset to defaults".to_string()
        }
    };

    match save_error.lock().take() {
        Some(e) => Err(e.into()),
        None => Ok(out),
    }
}

async fn bind(store: &SettingsStore, action: Action, combo: &str) -> Result<String> {
    let combo = Combo::canonicalize(combo)?;
    let enabled = store.read(|d| d.binding(action).is_some_and(|b| b.enabled));
    if enabled {
        ensure_free(store, &combo, action)?;
    }
    store
        .update(|d| {
            if let Some(b) = d.binding_mut(action) {
                b.combo.clone_from(&combo);
            }
        })
        .await;
    info!(%action, combo = %combo, "binding_changed");
    Ok(format!("{action}: {combo} ({})", display_glyphs(&combo)))
}

async fn set_enabled(store: &SettingsStore, action: Action, enable: bool) -> Result<String> {
    let combo = store.read(|d| d.binding(action).map(|b| b.combo.clone()));
    let combo = combo.ok_or_else(|| Error::InvalidArgument(format!("no binding for {action}")))?;
    if enable {
        ensure_free(store, &combo, action)?;
    }
    store
        .update(|d| {
            if let Some(b) = d.binding_mut(action) {
                b.enabled = enable;
            }
        })
        .await;
    debug!(%action, enable, "binding_toggled");
    Ok(format!("{action}: {}", if enable { "enabled" } else { "disabled" }))
}

/// Reject `combo` if an enabled binding other than `action`'s holds it.
fn ensure_free(store: &SettingsStore, combo: &str, action: Action) -> Result<()> {
    match store.read(|d| d.enabled_holder_of(combo, action)) {
        Some(holder) => Err(Error::ComboInUse {
            combo: combo.to_string(),
            holder,
        }),
        None => Ok(()),
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

/// Human-readable settings listing.
pub fn render(doc: &SettingsDocument) -> String {
    let backend = if doc.selected_backend.is_empty() {
        "(none)"
    } else {
        &doc.selected_backend
    };
    let mut out = format!(
        "backend: {backend}\nauto-translate: {}\nhotkeys:\n",
        on_off(doc.auto_translate)
    );
    for b in &doc.hotkeys {
        let state = if b.enabled { "enabled" } else { "disabled" };
        out.push_str(&format!(
            "  {:<7} {:<14} {:<6} {:<9} {}\n",
            b.action.name(),
            b.combo,
            display_glyphs(&b.combo),
            state,
            b.description
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use settings_store::{JsonFileStorage, MemoryStorage};

    use super::*;
    use crate::cli::Toggle;

    async fn store() -> (SettingsStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = open(storage.clone(), "en").await.unwrap();
        (store, storage)
    }

    #[tokio::test]
    async fn show_lists_defaults() {
        let (store, _) = store().await;
        let out = run(&store, &Commands::Show, "en").await.unwrap();
        assert!(out.starts_with("backend: (none)\nauto-translate: off\n"));
        assert!(out.contains("Select"));
        assert!(out.contains("⌥X"));
        assert!(out.contains("Translate clipboard text"));
    }

    #[tokio::test]
    async fn bind_canonicalizes_and_saves() {
        let (store, storage) = store().await;
        let cmd = Commands::Bind {
            action: Action::Clip,
            combo: "shift+ctrl+v".into(),
        };
        let out = run(&store, &cmd, "en").await.unwrap();
        assert_eq!(out, "Clip: CTRL+SHIFT+V (⌃⇧V)");
        let saved = storage.stored().unwrap();
        assert_eq!(saved.binding(Action::Clip).unwrap().combo, "CTRL+SHIFT+V");
    }

    #[tokio::test]
    async fn bind_rejects_bad_combo() {
        let (store, storage) = store().await;
        let cmd = Commands::Bind {
            action: Action::Clip,
            combo: "ALT+".into(),
        };
        assert!(matches!(run(&store, &cmd, "en").await, Err(Error::Combo(_))));
        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn enable_refuses_combo_in_use() {
        let (store, _) = store().await;
        run(&store, &Commands::Enable { action: Action::Select }, "en")
            .await
            .unwrap();
        let bind = Commands::Bind {
            action: Action::Clip,
            combo: "alt+x".into(),
        };
        run(&store, &bind, "en").await.unwrap();
        let err = run(&store, &Commands::Enable { action: Action::Clip }, "en")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ComboInUse {
                holder: Action::Select,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn save_failure_is_reported() {
        let (store, storage) = store().await;
        storage.set_fail_write(true);
        let cmd = Commands::AutoTranslate { state: Toggle::On };
        assert!(matches!(run(&store, &cmd, "en").await, Err(Error::Settings(_))));
    }

    #[tokio::test]
    async fn corrupt_file_is_not_overwritten() {
        let storage = Arc::new(MemoryStorage::with_body("{"));
        assert!(matches!(open(storage.clone(), "en").await, Err(Error::Settings(_))));
        assert_eq!(storage.body().as_deref(), Some("{"));
    }

    #[tokio::test]
    async fn reset_and_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let storage = Arc::new(JsonFileStorage::new(&path));
        let store = open(storage.clone(), "zh-CN").await.unwrap();
        let cmd = Commands::SetBackend {
            name: "deepl".into(),
        };
        run(&store, &cmd, "zh-CN").await.unwrap();
        run(&store, &Commands::Reset, "zh-CN").await.unwrap();

        let reopened = open(storage, "en").await.unwrap();
        let doc = reopened.snapshot();
        assert_eq!(doc.selected_backend, "");
        assert_eq!(doc.binding(Action::Select).unwrap().description, "获取选中文本");
    }
}
