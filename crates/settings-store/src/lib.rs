//! Persisted settings for transkey: the document model, its built-in
//! defaults, the storage facility it is read from and written to, and the
//! autosaving [`SettingsStore`] that owns the in-memory copy.

use std::{
    env,
    path::{Path, PathBuf},
};

mod defaults;
mod error;
mod storage;
mod store;
mod types;

pub use defaults::{default_description, system_locale};
pub use error::{Error, Result};
pub use storage::{DocumentStorage, JsonFileStorage, MemoryStorage};
pub use store::{Loaded, SaveErrorHook, SettingsStore, SharedDocument};
pub use types::{Action, HotkeyBinding, SettingsDocument};

/// Top-level key under which the document is stored in the settings file.
pub const SETTINGS_KEY: &str = "settings";

/// Environment variable that overrides the settings file location.
pub const SETTINGS_ENV: &str = "TRANSKEY_SETTINGS";

/// Determine the default settings path (`~/.transkey/settings.json`).
pub fn default_settings_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".transkey");
    p.push("settings.json");
    p
}

/// Resolve the effective settings path.
///
/// Policy:
/// 1) Use `explicit` when provided.
/// 2) Else use `$TRANSKEY_SETTINGS` when set and non-empty.
/// 3) Else `~/.transkey/settings.json`.
pub fn resolve_settings_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env::var_os(SETTINGS_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => default_settings_path(),
    }
}
