//! transkey engine
//!
//! Coordinates the settings of the translation assistant with the host it
//! runs in:
//! - keeps each logical action's hotkey registered with the host exactly
//!   when its binding is enabled
//! - fans released key events out to in-process subscribers
//! - selects the translation backend and caches its language pairs
//! - pins the main window or nudges it to the front
//!
//! [`SettingsHub`] is the facade the UI talks to. Host services are injected
//! through the traits in [`host`]; [`test_support`] provides an in-memory
//! implementation of all of them.
use std::{sync::Arc, time::Duration};

use keycombo::display_glyphs;
use settings_store::{Action, DocumentStorage, SettingsDocument, SettingsStore, system_locale};
use tokio::sync::{Mutex as AsyncMutex, mpsc::UnboundedSender};
use tracing::{debug, info};

mod backend;
mod bus;
mod error;
pub mod host;
mod notification;
mod registry;
pub mod test_support;
mod window;

pub use backend::BackendClient;
pub use bus::DispatchBus;
pub use error::{Error, Result};
pub use host::{
    BackendHost, HostError, HostOp, HostResult, KeyBindingHost, KeyState, ShortcutEvent,
    ShortcutHandler, WindowHost,
};
pub use notification::{Notice, NotificationDispatcher, NotifyKind};
pub use registry::HotkeyRegistry;
pub use window::WindowPresence;

/// Default bound on a single host call.
pub const DEFAULT_HOST_TIMEOUT: Duration = Duration::from_secs(5);

/// Notification title for settings persistence problems.
const SETTINGS_TITLE: &str = "Settings";

/// Hub tuning.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Upper bound on every host call.
    pub host_timeout: Duration,
    /// Locale for default binding descriptions; the system locale if unset.
    pub locale: Option<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host_timeout: DEFAULT_HOST_TIMEOUT,
            locale: None,
        }
    }
}

/// The host services a hub depends on.
#[derive(Clone)]
pub struct HostFacilities {
    /// Where the settings document lives.
    pub storage: Arc<dyn DocumentStorage>,
    /// Global key-binding facility.
    pub keys: Arc<dyn KeyBindingHost>,
    /// Translation backend facility.
    pub backends: Arc<dyn BackendHost>,
    /// Main-window facility.
    pub window: Arc<dyn WindowHost>,
}

/// The settings facade.
///
/// Owns the autosaving settings store and routes every hotkey, backend, and
/// window operation through the component responsible for it. Operations
/// return `true` on success; failures are reported as notifications on the
/// channel passed to [`SettingsHub::load`].
pub struct SettingsHub {
    /// Autosaving settings document.
    store: SettingsStore,
    /// Hotkey lifecycle.
    registry: HotkeyRegistry,
    /// Subscriber fan-out.
    bus: Arc<DispatchBus>,
    /// Backend capabilities.
    backend: AsyncMutex<BackendClient>,
    /// Window pin state.
    window: AsyncMutex<WindowPresence>,
    /// User-visible notifications.
    notifier: NotificationDispatcher,
}

impl SettingsHub {
    /// Load the persisted settings and wire the components together.
    ///
    /// Nothing is registered with the host yet; call [`SettingsHub::start`].
    /// An unreadable settings document is replaced by defaults and reported
    /// as a warning.
    pub async fn load(
        hosts: HostFacilities,
        config: HubConfig,
        notices: UnboundedSender<Notice>,
    ) -> Self {
        let notifier = NotificationDispatcher::new(notices);
        let locale = config.locale.clone().unwrap_or_else(system_locale);
        let loaded =
            SettingsStore::load(hosts.storage.clone(), SettingsDocument::seeded(&locale)).await;
        if let Some(e) = &loaded.warning {
            notifier.warn(SETTINGS_TITLE, format!("using default settings: {e}"));
        }
        let store = loaded.store;

        let save_notifier = notifier.clone();
        store.set_save_error_hook(Arc::new(move |e: &settings_store::Error| {
            save_notifier.warn(SETTINGS_TITLE, format!("could not save settings: {e}"));
        }));

        let bus = Arc::new(DispatchBus::new());
        let registry = HotkeyRegistry::new(
            hosts.keys,
            store.clone(),
            bus.clone(),
            notifier.clone(),
            config.host_timeout,
        );
        let backend = BackendClient::new(hosts.backends, notifier.clone(), config.host_timeout);
        let window = WindowPresence::new(hosts.window, notifier.clone(), config.host_timeout);
        debug!(%locale, timeout = ?config.host_timeout, "hub_loaded");

        Self {
            store,
            registry,
            bus,
            backend: AsyncMutex::new(backend),
            window: AsyncMutex::new(window),
            notifier,
        }
    }

    /// Bring the host in line with the loaded settings.
    ///
    /// Lists backends, selects the stored one (or the first listed when none
    /// is stored), then re-registers every enabled hotkey. A failing step is
    /// reported and the remaining steps still run. Returns the number of
    /// hotkeys restored.
    pub async fn start(&self) -> usize {
        let listed = self.backend.lock().await.refresh_backends().await.to_vec();
        let stored = self.store.read(|d| d.selected_backend.clone());
        let wanted = if stored.is_empty() {
            listed.first().cloned()
        } else {
            Some(stored)
        };
        match wanted {
            Some(name) => {
                self.choose_backend(&name).await;
            }
            None => debug!("no_backend_to_select"),
        }
        let restored = self.registry.restore_enabled().await;
        info!(backends = listed.len(), restored, "hub_started");
        restored
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> SettingsDocument {
        self.store.snapshot()
    }

    /// The underlying store.
    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// The notification dispatcher the hub reports through.
    pub fn notifier(&self) -> &NotificationDispatcher {
        &self.notifier
    }

    /// Write the current settings to storage now.
    ///
    /// Mutations already save themselves; this reports whether the stored
    /// copy is current.
    pub async fn save(&self) -> Result<()> {
        self.store.flush().await?;
        Ok(())
    }

    /// Turn automatic translation on or off.
    pub async fn set_auto_translate(&self, on: bool) {
        self.store.update(|d| d.auto_translate = on).await;
    }

    // ---- Backends ----

    /// Select `name` as the translation backend.
    ///
    /// The document records the selection only after the host accepts it.
    pub async fn choose_backend(&self, name: &str) -> bool {
        if !self.backend.lock().await.select(name).await {
            return false;
        }
        self.store
            .update(|d| d.selected_backend = name.to_string())
            .await;
        true
    }

    /// Backends from the last listing.
    pub async fn backends(&self) -> Vec<String> {
        self.backend.lock().await.backends().to_vec()
    }

    /// Re-query the host for available backends.
    pub async fn refresh_backends(&self) -> Vec<String> {
        self.backend.lock().await.refresh_backends().await.to_vec()
    }

    /// Language pairs of the selected backend, in display order.
    pub async fn language_pairs(&self) -> Vec<(String, String)> {
        self.backend.lock().await.language_pairs().to_vec()
    }

    /// Translate `text` with the selected backend.
    pub async fn translate(
        &self,
        text: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<String> {
        self.backend.lock().await.translate(text, from, to).await
    }

    // ---- Hotkeys ----

    /// Register `action`'s hotkey, optionally switching to `combo`.
    pub async fn enable_hotkey(&self, action: Action, combo: Option<&str>) -> bool {
        self.registry.enable(action, combo).await
    }

    /// Unregister `action`'s hotkey, optionally storing `combo` for later.
    pub async fn disable_hotkey(&self, action: Action, combo: Option<&str>) -> bool {
        self.registry.disable(action, combo).await
    }

    /// Change `action`'s combo.
    pub async fn rebind_hotkey(&self, action: Action, combo: &str) -> bool {
        self.registry.rebind(action, combo).await
    }

    /// Enable or disable `action`'s hotkey.
    pub async fn set_hotkey_enabled(
        &self,
        action: Action,
        enable: bool,
        combo: Option<&str>,
    ) -> bool {
        self.registry.set_enabled(action, enable, combo).await
    }

    /// Deliver released events for `action` to `handler`, replacing any
    /// handler `owner` already had for it. Returns true if one was replaced.
    pub fn subscribe<F>(&self, owner: &str, action: Action, handler: F) -> bool
    where
        F: Fn(&ShortcutEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(owner, action, Arc::new(handler))
    }

    /// Drop `owner`'s handler for `action`.
    pub fn unsubscribe(&self, owner: &str, action: Action) -> bool {
        self.bus.unsubscribe(owner, action)
    }

    /// `action`'s combo rendered with symbolic glyphs, for display.
    pub fn display_combo(&self, action: Action) -> Option<String> {
        self.store
            .read(|d| d.binding(action).map(|b| display_glyphs(&b.combo)))
    }

    // ---- Window ----

    /// Pin or unpin the main window above others.
    pub async fn set_pinned(&self, pinned: bool) -> bool {
        self.window.lock().await.set_always_on_top(pinned).await
    }

    /// Whether the main window is pinned.
    pub async fn is_pinned(&self) -> bool {
        self.window.lock().await.is_pinned()
    }

    /// Show the main window in front of others.
    pub async fn show(&self) -> bool {
        self.window.lock().await.show().await
    }

    /// Flash the main window to the front.
    pub async fn flash(&self) -> bool {
        self.window.lock().await.flash().await
    }
}
