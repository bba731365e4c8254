use std::{sync::Arc, time::Duration};

use keycombo::Combo;
use settings_store::{Action, HotkeyBinding, SettingsStore};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    bus::DispatchBus,
    host::{HostOp, KeyBindingHost, bounded},
    notification::NotificationDispatcher,
};

/// Notification title for hotkey failures.
const NOTICE_TITLE: &str = "Hotkey";

/// Owns the action → combo bindings and their host registrations.
///
/// Invariant after every operation: a combo is registered with the host iff
/// it is the combo of an enabled binding. Host calls are always preceded by
/// an `is_registered` query, so retries never surface a duplicate
/// registration. Operations are serialized; a second caller waits for the
/// first to finish.
pub struct HotkeyRegistry {
    /// Host key-binding facility.
    host: Arc<dyn KeyBindingHost>,
    /// Persisted bindings.
    store: SettingsStore,
    /// Receives dispatched events.
    bus: Arc<DispatchBus>,
    /// Failure reporting.
    notifier: NotificationDispatcher,
    /// Bound on each host call.
    timeout: Duration,
    /// Serializes enable/disable/rebind.
    ops: AsyncMutex<()>,
}

impl HotkeyRegistry {
    /// Create a registry over `store`'s bindings.
    pub fn new(
        host: Arc<dyn KeyBindingHost>,
        store: SettingsStore,
        bus: Arc<DispatchBus>,
        notifier: NotificationDispatcher,
        timeout: Duration,
    ) -> Self {
        Self {
            host,
            store,
            bus,
            notifier,
            timeout,
            ops: AsyncMutex::new(()),
        }
    }

    /// Register `action`, optionally switching it to `combo` first.
    ///
    /// On failure the binding is left as it was and the user is notified.
    pub async fn enable(&self, action: Action, combo: Option<&str>) -> bool {
        let _op = self.ops.lock().await;
        let res = self.try_enable(action, combo).await;
        self.settle(action, "enable", res)
    }

    /// Unregister `action`, optionally storing `combo` for later.
    ///
    /// The replacement combo is stored only if unregistration succeeded.
    pub async fn disable(&self, action: Action, combo: Option<&str>) -> bool {
        let _op = self.ops.lock().await;
        let res = self.try_disable(action, combo).await;
        self.settle(action, "disable", res)
    }

    /// Change `action`'s combo.
    ///
    /// A bound action moves its registration; an unbound one just records
    /// the new combo.
    pub async fn rebind(&self, action: Action, combo: &str) -> bool {
        let _op = self.ops.lock().await;
        let res = self.try_rebind(action, combo).await;
        self.settle(action, "rebind", res)
    }

    /// Enable or disable in one call, with an optional combo.
    pub async fn set_enabled(&self, action: Action, enable: bool, combo: Option<&str>) -> bool {
        if enable {
            self.enable(action, combo).await
        } else {
            self.disable(action, combo).await
        }
    }

    /// Register every binding the document marks as enabled.
    ///
    /// Used at startup, when the document may claim registrations the host
    /// no longer has. A binding that cannot be registered is marked disabled
    /// so the document reflects the host; one notice is sent per failure.
    /// Returns how many were restored.
    pub async fn restore_enabled(&self) -> usize {
        let _op = self.ops.lock().await;
        let wanted: Vec<Action> = self.store.read(|d| {
            d.hotkeys
                .iter()
                .filter(|b| b.enabled)
                .map(|b| b.action)
                .collect()
        });
        let mut restored = 0;
        for action in wanted {
            match self.try_enable(action, None).await {
                Ok(()) => restored += 1,
                Err(e) => {
                    let e = self.unbind_on_conflict(action, e).await;
                    warn!(%action, error = %e, "hotkey_restore_failed");
                    self.notifier
                        .error(NOTICE_TITLE, format!("{action}: could not restore hotkey: {e}"));
                }
            }
        }
        info!(restored, "hotkeys_restored");
        restored
    }

    /// Disable a binding whose restore failed before reaching the host.
    ///
    /// Host failures are already reconciled by `roll_back`.
    async fn unbind_on_conflict(&self, action: Action, e: Error) -> Error {
        match e {
            Error::ComboInUse { .. } | Error::InvalidCombo(_) => {
                self.mark_disabled(action).await;
                Error::Unbound {
                    combo: self.binding(action).map(|b| b.combo).unwrap_or_default(),
                    cause: Box::new(e),
                }
            }
            other => other,
        }
    }

    /// Convert an operation result into the boolean contract, notifying on failure.
    fn settle(&self, action: Action, what: &str, res: Result<()>) -> bool {
        match res {
            Ok(()) => true,
            Err(e) => {
                warn!(%action, op = what, error = %e, "hotkey_op_failed");
                self.notifier
                    .error(NOTICE_TITLE, format!("{action}: could not {what} hotkey: {e}"));
                false
            }
        }
    }

    /// Current binding for `action`.
    fn binding(&self, action: Action) -> Result<HotkeyBinding> {
        self.store
            .read(|d| d.binding(action).cloned())
            .ok_or(Error::UndeclaredAction(action))
    }

    /// Reject `combo` if another enabled binding holds it.
    fn ensure_free(&self, combo: &str, action: Action) -> Result<()> {
        match self.store.read(|d| d.enabled_holder_of(combo, action)) {
            Some(holder) => Err(Error::ComboInUse {
                combo: combo.to_string(),
                holder,
            }),
            None => Ok(()),
        }
    }

    async fn try_enable(&self, action: Action, combo: Option<&str>) -> Result<()> {
        let current = self.binding(action)?;
        let target = match combo {
            Some(c) => Combo::canonicalize(c)?,
            None => current.combo.clone(),
        };
        self.ensure_free(&target, action)?;

        let replacing = target != current.combo;
        if replacing && current.enabled {
            self.release(&current.combo).await?;
        }
        if let Err(e) = self.claim(&target, action).await {
            if !current.enabled {
                return Err(e);
            }
            // claim releases first, so even an unchanged combo may now be unbound
            return Err(self.roll_back(action, &current.combo, replacing, e).await);
        }

        self.store
            .update(|d| {
                if let Some(b) = d.binding_mut(action) {
                    b.enabled = true;
                    b.combo.clone_from(&target);
                }
            })
            .await;
        info!(%action, combo = %target, "hotkey_enabled");
        Ok(())
    }

    async fn try_disable(&self, action: Action, combo: Option<&str>) -> Result<()> {
        let current = self.binding(action)?;
        let replacement = combo.map(Combo::canonicalize).transpose()?;

        if current.enabled {
            self.release(&current.combo).await?;
        }

        self.store
            .update(|d| {
                if let Some(b) = d.binding_mut(action) {
                    b.enabled = false;
                    if let Some(c) = replacement {
                        b.combo = c;
                    }
                }
            })
            .await;
        info!(%action, "hotkey_disabled");
        Ok(())
    }

    async fn try_rebind(&self, action: Action, combo: &str) -> Result<()> {
        let current = self.binding(action)?;
        let target = Combo::canonicalize(combo)?;

        if current.enabled {
            if target == current.combo {
                debug!(%action, combo = %target, "rebind_unchanged");
                return Ok(());
            }
            self.ensure_free(&target, action)?;
            self.release(&current.combo).await?;
            if let Err(e) = self.claim(&target, action).await {
                return Err(self.roll_back(action, &current.combo, true, e).await);
            }
        }

        self.store
            .update(|d| {
                if let Some(b) = d.binding_mut(action) {
                    b.combo.clone_from(&target);
                }
            })
            .await;
        info!(%action, from = %current.combo, to = %target, bound = current.enabled, "hotkey_rebound");
        Ok(())
    }

    /// Bring the binding back in line with the host after a failed claim.
    ///
    /// If the host still has `old`, nothing changes. If it does not, `old` is
    /// re-registered when `retry` is set; when that is not possible the
    /// binding is marked disabled so it never claims a registration the host
    /// does not have. If the host cannot be queried the binding is left
    /// alone. Returns the error to report for the whole operation.
    async fn roll_back(&self, action: Action, old: &str, retry: bool, cause: Error) -> Error {
        match self.is_bound(old).await {
            Ok(true) => {
                debug!(%action, combo = %old, "hotkey_still_bound");
                return cause;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(%action, combo = %old, error = %e, "hotkey_state_unknown");
                return cause;
            }
        }
        if retry {
            match self.register(old, action).await {
                Ok(()) => {
                    debug!(%action, combo = %old, "hotkey_rolled_back");
                    return cause;
                }
                Err(e) => warn!(%action, combo = %old, error = %e, "hotkey_rollback_failed"),
            }
        }
        self.mark_disabled(action).await;
        Error::Unbound {
            combo: old.to_string(),
            cause: Box::new(cause),
        }
    }

    /// Record `action` as disabled without touching the host.
    async fn mark_disabled(&self, action: Action) {
        self.store
            .update(|d| {
                if let Some(b) = d.binding_mut(action) {
                    b.enabled = false;
                }
            })
            .await;
    }

    /// Register `combo` for `action`, replacing any existing registration.
    async fn claim(&self, combo: &str, action: Action) -> Result<()> {
        self.release(combo).await?;
        self.register(combo, action).await
    }

    /// Register `combo` with a dispatch callback for `action`.
    async fn register(&self, combo: &str, action: Action) -> Result<()> {
        let handler = self.bus.host_handler(action, self.store.shared());
        bounded(HostOp::Register, self.timeout, self.host.register(combo, handler)).await?;
        debug!(%action, combo, "combo_registered");
        Ok(())
    }

    /// Whether the host currently has `combo`.
    async fn is_bound(&self, combo: &str) -> Result<bool> {
        bounded(
            HostOp::IsRegistered,
            self.timeout,
            self.host.is_registered(combo),
        )
        .await
    }

    /// Unregister `combo` if the host has it.
    async fn release(&self, combo: &str) -> Result<()> {
        if self.is_bound(combo).await? {
            bounded(HostOp::Unregister, self.timeout, self.host.unregister(combo)).await?;
            debug!(combo, "combo_unregistered");
        }
        Ok(())
    }
}
