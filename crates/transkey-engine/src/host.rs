use std::{fmt, future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tracing::trace;

use crate::{Error, Result};

// ---- Host facility abstractions ----

/// Phase of a physical key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Key went down (also repeats while held).
    Pressed,
    /// Key was released.
    Released,
}

/// One key event delivered by the host for a registered combo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutEvent {
    /// The combo string the host matched, as it was registered.
    pub combo: String,
    /// Event phase.
    pub state: KeyState,
}

/// Callback attached to a host registration, and to bus subscriptions.
pub type ShortcutHandler = Arc<dyn Fn(&ShortcutEvent) + Send + Sync>;

/// A host facility rejected a call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    /// Build a host error from any message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Result type returned by host facilities.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// The host's global key-binding facility.
#[async_trait]
pub trait KeyBindingHost: Send + Sync {
    /// Whether `combo` is currently registered with the host.
    async fn is_registered(&self, combo: &str) -> HostResult<bool>;
    /// Register `combo`; `handler` receives every event for it.
    async fn register(&self, combo: &str, handler: ShortcutHandler) -> HostResult<()>;
    /// Remove the registration for `combo`.
    async fn unregister(&self, combo: &str) -> HostResult<()>;
}

/// The host's translation backend facility.
#[async_trait]
pub trait BackendHost: Send + Sync {
    /// Identifiers of the available backends.
    async fn list_backends(&self) -> HostResult<Vec<String>>;
    /// Make `name` the active backend.
    async fn select_backend(&self, name: &str) -> HostResult<()>;
    /// `(source, target)` language pairs of the active backend.
    async fn supported_language_pairs(&self) -> HostResult<Vec<(String, String)>>;
    /// Translate `text` with the active backend.
    async fn translate(
        &self,
        text: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> HostResult<String>;
}

/// The host's main-window facility.
#[async_trait]
pub trait WindowHost: Send + Sync {
    /// Set or clear the always-on-top attribute.
    async fn set_always_on_top(&self, on_top: bool) -> HostResult<()>;
    /// Show the window.
    async fn show(&self) -> HostResult<()>;
}

/// Identifies a host call in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOp {
    /// `KeyBindingHost::is_registered`
    IsRegistered,
    /// `KeyBindingHost::register`
    Register,
    /// `KeyBindingHost::unregister`
    Unregister,
    /// `BackendHost::list_backends`
    ListBackends,
    /// `BackendHost::select_backend`
    SelectBackend,
    /// `BackendHost::supported_language_pairs`
    LanguagePairs,
    /// `BackendHost::translate`
    Translate,
    /// `WindowHost::set_always_on_top`
    SetAlwaysOnTop,
    /// `WindowHost::show`
    Show,
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::IsRegistered => "is_registered",
            Self::Register => "register",
            Self::Unregister => "unregister",
            Self::ListBackends => "list_backends",
            Self::SelectBackend => "select_backend",
            Self::LanguagePairs => "supported_language_pairs",
            Self::Translate => "translate",
            Self::SetAlwaysOnTop => "set_always_on_top",
            Self::Show => "show",
        };
        f.write_str(s)
    }
}

/// Await a host call with an upper bound on how long it may take.
pub(crate) async fn bounded<T, F>(op: HostOp, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = HostResult<T>>,
{
    trace!(%op, "host_call");
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(Error::Host { op, message: e.0 }),
        Err(_) => Err(Error::Timeout { op, after: limit }),
    }
}
