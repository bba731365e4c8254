//! Pin-on-top and bring-to-front for the main window.

use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{
    Error, Result,
    host::{HostOp, WindowHost, bounded},
    notification::NotificationDispatcher,
};

/// Notification title for window failures.
const NOTICE_TITLE: &str = "Window";

/// Tracks whether the window is pinned and nudges it to the front.
///
/// Everything here is best-effort: failures are reported, never retried.
pub struct WindowPresence {
    /// Host window facility.
    host: Arc<dyn WindowHost>,
    /// Failure reporting.
    notifier: NotificationDispatcher,
    /// Bound on each host call.
    timeout: Duration,
    /// Whether the window is pinned always-on-top.
    pinned: bool,
}

impl WindowPresence {
    /// A controller for an unpinned window.
    pub fn new(
        host: Arc<dyn WindowHost>,
        notifier: NotificationDispatcher,
        timeout: Duration,
    ) -> Self {
        Self {
            host,
            notifier,
            timeout,
            pinned: false,
        }
    }

    /// Whether the window is pinned.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Pin or unpin. The local state changes only if the host accepts.
    pub async fn set_always_on_top(&mut self, on_top: bool) -> bool {
        match self.on_top(on_top).await {
            Ok(()) => {
                self.pinned = on_top;
                debug!(pinned = on_top, "window_pin_changed");
                true
            }
            Err(e) => self.fail("pin", &e),
        }
    }

    /// Raise the window above others without leaving it pinned.
    ///
    /// A pinned window is already on top, so nothing is done.
    pub async fn bring_to_front(&self) -> bool {
        match self.try_bring_to_front().await {
            Ok(()) => true,
            Err(e) => self.fail("raise", &e),
        }
    }

    /// Show the window and bring it to the front.
    pub async fn show(&self) -> bool {
        let res = async {
            bounded(HostOp::Show, self.timeout, self.host.show()).await?;
            self.try_bring_to_front().await
        }
        .await;
        match res {
            Ok(()) => true,
            Err(e) => self.fail("show", &e),
        }
    }

    /// Flash the window to the front.
    pub async fn flash(&self) -> bool {
        self.bring_to_front().await
    }

    async fn try_bring_to_front(&self) -> Result<()> {
        if self.pinned {
            return Ok(());
        }
        self.on_top(true).await?;
        self.on_top(false).await
    }

    async fn on_top(&self, on_top: bool) -> Result<()> {
        bounded(
            HostOp::SetAlwaysOnTop,
            self.timeout,
            self.host.set_always_on_top(on_top),
        )
        .await
    }

    /// Report a failed window operation.
    fn fail(&self, what: &str, e: &Error) -> bool {
        warn!(op = what, error = %e, "window_op_failed");
        self.notifier.error(NOTICE_TITLE, format!("{what} err: {e}"));
        false
    }
}
