//! Translation backend capabilities: which backends exist, which one is
//! selected, and the language pairs it supports.

use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{
    Error, Result,
    host::{BackendHost, HostOp, bounded},
    notification::NotificationDispatcher,
};

/// Notification title for backend failures.
const NOTICE_TITLE: &str = "Backend";

/// Caches the host's backend capabilities.
pub struct BackendClient {
    /// Host backend facility.
    host: Arc<dyn BackendHost>,
    /// Failure reporting.
    notifier: NotificationDispatcher,
    /// Bound on each host call.
    timeout: Duration,
    /// Last listed backends.
    backends: Vec<String>,
    /// Language pairs of the selected backend, in display order.
    language_pairs: Vec<(String, String)>,
}

impl BackendClient {
    /// Create a client with empty caches.
    pub fn new(
        host: Arc<dyn BackendHost>,
        notifier: NotificationDispatcher,
        timeout: Duration,
    ) -> Self {
        Self {
            host,
            notifier,
            timeout,
            backends: Vec::new(),
            language_pairs: Vec::new(),
        }
    }

    /// Query the available backends, replacing the cache.
    ///
    /// A failed query yields an empty list; it is logged but not reported to the user.
    pub async fn refresh_backends(&mut self) -> &[String] {
        let listed = bounded(HostOp::ListBackends, self.timeout, self.host.list_backends()).await;
        self.backends = match listed {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "list_backends_failed");
                Vec::new()
            }
        };
        &self.backends
    }

    /// Select `name`, reporting failure to the user.
    pub async fn select(&mut self, name: &str) -> bool {
        match self.try_select(name).await {
            Ok(()) => true,
            Err(e) => {
                warn!(backend = name, error = %e, "select_backend_failed");
                self.notifier.error(NOTICE_TITLE, e.to_string());
                false
            }
        }
    }

    /// Select `name` and refresh its language pairs.
    ///
    /// Selection succeeds once the host accepts the name. If the pairs then
    /// cannot be fetched, the cache is cleared and a warning is sent, but the
    /// selection stands. The host returns pairs in the opposite orientation
    /// to the one displayed, so they are reversed.
    pub async fn try_select(&mut self, name: &str) -> Result<()> {
        bounded(HostOp::SelectBackend, self.timeout, self.host.select_backend(name))
            .await
            .map_err(|e| Error::BackendSelection {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        let pairs = bounded(
            HostOp::LanguagePairs,
            self.timeout,
            self.host.supported_language_pairs(),
        )
        .await;
        match pairs {
            Ok(mut pairs) => {
                pairs.reverse();
                self.language_pairs = pairs;
            }
            Err(e) => {
                warn!(backend = name, error = %e, "language_pairs_failed");
                self.language_pairs.clear();
                self.notifier
                    .warn(NOTICE_TITLE, format!("{name}: language list unavailable: {e}"));
            }
        }
        info!(backend = name, pairs = self.language_pairs.len(), "backend_selected");
        Ok(())
    }

    /// Translate `text` with the selected backend.
    pub async fn translate(
        &self,
        text: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<String> {
        bounded(HostOp::Translate, self.timeout, self.host.translate(text, from, to)).await
    }

    /// Backends from the last query.
    pub fn backends(&self) -> &[String] {
        &self.backends
    }

    /// Language pairs of the selected backend.
    pub fn language_pairs(&self) -> &[(String, String)] {
        &self.language_pairs
    }
}
