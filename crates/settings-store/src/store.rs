//! The autosaving owner of the in-memory settings document.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::{DocumentStorage, Error, Result, SettingsDocument};

/// Shared handle to the live document. Never hold its guard across `.await`.
pub type SharedDocument = Arc<RwLock<SettingsDocument>>;

/// Observer invoked when an autosave fails.
pub type SaveErrorHook = Arc<dyn Fn(&Error) + Send + Sync>;

/// Result of [`SettingsStore::load`].
pub struct Loaded {
    /// The store, holding either the stored or the default document.
    pub store: SettingsStore,
    /// Set when the stored document could not be read and defaults were used.
    pub warning: Option<Error>,
}

/// Owns the settings document and persists every change to it.
///
/// All mutation goes through [`SettingsStore::update`]: the closure runs
/// under the write lock, and if the document differs afterwards a snapshot
/// is written through the storage facility. Writes are serialized, and each
/// one snapshots the document only once it holds the write gate, so the
/// last write to land always carries the latest state.
#[derive(Clone)]
pub struct SettingsStore {
    /// Where the document is persisted.
    storage: Arc<dyn DocumentStorage>,
    /// The live document.
    doc: SharedDocument,
    /// Serializes writes.
    write_gate: Arc<AsyncMutex<()>>,
    /// Called with the error whenever an autosave fails.
    on_save_error: Arc<RwLock<Option<SaveErrorHook>>>,
}

impl SettingsStore {
    /// Wrap an already-built document without reading storage.
    pub fn new(storage: Arc<dyn DocumentStorage>, doc: SettingsDocument) -> Self {
        Self {
            storage,
            doc: Arc::new(RwLock::new(doc)),
            write_gate: Arc::new(AsyncMutex::new(())),
            on_save_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Load the stored document, falling back to `defaults`.
    ///
    /// Never fails: a missing document silently yields `defaults`; an
    /// unreadable one yields `defaults` plus a warning for the caller to
    /// surface. A loaded document is normalized against `defaults` so each
    /// action has exactly one binding.
    pub async fn load(storage: Arc<dyn DocumentStorage>, defaults: SettingsDocument) -> Loaded {
        let (doc, warning) = match storage.read().await {
            Ok(Some(mut doc)) => {
                if doc.normalize(&defaults) {
                    debug!(storage = %storage.describe(), "settings_normalized");
                }
                info!(storage = %storage.describe(), "settings_loaded");
                (doc, None)
            }
            Ok(None) => {
                info!(storage = %storage.describe(), "settings_defaulted");
                (defaults, None)
            }
            Err(e) => {
                warn!(storage = %storage.describe(), error = %e, "settings_load_failed");
                (defaults, Some(e))
            }
        };
        Loaded {
            store: Self::new(storage, doc),
            warning,
        }
    }

    /// Install the observer called when an autosave fails.
    pub fn set_save_error_hook(&self, hook: SaveErrorHook) {
        *self.on_save_error.write() = Some(hook);
    }

    /// Shared handle to the live document.
    pub fn shared(&self) -> SharedDocument {
        self.doc.clone()
    }

    /// A copy of the current document.
    pub fn snapshot(&self) -> SettingsDocument {
        self.doc.read().clone()
    }

    /// Run `f` against the current document without mutating it.
    pub fn read<R>(&self, f: impl FnOnce(&SettingsDocument) -> R) -> R {
        f(&self.doc.read())
    }

    /// Mutate the document and persist it if anything changed.
    ///
    /// A failed save is logged and reported to the save-error hook; the
    /// in-memory mutation stands either way.
    pub async fn update<R>(&self, f: impl FnOnce(&mut SettingsDocument) -> R) -> R {
        let (out, changed) = {
            let mut guard = self.doc.write();
            let before = guard.clone();
            let out = f(&mut guard);
            let changed = *guard != before;
            (out, changed)
        };
        if changed && let Err(e) = self.flush().await {
            warn!(storage = %self.storage.describe(), error = %e, "settings_save_failed");
            let hook = self.on_save_error.read().clone();
            if let Some(hook) = hook {
                hook(&e);
            }
        }
        out
    }

    /// Write the current document to storage.
    pub async fn flush(&self) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let snapshot = self.snapshot();
        self.storage.write(&snapshot).await?;
        debug!(storage = %self.storage.describe(), "settings_saved");
        Ok(())
    }
}
