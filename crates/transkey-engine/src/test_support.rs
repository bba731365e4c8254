//! Test support for transkey-engine: an in-memory host and hub builders.
//! These helpers are public so integration tests can share them.

use std::{
    collections::HashSet,
    future,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use settings_store::MemoryStorage;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::{
    HostFacilities, HubConfig, SettingsHub,
    host::{
        BackendHost, HostError, HostResult, KeyBindingHost, KeyState, ShortcutEvent,
        ShortcutHandler, WindowHost,
    },
    notification::Notice,
};

/// Language pairs served for a fake backend.
type Pairs = Vec<(String, String)>;

/// In-memory stand-in for every host facility.
///
/// Tracks registered combos and their handlers, rejects duplicate
/// registrations the way a real host does, and records a log of calls.
/// Individual operations can be made to fail or hang.
#[derive(Default)]
pub struct FakeHost {
    /// Registered combos with their handlers, in registration order.
    registrations: Mutex<Vec<(String, ShortcutHandler)>>,
    /// Combos whose registration always fails.
    rejected: Mutex<HashSet<String>>,
    /// Available backends with their language pairs.
    backends: Mutex<Vec<(String, Pairs)>>,
    /// Currently selected backend.
    selected: Mutex<Option<String>>,
    /// Every always-on-top value the host accepted, in order.
    on_top_history: Mutex<Vec<bool>>,
    /// Number of accepted `show` calls.
    shown: AtomicUsize,
    /// Log of calls, e.g. `register ALT+X`.
    calls: Mutex<Vec<String>>,
    /// Fail every `is_registered`.
    fail_query: AtomicBool,
    /// Fail every `register`.
    fail_register: AtomicBool,
    /// Fail every `unregister`.
    fail_unregister: AtomicBool,
    /// Never complete `register`.
    hang_register: AtomicBool,
    /// Fail `list_backends`.
    fail_list: AtomicBool,
    /// Fail `supported_language_pairs`.
    fail_pairs: AtomicBool,
    /// Fail every window call.
    fail_window: AtomicBool,
}

impl FakeHost {
    /// A host with no backends and nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a backend serving `pairs` (in host orientation).
    pub fn with_backend(self, name: &str, pairs: &[(&str, &str)]) -> Self {
        self.backends.lock().push((
            name.to_string(),
            pairs
                .iter()
                .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
                .collect(),
        ));
        self
    }

    /// Whether `combo` is registered.
    pub fn is_combo_registered(&self, combo: &str) -> bool {
        self.registrations.lock().iter().any(|(c, _)| c == combo)
    }

    /// All registered combos, in registration order.
    pub fn registered_combos(&self) -> Vec<String> {
        self.registrations
            .lock()
            .iter()
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Simulate a physical key event. Returns false if `combo` is not registered.
    pub fn fire(&self, combo: &str, state: KeyState) -> bool {
        let handler = self
            .registrations
            .lock()
            .iter()
            .find(|(c, _)| c == combo)
            .map(|(_, h)| h.clone());
        match handler {
            Some(h) => {
                h(&ShortcutEvent {
                    combo: combo.to_string(),
                    state,
                });
                true
            }
            None => false,
        }
    }

    /// Press and release `combo`.
    pub fn tap(&self, combo: &str) -> bool {
        self.fire(combo, KeyState::Pressed) && self.fire(combo, KeyState::Released)
    }

    /// Make registration of `combo` fail.
    pub fn reject(&self, combo: &str) {
        self.rejected.lock().insert(combo.to_string());
    }

    /// Make every `is_registered` query fail (or succeed again).
    pub fn set_fail_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    /// Make every `register` fail (or succeed again).
    pub fn set_fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }

    /// Make every `unregister` fail (or succeed again).
    pub fn set_fail_unregister(&self, fail: bool) {
        self.fail_unregister.store(fail, Ordering::SeqCst);
    }

    /// Make `register` never complete.
    pub fn set_hang_register(&self, hang: bool) {
        self.hang_register.store(hang, Ordering::SeqCst);
    }

    /// Make `list_backends` fail.
    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make `supported_language_pairs` fail.
    pub fn set_fail_pairs(&self, fail: bool) {
        self.fail_pairs.store(fail, Ordering::SeqCst);
    }

    /// Make every window call fail.
    pub fn set_fail_window(&self, fail: bool) {
        self.fail_window.store(fail, Ordering::SeqCst);
    }

    /// The selected backend, if any.
    pub fn selected_backend(&self) -> Option<String> {
        self.selected.lock().clone()
    }

    /// Accepted always-on-top values, in order.
    pub fn on_top_history(&self) -> Vec<bool> {
        self.on_top_history.lock().clone()
    }

    /// Number of accepted `show` calls.
    pub fn show_count(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    /// The call log.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Append to the call log.
    fn log(&self, call: String) {
        self.calls.lock().push(call);
    }

    /// Fail with `msg` if `flag` is set.
    fn check(flag: &AtomicBool, msg: &str) -> HostResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(HostError::new(msg))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyBindingHost for FakeHost {
    async fn is_registered(&self, combo: &str) -> HostResult<bool> {
        Self::check(&self.fail_query, "registration query failed")?;
        Ok(self.is_combo_registered(combo))
    }

    async fn register(&self, combo: &str, handler: ShortcutHandler) -> HostResult<()> {
        self.log(format!("register {combo}"));
        if self.hang_register.load(Ordering::SeqCst) {
            future::pending::<()>().await;
        }
        Self::check(&self.fail_register, "register refused")?;
        if self.rejected.lock().contains(combo) {
            return Err(HostError::new(format!("{combo} is reserved")));
        }
        let mut regs = self.registrations.lock();
        if regs.iter().any(|(c, _)| c == combo) {
            return Err(HostError::new(format!("{combo} already registered")));
        }
        regs.push((combo.to_string(), handler));
        Ok(())
    }

    async fn unregister(&self, combo: &str) -> HostResult<()> {
        self.log(format!("unregister {combo}"));
        Self::check(&self.fail_unregister, "unregister refused")?;
        let mut regs = self.registrations.lock();
        let before = regs.len();
        regs.retain(|(c, _)| c != combo);
        if regs.len() == before {
            return Err(HostError::new(format!("{combo} not registered")));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendHost for FakeHost {
    async fn list_backends(&self) -> HostResult<Vec<String>> {
        self.log("list_backends".into());
        Self::check(&self.fail_list, "backend query failed")?;
        Ok(self.backends.lock().iter().map(|(n, _)| n.clone()).collect())
    }

    async fn select_backend(&self, name: &str) -> HostResult<()> {
        self.log(format!("select_backend {name}"));
        if !self.backends.lock().iter().any(|(n, _)| n == name) {
            return Err(HostError::new("can not find this api"));
        }
        *self.selected.lock() = Some(name.to_string());
        Ok(())
    }

    async fn supported_language_pairs(&self) -> HostResult<Vec<(String, String)>> {
        Self::check(&self.fail_pairs, "language query failed")?;
        let selected = self
            .selected_backend()
            .ok_or_else(|| HostError::new("please choose api"))?;
        Ok(self
            .backends
            .lock()
            .iter()
            .find(|(n, _)| *n == selected)
            .map(|(_, p)| p.clone())
            .unwrap_or_default())
    }

    async fn translate(
        &self,
        text: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> HostResult<String> {
        let selected = self
            .selected_backend()
            .ok_or_else(|| HostError::new("please choose api"))?;
        Ok(format!(
            "[{selected} {}->{}] {text}",
            from.unwrap_or("auto"),
            to.unwrap_or("auto")
        ))
    }
}

#[async_trait]
impl WindowHost for FakeHost {
    async fn set_always_on_top(&self, on_top: bool) -> HostResult<()> {
        self.log(format!("set_always_on_top {on_top}"));
        Self::check(&self.fail_window, "window refused")?;
        self.on_top_history.lock().push(on_top);
        Ok(())
    }

    async fn show(&self) -> HostResult<()> {
        self.log("show".into());
        Self::check(&self.fail_window, "window refused")?;
        self.shown.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A hub wired to a [`FakeHost`] and [`MemoryStorage`].
pub struct TestHub {
    /// The hub under test.
    pub hub: SettingsHub,
    /// Its host facilities.
    pub host: Arc<FakeHost>,
    /// Its storage.
    pub storage: Arc<MemoryStorage>,
    /// Notifications it sent.
    pub notices: UnboundedReceiver<Notice>,
}

impl TestHub {
    /// Take every notification sent so far.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut out = Vec::new();
        while let Ok(n) = self.notices.try_recv() {
            out.push(n);
        }
        out
    }
}

/// Host call bound used by [`test_hub`].
pub const TEST_HOST_TIMEOUT: Duration = Duration::from_millis(200);

/// Build and load (but not start) a hub over `host` and `storage`.
pub async fn test_hub(host: FakeHost, storage: MemoryStorage) -> TestHub {
    let host = Arc::new(host);
    let storage = Arc::new(storage);
    let (tx, notices) = mpsc::unbounded_channel();
    let hub = SettingsHub::load(
        HostFacilities {
            storage: storage.clone(),
            keys: host.clone(),
            backends: host.clone(),
            window: host.clone(),
        },
        HubConfig {
            host_timeout: TEST_HOST_TIMEOUT,
            locale: Some("en".into()),
        },
        tx,
    )
    .await;
    TestHub {
        hub,
        host,
        storage,
        notices,
    }
}
