//! Fan-out of host key events to in-process subscribers.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use settings_store::{Action, SharedDocument};
use tracing::{debug, error, trace};

use crate::{
    Error, Result,
    host::{KeyState, ShortcutEvent, ShortcutHandler},
};

/// One subscription: an owner's handler for an action.
struct Subscriber {
    /// Identity of the subscribing component.
    owner: String,
    /// Invoked for every released event of the action.
    handler: ShortcutHandler,
}

/// Routes host key events to subscribers by action.
///
/// Each action has its own bucket, kept in subscription order. An owner
/// holds at most one handler per action; subscribing again replaces it in
/// place.
#[derive(Default)]
pub struct DispatchBus {
    /// Subscribers keyed by action.
    buckets: Mutex<HashMap<Action, Vec<Subscriber>>>,
}

impl DispatchBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `owner` to `action`. Returns true if an existing handler was replaced.
    pub fn subscribe(&self, owner: &str, action: Action, handler: ShortcutHandler) -> bool {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(action).or_default();
        if let Some(existing) = bucket.iter_mut().find(|s| s.owner == owner) {
            existing.handler = handler;
            debug!(owner, %action, "subscriber_replaced");
            return true;
        }
        bucket.push(Subscriber {
            owner: owner.to_string(),
            handler,
        });
        debug!(owner, %action, "subscriber_added");
        false
    }

    /// Remove `owner`'s handler for `action`. Returns true if one was removed.
    pub fn unsubscribe(&self, owner: &str, action: Action) -> bool {
        let mut buckets = self.buckets.lock();
        let Some(bucket) = buckets.get_mut(&action) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|s| s.owner != owner);
        before != bucket.len()
    }

    /// Number of subscribers for `action`.
    pub fn subscriber_count(&self, action: Action) -> usize {
        self.buckets.lock().get(&action).map_or(0, Vec::len)
    }

    /// Deliver `event` for `action` to its subscribers.
    ///
    /// Pressed events are dropped so holding a key never repeat-fires.
    /// Released events are delivered to every subscriber of `action` in
    /// subscription order, provided `combo` still is the action's stored
    /// combo. Returns the number of handlers invoked.
    ///
    /// Handlers run after the bus lock is released, so they may subscribe
    /// or unsubscribe themselves.
    pub fn dispatch(
        &self,
        action: Action,
        event: &ShortcutEvent,
        doc: &SharedDocument,
    ) -> Result<usize> {
        if event.state == KeyState::Pressed {
            trace!(%action, combo = %event.combo, "pressed_ignored");
            return Ok(0);
        }

        let stored = doc
            .read()
            .binding(action)
            .map(|b| b.combo.clone())
            .ok_or(Error::UndeclaredAction(action))?;
        if stored != event.combo {
            debug!(%action, combo = %event.combo, stored = %stored, "stale_event_ignored");
            return Ok(0);
        }

        let handlers: Vec<ShortcutHandler> = self
            .buckets
            .lock()
            .get(&action)
            .map(|b| b.iter().map(|s| s.handler.clone()).collect())
            .unwrap_or_default();
        for h in &handlers {
            h(event);
        }
        trace!(%action, delivered = handlers.len(), "dispatched");
        Ok(handlers.len())
    }

    /// Build the callback registered with the host for `action`.
    ///
    /// A dispatch for an action with no declared binding is a defect: it is
    /// logged, and panics in debug builds.
    pub fn host_handler(self: &Arc<Self>, action: Action, doc: SharedDocument) -> ShortcutHandler {
        let bus = Arc::clone(self);
        Arc::new(move |event: &ShortcutEvent| {
            if let Err(e) = bus.dispatch(action, event, &doc) {
                error!(%action, error = %e, "dispatch_failed");
                if cfg!(debug_assertions) {
                    panic!("hotkey dispatch invariant violated: {e}");
                }
            }
        })
    }
}
