//! Topic-keyed publish/subscribe for transport events.
//!
//! Listeners subscribe to a topic name (`"connected"`, `"disconnected"`,
//! `"error"`, `"message"`, or a server message type such as `"appList"`) and
//! are invoked synchronously, in subscription order, on the publishing thread.
//!
//! A panicking listener is logged and skipped; the remaining listeners for
//! the event still run.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use super::TransportEvent;

pub const TOPIC_CONNECTED: &str = "connected";
pub const TOPIC_DISCONNECTED: &str = "disconnected";
pub const TOPIC_ERROR: &str = "error";
/// Every inbound server message, regardless of type.
pub const TOPIC_MESSAGE: &str = "message";

type Listener = Arc<dyn Fn(&TransportEvent) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`]; pass it to
/// [`EventBus::unsubscribe`] to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<String, Vec<(SubscriptionId, Listener)>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, topic: &str, listener: F) -> SubscriptionId
    where
        F: Fn(&TransportEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .entry(topic.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener.  Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let mut removed = false;
        for list in guard.values_mut() {
            let before = list.len();
            list.retain(|(lid, _)| *lid != id);
            removed |= list.len() != before;
        }
        removed
    }

    /// Delivers `event` to every listener on `topic`.
    ///
    /// Returns how many listeners completed without panicking.
    pub fn publish(&self, topic: &str, event: &TransportEvent) -> usize {
        // Snapshot so listeners may (un)subscribe while being called.
        let snapshot: Vec<Listener> = {
            let guard = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            match guard.get(topic) {
                Some(list) => list.iter().map(|(_, l)| Arc::clone(l)).collect(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for listener in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(topic, "transport listener panicked; continuing"),
            }
        }
        delivered
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use pad_core::ServerMessage;

    fn error_event() -> TransportEvent {
        TransportEvent::Message(ServerMessage::Error {
            message: "boom".to_string(),
        })
    }

    #[test]
    fn test_publish_reaches_every_listener_on_topic_only() {
        // Arrange
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(Vec::new()));
        for name in ["a", "b"] {
            let hits = Arc::clone(&hits);
            bus.subscribe("error", move |_| hits.lock().unwrap().push(name));
        }
        let other = Arc::clone(&hits);
        bus.subscribe("appList", move |_| other.lock().unwrap().push("wrong"));

        // Act
        let delivered = bus.publish("error", &error_event());

        // Assert
        assert_eq!(delivered, 2);
        assert_eq!(*hits.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_panicking_listener_does_not_stop_the_rest() {
        // Arrange
        let bus = EventBus::new();
        let reached = Arc::new(Mutex::new(false));
        bus.subscribe("error", |_| panic!("listener failure"));
        let flag = Arc::clone(&reached);
        bus.subscribe("error", move |_| *flag.lock().unwrap() = true);

        // Act
        let delivered = bus.publish("error", &error_event());

        // Assert
        assert_eq!(delivered, 1);
        assert!(*reached.lock().unwrap());
    }

    #[test]
    fn test_unsubscribed_listener_is_not_called() {
        let bus = EventBus::new();
        let id = bus.subscribe("disconnected", |_| panic!("must not run"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.publish("disconnected", &TransportEvent::Disconnected), 0);
    }

    #[test]
    fn test_publish_without_listeners_is_noop() {
        let bus = EventBus::new();
        assert_eq!(bus.publish("connected", &TransportEvent::Disconnected), 0);
    }
}
