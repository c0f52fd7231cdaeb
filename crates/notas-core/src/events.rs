//! Store change events and the event bus for live query refresh.
//!
//! The store emits a [`StoreEvent`] on every successful mutation. Live
//! query subscriptions (the watch layer in notas-db) listen on the bus and
//! re-derive their values, so no reader ever observes a stale list after a
//! write made anywhere in the process.

use serde::Serialize;
use tokio::sync::broadcast;

/// A change to the underlying note table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// A note was inserted or replaced.
    NoteUpserted { note_id: i64 },
    /// A note row was removed.
    NoteDeleted { note_id: i64 },
}

impl StoreEvent {
    /// Returns the event type name (used in logs).
    pub fn event_type(&self) -> &'static str {
        match self {
            StoreEvent::NoteUpserted { .. } => "NoteUpserted",
            StoreEvent::NoteDeleted { .. } => "NoteDeleted",
        }
    }

    /// Returns the id of the note this event relates to.
    pub fn note_id(&self) -> i64 {
        match self {
            StoreEvent::NoteUpserted { note_id } | StoreEvent::NoteDeleted { note_id } => *note_id,
        }
    }
}

/// Broadcast-based event bus for distributing store changes to subscribers.
///
/// Uses `tokio::sync::broadcast` with a configurable buffer size. Slow
/// receivers that fall behind will receive a `Lagged` error and miss
/// events; live queries treat a lag as "something changed" and re-query,
/// so freshness is preserved even under bursts.
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    ///
    /// Recommended: 256 for production, 32 for tests.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers.
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub fn emit(&self, event: StoreEvent) {
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            event_type = event.event_type(),
            note_id = event.note_id(),
            subscriber_count,
            "EventBus emit"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to receive events. Each subscriber gets its own independent stream.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_subscribe() {
        let bus = EventBus::new(32);
        let mut rx = bus.subscribe();

        bus.emit(StoreEvent::NoteUpserted { note_id: 7 });

        let event = rx.recv().await.unwrap();
        assert_eq!(event, StoreEvent::NoteUpserted { note_id: 7 });
        assert_eq!(event.event_type(), "NoteUpserted");
        assert_eq!(event.note_id(), 7);
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(32);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(StoreEvent::NoteDeleted { note_id: 3 });

        assert_eq!(rx1.recv().await.unwrap(), StoreEvent::NoteDeleted { note_id: 3 });
        assert_eq!(rx2.recv().await.unwrap(), StoreEvent::NoteDeleted { note_id: 3 });
    }

    #[tokio::test]
    async fn test_event_bus_no_subscribers_ok() {
        let bus = EventBus::new(32);
        // Should not panic even with no subscribers
        bus.emit(StoreEvent::NoteUpserted { note_id: 1 });
    }

    #[tokio::test]
    async fn test_event_bus_subscriber_count() {
        let bus = EventBus::new(32);
        assert_eq!(bus.subscriber_count(), 0);

        let _rx1 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(_rx1);
        drop(_rx2);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
