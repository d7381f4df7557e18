use tokio::sync::broadcast;

use crate::Event;

/// Broadcast bus for adaptation pipeline events.
///
/// Every component holds a cloned `EventBus` and publishes directly;
/// each subscriber gets an independent receiver that sees all events.
///
/// `publish()` is synchronous, so it is safe from both async tasks and
/// the real-time pipeline thread. Without subscribers, events are
/// silently dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Accepts anything convertible into [`Event`], so sub-enum values
    /// can be passed directly: `bus.publish(AdaptationEvent::QualityRampup)`.
    pub fn publish<E: Into<Event>>(&self, event: E) {
        let _ = self.tx.send(event.into());
    }

    /// Subscribe to all future events.
    ///
    /// Slow subscribers receive `RecvError::Lagged(n)` rather than
    /// blocking publishers.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
