use kinema_core::{VideoAdaptationCounters, VideoAdaptationReason};
use kinema_events::{AdaptationEvent, EventBus};

use crate::AdaptationStatsObserver;

/// Statistics observer that republishes adaptation changes onto the
/// event bus. `EventBus::publish` is synchronous and thread-safe, which
/// satisfies the observer contract for calls from the adaptation
/// context.
#[derive(Clone)]
pub struct BusStatsObserver {
    bus: EventBus,
}

impl BusStatsObserver {
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl AdaptationStatsObserver for BusStatsObserver {
    fn on_adaptation_changed(
        &self,
        reason: VideoAdaptationReason,
        counters: VideoAdaptationCounters,
        _total: VideoAdaptationCounters,
    ) {
        self.bus.publish(AdaptationEvent::AdaptationChanged {
            reason,
            resolution_adaptations: counters.resolution_adaptations,
            fps_adaptations: counters.fps_adaptations,
        });
    }
}
