use crate::AdaptationEvent;

/// Unified event for the video sender pipeline.
///
/// Hierarchical: each subsystem gets its own variant with a sub-enum,
/// so new subsystems extend the outer enum without touching existing
/// publishers.
#[derive(Clone, Debug)]
pub enum Event {
    /// Resource-adaptation event.
    Adaptation(AdaptationEvent),
}

impl From<AdaptationEvent> for Event {
    fn from(e: AdaptationEvent) -> Self {
        Self::Adaptation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptation_event_converts_into_outer_enum() {
        let event: Event = AdaptationEvent::QualityRampup.into();
        assert!(matches!(event, Event::Adaptation(AdaptationEvent::QualityRampup)));
    }
}
