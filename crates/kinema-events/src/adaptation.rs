use kinema_core::VideoAdaptationReason;

/// Events from the resource-adaptation layer.
#[derive(Debug, Clone)]
pub enum AdaptationEvent {
    /// Per-reason adaptation counters changed after a restriction step.
    AdaptationChanged {
        reason: VideoAdaptationReason,
        resolution_adaptations: u32,
        fps_adaptations: u32,
    },
    /// The stream's source restrictions were updated.
    RestrictionsUpdated {
        max_pixels_per_frame: Option<u64>,
        max_frame_rate: Option<f64>,
    },
    /// The initial frame dropper reached its terminal state.
    InitialFrameDropperDisabled { frames_dropped: u32 },
    /// The one-shot quality rampup reset all restrictions.
    QualityRampup,
}
