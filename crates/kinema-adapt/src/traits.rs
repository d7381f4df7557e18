//! Collaborator seams between the adaptation layer, the pipeline, and
//! the external adaptation processor.

use std::{sync::Arc, time::Duration};

use kinema_core::{VideoAdaptationCounters, VideoAdaptationReason, VideoSourceRestrictions,
    VideoStreamInputState};

use crate::Resource;

/// Which dimension an adaptation step changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdaptationDimension {
    Resolution,
    FrameRate,
}

/// Synchronous snapshot source for what the pipeline currently feeds
/// the encoder. Pipeline context only.
pub trait InputStateProvider: Send + Sync {
    fn current_input_state(&self) -> VideoStreamInputState;
}

/// The external processor that owns and mutates stream restrictions.
///
/// This layer never drives it; it is queried for adaptation history
/// (balanced constraint) and asked to clear restrictions exactly once
/// by the quality rampup. Held as a `Weak` reference: the processor
/// does not belong to the manager and may be detached at any time.
pub trait AdaptationProcessor: Send + Sync {
    /// Elapsed time since the most recent adapt-down step in the given
    /// dimension, or `None` if no such step has happened.
    fn time_since_last_adapt_down(&self, dimension: AdaptationDimension) -> Option<Duration>;

    /// Remove all resolution/frame-rate restrictions.
    fn reset_video_source_restrictions(&self);
}

/// Veto-only admission policy consulted before every adapt-up step.
///
/// All registered constraints must return `true` for the step to
/// proceed. Constraints never trigger adaptation themselves and must
/// fail open when they lack the information to decide.
pub trait AdaptationConstraint: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_adaptation_up_allowed(
        &self,
        input_state: &VideoStreamInputState,
        restrictions_before: &VideoSourceRestrictions,
        restrictions_after: &VideoSourceRestrictions,
        reason_resource: &Arc<dyn Resource>,
    ) -> bool;
}

/// Observer of applied adaptation steps, consulted by the external
/// processor after a step goes through (e.g. so a quality scaler can
/// re-anchor its thresholds). Purely informational; must not call back
/// into the processor.
pub trait AdaptationListener: Send + Sync {
    fn on_adaptation_applied(
        &self,
        input_state: &VideoStreamInputState,
        restrictions_before: &VideoSourceRestrictions,
        restrictions_after: &VideoSourceRestrictions,
        reason_resource: Option<&Arc<dyn Resource>>,
    );
}

/// Notification target for restriction updates, implemented by the
/// resource manager and invoked by the adaptation processor after every
/// restriction change.
pub trait RestrictionsListener: Send + Sync {
    /// `reason_resource` is the resource whose signal caused the change,
    /// or `None` for externally-driven changes.
    fn on_video_source_restrictions_updated(
        &self,
        restrictions: VideoSourceRestrictions,
        counters_total: VideoAdaptationCounters,
        reason_resource: Option<Arc<dyn Resource>>,
    );
}

/// One-way statistics sink. Must be safe to call from the adaptation
/// context; no return value is consumed.
pub trait AdaptationStatsObserver: Send + Sync {
    fn on_adaptation_changed(
        &self,
        reason: VideoAdaptationReason,
        counters: VideoAdaptationCounters,
        total: VideoAdaptationCounters,
    );
}
