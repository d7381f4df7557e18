use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use kinema_core::{
    increases_frame_rate, increases_resolution, DegradationPreference, VideoSourceRestrictions,
    VideoStreamInputState,
};
use parking_lot::Mutex;

use crate::{AdaptationConstraint, AdaptationDimension, AdaptationProcessor, Resource};

/// One rung of the balanced-degradation ladder: thresholds that apply
/// while the input runs at or below `max_pixels`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalancedDegradationRung {
    pub max_pixels: u64,
    /// Target bitrate required before stepping either dimension up.
    pub min_bitrate_bps: u64,
    /// Minimum settle time after a down-step before stepping the same
    /// dimension up again.
    pub min_time_since_adapt_down: Duration,
}

/// Externally configured balanced-degradation ladder, lowest resolution
/// first.
#[derive(Clone, Debug, Default)]
pub struct BalancedDegradationConfig {
    pub rungs: Vec<BalancedDegradationRung>,
}

impl BalancedDegradationConfig {
    /// Ladder tuned for typical webcam resolutions.
    #[must_use]
    pub fn typical() -> Self {
        Self {
            rungs: vec![
                BalancedDegradationRung {
                    max_pixels: 76_800, // 320x240
                    min_bitrate_bps: 150_000,
                    min_time_since_adapt_down: Duration::from_secs(4),
                },
                BalancedDegradationRung {
                    max_pixels: 230_400, // 640x360
                    min_bitrate_bps: 400_000,
                    min_time_since_adapt_down: Duration::from_secs(6),
                },
                BalancedDegradationRung {
                    max_pixels: 921_600, // 1280x720
                    min_bitrate_bps: 800_000,
                    min_time_since_adapt_down: Duration::from_secs(8),
                },
            ],
        }
    }

    /// Rung governing the given input size: the first rung whose
    /// `max_pixels` covers it, or the last rung for larger inputs.
    #[must_use]
    pub fn rung_for_pixels(&self, pixels: u64) -> Option<&BalancedDegradationRung> {
        self.rungs
            .iter()
            .find(|r| pixels <= r.max_pixels)
            .or_else(|| self.rungs.last())
    }
}

/// Rate-limits adapt-up steps while the degradation preference is
/// `Balanced`.
///
/// Requires the cached target bitrate and an attached adaptation
/// processor (for time-since-last-down queries); fails open when either
/// is missing, and does not apply at all outside balanced mode.
pub struct BalancedConstraint {
    config: BalancedDegradationConfig,
    degradation_preference: Arc<Mutex<DegradationPreference>>,
    target_bitrate_bps: Mutex<Option<u64>>,
    processor: Mutex<Weak<dyn AdaptationProcessor>>,
}

impl BalancedConstraint {
    #[must_use]
    pub fn new(
        config: BalancedDegradationConfig,
        degradation_preference: Arc<Mutex<DegradationPreference>>,
    ) -> Self {
        let detached: Weak<dyn AdaptationProcessor> = Weak::<NeverProcessor>::new();
        Self {
            config,
            degradation_preference,
            target_bitrate_bps: Mutex::new(None),
            processor: Mutex::new(detached),
        }
    }

    /// Attach the adaptation processor. Dropping the strong side later
    /// detaches it; queries then fail open.
    pub fn set_adaptation_processor(&self, processor: Weak<dyn AdaptationProcessor>) {
        *self.processor.lock() = processor;
    }

    pub fn on_encoder_target_bitrate_updated(&self, bitrate_bps: Option<u64>) {
        *self.target_bitrate_bps.lock() = bitrate_bps;
    }
}

/// Placeholder for an unattached processor slot.
struct NeverProcessor;

impl AdaptationProcessor for NeverProcessor {
    fn time_since_last_adapt_down(&self, _dimension: AdaptationDimension) -> Option<Duration> {
        None
    }

    fn reset_video_source_restrictions(&self) {}
}

impl AdaptationConstraint for BalancedConstraint {
    fn name(&self) -> &'static str {
        "BalancedConstraint"
    }

    fn is_adaptation_up_allowed(
        &self,
        input_state: &VideoStreamInputState,
        restrictions_before: &VideoSourceRestrictions,
        restrictions_after: &VideoSourceRestrictions,
        _reason_resource: &Arc<dyn Resource>,
    ) -> bool {
        if *self.degradation_preference.lock() != DegradationPreference::Balanced {
            return true;
        }
        let dimension = if increases_resolution(restrictions_before, restrictions_after) {
            AdaptationDimension::Resolution
        } else if increases_frame_rate(restrictions_before, restrictions_after) {
            AdaptationDimension::FrameRate
        } else {
            return true;
        };
        let Some(processor) = self.processor.lock().upgrade() else {
            return true;
        };
        let Some(bitrate_bps) = *self.target_bitrate_bps.lock() else {
            return true;
        };
        let Some(rung) = self
            .config
            .rung_for_pixels(input_state.frame_size_pixels_or_default())
        else {
            return true;
        };
        if bitrate_bps < rung.min_bitrate_bps {
            tracing::debug!(
                bitrate_bps,
                min_bps = rung.min_bitrate_bps,
                ?dimension,
                "balanced up-step vetoed: bitrate below rung threshold"
            );
            return false;
        }
        match processor.time_since_last_adapt_down(dimension) {
            Some(elapsed) if elapsed < rung.min_time_since_adapt_down => {
                tracing::debug!(
                    ?elapsed,
                    min = ?rung.min_time_since_adapt_down,
                    ?dimension,
                    "balanced up-step vetoed: too soon after down-step"
                );
                false
            }
            _ => true,
        }
    }
}
