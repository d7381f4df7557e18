use std::sync::Arc;

use kinema_core::{
    increases_resolution, EncoderSettings, VideoSourceRestrictions, VideoStreamInputState,
};
use parking_lot::Mutex;

use crate::{AdaptationConstraint, Resource};

/// Vetoes resolution up-steps while the encoder target bitrate is below
/// the per-resolution start-bitrate floor.
///
/// Both caches are last-write-wins and written only from the adaptation
/// context. Without cached settings or bitrate there is not enough
/// information to veto, so the constraint fails open.
#[derive(Default)]
pub struct BitrateConstraint {
    encoder_settings: Mutex<Option<EncoderSettings>>,
    target_bitrate_bps: Mutex<Option<u64>>,
}

impl BitrateConstraint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_encoder_settings_updated(&self, settings: Option<EncoderSettings>) {
        *self.encoder_settings.lock() = settings;
    }

    pub fn on_encoder_target_bitrate_updated(&self, bitrate_bps: Option<u64>) {
        *self.target_bitrate_bps.lock() = bitrate_bps;
    }
}

impl AdaptationConstraint for BitrateConstraint {
    fn name(&self) -> &'static str {
        "BitrateConstraint"
    }

    fn is_adaptation_up_allowed(
        &self,
        input_state: &VideoStreamInputState,
        restrictions_before: &VideoSourceRestrictions,
        restrictions_after: &VideoSourceRestrictions,
        _reason_resource: &Arc<dyn Resource>,
    ) -> bool {
        if !increases_resolution(restrictions_before, restrictions_after) {
            return true;
        }
        let (Some(settings), Some(bitrate_bps)) = (
            self.encoder_settings.lock().clone(),
            *self.target_bitrate_bps.lock(),
        ) else {
            return true;
        };
        // Pixels the stream would run at after the step; unrestricted
        // means back to the full input size.
        let pixels_after = restrictions_after
            .effective_max_pixels()
            .unwrap_or_else(|| input_state.frame_size_pixels_or_default());
        match settings.min_start_bitrate_for_pixels(pixels_after) {
            Some(min_bps) if bitrate_bps < min_bps => {
                tracing::debug!(
                    bitrate_bps,
                    min_bps,
                    pixels_after,
                    "resolution up-step vetoed: target bitrate below floor"
                );
                false
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use kinema_core::VideoCodecKind;
    use rstest::rstest;

    use super::*;
    use crate::ResourceId;

    struct FakeResource(ResourceId);

    impl Resource for FakeResource {
        fn id(&self) -> ResourceId {
            self.0
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn resource() -> Arc<dyn Resource> {
        Arc::new(FakeResource(ResourceId::next()))
    }

    fn restrictions(max_pixels: Option<u64>) -> VideoSourceRestrictions {
        VideoSourceRestrictions {
            max_pixels_per_frame: max_pixels,
            target_pixels_per_frame: None,
            max_frame_rate: None,
        }
    }

    fn settings_720p(min_start_bps: u64) -> EncoderSettings {
        EncoderSettings::single_layer(VideoCodecKind::Vp8, 921_600, min_start_bps)
    }

    #[test]
    fn fails_open_without_cached_settings() {
        let constraint = BitrateConstraint::new();
        constraint.on_encoder_target_bitrate_updated(Some(10_000));
        assert!(constraint.is_adaptation_up_allowed(
            &VideoStreamInputState::default(),
            &restrictions(Some(100_000)),
            &restrictions(Some(1_000_000)),
            &resource(),
        ));
    }

    #[test]
    fn fails_open_without_cached_bitrate() {
        let constraint = BitrateConstraint::new();
        constraint.on_encoder_settings_updated(Some(settings_720p(600_000)));
        assert!(constraint.is_adaptation_up_allowed(
            &VideoStreamInputState::default(),
            &restrictions(Some(100_000)),
            &restrictions(Some(1_000_000)),
            &resource(),
        ));
    }

    #[rstest]
    #[case(599_999, false)]
    #[case(600_000, true)]
    #[case(700_000, true)]
    fn vetoes_below_floor(#[case] bitrate_bps: u64, #[case] allowed: bool) {
        let constraint = BitrateConstraint::new();
        constraint.on_encoder_settings_updated(Some(settings_720p(600_000)));
        constraint.on_encoder_target_bitrate_updated(Some(bitrate_bps));
        assert_eq!(
            constraint.is_adaptation_up_allowed(
                &VideoStreamInputState::default(),
                &restrictions(Some(100_000)),
                &restrictions(Some(1_000_000)),
                &resource(),
            ),
            allowed
        );
    }

    #[test]
    fn non_resolution_steps_are_never_vetoed() {
        let constraint = BitrateConstraint::new();
        constraint.on_encoder_settings_updated(Some(settings_720p(600_000)));
        constraint.on_encoder_target_bitrate_updated(Some(10_000));
        // Frame-rate-only change; resolution bound untouched.
        let before = VideoSourceRestrictions {
            max_frame_rate: Some(15.0),
            ..restrictions(Some(100_000))
        };
        let after = VideoSourceRestrictions {
            max_frame_rate: Some(30.0),
            ..restrictions(Some(100_000))
        };
        assert!(constraint.is_adaptation_up_allowed(
            &VideoStreamInputState::default(),
            &before,
            &after,
            &resource(),
        ));
    }

    #[test]
    fn unrestricted_step_uses_input_frame_size() {
        let constraint = BitrateConstraint::new();
        constraint.on_encoder_settings_updated(Some(settings_720p(600_000)));
        constraint.on_encoder_target_bitrate_updated(Some(100_000));
        let input = VideoStreamInputState {
            frame_size_pixels: Some(921_600),
            frames_per_second: Some(30.0),
        };
        // Removing the pixel cap entirely would jump to 720p input.
        assert!(!constraint.is_adaptation_up_allowed(
            &input,
            &restrictions(Some(100_000)),
            &restrictions(None),
            &resource(),
        ));
    }

    #[test]
    fn below_layer_resolution_has_no_floor() {
        let constraint = BitrateConstraint::new();
        constraint.on_encoder_settings_updated(Some(settings_720p(600_000)));
        constraint.on_encoder_target_bitrate_updated(Some(100_000));
        // Step up within sub-layer resolutions stays allowed.
        assert!(constraint.is_adaptation_up_allowed(
            &VideoStreamInputState::default(),
            &restrictions(Some(50_000)),
            &restrictions(Some(100_000)),
            &resource(),
        ));
    }
}
