use kinema_core::{EncoderSettings, FrameSize};

/// Tuning for the initial frame dropper.
#[derive(Clone, Debug)]
pub struct InitialFrameDropOptions {
    /// Disable after this many size-based drops regardless of other
    /// conditions; forced dropping forever would stall the stream.
    pub max_initial_framedrops: u32,
    /// Frame rate assumed for the per-frame bit budget before the real
    /// rate is known.
    pub assumed_frame_rate: f64,
    /// Rough encoded cost per pixel used to project frame size.
    pub estimated_bits_per_pixel: f64,
    /// A frame is dropped when its projected size exceeds the budget
    /// times this margin.
    pub size_safety_margin: f64,
}

impl Default for InitialFrameDropOptions {
    fn default() -> Self {
        Self {
            max_initial_framedrops: 3,
            assumed_frame_rate: 30.0,
            estimated_bits_per_pixel: 0.04,
            size_safety_margin: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Active,
    Disabled,
}

/// Gates frames before the pipeline knows enough to adapt properly.
///
/// Starts `Active`; transitions to `Disabled` irreversibly once encoder
/// settings and a target bitrate are both known, the quality scaler has
/// taken over, or the drop cap is hit. `Disabled` is terminal for the
/// lifetime of the stream.
///
/// Owned by the pipeline context; not shared.
pub struct InitialFrameDropper {
    opts: InitialFrameDropOptions,
    state: State,
    dropped_frames: u32,
    encoder_settings_known: bool,
    target_bitrate_bps: Option<u64>,
    last_frame_pixels: Option<u64>,
    quality_scaler_active: bool,
}

impl InitialFrameDropper {
    #[must_use]
    pub fn new(opts: InitialFrameDropOptions) -> Self {
        Self {
            opts,
            state: State::Active,
            dropped_frames: 0,
            encoder_settings_known: false,
            target_bitrate_bps: None,
            last_frame_pixels: None,
            quality_scaler_active: false,
        }
    }

    pub fn on_encoder_settings_updated(&mut self, _settings: &EncoderSettings) {
        self.encoder_settings_known = true;
    }

    pub fn on_target_bitrate_updated(&mut self, bitrate_bps: u64) {
        self.target_bitrate_bps = Some(bitrate_bps);
    }

    /// Record an input frame about to be encoded.
    pub fn on_frame(&mut self, pixels: u64) {
        self.last_frame_pixels = Some(pixels);
    }

    /// The pipeline dropped a frame because it was too large for the
    /// current bitrate.
    pub fn on_frame_dropped_due_to_size(&mut self) {
        if self.state == State::Active {
            self.dropped_frames += 1;
        }
    }

    /// The quality scaler has taken over quality control; forced
    /// dropping is pointless from here on.
    pub fn on_quality_scaler_active(&mut self) {
        self.quality_scaler_active = true;
    }

    /// Evaluate the disable conditions; returns the number of frames
    /// dropped on the `Active -> Disabled` edge, `None` otherwise.
    pub fn poll_disabled(&mut self) -> Option<u32> {
        if self.state == State::Disabled {
            return None;
        }
        let informed = self.encoder_settings_known && self.target_bitrate_bps.is_some();
        let capped = self.dropped_frames >= self.opts.max_initial_framedrops;
        if informed || capped || self.quality_scaler_active {
            self.state = State::Disabled;
            tracing::debug!(
                dropped = self.dropped_frames,
                informed,
                capped,
                quality_scaler = self.quality_scaler_active,
                "initial frame dropper disabled"
            );
            return Some(self.dropped_frames);
        }
        None
    }

    /// Should the pipeline drop the current frame? `true` only while
    /// `Active` and only when the drop condition holds.
    #[must_use]
    pub fn should_drop_frames(&self) -> bool {
        if self.state == State::Disabled {
            return false;
        }
        let pixels = self
            .last_frame_pixels
            .unwrap_or_else(|| FrameSize::default().pixels());
        let Some(bitrate_bps) = self.target_bitrate_bps else {
            // Frame size/bitrate not stabilized yet.
            return true;
        };
        let budget_bits = bitrate_bps as f64 / self.opts.assumed_frame_rate;
        let projected_bits = pixels as f64 * self.opts.estimated_bits_per_pixel;
        projected_bits > budget_bits * self.opts.size_safety_margin
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }
}

#[cfg(test)]
mod tests {
    use kinema_core::VideoCodecKind;

    use super::*;

    fn settings() -> EncoderSettings {
        EncoderSettings::single_layer(VideoCodecKind::Vp8, 921_600, 600_000)
    }

    #[test]
    fn starts_active_and_dropping() {
        let dropper = InitialFrameDropper::new(InitialFrameDropOptions::default());
        assert!(dropper.is_active());
        assert!(dropper.should_drop_frames());
    }

    #[test]
    fn disables_once_settings_and_bitrate_known() {
        let mut dropper = InitialFrameDropper::new(InitialFrameDropOptions::default());
        dropper.on_encoder_settings_updated(&settings());
        assert!(dropper.poll_disabled().is_none());
        dropper.on_target_bitrate_updated(300_000);
        assert_eq!(dropper.poll_disabled(), Some(0));
        // Terminal: stays disabled, never drops again.
        assert!(!dropper.is_active());
        assert!(!dropper.should_drop_frames());
        assert!(dropper.poll_disabled().is_none());
    }

    #[test]
    fn drops_oversized_frames_while_active() {
        let mut dropper = InitialFrameDropper::new(InitialFrameDropOptions::default());
        // 100 kbps, 30 fps -> ~3.3 kbit budget; margin 2x -> ~6.7 kbit.
        dropper.on_target_bitrate_updated(100_000);
        // 720p at 0.04 bits/pixel projects ~36.9 kbit: drop.
        dropper.on_frame(921_600);
        assert!(dropper.should_drop_frames());
        // QCIF projects ~1 kbit: keep.
        dropper.on_frame(25_344);
        assert!(!dropper.should_drop_frames());
    }

    #[test]
    fn drop_cap_disables() {
        let mut dropper = InitialFrameDropper::new(InitialFrameDropOptions {
            max_initial_framedrops: 2,
            ..Default::default()
        });
        dropper.on_frame_dropped_due_to_size();
        assert!(dropper.poll_disabled().is_none());
        dropper.on_frame_dropped_due_to_size();
        assert_eq!(dropper.poll_disabled(), Some(2));
    }

    #[test]
    fn quality_scaler_takeover_disables() {
        let mut dropper = InitialFrameDropper::new(InitialFrameDropOptions::default());
        dropper.on_quality_scaler_active();
        assert_eq!(dropper.poll_disabled(), Some(0));
        assert!(!dropper.should_drop_frames());
    }

    #[test]
    fn drops_are_not_counted_after_disable() {
        let mut dropper = InitialFrameDropper::new(InitialFrameDropOptions::default());
        dropper.on_quality_scaler_active();
        dropper.poll_disabled();
        dropper.on_frame_dropped_due_to_size();
        assert!(!dropper.should_drop_frames());
    }
}
