/// Assumed input size before the first frame has been observed.
pub const DEFAULT_INPUT_WIDTH: u32 = 176;
pub const DEFAULT_INPUT_HEIGHT: u32 = 144;

/// Width/height of a video frame as delivered to the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_WIDTH, DEFAULT_INPUT_HEIGHT)
    }
}

/// Snapshot of what the pipeline currently feeds the encoder.
///
/// Produced synchronously by the pipeline-side input-state provider;
/// consumed by admission constraints when judging an adapt-up step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VideoStreamInputState {
    /// Pixel count of the most recent input frame, if any was seen.
    pub frame_size_pixels: Option<u64>,
    /// Observed input frame rate.
    pub frames_per_second: Option<f64>,
}

impl VideoStreamInputState {
    /// Last observed frame size, or the assumed default before the
    /// first frame.
    #[must_use]
    pub fn frame_size_pixels_or_default(&self) -> u64 {
        self.frame_size_pixels
            .unwrap_or_else(|| FrameSize::default().pixels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_multiplies_dimensions() {
        assert_eq!(FrameSize::new(1280, 720).pixels(), 921_600);
    }

    #[test]
    fn default_size_used_before_first_frame() {
        let state = VideoStreamInputState::default();
        assert_eq!(state.frame_size_pixels_or_default(), 176 * 144);
    }
}
