/// Codec in use by the encoder. Only identity matters to the
/// adaptation layer; codec-specific tuning stays in the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoCodecKind {
    Vp8,
    Vp9,
    H264,
    Av1,
}

/// One configured simulcast/SVC stream layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamLayer {
    /// Pixel count this layer encodes at.
    pub max_pixels_per_frame: u64,
    /// Bitrate below which starting this layer is not considered viable.
    pub min_start_bitrate_bps: u64,
    /// Whether the layer is currently enabled.
    pub active: bool,
}

/// Encoder configuration as cached by the adaptation layer.
///
/// Last-write-wins snapshot; no history is retained. The bitrate
/// constraint derives per-resolution bitrate floors from the layer
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderSettings {
    pub codec: VideoCodecKind,
    /// Configured stream layers, lowest resolution first.
    pub layers: Vec<StreamLayer>,
}

impl EncoderSettings {
    /// Single-layer convenience constructor.
    #[must_use]
    pub fn single_layer(codec: VideoCodecKind, max_pixels: u64, min_start_bitrate_bps: u64) -> Self {
        Self {
            codec,
            layers: vec![StreamLayer {
                max_pixels_per_frame: max_pixels,
                min_start_bitrate_bps,
                active: true,
            }],
        }
    }

    /// The active layer, if exactly one layer is active.
    ///
    /// Multi-layer (simulcast/SVC) configurations return `None`: the
    /// per-resolution bitrate floor is only meaningful for a single
    /// stream, callers fail open otherwise.
    #[must_use]
    pub fn single_active_layer(&self) -> Option<&StreamLayer> {
        let mut active = self.layers.iter().filter(|l| l.active);
        match (active.next(), active.next()) {
            (Some(layer), None) => Some(layer),
            _ => None,
        }
    }

    /// Minimum viable start bitrate for encoding at `pixels`, when a
    /// single active layer defines one and `pixels` would reach it.
    #[must_use]
    pub fn min_start_bitrate_for_pixels(&self, pixels: u64) -> Option<u64> {
        let layer = self.single_active_layer()?;
        (pixels >= layer.max_pixels_per_frame).then_some(layer.min_start_bitrate_bps)
    }
}
