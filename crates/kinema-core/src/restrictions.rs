/// How the pipeline trades resolution against frame rate when adapting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DegradationPreference {
    /// No adaptation at all.
    Disabled,
    /// Reduce resolution, keep frame rate.
    #[default]
    MaintainFramerate,
    /// Reduce frame rate, keep resolution.
    MaintainResolution,
    /// Trade both dimensions jointly.
    Balanced,
}

/// Currently applied resolution/frame-rate restrictions for the stream.
///
/// Owned by the external adaptation processor; the manager only
/// observes snapshots of it. `None` means unrestricted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VideoSourceRestrictions {
    /// Upper bound on pixels per frame.
    pub max_pixels_per_frame: Option<u64>,
    /// Preferred pixel count when stepping resolution back up.
    pub target_pixels_per_frame: Option<u64>,
    /// Upper bound on frames per second.
    pub max_frame_rate: Option<f64>,
}

impl VideoSourceRestrictions {
    /// Effective pixel cap: the target takes precedence over the max
    /// when both are set (the processor uses the target while ramping
    /// back up).
    #[must_use]
    pub fn effective_max_pixels(&self) -> Option<u64> {
        self.target_pixels_per_frame.or(self.max_pixels_per_frame)
    }

    /// True if neither dimension is restricted.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.max_pixels_per_frame.is_none()
            && self.target_pixels_per_frame.is_none()
            && self.max_frame_rate.is_none()
    }
}

/// True if `after` allows a higher pixel count than `before`.
///
/// An unrestricted bound counts as higher than any finite bound.
#[must_use]
pub fn increases_resolution(
    before: &VideoSourceRestrictions,
    after: &VideoSourceRestrictions,
) -> bool {
    match (before.effective_max_pixels(), after.effective_max_pixels()) {
        (Some(b), Some(a)) => a > b,
        (Some(_), None) => true,
        _ => false,
    }
}

/// True if `after` allows a higher frame rate than `before`.
#[must_use]
pub fn increases_frame_rate(
    before: &VideoSourceRestrictions,
    after: &VideoSourceRestrictions,
) -> bool {
    match (before.max_frame_rate, after.max_frame_rate) {
        (Some(b), Some(a)) => a > b,
        (Some(_), None) => true,
        _ => false,
    }
}
