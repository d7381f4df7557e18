use std::fmt;

/// Why a restriction step was taken: CPU overuse or encoder quality
/// pressure. Exactly one reason is attributed to each registered
/// resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoAdaptationReason {
    Cpu,
    Quality,
}

impl VideoAdaptationReason {
    /// The opposite reason.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Cpu => Self::Quality,
            Self::Quality => Self::Cpu,
        }
    }
}

impl fmt::Display for VideoAdaptationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Quality => write!(f, "quality"),
        }
    }
}

/// Number of restriction steps currently applied, split by dimension.
///
/// Counters are summable component-wise; the adaptation layer maintains
/// one per reason such that their sum equals the total restriction
/// level reported by the adaptation processor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VideoAdaptationCounters {
    /// Times resolution has been reduced.
    pub resolution_adaptations: u32,
    /// Times frame rate has been reduced.
    pub fps_adaptations: u32,
}

impl VideoAdaptationCounters {
    #[must_use]
    pub fn new(resolution_adaptations: u32, fps_adaptations: u32) -> Self {
        Self {
            resolution_adaptations,
            fps_adaptations,
        }
    }

    /// Total steps across both dimensions.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.resolution_adaptations + self.fps_adaptations
    }

    /// Component-wise sum.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            resolution_adaptations: self.resolution_adaptations + other.resolution_adaptations,
            fps_adaptations: self.fps_adaptations + other.fps_adaptations,
        }
    }
}

impl fmt::Display for VideoAdaptationCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ res={} fps={} }}",
            self.resolution_adaptations, self.fps_adaptations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_reason_flips() {
        assert_eq!(VideoAdaptationReason::Cpu.other(), VideoAdaptationReason::Quality);
        assert_eq!(VideoAdaptationReason::Quality.other(), VideoAdaptationReason::Cpu);
    }

    #[test]
    fn counters_sum_component_wise() {
        let a = VideoAdaptationCounters::new(1, 2);
        let b = VideoAdaptationCounters::new(3, 0);
        assert_eq!(a.plus(&b), VideoAdaptationCounters::new(4, 2));
        assert_eq!(a.plus(&b).total(), 6);
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(VideoAdaptationCounters::default().total(), 0);
    }
}
