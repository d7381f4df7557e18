use kinema_core::{VideoAdaptationCounters, VideoAdaptationReason};

/// Per-reason adaptation counters.
///
/// Invariant: after every [`ActiveCounts::apply`] call, the
/// component-wise sum of both reasons' counters equals the total passed
/// to that call. Owned by the adaptation context; other contexts learn
/// outcomes via the statistics observer only.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActiveCounts {
    cpu: VideoAdaptationCounters,
    quality: VideoAdaptationCounters,
}

impl ActiveCounts {
    #[must_use]
    pub fn get(&self, reason: VideoAdaptationReason) -> VideoAdaptationCounters {
        match reason {
            VideoAdaptationReason::Cpu => self.cpu,
            VideoAdaptationReason::Quality => self.quality,
        }
    }

    /// Component-wise sum across both reasons.
    #[must_use]
    pub fn total(&self) -> VideoAdaptationCounters {
        self.cpu.plus(&self.quality)
    }

    /// Zero both reasons. Used when the degradation preference changes
    /// in a way that invalidates prior history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reconcile against a new total attributed to `reason`.
    ///
    /// Must be called once per adaptation step. Returns the updated
    /// counters for `reason`.
    pub fn apply(
        &mut self,
        new_total: &VideoAdaptationCounters,
        reason: VideoAdaptationReason,
    ) -> VideoAdaptationCounters {
        let (active, other) = match reason {
            VideoAdaptationReason::Cpu => (&mut self.cpu, &mut self.quality),
            VideoAdaptationReason::Quality => (&mut self.quality, &mut self.cpu),
        };
        reconcile(new_total, active, other);
        self.get(reason)
    }
}

/// Split a new total restriction count between the triggering reason
/// (`active`) and the other reason (`other`).
///
/// A positive delta (stricter restriction) is credited entirely to the
/// triggering reason. A negative delta (adapt up) drains the triggering
/// reason to zero first; only the excess is taken from the other
/// reason. Both counters are clamped at zero; a clamp that would
/// discard magnitude means the caller delivered an inconsistent total
/// (e.g. a duplicate notification) and is a logic error upstream.
pub fn reconcile(
    new_total: &VideoAdaptationCounters,
    active: &mut VideoAdaptationCounters,
    other: &mut VideoAdaptationCounters,
) {
    reconcile_component(
        new_total.resolution_adaptations,
        &mut active.resolution_adaptations,
        &mut other.resolution_adaptations,
    );
    reconcile_component(
        new_total.fps_adaptations,
        &mut active.fps_adaptations,
        &mut other.fps_adaptations,
    );
}

fn reconcile_component(new_total: u32, active: &mut u32, other: &mut u32) {
    let current = *active + *other;
    if new_total >= current {
        *active += new_total - current;
        return;
    }
    let mut decrease = current - new_total;
    let from_active = decrease.min(*active);
    *active -= from_active;
    decrease -= from_active;
    let from_other = decrease.min(*other);
    *other -= from_other;
    decrease -= from_other;
    if decrease > 0 {
        tracing::warn!(
            new_total,
            active = *active,
            other = *other,
            discarded = decrease,
            "adaptation count clamped; caller delivered an inconsistent total"
        );
        debug_assert_eq!(decrease, 0, "inconsistent adaptation count update");
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn counters(res: u32, fps: u32) -> VideoAdaptationCounters {
        VideoAdaptationCounters::new(res, fps)
    }

    // (total, active_in, other_in) -> (active_out, other_out)
    #[rstest]
    // First restriction step credits the triggering reason.
    #[case(counters(1, 0), counters(0, 0), counters(0, 0), counters(1, 0), counters(0, 0))]
    // Stricter step on top of existing counts.
    #[case(counters(2, 1), counters(1, 0), counters(0, 1), counters(2, 0), counters(0, 1))]
    // Adapt up drains the triggering reason first.
    #[case(counters(1, 0), counters(1, 0), counters(1, 0), counters(0, 0), counters(1, 0))]
    // Excess beyond the triggering reason spills to the other reason.
    #[case(counters(0, 0), counters(1, 0), counters(1, 0), counters(0, 0), counters(0, 0))]
    // Frame-rate dimension reconciles independently.
    #[case(counters(1, 2), counters(1, 1), counters(0, 0), counters(1, 2), counters(0, 0))]
    fn reconcile_splits_delta(
        #[case] total: VideoAdaptationCounters,
        #[case] mut active: VideoAdaptationCounters,
        #[case] mut other: VideoAdaptationCounters,
        #[case] expected_active: VideoAdaptationCounters,
        #[case] expected_other: VideoAdaptationCounters,
    ) {
        reconcile(&total, &mut active, &mut other);
        assert_eq!(active, expected_active);
        assert_eq!(other, expected_other);
        // Invariant: the split always sums to the new total.
        assert_eq!(active.plus(&other), total);
    }

    #[test]
    fn invariant_holds_across_arbitrary_sequences() {
        // Pseudo-random walk over totals; the split must track exactly.
        let mut counts = ActiveCounts::default();
        let mut seed = 0x9e37_79b9_u32;
        let mut total = counters(0, 0);
        for step in 0..200 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let reason = if seed & 1 == 0 {
                VideoAdaptationReason::Cpu
            } else {
                VideoAdaptationReason::Quality
            };
            // Move one dimension up or down by one step, floored at zero.
            let up = (seed >> 1) & 1 == 0;
            if (seed >> 2) & 1 == 0 {
                total.resolution_adaptations = if up {
                    total.resolution_adaptations + 1
                } else {
                    total.resolution_adaptations.saturating_sub(1)
                };
            } else {
                total.fps_adaptations = if up {
                    total.fps_adaptations + 1
                } else {
                    total.fps_adaptations.saturating_sub(1)
                };
            }
            counts.apply(&total, reason);
            assert_eq!(counts.total(), total, "invariant broken at step {step}");
        }
    }

    #[test]
    fn example_scenario_cpu_down_then_up() {
        let mut counts = ActiveCounts::default();

        counts.apply(&counters(1, 0), VideoAdaptationReason::Cpu);
        assert_eq!(counts.get(VideoAdaptationReason::Cpu), counters(1, 0));
        assert_eq!(counts.get(VideoAdaptationReason::Quality), counters(0, 0));

        counts.apply(&counters(0, 0), VideoAdaptationReason::Cpu);
        assert_eq!(counts.get(VideoAdaptationReason::Cpu), counters(0, 0));
        assert_eq!(counts.get(VideoAdaptationReason::Quality), counters(0, 0));
    }

    #[test]
    fn adapt_up_spills_to_other_reason() {
        let mut counts = ActiveCounts::default();
        counts.apply(&counters(1, 0), VideoAdaptationReason::Cpu);
        counts.apply(&counters(2, 0), VideoAdaptationReason::Quality);

        // Quality adapts up by two steps; it only had one, so the
        // second comes out of the cpu counter.
        counts.apply(&counters(0, 0), VideoAdaptationReason::Quality);
        assert_eq!(counts.get(VideoAdaptationReason::Cpu), counters(0, 0));
        assert_eq!(counts.get(VideoAdaptationReason::Quality), counters(0, 0));
    }

    #[test]
    fn reset_zeroes_both_reasons() {
        let mut counts = ActiveCounts::default();
        counts.apply(&counters(2, 1), VideoAdaptationReason::Quality);
        counts.reset();
        assert_eq!(counts.total(), counters(0, 0));
    }
}
