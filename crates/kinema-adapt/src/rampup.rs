use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// Configuration for the one-shot quality rampup.
#[derive(Clone, Debug)]
pub struct QualityRampupOptions {
    pub enabled: bool,
    /// Bandwidth estimate that counts as "high enough".
    pub min_bitrate_bps: u64,
    /// How long the estimate must stay high before ramping up.
    pub min_duration: Duration,
}

impl Default for QualityRampupOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            min_bitrate_bps: 2_000_000,
            min_duration: Duration::from_secs(10),
        }
    }
}

/// One-shot experiment: clear all quality restrictions early in the
/// call if the bandwidth estimate stays high long enough.
///
/// The done flag is the only state legitimately read from both
/// execution contexts without a lock: it is monotonic (false to true,
/// never back), and a check-then-act race costs at most one redundant
/// execution of an idempotent reset.
pub struct QualityRampupExperiment {
    opts: QualityRampupOptions,
    done: AtomicBool,
    high_bitrate_since: Mutex<Option<Instant>>,
}

impl QualityRampupExperiment {
    #[must_use]
    pub fn new(opts: QualityRampupOptions) -> Self {
        Self {
            opts,
            done: AtomicBool::new(false),
            high_bitrate_since: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Track how long the target bitrate has stayed at or above the
    /// threshold.
    pub fn observe_target_bitrate(&self, bitrate_bps: u64, now: Instant) {
        let mut since = self.high_bitrate_since.lock();
        if bitrate_bps >= self.opts.min_bitrate_bps {
            since.get_or_insert(now);
        } else {
            *since = None;
        }
    }

    /// Have the rampup preconditions held long enough?
    #[must_use]
    pub fn ready(&self, now: Instant) -> bool {
        if !self.opts.enabled || self.is_done() {
            return false;
        }
        self.high_bitrate_since
            .lock()
            .is_some_and(|since| now.duration_since(since) >= self.opts.min_duration)
    }

    /// Claim the one-shot. Returns `true` for exactly one caller; the
    /// flag never reverts.
    pub fn try_complete(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }
}
