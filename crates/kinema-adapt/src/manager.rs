use std::{
    sync::{Arc, Weak},
    time::Instant,
};

use kinema_core::{
    AdaptResult, DegradationPreference, EncoderSettings, FrameSize, VideoAdaptationCounters,
    VideoAdaptationReason, VideoSourceRestrictions,
};
use kinema_events::{AdaptationEvent, EventBus};
use parking_lot::Mutex;

use crate::{
    ActiveCounts, ActiveCountsConstraint, AdaptationConstraint, AdaptationListener,
    AdaptationProcessor, AdaptationStatsObserver, BalancedConstraint, BalancedDegradationConfig,
    BitrateConstraint, InitialFrameDropOptions, InitialFrameDropper, InputStateProvider,
    QualityRampupExperiment, QualityRampupOptions, Resource, ResourceRegistry,
    RestrictionsListener,
};

/// Why the pipeline dropped an already-captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDropReason {
    /// Dropped by media optimizations (bitrate/size limits).
    MediaOptimizations,
    /// Dropped inside the encoder.
    Encoder,
}

#[derive(Clone, Debug)]
pub struct ResourceManagerOptions {
    pub initial_frame_drop: InitialFrameDropOptions,
    pub balanced_degradation: BalancedDegradationConfig,
    pub quality_rampup: QualityRampupOptions,
}

impl Default for ResourceManagerOptions {
    fn default() -> Self {
        Self {
            initial_frame_drop: InitialFrameDropOptions::default(),
            balanced_degradation: BalancedDegradationConfig::typical(),
            quality_rampup: QualityRampupOptions::default(),
        }
    }
}

/// Coordinator for the resource-adaptation layer of one video stream.
///
/// Owns the resource-reason registry, the per-reason adaptation
/// counters, the three admission constraints, and the initial frame
/// dropper. Receives pipeline events and restriction updates; exposes
/// the constraint set as a read-only view to the external adaptation
/// processor. It never drives the processor: it is polled (constraints)
/// and notified (restriction updates) only.
///
/// Two single-threaded contexts call in: the encoder-facing pipeline
/// (frame hooks, `drop_initial_frames`) and the adaptation side
/// (restriction updates, settings, constraint queries). All shared
/// state is behind its own short-lived lock; no callback runs under a
/// lock.
pub struct ResourceManager {
    registry: Arc<ResourceRegistry>,
    active_counts: Arc<Mutex<ActiveCounts>>,
    active_counts_constraint: Arc<ActiveCountsConstraint>,
    bitrate_constraint: Arc<BitrateConstraint>,
    balanced_constraint: Arc<BalancedConstraint>,
    initial_frame_dropper: Mutex<InitialFrameDropper>,
    rampup: QualityRampupExperiment,
    stats_observer: Arc<dyn AdaptationStatsObserver>,
    input_state_provider: Arc<dyn InputStateProvider>,
    processor: Mutex<Option<Weak<dyn AdaptationProcessor>>>,
    degradation_preference: Arc<Mutex<DegradationPreference>>,
    current_restrictions: Mutex<VideoSourceRestrictions>,
    encoder_settings: Mutex<Option<EncoderSettings>>,
    target_bitrate_bps: Mutex<Option<u64>>,
    adaptation_listeners: Mutex<Vec<Arc<dyn AdaptationListener>>>,
    events: Option<EventBus>,
}

impl ResourceManager {
    #[must_use]
    pub fn new(
        input_state_provider: Arc<dyn InputStateProvider>,
        stats_observer: Arc<dyn AdaptationStatsObserver>,
        events: Option<EventBus>,
        opts: ResourceManagerOptions,
    ) -> Self {
        let registry = Arc::new(ResourceRegistry::new());
        let active_counts = Arc::new(Mutex::new(ActiveCounts::default()));
        let degradation_preference =
            Arc::new(Mutex::new(DegradationPreference::default()));
        Self {
            active_counts_constraint: Arc::new(ActiveCountsConstraint::new(
                registry.clone(),
                active_counts.clone(),
            )),
            bitrate_constraint: Arc::new(BitrateConstraint::new()),
            balanced_constraint: Arc::new(BalancedConstraint::new(
                opts.balanced_degradation,
                degradation_preference.clone(),
            )),
            initial_frame_dropper: Mutex::new(InitialFrameDropper::new(opts.initial_frame_drop)),
            rampup: QualityRampupExperiment::new(opts.quality_rampup),
            registry,
            active_counts,
            stats_observer,
            input_state_provider,
            processor: Mutex::new(None),
            degradation_preference,
            current_restrictions: Mutex::new(VideoSourceRestrictions::default()),
            encoder_settings: Mutex::new(None),
            target_bitrate_bps: Mutex::new(None),
            adaptation_listeners: Mutex::new(Vec::new()),
            events,
        }
    }

    /// Attach the external adaptation processor. Non-owning: dropping
    /// the strong side detaches it and constraint queries fail open.
    pub fn set_adaptation_processor(&self, processor: Weak<dyn AdaptationProcessor>) {
        self.balanced_constraint
            .set_adaptation_processor(processor.clone());
        *self.processor.lock() = Some(processor);
    }

    #[must_use]
    pub fn degradation_preference(&self) -> DegradationPreference {
        *self.degradation_preference.lock()
    }

    /// Change the degradation preference. Disabling adaptation
    /// invalidates prior history, so the per-reason counters reset.
    pub fn set_degradation_preference(&self, preference: DegradationPreference) {
        *self.degradation_preference.lock() = preference;
        if preference == DegradationPreference::Disabled {
            self.active_counts.lock().reset();
            tracing::debug!("adaptation disabled; active counts reset");
        }
    }

    /// Map a resource to the reason it reports for.
    pub fn register_resource(
        &self,
        resource: Arc<dyn Resource>,
        reason: VideoAdaptationReason,
    ) -> AdaptResult<()> {
        self.registry.map_resource_to_reason(resource, reason)
    }

    /// Tear down all managed resources. Callers must guarantee no
    /// further pipeline events are enqueued once this begins.
    pub fn stop_managed_resources(&self) {
        self.registry.clear();
        tracing::debug!("managed resources stopped");
    }

    #[must_use]
    pub fn mapped_resources(&self) -> Vec<Arc<dyn Resource>> {
        self.registry.mapped_resources()
    }

    /// Read-only view of the admission constraints, consumed by the
    /// external adaptation processor.
    #[must_use]
    pub fn adaptation_constraints(&self) -> Vec<Arc<dyn AdaptationConstraint>> {
        let mut constraints: Vec<Arc<dyn AdaptationConstraint>> = Vec::with_capacity(3);
        constraints.push(self.active_counts_constraint.clone());
        constraints.push(self.bitrate_constraint.clone());
        constraints.push(self.balanced_constraint.clone());
        constraints
    }

    /// Register a listener to be notified of applied adaptation steps.
    pub fn add_adaptation_listener(&self, listener: Arc<dyn AdaptationListener>) {
        self.adaptation_listeners.lock().push(listener);
    }

    /// Read-only view of the adaptation listeners, consumed by the
    /// external adaptation processor alongside the constraints.
    #[must_use]
    pub fn adaptation_listeners(&self) -> Vec<Arc<dyn AdaptationListener>> {
        self.adaptation_listeners.lock().clone()
    }

    /// Current per-reason counters (statistics view).
    #[must_use]
    pub fn active_counts(&self, reason: VideoAdaptationReason) -> VideoAdaptationCounters {
        self.active_counts.lock().get(reason)
    }

    /// Most recently observed source restrictions.
    #[must_use]
    pub fn video_source_restrictions(&self) -> VideoSourceRestrictions {
        *self.current_restrictions.lock()
    }

    #[must_use]
    pub fn encoder_settings(&self) -> Option<EncoderSettings> {
        self.encoder_settings.lock().clone()
    }

    #[must_use]
    pub fn target_bitrate_bps(&self) -> Option<u64> {
        *self.target_bitrate_bps.lock()
    }

    pub fn set_encoder_settings(&self, settings: EncoderSettings) {
        self.bitrate_constraint
            .on_encoder_settings_updated(Some(settings.clone()));
        let disabled_edge = {
            let mut dropper = self.initial_frame_dropper.lock();
            dropper.on_encoder_settings_updated(&settings);
            dropper.poll_disabled()
        };
        self.publish_dropper_disabled(disabled_edge);
        *self.encoder_settings.lock() = Some(settings);
    }

    /// Initial bandwidth estimate, available before the first target
    /// bitrate. Seeds the frame dropper's budget.
    pub fn set_start_bitrate(&self, bitrate_bps: u64) {
        let disabled_edge = {
            let mut dropper = self.initial_frame_dropper.lock();
            dropper.on_target_bitrate_updated(bitrate_bps);
            dropper.poll_disabled()
        };
        self.publish_dropper_disabled(disabled_edge);
    }

    pub fn set_target_bitrate(&self, bitrate_bps: u64, now: Instant) {
        *self.target_bitrate_bps.lock() = Some(bitrate_bps);
        self.bitrate_constraint
            .on_encoder_target_bitrate_updated(Some(bitrate_bps));
        self.balanced_constraint
            .on_encoder_target_bitrate_updated(Some(bitrate_bps));
        let disabled_edge = {
            let mut dropper = self.initial_frame_dropper.lock();
            dropper.on_target_bitrate_updated(bitrate_bps);
            dropper.poll_disabled()
        };
        self.publish_dropper_disabled(disabled_edge);
        self.rampup.observe_target_bitrate(bitrate_bps, now);
    }

    /// The quality scaler has taken over quality control.
    pub fn on_quality_scaler_active(&self) {
        let disabled_edge = {
            let mut dropper = self.initial_frame_dropper.lock();
            dropper.on_quality_scaler_active();
            dropper.poll_disabled()
        };
        self.publish_dropper_disabled(disabled_edge);
    }

    /// Pipeline hook: about to decide whether to encode a frame.
    pub fn on_maybe_encode_frame(&self, now: Instant) {
        // Snapshot the input state before touching the dropper: the
        // provider is an external callback and must not run under a
        // lock.
        let input = self.input_state_provider.current_input_state();
        let disabled_edge = {
            let mut dropper = self.initial_frame_dropper.lock();
            if dropper.is_active() {
                if let Some(pixels) = input.frame_size_pixels {
                    dropper.on_frame(pixels);
                }
            }
            dropper.poll_disabled()
        };
        self.publish_dropper_disabled(disabled_edge);
        self.maybe_perform_quality_rampup(now);
    }

    /// Should the pipeline drop frames before encoding?
    #[must_use]
    pub fn drop_initial_frames(&self) -> bool {
        self.initial_frame_dropper.lock().should_drop_frames()
    }

    /// Pipeline hook: a frame was dropped for exceeding the size budget.
    pub fn on_frame_dropped_due_to_size(&self) {
        let disabled_edge = {
            let mut dropper = self.initial_frame_dropper.lock();
            dropper.on_frame_dropped_due_to_size();
            dropper.poll_disabled()
        };
        self.publish_dropper_disabled(disabled_edge);
        tracing::trace!("frame dropped due to size");
    }

    /// Pipeline hook: encoding of a frame has started.
    pub fn on_encode_started(&self, frame: FrameSize) {
        self.initial_frame_dropper.lock().on_frame(frame.pixels());
    }

    /// Pipeline hook: a frame finished encoding. Encoded-size
    /// statistics are aggregated by the caller's stats layer, not here;
    /// this layer only traces the event.
    pub fn on_encode_completed(&self, encoded_bytes: u64) {
        tracing::trace!(encoded_bytes, "encode completed");
    }

    /// Pipeline hook: a frame was dropped after capture. Drop-rate
    /// statistics are aggregated by the caller's stats layer, not here;
    /// this layer only traces the event.
    pub fn on_frame_dropped(&self, reason: FrameDropReason) {
        tracing::trace!(?reason, "frame dropped");
    }

    /// Publish the `Active -> Disabled` edge of the frame dropper.
    /// Every mutation of the dropper polls the edge immediately, so
    /// `drop_initial_frames` reflects the transition without waiting
    /// for the next pipeline poll.
    fn publish_dropper_disabled(&self, disabled_edge: Option<u32>) {
        if let (Some(frames_dropped), Some(bus)) = (disabled_edge, &self.events) {
            bus.publish(AdaptationEvent::InitialFrameDropperDisabled { frames_dropped });
        }
    }

    /// Execute the one-shot quality rampup when the bandwidth estimate
    /// has stayed high while only quality restrictions are in place.
    fn maybe_perform_quality_rampup(&self, now: Instant) {
        if !self.rampup.ready(now) {
            return;
        }
        if self.current_restrictions.lock().is_unrestricted() {
            return;
        }
        {
            let counts = self.active_counts.lock();
            if counts.get(VideoAdaptationReason::Cpu).total() > 0
                || counts.get(VideoAdaptationReason::Quality).total() == 0
            {
                return;
            }
        }
        let Some(processor) = self
            .processor
            .lock()
            .as_ref()
            .and_then(Weak::upgrade)
        else {
            return;
        };
        if self.rampup.try_complete() {
            tracing::debug!("quality rampup: resetting video source restrictions");
            processor.reset_video_source_restrictions();
            if let Some(bus) = &self.events {
                bus.publish(AdaptationEvent::QualityRampup);
            }
        }
    }
}

impl RestrictionsListener for ResourceManager {
    fn on_video_source_restrictions_updated(
        &self,
        restrictions: VideoSourceRestrictions,
        counters_total: VideoAdaptationCounters,
        reason_resource: Option<Arc<dyn Resource>>,
    ) {
        *self.current_restrictions.lock() = restrictions;
        if let Some(bus) = &self.events {
            bus.publish(AdaptationEvent::RestrictionsUpdated {
                max_pixels_per_frame: restrictions.effective_max_pixels(),
                max_frame_rate: restrictions.max_frame_rate,
            });
        }
        let Some(resource) = reason_resource else {
            // Externally-driven change: nothing to attribute. A zero
            // total means adaptation was reset wholesale.
            if counters_total == VideoAdaptationCounters::default() {
                self.active_counts.lock().reset();
            }
            return;
        };
        let reason = match self.registry.reason_for(resource.id()) {
            Ok(reason) => reason,
            Err(err) => {
                tracing::warn!(resource = resource.name(), %err, "restriction update for unregistered resource");
                return;
            }
        };
        let counters = self.active_counts.lock().apply(&counters_total, reason);
        tracing::debug!(
            %reason,
            %counters,
            total = %counters_total,
            "adaptation counters updated"
        );
        self.stats_observer
            .on_adaptation_changed(reason, counters, counters_total);
    }
}
