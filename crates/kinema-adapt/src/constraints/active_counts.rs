use std::sync::Arc;

use kinema_core::{VideoSourceRestrictions, VideoStreamInputState};
use parking_lot::Mutex;

use crate::{ActiveCounts, AdaptationConstraint, Resource, ResourceRegistry};

/// Vetoes adapt-up steps for reasons that have never restricted
/// anything: a resource may only restore quality its reason previously
/// took away.
///
/// Holds shared handles to exactly the state it reads; it carries no
/// reference to the manager itself and must simply not outlive the
/// state handles, which `Arc` guarantees.
pub struct ActiveCountsConstraint {
    registry: Arc<ResourceRegistry>,
    active_counts: Arc<Mutex<ActiveCounts>>,
}

impl ActiveCountsConstraint {
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>, active_counts: Arc<Mutex<ActiveCounts>>) -> Self {
        Self {
            registry,
            active_counts,
        }
    }
}

impl AdaptationConstraint for ActiveCountsConstraint {
    fn name(&self) -> &'static str {
        "ActiveCountsConstraint"
    }

    fn is_adaptation_up_allowed(
        &self,
        _input_state: &VideoStreamInputState,
        _restrictions_before: &VideoSourceRestrictions,
        _restrictions_after: &VideoSourceRestrictions,
        reason_resource: &Arc<dyn Resource>,
    ) -> bool {
        let reason = match self.registry.reason_for(reason_resource.id()) {
            Ok(reason) => reason,
            Err(err) => {
                // Lookup failure is an upstream bookkeeping bug; a veto
                // here would freeze quality, so fail open.
                tracing::warn!(resource = reason_resource.name(), %err, "reason lookup failed");
                return true;
            }
        };
        let counters = self.active_counts.lock().get(reason);
        let allowed = counters.total() > 0;
        if !allowed {
            tracing::debug!(%reason, "adapt up vetoed: reason has no active adaptations");
        }
        allowed
    }
}
