use std::sync::Arc;

use kinema_core::{AdaptError, AdaptResult, VideoAdaptationReason};
use parking_lot::Mutex;

use crate::{Resource, ResourceId};

/// Immutable pairing of a registered resource and the reason it
/// represents. Created on registration, destroyed on unregistration or
/// manager teardown, never mutated in between.
#[derive(Clone)]
pub struct ResourceAndReason {
    pub resource: Arc<dyn Resource>,
    pub reason: VideoAdaptationReason,
}

/// Thread-safe mapping from resources to adaptation reasons.
///
/// Registration happens on the pipeline side while reason lookups come
/// from the adaptation side, so every operation takes the same mutex.
/// Critical sections are plain lookups/inserts with copy-out results;
/// no callbacks run under the lock.
#[derive(Default)]
pub struct ResourceRegistry {
    inner: Mutex<Vec<ResourceAndReason>>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `resource` to `reason`.
    ///
    /// Re-mapping to the same reason is an idempotent no-op; re-mapping
    /// to a different reason fails with `InvalidArgument`.
    pub fn map_resource_to_reason(
        &self,
        resource: Arc<dyn Resource>,
        reason: VideoAdaptationReason,
    ) -> AdaptResult<()> {
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.iter().find(|r| r.resource.id() == resource.id()) {
            if existing.reason == reason {
                return Ok(());
            }
            return Err(AdaptError::InvalidArgument(format!(
                "resource '{}' already mapped to reason {}",
                resource.name(),
                existing.reason
            )));
        }
        tracing::debug!(resource = resource.name(), %reason, "resource registered");
        inner.push(ResourceAndReason { resource, reason });
        Ok(())
    }

    /// Reason for a previously registered resource.
    ///
    /// Querying an unregistered resource is a caller bug and fails with
    /// `NotFound`.
    pub fn reason_for(&self, id: ResourceId) -> AdaptResult<VideoAdaptationReason> {
        self.inner
            .lock()
            .iter()
            .find(|r| r.resource.id() == id)
            .map(|r| r.reason)
            .ok_or_else(|| AdaptError::NotFound(format!("resource {id:?} is not registered")))
    }

    /// Registered resources in registration order.
    #[must_use]
    pub fn mapped_resources(&self) -> Vec<Arc<dyn Resource>> {
        self.inner.lock().iter().map(|r| r.resource.clone()).collect()
    }

    /// Remove a single resource. Returns whether it was registered.
    pub fn unregister(&self, id: ResourceId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.len();
        inner.retain(|r| r.resource.id() != id);
        inner.len() != before
    }

    /// Remove all resources (manager teardown).
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
