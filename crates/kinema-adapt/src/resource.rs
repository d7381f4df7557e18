use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique value handle identifying a registered resource.
///
/// Registry lookups key on the id rather than pointer identity, so
/// resources can be shared freely across execution contexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Allocate the next unique id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Something that reports an over-/under-use signal to the adaptation
/// processor: a CPU load estimator, a quality scaler, etc.
///
/// The signal path itself is external; this layer only needs identity
/// (to attribute restriction steps to a reason) and a name for logging.
/// Registered resources are shared (`Arc`) with the processor, never
/// uniquely owned here.
pub trait Resource: Send + Sync {
    fn id(&self) -> ResourceId;
    fn name(&self) -> &str;
}
