//! Admission constraints: independent veto-only policies polled by the
//! external adaptation processor before every adapt-up step.

mod active_counts;
mod balanced;
mod bitrate;

pub use active_counts::ActiveCountsConstraint;
pub use balanced::{BalancedConstraint, BalancedDegradationConfig, BalancedDegradationRung};
pub use bitrate::BitrateConstraint;
