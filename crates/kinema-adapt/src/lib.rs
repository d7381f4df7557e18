//! Constraint-gated resource adaptation coordinator.
//!
//! This crate is the decision layer of a real-time video sender: it
//! ties abstract resource-usage signals (CPU load, encoder quality
//! pressure) to adaptation reasons, reconciles per-reason adaptation
//! counters against the stream's true restriction level, and vetoes
//! unsafe "adapt up" steps through three independent admission
//! constraints:
//!
//! - [`ActiveCountsConstraint`]: a reason may only restore quality it
//!   previously took away.
//! - [`BitrateConstraint`]: resolution may not step up while the target
//!   bitrate is below the per-resolution floor.
//! - [`BalancedConstraint`]: in balanced degradation, up-steps are rate
//!   limited per dimension.
//!
//! The external adaptation processor drives all actual restriction
//! changes; this layer is polled (constraints) and notified
//! (restriction updates), never a driver.

#![forbid(unsafe_code)]

mod constraints;
mod counts;
mod frame_dropper;
mod manager;
mod rampup;
mod registry;
mod resource;
mod stats;
mod traits;

pub use constraints::{
    ActiveCountsConstraint, BalancedConstraint, BalancedDegradationConfig,
    BalancedDegradationRung, BitrateConstraint,
};
pub use counts::ActiveCounts;
pub use frame_dropper::{InitialFrameDropOptions, InitialFrameDropper};
pub use manager::{FrameDropReason, ResourceManager, ResourceManagerOptions};
pub use rampup::{QualityRampupExperiment, QualityRampupOptions};
pub use registry::{ResourceAndReason, ResourceRegistry};
pub use resource::{Resource, ResourceId};
pub use stats::BusStatsObserver;
pub use traits::{
    AdaptationConstraint, AdaptationDimension, AdaptationListener, AdaptationProcessor,
    AdaptationStatsObserver, InputStateProvider, RestrictionsListener,
};
