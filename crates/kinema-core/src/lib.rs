//! Core data types for the kinema video adaptation layer.
//!
//! Everything here is pure data: adaptation reasons and counters,
//! source restrictions, pipeline input state, and cached encoder
//! settings. Behavior (registries, constraints, the resource manager)
//! lives in `kinema-adapt`.

#![forbid(unsafe_code)]

mod counters;
mod errors;
mod input;
mod restrictions;
mod settings;

pub use counters::{VideoAdaptationCounters, VideoAdaptationReason};
pub use errors::{AdaptError, AdaptResult};
pub use input::{FrameSize, VideoStreamInputState, DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH};
pub use restrictions::{
    increases_frame_rate, increases_resolution, DegradationPreference, VideoSourceRestrictions,
};
pub use settings::{EncoderSettings, StreamLayer, VideoCodecKind};
