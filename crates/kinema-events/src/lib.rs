//! Event bus for the kinema video adaptation pipeline.
//!
//! Components publish adaptation events onto a cloned [`EventBus`];
//! observers (statistics, UI, logging) subscribe independently.

#![forbid(unsafe_code)]

mod adaptation;
mod bus;
mod event;

pub use adaptation::AdaptationEvent;
pub use bus::EventBus;
pub use event::Event;
