//! Topic-based event bus for runtime events.
//!
//! Every entity's notifications are tagged with the entity and published to
//! the topic matching their kind, so consumers subscribe only to what they
//! need (a HUD to attributes and effects, a progress bar to progress).

mod bus;
mod forwarder;

pub use bus::{EntityEvent, Event, EventBus, LifecycleEvent, Topic};
pub use forwarder::BusForwarder;
