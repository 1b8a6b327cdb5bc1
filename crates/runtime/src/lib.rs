//! Hosting runtime for ability-driven entities.
//!
//! This crate wires `ability-core` into a running game: it consumes the
//! "entity ready" / "entity ending" lifecycle signals, drives the timer
//! clock, and fans every notification out onto a topic-based event bus for
//! UI, AI and network listeners.
//!
//! Modules are organized by responsibility:
//! - [`host`] owns the live entities and their ability systems
//! - [`runtime`] spawns the background worker and hands out handles
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod host;
pub mod runtime;

mod workers;

pub use api::{HostHandle, Result, RuntimeError};
pub use events::{BusForwarder, EntityEvent, Event, EventBus, LifecycleEvent, Topic};
pub use host::{EntityHost, EntityId, HudSnapshot};
pub use runtime::{AbilityRuntime, RuntimeConfig};
