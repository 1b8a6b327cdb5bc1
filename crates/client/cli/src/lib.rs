//! Scenario simulator for ability content.
//!
//! Loads a content directory, hosts one entity on the runtime, and replays a
//! RON script of steps against it while printing every notification.
//!
//! # Architecture
//!
//! - [`script`] parses scenario files
//! - [`report`] renders bus events and HUD snapshots as text
//! - [`sim`] drives the runtime through a [`ability_runtime::HostHandle`]

pub mod config;
pub mod report;
pub mod script;
pub mod sim;

pub use config::SimConfig;
pub use script::{Script, ScriptLoader, Step};
pub use sim::run_script;
