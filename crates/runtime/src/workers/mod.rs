//! Background workers owned by the runtime.

mod host;

pub use host::{Command, HostWorker};
