//! High-level runtime orchestrator.
//!
//! The runtime owns the host worker, wires up command/event channels, and
//! exposes a cloneable [`HostHandle`] for clients.

use std::sync::Arc;
use std::time::Duration;

use ability_core::AbilityRegistry;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::api::{HostHandle, Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::host::EntityHost;
use crate::workers::HostWorker;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Real-time clock period; `None` leaves time to [`HostHandle::advance`].
    pub tick_interval: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
            tick_interval: None,
        }
    }
}

/// Main runtime that hosts ability-driven entities
///
/// Must be started from within a tokio runtime.
pub struct AbilityRuntime {
    handle: HostHandle,
    worker_handle: JoinHandle<()>,
}

impl AbilityRuntime {
    pub fn start(registry: Arc<AbilityRegistry>, config: RuntimeConfig) -> Self {
        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size);

        let host = EntityHost::new(registry, event_bus.clone());
        let worker = HostWorker::new(host, command_rx, config.tick_interval);
        let worker_handle = tokio::spawn(worker.run());

        Self {
            handle: HostHandle::new(command_tx, event_bus),
            worker_handle,
        }
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker ends every live entity once all handles are dropped, so
    /// outstanding clones delay completion.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}
