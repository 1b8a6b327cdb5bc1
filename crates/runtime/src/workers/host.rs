//! Host worker that owns the authoritative [`EntityHost`].
//!
//! Receives commands from [`crate::HostHandle`], applies them to the host,
//! and optionally advances every entity's clock on a fixed interval.

use std::time::Duration;

use ability_core::{AbilityConfig, AttributeClass, EffectClass, EffectId, ModifyKind};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::api::Result;
use crate::host::{EntityHost, EntityId, HudSnapshot};

/// Commands that can be sent to the host worker
pub enum Command {
    Spawn {
        entity: EntityId,
        config: AbilityConfig,
        reply: oneshot::Sender<Result<()>>,
    },
    Despawn {
        entity: EntityId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Advance every clock manually, independent of the tick interval.
    Advance {
        delta: f32,
        reply: oneshot::Sender<usize>,
    },
    AddEffect {
        entity: EntityId,
        class: EffectClass,
        reply: oneshot::Sender<Result<EffectId>>,
    },
    StopEffect {
        entity: EntityId,
        class: EffectClass,
        reply: oneshot::Sender<Result<EffectId>>,
    },
    StopEffectById {
        entity: EntityId,
        effect: EffectId,
        reply: oneshot::Sender<Result<()>>,
    },
    StopAllEffectsByClass {
        entity: EntityId,
        class: EffectClass,
        reply: oneshot::Sender<Result<usize>>,
    },
    EditAttribute {
        entity: EntityId,
        attribute: AttributeClass,
        kind: ModifyKind,
        value: f32,
        reply: oneshot::Sender<Result<f32>>,
    },
    Snapshot {
        entity: EntityId,
        reply: oneshot::Sender<Result<HudSnapshot>>,
    },
}

/// Background task that processes host commands.
pub struct HostWorker {
    host: EntityHost,
    command_rx: mpsc::Receiver<Command>,
    ticker: Option<Interval>,
}

impl HostWorker {
    pub fn new(
        host: EntityHost,
        command_rx: mpsc::Receiver<Command>,
        tick_interval: Option<Duration>,
    ) -> Self {
        let ticker = tick_interval.filter(|period| !period.is_zero()).map(|period| {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        info!(
            tick_interval = ?ticker.as_ref().map(Interval::period),
            "HostWorker initialized"
        );

        Self {
            host,
            command_rx,
            ticker,
        }
    }

    /// Main worker loop.
    ///
    /// Runs until every command sender is dropped, then ends all entities.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                delta = next_tick(&mut self.ticker) => {
                    let fired = self.host.advance(delta);
                    trace!(delta, fired, "clock tick");
                }
            }
        }

        let ended = self.host.despawn_all();
        debug!(ended, "HostWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        let host = &mut self.host;
        let delivered = match cmd {
            Command::Spawn {
                entity,
                config,
                reply,
            } => reply.send(host.spawn(entity, config)).is_ok(),
            Command::Despawn { entity, reply } => reply.send(host.despawn(entity)).is_ok(),
            Command::Advance { delta, reply } => reply.send(host.advance(delta)).is_ok(),
            Command::AddEffect {
                entity,
                class,
                reply,
            } => reply.send(host.add_effect(entity, &class)).is_ok(),
            Command::StopEffect {
                entity,
                class,
                reply,
            } => reply.send(host.stop_effect(entity, &class)).is_ok(),
            Command::StopEffectById {
                entity,
                effect,
                reply,
            } => reply.send(host.stop_effect_by_id(entity, effect)).is_ok(),
            Command::StopAllEffectsByClass {
                entity,
                class,
                reply,
            } => reply
                .send(host.stop_all_effects_by_class(entity, &class))
                .is_ok(),
            Command::EditAttribute {
                entity,
                attribute,
                kind,
                value,
                reply,
            } => reply
                .send(host.edit_attribute(entity, &attribute, kind, value))
                .is_ok(),
            Command::Snapshot { entity, reply } => reply.send(host.snapshot(entity)).is_ok(),
        };

        if !delivered {
            debug!("reply channel closed (caller dropped)");
        }
    }
}

/// Seconds elapsed at the next tick; never resolves without a ticker.
async fn next_tick(ticker: &mut Option<Interval>) -> f32 {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
            ticker.period().as_secs_f32()
        }
        None => std::future::pending().await,
    }
}
