//! Cloneable façade for issuing commands to the runtime.
//!
//! [`HostHandle`] hides channel plumbing and offers async helpers for
//! spawning entities, applying effects or streaming events from specific
//! topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use ability_core::{AbilityConfig, AttributeClass, EffectClass, EffectId, ModifyKind};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::host::{EntityId, HudSnapshot};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct HostHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl HostHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<R>(&self, build: impl FnOnce(oneshot::Sender<R>) -> Command) -> Result<R> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Signal "entity ready" with the entity's initial lists.
    pub async fn spawn(&self, entity: EntityId, config: AbilityConfig) -> Result<()> {
        self.request(|reply| Command::Spawn {
            entity,
            config,
            reply,
        })
        .await?
    }

    /// Signal "entity ending".
    pub async fn despawn(&self, entity: EntityId) -> Result<()> {
        self.request(|reply| Command::Despawn { entity, reply })
            .await?
    }

    /// Advance every entity's clock by `delta` seconds.
    ///
    /// Returns the number of timer firings dispatched.
    pub async fn advance(&self, delta: f32) -> Result<usize> {
        self.request(|reply| Command::Advance { delta, reply })
            .await
    }

    pub async fn add_effect(&self, entity: EntityId, class: impl Into<EffectClass>) -> Result<EffectId> {
        let class = class.into();
        self.request(|reply| Command::AddEffect {
            entity,
            class,
            reply,
        })
        .await?
    }

    pub async fn stop_effect(&self, entity: EntityId, class: impl Into<EffectClass>) -> Result<EffectId> {
        let class = class.into();
        self.request(|reply| Command::StopEffect {
            entity,
            class,
            reply,
        })
        .await?
    }

    pub async fn stop_effect_by_id(&self, entity: EntityId, effect: EffectId) -> Result<()> {
        self.request(|reply| Command::StopEffectById {
            entity,
            effect,
            reply,
        })
        .await?
    }

    pub async fn stop_all_effects_by_class(
        &self,
        entity: EntityId,
        class: impl Into<EffectClass>,
    ) -> Result<usize> {
        let class = class.into();
        self.request(|reply| Command::StopAllEffectsByClass {
            entity,
            class,
            reply,
        })
        .await?
    }

    pub async fn edit_attribute(
        &self,
        entity: EntityId,
        attribute: impl Into<AttributeClass>,
        kind: ModifyKind,
        value: f32,
    ) -> Result<f32> {
        let attribute = attribute.into();
        self.request(|reply| Command::EditAttribute {
            entity,
            attribute,
            kind,
            value,
            reply,
        })
        .await?
    }

    /// Query the entity's HUD data (read-only snapshot)
    pub async fn snapshot(&self, entity: EntityId) -> Result<HudSnapshot> {
        self.request(|reply| Command::Snapshot { entity, reply })
            .await?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Attribute` - Attribute value, bound and multiplier changes
    /// - `Topic::Effect` - Effect started / ended
    /// - `Topic::Progress` - Progress effect field changes
    /// - `Topic::Lifecycle` - Entity ready / ending
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ability_runtime::Topic;
    ///
    /// let mut effects = handle.subscribe(Topic::Effect);
    /// while let Ok(event) = effects.recv().await {
    ///     // Update the status bar
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to every topic as one ordered stream
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe_all()
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
