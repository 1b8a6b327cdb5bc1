//! Topic-based event bus implementation.

use std::sync::Arc;

use ability_core::AbilityEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::host::EntityId;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Attribute value, bound and multiplier changes
    Attribute,
    /// Effect started / ended
    Effect,
    /// Progress effect field changes
    Progress,
    /// Entity ready / ending
    Lifecycle,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Attribute,
        Topic::Effect,
        Topic::Progress,
        Topic::Lifecycle,
    ];
}

/// One entity's ability notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEvent {
    pub entity: EntityId,
    pub event: AbilityEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// Published before the initial lists are applied.
    Ready(EntityId),
    /// Teardown began; nothing else is published for the entity.
    Ending(EntityId),
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Ability(EntityEvent),
    Lifecycle(LifecycleEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Ability(EntityEvent { event, .. }) => match event {
                AbilityEvent::Attribute { .. } => Topic::Attribute,
                AbilityEvent::Progress { .. } => Topic::Progress,
                AbilityEvent::EffectStarted(_)
                | AbilityEvent::EffectEnded(_)
                | AbilityEvent::ClientEffectEnded(_) => Topic::Effect,
            },
            Event::Lifecycle(_) => Topic::Lifecycle,
        }
    }

    pub fn entity(&self) -> EntityId {
        match self {
            Event::Ability(EntityEvent { entity, .. }) => *entity,
            Event::Lifecycle(LifecycleEvent::Ready(entity) | LifecycleEvent::Ending(entity)) => {
                *entity
            }
        }
    }
}

struct Channels {
    all: broadcast::Sender<Event>,
    attribute: broadcast::Sender<Event>,
    effect: broadcast::Sender<Event>,
    progress: broadcast::Sender<Event>,
    lifecycle: broadcast::Sender<Event>,
}

impl Channels {
    fn get(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Attribute => &self.attribute,
            Topic::Effect => &self.effect,
            Topic::Progress => &self.progress,
            Topic::Lifecycle => &self.lifecycle,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels exist for every topic from construction
/// on, so publishing and subscribing never fail.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Channels {
                all: broadcast::channel(capacity).0,
                attribute: broadcast::channel(capacity).0,
                effect: broadcast::channel(capacity).0,
                progress: broadcast::channel(capacity).0,
                lifecycle: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        // an unwatched firehose is normal too
        let _ = self.channels.all.send(event.clone());
        if self.channels.get(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.get(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Subscribe to every topic as one stream, in publish order.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Event> {
        self.channels.all.subscribe()
    }

    pub fn receiver_count(&self, topic: Topic) -> usize {
        self.channels.get(topic).receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("EventBus");
        for topic in Topic::ALL {
            debug.field(&format!("{topic:?}"), &self.receiver_count(topic));
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use ability_core::{AttributeSignal, EffectClass, EffectId, EffectInfo};

    use super::*;

    fn effect_started(entity: u32) -> Event {
        Event::Ability(EntityEvent {
            entity: EntityId(entity),
            event: AbilityEvent::EffectStarted(EffectInfo::new(
                EffectId::new(1),
                EffectClass::from("poison"),
            )),
        })
    }

    #[test]
    fn test_events_route_to_their_topic() {
        let attribute = Event::Ability(EntityEvent {
            entity: EntityId(3),
            event: AbilityEvent::Attribute {
                attribute: "health".into(),
                signal: AttributeSignal::ReachedMin,
            },
        });
        assert_eq!(attribute.topic(), Topic::Attribute);
        assert_eq!(effect_started(3).topic(), Topic::Effect);
        assert_eq!(
            Event::Lifecycle(LifecycleEvent::Ending(EntityId(3))).topic(),
            Topic::Lifecycle
        );
        assert_eq!(attribute.entity(), EntityId(3));
    }

    #[test]
    fn test_subscribers_only_see_their_topic() {
        let bus = EventBus::new();
        let mut effects = bus.subscribe(Topic::Effect);
        let mut lifecycle = bus.subscribe(Topic::Lifecycle);

        bus.publish(effect_started(1));

        assert_eq!(effects.try_recv().expect("effect event"), effect_started(1));
        assert!(lifecycle.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::with_capacity(4);
        bus.publish(effect_started(1));
        assert_eq!(bus.receiver_count(Topic::Effect), 0);
    }

    #[test]
    fn test_firehose_keeps_publish_order_across_topics() {
        let bus = EventBus::new();
        let mut all = bus.subscribe_all();
        let ready = Event::Lifecycle(LifecycleEvent::Ready(EntityId(1)));

        bus.publish(ready.clone());
        bus.publish(effect_started(1));

        assert_eq!(all.try_recv().expect("first"), ready);
        assert_eq!(all.try_recv().expect("second"), effect_started(1));
    }
}
