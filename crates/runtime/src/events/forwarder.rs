//! Observer that republishes one entity's notifications on the bus.

use ability_core::{AbilityEvent, AbilityObserver};

use super::bus::{EntityEvent, Event, EventBus};
use crate::host::EntityId;

/// Tags every event with its entity and publishes it.
#[derive(Debug, Clone)]
pub struct BusForwarder {
    entity: EntityId,
    bus: EventBus,
}

impl BusForwarder {
    pub fn new(entity: EntityId, bus: EventBus) -> Self {
        Self { entity, bus }
    }
}

impl AbilityObserver for BusForwarder {
    fn on_event(&mut self, event: &AbilityEvent) {
        self.bus.publish(Event::Ability(EntityEvent {
            entity: self.entity,
            event: event.clone(),
        }));
    }
}
