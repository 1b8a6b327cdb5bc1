//! Entity host: one ability system per live entity.
//!
//! The host is the synchronous core of the runtime. It reacts to the two
//! lifecycle signals ([`EntityHost::spawn`] for "entity ready",
//! [`EntityHost::despawn`] for "entity ending"), advances every entity's
//! timer clock, and wires each ability system to the shared [`EventBus`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ability_core::{
    AbilityConfig, AbilityRegistry, AbilitySystem, AttributeClass, AttributeData, EffectClass,
    EffectData, EffectId, ModifyKind, TimerManager,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{Result, RuntimeError};
use crate::events::{BusForwarder, Event, EventBus, LifecycleEvent};

/// Identifier of a hosted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Everything a HUD shows for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub entity: EntityId,
    pub attributes: Vec<AttributeData>,
    pub effects: Vec<EffectData>,
}

impl HudSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Live entities sharing one registry and one bus.
pub struct EntityHost {
    registry: Arc<AbilityRegistry>,
    entities: BTreeMap<EntityId, AbilitySystem>,
    bus: EventBus,
}

impl EntityHost {
    pub fn new(registry: Arc<AbilityRegistry>, bus: EventBus) -> Self {
        Self {
            registry,
            entities: BTreeMap::new(),
            bus,
        }
    }

    pub fn registry(&self) -> &Arc<AbilityRegistry> {
        &self.registry
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// "Entity ready": builds the entity's ability system and applies its
    /// initial lists.
    ///
    /// [`LifecycleEvent::Ready`] is published before the initial attributes
    /// and effects so listeners can set up per-entity state first.
    pub fn spawn(&mut self, entity: EntityId, config: AbilityConfig) -> Result<()> {
        if self.entities.contains_key(&entity) {
            return Err(RuntimeError::DuplicateEntity(entity));
        }

        let mut system = AbilitySystem::new(Arc::clone(&self.registry), config, TimerManager::new());
        system.subscribe(BusForwarder::new(entity, self.bus.clone()));

        self.bus.publish(Event::Lifecycle(LifecycleEvent::Ready(entity)));
        system.begin_play();
        debug!(
            %entity,
            attributes = system.attributes().len(),
            effects = system.effects().len(),
            "entity ready"
        );

        self.entities.insert(entity, system);
        Ok(())
    }

    /// "Entity ending": tears the ability system down and drops it.
    pub fn despawn(&mut self, entity: EntityId) -> Result<()> {
        let system = self
            .entities
            .remove(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))?;
        self.teardown(entity, system);
        Ok(())
    }

    /// Despawns every entity; returns how many were live.
    pub fn despawn_all(&mut self) -> usize {
        let entities = std::mem::take(&mut self.entities);
        let count = entities.len();
        for (entity, system) in entities {
            self.teardown(entity, system);
        }
        count
    }

    fn teardown(&self, entity: EntityId, mut system: AbilitySystem) {
        self.bus.publish(Event::Lifecycle(LifecycleEvent::Ending(entity)));
        system.end_play();
        debug!(%entity, "entity ended");
    }

    /// Advances every entity's clock by `delta` seconds; returns the number
    /// of timer firings dispatched.
    pub fn advance(&mut self, delta: f32) -> usize {
        self.entities
            .values_mut()
            .map(|system| system.advance(delta))
            .sum()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn system(&self, entity: EntityId) -> Result<&AbilitySystem> {
        self.entities
            .get(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))
    }

    pub fn system_mut(&mut self, entity: EntityId) -> Result<&mut AbilitySystem> {
        self.entities
            .get_mut(&entity)
            .ok_or(RuntimeError::UnknownEntity(entity))
    }

    pub fn add_effect(&mut self, entity: EntityId, class: &EffectClass) -> Result<EffectId> {
        Ok(self.system_mut(entity)?.add_effect(class)?)
    }

    pub fn stop_effect(&mut self, entity: EntityId, class: &EffectClass) -> Result<EffectId> {
        Ok(self.system_mut(entity)?.stop_effect(class)?)
    }

    pub fn stop_effect_by_id(&mut self, entity: EntityId, effect: EffectId) -> Result<()> {
        Ok(self.system_mut(entity)?.stop_effect_by_id(effect)?)
    }

    pub fn stop_all_effects_by_class(
        &mut self,
        entity: EntityId,
        class: &EffectClass,
    ) -> Result<usize> {
        Ok(self.system_mut(entity)?.stop_all_effects_by_class(class))
    }

    /// Edits an attribute; returns the value as read afterwards.
    pub fn edit_attribute(
        &mut self,
        entity: EntityId,
        attribute: &AttributeClass,
        kind: ModifyKind,
        value: f32,
    ) -> Result<f32> {
        Ok(self.system_mut(entity)?.edit_attribute(attribute, kind, value)?)
    }

    pub fn snapshot(&self, entity: EntityId) -> Result<HudSnapshot> {
        let system = self.system(entity)?;
        Ok(HudSnapshot {
            entity,
            attributes: system.attribute_data(),
            effects: system.effect_data(),
        })
    }
}

impl fmt::Debug for EntityHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityHost")
            .field("entities", &self.entities.keys().collect::<Vec<_>>())
            .field("bus", &self.bus)
            .finish()
    }
}
