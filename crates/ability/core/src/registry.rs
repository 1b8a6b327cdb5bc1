//! Catalog of attribute and effect classes an orchestrator can instantiate.
//!
//! The registry is built once (by hand or by `ability-content`) and then
//! shared read-only between every entity through an `Arc`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::attribute::AttributeSpec;
use crate::class::{AttributeClass, ClassHierarchy, EffectClass};
use crate::effect::{EffectBehavior, EffectSpec};
use crate::error::RegistryError;

/// Produces a fresh behavior for each new effect instance.
pub type BehaviorFactory = Arc<dyn Fn() -> Box<dyn EffectBehavior> + Send + Sync>;

#[derive(Clone)]
struct EffectEntry {
    spec: EffectSpec,
    factory: BehaviorFactory,
}

#[derive(Clone, Default)]
pub struct AbilityRegistry {
    attributes: BTreeMap<AttributeClass, AttributeSpec>,
    effects: BTreeMap<EffectClass, EffectEntry>,
    attribute_hierarchy: ClassHierarchy<AttributeClass>,
    effect_hierarchy: ClassHierarchy<EffectClass>,
}

impl fmt::Debug for AbilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityRegistry")
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .field("effects", &self.effects.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an attribute class; its declared parent joins the hierarchy.
    pub fn register_attribute(&mut self, spec: AttributeSpec) -> Result<(), RegistryError> {
        if self.attributes.contains_key(&spec.class) {
            return Err(RegistryError::DuplicateAttribute(spec.class));
        }
        if let Some(parent) = &spec.parent {
            self.attribute_hierarchy
                .declare(spec.class.clone(), parent.clone());
        }
        self.attributes.insert(spec.class.clone(), spec);
        Ok(())
    }

    /// Registers an effect class with a typed behavior constructor.
    pub fn register_effect<B, F>(&mut self, spec: EffectSpec, factory: F) -> Result<(), RegistryError>
    where
        B: EffectBehavior,
        F: Fn() -> B + Send + Sync + 'static,
    {
        self.register_effect_boxed(spec, Arc::new(move || Box::new(factory()) as Box<dyn EffectBehavior>))
    }

    pub fn register_effect_boxed(
        &mut self,
        spec: EffectSpec,
        factory: BehaviorFactory,
    ) -> Result<(), RegistryError> {
        if self.effects.contains_key(&spec.class) {
            return Err(RegistryError::DuplicateEffect(spec.class));
        }
        if let Some(parent) = &spec.parent {
            self.effect_hierarchy
                .declare(spec.class.clone(), parent.clone());
        }
        self.effects
            .insert(spec.class.clone(), EffectEntry { spec, factory });
        Ok(())
    }

    /// Declares `child` is-a `parent` for attribute lookups.
    ///
    /// Parents need not be registered themselves; an abstract parent only
    /// groups its children for queries.
    pub fn declare_attribute_parent(
        &mut self,
        child: impl Into<AttributeClass>,
        parent: impl Into<AttributeClass>,
    ) {
        self.attribute_hierarchy
            .declare(child.into(), parent.into());
    }

    pub fn declare_effect_parent(
        &mut self,
        child: impl Into<EffectClass>,
        parent: impl Into<EffectClass>,
    ) {
        self.effect_hierarchy.declare(child.into(), parent.into());
    }

    pub fn attribute_spec(&self, class: &AttributeClass) -> Option<&AttributeSpec> {
        self.attributes.get(class)
    }

    pub fn effect_spec(&self, class: &EffectClass) -> Option<&EffectSpec> {
        self.effects.get(class).map(|entry| &entry.spec)
    }

    /// Spec plus a freshly constructed behavior for `class`.
    pub fn instantiate(&self, class: &EffectClass) -> Option<(&EffectSpec, Box<dyn EffectBehavior>)> {
        self.effects
            .get(class)
            .map(|entry| (&entry.spec, (entry.factory)()))
    }

    pub fn attribute_classes(&self) -> impl Iterator<Item = &AttributeClass> {
        self.attributes.keys()
    }

    pub fn effect_classes(&self) -> impl Iterator<Item = &EffectClass> {
        self.effects.keys()
    }

    pub fn attribute_hierarchy(&self) -> &ClassHierarchy<AttributeClass> {
        &self.attribute_hierarchy
    }

    pub fn effect_hierarchy(&self) -> &ClassHierarchy<EffectClass> {
        &self.effect_hierarchy
    }

    pub fn attribute_is_a(&self, class: &AttributeClass, ancestor: &AttributeClass) -> bool {
        self.attribute_hierarchy.is_a(class, ancestor)
    }

    pub fn effect_is_a(&self, class: &EffectClass, ancestor: &EffectClass) -> bool {
        self.effect_hierarchy.is_a(class, ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Passive, PeriodicEffect};

    #[test]
    fn duplicate_registrations_are_rejected() {
        let mut registry = AbilityRegistry::new();
        registry
            .register_attribute(AttributeSpec::new("health"))
            .unwrap();
        registry
            .register_effect(EffectSpec::new("stun"), Passive::new)
            .unwrap();

        assert_eq!(
            registry.register_attribute(AttributeSpec::new("health")),
            Err(RegistryError::DuplicateAttribute("health".into()))
        );
        assert_eq!(
            registry.register_effect(EffectSpec::new("stun"), Passive::new),
            Err(RegistryError::DuplicateEffect("stun".into()))
        );
    }

    #[test]
    fn spec_parents_feed_the_hierarchy() {
        let mut registry = AbilityRegistry::new();
        registry
            .register_effect(EffectSpec::new("poison").with_parent("debuff"), Passive::new)
            .unwrap();
        registry.declare_effect_parent("debuff", "status");

        assert!(registry.effect_is_a(&"poison".into(), &"status".into()));
        assert!(!registry.effect_is_a(&"status".into(), &"poison".into()));
    }

    #[test]
    fn every_instantiation_is_a_fresh_behavior() {
        let mut registry = AbilityRegistry::new();
        registry
            .register_effect(EffectSpec::new("tick"), PeriodicEffect::<()>::default)
            .unwrap();

        let (spec, first) = registry.instantiate(&"tick".into()).unwrap();
        assert_eq!(spec.class, EffectClass::from("tick"));
        let (_, second) = registry.instantiate(&"tick".into()).unwrap();
        assert!(!std::ptr::addr_eq(first.as_ref(), second.as_ref()));
        assert!(registry.instantiate(&"missing".into()).is_none());
    }
}
