use crate::class::{AttributeClass, EffectClass};

/// Per-entity initial lists, applied in order when the entity becomes ready.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilityConfig {
    pub initial_attributes: Vec<AttributeClass>,
    pub initial_effects: Vec<EffectClass>,
}

impl AbilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, class: impl Into<AttributeClass>) -> Self {
        self.initial_attributes.push(class.into());
        self
    }

    #[must_use]
    pub fn with_effect(mut self, class: impl Into<EffectClass>) -> Self {
        self.initial_effects.push(class.into());
        self
    }
}
