//! Flat per-effect modifiers.
//!
//! Modifiers scale an effect's payload: the total is the product of every
//! modifier value, `1.0` when there are none.

use crate::class::ModifierId;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectModifier {
    pub id: ModifierId,
    pub value: f32,
}

impl EffectModifier {
    pub fn new(id: impl Into<ModifierId>, value: f32) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectModifiers {
    entries: Vec<EffectModifier>,
}

impl EffectModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> f32 {
        self.entries.iter().map(|m| m.value).product()
    }

    pub fn contains(&self, id: &ModifierId) -> bool {
        self.entries.iter().any(|m| &m.id == id)
    }

    pub fn get(&self, id: &ModifierId) -> Option<f32> {
        self.entries.iter().find(|m| &m.id == id).map(|m| m.value)
    }

    /// Inserts the modifier, or overwrites the value of an existing id.
    pub fn apply(&mut self, modifier: EffectModifier) {
        match self.entries.iter_mut().find(|m| m.id == modifier.id) {
            Some(existing) => existing.value = modifier.value,
            None => self.entries.push(modifier),
        }
    }

    pub fn remove(&mut self, id: &ModifierId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|m| &m.id != id);
        self.entries.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectModifier> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
