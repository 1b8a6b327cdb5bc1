//! Attribute multipliers.
//!
//! Multipliers of the same kind compose multiplicatively. An attribute with no
//! multiplier of a kind behaves as if that kind's product were `1.0`.

use crate::class::MultiplierId;
use crate::error::{AbilityError, Result};

/// The attribute operation a multiplier scales.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MultiplierKind {
    /// Scales values passed to `set_current_value(_, true)`.
    Set,
    /// Scales deltas passed to `add_current_value`.
    Add,
    /// Scales deltas passed to `remove_current_value`.
    Remove,
    /// Scales the value returned by `current_value`.
    Get,
    /// Scales the effective maximum.
    MaxValue,
    /// Scales the effective minimum.
    MinValue,
}

impl MultiplierKind {
    /// Whether this kind scales one of the effective bounds.
    pub const fn moves_bounds(self) -> bool {
        matches!(self, Self::MaxValue | Self::MinValue)
    }
}

/// A named scalar applied to one attribute operation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeMultiplier {
    pub id: MultiplierId,
    pub value: f32,
    pub kind: MultiplierKind,
}

impl AttributeMultiplier {
    pub fn new(id: impl Into<MultiplierId>, value: f32, kind: MultiplierKind) -> Self {
        Self {
            id: id.into(),
            value,
            kind,
        }
    }
}

/// Insertion-ordered set of multipliers keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Multipliers {
    entries: Vec<AttributeMultiplier>,
}

impl Multipliers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Product of every multiplier of `kind`; `1.0` when there are none.
    pub fn product(&self, kind: MultiplierKind) -> f32 {
        self.of_kind(kind).map(|m| m.value).product()
    }

    pub fn of_kind(&self, kind: MultiplierKind) -> impl Iterator<Item = &AttributeMultiplier> {
        self.entries.iter().filter(move |m| m.kind == kind)
    }

    pub fn get(&self, id: &MultiplierId) -> Option<&AttributeMultiplier> {
        self.entries.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &MultiplierId) -> bool {
        self.get(id).is_some()
    }

    /// Inserts `multiplier` unless its id is already taken.
    pub fn insert(&mut self, multiplier: AttributeMultiplier) -> Result<()> {
        if self.contains(&multiplier.id) {
            return Err(AbilityError::DuplicateMultiplier(multiplier.id));
        }
        self.entries.push(multiplier);
        Ok(())
    }

    pub fn remove(&mut self, id: &MultiplierId) -> Result<AttributeMultiplier> {
        let index = self
            .entries
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| AbilityError::MultiplierNotFound(id.clone()))?;
        Ok(self.entries.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeMultiplier> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn empty_product_is_identity_for_every_kind() {
        let multipliers = Multipliers::new();
        for kind in MultiplierKind::iter() {
            assert_eq!(multipliers.product(kind), 1.0, "{kind}");
        }
    }

    #[test]
    fn same_kind_multipliers_compose() {
        let mut multipliers = Multipliers::new();
        multipliers
            .insert(AttributeMultiplier::new("a", 2.0, MultiplierKind::Add))
            .unwrap();
        multipliers
            .insert(AttributeMultiplier::new("b", 3.0, MultiplierKind::Add))
            .unwrap();
        multipliers
            .insert(AttributeMultiplier::new("c", 10.0, MultiplierKind::Get))
            .unwrap();

        assert_eq!(multipliers.product(MultiplierKind::Add), 6.0);
        assert_eq!(multipliers.product(MultiplierKind::Get), 10.0);
        assert_eq!(multipliers.product(MultiplierKind::Remove), 1.0);
    }

    #[test]
    fn duplicate_id_is_rejected_without_mutation() {
        let mut multipliers = Multipliers::new();
        multipliers
            .insert(AttributeMultiplier::new("armor", 0.5, MultiplierKind::Remove))
            .unwrap();

        let err = multipliers
            .insert(AttributeMultiplier::new("armor", 4.0, MultiplierKind::Add))
            .unwrap_err();
        assert_eq!(err, AbilityError::DuplicateMultiplier("armor".into()));
        assert_eq!(multipliers.len(), 1);
        assert_eq!(multipliers.product(MultiplierKind::Add), 1.0);
    }

    #[test]
    fn removing_missing_id_fails() {
        let mut multipliers = Multipliers::new();
        assert!(multipliers.remove(&"ghost".into()).is_err());
    }
}
