//! The orchestrator's attribute collection.

use std::ops::{Deref, DerefMut};

use super::Attribute;
use crate::class::{AttributeClass, ClassHierarchy};
use crate::event::{AbilityEvent, Notifier};

/// Live attributes of one entity, at most one per class.
#[derive(Debug, Default)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// First attribute that is-a `class`.
    pub fn position(
        &self,
        class: &AttributeClass,
        hierarchy: &ClassHierarchy<AttributeClass>,
    ) -> Option<usize> {
        self.attributes
            .iter()
            .position(|attribute| hierarchy.is_a(attribute.class(), class))
    }

    pub fn get(
        &self,
        class: &AttributeClass,
        hierarchy: &ClassHierarchy<AttributeClass>,
    ) -> Option<&Attribute> {
        self.position(class, hierarchy)
            .map(|index| &self.attributes[index])
    }

    /// Mutable access whose signals are flushed to `notifier` when the guard drops.
    pub fn get_mut<'a>(
        &'a mut self,
        class: &AttributeClass,
        hierarchy: &ClassHierarchy<AttributeClass>,
        notifier: &'a mut Notifier,
    ) -> Option<AttributeMut<'a>> {
        let index = self.position(class, hierarchy)?;
        Some(AttributeMut {
            attribute: &mut self.attributes[index],
            notifier,
        })
    }

    pub(crate) fn push(&mut self, attribute: Attribute) -> &Attribute {
        let index = self.attributes.len();
        self.attributes.push(attribute);
        &self.attributes[index]
    }

    pub(crate) fn remove(&mut self, index: usize) -> Attribute {
        self.attributes.remove(index)
    }

    pub(crate) fn clear(&mut self) -> usize {
        let count = self.attributes.len();
        self.attributes.clear();
        count
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Write guard over one live attribute.
///
/// Dereferences to [`Attribute`]. Signals queued through the guard are
/// re-broadcast as [`AbilityEvent::Attribute`] when it drops.
pub struct AttributeMut<'a> {
    attribute: &'a mut Attribute,
    notifier: &'a mut Notifier,
}

impl Deref for AttributeMut<'_> {
    type Target = Attribute;

    fn deref(&self) -> &Attribute {
        self.attribute
    }
}

impl DerefMut for AttributeMut<'_> {
    fn deref_mut(&mut self) -> &mut Attribute {
        self.attribute
    }
}

impl Drop for AttributeMut<'_> {
    fn drop(&mut self) {
        for signal in self.attribute.take_signals() {
            self.notifier.emit(AbilityEvent::Attribute {
                attribute: self.attribute.class().clone(),
                signal,
            });
        }
    }
}
