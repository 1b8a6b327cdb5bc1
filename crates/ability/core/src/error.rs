//! Error types for the ability system.
//!
//! Every failure here is local and recoverable: a rejected call leaves the
//! attribute, effect or orchestrator exactly as it was. Nothing in this crate
//! panics on caller input.

use thiserror::Error;

use crate::class::{AttributeClass, EffectClass, MultiplierId};
use crate::effect::EffectId;

pub type Result<T> = std::result::Result<T, AbilityError>;

/// Failures surfaced by attributes, effects and the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AbilityError {
    #[error("attribute {0} already exists on this entity")]
    DuplicateAttribute(AttributeClass),

    #[error("attribute class {0} is not registered")]
    UnknownAttribute(AttributeClass),

    #[error("no live attribute of class {0}")]
    AttributeNotFound(AttributeClass),

    #[error("effect class {0} is not registered")]
    UnknownEffect(EffectClass),

    #[error("no live effect of class {0}")]
    EffectNotFound(EffectClass),

    #[error("effect {0} is not live")]
    EffectGone(EffectId),

    #[error("effect {0} does not run the requested behavior")]
    BehaviorMismatch(EffectId),

    #[error("multiplier {0} already exists")]
    DuplicateMultiplier(MultiplierId),

    #[error("multiplier {0} not found")]
    MultiplierNotFound(MultiplierId),
}

impl AbilityError {
    /// Returns true for "nothing matched" failures, as opposed to rejected additions.
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AttributeNotFound(_)
                | Self::EffectNotFound(_)
                | Self::EffectGone(_)
                | Self::MultiplierNotFound(_)
        )
    }
}

/// Failures while building an [`AbilityRegistry`](crate::registry::AbilityRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("attribute class {0} registered twice")]
    DuplicateAttribute(AttributeClass),

    #[error("effect class {0} registered twice")]
    DuplicateEffect(EffectClass),
}
