//! Data-driven ability content and loaders.
//!
//! This crate turns designer data into the pieces `ability-core` consumes:
//! - Attribute definitions (RON)
//! - Effect definitions mapped onto the built-in behaviors (RON)
//! - Per-entity initial lists (TOML)
//!
//! [`ContentFactory`] assembles all of them into an [`ability_core::AbilityRegistry`]
//! plus an [`ability_core::AbilityConfig`].

pub mod definitions;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use definitions::{BehaviorDefinition, EffectDefinition, GrantDefinition, TickTarget};

#[cfg(feature = "loaders")]
pub use loaders::{
    AttributeLoader, ConfigLoader, ContentBundle, ContentFactory, EffectLoader, LoadResult,
};
