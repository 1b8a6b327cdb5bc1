//! Effect definitions: a spec plus the built-in behavior it runs.

use std::sync::Arc;

use ability_core::{
    AttributeClass, AttributeMultiplier, AttributeTick, BehaviorFactory, EffectBehavior,
    EffectClass, EffectSpec, Immunity, InstantEffect, ModifyKind, Passive, PeriodicEffect,
    ProgressEffect,
};

/// Attribute a periodic effect edits on every tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickTarget {
    pub attribute: AttributeClass,
    pub kind: ModifyKind,
}

/// Multiplier a passive effect holds on an attribute while it works.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrantDefinition {
    pub attribute: AttributeClass,
    pub multiplier: AttributeMultiplier,
}

/// Built-in behavior selection with its parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorDefinition {
    Passive {
        #[cfg_attr(feature = "serde", serde(default))]
        grant: Option<GrantDefinition>,
    },
    Instant {
        attribute: AttributeClass,
        kind: ModifyKind,
        value: f32,
    },
    Periodic {
        rate: f32,
        value: f32,
        #[cfg_attr(feature = "serde", serde(default))]
        target: Option<TickTarget>,
    },
    Progress {
        need: f32,
        rate: f32,
        amount: f32,
    },
    Immunity {
        against: Vec<EffectClass>,
    },
}

impl BehaviorDefinition {
    /// Constructor producing a fresh behavior per effect instance.
    pub fn factory(&self) -> BehaviorFactory {
        match self.clone() {
            Self::Passive { grant: None } => boxed(Passive::new),
            Self::Passive { grant: Some(grant) } => boxed(move || {
                Passive::granting(grant.attribute.clone(), grant.multiplier.clone())
            }),
            Self::Instant {
                attribute,
                kind,
                value,
            } => boxed(move || InstantEffect::new(attribute.clone(), kind, value)),
            Self::Periodic {
                rate,
                value,
                target: Some(target),
            } => boxed(move || {
                PeriodicEffect::new(
                    rate,
                    value,
                    AttributeTick::new(target.attribute.clone(), target.kind),
                )
            }),
            Self::Periodic {
                rate,
                value,
                target: None,
            } => boxed(move || PeriodicEffect::new(rate, value, ())),
            Self::Progress { need, rate, amount } => boxed(move || {
                ProgressEffect::default().need(need).rate(rate).amount(amount)
            }),
            Self::Immunity { against } => boxed(move || Immunity::new(against.clone())),
        }
    }
}

fn boxed<B, F>(make: F) -> BehaviorFactory
where
    B: EffectBehavior,
    F: Fn() -> B + Send + Sync + 'static,
{
    Arc::new(move || -> Box<dyn EffectBehavior> { Box::new(make()) })
}

/// One registrable effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub spec: EffectSpec,
    pub behavior: BehaviorDefinition,
}
