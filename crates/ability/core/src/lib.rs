//! Gameplay attribute and effect engine.
//!
//! `ability-core` owns the rules for one entity's numeric stats
//! ([`attribute::Attribute`]) and the time-bound effects that act on them
//! ([`effect::Effect`]). All state mutation flows through
//! [`system::AbilitySystem`], which is driven by two lifecycle signals
//! (`begin_play` / `end_play`) and by timer firings reported from the host.
//!
//! The crate is pure logic: no I/O, no clocks and no threads. Hosts supply a
//! [`timer::TimerService`] (or use the bundled [`timer::TimerManager`]) and
//! subscribe an [`event::AbilityObserver`] to receive notifications.
pub mod attribute;
pub mod class;
pub mod config;
pub mod effect;
pub mod error;
pub mod event;
pub mod registry;
pub mod system;
pub mod timer;

pub use attribute::{
    Attribute, AttributeMultiplier, AttributeMut, AttributeSet, AttributeSignal, AttributeSpec,
    ModifyKind, MultiplierKind, Multipliers,
};
pub use class::{AttributeClass, ClassHierarchy, EffectClass, ModifierId, MultiplierId};
pub use config::AbilityConfig;
pub use effect::{
    AsAny, AttributeTick, Color, Effect, EffectBehavior, EffectContext, EffectId, EffectInfo,
    EffectModifier, EffectModifiers, EffectSpec, EffectState, Immunity, InstantEffect, Passive,
    PeriodicEffect, PeriodicHandler, ProgressChange, ProgressEffect, ProgressHandler,
};
pub use error::{AbilityError, RegistryError, Result};
pub use event::{AbilityEvent, AbilityObserver, EventLog, Notifier, ObserverId};
pub use registry::{AbilityRegistry, BehaviorFactory};
pub use system::{AbilitySystem, AttributeData, EffectData};
pub use timer::{TimerHandle, TimerManager, TimerService};
