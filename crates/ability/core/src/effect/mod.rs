//! Effects: stateful, time-bound behaviors attached to an entity.
//!
//! # Lifecycle
//!
//! ```text
//! Created ──begin work──▶ Working ──end work──▶ EndRequested ──removal──▶ Removed
//! ```
//!
//! - **Begin work** runs the behavior's `work` hook. The default hook ends
//!   the effect straight away, so a behavior that does nothing else is an
//!   instant effect.
//! - **End work** is the single funnel for cancellation and natural
//!   completion: the behavior's `end_work` hook runs, then a removal request
//!   for this instance is queued.
//! - **Removal** is performed by the orchestrator once the current pass over
//!   the effect collection has finished.
//!
//! The per-type logic lives in an [`EffectBehavior`]; [`Effect`] wraps it with
//! the state shared by every effect (identity, state, stacking flag, display
//! data, modifiers, timer ownership).

mod behavior;
mod context;
mod modifier;
mod periodic;
mod progress;

pub use behavior::{AsAny, EffectBehavior, Immunity, InstantEffect, Passive};
pub use context::EffectContext;
pub(crate) use context::Command;
pub use modifier::{EffectModifier, EffectModifiers};
pub use periodic::{AttributeTick, PeriodicEffect, PeriodicHandler};
pub use progress::{ProgressChange, ProgressEffect, ProgressHandler};

use std::collections::VecDeque;
use std::fmt;

use crate::attribute::AttributeSet;
use crate::class::{EffectClass, ModifierId};
use crate::event::Notifier;
use crate::registry::AbilityRegistry;
use crate::timer::{TimerHandle, TimerService};

/// Identity of one live effect instance, unique per orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(u64);

impl EffectId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// Instance id plus type tag; what hooks and listeners learn about an effect.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectInfo {
    pub id: EffectId,
    pub class: EffectClass,
}

impl EffectInfo {
    pub fn new(id: EffectId, class: EffectClass) -> Self {
        Self { id, class }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectState {
    /// Constructed, not yet bound to the orchestrator.
    Created,
    Working,
    /// `end_work` ran; removal is queued.
    EndRequested,
    /// Terminal.
    Removed,
}

/// Linear RGBA display color.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Static definition an effect instance is created from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    pub class: EffectClass,
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<EffectClass>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub display_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stackable: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub displayable: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub icon: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: Color,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<EffectModifier>,
}

impl EffectSpec {
    pub fn new(class: impl Into<EffectClass>) -> Self {
        Self {
            class: class.into(),
            parent: None,
            display_name: None,
            stackable: false,
            displayable: false,
            icon: None,
            color: Color::default(),
            modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<EffectClass>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Marks the effect displayable with the given icon and color.
    #[must_use]
    pub fn displayed(mut self, icon: impl Into<String>, color: Color) -> Self {
        self.displayable = true;
        self.icon = Some(icon.into());
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: EffectModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// One effect instance owned by the orchestrator.
pub struct Effect {
    info: EffectInfo,
    display_name: String,
    state: EffectState,
    stackable: bool,
    displayable: bool,
    icon: Option<String>,
    color: Color,
    modifiers: EffectModifiers,
    timers: Vec<TimerHandle>,
    behavior: Box<dyn EffectBehavior>,
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.info.id)
            .field("class", &self.info.class)
            .field("state", &self.state)
            .field("stackable", &self.stackable)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

impl Effect {
    pub(crate) fn new(id: EffectId, spec: &EffectSpec, behavior: Box<dyn EffectBehavior>) -> Self {
        let mut modifiers = EffectModifiers::new();
        for modifier in &spec.modifiers {
            modifiers.apply(modifier.clone());
        }
        Self {
            info: EffectInfo::new(id, spec.class.clone()),
            display_name: spec
                .display_name
                .clone()
                .unwrap_or_else(|| spec.class.to_string()),
            state: EffectState::Created,
            stackable: spec.stackable,
            displayable: spec.displayable,
            icon: spec.icon.clone(),
            color: spec.color,
            modifiers,
            timers: Vec::new(),
            behavior,
        }
    }

    pub fn id(&self) -> EffectId {
        self.info.id
    }

    pub fn class(&self) -> &EffectClass {
        &self.info.class
    }

    pub fn info(&self) -> &EffectInfo {
        &self.info
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    /// Created or Working: still counts as present for the collection.
    pub fn is_live(&self) -> bool {
        matches!(self.state, EffectState::Created | EffectState::Working)
    }

    pub fn is_stackable(&self) -> bool {
        self.stackable
    }

    pub fn is_displayable(&self) -> bool {
        self.displayable
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn modifiers(&self) -> &EffectModifiers {
        &self.modifiers
    }

    pub fn total_modifier(&self) -> f32 {
        self.modifiers.total()
    }

    pub fn has_modifier(&self, id: &ModifierId) -> bool {
        self.modifiers.contains(id)
    }

    pub fn timers(&self) -> &[TimerHandle] {
        &self.timers
    }

    pub fn owns_timer(&self, handle: TimerHandle) -> bool {
        self.timers.contains(&handle)
    }

    /// Downcasts the behavior to its concrete type.
    pub fn behavior<B: EffectBehavior>(&self) -> Option<&B> {
        AsAny::as_any(self.behavior.as_ref()).downcast_ref::<B>()
    }

    pub(crate) fn modifiers_mut(&mut self) -> &mut EffectModifiers {
        &mut self.modifiers
    }

    pub(crate) fn set_state(&mut self, state: EffectState) {
        self.state = state;
    }

    /// Stops every timer the effect still owns.
    pub(crate) fn release_timers(&mut self, timers: &mut dyn TimerService) {
        for handle in self.timers.drain(..) {
            timers.stop(handle);
        }
    }

    /// Splits the effect into its behavior and a context bound to this instance.
    pub(crate) fn split<'a>(
        &'a mut self,
        timers: &'a mut dyn TimerService,
        attributes: &'a mut AttributeSet,
        registry: &'a AbilityRegistry,
        notifier: &'a mut Notifier,
        commands: &'a mut VecDeque<Command>,
    ) -> (&'a mut dyn EffectBehavior, EffectContext<'a>) {
        let ctx = EffectContext {
            info: &self.info,
            modifiers: &self.modifiers,
            owned_timers: &mut self.timers,
            timers,
            attributes,
            registry,
            notifier,
            commands,
        };
        (self.behavior.as_mut(), ctx)
    }
}
