//! What an effect hook may touch while it runs.
//!
//! Hooks never hold a reference to the orchestrator. Instead each hook call
//! receives an [`EffectContext`] that borrows exactly the pieces an effect is
//! allowed to reach: the entity's attributes, the timer service, the event
//! notifier and a command queue. Requests that would mutate the effect
//! collection itself (ending, stopping or adding effects) are queued and
//! applied by the orchestrator after the hook returns.

use std::collections::VecDeque;

use super::{EffectId, EffectInfo, EffectModifiers, ProgressChange};
use crate::attribute::{Attribute, AttributeMut, AttributeSet, ModifyKind};
use crate::class::{AttributeClass, EffectClass};
use crate::event::{AbilityEvent, Notifier};
use crate::registry::AbilityRegistry;
use crate::timer::{TimerHandle, TimerService};

/// Deferred request against the effect collection.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    /// Run `end_work` on the instance.
    EndWork(EffectId),
    /// Remove the instance once its `end_work` has run.
    Remove(EffectId),
    Add(EffectClass),
    /// End the first live effect that is-a the class.
    Stop(EffectClass),
    /// End every live effect that is-a the class.
    StopAll(EffectClass),
}

/// Borrowed view handed to every [`EffectBehavior`](super::EffectBehavior) hook.
pub struct EffectContext<'a> {
    pub(crate) info: &'a EffectInfo,
    pub(crate) modifiers: &'a EffectModifiers,
    pub(crate) owned_timers: &'a mut Vec<TimerHandle>,
    pub(crate) timers: &'a mut dyn TimerService,
    pub(crate) attributes: &'a mut AttributeSet,
    pub(crate) registry: &'a AbilityRegistry,
    pub(crate) notifier: &'a mut Notifier,
    pub(crate) commands: &'a mut VecDeque<Command>,
}

impl EffectContext<'_> {
    /// The effect this context is bound to.
    pub fn effect(&self) -> &EffectInfo {
        self.info
    }

    pub fn id(&self) -> EffectId {
        self.info.id
    }

    pub fn class(&self) -> &EffectClass {
        &self.info.class
    }

    pub fn registry(&self) -> &AbilityRegistry {
        self.registry
    }

    /// Effect-class is-a test against the registry's hierarchy.
    pub fn is_a(&self, class: &EffectClass, ancestor: &EffectClass) -> bool {
        self.registry.effect_is_a(class, ancestor)
    }

    pub fn modifiers(&self) -> &EffectModifiers {
        self.modifiers
    }

    pub fn total_modifier(&self) -> f32 {
        self.modifiers.total()
    }

    // ---- attributes ----

    pub fn attribute(&self, class: &AttributeClass) -> Option<&Attribute> {
        self.attributes
            .get(class, self.registry.attribute_hierarchy())
    }

    pub fn attribute_mut(&mut self, class: &AttributeClass) -> Option<AttributeMut<'_>> {
        self.attributes
            .get_mut(class, self.registry.attribute_hierarchy(), self.notifier)
    }

    /// Applies `value` to the attribute; `false` when the entity lacks it.
    pub fn edit_attribute(&mut self, class: &AttributeClass, kind: ModifyKind, value: f32) -> bool {
        let effect = self.info.id;
        match self.attribute_mut(class) {
            Some(mut attribute) => {
                attribute.edit_value(kind, value);
                true
            }
            None => {
                tracing::debug!(%effect, %class, "effect targets missing attribute");
                false
            }
        }
    }

    // ---- timers ----

    /// Starts a repeating timer owned by this effect.
    ///
    /// Owned timers are stopped when the effect is removed.
    pub fn start_repeating(&mut self, interval: f32) -> TimerHandle {
        let handle = self.timers.start_repeating(interval);
        self.owned_timers.push(handle);
        handle
    }

    /// Stops an owned timer. Handles owned by other effects are ignored.
    pub fn stop_timer(&mut self, handle: TimerHandle) {
        if let Some(index) = self.owned_timers.iter().position(|owned| *owned == handle) {
            self.owned_timers.swap_remove(index);
            self.timers.stop(handle);
        }
    }

    pub fn pause_timer(&mut self, handle: TimerHandle) {
        if self.owned_timers.contains(&handle) {
            self.timers.pause(handle);
        }
    }

    pub fn resume_timer(&mut self, handle: TimerHandle) {
        if self.owned_timers.contains(&handle) {
            self.timers.resume(handle);
        }
    }

    pub fn is_timer_active(&self, handle: TimerHandle) -> bool {
        self.owned_timers.contains(&handle) && self.timers.is_active(handle)
    }

    pub fn is_timer_paused(&self, handle: TimerHandle) -> bool {
        self.owned_timers.contains(&handle) && self.timers.is_paused(handle)
    }

    pub fn timer_exists(&self, handle: TimerHandle) -> bool {
        self.owned_timers.contains(&handle) && self.timers.exists(handle)
    }

    // ---- lifecycle requests ----

    /// Ends this effect once the current hook returns.
    pub fn end_work(&mut self) {
        self.commands.push_back(Command::EndWork(self.info.id));
    }

    /// Ends the first live effect that is-a `class`.
    pub fn stop_effect(&mut self, class: impl Into<EffectClass>) {
        self.commands.push_back(Command::Stop(class.into()));
    }

    /// Ends one specific instance.
    pub fn stop_effect_by_id(&mut self, id: EffectId) {
        self.commands.push_back(Command::EndWork(id));
    }

    pub fn stop_all_effects_by_class(&mut self, class: impl Into<EffectClass>) {
        self.commands.push_back(Command::StopAll(class.into()));
    }

    pub fn add_effect(&mut self, class: impl Into<EffectClass>) {
        self.commands.push_back(Command::Add(class.into()));
    }

    /// Reports a progress field change for this effect.
    pub fn emit_progress(&mut self, change: ProgressChange) {
        self.notifier.emit(AbilityEvent::Progress {
            effect: self.info.clone(),
            change,
        });
    }
}
