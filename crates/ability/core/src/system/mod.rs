//! The per-entity orchestrator.
//!
//! [`AbilitySystem`] exclusively owns one entity's attributes and effects. It
//! creates and removes them, routes timer firings to the owning effect and
//! re-broadcasts their signals to subscribed observers.
//!
//! # Deferred collection changes
//!
//! Effect hooks run while the orchestrator is iterating its effect list, so
//! they never mutate the list directly. Requests made through an
//! [`EffectContext`] (end this effect, stop another, add one) are queued and
//! drained once the current hook pass finishes.
//! Every public operation drains the queue before returning, so callers
//! always observe a settled collection.

mod query;

pub use query::{AttributeData, EffectData};

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::attribute::{
    Attribute, AttributeMultiplier, AttributeMut, AttributeSet, ModifyKind,
};
use crate::class::{AttributeClass, EffectClass, ModifierId, MultiplierId};
use crate::config::AbilityConfig;
use crate::effect::{
    AsAny, Command, Effect, EffectBehavior, EffectContext, EffectId, EffectModifier, EffectState,
};
use crate::error::{AbilityError, Result};
use crate::event::{AbilityEvent, AbilityObserver, Notifier, ObserverId};
use crate::registry::AbilityRegistry;
use crate::timer::{TimerHandle, TimerManager, TimerService};

pub struct AbilitySystem<T: TimerService = TimerManager> {
    registry: Arc<AbilityRegistry>,
    config: AbilityConfig,
    attributes: AttributeSet,
    effects: Vec<Effect>,
    timers: T,
    notifier: Notifier,
    commands: VecDeque<Command>,
    next_effect: u64,
    tearing_down: bool,
}

impl<T: TimerService> std::fmt::Debug for AbilitySystem<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbilitySystem")
            .field("attributes", &self.attributes)
            .field("effects", &self.effects)
            .field("notifier", &self.notifier)
            .field("tearing_down", &self.tearing_down)
            .finish_non_exhaustive()
    }
}

impl<T: TimerService> AbilitySystem<T> {
    pub fn new(registry: Arc<AbilityRegistry>, config: AbilityConfig, timers: T) -> Self {
        Self {
            registry,
            config,
            attributes: AttributeSet::new(),
            effects: Vec::new(),
            timers,
            notifier: Notifier::new(),
            commands: VecDeque::new(),
            next_effect: 0,
            tearing_down: false,
        }
    }

    pub fn registry(&self) -> &Arc<AbilityRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &AbilityConfig {
        &self.config
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    pub fn subscribe(&mut self, observer: impl AbilityObserver + 'static) -> ObserverId {
        self.notifier.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Entity-ready signal: adds the configured attributes, then effects, in
    /// list order. Entries that fail are logged and skipped.
    pub fn begin_play(&mut self) {
        self.tearing_down = false;
        let AbilityConfig {
            initial_attributes,
            initial_effects,
        } = self.config.clone();

        for class in &initial_attributes {
            if let Err(error) = self.add_attribute(class) {
                warn!(%class, %error, "initial attribute skipped");
            }
        }
        for class in &initial_effects {
            if let Err(error) = self.add_effect(class) {
                warn!(%class, %error, "initial effect skipped");
            }
        }
        debug!(
            attributes = self.attributes.len(),
            effects = self.effects.len(),
            "ability system ready"
        );
    }

    /// Entity-ending signal: destroys every attribute, then every effect.
    ///
    /// No effect hook runs after this point and no notification is raised.
    pub fn end_play(&mut self) {
        self.tearing_down = true;
        let attributes = self.remove_all_attributes();
        let effects = self.remove_all_effects();
        debug!(attributes, effects, "ability system torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.tearing_down
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Adds a registered attribute. Fails if one of that class already exists.
    pub fn add_attribute(&mut self, class: &AttributeClass) -> Result<&Attribute> {
        let Some(spec) = self.registry.attribute_spec(class) else {
            warn!(%class, "unknown attribute class");
            return Err(AbilityError::UnknownAttribute(class.clone()));
        };
        if self
            .attributes
            .position(class, self.registry.attribute_hierarchy())
            .is_some()
        {
            warn!(%class, "attribute already present");
            return Err(AbilityError::DuplicateAttribute(class.clone()));
        }

        debug!(%class, "attribute added");
        Ok(self.attributes.push(Attribute::new(spec)))
    }

    pub fn remove_attribute(&mut self, class: &AttributeClass) -> Result<()> {
        let index = self
            .attributes
            .position(class, self.registry.attribute_hierarchy())
            .ok_or_else(|| AbilityError::AttributeNotFound(class.clone()))?;
        let removed = self.attributes.remove(index);
        debug!(class = %removed.class(), "attribute removed");
        Ok(())
    }

    /// Destroys every attribute without raising signals. Returns how many.
    pub fn remove_all_attributes(&mut self) -> usize {
        self.attributes.clear()
    }

    pub fn has_attribute(&self, class: &AttributeClass) -> bool {
        self.attribute(class).is_some()
    }

    pub fn attribute(&self, class: &AttributeClass) -> Option<&Attribute> {
        self.attributes
            .get(class, self.registry.attribute_hierarchy())
    }

    /// Write access; signals raised through the guard reach observers when it drops.
    pub fn attribute_mut(&mut self, class: &AttributeClass) -> Option<AttributeMut<'_>> {
        self.attributes.get_mut(
            class,
            self.registry.attribute_hierarchy(),
            &mut self.notifier,
        )
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Applies a Set/Add/Remove edit and returns the new read value.
    pub fn edit_attribute(
        &mut self,
        class: &AttributeClass,
        kind: ModifyKind,
        value: f32,
    ) -> Result<f32> {
        let mut attribute = self
            .attribute_mut(class)
            .ok_or_else(|| AbilityError::AttributeNotFound(class.clone()))?;
        attribute.edit_value(kind, value);
        Ok(attribute.current_value())
    }

    pub fn add_attribute_multiplier(
        &mut self,
        class: &AttributeClass,
        multiplier: AttributeMultiplier,
    ) -> Result<()> {
        self.attribute_mut(class)
            .ok_or_else(|| AbilityError::AttributeNotFound(class.clone()))?
            .add_multiplier(multiplier)
    }

    pub fn remove_attribute_multiplier(
        &mut self,
        class: &AttributeClass,
        id: &MultiplierId,
    ) -> Result<AttributeMultiplier> {
        self.attribute_mut(class)
            .ok_or_else(|| AbilityError::AttributeNotFound(class.clone()))?
            .remove_multiplier(id)
    }

    // ========================================================================
    // Effects: creation
    // ========================================================================

    /// Adds an effect, or stacks onto a live stackable one of that class.
    ///
    /// `class` must be a registered effect; a parent-only class such as
    /// `debuff` is rejected with [`AbilityError::UnknownEffect`] even when a
    /// live instance is-a `debuff`. Returns the id of the new or stacked-onto
    /// instance.
    pub fn add_effect(&mut self, class: &EffectClass) -> Result<EffectId> {
        let result = self.create_effect(class, |_, _| Ok(()));
        self.pump();
        result
    }

    /// Like [`add_effect`](Self::add_effect), running `setup` on the new
    /// behavior before anyone is notified. Stacking skips `setup`.
    pub fn add_effect_with<B: EffectBehavior>(
        &mut self,
        class: &EffectClass,
        setup: impl FnOnce(&mut B),
    ) -> Result<EffectId> {
        let result = self.create_effect(class, |id, behavior| {
            let behavior = AsAny::as_any_mut(behavior)
                .downcast_mut::<B>()
                .ok_or(AbilityError::BehaviorMismatch(id))?;
            setup(behavior);
            Ok(())
        });
        self.pump();
        result
    }

    fn create_effect(
        &mut self,
        class: &EffectClass,
        configure: impl FnOnce(EffectId, &mut dyn EffectBehavior) -> Result<()>,
    ) -> Result<EffectId> {
        if self.registry.effect_spec(class).is_none() {
            warn!(%class, "unknown effect class");
            return Err(AbilityError::UnknownEffect(class.clone()));
        }

        if let Some(index) = self.effects.iter().position(|effect| {
            effect.state() == EffectState::Working
                && effect.is_stackable()
                && self.registry.effect_is_a(effect.class(), class)
        }) {
            let id = self.effects[index].id();
            trace!(%class, effect = %id, "effect stacked");
            self.dispatch(index, |behavior, ctx| behavior.stack(ctx, class));
            return Ok(id);
        }

        let registry = Arc::clone(&self.registry);
        let Some((spec, mut behavior)) = registry.instantiate(class) else {
            warn!(%class, "unknown effect class");
            return Err(AbilityError::UnknownEffect(class.clone()));
        };

        self.next_effect += 1;
        let id = EffectId::new(self.next_effect);
        configure(id, behavior.as_mut())?;
        let effect = Effect::new(id, spec, behavior);
        let info = effect.info().clone();

        for other in self.working_ids(|_| true) {
            if let Some(index) = self.index_of(other) {
                self.dispatch(index, |behavior, ctx| behavior.effect_added(ctx, &info));
            }
        }

        self.effects.push(effect);
        debug!(%class, effect = %id, "effect started");
        self.notifier.emit(AbilityEvent::EffectStarted(info));

        let index = self.effects.len() - 1;
        self.effects[index].set_state(EffectState::Working);
        self.dispatch(index, |behavior, ctx| behavior.work(ctx));
        Ok(id)
    }

    // ========================================================================
    // Effects: ending
    // ========================================================================

    /// Ends the first live effect that is-a `class`.
    pub fn stop_effect(&mut self, class: &EffectClass) -> Result<EffectId> {
        let id = self
            .effect_by_class(class)
            .map(Effect::id)
            .ok_or_else(|| AbilityError::EffectNotFound(class.clone()))?;
        self.end_effect(id);
        self.pump();
        Ok(id)
    }

    pub fn stop_effect_by_id(&mut self, id: EffectId) -> Result<()> {
        if !self.end_effect(id) {
            return Err(AbilityError::EffectGone(id));
        }
        self.pump();
        Ok(())
    }

    /// Ends every live effect that is-a `class`. Returns how many ended.
    pub fn stop_all_effects_by_class(&mut self, class: &EffectClass) -> usize {
        let registry = Arc::clone(&self.registry);
        let ids = self.working_ids(|effect| registry.effect_is_a(effect.class(), class));
        self.end_each(ids)
    }

    /// Ends every live effect. Returns how many ended.
    pub fn stop_all_effects(&mut self) -> usize {
        let ids = self.working_ids(|_| true);
        self.end_each(ids)
    }

    fn end_each(&mut self, ids: Vec<EffectId>) -> usize {
        let mut ended = 0;
        for id in ids {
            if self.end_effect(id) {
                ended += 1;
            }
            self.pump();
        }
        ended
    }

    /// Runs `end_work` on a working effect and queues its removal.
    fn end_effect(&mut self, id: EffectId) -> bool {
        if self.tearing_down {
            return false;
        }
        let Some(index) = self
            .index_of(id)
            .filter(|&index| self.effects[index].state() == EffectState::Working)
        else {
            return false;
        };

        self.effects[index].set_state(EffectState::EndRequested);
        self.dispatch(index, |behavior, ctx| behavior.end_work(ctx));
        self.commands.push_front(Command::Remove(id));
        true
    }

    fn finish_removal(&mut self, id: EffectId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let info = self.effects[index].info().clone();

        for other in self.working_ids(|effect| effect.id() != id) {
            if let Some(other) = self.index_of(other) {
                self.dispatch(other, |behavior, ctx| behavior.effect_removing(ctx, &info));
            }
        }

        debug!(class = %info.class, effect = %id, "effect ended");
        self.notifier.emit(AbilityEvent::EffectEnded(info.clone()));
        self.notifier.emit(AbilityEvent::ClientEffectEnded(info));

        // Hooks never change the list's shape, so `index` still holds.
        let mut effect = self.effects.remove(index);
        effect.release_timers(&mut self.timers);
        effect.set_state(EffectState::Removed);
    }

    /// Destroys every effect without running hooks or raising notifications.
    ///
    /// Timers owned by the effects are stopped. Returns how many were removed.
    pub fn remove_all_effects(&mut self) -> usize {
        self.commands.clear();
        let count = self.effects.len();
        for mut effect in self.effects.drain(..) {
            effect.release_timers(&mut self.timers);
            effect.set_state(EffectState::Removed);
        }
        count
    }

    // ========================================================================
    // Effects: queries and access
    // ========================================================================

    pub fn has_effect(&self, class: &EffectClass) -> bool {
        self.effect_by_class(class).is_some()
    }

    /// First live effect that is-a `class`.
    pub fn effect_by_class(&self, class: &EffectClass) -> Option<&Effect> {
        self.effects.iter().find(|effect| {
            effect.state() == EffectState::Working
                && self.registry.effect_is_a(effect.class(), class)
        })
    }

    pub fn effects_by_class(&self, class: &EffectClass) -> Vec<&Effect> {
        self.effects
            .iter()
            .filter(|effect| {
                effect.state() == EffectState::Working
                    && self.registry.effect_is_a(effect.class(), class)
            })
            .collect()
    }

    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|effect| effect.id() == id)
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Runs `f` on a live effect's concrete behavior, with that effect's context.
    pub fn with_effect<B: EffectBehavior, R>(
        &mut self,
        id: EffectId,
        f: impl FnOnce(&mut B, &mut EffectContext<'_>) -> R,
    ) -> Result<R> {
        let index = self
            .working_index(id)
            .ok_or(AbilityError::EffectGone(id))?;
        let result = self.dispatch(index, |behavior, ctx| {
            AsAny::as_any_mut(behavior)
                .downcast_mut::<B>()
                .map(|behavior| f(behavior, ctx))
        });
        self.pump();
        result.ok_or(AbilityError::BehaviorMismatch(id))
    }

    /// Inserts or overwrites a modifier on a live effect.
    pub fn apply_modifier(&mut self, id: EffectId, modifier: EffectModifier) -> Result<()> {
        let index = self
            .working_index(id)
            .ok_or(AbilityError::EffectGone(id))?;
        self.effects[index].modifiers_mut().apply(modifier);
        Ok(())
    }

    /// Returns whether the modifier was present.
    pub fn remove_modifier(&mut self, id: EffectId, modifier: &ModifierId) -> Result<bool> {
        let index = self
            .working_index(id)
            .ok_or(AbilityError::EffectGone(id))?;
        Ok(self.effects[index].modifiers_mut().remove(modifier))
    }

    // ========================================================================
    // Timers
    // ========================================================================

    /// Delivers one timer firing to the effect owning `handle`.
    ///
    /// Returns false for stale, paused or unowned handles, which are ignored.
    pub fn fire_timer(&mut self, handle: TimerHandle) -> bool {
        if self.tearing_down || !self.timers.is_active(handle) {
            trace!(%handle, "timer firing ignored");
            return false;
        }
        let Some(index) = self.effects.iter().position(|effect| {
            effect.state() == EffectState::Working && effect.owns_timer(handle)
        }) else {
            trace!(%handle, "timer has no owning effect");
            return false;
        };

        trace!(%handle, effect = %self.effects[index].id(), "timer fired");
        self.dispatch(index, |behavior, ctx| behavior.on_timer(ctx, handle));
        self.pump();
        true
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn index_of(&self, id: EffectId) -> Option<usize> {
        self.effects.iter().position(|effect| effect.id() == id)
    }

    fn working_index(&self, id: EffectId) -> Option<usize> {
        self.index_of(id)
            .filter(|&index| self.effects[index].state() == EffectState::Working)
    }

    fn working_ids(&self, filter: impl Fn(&Effect) -> bool) -> Vec<EffectId> {
        self.effects
            .iter()
            .filter(|effect| effect.state() == EffectState::Working && filter(effect))
            .map(Effect::id)
            .collect()
    }

    /// Runs one hook on the effect at `index` with a context bound to it.
    fn dispatch<R>(
        &mut self,
        index: usize,
        hook: impl FnOnce(&mut dyn EffectBehavior, &mut EffectContext<'_>) -> R,
    ) -> R {
        let Self {
            registry,
            attributes,
            effects,
            timers,
            notifier,
            commands,
            ..
        } = self;
        let (behavior, mut ctx) =
            effects[index].split(timers, attributes, registry, notifier, commands);
        hook(behavior, &mut ctx)
    }

    /// Drains requests queued by effect hooks.
    fn pump(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            if self.tearing_down {
                self.commands.clear();
                return;
            }
            trace!(?command, "effect command");
            match command {
                Command::EndWork(id) => {
                    self.end_effect(id);
                }
                Command::Remove(id) => self.finish_removal(id),
                Command::Add(class) => {
                    if let Err(error) = self.create_effect(&class, |_, _| Ok(())) {
                        warn!(%class, %error, "effect-requested add failed");
                    }
                }
                Command::Stop(class) => {
                    if let Some(id) = self.effect_by_class(&class).map(Effect::id) {
                        self.end_effect(id);
                    }
                }
                Command::StopAll(class) => {
                    // Each match ends and is removed before the next one ends.
                    let registry = Arc::clone(&self.registry);
                    let ids = self.working_ids(|effect| registry.effect_is_a(effect.class(), &class));
                    for id in ids.into_iter().rev() {
                        self.commands.push_front(Command::EndWork(id));
                    }
                }
            }
        }
    }
}

impl AbilitySystem<TimerManager> {
    /// Advances the built-in timer clock and delivers every firing in order.
    ///
    /// Returns how many firings reached an effect.
    pub fn advance(&mut self, delta: f32) -> usize {
        let fired = self.timers.advance(delta);
        fired
            .into_iter()
            .filter(|&handle| self.fire_timer(handle))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::attribute::{AttributeSignal, AttributeSpec, MultiplierKind};
    use crate::effect::{
        AttributeTick, EffectInfo, EffectSpec, Immunity, InstantEffect, Passive, PeriodicEffect,
        ProgressEffect,
    };
    use crate::event::EventLog;

    type Journal = Arc<Mutex<Vec<String>>>;

    /// Stays until stopped and writes every hook call to a shared journal.
    struct Recorder {
        name: &'static str,
        journal: Journal,
    }

    impl Recorder {
        fn note(&self, line: String) {
            self.journal.lock().unwrap().push(format!("{} {line}", self.name));
        }
    }

    impl EffectBehavior for Recorder {
        fn work(&mut self, _ctx: &mut EffectContext<'_>) {
            self.note("work".into());
        }

        fn end_work(&mut self, _ctx: &mut EffectContext<'_>) {
            self.note("end".into());
        }

        fn stack(&mut self, _ctx: &mut EffectContext<'_>, _requested: &EffectClass) {
            self.note("stack".into());
        }

        fn effect_added(&mut self, _ctx: &mut EffectContext<'_>, added: &EffectInfo) {
            self.note(format!("saw added {}", added.class));
        }

        fn effect_removing(&mut self, _ctx: &mut EffectContext<'_>, removing: &EffectInfo) {
            self.note(format!("saw removing {}", removing.class));
        }
    }

    /// Purges debuffs, grants an aura, then ends itself.
    struct Cleanse;

    impl EffectBehavior for Cleanse {
        fn work(&mut self, ctx: &mut EffectContext<'_>) {
            ctx.stop_all_effects_by_class("debuff");
            ctx.add_effect("aura");
            ctx.end_work();
        }
    }

    fn registry(journal: &Journal) -> AbilityRegistry {
        let mut registry = AbilityRegistry::new();
        registry
            .register_attribute(AttributeSpec::new("health"))
            .unwrap();
        registry
            .register_attribute(AttributeSpec::new("mana").with_parent("resource"))
            .unwrap();

        for name in ["poison", "curse"] {
            let journal = Arc::clone(journal);
            registry
                .register_effect(EffectSpec::new(name).with_parent("debuff"), move || Recorder {
                    name,
                    journal: Arc::clone(&journal),
                })
                .unwrap();
        }
        registry
            .register_effect(EffectSpec::new("aura").stackable(true), Passive::new)
            .unwrap();
        registry
            .register_effect(EffectSpec::new("strike"), || {
                InstantEffect::new("health", ModifyKind::Remove, 25.0)
            })
            .unwrap();
        registry
            .register_effect(EffectSpec::new("ward"), || Immunity::new(["debuff".into()]))
            .unwrap();
        registry
            .register_effect(EffectSpec::new("blessing"), || {
                Passive::granting(
                    "health",
                    AttributeMultiplier::new("blessed", 2.0, MultiplierKind::MaxValue),
                )
            })
            .unwrap();
        registry
            .register_effect(EffectSpec::new("burn"), || {
                PeriodicEffect::new(1.0, 10.0, AttributeTick::new("health", ModifyKind::Remove))
            })
            .unwrap();
        registry
            .register_effect(EffectSpec::new("cleanse"), || Cleanse)
            .unwrap();
        registry
    }

    fn fixture() -> (AbilitySystem, EventLog, Journal) {
        let journal = Journal::default();
        let mut system = AbilitySystem::new(
            Arc::new(registry(&journal)),
            AbilityConfig::default(),
            TimerManager::new(),
        );
        system.add_attribute(&"health".into()).unwrap();
        let log = EventLog::new();
        system.subscribe(log.clone());
        (system, log, journal)
    }

    fn ended(log: &EventLog) -> usize {
        log.count(|event| matches!(event, AbilityEvent::EffectEnded(_)))
    }

    #[test]
    fn add_attribute_rejects_duplicates_and_unknown_classes() {
        let (mut system, _log, _journal) = fixture();

        assert_eq!(
            system.add_attribute(&"health".into()).unwrap_err(),
            AbilityError::DuplicateAttribute("health".into())
        );
        assert_eq!(
            system.add_attribute(&"stamina".into()).unwrap_err(),
            AbilityError::UnknownAttribute("stamina".into())
        );
        assert_eq!(system.attributes().len(), 1);
    }

    #[test]
    fn attribute_lookup_follows_parents() {
        let (mut system, _log, _journal) = fixture();
        system.add_attribute(&"mana".into()).unwrap();

        let resource = system.attribute(&"resource".into()).unwrap();
        assert_eq!(resource.class().as_str(), "mana");

        system.remove_attribute(&"resource".into()).unwrap();
        assert!(!system.has_attribute(&"mana".into()));
        assert!(system.remove_attribute(&"mana".into()).unwrap_err().is_not_found());
    }

    #[test]
    fn attribute_signals_are_rebroadcast() {
        let (mut system, log, _journal) = fixture();

        let value = system
            .edit_attribute(&"health".into(), ModifyKind::Remove, 150.0)
            .unwrap();
        assert_eq!(value, 0.0);
        assert_eq!(
            log.events(),
            vec![
                AbilityEvent::Attribute {
                    attribute: "health".into(),
                    signal: AttributeSignal::ReachedMin,
                },
                AbilityEvent::Attribute {
                    attribute: "health".into(),
                    signal: AttributeSignal::ValueChanged(0.0),
                },
            ]
        );
    }

    #[test]
    fn non_stackable_effects_run_in_parallel() {
        let (mut system, log, _journal) = fixture();
        let first = system.add_effect(&"poison".into()).unwrap();
        let second = system.add_effect(&"poison".into()).unwrap();

        assert_ne!(first, second);
        assert_eq!(system.effects_by_class(&"poison".into()).len(), 2);

        assert_eq!(system.stop_all_effects_by_class(&"poison".into()), 2);
        assert!(system.effects().is_empty());
        assert_eq!(ended(&log), 2);
        assert_eq!(
            log.count(|event| matches!(event, AbilityEvent::ClientEffectEnded(_))),
            2
        );
    }

    #[test]
    fn stackable_effects_fold_into_one_instance() {
        let (mut system, log, _journal) = fixture();
        let first = system.add_effect(&"aura".into()).unwrap();
        let second = system.add_effect(&"aura".into()).unwrap();

        assert_eq!(first, second);
        let aura = system.effect(first).unwrap().behavior::<Passive>().unwrap();
        assert_eq!(aura.stacks(), 2);
        assert_eq!(
            log.count(|event| matches!(event, AbilityEvent::EffectStarted(_))),
            1
        );
    }

    #[test]
    fn existing_effects_see_newcomer_before_it_works() {
        let (mut system, log, journal) = fixture();
        system.add_effect(&"poison".into()).unwrap();
        log.clear();
        let curse = system.add_effect(&"curse".into()).unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["poison work", "poison saw added curse", "curse work"]
        );
        assert_eq!(
            log.events(),
            vec![AbilityEvent::EffectStarted(EffectInfo::new(curse, "curse".into()))]
        );
    }

    #[test]
    fn removal_notifies_other_effects_before_broadcast() {
        let (mut system, log, journal) = fixture();
        system.add_effect(&"poison".into()).unwrap();
        let curse = system.add_effect(&"curse".into()).unwrap();
        journal.lock().unwrap().clear();
        log.clear();

        system.stop_effect_by_id(curse).unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["curse end", "poison saw removing curse"]
        );
        let info = EffectInfo::new(curse, "curse".into());
        assert_eq!(
            log.events(),
            vec![
                AbilityEvent::EffectEnded(info.clone()),
                AbilityEvent::ClientEffectEnded(info),
            ]
        );
        assert!(system.effect(curse).is_none());
    }

    #[test]
    fn stopping_missing_effects_reports_failure() {
        let (mut system, log, _journal) = fixture();

        assert_eq!(
            system.stop_effect(&"poison".into()),
            Err(AbilityError::EffectNotFound("poison".into()))
        );
        assert_eq!(
            system.stop_effect_by_id(EffectId::new(99)),
            Err(AbilityError::EffectGone(EffectId::new(99)))
        );
        assert_eq!(system.stop_all_effects_by_class(&"poison".into()), 0);
        assert!(log.events().is_empty());
    }

    #[test]
    fn stop_effect_ends_the_first_match_only() {
        let (mut system, _log, _journal) = fixture();
        let first = system.add_effect(&"poison".into()).unwrap();
        let second = system.add_effect(&"curse".into()).unwrap();

        assert_eq!(system.stop_effect(&"debuff".into()), Ok(first));
        assert!(system.effect(first).is_none());
        assert!(system.effect(second).is_some());
    }

    #[test]
    fn instant_effect_applies_then_ends() {
        let (mut system, log, _journal) = fixture();
        let id = system.add_effect(&"strike".into()).unwrap();

        assert_eq!(system.attribute(&"health".into()).unwrap().current_value(), 75.0);
        assert!(system.effect(id).is_none());
        let lifecycle: Vec<_> = log
            .events()
            .into_iter()
            .filter(|event| !event.is_attribute())
            .collect();
        assert!(matches!(lifecycle[0], AbilityEvent::EffectStarted(_)));
        assert!(matches!(lifecycle[1], AbilityEvent::EffectEnded(_)));
    }

    #[test]
    fn immunity_ends_present_and_incoming_debuffs() {
        let (mut system, _log, journal) = fixture();
        system.add_effect(&"poison".into()).unwrap();
        let ward = system.add_effect(&"ward".into()).unwrap();
        assert!(!system.has_effect(&"poison".into()));

        journal.lock().unwrap().clear();
        system.add_effect(&"curse".into()).unwrap();
        assert!(!system.has_effect(&"debuff".into()));
        assert_eq!(*journal.lock().unwrap(), vec!["curse work", "curse end"]);
        assert!(system.effect(ward).is_some());
    }

    #[test]
    fn effect_requests_run_after_the_hook() {
        let (mut system, _log, _journal) = fixture();
        system.add_effect(&"poison".into()).unwrap();
        system.add_effect(&"curse".into()).unwrap();

        let cleanse = system.add_effect(&"cleanse".into()).unwrap();

        assert!(!system.has_effect(&"debuff".into()));
        assert!(system.has_effect(&"aura".into()));
        assert!(system.effect(cleanse).is_none());
        assert_eq!(system.effects().len(), 1);
    }

    #[test]
    fn passive_grant_lasts_while_effect_works() {
        let (mut system, _log, _journal) = fixture();
        let id = system.add_effect(&"blessing".into()).unwrap();
        assert_eq!(system.attribute(&"health".into()).unwrap().max_value(), 200.0);

        system.stop_effect_by_id(id).unwrap();
        assert_eq!(system.attribute(&"health".into()).unwrap().max_value(), 100.0);
    }

    #[test]
    fn typed_access_checks_the_behavior() {
        let (mut system, _log, _journal) = fixture();
        let aura = system.add_effect(&"aura".into()).unwrap();

        assert_eq!(
            system.with_effect::<ProgressEffect, _>(aura, |_, _| ()),
            Err(AbilityError::BehaviorMismatch(aura))
        );
        assert_eq!(
            system.with_effect::<Passive, _>(aura, |passive, _| passive.stacks()),
            Ok(1)
        );
        assert_eq!(
            system.add_effect_with::<ProgressEffect>(&"aura".into(), |_| {}),
            Ok(aura)
        );
    }

    #[test]
    fn modifiers_scale_periodic_payload() {
        let (mut system, _log, _journal) = fixture();
        let burn = system.add_effect(&"burn".into()).unwrap();
        system
            .apply_modifier(burn, EffectModifier::new("resist", 0.5))
            .unwrap();
        assert!(system.effect(burn).unwrap().has_modifier(&"resist".into()));

        system.advance(2.0);
        assert_eq!(system.attribute(&"health".into()).unwrap().current_value(), 90.0);

        assert_eq!(system.remove_modifier(burn, &"resist".into()), Ok(true));
        system.advance(1.0);
        assert_eq!(system.attribute(&"health".into()).unwrap().current_value(), 80.0);
    }

    #[test]
    fn end_play_tears_down_silently_and_releases_timers() {
        let (mut system, log, _journal) = fixture();
        let burn = system.add_effect(&"burn".into()).unwrap();
        let handle = system.effect(burn).unwrap().timers()[0];
        log.clear();

        system.end_play();

        assert!(system.attributes().is_empty());
        assert!(system.effects().is_empty());
        assert!(system.timers().is_empty());
        assert!(!system.fire_timer(handle));
        assert!(log.events().is_empty());
        assert_eq!(system.stop_all_effects(), 0);
    }

    #[test]
    fn begin_play_applies_config_in_order() {
        let journal = Journal::default();
        let config = AbilityConfig::new()
            .with_attribute("health")
            .with_attribute("mana")
            .with_attribute("ghost")
            .with_effect("aura")
            .with_effect("strike");
        let mut system =
            AbilitySystem::new(Arc::new(registry(&journal)), config, TimerManager::new());

        system.begin_play();

        let classes: Vec<_> = system
            .attributes()
            .iter()
            .map(|attribute| attribute.class().as_str())
            .collect();
        assert_eq!(classes, vec!["health", "mana"]);
        assert!(system.has_effect(&"aura".into()));
        assert_eq!(system.attribute(&"health".into()).unwrap().current_value(), 75.0);
    }

    #[test]
    fn stale_timer_handles_are_ignored() {
        let (mut system, _log, _journal) = fixture();
        assert!(!system.fire_timer(TimerHandle::new(42)));

        let burn = system.add_effect(&"burn".into()).unwrap();
        let handle = system.effect(burn).unwrap().timers()[0];
        system.stop_effect_by_id(burn).unwrap();
        assert!(!system.fire_timer(handle));
    }
}
