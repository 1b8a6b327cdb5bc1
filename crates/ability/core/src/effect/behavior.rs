use std::any::Any;

use super::{EffectContext, EffectInfo};
use crate::attribute::{AttributeMultiplier, ModifyKind};
use crate::class::{AttributeClass, EffectClass};
use crate::timer::TimerHandle;

/// Upcast to [`Any`] so boxed behaviors can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-type effect logic.
///
/// Every hook is optional. The default `work` ends the effect immediately;
/// override it to keep the effect alive (start a timer, wait for a stop
/// request, ...).
pub trait EffectBehavior: AsAny + Send + 'static {
    /// Called once, right after the effect is announced.
    fn work(&mut self, ctx: &mut EffectContext<'_>) {
        ctx.end_work();
    }

    /// Called once when the effect ends, before its removal is queued.
    fn end_work(&mut self, _ctx: &mut EffectContext<'_>) {}

    /// Another add of `requested` was folded into this stackable instance.
    fn stack(&mut self, _ctx: &mut EffectContext<'_>, _requested: &EffectClass) {}

    /// A new effect is about to join the collection.
    fn effect_added(&mut self, _ctx: &mut EffectContext<'_>, _added: &EffectInfo) {}

    /// Another effect is about to leave the collection.
    fn effect_removing(&mut self, _ctx: &mut EffectContext<'_>, _removing: &EffectInfo) {}

    /// One of this effect's timers fired.
    fn on_timer(&mut self, _ctx: &mut EffectContext<'_>, _handle: TimerHandle) {}
}

/// One-shot attribute edit, scaled by the effect's modifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct InstantEffect {
    pub attribute: AttributeClass,
    pub kind: ModifyKind,
    pub value: f32,
}

impl InstantEffect {
    pub fn new(attribute: impl Into<AttributeClass>, kind: ModifyKind, value: f32) -> Self {
        Self {
            attribute: attribute.into(),
            kind,
            value,
        }
    }
}

impl EffectBehavior for InstantEffect {
    fn work(&mut self, ctx: &mut EffectContext<'_>) {
        let value = self.value * ctx.total_modifier();
        ctx.edit_attribute(&self.attribute, self.kind, value);
        ctx.end_work();
    }
}

/// Stays until stopped. Counts how many adds were folded into it and can
/// hold an attribute multiplier for its lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct Passive {
    stacks: u32,
    grant: Option<(AttributeClass, AttributeMultiplier)>,
}

impl Default for Passive {
    fn default() -> Self {
        Self::new()
    }
}

impl Passive {
    pub fn new() -> Self {
        Self {
            stacks: 1,
            grant: None,
        }
    }

    /// Adds `multiplier` to `attribute` while the effect works.
    pub fn granting(attribute: impl Into<AttributeClass>, multiplier: AttributeMultiplier) -> Self {
        Self {
            stacks: 1,
            grant: Some((attribute.into(), multiplier)),
        }
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }
}

impl EffectBehavior for Passive {
    fn work(&mut self, ctx: &mut EffectContext<'_>) {
        let Some((class, multiplier)) = &self.grant else {
            return;
        };
        let effect = ctx.id();
        if let Some(mut attribute) = ctx.attribute_mut(class) {
            if let Err(error) = attribute.add_multiplier(multiplier.clone()) {
                tracing::warn!(%effect, %error, "passive grant rejected");
            }
        }
    }

    fn end_work(&mut self, ctx: &mut EffectContext<'_>) {
        let Some((class, multiplier)) = &self.grant else {
            return;
        };
        if let Some(mut attribute) = ctx.attribute_mut(class) {
            // The grant may have been removed by hand already.
            let _ = attribute.remove_multiplier(&multiplier.id);
        }
    }

    fn stack(&mut self, _ctx: &mut EffectContext<'_>, _requested: &EffectClass) {
        self.stacks += 1;
    }
}

/// Ends every effect of the listed classes, both those already present when
/// it starts and any added while it works.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Immunity {
    pub against: Vec<EffectClass>,
}

impl Immunity {
    pub fn new(against: impl IntoIterator<Item = EffectClass>) -> Self {
        Self {
            against: against.into_iter().collect(),
        }
    }

    fn blocks(&self, ctx: &EffectContext<'_>, class: &EffectClass) -> bool {
        self.against
            .iter()
            .any(|blocked| ctx.is_a(class, blocked))
    }
}

impl EffectBehavior for Immunity {
    fn work(&mut self, ctx: &mut EffectContext<'_>) {
        for class in &self.against {
            ctx.stop_all_effects_by_class(class.clone());
        }
    }

    fn effect_added(&mut self, ctx: &mut EffectContext<'_>, added: &EffectInfo) {
        if self.blocks(ctx, &added.class) {
            tracing::debug!(immunity = %ctx.id(), blocked = %added.id, "effect blocked");
            ctx.stop_effect_by_id(added.id);
        }
    }
}
