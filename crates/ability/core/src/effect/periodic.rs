//! Effect that acts on every firing of a repeating timer.

use super::{EffectBehavior, EffectContext};
use crate::attribute::ModifyKind;
use crate::class::AttributeClass;
use crate::timer::TimerHandle;

/// Work done on each period of a [`PeriodicEffect`].
pub trait PeriodicHandler: Send + 'static {
    fn period_tick(&mut self, ctx: &mut EffectContext<'_>, value: f32);
}

/// Ticks without acting; a bare timer.
impl PeriodicHandler for () {
    fn period_tick(&mut self, _ctx: &mut EffectContext<'_>, _value: f32) {}
}

/// Edits one attribute by the period value scaled by the effect's modifiers.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeTick {
    pub attribute: AttributeClass,
    pub kind: ModifyKind,
}

impl AttributeTick {
    pub fn new(attribute: impl Into<AttributeClass>, kind: ModifyKind) -> Self {
        Self {
            attribute: attribute.into(),
            kind,
        }
    }
}

impl PeriodicHandler for AttributeTick {
    fn period_tick(&mut self, ctx: &mut EffectContext<'_>, value: f32) {
        let value = value * ctx.total_modifier();
        ctx.edit_attribute(&self.attribute, self.kind, value);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicEffect<H = ()> {
    rate: f32,
    value: f32,
    ticks: u32,
    timer: Option<TimerHandle>,
    handler: H,
}

impl Default for PeriodicEffect {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATE, Self::DEFAULT_VALUE, ())
    }
}

impl<H: PeriodicHandler> PeriodicEffect<H> {
    pub const DEFAULT_RATE: f32 = 1.0;
    pub const DEFAULT_VALUE: f32 = 1.0;

    pub fn new(rate: f32, value: f32, handler: H) -> Self {
        Self {
            rate,
            value,
            ticks: 0,
            timer: None,
            handler,
        }
    }

    /// Seconds between ticks.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    /// Changes the period; a running timer is restarted at the new interval.
    pub fn set_rate(&mut self, ctx: &mut EffectContext<'_>, rate: f32) {
        self.rate = rate;
        if let Some(timer) = self.timer.take() {
            ctx.stop_timer(timer);
            self.timer = Some(ctx.start_repeating(self.rate));
        }
    }

    /// Periods elapsed since work began.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}

impl<H: PeriodicHandler> EffectBehavior for PeriodicEffect<H> {
    fn work(&mut self, ctx: &mut EffectContext<'_>) {
        self.timer = Some(ctx.start_repeating(self.rate));
    }

    fn end_work(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(timer) = self.timer.take() {
            ctx.stop_timer(timer);
        }
    }

    fn on_timer(&mut self, ctx: &mut EffectContext<'_>, handle: TimerHandle) {
        if self.timer != Some(handle) {
            return;
        }
        self.ticks += 1;
        self.handler.period_tick(ctx, self.value);
    }
}
