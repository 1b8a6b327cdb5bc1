//! Effect that accumulates progress towards a target, then ends itself.
//!
//! A repeating timer adds `progress_amount` to `current_progress` every
//! `progress_rate` seconds. Progress is clamped to `[0, need_progress]`;
//! reaching the target clears `in_progress` and ends the effect in the same
//! step. Every field change is reported as an [`AbilityEvent::Progress`].
//!
//! [`AbilityEvent::Progress`]: crate::event::AbilityEvent::Progress

use super::{EffectBehavior, EffectContext};
use crate::attribute::clamp_lenient;
use crate::timer::TimerHandle;

/// Which progress field changed, with its new value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProgressChange {
    CurrentProgress(f32),
    NeedProgress(f32),
    ProgressRate(f32),
    ProgressAmount(f32),
    InProgress(bool),
}

/// Customization points of a [`ProgressEffect`].
pub trait ProgressHandler: Send + 'static {
    /// Increment applied on one tick.
    fn increment(&mut self, _ctx: &mut EffectContext<'_>, amount: f32) -> f32 {
        amount
    }

    /// The target was reached; runs before the effect ends.
    fn completed(&mut self, _ctx: &mut EffectContext<'_>) {}
}

impl ProgressHandler for () {}

#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEffect<H = ()> {
    current_progress: f32,
    need_progress: f32,
    progress_rate: f32,
    progress_amount: f32,
    in_progress: bool,
    finished: bool,
    timer: Option<TimerHandle>,
    handler: H,
}

impl Default for ProgressEffect {
    fn default() -> Self {
        Self::with_handler(())
    }
}

impl<H: ProgressHandler> ProgressEffect<H> {
    pub const DEFAULT_NEED: f32 = 10.0;
    pub const DEFAULT_RATE: f32 = 1.0;
    pub const DEFAULT_AMOUNT: f32 = 1.0;
    pub const MIN_NEED: f32 = 1.0;
    pub const MIN_RATE: f32 = 0.001;
    pub const MIN_AMOUNT: f32 = 0.001;

    pub fn with_handler(handler: H) -> Self {
        Self {
            current_progress: 0.0,
            need_progress: Self::DEFAULT_NEED,
            progress_rate: Self::DEFAULT_RATE,
            progress_amount: Self::DEFAULT_AMOUNT,
            in_progress: false,
            finished: false,
            timer: None,
            handler,
        }
    }

    // Builders for use before the effect starts; they raise no events.

    #[must_use]
    pub fn need(mut self, need: f32) -> Self {
        self.need_progress = need.max(Self::MIN_NEED);
        self.current_progress = clamp_lenient(self.current_progress, 0.0, self.need_progress);
        self
    }

    #[must_use]
    pub fn rate(mut self, rate: f32) -> Self {
        self.progress_rate = rate.max(Self::MIN_RATE);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: f32) -> Self {
        self.progress_amount = amount.max(Self::MIN_AMOUNT);
        self
    }

    #[must_use]
    pub fn starting_at(mut self, progress: f32) -> Self {
        self.current_progress = clamp_lenient(progress, 0.0, self.need_progress);
        self
    }

    pub fn current_progress(&self) -> f32 {
        self.current_progress
    }

    pub fn need_progress(&self) -> f32 {
        self.need_progress
    }

    pub fn progress_rate(&self) -> f32 {
        self.progress_rate
    }

    pub fn progress_amount(&self) -> f32 {
        self.progress_amount
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `current / need`.
    pub fn percent(&self) -> f32 {
        self.current_progress / self.need_progress
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

    /// Sets progress, clamped to `[0, need]`. Reaching the target completes
    /// the effect; later calls are ignored.
    pub fn set_current_progress(&mut self, ctx: &mut EffectContext<'_>, value: f32) {
        if self.finished {
            return;
        }
        self.current_progress = clamp_lenient(value, 0.0, self.need_progress);
        ctx.emit_progress(ProgressChange::CurrentProgress(self.current_progress));

        if self.current_progress >= self.need_progress {
            self.finished = true;
            self.set_in_progress(ctx, false);
            tracing::debug!(effect = %ctx.id(), "progress complete");
            self.handler.completed(ctx);
            ctx.end_work();
        }
    }

    /// Sets the target, floored at 1. Progress already past the new target
    /// completes the effect.
    pub fn set_need_progress(&mut self, ctx: &mut EffectContext<'_>, value: f32) {
        self.need_progress = value.max(Self::MIN_NEED);
        ctx.emit_progress(ProgressChange::NeedProgress(self.need_progress));
        if self.current_progress >= self.need_progress {
            self.set_current_progress(ctx, self.current_progress);
        }
    }

    /// Sets the tick interval, floored at 0.001, restarting a running timer.
    pub fn set_progress_rate(&mut self, ctx: &mut EffectContext<'_>, value: f32) {
        self.progress_rate = value.max(Self::MIN_RATE);
        if let Some(timer) = self.timer.take() {
            ctx.stop_timer(timer);
            let timer = ctx.start_repeating(self.progress_rate);
            if !self.in_progress {
                ctx.pause_timer(timer);
            }
            self.timer = Some(timer);
        }
        ctx.emit_progress(ProgressChange::ProgressRate(self.progress_rate));
    }

    /// Sets the per-tick increment, floored at 0.001.
    pub fn set_progress_amount(&mut self, ctx: &mut EffectContext<'_>, value: f32) {
        self.progress_amount = value.max(Self::MIN_AMOUNT);
        ctx.emit_progress(ProgressChange::ProgressAmount(self.progress_amount));
    }

    /// Pauses or resumes accumulation without losing progress.
    pub fn set_in_progress(&mut self, ctx: &mut EffectContext<'_>, value: bool) {
        self.in_progress = value;
        if let Some(timer) = self.timer {
            if value {
                ctx.resume_timer(timer);
            } else {
                ctx.pause_timer(timer);
            }
        }
        ctx.emit_progress(ProgressChange::InProgress(value));
    }
}

impl<H: ProgressHandler> EffectBehavior for ProgressEffect<H> {
    fn work(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(timer) = self.timer.take() {
            ctx.stop_timer(timer);
        }
        self.in_progress = true;
        ctx.emit_progress(ProgressChange::InProgress(true));
        self.timer = Some(ctx.start_repeating(self.progress_rate));
    }

    fn end_work(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(timer) = self.timer.take() {
            ctx.stop_timer(timer);
        }
    }

    fn on_timer(&mut self, ctx: &mut EffectContext<'_>, handle: TimerHandle) {
        if self.timer != Some(handle) || !self.in_progress {
            return;
        }
        let increment = self.handler.increment(ctx, self.progress_amount);
        self.set_current_progress(ctx, self.current_progress + increment);
    }
}
