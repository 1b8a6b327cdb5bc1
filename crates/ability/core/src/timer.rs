//! Repeating-timer service consumed by time-based effects.
//!
//! The ability system never owns a clock. Effects register repeating timers
//! through [`TimerService`]; the host advances its scheduler and reports each
//! firing back with [`AbilitySystem::fire_timer`](crate::system::AbilitySystem::fire_timer).
//! Firings are routed by handle, so a timer is a plain token rather than a
//! stored callback.
//!
//! [`TimerManager`] is a deterministic, manually-advanced implementation used
//! by the runtime host and by tests.

use std::collections::BTreeMap;
use std::fmt;

/// Token identifying one timer registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// External scheduler contract.
pub trait TimerService {
    /// Registers a timer firing every `interval` seconds until stopped.
    fn start_repeating(&mut self, interval: f32) -> TimerHandle;

    fn stop(&mut self, handle: TimerHandle);

    fn pause(&mut self, handle: TimerHandle);

    fn resume(&mut self, handle: TimerHandle);

    /// Registered and not paused.
    fn is_active(&self, handle: TimerHandle) -> bool;

    fn is_paused(&self, handle: TimerHandle) -> bool;

    /// Registered, paused or not.
    fn exists(&self, handle: TimerHandle) -> bool {
        self.is_active(handle) || self.is_paused(handle)
    }
}

#[derive(Clone, Debug)]
struct TimerEntry {
    interval: f32,
    elapsed: f32,
    paused: bool,
}

/// Manually advanced timer scheduler.
#[derive(Clone, Debug, Default)]
pub struct TimerManager {
    timers: BTreeMap<TimerHandle, TimerEntry>,
    next_handle: u64,
    now: f64,
}

impl TimerManager {
    /// Intervals below this are raised to it so a timer cannot fire unboundedly.
    pub const MIN_INTERVAL: f32 = 0.001;

    /// Most firings one timer reports from a single [`advance`](Self::advance).
    pub const MAX_FIRINGS_PER_ADVANCE: u32 = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Total time advanced so far, in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advances the clock by `delta` seconds.
    ///
    /// Returns every firing inside the window in chronological order; a
    /// timer whose interval fits several times appears several times, up to
    /// [`MAX_FIRINGS_PER_ADVANCE`](Self::MAX_FIRINGS_PER_ADVANCE). Handles
    /// sharing an instant are ordered by registration. Non-finite deltas are
    /// ignored.
    pub fn advance(&mut self, delta: f32) -> Vec<TimerHandle> {
        if !delta.is_finite() {
            tracing::warn!(delta, "non-finite timer advance ignored");
            return Vec::new();
        }
        if delta <= 0.0 {
            return Vec::new();
        }
        self.now += f64::from(delta);

        let mut fired: Vec<(f32, TimerHandle)> = Vec::new();
        for (handle, entry) in &mut self.timers {
            if entry.paused {
                continue;
            }
            let total = entry.elapsed + delta;
            let due = (total / entry.interval).floor();
            let count = if due > Self::MAX_FIRINGS_PER_ADVANCE as f32 {
                tracing::warn!(%handle, due, "timer firings capped");
                Self::MAX_FIRINGS_PER_ADVANCE
            } else {
                due as u32
            };
            for k in 1..=count {
                fired.push((k as f32 * entry.interval - entry.elapsed, *handle));
            }
            entry.elapsed = if count == Self::MAX_FIRINGS_PER_ADVANCE {
                // Dropped firings keep the timer's phase.
                total % entry.interval
            } else {
                total - count as f32 * entry.interval
            };
        }

        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, handle)| handle).collect()
    }
}

impl TimerService for TimerManager {
    fn start_repeating(&mut self, interval: f32) -> TimerHandle {
        let interval = if interval.is_nan() || interval < Self::MIN_INTERVAL {
            tracing::warn!(interval, "timer interval raised to minimum");
            Self::MIN_INTERVAL
        } else {
            interval
        };

        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.timers.insert(
            handle,
            TimerEntry {
                interval,
                elapsed: 0.0,
                paused: false,
            },
        );
        tracing::trace!(%handle, interval, "timer started");
        handle
    }

    fn stop(&mut self, handle: TimerHandle) {
        if self.timers.remove(&handle).is_some() {
            tracing::trace!(%handle, "timer stopped");
        }
    }

    fn pause(&mut self, handle: TimerHandle) {
        if let Some(entry) = self.timers.get_mut(&handle) {
            entry.paused = true;
        }
    }

    fn resume(&mut self, handle: TimerHandle) {
        if let Some(entry) = self.timers.get_mut(&handle) {
            entry.paused = false;
        }
    }

    fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.get(&handle).is_some_and(|entry| !entry.paused)
    }

    fn is_paused(&self, handle: TimerHandle) -> bool {
        self.timers.get(&handle).is_some_and(|entry| entry.paused)
    }

    fn exists(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }
}
