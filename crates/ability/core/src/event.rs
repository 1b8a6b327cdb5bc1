//! Notifications produced for UI, AI and network collaborators.
//!
//! The orchestrator owns one [`Notifier`] holding an ordered observer list.
//! Observers are invoked synchronously, in subscription order, at the moment
//! an event is raised. They receive events by reference and cannot reach back
//! into the orchestrator, so a notification pass never re-enters it.

use std::sync::{Arc, Mutex, PoisonError};

use crate::attribute::AttributeSignal;
use crate::class::AttributeClass;
use crate::effect::{EffectInfo, ProgressChange};

/// Everything an entity's ability system reports to the outside.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityEvent {
    /// Re-broadcast of a signal raised by one attribute.
    Attribute {
        attribute: AttributeClass,
        signal: AttributeSignal,
    },
    /// Raised after existing effects saw the newcomer and before it begins work.
    EffectStarted(EffectInfo),
    /// Raised after the other effects were told about the removal.
    EffectEnded(EffectInfo),
    /// Client-visible echo of [`AbilityEvent::EffectEnded`].
    ClientEffectEnded(EffectInfo),
    /// A progress effect changed one of its fields.
    Progress {
        effect: EffectInfo,
        change: ProgressChange,
    },
}

impl AbilityEvent {
    pub fn is_attribute(&self) -> bool {
        matches!(self, Self::Attribute { .. })
    }

    /// Effect the event concerns, if any.
    pub fn effect(&self) -> Option<&EffectInfo> {
        match self {
            Self::Attribute { .. } => None,
            Self::EffectStarted(info) | Self::EffectEnded(info) | Self::ClientEffectEnded(info) => {
                Some(info)
            }
            Self::Progress { effect, .. } => Some(effect),
        }
    }
}

/// Receives ability events.
pub trait AbilityObserver: Send {
    fn on_event(&mut self, event: &AbilityEvent);
}

impl<F> AbilityObserver for F
where
    F: FnMut(&AbilityEvent) + Send,
{
    fn on_event(&mut self, event: &AbilityEvent) {
        self(event)
    }
}

/// Handle returned by [`Notifier::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u32);

/// Ordered observer list.
#[derive(Default)]
pub struct Notifier {
    observers: Vec<(ObserverId, Box<dyn AbilityObserver>)>,
    next_id: u32,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl AbilityObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn emit(&mut self, event: AbilityEvent) {
        tracing::trace!(?event, "ability event");
        for (_, observer) in &mut self.observers {
            observer.on_event(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// Observer that records every event; clones share one log.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<AbilityEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<AbilityEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<AbilityEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn count(&self, predicate: impl Fn(&AbilityEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| predicate(event))
            .count()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl AbilityObserver for EventLog {
    fn on_event(&mut self, event: &AbilityEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::EffectClass;
    use crate::effect::EffectId;

    fn started() -> AbilityEvent {
        AbilityEvent::EffectStarted(EffectInfo::new(EffectId::new(1), EffectClass::from("poison")))
    }

    #[test]
    fn observers_run_in_subscription_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = Notifier::new();
        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            notifier.subscribe(move |_: &AbilityEvent| order.lock().unwrap().push(tag));
        }

        notifier.emit(started());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribed_observer_stops_receiving() {
        let log = EventLog::new();
        let mut notifier = Notifier::new();
        let id = notifier.subscribe(log.clone());

        notifier.emit(started());
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.emit(started());

        assert_eq!(log.events().len(), 1);
    }
}
