//! Text rendering for bus events and HUD snapshots.

use std::fmt::Write;

use ability_core::{AbilityEvent, AttributeSignal, ProgressChange};
use ability_runtime::{EntityEvent, Event, HudSnapshot, LifecycleEvent};

/// One line per event, prefixed with the simulated clock.
pub fn event_line(clock: f32, event: &Event) -> String {
    let body = match event {
        Event::Lifecycle(LifecycleEvent::Ready(entity)) => format!("{entity} ready"),
        Event::Lifecycle(LifecycleEvent::Ending(entity)) => format!("{entity} ending"),
        Event::Ability(EntityEvent { entity, event }) => format!("{entity} {}", describe(event)),
    };
    format!("[{clock:>7.2}s] {body}")
}

fn describe(event: &AbilityEvent) -> String {
    match event {
        AbilityEvent::Attribute { attribute, signal } => match signal {
            AttributeSignal::ValueChanged(value) => format!("{attribute} = {value:.2}"),
            AttributeSignal::MaxValueChanged(value) => format!("{attribute} max = {value:.2}"),
            AttributeSignal::MinValueChanged(value) => format!("{attribute} min = {value:.2}"),
            AttributeSignal::ReachedMax => format!("{attribute} reached max"),
            AttributeSignal::ReachedMin => format!("{attribute} reached min"),
            AttributeSignal::MultiplierAdded(id) => format!("{attribute} +multiplier {id}"),
            AttributeSignal::MultiplierRemoved(id) => format!("{attribute} -multiplier {id}"),
        },
        AbilityEvent::EffectStarted(info) => format!("+ {} ({})", info.class, info.id),
        AbilityEvent::EffectEnded(info) => format!("- {} ({})", info.class, info.id),
        AbilityEvent::ClientEffectEnded(info) => format!("  client ended {}", info.id),
        AbilityEvent::Progress { effect, change } => {
            let change = match change {
                ProgressChange::CurrentProgress(value) => format!("current {value:.2}"),
                ProgressChange::NeedProgress(value) => format!("need {value:.2}"),
                ProgressChange::ProgressRate(value) => format!("rate {value:.3}"),
                ProgressChange::ProgressAmount(value) => format!("amount {value:.3}"),
                ProgressChange::InProgress(running) => format!("in progress {running}"),
            };
            format!("{} progress {change}", effect.id)
        }
    }
}

/// Fixed-width HUD table.
pub fn snapshot_table(snapshot: &HudSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", snapshot.entity);
    for attribute in &snapshot.attributes {
        let _ = writeln!(
            out,
            "  {:<12} {:>8.2} / {:<8.2}",
            attribute.display_name, attribute.value, attribute.max_value
        );
    }
    for effect in snapshot.effects.iter().filter(|effect| effect.displayable) {
        let icon = effect.icon.as_deref().unwrap_or("-");
        let _ = writeln!(out, "  [{}] {} ({icon})", effect.id, effect.display_name);
    }
    out
}

#[cfg(test)]
mod tests {
    use ability_core::{AttributeData, Color, EffectData, EffectId, EffectInfo};
    use ability_runtime::EntityId;

    use super::*;

    #[test]
    fn test_event_lines_carry_clock_and_entity() {
        let event = Event::Ability(EntityEvent {
            entity: EntityId(4),
            event: AbilityEvent::EffectStarted(EffectInfo::new(EffectId::new(2), "poison".into())),
        });
        assert_eq!(event_line(1.5, &event), "[   1.50s] entity#4 + poison (effect#2)");
    }

    #[test]
    fn test_snapshot_table_hides_undisplayable_effects() {
        let snapshot = HudSnapshot {
            entity: EntityId(1),
            attributes: vec![AttributeData {
                class: "health".into(),
                display_name: "Health".into(),
                value: 80.0,
                max_value: 100.0,
            }],
            effects: vec![
                EffectData {
                    id: EffectId::new(1),
                    class: "haste".into(),
                    display_name: "Haste".into(),
                    displayable: true,
                    icon: Some("icons/haste.png".into()),
                    color: Color::WHITE,
                },
                EffectData {
                    id: EffectId::new(2),
                    class: "strike".into(),
                    display_name: "Strike".into(),
                    displayable: false,
                    icon: None,
                    color: Color::WHITE,
                },
            ],
        };

        let table = snapshot_table(&snapshot);
        assert!(table.contains("Health"));
        assert!(table.contains("Haste (icons/haste.png)"));
        assert!(!table.contains("Strike"));
    }
}
