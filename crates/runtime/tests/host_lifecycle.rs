//! Integration tests for hosting entities on the runtime.
//!
//! Uses the bundled content directory from `ability-content`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ability_content::{ContentBundle, ContentFactory};
use ability_core::{AbilityEvent, AbilityRegistry, ModifyKind};
use ability_runtime::{
    AbilityRuntime, EntityEvent, EntityHost, EntityId, Event, EventBus, LifecycleEvent,
    RuntimeConfig, RuntimeError, Topic,
};
use tokio::time::timeout;

const PLAYER: EntityId = EntityId(1);
const GOBLIN: EntityId = EntityId(2);

fn bundle() -> ContentBundle {
    let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../ability/content/data");
    ContentFactory::new(data_dir)
        .load_bundle()
        .expect("bundled content loads")
}

fn registry() -> Arc<AbilityRegistry> {
    Arc::new(bundle().registry)
}

// ============================================================================
// Synchronous host
// ============================================================================

#[test]
fn test_spawn_publishes_ready_before_initial_lists() {
    let bus = EventBus::new();
    let mut lifecycle = bus.subscribe(Topic::Lifecycle);
    let mut effects = bus.subscribe(Topic::Effect);
    let mut host = EntityHost::new(registry(), bus);

    host.spawn(PLAYER, bundle().config).expect("player spawns");

    assert_eq!(
        lifecycle.try_recv().expect("ready event"),
        Event::Lifecycle(LifecycleEvent::Ready(PLAYER))
    );
    match effects.try_recv().expect("initial effect started") {
        Event::Ability(EntityEvent {
            entity,
            event: AbilityEvent::EffectStarted(info),
        }) => {
            assert_eq!(entity, PLAYER);
            assert_eq!(info.class, "regeneration".into());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_duplicate_and_unknown_entities_are_rejected() {
    let mut host = EntityHost::new(registry(), EventBus::new());
    host.spawn(PLAYER, bundle().config).expect("player spawns");

    assert!(matches!(
        host.spawn(PLAYER, bundle().config),
        Err(RuntimeError::DuplicateEntity(PLAYER))
    ));
    assert!(matches!(
        host.add_effect(GOBLIN, &"poison".into()),
        Err(RuntimeError::UnknownEntity(GOBLIN))
    ));
    assert!(matches!(
        host.add_effect(PLAYER, &"meteor".into()),
        Err(RuntimeError::Ability(_))
    ));
}

#[test]
fn test_entities_tick_independently() {
    let mut host = EntityHost::new(registry(), EventBus::new());
    host.spawn(PLAYER, bundle().config).expect("player spawns");
    host.spawn(GOBLIN, bundle().config).expect("goblin spawns");

    host.add_effect(GOBLIN, &"poison".into()).expect("poison adds");
    host.advance(1.0);

    let health = |host: &EntityHost, entity| {
        host.system(entity)
            .expect("entity is live")
            .attribute(&"health".into())
            .expect("health is live")
            .current_value()
    };
    assert_eq!(health(&host, PLAYER), 100.0);
    assert_eq!(health(&host, GOBLIN), 95.0);
}

#[test]
fn test_despawn_stops_all_notifications() {
    let bus = EventBus::new();
    let mut attributes = bus.subscribe(Topic::Attribute);
    let mut host = EntityHost::new(registry(), bus);
    host.spawn(PLAYER, bundle().config).expect("player spawns");
    host.add_effect(PLAYER, &"poison".into()).expect("poison adds");
    while attributes.try_recv().is_ok() {}

    host.despawn(PLAYER).expect("player is live");
    host.advance(5.0);

    assert!(attributes.try_recv().is_err());
    assert!(host.is_empty());
    assert!(matches!(
        host.despawn(PLAYER),
        Err(RuntimeError::UnknownEntity(PLAYER))
    ));
}

#[test]
fn test_snapshot_encodes_to_json() {
    let mut host = EntityHost::new(registry(), EventBus::new());
    host.spawn(PLAYER, bundle().config).expect("player spawns");
    host.add_effect(PLAYER, &"haste".into()).expect("haste adds");

    let snapshot = host.snapshot(PLAYER).expect("player is live");
    assert_eq!(snapshot.attributes.len(), 4);
    assert_eq!(snapshot.effects.len(), 2);

    let json = snapshot.to_json().expect("snapshot encodes");
    assert!(json.contains("icons/haste.png"));
    assert!(json.contains("Stamina"));
}

// ============================================================================
// Async runtime
// ============================================================================

#[tokio::test]
async fn test_runtime_round_trips_commands() {
    let runtime = AbilityRuntime::start(registry(), RuntimeConfig::default());
    let handle = runtime.handle();

    handle.spawn(PLAYER, bundle().config).await.expect("player spawns");
    handle.add_effect(PLAYER, "strike").await.expect("strike adds");
    let health = handle
        .edit_attribute(PLAYER, "health", ModifyKind::Add, 5.0)
        .await
        .expect("health is live");
    assert_eq!(health, 85.0);

    let poison = handle.add_effect(PLAYER, "poison").await.expect("poison adds");
    assert_eq!(handle.advance(1.0).await.expect("worker alive"), 1);
    handle
        .stop_effect_by_id(PLAYER, poison)
        .await
        .expect("poison is live");

    let snapshot = handle.snapshot(PLAYER).await.expect("player is live");
    let health = snapshot
        .attributes
        .iter()
        .find(|data| data.class == "health".into())
        .expect("health listed");
    assert_eq!(health.value, 80.0);

    drop(handle);
    runtime.shutdown().await.expect("worker joins");
}

#[tokio::test]
async fn test_shutdown_ends_live_entities() {
    let runtime = AbilityRuntime::start(registry(), RuntimeConfig::default());
    let mut lifecycle = runtime.subscribe(Topic::Lifecycle);
    let handle = runtime.handle();
    handle.spawn(PLAYER, bundle().config).await.expect("player spawns");
    drop(handle);

    runtime.shutdown().await.expect("worker joins");

    assert_eq!(
        lifecycle.recv().await.expect("ready"),
        Event::Lifecycle(LifecycleEvent::Ready(PLAYER))
    );
    assert_eq!(
        lifecycle.recv().await.expect("ending"),
        Event::Lifecycle(LifecycleEvent::Ending(PLAYER))
    );
}

#[tokio::test(start_paused = true)]
async fn test_tick_interval_drives_timers() {
    let config = RuntimeConfig {
        tick_interval: Some(Duration::from_millis(500)),
        ..Default::default()
    };
    let runtime = AbilityRuntime::start(registry(), config);
    let mut attributes = runtime.subscribe(Topic::Attribute);
    let handle = runtime.handle();
    handle.spawn(PLAYER, bundle().config).await.expect("player spawns");
    handle.add_effect(PLAYER, "poison").await.expect("poison adds");
    while attributes.try_recv().is_ok() {}

    let event = timeout(Duration::from_secs(5), attributes.recv())
        .await
        .expect("poison ticks within the timeout")
        .expect("bus open");
    assert_eq!(event.entity(), PLAYER);

    drop(handle);
    runtime.shutdown().await.expect("worker joins");
}
