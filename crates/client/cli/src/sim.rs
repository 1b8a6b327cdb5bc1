//! Replays a script against one hosted entity.

use std::io::Write;
use std::sync::Arc;

use ability_content::ContentFactory;
use ability_runtime::{AbilityRuntime, EntityId, Event, HostHandle, RuntimeConfig};
use anyhow::Context;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use crate::config::SimConfig;
use crate::report;
use crate::script::{Script, Step};

/// Runs every step, printing notifications as they happen.
///
/// A failing step is reported and skipped; only content loading and output
/// errors abort the run.
pub async fn run_script(config: &SimConfig, script: Script, out: &mut impl Write) -> anyhow::Result<()> {
    let bundle = ContentFactory::new(config.content_dir.clone())
        .load_bundle()
        .with_context(|| format!("Failed to load content from {}", config.content_dir.display()))?;
    let entity_config = script.config.unwrap_or(bundle.config);
    let entity = EntityId(script.entity);

    let runtime = AbilityRuntime::start(
        Arc::new(bundle.registry),
        RuntimeConfig {
            event_buffer_size: config.event_buffer_size,
            ..Default::default()
        },
    );
    let handle = runtime.handle();
    let mut events = handle.subscribe_all();
    let mut clock = 0.0_f32;

    handle.spawn(entity, entity_config).await?;
    flush(&mut events, clock, out)?;

    info!(steps = script.steps.len(), %entity, "replaying script");
    for step in script.steps {
        if let Step::Advance(delta) = step {
            clock += delta.max(0.0);
        }
        if let Err(err) = apply(&handle, entity, step, config.json, out).await {
            warn!("step failed: {err:#}");
            writeln!(out, "! {err}")?;
        }
        flush(&mut events, clock, out)?;
    }

    handle.despawn(entity).await?;
    flush(&mut events, clock, out)?;

    drop(handle);
    runtime.shutdown().await?;
    Ok(())
}

async fn apply(
    handle: &HostHandle,
    entity: EntityId,
    step: Step,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match step {
        Step::AddEffect(class) => {
            handle.add_effect(entity, class).await?;
        }
        Step::StopEffect(class) => {
            handle.stop_effect(entity, class).await?;
        }
        Step::StopAll(class) => {
            let stopped = handle.stop_all_effects_by_class(entity, class).await?;
            info!(stopped, "stop all");
        }
        Step::Advance(delta) => {
            handle.advance(delta).await?;
        }
        Step::Edit {
            attribute,
            kind,
            value,
        } => {
            handle.edit_attribute(entity, attribute, kind, value).await?;
        }
        Step::Snapshot => {
            let snapshot = handle.snapshot(entity).await?;
            if json {
                writeln!(out, "{}", snapshot.to_json()?)?;
            } else {
                write!(out, "{}", report::snapshot_table(&snapshot))?;
            }
        }
    }
    Ok(())
}

fn flush(
    events: &mut broadcast::Receiver<Event>,
    clock: f32,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    loop {
        match events.try_recv() {
            Ok(event) => writeln!(out, "{}", report::event_line(clock, &event))?,
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "event buffer overflowed; raise ABILITY_EVENT_BUFFER");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::script::ScriptLoader;

    fn config() -> SimConfig {
        SimConfig {
            content_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../ability/content/data"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_script_prints_effect_lifecycle() {
        let script = ScriptLoader::parse(
            r#"(
                steps: [
                    AddEffect("poison"),
                    Advance(1.0),
                    StopEffect("poison"),
                    Snapshot,
                ],
            )"#,
        )
        .expect("valid script");

        let mut out = Vec::new();
        run_script(&config(), script, &mut out)
            .await
            .expect("script runs");
        let out = String::from_utf8(out).expect("utf8 output");

        assert!(out.contains("entity#1 ready"));
        assert!(out.contains("+ poison"));
        assert!(out.contains("health = 95.00"));
        assert!(out.contains("- poison"));
        assert!(out.contains("Health"));
        assert!(out.contains("entity#1 ending"));
    }

    #[tokio::test]
    async fn test_failed_step_does_not_abort() {
        let script = ScriptLoader::parse(
            r#"(
                steps: [
                    StopEffect("poison"),
                    AddEffect("strike"),
                ],
            )"#,
        )
        .expect("valid script");

        let mut out = Vec::new();
        run_script(&config(), script, &mut out)
            .await
            .expect("script runs");
        let out = String::from_utf8(out).expect("utf8 output");

        assert!(out.contains("! "));
        assert!(out.contains("health = 80.00"));
    }
}
