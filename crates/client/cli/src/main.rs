//! `ability-sim`: replays a scenario script against bundled ability content.
//!
//! # Examples
//!
//! ```bash
//! cargo run -p ability-cli -- --script crates/client/cli/scripts/poison_and_ward.ron
//! RUST_LOG=ability_core=debug cargo run -p ability-cli -- --script my.ron --json
//! ```

use std::path::PathBuf;

use ability_cli::{ScriptLoader, SimConfig, run_script};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Ability scenario simulator
#[derive(Parser)]
#[command(name = "ability-sim")]
#[command(about = "Replay ability scenarios against content data", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario script (RON)
    #[arg(short, long)]
    script: PathBuf,

    /// Content directory (overrides ABILITY_CONTENT_DIR)
    #[arg(short, long)]
    content: Option<PathBuf>,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "ability_core=trace"
    #[arg(long)]
    log: Option<String>,

    /// Print snapshots as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.log.as_deref())?;

    let mut config = SimConfig::from_env();
    if let Some(content) = cli.content {
        config.content_dir = content;
    }
    config.json = cli.json;

    let script = ScriptLoader::load(&cli.script)?;
    tracing::info!(
        script = %cli.script.display(),
        content = %config.content_dir.display(),
        "starting simulation"
    );

    let mut stdout = std::io::stdout().lock();
    run_script(&config, script, &mut stdout).await
}

fn setup_logging(filter: Option<&str>) -> Result<()> {
    let env_filter = match filter {
        Some(filter) => EnvFilter::try_new(filter)?,
        None => EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
