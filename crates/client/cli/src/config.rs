//! Simulator configuration.
use std::env;
use std::path::PathBuf;

/// Settings the command line does not cover.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Directory holding `attributes.ron`, `effects.ron` and `config.toml`.
    pub content_dir: PathBuf,
    /// Print snapshots as JSON instead of tables.
    pub json: bool,
    /// Per-topic bus capacity.
    pub event_buffer_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("crates/ability/content/data"),
            json: false,
            event_buffer_size: 256,
        }
    }
}

impl SimConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ABILITY_CONTENT_DIR` - Content directory
    /// - `ABILITY_EVENT_BUFFER` - Per-topic bus capacity (default: 256)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("ABILITY_CONTENT_DIR") {
            config.content_dir = dir;
        }
        if let Some(size) = read_env::<usize>("ABILITY_EVENT_BUFFER") {
            config.event_buffer_size = size.max(16);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
