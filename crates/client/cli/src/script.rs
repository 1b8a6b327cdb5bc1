//! Scenario scripts.
//!
//! ```text
//! (
//!     entity: 1,
//!     steps: [
//!         AddEffect("poison"),
//!         Advance(2.5),
//!         Edit(attribute: "health", kind: Add, value: 10.0),
//!         StopEffect("poison"),
//!         Snapshot,
//!     ],
//! )
//! ```

use std::path::Path;

use ability_core::{AbilityConfig, AttributeClass, EffectClass, ModifyKind};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// One scripted action against the simulated entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    AddEffect(EffectClass),
    /// Ends the first working effect of the class.
    StopEffect(EffectClass),
    /// Ends every working effect of the class or its subclasses.
    StopAll(EffectClass),
    /// Advance the clock by this many seconds.
    Advance(f32),
    Edit {
        attribute: AttributeClass,
        kind: ModifyKind,
        value: f32,
    },
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default = "Script::default_entity")]
    pub entity: u32,
    /// Replaces the content directory's `config.toml` for this run.
    #[serde(default)]
    pub config: Option<AbilityConfig>,
    pub steps: Vec<Step>,
}

impl Script {
    fn default_entity() -> u32 {
        1
    }
}

/// Loader for scenario scripts from RON files.
pub struct ScriptLoader;

impl ScriptLoader {
    pub fn load(path: &Path) -> anyhow::Result<Script> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Script> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse script RON: {}", e))
    }
}
