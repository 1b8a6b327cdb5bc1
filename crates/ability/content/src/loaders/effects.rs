//! Effect catalog loader.

use std::path::Path;

use ability_core::EffectClass;
use serde::{Deserialize, Serialize};

use crate::definitions::EffectDefinition;
use crate::loaders::{LoadResult, read_file};

/// Effect catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectCatalog {
    pub effects: Vec<EffectDefinition>,
    /// Extra `(child, parent)` declarations for abstract groups.
    #[serde(default)]
    pub parents: Vec<(EffectClass, EffectClass)>,
}

/// Loader for effect catalog from RON files.
pub struct EffectLoader;

impl EffectLoader {
    pub fn load(path: &Path) -> LoadResult<EffectCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EffectCatalog> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse effect catalog RON: {}", e))
    }
}
