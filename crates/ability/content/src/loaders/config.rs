//! Initial-list configuration loader.

use std::path::Path;

use ability_core::AbilityConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for per-entity initial lists from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys default to empty lists.
    pub fn load(path: &Path) -> LoadResult<AbilityConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<AbilityConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_keep_file_order() {
        let config = ConfigLoader::parse(
            r#"
            initial_attributes = ["stamina", "health"]
            initial_effects = ["regeneration"]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.initial_attributes, vec!["stamina".into(), "health".into()]);
        assert_eq!(config.initial_effects, vec!["regeneration".into()]);
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let config = ConfigLoader::parse("").expect("empty config is valid");
        assert_eq!(config, AbilityConfig::default());
    }
}
