//! Attribute catalog loader.

use std::path::Path;

use ability_core::{AttributeClass, AttributeSpec};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Attribute catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeCatalog {
    pub attributes: Vec<AttributeSpec>,
    /// Extra `(child, parent)` declarations for abstract groups.
    #[serde(default)]
    pub parents: Vec<(AttributeClass, AttributeClass)>,
}

/// Loader for attribute catalog from RON files.
pub struct AttributeLoader;

impl AttributeLoader {
    pub fn load(path: &Path) -> LoadResult<AttributeCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<AttributeCatalog> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute catalog RON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omitted_fields_take_defaults() {
        let catalog = AttributeLoader::parse(
            r#"(
                attributes: [
                    (class: "health"),
                    (class: "mana", parent: Some("resource"), max_value: 50.0, default_value: 20.0),
                ],
            )"#,
        )
        .expect("valid catalog");

        let health = &catalog.attributes[0];
        assert_eq!(health.default_value, AttributeSpec::DEFAULT_VALUE);
        assert_eq!(health.max_value, AttributeSpec::DEFAULT_MAX);
        assert_eq!(health.min_value, AttributeSpec::DEFAULT_MIN);

        let mana = &catalog.attributes[1];
        assert_eq!(mana.parent, Some("resource".into()));
        assert_eq!(mana.max_value, 50.0);
        assert!(catalog.parents.is_empty());
    }
}
