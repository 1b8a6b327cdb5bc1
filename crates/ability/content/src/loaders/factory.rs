//! Content factory for building ability registries from data files.

use std::path::{Path, PathBuf};

use ability_core::{AbilityConfig, AbilityRegistry};
use tracing::debug;

use crate::loaders::attributes::AttributeCatalog;
use crate::loaders::effects::EffectCatalog;
use crate::loaders::{AttributeLoader, ConfigLoader, EffectLoader, LoadResult};

/// Everything a host needs to start an entity.
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub registry: AbilityRegistry,
    pub config: AbilityConfig,
}

/// Content factory that loads all ability content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── attributes.ron
/// └── effects.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load per-entity initial lists from `config.toml`.
    pub fn load_config(&self) -> LoadResult<AbilityConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load attribute catalog from `attributes.ron`.
    pub fn load_attributes(&self) -> LoadResult<AttributeCatalog> {
        let path = self.data_dir.join("attributes.ron");
        AttributeLoader::load(&path)
    }

    /// Load effect catalog from `effects.ron`.
    pub fn load_effects(&self) -> LoadResult<EffectCatalog> {
        let path = self.data_dir.join("effects.ron");
        EffectLoader::load(&path)
    }

    /// Build a registry from both catalogs.
    ///
    /// Duplicate classes across the catalogs are reported as errors.
    pub fn load_registry(&self) -> LoadResult<AbilityRegistry> {
        let attributes = self.load_attributes()?;
        let effects = self.load_effects()?;
        build_registry(attributes, effects)
    }

    /// Load registry and initial lists together.
    pub fn load_bundle(&self) -> LoadResult<ContentBundle> {
        Ok(ContentBundle {
            registry: self.load_registry()?,
            config: self.load_config()?,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

pub(crate) fn build_registry(
    attributes: AttributeCatalog,
    effects: EffectCatalog,
) -> LoadResult<AbilityRegistry> {
    let mut registry = AbilityRegistry::new();

    for spec in attributes.attributes {
        registry.register_attribute(spec)?;
    }
    for (child, parent) in attributes.parents {
        registry.declare_attribute_parent(child, parent);
    }

    for definition in effects.effects {
        let factory = definition.behavior.factory();
        registry.register_effect_boxed(definition.spec, factory)?;
    }
    for (child, parent) in effects.parents {
        registry.declare_effect_parent(child, parent);
    }

    debug!(
        attributes = registry.attribute_classes().count(),
        effects = registry.effect_classes().count(),
        "built ability registry"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn test_missing_directory_reports_path() {
        let factory = ContentFactory::new("/nonexistent/ability-data");
        let err = factory.load_registry().expect_err("no files on disk");
        assert!(err.to_string().contains("attributes.ron"));
    }

    #[test]
    fn test_duplicate_effect_class_is_rejected() {
        let attributes = AttributeCatalog::default();
        let effects = EffectLoader::parse(
            r#"(
                effects: [
                    (spec: (class: "haste"), behavior: Passive(grant: None)),
                    (spec: (class: "haste"), behavior: Passive(grant: None)),
                ],
            )"#,
        )
        .expect("valid catalog");

        let err = build_registry(attributes, effects).expect_err("duplicate class");
        assert!(err.to_string().contains("haste"));
    }
}
