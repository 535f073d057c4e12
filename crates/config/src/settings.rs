//! Planner Settings
//!
//! Layered loading with the `config` crate:
//! 1. embedded defaults (`data/settings.yaml`)
//! 2. an optional settings file (YAML, JSON or TOML by extension)
//! 3. environment variables, `HOTEL_PLANNER__POLICY__DEFAULT_TIER=B`

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::constants::env;
use crate::domain::{CityTable, PolicyConfig};
use crate::prompts::{Language, TemplateRenderer};
use crate::ConfigError;

const DEFAULT_SETTINGS: &str = include_str!("../data/settings.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub language: Language,
    /// City table file; the built-in table is used when absent
    #[serde(default)]
    pub cities_path: Option<PathBuf>,
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Question template overrides keyed by question tag
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            cities_path: None,
            policy: PolicyConfig::default(),
            templates: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, env::PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Yaml));

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(
                    path.display().to_string(),
                    "no such file".to_string(),
                ));
            }
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator(env::SEPARATOR)
                    .separator(env::SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::info!(
            language = %settings.language,
            cities_path = ?settings.cities_path,
            default_tier = %settings.policy.default_tier,
            "Loaded settings"
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()
    }

    /// City table from `cities_path`, or the built-in one
    pub fn city_table(&self) -> Result<CityTable, ConfigError> {
        match &self.cities_path {
            Some(path) => CityTable::load(path),
            None => CityTable::builtin(),
        }
    }

    pub fn renderer(&self) -> TemplateRenderer {
        TemplateRenderer::new(self.language).with_overrides(&self.templates)
    }
}
