//! Configuration Management
//!
//! Handles persistent configuration storage for armrest-inspect.

use anyhow::{Context, Result};
use armrest_model::Catalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Model type used when none is given
const DEFAULT_MODEL: &str = "Resource";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Extra catalog files loaded after the embedded definitions
    #[serde(default)]
    pub catalog_paths: Vec<PathBuf>,
    /// Model type used when --model is not given
    #[serde(default)]
    pub default_model: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("armrest-model").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective model type (CLI > config > default)
    pub fn effective_model(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// Set default model type and save
    pub fn set_default_model(&mut self, model: &str) -> Result<()> {
        self.default_model = Some(model.to_string());
        self.save()
    }

    /// Build the catalog: embedded definitions, then config files, then `extra`
    pub fn load_catalog(&self, extra: &[PathBuf]) -> Result<Catalog> {
        let mut catalog = Catalog::embedded().context("Failed to load embedded catalog")?;

        for path in self.catalog_paths.iter().chain(extra) {
            let added = load_catalog_file(&mut catalog, path)?;
            tracing::info!("Loaded {} model types from {:?}", added, path);
        }

        Ok(catalog)
    }
}

fn load_catalog_file(catalog: &mut Catalog, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {:?}", path))?;
    catalog
        .load_str(&content)
        .with_context(|| format!("Failed to load catalog {:?}", path))
}
