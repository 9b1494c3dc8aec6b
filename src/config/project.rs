//! Bootstrap configuration loading from bootstrap.toml
//!
//! The file is optional. Every field has a default matching the project's
//! standard layout, so an absent file or an empty table yields the stock
//! bootstrap: PostGIS + topology, the three data schemas, and the project
//! metadata seeds.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "BOOTSTRAP_CONFIG";

/// Config file used when `BOOTSTRAP_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "bootstrap.toml";

/// Configuration structure representing the entire bootstrap.toml file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Values seeded into `project_metadata`
    pub project: ProjectConfig,
    /// Extensions and schemas requested from the server
    pub database: DatabaseLayout,
}

/// Project-level settings stored as metadata seeds
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Human-readable project name (`project_name` seed)
    pub name: String,
    /// Project version string (`version` seed)
    pub version: String,
    /// Working coordinate system (`srid` seed), UTM 19S by default
    pub srid: i32,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Laboratorio Integrador".to_string(),
            version: "1.0.0".to_string(),
            srid: 32719,
        }
    }
}

/// Server-side objects created before the utility tables
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseLayout {
    /// Extensions enabled with `CREATE EXTENSION IF NOT EXISTS`
    pub extensions: Vec<String>,
    /// Schemas created with `CREATE SCHEMA IF NOT EXISTS`
    pub schemas: Vec<String>,
}

impl Default for DatabaseLayout {
    fn default() -> Self {
        Self {
            extensions: vec!["postgis".to_string(), "postgis_topology".to_string()],
            schemas: vec![
                "raw_data".to_string(),
                "processed_data".to_string(),
                "results".to_string(),
            ],
        }
    }
}

impl BootstrapConfig {
    /// Checks the values that end up spliced into DDL.
    ///
    /// Extension and schema names cannot be bound as parameters, so they are
    /// restricted to plain lowercase identifiers.
    ///
    /// # Errors
    /// Returns `Error::Config` on an empty project name, a non-positive SRID,
    /// or a name that is not a plain identifier.
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(Error::Config {
                message: "project.name cannot be empty".to_string(),
            });
        }
        if self.project.srid <= 0 {
            return Err(Error::Config {
                message: format!("project.srid must be positive, got {}", self.project.srid),
            });
        }
        for name in self.database.extensions.iter().chain(&self.database.schemas) {
            if !is_plain_identifier(name) {
                return Err(Error::Config {
                    message: format!("'{name}' is not a valid SQL identifier"),
                });
            }
        }
        Ok(())
    }
}

/// Lowercase ASCII letters, digits and underscores, not starting with a digit.
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.len() <= 63
}

/// Loads and validates bootstrap configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails [`BootstrapConfig::validate`]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BootstrapConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    let config: BootstrapConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration named by `BOOTSTRAP_CONFIG`, or ./bootstrap.toml.
///
/// A missing file is not an error: the built-in defaults are used instead.
pub fn load_default_config() -> Result<BootstrapConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        tracing::info!("No config file at {path}, using built-in defaults");
        let config = BootstrapConfig::default();
        config.validate()?;
        Ok(config)
    }
}
