/// Database URL resolution and connection management
pub mod database;

/// Bootstrap layout and project seed values from bootstrap.toml
pub mod project;

pub use project::{BootstrapConfig, DatabaseLayout, ProjectConfig, load_config, load_default_config};
