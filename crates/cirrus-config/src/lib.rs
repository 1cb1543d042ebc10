//! Cirrus configuration and durable state.
//!
//! Provides TOML-based configuration for the assistant and AWS defaults,
//! plus the small JSON key-value store the AWS session is persisted in.
//! All config sections use sensible defaults so partial configs work out
//! of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cirrus_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod state_store;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use schema::{CirrusConfig, CONFIG_SCHEMA_VERSION};
pub use state_store::{default_state_path, JsonFileStore, KeyValueStore, MemoryStore};
pub use toml_writer::{save_config, save_config_to_path};

use cirrus_common::ConfigError;

/// Load config from the platform default path and validate it.
pub fn load_config() -> Result<CirrusConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path (the `--config` override).
pub fn load_config_from(path: &std::path::Path) -> Result<CirrusConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &CirrusConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
