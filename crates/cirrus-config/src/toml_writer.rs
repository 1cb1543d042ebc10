//! Write CirrusConfig to TOML on disk.
//!
//! Writes go to a `.tmp` sibling first and are renamed into place, so a
//! crash mid-write never leaves a truncated config behind.

use std::path::Path;

use cirrus_common::ConfigError;

use crate::schema::CirrusConfig;
use crate::toml_loader::default_config_path;

/// Write config to the platform default path (`~/.config/cirrus/config.toml`).
pub fn save_config(config: &CirrusConfig) -> Result<(), ConfigError> {
    let path = default_config_path()?;
    save_config_to_path(config, &path)
}

/// Write config to a specific path, creating parent directories as needed.
pub fn save_config_to_path(config: &CirrusConfig, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::ParseError(format!("failed to serialize config to TOML: {e}")))?;

    atomic_write(path, toml_str.as_bytes()).map_err(|e| {
        ConfigError::ParseError(format!("failed to write config to {}: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), "Config saved to disk");
    Ok(())
}

/// Write `contents` to `path` through a temporary sibling file.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, contents)?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        // Rename can fail across some Windows file handles; fall back to a direct write.
        tracing::warn!("atomic rename failed ({e}), falling back to direct write");
        std::fs::write(path, contents)?;
        let _ = std::fs::remove_file(&tmp_path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = CirrusConfig::default();
        config.assistant.max_tool_rounds = 7;
        config.aws.default_region = "ap-southeast-2".into();
        save_config_to_path(&config, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: CirrusConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed.assistant.max_tool_rounds, 7);
        assert_eq!(parsed.aws.default_region, "ap-southeast-2");
        assert_eq!(parsed.assistant.model, config.assistant.model);
    }

    #[test]
    fn save_config_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("config.toml");

        save_config_to_path(&CirrusConfig::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn save_config_cleans_up_tmp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        save_config_to_path(&CirrusConfig::default(), &path).unwrap();

        let tmp_path = dir.path().join("config.toml.tmp");
        assert!(!tmp_path.exists(), "tmp file should be cleaned up after rename");
    }
}
