mod schema;

pub use schema::{Config, RemediationConfig, SelectionConfig, ValidationConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/quiz-warden/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Could not determine home directory");
    home.join(".config").join("quiz-warden")
}

/// Get the default config file path (~/.config/quiz-warden/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory at {}",
                config_dir.display()
            )
        })?;
    }
    Ok(())
}

/// Load configuration from a YAML file.
///
/// Every setting has a default, so a missing file simply yields the default
/// config. An explicitly passed path that does not exist is still an error:
/// the operator asked for something specific.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path(), false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Write a default config file, refusing to clobber an existing one.
pub fn write_default_config(path: Option<PathBuf>) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);
    if config_path.exists() {
        anyhow::bail!("Config already exists at {}", config_path.display());
    }

    let yaml = serde_saphyr::to_string(&Config::default())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        // An explicit missing path errors...
        assert!(load_config(Some(dir.path().join("absent.yaml"))).is_err());
        // ...while defaults carry the documented values.
        let config = Config::default();
        assert_eq!(config.validation.min_text_length, 20);
        assert_eq!(config.remediation.batch_size, 25);
        assert_eq!(config.selection.used_window_minutes, 60);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "remediation:\n  batch_size: 10\n  batch_delay_ms: 50\n").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.remediation.batch_size, 10);
        assert_eq!(config.remediation.batch_delay_ms, 50);
        assert_eq!(config.validation.min_text_length, 20);
    }

    #[test]
    fn test_write_default_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let written = write_default_config(Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let config = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.remediation.batch_size, 25);

        // Refuses to overwrite.
        assert!(write_default_config(Some(path)).is_err());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "validation: [not a map").unwrap();
        assert!(load_config(Some(path)).is_err());
    }
}
