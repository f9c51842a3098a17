//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use astrolabe::{AstrolabeError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for AstrolabeError {
    fn from(err: ConfigError) -> Self {
        AstrolabeError::Io(io::Error::other(err))
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (astrolabe/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, AstrolabeError> {
    // 1. An explicit --config path wins and must exist
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path:% = path.display(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Project-local config next to the working directory
    let local_config = Path::new("astrolabe/config.toml");
    if local_config.exists() {
        info!(path:% = local_config.display(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Per-user config, e.g. ~/.config/astrolabe/config.toml on Linux
    if let Some(proj_dirs) = ProjectDirs::from("com", "astrolabe", "astrolabe") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path:% = system_config.display(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path:% = system_config.display(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. Built-in defaults
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, AstrolabeError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    // [simulation] keys may be snake_case or camelCase
    let config = parse_config(&content)?;

    Ok(config)
}

fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [simulation]
            iterations = 120
            damping = 0.8
            target_range = 24.0
            stabilization_threshold = 0.05

            [worker]
            thread_name = "layout"
            event_capacity = 4
            "#,
        )
        .unwrap();

        let simulation = config.simulation_config();
        assert_eq!(simulation.iterations(), 120);
        assert_approx_eq!(f32, simulation.damping(), 0.8);
        assert_approx_eq!(f32, simulation.target_range(), 24.0);
        assert_approx_eq!(f32, simulation.stabilization_threshold(), 0.05);
        assert_eq!(config.worker().thread_name(), "layout");
        assert_eq!(config.worker().event_capacity(), 4);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.simulation_config(), AppConfig::default().simulation_config());
        assert_eq!(config.worker().thread_name(), "astrolabe-layout");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_config("[simulation\niterations = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = load_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"), "{err}");
    }

    #[test]
    fn test_explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[simulation]\niterations = 42\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.simulation_config().iterations(), 42);
    }
}
