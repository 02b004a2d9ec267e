//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (<config dir>/bigology/config.toml)
//! 3. Project config (.bigology/config.toml)
//! 4. Environment variables (BIGOLOGY_* prefix, `__` separates sections)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{BigoError, Result};

const ENV_PREFIX: &str = "BIGOLOGY_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut files = Vec::new();

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            files.push(global_path);
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            files.push(project_path);
        }

        // e.g. BIGOLOGY_RETRY__MAX_ATTEMPTS -> retry.max_attempts
        let figment =
            Self::layered(&files).merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        Self::extract(figment)
    }

    /// Load configuration from a specific file only (defaults underneath)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Self::extract(Self::layered(&[path.to_path_buf()]))
    }

    /// Defaults with each file merged on top, later files winning
    fn layered(files: &[PathBuf]) -> Figment {
        files.iter().fold(
            Figment::new().merge(Serialized::defaults(Config::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| BigoError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (platform config dir + bigology)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "bigology").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".bigology/config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| BigoError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default global config, returning its path
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            BigoError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir, force)
    }

    /// Write the default project config, returning its path
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_config_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".bigology"));
        Self::write_default(&project_dir, force)
    }

    fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_toml())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Default config content (TOML)
    fn default_config_toml() -> String {
        r#"# Bigology Configuration
# Project settings in .bigology/config.toml override the global file.

version = "1.0"

[prompt]
max_code_chars = 1500
template = "structured"

# Applied to every provider call; only 5xx and network failures are retried
[retry]
max_attempts = 3
base_delay_ms = 600
backoff_factor = 2.0
max_delay_ms = 10000

[primary]
enabled = true
endpoint = "http://localhost:11434"
model = "claude-sonnet-4"
stream = true
timeout_secs = 120
settle_delay_ms = 1500

[fallback]
enabled = true
endpoint = "https://text.pollinations.ai"
timeout_secs = 60
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_files() {
        let config = ConfigLoader::extract(ConfigLoader::layered(&[])).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::write_default(temp_dir.path(), false).unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.prompt.max_code_chars, 1500);
        assert_eq!(config.primary.model, "claude-sonnet-4");
        assert_eq!(config.fallback.endpoint, "https://text.pollinations.ai");
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[retry]\nmax_attempts = 5\n\n[primary]\nenabled = false\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 600);
        assert!(!config.primary.enabled);
        assert!(config.fallback.enabled);
    }

    #[test]
    fn test_later_files_win() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(&global, "[prompt]\nmax_code_chars = 1000\ntemplate = \"compact\"\n").unwrap();
        fs::write(&project, "[prompt]\nmax_code_chars = 1200\n").unwrap();

        let config = ConfigLoader::extract(ConfigLoader::layered(&[global, project])).unwrap();
        assert_eq!(config.prompt.max_code_chars, 1200);
        assert_eq!(
            config.prompt.template,
            crate::config::PromptTemplate::Compact
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[retry]\nmax_attempts = 0\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(matches!(err, BigoError::Config(_)));
    }

    #[test]
    fn test_write_default_respects_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::write_default(temp_dir.path(), false).unwrap();
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::write_default(temp_dir.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        ConfigLoader::write_default(temp_dir.path(), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[retry]"));
    }
}
