use crate::models::{AppConfig, History};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Prefix of environment variables that override `config.yaml`,
/// e.g. `YUZU_MANAGER__YUZU__YUZU_PATH=E:/Eden`.
pub const ENV_PREFIX: &str = "YUZU_MANAGER";

/// Configuration manager for the two YAML stores.
///
/// - `config.yaml`: [`AppConfig`], layered with `YUZU_MANAGER__*` environment variables
/// - `storage.yaml`: [`History`] of previously used install paths
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    app_config_path: Utf8PathBuf,
    history_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager rooted at `config_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            app_config_path: config_dir.join("config.yaml"),
            history_path: config_dir.join("storage.yaml"),
            config_dir,
        })
    }

    /// Load the application configuration.
    ///
    /// A missing file yields defaults; environment overrides apply either way.
    pub fn load_app_config(&self) -> Result<AppConfig> {
        if !self.app_config_path.exists() {
            tracing::warn!(
                "App config file not found at {}, using defaults",
                self.app_config_path
            );
        }

        let layered = config::Config::builder()
            .add_source(
                config::File::from(self.app_config_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read app config: {}", self.app_config_path))?;

        let config: AppConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse app config: {}", self.app_config_path))?;

        tracing::info!("Loaded app config from {}", self.app_config_path);
        Ok(config)
    }

    /// Save the application configuration.
    pub fn save_app_config(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize app config to YAML")?;

        fs::write(&self.app_config_path, yaml_string)
            .with_context(|| format!("Failed to write app config: {}", self.app_config_path))?;

        tracing::info!("Saved app config to {}", self.app_config_path);
        Ok(())
    }

    /// Load the install-path history, or an empty one if the file doesn't exist.
    pub fn load_history(&self) -> Result<History> {
        if !self.history_path.exists() {
            tracing::debug!("History file not found at {}", self.history_path);
            return Ok(History::default());
        }

        let file_contents = fs::read_to_string(&self.history_path)
            .with_context(|| format!("Failed to read history: {}", self.history_path))?;

        let history: History = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse history: {}", self.history_path))?;

        tracing::info!(
            "Loaded {} history entries from {}",
            history.yuzu_history.len(),
            self.history_path
        );
        Ok(history)
    }

    /// Save the install-path history.
    pub fn save_history(&self, history: &History) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(history).context("Failed to serialize history to YAML")?;

        fs::write(&self.history_path, yaml_string)
            .with_context(|| format!("Failed to write history: {}", self.history_path))?;

        tracing::debug!("Saved history to {}", self.history_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn app_config_path(&self) -> &Utf8Path {
        &self.app_config_path
    }
}
