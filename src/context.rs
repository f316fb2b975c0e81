use crate::config::ConfigManager;
use crate::models::{AppConfig, EmulatorConfig, History};
use anyhow::Result;

/// Configuration threaded through every operation.
///
/// Mutations happen in memory; nothing reaches disk until [`save`](Self::save)
/// or [`save_history`](Self::save_history) is called.
#[derive(Debug)]
pub struct ManagerContext {
    pub config: AppConfig,
    pub history: History,
    store: ConfigManager,
}

impl ManagerContext {
    /// Load both stores from `store`.
    pub fn load(store: ConfigManager) -> Result<Self> {
        let config = store.load_app_config()?;
        let history = store.load_history()?;
        Ok(Self {
            config,
            history,
            store,
        })
    }

    pub fn new(store: ConfigManager, config: AppConfig, history: History) -> Self {
        Self {
            config,
            history,
            store,
        }
    }

    pub fn emulator(&self) -> &EmulatorConfig {
        &self.config.yuzu
    }

    pub fn emulator_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config.yuzu
    }

    /// Persist the application config.
    pub fn save(&self) -> Result<()> {
        self.store.save_app_config(&self.config)
    }

    /// Persist the install-path history.
    pub fn save_history(&self) -> Result<()> {
        self.store.save_history(&self.history)
    }

    pub fn store(&self) -> &ConfigManager {
        &self.store
    }
}
