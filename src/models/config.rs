use crate::models::Branch;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Application configuration from config.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub yuzu: EmulatorConfig,

    #[serde(default)]
    pub setting: Settings,
}

/// State of one emulator install.
///
/// `yuzu_version` and `branch` are only changed together through
/// [`set_installed`](Self::set_installed) and [`clear_installed`](Self::clear_installed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmulatorConfig {
    #[serde(default = "default_yuzu_path")]
    pub yuzu_path: Utf8PathBuf,

    #[serde(default)]
    pub yuzu_version: Option<String>,

    #[serde(default)]
    pub yuzu_firmware: Option<String>,

    #[serde(default)]
    pub branch: Option<Branch>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            yuzu_path: default_yuzu_path(),
            yuzu_version: None,
            yuzu_firmware: None,
            branch: None,
        }
    }
}

impl EmulatorConfig {
    pub fn with_path(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            yuzu_path: path.into(),
            ..Self::default()
        }
    }

    pub fn set_installed(&mut self, version: impl Into<String>, branch: Branch) {
        self.yuzu_version = Some(version.into());
        self.branch = Some(branch);
    }

    pub fn clear_installed(&mut self) {
        self.yuzu_version = None;
        self.branch = None;
    }

    /// Display name of the configured emulator ("eden" or "yuzu").
    pub fn emulator_name(&self) -> &'static str {
        self.branch.map(|b| b.emulator_name()).unwrap_or("yuzu")
    }
}

fn default_yuzu_path() -> Utf8PathBuf {
    Utf8PathBuf::from("D:/Yuzu")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub download: DownloadSettings,

    #[serde(default)]
    pub other: OtherSettings,

    #[serde(default)]
    pub network: NetworkSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Remove the downloaded archive once it has been installed
    #[serde(default = "default_true")]
    pub auto_delete_after_install: bool,

    /// Prefix that replaces `https://github.com/` in asset URLs
    #[serde(default)]
    pub github_download_mirror: Option<String>,

    /// Where archives are downloaded to; the OS temp dir when unset
    #[serde(default)]
    pub download_dir: Option<Utf8PathBuf>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            auto_delete_after_install: true,
            github_download_mirror: None,
            download_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OtherSettings {
    #[serde(default)]
    pub rename_yuzu_to_cemu: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(default = "default_api_base")]
    pub release_api_base: String,

    #[serde(default = "default_release_repo")]
    pub release_repo: String,

    #[serde(default = "default_commit_repo")]
    pub commit_repo: String,

    #[serde(default)]
    pub github_token: Option<String>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            release_api_base: default_api_base(),
            release_repo: default_release_repo(),
            commit_repo: default_commit_repo(),
            github_token: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_release_repo() -> String {
    "eden-emulator/Releases".to_string()
}

fn default_commit_repo() -> String {
    "yuzu-emu/yuzu".to_string()
}

/// Past emulator configs keyed by absolute install path, from storage.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub yuzu_history: IndexMap<String, EmulatorConfig>,
}

impl History {
    /// Record `config` under its install path, replacing any earlier entry.
    pub fn add(&mut self, config: &EmulatorConfig) {
        self.yuzu_history
            .insert(config.yuzu_path.to_string(), config.clone());
    }

    pub fn get(&self, path: &str) -> Option<&EmulatorConfig> {
        self.yuzu_history.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.yuzu_history.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_settings_defaults() {
        let settings = DownloadSettings::default();
        assert!(settings.auto_delete_after_install);
        assert!(settings.github_download_mirror.is_none());
    }

    #[test]
    fn test_installed_fields_move_together() {
        let mut config = EmulatorConfig::with_path("C:/Emu");
        config.set_installed("v0.0.3", Branch::Eden);
        assert_eq!(config.yuzu_version.as_deref(), Some("v0.0.3"));
        assert_eq!(config.branch, Some(Branch::Eden));

        config.clear_installed();
        assert!(config.yuzu_version.is_none());
        assert!(config.branch.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: AppConfig = serde_yaml_ng::from_str("yuzu:\n  yuzu_path: E:/Eden\n").unwrap();
        assert_eq!(config.yuzu.yuzu_path, Utf8PathBuf::from("E:/Eden"));
        assert!(config.setting.download.auto_delete_after_install);
        assert_eq!(config.setting.network.release_repo, "eden-emulator/Releases");
    }

    #[test]
    fn test_history_add_replaces_entry() {
        let mut history = History::default();
        let mut config = EmulatorConfig::with_path("C:/Emu");
        history.add(&config);
        config.yuzu_firmware = Some("19.0.1".to_string());
        history.add(&config);

        assert_eq!(history.yuzu_history.len(), 1);
        assert_eq!(
            history.get("C:/Emu").unwrap().yuzu_firmware.as_deref(),
            Some("19.0.1")
        );
    }
}
