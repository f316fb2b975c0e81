//! Environment overrides for config.yaml.
//!
//! Kept in its own test binary because it mutates the process environment.

use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;
use yuzu_manager::ConfigManager;

#[test]
fn test_env_overrides_file_values() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let store = ConfigManager::new(&root).unwrap();
    fs::write(
        store.app_config_path(),
        "yuzu:\n  yuzu_path: E:/Emu/Eden\nsetting:\n  other:\n    rename_yuzu_to_cemu: false\n",
    )
    .unwrap();

    // SAFETY: this is the only test in this binary
    unsafe {
        std::env::set_var("YUZU_MANAGER__SETTING__OTHER__RENAME_YUZU_TO_CEMU", "true");
    }

    let config = store.load_app_config().unwrap();
    assert!(config.setting.other.rename_yuzu_to_cemu);
    assert_eq!(config.yuzu.yuzu_path, Utf8PathBuf::from("E:/Emu/Eden"));

    unsafe {
        std::env::remove_var("YUZU_MANAGER__SETTING__OTHER__RENAME_YUZU_TO_CEMU");
    }
}
