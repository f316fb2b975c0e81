//! Starting the emulator and managing its install location.

use crate::context::ManagerContext;
use crate::error::InstallError;
use crate::models::EmulatorConfig;
use crate::notify::Notifier;
use crate::platform::ProcessHost;
use crate::services::paths::PathResolver;
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, OpenOptions};

/// File dropped into the keys folder to tell the user what goes there.
pub const KEYS_HINT_FILE: &str = "put prod.keys in this folder.txt";

/// Result of [`update_yuzu_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathUpdate {
    Changed(Utf8PathBuf),
    /// The new path resolves to the current install dir
    Unchanged,
}

/// Launch the configured emulator.
pub fn start_emulator(ctx: &ManagerContext, host: &dyn ProcessHost) -> Result<Utf8PathBuf> {
    let exe = PathResolver::new(&ctx.config).exe_path();
    if !exe.exists() {
        tracing::info!("emulator not exist in [{}]", exe);
        return Err(InstallError::ExecutableMissing(exe).into());
    }

    tracing::info!("starting emulator from {}", exe);
    host.launch_process(&exe)?;
    Ok(exe)
}

/// Create the keys folder (with a hint file) and open it in the file explorer.
pub fn open_keys_folder(ctx: &ManagerContext, host: &dyn ProcessHost) -> Result<Utf8PathBuf> {
    let keys_path = PathResolver::new(&ctx.config).keys_path();
    fs::create_dir_all(&keys_path)
        .with_context(|| format!("Failed to create keys folder: {}", keys_path))?;

    let hint = keys_path.join(KEYS_HINT_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&hint)
        .with_context(|| format!("Failed to create {}", hint))?;

    host.open_in_file_explorer(&absolute_utf8(&keys_path)?)?;
    Ok(keys_path)
}

/// Point the manager at a different install directory.
///
/// The current config is archived in the history; the new path picks up its
/// own history entry if it has one. Both stores are saved.
pub fn update_yuzu_path(
    ctx: &mut ManagerContext,
    new_path: &Utf8Path,
    notifier: &dyn Notifier,
) -> Result<PathUpdate> {
    if !new_path.exists() {
        tracing::info!("create directory: {}", new_path);
        fs::create_dir_all(new_path)
            .with_context(|| format!("Failed to create directory: {}", new_path))?;
    }

    let new_abs = absolute_utf8(new_path)?;
    if new_abs == absolute_utf8(&ctx.emulator().yuzu_path)? {
        tracing::info!("No different with old path, skip update.");
        return Ok(PathUpdate::Unchanged);
    }

    // history is keyed by absolute path, whatever form the config holds
    let mut current = ctx.emulator().clone();
    current.yuzu_path = absolute_utf8(&current.yuzu_path)?;
    ctx.history.add(&current);

    tracing::info!("setting emulator path to {}", new_abs);
    let mut next = ctx
        .history
        .get(new_abs.as_str())
        .cloned()
        .unwrap_or_else(|| EmulatorConfig::with_path(new_abs.clone()));
    next.yuzu_path = new_abs.clone();

    if !ctx.history.contains(new_abs.as_str()) {
        ctx.history.add(&next);
    }
    ctx.config.yuzu = next;

    ctx.save()?;
    ctx.save_history()?;
    notifier.notify(&format!("Emulator path set to {}", new_abs));

    Ok(PathUpdate::Changed(new_abs))
}

fn absolute_utf8(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let absolute = std::path::absolute(path.as_std_path())
        .with_context(|| format!("Failed to resolve {}", path))?;
    Utf8PathBuf::from_path_buf(absolute)
        .map_err(|p| anyhow!("Path is not valid UTF-8: {}", p.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::models::{AppConfig, Branch, History};
    use crate::notify::RecordingNotifier;
    use crate::platform::MockProcessHost;
    use camino::Utf8Component;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Utf8PathBuf, ManagerContext) {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let store = ConfigManager::new(root.join("cfg")).unwrap();
        let mut config = AppConfig::default();
        config.yuzu.yuzu_path = root.join("old");
        fs::create_dir_all(root.join("old")).unwrap();
        let ctx = ManagerContext::new(store, config, History::default());
        (temp, root, ctx)
    }

    #[test]
    fn test_start_missing_executable() {
        let (_temp, _root, ctx) = setup();
        let mut host = MockProcessHost::new();
        host.expect_launch_process().never();

        let err = start_emulator(&ctx, &host).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InstallError>(),
            Some(InstallError::ExecutableMissing(_))
        ));
    }

    #[test]
    fn test_start_launches_resolved_exe() {
        let (_temp, root, ctx) = setup();
        fs::write(root.join("old/eden.exe"), b"").unwrap();
        let mut host = MockProcessHost::new();
        host.expect_launch_process()
            .withf(|exe| exe.file_name() == Some("eden.exe"))
            .times(1)
            .returning(|_| Ok(()));

        let exe = start_emulator(&ctx, &host).unwrap();
        assert_eq!(exe, root.join("old/eden.exe"));
    }

    #[test]
    fn test_open_keys_folder_creates_hint() {
        let (_temp, root, ctx) = setup();
        let mut host = MockProcessHost::new();
        host.expect_open_in_file_explorer().times(1).returning(|_| Ok(()));

        let keys = open_keys_folder(&ctx, &host).unwrap();
        assert_eq!(keys, root.join("old/user/keys"));
        assert!(keys.join(KEYS_HINT_FILE).exists());
    }

    #[test]
    fn test_update_path_archives_and_restores_history() {
        let (_temp, root, mut ctx) = setup();
        ctx.config.yuzu.set_installed("v0.0.3", Branch::Eden);
        let notifier = RecordingNotifier::new();

        let new_path = root.join("new");
        let result = update_yuzu_path(&mut ctx, &new_path, &notifier).unwrap();

        assert_eq!(result, PathUpdate::Changed(new_path.clone()));
        assert!(new_path.is_dir());
        assert_eq!(ctx.config.yuzu.yuzu_path, new_path);
        assert!(ctx.config.yuzu.yuzu_version.is_none());
        assert!(ctx.history.contains(root.join("old").as_str()));
        assert!(ctx.history.contains(new_path.as_str()));

        update_yuzu_path(&mut ctx, &root.join("old"), &notifier).unwrap();
        assert_eq!(ctx.config.yuzu.yuzu_version.as_deref(), Some("v0.0.3"));
        assert_eq!(ctx.config.yuzu.branch, Some(Branch::Eden));
    }

    /// `path` spelled relative to the working directory.
    fn relative_to_cwd(path: &Utf8Path) -> Utf8PathBuf {
        let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap()).unwrap();
        let normal = |c: &Utf8Component<'_>| matches!(c, Utf8Component::Normal(_));
        let mut relative = Utf8PathBuf::new();
        for _ in cwd.components().filter(normal) {
            relative.push("..");
        }
        for component in path.components().filter(normal) {
            relative.push(component.as_str());
        }
        relative
    }

    #[test]
    fn test_relative_install_path_is_restored_from_history() {
        let (_temp, root, mut ctx) = setup();
        let relative = relative_to_cwd(&root.join("old"));
        assert!(relative.is_relative());
        ctx.config.yuzu.yuzu_path = relative.clone();
        ctx.config.yuzu.set_installed("v0.0.3", Branch::Eden);
        ctx.config.yuzu.yuzu_firmware = Some("19.0.1".to_string());
        let notifier = RecordingNotifier::new();

        update_yuzu_path(&mut ctx, &root.join("other"), &notifier).unwrap();
        assert!(!ctx.history.contains(relative.as_str()));

        update_yuzu_path(&mut ctx, &relative, &notifier).unwrap();
        assert_eq!(ctx.config.yuzu.yuzu_version.as_deref(), Some("v0.0.3"));
        assert_eq!(ctx.config.yuzu.yuzu_firmware.as_deref(), Some("19.0.1"));
        assert_eq!(ctx.history.yuzu_history.len(), 2);
    }

    #[test]
    fn test_update_same_path_is_unchanged() {
        let (_temp, root, mut ctx) = setup();
        let result = update_yuzu_path(&mut ctx, &root.join("old"), &RecordingNotifier::new()).unwrap();
        assert_eq!(result, PathUpdate::Unchanged);
        assert!(ctx.history.yuzu_history.is_empty());
    }
}
