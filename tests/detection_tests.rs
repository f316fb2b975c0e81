//! Integration tests for version detection
//!
//! These tests drive [`VersionDetector`] against a scripted process host and
//! check what ends up in config.yaml.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::{Cell, RefCell};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use yuzu_manager::notify::RecordingNotifier;
use yuzu_manager::platform::ProcessHost;
use yuzu_manager::services::version_detection::parse_window_title;
use yuzu_manager::services::{DetectionOutcome, VersionDetector};
use yuzu_manager::{AppConfig, Branch, ConfigManager, History, ManagerContext};

/// Host whose window list changes after a fixed number of polls.
struct ScriptedHost {
    titles_after: u32,
    title: &'static str,
    polls: Cell<u32>,
    killed: RefCell<Vec<String>>,
}

impl ScriptedHost {
    fn new(titles_after: u32, title: &'static str) -> Self {
        Self {
            titles_after,
            title,
            polls: Cell::new(0),
            killed: RefCell::new(Vec::new()),
        }
    }
}

impl ProcessHost for ScriptedHost {
    fn list_processes_by_name(&self, _name: &str) -> Vec<u32> {
        Vec::new()
    }

    fn list_window_titles(&self) -> Result<Vec<String>> {
        self.polls.set(self.polls.get() + 1);
        if self.polls.get() > self.titles_after {
            Ok(vec!["Desktop".to_string(), self.title.to_string()])
        } else {
            Ok(vec!["Desktop".to_string()])
        }
    }

    fn kill_processes_by_name(&self, name: &str) -> usize {
        self.killed.borrow_mut().push(name.to_string());
        1
    }

    fn launch_process(&self, _path: &Utf8Path) -> Result<()> {
        Ok(())
    }

    fn open_in_file_explorer(&self, _path: &Utf8Path) -> Result<()> {
        Ok(())
    }
}

fn context(temp: &TempDir, exe: Option<&str>) -> ManagerContext {
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
    let install = root.join("yuzu");
    fs::create_dir_all(&install).unwrap();
    if let Some(exe) = exe {
        fs::write(install.join(exe), b"").unwrap();
    }
    let mut config = AppConfig::default();
    config.yuzu.yuzu_path = install;
    ManagerContext::new(ConfigManager::new(root.join("cfg")).unwrap(), config, History::default())
}

#[tokio::test(start_paused = true)]
async fn test_early_access_title_is_recorded() {
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, Some("yuzu.exe"));
    let host = ScriptedHost::new(4, "yuzu Early Access 4176");

    let outcome = VersionDetector::default()
        .detect(&mut ctx, &host, &RecordingNotifier::new())
        .await
        .unwrap();

    assert_eq!(outcome.version(), Some("4176"));
    assert_eq!(host.polls.get(), 5);
    assert_eq!(*host.killed.borrow(), vec!["yuzu.exe".to_string()]);

    let saved = ctx.store().load_app_config().unwrap();
    assert_eq!(saved.yuzu.yuzu_version.as_deref(), Some("4176"));
    assert_eq!(saved.yuzu.branch, Some(Branch::EarlyAccess));
}

#[tokio::test(start_paused = true)]
async fn test_polling_is_bounded() {
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, Some("yuzu.exe"));
    let host = ScriptedHost::new(u32::MAX, "never");

    let outcome = VersionDetector::new(7, Duration::from_secs(1))
        .detect(&mut ctx, &host, &RecordingNotifier::new())
        .await
        .unwrap();

    assert_eq!(outcome, DetectionOutcome::NotDetected);
    assert_eq!(host.polls.get(), 7);
    assert_eq!(host.killed.borrow().len(), 1);
}

#[tokio::test]
async fn test_missing_executable_clears_version_and_branch() {
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp, None);
    ctx.config.yuzu.set_installed("1734", Branch::Mainline);
    let host = ScriptedHost::new(0, "yuzu 1734");
    let notifier = RecordingNotifier::new();

    let outcome = VersionDetector::default()
        .detect(&mut ctx, &host, &notifier)
        .await
        .unwrap();

    assert!(matches!(outcome, DetectionOutcome::ExecutableMissing(_)));
    assert_eq!(host.polls.get(), 0);
    let saved = ctx.store().load_app_config().unwrap();
    assert!(saved.yuzu.yuzu_version.is_none());
    assert!(saved.yuzu.branch.is_none());
    assert!(!notifier.messages().is_empty());
}

#[test]
fn test_title_prefix_precedence() {
    // "yuzu Early Access" must win over the plain "yuzu " prefix
    let ea = parse_window_title("yuzu Early Access 1").unwrap();
    assert_eq!(ea.branch, Branch::EarlyAccess);
    assert_eq!(ea.version, "1");
    assert!(parse_window_title("eden | v1").is_none());
}
