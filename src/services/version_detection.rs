//! Version detection by launching the emulator and reading its window title.
//!
//! yuzu and its forks put the build version in the main window title:
//!
//! | Title                       | Version  | Branch     |
//! |-----------------------------|----------|------------|
//! | `yuzu Early Access 4176`    | `4176`   | `ea`       |
//! | `yuzu 1734`                 | `1734`   | `mainline` |
//! | `Eden \| v0.0.3`            | `v0.0.3` | `eden`     |
//!
//! [`VersionDetector::detect`] starts the executable, polls the window list a
//! bounded number of times, then kills every instance of the executable and
//! records the result.

use crate::context::ManagerContext;
use crate::models::Branch;
use crate::notify::Notifier;
use crate::platform::ProcessHost;
use crate::services::paths::{PRIMARY_EXE, PathResolver};
use anyhow::Result;
use camino::Utf8PathBuf;
use std::time::Duration;

/// Default number of window-list polls before giving up.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

/// Default delay before each poll.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Title prefixes, most specific first.
const TITLE_PREFIXES: &[(&str, Branch)] = &[
    ("yuzu Early Access ", Branch::EarlyAccess),
    ("yuzu ", Branch::Mainline),
    ("Eden | ", Branch::Eden),
];

/// Version and branch read from a window title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedVersion {
    pub version: String,
    pub branch: Branch,
}

/// Result of a detection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// A recognizable window appeared; config now records it
    Detected(DetectedVersion),
    /// No window matched before the poll limit; config cleared
    NotDetected,
    /// The executable does not exist; config cleared
    ExecutableMissing(Utf8PathBuf),
    /// The emulator is already running; nothing was changed
    Busy { pids: Vec<u32> },
}

impl DetectionOutcome {
    pub fn version(&self) -> Option<&str> {
        match self {
            DetectionOutcome::Detected(d) => Some(&d.version),
            _ => None,
        }
    }
}

/// Parse a window title into version and branch.
///
/// A bare prefix (e.g. `"Eden | "` while the window is still loading) has no
/// version and does not count.
pub fn parse_window_title(title: &str) -> Option<DetectedVersion> {
    TITLE_PREFIXES.iter().find_map(|(prefix, branch)| {
        title
            .strip_prefix(prefix)
            .filter(|version| !version.is_empty())
            .map(|version| DetectedVersion {
                version: version.to_string(),
                branch: *branch,
            })
    })
}

/// Drives the launch / poll / kill cycle.
#[derive(Debug, Clone)]
pub struct VersionDetector {
    attempts: u32,
    interval: Duration,
}

impl Default for VersionDetector {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl VersionDetector {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Detect the installed version and persist it.
    ///
    /// Errors only come from saving the configuration; window enumeration
    /// failures are logged and count as a timeout.
    pub async fn detect(
        &self,
        ctx: &mut ManagerContext,
        host: &dyn ProcessHost,
        notifier: &dyn Notifier,
    ) -> Result<DetectionOutcome> {
        let emulator = ctx.emulator().emulator_name();
        notifier.notify(&format!("Detecting {} version...", emulator));

        let exe_path = PathResolver::new(&ctx.config).exe_path();
        if !exe_path.exists() {
            notifier.notify(&format!("Could not find the {} executable", emulator));
            ctx.emulator_mut().clear_installed();
            ctx.save()?;
            return Ok(DetectionOutcome::ExecutableMissing(exe_path));
        }

        let exe_name = exe_path.file_name().unwrap_or(PRIMARY_EXE).to_string();
        let pids = host.list_processes_by_name(&exe_name);
        if !pids.is_empty() {
            tracing::info!("{} pid={:?} is running.", exe_name, pids);
            notifier.notify(&format!("{} is running, please close it first.", emulator));
            return Ok(DetectionOutcome::Busy { pids });
        }

        notifier.notify(&format!("Starting {}...", emulator));
        let detected = match host.launch_process(&exe_path) {
            Ok(()) => self.poll_window_titles(host).await,
            Err(e) => {
                tracing::error!("Failed to launch {}: {:#}", exe_path, e);
                None
            }
        };

        host.kill_processes_by_name(&exe_name);

        let config = ctx.emulator_mut();
        let outcome = match detected {
            Some(found) => {
                tracing::info!("current version: {}, branch: {}", found.version, found.branch);
                notifier.notify(&format!(
                    "Current {} version [{}]",
                    found.branch.emulator_name(),
                    found.version
                ));
                config.set_installed(found.version.clone(), found.branch);
                DetectionOutcome::Detected(found)
            }
            None => {
                notifier.notify(&format!(
                    "Detection failed! No {} window was found...",
                    emulator
                ));
                config.clear_installed();
                DetectionOutcome::NotDetected
            }
        };
        ctx.save()?;

        Ok(outcome)
    }

    async fn poll_window_titles(&self, host: &dyn ProcessHost) -> Option<DetectedVersion> {
        for attempt in 1..=self.attempts {
            tokio::time::sleep(self.interval).await;

            let titles = match host.list_window_titles() {
                Ok(titles) => titles,
                Err(e) => {
                    tracing::error!("error occur in list_window_titles: {:#}", e);
                    return None;
                }
            };

            if let Some(found) = titles.iter().find_map(|t| {
                let parsed = parse_window_title(t);
                if parsed.is_some() {
                    tracing::info!("emulator window name: {}", t);
                }
                parsed
            }) {
                return Some(found);
            }

            tracing::trace!("no emulator window yet (attempt {}/{})", attempt, self.attempts);
        }

        None
    }
}
