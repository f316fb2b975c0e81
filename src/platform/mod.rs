//! Operating-system access used by the launcher and the version detector.
//!
//! Everything the crate needs from the OS goes through [`ProcessHost`], so the
//! detection state machine can be driven by fixtures in tests.
//! [`SystemHost`] is the real implementation: sysinfo for processes, Win32
//! `EnumWindows` for window titles.

mod system;
#[cfg(windows)]
mod windows;

pub use system::SystemHost;

use anyhow::Result;
use camino::Utf8Path;

/// Process and window capabilities of the host OS.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessHost {
    /// PIDs of running processes whose executable name equals `exe_name`.
    fn list_processes_by_name(&self, exe_name: &str) -> Vec<u32>;

    /// Titles of all top-level windows.
    fn list_window_titles(&self) -> Result<Vec<String>>;

    /// Forcibly terminate every process named `exe_name`; returns how many were killed.
    fn kill_processes_by_name(&self, exe_name: &str) -> usize;

    /// Start `exe` without waiting for it.
    fn launch_process(&self, exe: &Utf8Path) -> Result<()>;

    /// Show `path` in the platform file explorer.
    fn open_in_file_explorer(&self, path: &Utf8Path) -> Result<()>;
}
