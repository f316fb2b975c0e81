use super::ProcessHost;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::process::{Command, Stdio};
use sysinfo::System;

/// [`ProcessHost`] backed by the real operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }

    fn refreshed_system() -> System {
        let mut sys = System::new();
        sys.refresh_processes();
        sys
    }
}

impl ProcessHost for SystemHost {
    fn list_processes_by_name(&self, exe_name: &str) -> Vec<u32> {
        let sys = Self::refreshed_system();
        sys.processes_by_exact_name(exe_name)
            .map(|p| p.pid().as_u32())
            .collect()
    }

    fn list_window_titles(&self) -> Result<Vec<String>> {
        #[cfg(windows)]
        {
            super::windows::top_level_window_titles()
        }
        #[cfg(not(windows))]
        {
            tracing::debug!("Window enumeration is only available on Windows");
            Ok(Vec::new())
        }
    }

    fn kill_processes_by_name(&self, exe_name: &str) -> usize {
        let sys = Self::refreshed_system();
        let mut killed = 0;
        for process in sys.processes_by_exact_name(exe_name) {
            if process.kill() {
                killed += 1;
            } else {
                tracing::warn!("Failed to kill {} pid={}", exe_name, process.pid());
            }
        }
        if killed > 0 {
            tracing::info!("Killed {} instance(s) of {}", killed, exe_name);
        }
        killed
    }

    fn launch_process(&self, exe: &Utf8Path) -> Result<()> {
        let mut cmd = Command::new(exe.as_std_path());
        if let Some(dir) = exe.parent() {
            cmd.current_dir(dir.as_std_path());
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", exe))?;
        tracing::info!("Started {} pid={}", exe, child.id());
        Ok(())
    }

    fn open_in_file_explorer(&self, path: &Utf8Path) -> Result<()> {
        let opener = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };

        tracing::info!("open explorer on path {}", path);
        Command::new(opener)
            .arg(path.as_std_path())
            .spawn()
            .with_context(|| format!("Failed to run {} for {}", opener, path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_process_with_unlikely_name() {
        let host = SystemHost::new();
        assert!(host
            .list_processes_by_name("definitely-not-running-7f3a.exe")
            .is_empty());
        assert_eq!(host.kill_processes_by_name("definitely-not-running-7f3a.exe"), 0);
    }

    #[test]
    fn test_launch_missing_executable_fails() {
        let host = SystemHost::new();
        let result = host.launch_process(Utf8Path::new("/nonexistent/dir/eden.exe"));
        assert!(result.is_err());
    }
}
