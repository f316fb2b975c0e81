use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Directory for the daily log files
    pub log_dir: Utf8PathBuf,
    /// File name prefix, e.g. "yuzu-manager" -> yuzu-manager.2024-03-04
    pub log_prefix: String,
    pub debug_mode: bool,
    /// Also print to stderr with colors
    pub console_output: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            log_dir: Utf8PathBuf::from("logs"),
            log_prefix: crate::APP_NAME.to_string(),
            debug_mode: false,
            console_output: true,
        }
    }
}

/// Filter from `RUST_LOG` when set, otherwise `debug` or `info`.
pub fn env_filter(debug_mode: bool) -> EnvFilter {
    let fallback = if debug_mode { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber: rotating file log plus optional console.
///
/// # Returns
/// A guard that must be held for the duration of the program to keep file logging active
pub fn init_logging(options: &LoggingOptions) -> Result<WorkerGuard> {
    if !options.log_dir.exists() {
        fs::create_dir_all(&options.log_dir)
            .with_context(|| format!("Failed to create log directory: {}", options.log_dir))?;
    }

    let file_appender = rolling::daily(&options.log_dir, &options.log_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Option<Layer> is itself a layer, so the console can be switched off
    let console_layer = options.console_output.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter(options.debug_mode))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::debug!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        options.log_dir,
        options.log_prefix,
        options.debug_mode,
        options.console_output
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_logging_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = Utf8PathBuf::try_from(temp_dir.path().join("logs")).unwrap();
        let options = LoggingOptions {
            log_dir: log_dir.clone(),
            log_prefix: "test".to_string(),
            debug_mode: true,
            console_output: false,
        };

        // May fail if another test already installed a subscriber,
        // the directory is created either way
        let _guard = init_logging(&options);
        assert!(log_dir.exists());
    }

    #[test]
    fn test_default_options() {
        let options = LoggingOptions::default();
        assert_eq!(options.log_prefix, "yuzu-manager");
        assert!(!options.debug_mode);
    }
}
