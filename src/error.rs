use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised by install, launch and detection operations.
///
/// Service functions return `anyhow::Result`; callers that need to branch on
/// the failure use `err.downcast_ref::<InstallError>()`.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Only support install yuzu on branch [eden], got [{0}]")]
    UnsupportedBranch(String),

    #[error("{emulator} version [{version}] not found on branch [{branch}]")]
    VersionNotFound {
        emulator: String,
        version: String,
        branch: String,
    },

    #[error("No download asset of release [{0}] matches a known package name")]
    NoMatchingAsset(String),

    #[error("Emulator executable not found at {0}")]
    ExecutableMissing(Utf8PathBuf),

    #[error("Failed to copy emulator files into {target}: {source}")]
    CopyFailed {
        target: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
