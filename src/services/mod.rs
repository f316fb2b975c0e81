//! Services module - business logic for managing an emulator install.
//!
//! The services are **front-end agnostic**: every operation takes an explicit
//! [`ManagerContext`](crate::context::ManagerContext) plus its collaborators
//! (release feed, downloader, [`ProcessHost`](crate::platform::ProcessHost),
//! [`Notifier`](crate::notify::Notifier)) and returns an outcome enum or an
//! `anyhow` error carrying an [`InstallError`](crate::error::InstallError).
//!
//! # Components
//!
//! - [`release`]: picks the download URL of a release from the feed
//! - [`github`]: GitHub REST client backing the feed and the commit log
//! - [`download`]: HTTP downloader and archive unpacker
//! - [`installer`]: download, unpack, merge into the install dir, record version
//! - [`version_detection`]: launch the emulator and read the version from its window title
//! - [`paths`] / [`qt_config`]: executable, user-data, NAND and load paths
//! - [`firmware`]: firmware installation into the NAND
//! - [`launcher`]: start the emulator, open the keys folder, switch install dir
//! - [`commit_log`]: Markdown rendering of upstream commits
//!
//! # Usage Example
//!
//! ```ignore
//! use yuzu_manager::services::installer::Installer;
//!
//! let installer = Installer::new(feed, HttpDownloader::new(dir)?, ArchiveUnpacker::new());
//! match installer.install(&mut ctx, "v0.0.3", "eden", &notifier).await? {
//!     InstallOutcome::Installed { version, .. } => println!("installed {version}"),
//!     InstallOutcome::Skipped { .. } => println!("already up to date"),
//! }
//! ```

pub mod commit_log;
pub mod download;
pub mod firmware;
pub mod github;
pub mod installer;
pub mod launcher;
pub mod paths;
pub mod qt_config;
pub mod release;
pub mod version_detection;

pub use download::{ArchiveUnpacker, Downloader, HttpDownloader, Unpacker};
pub use firmware::{ArchiveFirmwareInstaller, FirmwareInstaller, FirmwareOutcome};
pub use github::{GitHubClient, GitHubReleaseFeed};
pub use installer::{InstallOutcome, Installer, PostInstallCheck, VcRuntimeCheck};
pub use launcher::PathUpdate;
pub use paths::PathResolver;
pub use release::ReleaseSource;
pub use version_detection::{DetectedVersion, DetectionOutcome, VersionDetector};
