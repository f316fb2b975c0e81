//! Data models for yuzu-manager.
//!
//! - [`AppConfig`]: the persisted application configuration (`config.yaml`)
//! - [`EmulatorConfig`]: install path, installed version/branch and firmware of one emulator install
//! - [`History`]: previously used install paths and their configs (`storage.yaml`)
//! - [`Branch`]: release channel of the emulator
//! - [`ReleaseInfo`] / [`DownloadResult`]: release feed and downloader payloads
//!
//! Config structs derive `Serialize`/`Deserialize` and default every field so a
//! partial or missing file still loads.

pub mod branch;
pub mod config;
pub mod release;

pub use branch::Branch;
pub use config::{
    AppConfig, DownloadSettings, EmulatorConfig, History, NetworkSettings, OtherSettings, Settings,
};
pub use release::{CommitInfo, DownloadResult, DownloadedFile, ReleaseAsset, ReleaseInfo};
