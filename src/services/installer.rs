//! Installation of emulator releases.
//!
//! The flow is: resolve the download URL, download, unpack into a
//! branch-specific temp dir, drop source tarballs, merge the temp dir into the
//! install dir, then record the new version. Copy failures leave the temp dir
//! in place for inspection.

use crate::context::ManagerContext;
use crate::error::InstallError;
use crate::models::Branch;
use crate::notify::Notifier;
use crate::services::download::{Downloader, Unpacker};
use crate::services::paths::{ALTERNATE_EXE, PathResolver};
use crate::services::release::{ReleaseSource, resolve_download_url};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use std::io;
use std::sync::LazyLock;
use walkdir::WalkDir;

static SOURCE_TARBALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^yuzu-windows-msvc-source-.*\.tar\.xz$").expect("Invalid source tarball regex")
});

/// Result of an install request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { version: String, branch: Branch },
    /// The requested version is already recorded as installed
    Skipped { version: String },
}

/// Dependency check run after a successful install.
pub trait PostInstallCheck {
    fn run(&self, notifier: &dyn Notifier) -> Result<()>;
}

/// Warns when the Visual C++ runtime the emulator links against is missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct VcRuntimeCheck;

impl PostInstallCheck for VcRuntimeCheck {
    fn run(&self, notifier: &dyn Notifier) -> Result<()> {
        if !cfg!(windows) {
            tracing::debug!("Skipping VC++ runtime check on this platform");
            return Ok(());
        }

        let system_root = std::env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string());
        let dll = Utf8PathBuf::from(system_root)
            .join("System32")
            .join("vcruntime140.dll");

        if dll.exists() {
            tracing::debug!("VC++ runtime found at {}", dll);
        } else {
            tracing::warn!("VC++ runtime not found at {}", dll);
            notifier.notify(
                "Microsoft Visual C++ runtime not found, please install the latest VC++ redistributable.",
            );
        }
        Ok(())
    }
}

/// Installs releases using the given feed, downloader and unpacker.
pub struct Installer<R, D, U> {
    feed: R,
    downloader: D,
    unpacker: U,
    temp_root: Utf8PathBuf,
    post_install: Box<dyn PostInstallCheck>,
}

impl<R: ReleaseSource, D: Downloader, U: Unpacker> Installer<R, D, U> {
    /// Installer staging archives under the OS temp dir.
    pub fn new(feed: R, downloader: D, unpacker: U) -> Self {
        let temp_root = Utf8PathBuf::from_path_buf(std::env::temp_dir())
            .unwrap_or_else(|p| Utf8PathBuf::from(p.to_string_lossy().into_owned()));
        Self {
            feed,
            downloader,
            unpacker,
            temp_root,
            post_install: Box::new(VcRuntimeCheck),
        }
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<Utf8PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    pub fn with_post_install(mut self, check: Box<dyn PostInstallCheck>) -> Self {
        self.post_install = check;
        self
    }

    /// Temp dir a branch is unpacked into.
    pub fn staging_dir(&self, branch: Branch) -> Utf8PathBuf {
        self.temp_root.join(format!("{}-install", branch))
    }

    /// Install `version` of `branch` into the configured install dir.
    ///
    /// A downloaded archive that cannot be deleted afterwards is only logged;
    /// the install still succeeds.
    pub async fn install(
        &self,
        ctx: &mut ManagerContext,
        version: &str,
        branch: &str,
        notifier: &dyn Notifier,
    ) -> Result<InstallOutcome> {
        let branch = match Branch::installable(branch) {
            Ok(branch) => branch,
            Err(e) => {
                notifier.notify("Only the Eden emulator can be installed at the moment");
                return Err(e.into());
            }
        };
        let emulator = branch.emulator_name();

        if ctx.emulator().yuzu_version.as_deref() == Some(version) {
            tracing::info!(
                "Current {} version is same as target version [{}], skip install.",
                emulator,
                version
            );
            notifier.notify(&format!(
                "{} [{}] is already installed, skipping.",
                emulator, version
            ));
            return Ok(InstallOutcome::Skipped {
                version: version.to_string(),
            });
        }

        let install_dir = ctx.emulator().yuzu_path.clone();
        tracing::info!("target {} path: {}", emulator, install_dir);

        let mirror = ctx.config.setting.download.github_download_mirror.clone();
        let url = resolve_download_url(
            &self.feed,
            version,
            branch.as_str(),
            mirror.as_deref(),
            notifier,
        )
        .await?;

        notifier.notify(&format!("Downloading {}...", emulator));
        let download = self.downloader.download(&url).await?;
        let package = download
            .first_path()
            .cloned()
            .with_context(|| format!("Download of {} produced no file", url))?;

        let staging = self.staging_dir(branch);
        tracing::info!("Unpacking {} files...", emulator);
        notifier.notify(&format!("Unpacking {} files...", emulator));
        self.unpacker.unpack(&package, &staging)?;

        copy_back_files(&staging, &install_dir, notifier)?;
        tracing::info!("{} of [{}] install successfully.", emulator, version);

        if ctx.config.setting.download.auto_delete_after_install {
            if let Err(e) = fs::remove_file(&package) {
                tracing::warn!("Failed to delete package {}: {}", package, e);
            }
        }

        fs::create_dir_all(&install_dir)
            .with_context(|| format!("Failed to create install dir: {}", install_dir))?;

        if ctx.config.setting.other.rename_yuzu_to_cemu {
            rename_to_alternate(&PathResolver::new(&ctx.config).exe_path(), notifier)?;
        }

        ctx.emulator_mut().set_installed(version, branch);
        ctx.save()?;

        self.post_install.run(notifier)?;
        notifier.notify(&format!("{} {} [{}] installed successfully.", emulator, branch, version));

        Ok(InstallOutcome::Installed {
            version: version.to_string(),
            branch,
        })
    }
}

/// Rename `exe` to [`ALTERNATE_EXE`] in the same directory, if it exists.
fn rename_to_alternate(exe: &Utf8Path, notifier: &dyn Notifier) -> Result<()> {
    if !exe.exists() || exe.file_name() == Some(ALTERNATE_EXE) {
        return Ok(());
    }
    let Some(dir) = exe.parent() else {
        return Ok(());
    };

    let target = dir.join(ALTERNATE_EXE);
    fs::rename(exe, &target).with_context(|| format!("Failed to rename {} to {}", exe, target))?;
    tracing::info!("Rename {} to {}", exe, target);
    notifier.notify(&format!("Renamed {} to {}", exe.file_name().unwrap_or_default(), target));
    Ok(())
}

/// Merge `staging` into `install_dir`, then delete `staging`.
///
/// Source tarballs are removed first. A failed copy is reported as
/// [`InstallError::CopyFailed`] and `staging` is kept.
pub fn copy_back_files(
    staging: &Utf8Path,
    install_dir: &Utf8Path,
    notifier: &dyn Notifier,
) -> Result<()> {
    remove_source_tarballs(staging)?;

    tracing::info!("Copy back files to {}...", install_dir);
    notifier.notify("Installing files into the emulator directory...");
    if let Err(source) = merge_dir(staging, install_dir) {
        tracing::error!("Copy from {} to {} failed: {}", staging, install_dir, source);
        return Err(InstallError::CopyFailed {
            target: install_dir.to_path_buf(),
            source,
        }
        .into());
    }

    fs::remove_dir_all(staging)
        .with_context(|| format!("Failed to remove staging dir: {}", staging))?;
    Ok(())
}

/// Delete `yuzu-windows-msvc-source-*.tar.xz` files directly under `dir`.
pub fn remove_source_tarballs(dir: &Utf8Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir))? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if SOURCE_TARBALL.is_match(name) && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove {}", name))?;
            tracing::debug!("Removed source tarball {}", name);
            removed += 1;
        }
    }
    Ok(removed)
}

/// Recursively copy `src` into `dst`, overwriting existing files.
pub fn merge_dir(src: &Utf8Path, dst: &Utf8Path) -> io::Result<u64> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src.as_std_path())
            .map_err(io::Error::other)?;
        let target = dst.as_std_path().join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
