//! Firmware provisioning into the emulator's NAND.

use crate::context::ManagerContext;
use crate::notify::Notifier;
use crate::services::paths::PathResolver;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs::{self, File};
use std::sync::LazyLock;

static VERSION_IN_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("Invalid firmware version regex"));

/// Installs firmware files into a `registered` directory.
pub trait FirmwareInstaller {
    /// Install `version` (or whatever the source provides when `None`) into
    /// `target`. Returns the installed version, or `None` if nothing changed.
    fn install_firmware(&self, version: Option<&str>, target: &Utf8Path) -> Result<Option<String>>;
}

/// Result of a firmware install request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareOutcome {
    Installed { version: String, path: Utf8PathBuf },
    /// The requested version is already recorded
    Skipped { version: String },
    /// The installer reported no new firmware
    Unchanged,
}

/// Install firmware through `installer` and record its version.
pub fn install_firmware(
    ctx: &mut ManagerContext,
    installer: &dyn FirmwareInstaller,
    version: Option<&str>,
    notifier: &dyn Notifier,
) -> Result<FirmwareOutcome> {
    if let Some(requested) = version {
        if ctx.emulator().yuzu_firmware.as_deref() == Some(requested) {
            tracing::info!(
                "Current firmware are same as target version [{}], skip install.",
                requested
            );
            notifier.notify(&format!("Firmware [{}] is already installed, skipping.", requested));
            return Ok(FirmwareOutcome::Skipped {
                version: requested.to_string(),
            });
        }
    }

    let firmware_path = PathResolver::new(&ctx.config).firmware_path();
    let Some(installed) = installer.install_firmware(version, &firmware_path)? else {
        return Ok(FirmwareOutcome::Unchanged);
    };

    ctx.emulator_mut().yuzu_firmware = Some(installed.clone());
    ctx.save()?;

    notifier.notify(&format!("Firmware installed to {}", firmware_path));
    notifier.notify(&format!(
        "Firmware [{}] installed, please install the matching keys.",
        installed
    ));

    Ok(FirmwareOutcome::Installed {
        version: installed,
        path: firmware_path,
    })
}

/// Installs firmware from a local `.zip` of NCA files.
#[derive(Debug, Clone)]
pub struct ArchiveFirmwareInstaller {
    archive: Utf8PathBuf,
}

impl ArchiveFirmwareInstaller {
    pub fn new(archive: impl Into<Utf8PathBuf>) -> Self {
        Self {
            archive: archive.into(),
        }
    }

    /// Version to record: the requested one, else the first `x.y.z` in the archive name.
    pub fn resolve_version(&self, requested: Option<&str>) -> Option<String> {
        requested.map(str::to_string).or_else(|| {
            let name = self.archive.file_name()?;
            VERSION_IN_NAME
                .captures(name)
                .map(|caps| caps[1].to_string())
        })
    }
}

impl FirmwareInstaller for ArchiveFirmwareInstaller {
    fn install_firmware(&self, version: Option<&str>, target: &Utf8Path) -> Result<Option<String>> {
        if !self.archive.exists() {
            bail!("Firmware archive not found: {}", self.archive);
        }
        let Some(version) = self.resolve_version(version) else {
            bail!(
                "Cannot tell the firmware version of {}, pass it explicitly",
                self.archive
            );
        };

        fs::create_dir_all(target)
            .with_context(|| format!("Failed to create firmware dir: {}", target))?;

        let mut cleared = 0;
        for entry in fs::read_dir(target)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("nca")) {
                if path.is_dir() {
                    fs::remove_dir_all(&path)?;
                } else {
                    fs::remove_file(&path)?;
                }
                cleared += 1;
            }
        }
        tracing::info!("Removed {} old firmware files from {}", cleared, target);

        let file = File::open(&self.archive)
            .with_context(|| format!("Failed to open {}", self.archive))?;
        let mut zip = zip::ZipArchive::new(file)
            .with_context(|| format!("Not a valid zip archive: {}", self.archive))?;
        zip.extract(target.as_std_path())
            .with_context(|| format!("Failed to extract firmware into {}", target))?;

        tracing::info!("Firmware {} extracted to {}", version, target);
        Ok(Some(version))
    }
}
