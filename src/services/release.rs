//! Release resolution: turn a (version, branch) request into a download URL.

use crate::error::InstallError;
use crate::models::{Branch, ReleaseAsset, ReleaseInfo};
use crate::notify::Notifier;
use anyhow::Result;

/// Asset names accepted as an installable package, as (prefix, suffix).
const ASSET_PATTERNS: &[(&str, &str)] = &[
    ("", ".7z"),
    ("Windows-Yuzu-EA-", ".zip"),
    ("Eden-Windows-", ".zip"),
];

/// Provider of release metadata.
#[allow(async_fn_in_trait)]
pub trait ReleaseSource {
    async fn fetch_release(&self, version: &str, branch: Branch) -> Result<ReleaseInfo>;
}

/// Whether `name` matches one of the known package naming schemes.
pub fn is_package_asset(name: &str) -> bool {
    ASSET_PATTERNS
        .iter()
        .any(|(prefix, suffix)| name.starts_with(prefix) && name.ends_with(suffix))
}

/// First asset of `release`, in feed order, that looks like an installable package.
pub fn select_download_asset(release: &ReleaseInfo) -> Option<&ReleaseAsset> {
    release.assets.iter().find(|asset| is_package_asset(&asset.name))
}

/// Route a GitHub download URL through `mirror` when one is configured.
pub fn apply_download_mirror(url: &str, mirror: Option<&str>) -> String {
    match mirror {
        Some(mirror) if !mirror.is_empty() => match url.strip_prefix("https://github.com/") {
            Some(rest) => format!("{}/{}", mirror.trim_end_matches('/'), rest),
            None => url.to_string(),
        },
        _ => url.to_string(),
    }
}

/// Resolve the download URL of `version` on `branch`.
///
/// Fails with [`InstallError::UnsupportedBranch`] before touching the feed when
/// `branch` is not installable.
pub async fn resolve_download_url<R: ReleaseSource>(
    source: &R,
    version: &str,
    branch: &str,
    mirror: Option<&str>,
    notifier: &dyn Notifier,
) -> Result<String> {
    let branch = Branch::installable(branch)?;
    let emulator = branch.emulator_name();

    notifier.notify(&format!("Fetching {} release info...", emulator));
    let release = source.fetch_release(version, branch).await?;
    if release.tag_name.is_empty() {
        return Err(InstallError::VersionNotFound {
            emulator: emulator.to_string(),
            version: version.to_string(),
            branch: branch.to_string(),
        }
        .into());
    }
    tracing::info!("target {} version: {}", emulator, version);

    let asset = select_download_asset(&release)
        .ok_or_else(|| InstallError::NoMatchingAsset(release.tag_name.clone()))?;
    let url = apply_download_mirror(&asset.download_url, mirror);

    tracing::info!("resolved {} asset {} -> {}", emulator, asset.name, url);
    Ok(url)
}
