//! Fetching and unpacking release archives.
//!
//! [`HttpDownloader`] streams a URL to disk; [`ArchiveUnpacker`] extracts
//! `.zip` archives in-process and hands `.7z` archives to the system `7z` tool.

use crate::models::DownloadResult;
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::process::Command;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Fetches a URL to local file(s).
#[allow(async_fn_in_trait)]
pub trait Downloader {
    async fn download(&self, url: &str) -> Result<DownloadResult>;
}

/// Extracts an archive into a directory.
pub trait Unpacker {
    fn unpack(&self, archive: &Utf8Path, target_dir: &Utf8Path) -> Result<()>;
}

/// Downloads over HTTP(S) into `download_dir`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    http: reqwest::Client,
    download_dir: Utf8PathBuf,
}

impl HttpDownloader {
    pub fn new(download_dir: impl Into<Utf8PathBuf>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            download_dir: download_dir.into(),
        })
    }

    pub fn download_dir(&self) -> &Utf8Path {
        &self.download_dir
    }
}

/// Last path segment of `url`, without query or fragment.
pub fn file_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<DownloadResult> {
        let file_name = file_name_from_url(url)
            .with_context(|| format!("Cannot derive a file name from {}", url))?;
        let target = self.download_dir.join(file_name);

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .with_context(|| format!("Failed to create download dir: {}", self.download_dir))?;

        tracing::info!("Downloading {} -> {}", url, target);
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Download of {} failed", url))?;

        let total = response.content_length();
        let mut file = tokio::fs::File::create(&target)
            .await
            .with_context(|| format!("Failed to create {}", target))?;

        let mut written: u64 = 0;
        let mut last_logged_pct = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed reading body of {}", url))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", target))?;
            written += chunk.len() as u64;

            if let Some(total) = total.filter(|t| *t > 0) {
                let pct = written * 100 / total;
                if pct >= last_logged_pct + 10 {
                    last_logged_pct = pct;
                    tracing::debug!("{}: {}% ({} / {} bytes)", file_name, pct, written, total);
                }
            }
        }
        file.flush().await?;

        tracing::info!("Downloaded {} bytes to {}", written, target);
        Ok(DownloadResult::single(target))
    }
}

/// Extracts `.zip` and `.7z` archives.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveUnpacker;

impl ArchiveUnpacker {
    pub fn new() -> Self {
        Self
    }
}

impl Unpacker for ArchiveUnpacker {
    fn unpack(&self, archive: &Utf8Path, target_dir: &Utf8Path) -> Result<()> {
        fs::create_dir_all(target_dir)
            .with_context(|| format!("Failed to create {}", target_dir))?;

        match archive.extension().map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("zip") => extract_zip(archive, target_dir),
            Some("7z") => extract_7z(archive, target_dir),
            _ => bail!("Unsupported archive format: {}", archive),
        }
    }
}

fn extract_zip(archive: &Utf8Path, target_dir: &Utf8Path) -> Result<()> {
    let file = File::open(archive).with_context(|| format!("Failed to open {}", archive))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("Not a valid zip archive: {}", archive))?;

    tracing::info!("Extracting {} entries from {} to {}", zip.len(), archive, target_dir);
    zip.extract(target_dir.as_std_path())
        .with_context(|| format!("Failed to extract {}", archive))?;
    Ok(())
}

fn extract_7z(archive: &Utf8Path, target_dir: &Utf8Path) -> Result<()> {
    tracing::info!("7z extract: {} -> {}", archive, target_dir);
    let output = Command::new("7z")
        .arg("x")
        .arg(archive.as_str())
        .arg(format!("-o{}", target_dir))
        .arg("-y")
        .output()
        .context("Failed to run 7z, is it installed and on PATH?")?;

    if !output.status.success() {
        bail!(
            "7z exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
