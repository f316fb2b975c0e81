use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Release descriptor returned by the release feed.
///
/// An empty `tag_name` means the feed knows no such release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    #[serde(default)]
    pub tag_name: String,

    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,

    #[serde(alias = "browser_download_url")]
    pub download_url: String,
}

impl ReleaseAsset {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
        }
    }
}

/// Files produced by a [`Downloader`](crate::services::download::Downloader).
#[derive(Debug, Clone, Default)]
pub struct DownloadResult {
    pub files: Vec<DownloadedFile>,
}

#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub path: Utf8PathBuf,
}

impl DownloadResult {
    pub fn single(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            files: vec![DownloadedFile { path: path.into() }],
        }
    }

    /// Path of the first downloaded file, if any.
    pub fn first_path(&self) -> Option<&Utf8PathBuf> {
        self.files.first().map(|f| &f.path)
    }
}

/// One entry of the GitHub commits API, reduced to what the commit log renders.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub author: CommitAuthor,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub date: String,
}

impl CommitInfo {
    pub fn new(date: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            commit: CommitDetail {
                author: CommitAuthor { date: date.into() },
                message: message.into(),
            },
        }
    }
}
