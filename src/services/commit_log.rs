//! Markdown rendering of the upstream commit history.

use crate::models::CommitInfo;
use crate::services::github::GitHubClient;
use anyhow::Result;

/// Fetch the recent commits of `repo` and render them.
pub async fn fetch_commit_log(client: &GitHubClient, repo: &str) -> Result<String> {
    let commits = client.commits(repo).await?;
    tracing::debug!("Fetched {} commits of {}", commits.len(), repo);
    Ok(render_commit_log(repo, &commits))
}

/// Render commits grouped by day, newest first as given.
///
/// Multi-line messages collapse into a `<details>` block whose summary is the
/// first line.
pub fn render_commit_log(repo: &str, commits: &[CommitInfo]) -> String {
    let mut markdown = format!("# Recent commits of {}\n\n", repo);
    let mut last_date = "";

    for info in commits {
        let date = info
            .commit
            .author
            .date
            .split('T')
            .next()
            .unwrap_or_default();
        if date != last_date {
            markdown.push_str(&format!("## {}\n\n", date));
            last_date = date;
        }

        let lines: Vec<&str> = info.commit.message.lines().collect();
        match lines.as_slice() {
            [] => markdown.push_str(" - \n\n"),
            [single] => markdown.push_str(&format!(" - {}\n\n", single)),
            [summary, rest @ ..] => markdown.push_str(&format!(
                "<details><summary>{}</summary>\n{}\n</details>\n\n",
                summary,
                rest.join("\n\n")
            )),
        }
    }

    markdown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_date() {
        let commits = vec![
            CommitInfo::new("2024-03-04T10:00:00Z", "core: fix crash"),
            CommitInfo::new("2024-03-04T08:00:00Z", "ui: tweak"),
            CommitInfo::new("2024-03-03T23:00:00Z", "audio: new backend"),
        ];

        let md = render_commit_log("yuzu-emu/yuzu", &commits);

        assert_eq!(
            md,
            "# Recent commits of yuzu-emu/yuzu\n\n\
             ## 2024-03-04\n\n - core: fix crash\n\n - ui: tweak\n\n\
             ## 2024-03-03\n\n - audio: new backend\n\n"
        );
    }

    #[test]
    fn test_multiline_message_collapses() {
        let commits = vec![CommitInfo::new(
            "2024-03-04T10:00:00Z",
            "Merge pull request #1\nfirst detail\nsecond detail",
        )];

        let md = render_commit_log("r", &commits);

        assert!(md.contains(
            "<details><summary>Merge pull request #1</summary>\nfirst detail\n\nsecond detail\n</details>\n\n"
        ));
    }
}
