//! Repository activity for projects that publish a GitHub link in their metadata.
//!
//! Informational only: nothing here feeds a score.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rpc::web::WebProbe;

pub const API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoInfo {
    /// `owner/name`
    pub repo: String,
    pub stars: Option<u64>,
    /// `pushed_at` timestamp as GitHub reports it.
    pub last_commit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoJson {
    full_name: Option<String>,
    stargazers_count: Option<u64>,
    pushed_at: Option<String>,
}

/// `owner/name` from a GitHub URL, without a trailing `.git`.
pub fn repo_slug(url: &str) -> Option<String> {
    let start = url.to_ascii_lowercase().find("github.com/")? + "github.com/".len();
    let path = url[start..].split(['?', '#']).next()?;
    let mut parts = path.split('/').filter(|p| !p.is_empty());
    let owner = parts.next()?;
    let name = parts.next()?;
    let name = name
        .strip_suffix(".git")
        .or_else(|| name.strip_suffix(".GIT"))
        .unwrap_or(name);
    (!name.is_empty()).then(|| format!("{owner}/{name}"))
}

/// Look up stars and last push for `slug`. Any failure yields `None`.
pub async fn repo_info<P: WebProbe>(web: &P, slug: &str) -> Option<RepoInfo> {
    let url = format!("{API_BASE}/repos/{slug}");
    let reply = match web.fetch(&url).await {
        Ok(reply) if reply.is_success() => reply,
        Ok(reply) => {
            debug!("{url} returned {}", reply.status);
            return None;
        }
        Err(e) => {
            debug!("{url} failed: {e}");
            return None;
        }
    };
    match serde_json::from_str::<RepoJson>(&reply.body) {
        Ok(json) => Some(RepoInfo {
            repo: json
                .full_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| slug.to_string()),
            stars: json.stargazers_count,
            last_commit: json.pushed_at,
        }),
        Err(e) => {
            debug!("{url} returned unexpected JSON: {e}");
            None
        }
    }
}
