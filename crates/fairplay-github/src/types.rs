//! Raw GitHub REST API shapes, deserialized with serde and converted into
//! the core data model by the client.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Client configuration. Loaded from the environment by default; the token
/// is optional (unauthenticated requests work, at a lower rate limit).
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Pause between paginated requests, in milliseconds.
    pub rate_limit_delay_ms: u64,
    /// Commits fetched with full per-commit stats; the remainder carry zero
    /// stats to keep request counts bounded.
    pub detailed_commit_limit: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            rate_limit_delay_ms: 1000,
            detailed_commit_limit: 20,
        }
    }
}

impl GithubConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            base_url: std::env::var("GITHUB_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: env_parse("GITHUB_TIMEOUT", defaults.timeout_secs),
            max_retries: env_parse("GITHUB_MAX_RETRIES", defaults.max_retries),
            rate_limit_delay_ms: env_parse(
                "GITHUB_RATE_LIMIT_DELAY_MS",
                defaults.rate_limit_delay_ms,
            ),
            detailed_commit_limit: defaults.detailed_commit_limit,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepoResponse {
    pub name: String,
    pub owner: OwnerResponse,
    pub created_at: DateTime<Utc>,
    pub default_branch: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerResponse {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitListItem {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDetail {
    pub author: CommitAuthor,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitAuthor {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitResponse {
    #[serde(default)]
    pub stats: Option<CommitStats>,
    #[serde(default)]
    pub files: Vec<CommitFile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitFile {
    #[allow(dead_code)]
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContributorResponse {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeItem {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}
