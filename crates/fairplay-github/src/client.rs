//! GitHub REST client producing core snapshots and source-file listings.
//!
//! All rate-limit waiting, pagination, and retry live here; the core engine
//! consumes the output as plain data.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use fairplay_core::{Commit, RepositorySnapshot, SourceFile};

use crate::error::GithubError;
use crate::types::{
    CommitListItem, CommitResponse, ContentResponse, ContributorResponse, GithubConfig,
    RepoResponse, TreeResponse,
};

const USER_AGENT_VALUE: &str = concat!("fairplay/", env!("CARGO_PKG_VERSION"));

/// Cap on how long a rate-limit reset header can make us sleep.
const MAX_RATE_LIMIT_SLEEP_SECS: i64 = 120;

/// Pause between per-commit detail requests.
const DETAIL_DELAY_MS: u64 = 100;

/// File extensions considered source code for the reuse check.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "cpp", "c", "h", "cs", "php", "rb", "go", "rs",
    "swift", "kt", "scala", "html", "css", "scss", "less", "vue", "svelte",
];

/// Path segments excluded from source-file fetching.
const SKIP_SEGMENTS: &[&str] = &["node_modules", "__pycache__", ".git", "dist", "build"];

/// GitHub API client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("token {token}")).map_err(|_| {
                GithubError::Network {
                    message: "token contains invalid header characters".to_string(),
                }
            })?;
            default_headers.insert(AUTHORIZATION, value);
        } else {
            warn!("no GITHUB_TOKEN set; using unauthenticated requests with a low rate limit");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| GithubError::Network {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn from_env() -> Result<Self, GithubError> {
        Self::new(GithubConfig::from_env())
    }

    /// Extract `(owner, repo)` from a repository URL, tolerating a trailing
    /// `.git`.
    pub fn parse_repo_url(repo_url: &str) -> Result<(String, String), GithubError> {
        let parsed = Url::parse(repo_url).map_err(|_| GithubError::InvalidRepoUrl {
            url: repo_url.to_string(),
        })?;
        let mut segments = parsed
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()))
            .ok_or_else(|| GithubError::InvalidRepoUrl {
                url: repo_url.to_string(),
            })?;
        let owner = segments.next().ok_or_else(|| GithubError::InvalidRepoUrl {
            url: repo_url.to_string(),
        })?;
        let repo = segments.next().ok_or_else(|| GithubError::InvalidRepoUrl {
            url: repo_url.to_string(),
        })?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if owner.is_empty() || repo.is_empty() {
            return Err(GithubError::InvalidRepoUrl {
                url: repo_url.to_string(),
            });
        }
        Ok((owner.to_string(), repo.to_string()))
    }

    /// Fetch repository metadata, the full commit list, and contributors,
    /// assembled into a core snapshot.
    ///
    /// The first `detailed_commit_limit` commits get per-commit stats; a
    /// failed detail request degrades that commit to zero stats rather than
    /// failing the snapshot.
    pub async fn fetch_snapshot(
        &self,
        repo_url: &str,
    ) -> Result<RepositorySnapshot, GithubError> {
        let (owner, repo) = Self::parse_repo_url(repo_url)?;
        info!(owner = %owner, repo = %repo, "fetching repository snapshot");

        let meta: RepoResponse = self
            .get_json(&format!("{}/repos/{owner}/{repo}", self.base_url), &[])
            .await?;
        let listed = self.fetch_all_commits(&owner, &repo).await?;
        let contributors: Vec<ContributorResponse> = self
            .get_json(
                &format!("{}/repos/{owner}/{repo}/contributors", self.base_url),
                &[],
            )
            .await?;

        let mut commits = Vec::with_capacity(listed.len());
        for (index, item) in listed.into_iter().enumerate() {
            let (additions, deletions, files_changed) =
                if index < self.config.detailed_commit_limit {
                    tokio::time::sleep(Duration::from_millis(DETAIL_DELAY_MS)).await;
                    match self.fetch_commit_stats(&owner, &repo, &item.sha).await {
                        Ok(stats) => stats,
                        Err(err) => {
                            warn!(
                                sha = %item.sha,
                                error = %err,
                                "failed to fetch commit stats; recording zero stats"
                            );
                            (0, 0, 0)
                        }
                    }
                } else {
                    (0, 0, 0)
                };
            commits.push(Commit {
                sha: item.sha,
                author: item.commit.author.name,
                author_email: item.commit.author.email,
                timestamp: item.commit.author.date,
                message: item.commit.message,
                additions,
                deletions,
                files_changed,
            });
        }

        Ok(RepositorySnapshot {
            url: repo_url.to_string(),
            name: meta.name,
            owner: meta.owner.login,
            created_at: meta.created_at,
            commits,
            contributors: contributors.into_iter().map(|c| c.login).collect(),
        })
    }

    /// Fetch up to `max_files` source files from the repository's default
    /// branch, filtered to known code extensions and excluding dependency
    /// and build directories.
    pub async fn fetch_source_files(
        &self,
        repo_url: &str,
        max_files: usize,
    ) -> Result<Vec<SourceFile>, GithubError> {
        let (owner, repo) = Self::parse_repo_url(repo_url)?;
        let meta: RepoResponse = self
            .get_json(&format!("{}/repos/{owner}/{repo}", self.base_url), &[])
            .await?;

        let tree: TreeResponse = self
            .get_json(
                &format!(
                    "{}/repos/{owner}/{repo}/git/trees/{}",
                    self.base_url, meta.default_branch
                ),
                &[("recursive", "1".to_string())],
            )
            .await?;

        let selected: Vec<String> = tree
            .tree
            .into_iter()
            .filter(|item| item.kind == "blob" && is_code_path(&item.path))
            .map(|item| item.path)
            .take(max_files)
            .collect();
        debug!(
            count = selected.len(),
            "selected source files for comparison"
        );

        let mut files = Vec::with_capacity(selected.len());
        for path in selected {
            tokio::time::sleep(Duration::from_millis(DETAIL_DELAY_MS)).await;
            let content: ContentResponse = match self
                .get_json(
                    &format!("{}/repos/{owner}/{repo}/contents/{path}", self.base_url),
                    &[],
                )
                .await
            {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %path, error = %err, "failed to fetch file content; skipping");
                    continue;
                }
            };
            match decode_content(&content) {
                Some(text) => files.push(SourceFile { path, content: text }),
                None => warn!(path = %path, "file content not decodable; skipping"),
            }
        }

        Ok(files)
    }

    async fn fetch_all_commits(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<CommitListItem>, GithubError> {
        let url = format!("{}/repos/{owner}/{repo}/commits", self.base_url);
        let mut commits = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<CommitListItem> = self
                .get_json(
                    &url,
                    &[
                        ("per_page", "100".to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let len = batch.len();
            commits.extend(batch);
            if len < 100 {
                break;
            }
            page += 1;
            tokio::time::sleep(Duration::from_millis(self.config.rate_limit_delay_ms)).await;
        }
        Ok(commits)
    }

    async fn fetch_commit_stats(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<(u64, u64, u64), GithubError> {
        let detail: CommitResponse = self
            .get_json(
                &format!("{}/repos/{owner}/{repo}/commits/{sha}", self.base_url),
                &[],
            )
            .await?;
        let (additions, deletions) = detail
            .stats
            .map(|s| (s.additions, s.deletions))
            .unwrap_or((0, 0));
        Ok((additions, deletions, detail.files.len() as u64))
    }

    /// GET a JSON resource with rate-limit handling and bounded retries for
    /// transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, GithubError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| GithubError::Network {
                    message: e.to_string(),
                })?;

            let status = response.status();
            if status.is_success() {
                return response.json::<T>().await.map_err(|e| GithubError::Decode {
                    message: format!("{url}: {e}"),
                });
            }

            if status.as_u16() == 403 || status.as_u16() == 429 {
                if attempt > self.config.max_retries {
                    return Err(GithubError::RateLimited { attempts: attempt });
                }
                let sleep_secs = rate_limit_sleep_secs(response.headers());
                warn!(
                    url = %url,
                    sleep_secs,
                    "rate limit hit; sleeping before retry"
                );
                tokio::time::sleep(Duration::from_secs(sleep_secs)).await;
                continue;
            }

            if status.is_server_error() && attempt <= self.config.max_retries {
                let backoff = Duration::from_millis(500 * u64::from(attempt));
                warn!(url = %url, status = status.as_u16(), "server error; retrying");
                tokio::time::sleep(backoff).await;
                continue;
            }

            if status.as_u16() == 404 {
                return Err(GithubError::NotFound {
                    url: url.to_string(),
                });
            }
            return Err(GithubError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
    }
}

/// Seconds to wait for a rate-limit window, from `X-RateLimit-Reset`,
/// clamped so a bogus header cannot hang the run.
fn rate_limit_sleep_secs(headers: &HeaderMap) -> u64 {
    let reset = headers
        .get("X-RateLimit-Reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok());
    match reset {
        Some(reset) => {
            let wait = reset - Utc::now().timestamp() + 1;
            wait.clamp(0, MAX_RATE_LIMIT_SLEEP_SECS) as u64
        }
        None => 1,
    }
}

fn is_code_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    if SKIP_SEGMENTS.iter().any(|s| lower.contains(s)) {
        return false;
    }
    match lower.rsplit_once('.') {
        Some((_, ext)) => CODE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Decode a contents-API payload: base64 with embedded newlines, UTF-8 text.
/// Binary or malformed entries yield `None`.
fn decode_content(content: &ContentResponse) -> Option<String> {
    use base64::Engine;
    let raw = content.content.as_deref()?;
    if content.encoding.as_deref() != Some("base64") {
        return Some(raw.to_string());
    }
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .ok()?;
    String::from_utf8(bytes).ok()
}
