//! Error types for the GitHub client.

/// GitHub client errors.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// URL does not look like an owner/repo repository URL.
    #[error("invalid repository URL: {url}")]
    InvalidRepoUrl { url: String },

    /// Transport-level failure (DNS, TLS, connect, timeout).
    #[error("network error: {message}")]
    Network { message: String },

    /// Resource does not exist or is not visible with the current token.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// Non-success status that is not retried.
    #[error("http {status} from {url}")]
    Http { status: u16, url: String },

    /// Rate limit still exceeded after waiting and retrying.
    #[error("rate limited by the API after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Response body could not be decoded into the expected shape.
    #[error("decode error: {message}")]
    Decode { message: String },
}
