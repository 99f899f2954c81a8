//! fairplay-github: GitHub data-fetch collaborator for the fairplay audit
//! tool.
//!
//! Produces [`fairplay_core::RepositorySnapshot`] values and bounded source
//! file listings for the code-reuse check. All pagination, retry, and
//! rate-limit waiting happens in this crate; the core engine never blocks.

mod client;
mod error;
mod types;

pub use client::GithubClient;
pub use error::GithubError;
pub use types::GithubConfig;
