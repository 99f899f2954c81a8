//! Analysis thresholds, passed explicitly into the evaluator and the
//! similarity engine. There is no process-wide configuration object.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration errors are fatal at startup: the driver reports them once
/// and exits nonzero.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be positive")]
    NonPositive { name: &'static str },

    #[error(
        "similarity thresholds must satisfy 0 < medium < high <= 1 (high {high}, medium {medium})"
    )]
    SimilarityThresholds { high: f64, medium: f64 },

    #[error("event window end must be after start")]
    WindowOrder,

    #[error("grace period must not be negative")]
    NegativeGrace,
}

/// Thresholds driving the check battery and the similarity engine.
///
/// The heuristic constants (early-commit high-severity cutoffs, late major
/// change size, block match limits) encode policy rather than mechanism, so
/// they are named fields with defaults instead of literals in the checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Total-changes threshold for the large-commit check.
    pub large_commit_threshold: u64,
    /// Files-changed threshold for the large-commit check.
    pub suspicious_file_count: u64,
    /// Per-minute commit count above which a bucket is reported.
    pub max_commits_per_minute: usize,
    /// Reference corpus for the optional code-reuse check. Absent disables it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_file: Option<PathBuf>,
    pub similarity_high_threshold: f64,
    pub similarity_medium_threshold: f64,
    /// Cap on source files fetched for the code-reuse check.
    pub max_source_files: usize,

    // Policy heuristics.
    /// More early commits than this make the early partition high severity.
    pub early_high_count: usize,
    /// Any early commit above this many changed lines is high severity.
    pub early_high_changes: u64,
    /// Late commits above this many changed lines count as major.
    pub late_major_changes: u64,
    /// Unauthorized change volume above this is high severity.
    pub unauthorized_high_changes: u64,
    /// Intra-block similarity above this counts a block match.
    pub block_match_threshold: f64,
    /// More matched blocks than this produce a code_blocks violation.
    pub block_match_limit: usize,
    /// Blocks at or below this many stripped characters are discarded.
    pub min_block_chars: usize,
    /// Example commits included per window-check violation.
    pub example_commit_limit: usize,
    /// Example groups included in the identical-timestamp violation.
    pub example_group_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            large_commit_threshold: 500,
            suspicious_file_count: 5,
            max_commits_per_minute: 3,
            reference_file: None,
            similarity_high_threshold: 0.8,
            similarity_medium_threshold: 0.6,
            max_source_files: 30,
            early_high_count: 5,
            early_high_changes: 100,
            late_major_changes: 50,
            unauthorized_high_changes: 100,
            block_match_threshold: 0.7,
            block_match_limit: 2,
            min_block_chars: 50,
            example_commit_limit: 5,
            example_group_limit: 3,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.large_commit_threshold == 0 {
            return Err(ConfigError::NonPositive {
                name: "large_commit_threshold",
            });
        }
        if self.suspicious_file_count == 0 {
            return Err(ConfigError::NonPositive {
                name: "suspicious_file_count",
            });
        }
        if self.max_commits_per_minute == 0 {
            return Err(ConfigError::NonPositive {
                name: "max_commits_per_minute",
            });
        }
        if self.max_source_files == 0 {
            return Err(ConfigError::NonPositive {
                name: "max_source_files",
            });
        }
        let high = self.similarity_high_threshold;
        let medium = self.similarity_medium_threshold;
        if !(medium > 0.0 && high > medium && high <= 1.0) {
            return Err(ConfigError::SimilarityThresholds { high, medium });
        }
        if !(self.block_match_threshold > 0.0 && self.block_match_threshold <= 1.0) {
            return Err(ConfigError::NonPositive {
                name: "block_match_threshold",
            });
        }
        Ok(())
    }
}
