//! fairplay-core: the violation detection engine behind the fairplay
//! hackathon audit tool.
//!
//! Turns a team roster plus a normalized commit/contributor snapshot into a
//! list of typed, evidenced violations, optionally augmented by a
//! code-similarity pass against a configured reference corpus, and folds
//! per-team results into a run-level report.
//!
//! This crate does no I/O beyond reading the reference corpus at
//! construction; fetching repository data and loading rosters belong to the
//! collaborating crates.

pub mod config;
pub mod evaluate;
pub mod report;
pub mod similarity;
pub mod types;

pub use config::{AnalysisConfig, ConfigError};
pub use evaluate::Evaluator;
pub use report::aggregate;
pub use similarity::{SimilarityEngine, SourceFile};
pub use types::{
    Commit, HackathonWindow, RepositorySnapshot, RunReport, Severity, Team, TeamError,
    TeamMember, TeamResult, Violation, ViolationKind,
};
