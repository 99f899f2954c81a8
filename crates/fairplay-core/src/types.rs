//! Core data model: teams, commits, snapshots, violations, results.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::ConfigError;

/// Severity of a detected violation, ordered so that `High` ranks above
/// `Medium` above `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// Closed set of hackathon rule violations.
///
/// Kept closed (not an open string space) so the report histogram and the
/// flagging rule stay exhaustive and type-checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    CommitsOutsideWindow,
    UnauthorizedContributors,
    LargeInitialCommit,
    ExcessiveContributors,
    SuspiciousTiming,
    CodeReuse,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::CommitsOutsideWindow => "commits_outside_window",
            ViolationKind::UnauthorizedContributors => "unauthorized_contributors",
            ViolationKind::LargeInitialCommit => "large_initial_commit",
            ViolationKind::ExcessiveContributors => "excessive_contributors",
            ViolationKind::SuspiciousTiming => "suspicious_timing",
            ViolationKind::CodeReuse => "code_reuse",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single piece of evidence produced by exactly one check.
///
/// The `evidence` payload is a JSON object of named facts supporting the
/// finding; it is never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub description: String,
    pub evidence: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Violation {
    pub fn new(
        kind: ViolationKind,
        severity: Severity,
        description: impl Into<String>,
        evidence: Value,
    ) -> Self {
        Self {
            kind,
            severity,
            description: description.into(),
            evidence,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }
}

/// A hackathon participant. The handle is the case-insensitive identity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    #[error("team '{team}' has {size} members, max allowed is {max}")]
    TooLarge {
        team: String,
        size: usize,
        max: usize,
    },
}

/// A hackathon team as loaded from the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub members: Vec<TeamMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    pub repository_url: String,
}

impl Team {
    /// Build a team, rejecting rosters larger than `max_size` outright
    /// rather than silently truncating.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        members: Vec<TeamMember>,
        profile_url: Option<String>,
        repository_url: impl Into<String>,
        max_size: usize,
    ) -> Result<Self, TeamError> {
        let name = name.into();
        if members.len() > max_size {
            return Err(TeamError::TooLarge {
                team: name,
                size: members.len(),
                max: max_size,
            });
        }
        Ok(Self {
            id: id.into(),
            name,
            members,
            profile_url,
            repository_url: repository_url.into(),
        })
    }

    /// Roster handles, lower-cased for identity comparisons.
    pub fn handles_lower(&self) -> Vec<String> {
        self.members
            .iter()
            .map(|m| m.handle.to_lowercase())
            .collect()
    }
}

/// A single commit as reported by the hosting API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub author: String,
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub additions: u64,
    pub deletions: u64,
    pub files_changed: u64,
}

impl Commit {
    pub fn total_changes(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// Repository state as fetched from the host.
///
/// Commit order is whatever the host returned; checks that depend on
/// chronology must sort for themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub url: String,
    pub name: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub commits: Vec<Commit>,
    pub contributors: Vec<String>,
}

/// Static per-run hackathon window and team rules. Never mutated after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackathonWindow {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub grace_period_hours: i64,
    pub max_team_size: usize,
    pub large_commit_threshold: u64,
}

impl HackathonWindow {
    pub fn new(
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        grace_period_hours: i64,
        max_team_size: usize,
        large_commit_threshold: u64,
    ) -> Result<Self, ConfigError> {
        if end <= start {
            return Err(ConfigError::WindowOrder);
        }
        if grace_period_hours < 0 {
            return Err(ConfigError::NegativeGrace);
        }
        if max_team_size == 0 {
            return Err(ConfigError::NonPositive {
                name: "max_team_size",
            });
        }
        Ok(Self {
            name: name.into(),
            start,
            end,
            grace_period_hours,
            max_team_size,
            large_commit_threshold,
        })
    }

    /// End of the window including the grace period. Commits at or before
    /// this instant are never classified as late.
    pub fn grace_end(&self) -> DateTime<Utc> {
        self.end + Duration::hours(self.grace_period_hours)
    }
}

/// Outcome of evaluating one team.
///
/// `is_flagged` is derived from the violation list at construction and has
/// no independent setter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResult {
    pub team: Team,
    /// `None` when the team's snapshot could not be fetched or parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<RepositorySnapshot>,
    pub violations: Vec<Violation>,
    is_flagged: bool,
    pub summary: String,
    pub analyzed_at: DateTime<Utc>,
    /// Set for "analysis failed" placeholder results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TeamResult {
    pub fn new(
        team: Team,
        snapshot: RepositorySnapshot,
        violations: Vec<Violation>,
        summary: impl Into<String>,
    ) -> Self {
        let is_flagged = violations.iter().any(|v| v.severity == Severity::High);
        Self {
            team,
            snapshot: Some(snapshot),
            violations,
            is_flagged,
            summary: summary.into(),
            analyzed_at: Utc::now(),
            error: None,
        }
    }

    /// Explicit failure marker so every requested team still appears in the
    /// run report when its fetch or parse fails.
    pub fn failed(team: Team, error: impl Into<String>) -> Self {
        let error = error.into();
        let summary = format!("Analysis failed for team '{}': {}", team.name, error);
        Self {
            team,
            snapshot: None,
            violations: Vec::new(),
            is_flagged: false,
            summary,
            analyzed_at: Utc::now(),
            error: Some(error),
        }
    }

    /// True iff any violation carries high severity.
    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }
}

/// Run-level report across all teams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub window: HackathonWindow,
    pub total_teams: usize,
    pub flagged_teams: usize,
    pub results: Vec<TeamResult>,
    pub generated_at: DateTime<Utc>,
    /// Violation-kind histogram summed across all teams, not deduplicated.
    pub summary_stats: BTreeMap<ViolationKind, usize>,
}
