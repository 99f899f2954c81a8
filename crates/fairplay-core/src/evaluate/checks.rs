//! The built-in check battery. Each check is independent and emits zero or
//! more violations; the driver in `evaluate` isolates failures per check.

use anyhow::Result;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::AnalysisConfig;
use crate::types::{
    Commit, HackathonWindow, RepositorySnapshot, Severity, Team, Violation, ViolationKind,
};

/// Check definition for the battery registry.
pub struct CheckDefinition {
    pub id: &'static str,
    pub description: &'static str,
    pub run: fn(&CheckContext<'_>) -> Result<Vec<Violation>>,
}

/// Context passed to every check.
pub struct CheckContext<'a> {
    pub team: &'a Team,
    pub snapshot: &'a RepositorySnapshot,
    pub window: &'a HackathonWindow,
    pub config: &'a AnalysisConfig,
}

/// Static check registry, run unconditionally for every team.
pub static CHECKS: &[CheckDefinition] = &[
    CheckDefinition {
        id: "commit_window",
        description: "Commits before the hackathon start or after the deadline plus grace",
        run: check_commit_window,
    },
    CheckDefinition {
        id: "unauthorized_contributors",
        description: "Repository contributors that are not on the team roster",
        run: check_unauthorized_contributors,
    },
    CheckDefinition {
        id: "large_commits",
        description: "Commits exceeding the change-volume or file-count thresholds",
        run: check_large_commits,
    },
    CheckDefinition {
        id: "excessive_contributors",
        description: "More repository contributors than the maximum team size",
        run: check_excessive_contributors,
    },
    CheckDefinition {
        id: "rapid_commits",
        description: "Too many commits within a single minute",
        run: check_rapid_commits,
    },
    CheckDefinition {
        id: "identical_timestamps",
        description: "Groups of commits sharing an exact timestamp",
        run: check_identical_timestamps,
    },
];

fn example_commit(commit: &Commit) -> serde_json::Value {
    let sha: String = commit.sha.chars().take(8).collect();
    let message: String = commit.message.chars().take(100).collect();
    json!({
        "sha": sha,
        "timestamp": commit.timestamp.to_rfc3339(),
        "changes": commit.total_changes(),
        "message": message,
    })
}

/// Partition commits into early (before start) and late (after end + grace).
/// A commit exactly at the start or exactly at the grace end is in bounds.
fn check_commit_window(ctx: &CheckContext<'_>) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    let grace_end = ctx.window.grace_end();

    let early: Vec<&Commit> = ctx
        .snapshot
        .commits
        .iter()
        .filter(|c| c.timestamp < ctx.window.start)
        .collect();
    let late: Vec<&Commit> = ctx
        .snapshot
        .commits
        .iter()
        .filter(|c| c.timestamp > grace_end)
        .collect();

    if !early.is_empty() {
        let severity = if early.len() > ctx.config.early_high_count
            || early
                .iter()
                .any(|c| c.total_changes() > ctx.config.early_high_changes)
        {
            Severity::High
        } else {
            Severity::Medium
        };
        let examples: Vec<_> = early
            .iter()
            .take(ctx.config.example_commit_limit)
            .map(|c| example_commit(c))
            .collect();
        violations.push(Violation::new(
            ViolationKind::CommitsOutsideWindow,
            severity,
            format!("Found {} commits before hackathon start", early.len()),
            json!({
                "early_commits": early.len(),
                "total_changes_before": early.iter().map(|c| c.total_changes()).sum::<u64>(),
                "commits": examples,
            }),
        ));
    }

    if !late.is_empty() {
        let major = late
            .iter()
            .filter(|c| c.total_changes() > ctx.config.late_major_changes)
            .count();
        let severity = if major > 0 { Severity::High } else { Severity::Low };
        let examples: Vec<_> = late
            .iter()
            .take(ctx.config.example_commit_limit)
            .map(|c| example_commit(c))
            .collect();
        violations.push(Violation::new(
            ViolationKind::CommitsOutsideWindow,
            severity,
            format!(
                "Found {} commits after deadline ({} major)",
                late.len(),
                major
            ),
            json!({
                "late_commits": late.len(),
                "major_late_commits": major,
                "total_changes_after": late.iter().map(|c| c.total_changes()).sum::<u64>(),
                "commits": examples,
            }),
        ));
    }

    Ok(violations)
}

/// Contributors reported by the host that are not on the roster, plus the
/// change volume attributable to them by author-name/email substring match.
fn check_unauthorized_contributors(ctx: &CheckContext<'_>) -> Result<Vec<Violation>> {
    let roster: BTreeSet<String> = ctx.team.handles_lower().into_iter().collect();
    let reported: BTreeSet<String> = ctx
        .snapshot
        .contributors
        .iter()
        .map(|c| c.to_lowercase())
        .collect();

    let unauthorized: Vec<&String> = reported.difference(&roster).collect();
    if unauthorized.is_empty() {
        return Ok(Vec::new());
    }

    let matched: Vec<&Commit> = ctx
        .snapshot
        .commits
        .iter()
        .filter(|c| {
            let author = c.author.to_lowercase();
            let email = c.author_email.to_lowercase();
            unauthorized
                .iter()
                .any(|h| author.contains(h.as_str()) || email.contains(h.as_str()))
        })
        .collect();
    let total_changes: u64 = matched.iter().map(|c| c.total_changes()).sum();

    // Presence of an unauthorized handle alone is medium; real change volume
    // above the threshold escalates to high.
    let severity = if total_changes > ctx.config.unauthorized_high_changes {
        Severity::High
    } else {
        Severity::Medium
    };

    Ok(vec![Violation::new(
        ViolationKind::UnauthorizedContributors,
        severity,
        format!("Found {} unauthorized contributors", unauthorized.len()),
        json!({
            "unauthorized_contributors": unauthorized,
            "team_members": ctx.team.members.iter().map(|m| m.handle.clone()).collect::<Vec<_>>(),
            "unauthorized_commits": matched.len(),
            "unauthorized_changes": total_changes,
        }),
    )])
}

/// Every commit is measured against the change-volume and file-count
/// thresholds; the first chronological offender is high severity, later
/// offenders medium.
fn check_large_commits(ctx: &CheckContext<'_>) -> Result<Vec<Violation>> {
    let mut sorted: Vec<&Commit> = ctx.snapshot.commits.iter().collect();
    sorted.sort_by_key(|c| c.timestamp);

    let mut violations = Vec::new();
    for (index, commit) in sorted.iter().enumerate() {
        let over_changes = commit.total_changes() > ctx.config.large_commit_threshold;
        let over_files = commit.files_changed > ctx.config.suspicious_file_count;
        if !(over_changes || over_files) {
            continue;
        }

        let severity = if index == 0 { Severity::High } else { Severity::Medium };
        let mut exceeded = Vec::new();
        if over_changes {
            exceeded.push("total_changes");
        }
        if over_files {
            exceeded.push("files_changed");
        }

        violations.push(
            Violation::new(
                ViolationKind::LargeInitialCommit,
                severity,
                format!(
                    "Large commit #{}: {} changes, {} files",
                    index + 1,
                    commit.total_changes(),
                    commit.files_changed
                ),
                json!({
                    "commit_sha": commit.sha,
                    "commit_index": index,
                    "timestamp": commit.timestamp.to_rfc3339(),
                    "total_changes": commit.total_changes(),
                    "additions": commit.additions,
                    "deletions": commit.deletions,
                    "files_changed": commit.files_changed,
                    "message": commit.message,
                    "exceeded": exceeded,
                    "change_threshold": ctx.config.large_commit_threshold,
                    "file_threshold": ctx.config.suspicious_file_count,
                }),
            )
            .with_timestamp(commit.timestamp),
        );
    }

    Ok(violations)
}

fn check_excessive_contributors(ctx: &CheckContext<'_>) -> Result<Vec<Violation>> {
    let actual = ctx.snapshot.contributors.len();
    let max_allowed = ctx.window.max_team_size;
    if actual <= max_allowed {
        return Ok(Vec::new());
    }

    Ok(vec![Violation::new(
        ViolationKind::ExcessiveContributors,
        Severity::High,
        format!(
            "Repository has {} contributors, max allowed is {}",
            actual, max_allowed
        ),
        json!({
            "actual_contributors": actual,
            "max_allowed": max_allowed,
            "contributors": ctx.snapshot.contributors,
            "team_size": ctx.team.members.len(),
        }),
    )])
}

/// Bucket commits by timestamp truncated to the minute; any bucket over the
/// per-minute threshold is reported.
fn check_rapid_commits(ctx: &CheckContext<'_>) -> Result<Vec<Violation>> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<&Commit>> = BTreeMap::new();
    for commit in &ctx.snapshot.commits {
        let bucket = commit.timestamp.duration_trunc(TimeDelta::minutes(1))?;
        buckets.entry(bucket).or_default().push(commit);
    }

    let mut violations = Vec::new();
    for (bucket, commits) in buckets {
        if commits.len() <= ctx.config.max_commits_per_minute {
            continue;
        }
        let total_changes: u64 = commits.iter().map(|c| c.total_changes()).sum();
        violations.push(Violation::new(
            ViolationKind::SuspiciousTiming,
            Severity::Medium,
            format!(
                "Rapid commits: {} commits in 1 minute at {}",
                commits.len(),
                bucket.to_rfc3339()
            ),
            json!({
                "timestamp": bucket.to_rfc3339(),
                "commit_count": commits.len(),
                "total_changes": total_changes,
                "threshold": ctx.config.max_commits_per_minute,
            }),
        ));
    }

    Ok(violations)
}

/// Commits sharing an exact timestamp usually mean scripted history rewrites;
/// one low-severity summary covers all such groups.
fn check_identical_timestamps(ctx: &CheckContext<'_>) -> Result<Vec<Violation>> {
    let mut counts: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for commit in &ctx.snapshot.commits {
        *counts.entry(commit.timestamp).or_default() += 1;
    }

    let groups: Vec<(DateTime<Utc>, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let total: usize = groups.iter().map(|(_, count)| count).sum();
    let examples: Vec<_> = groups
        .iter()
        .take(ctx.config.example_group_limit)
        .map(|(ts, count)| json!({ "timestamp": ts.to_rfc3339(), "count": count }))
        .collect();

    Ok(vec![Violation::new(
        ViolationKind::SuspiciousTiming,
        Severity::Low,
        format!(
            "Found {} groups of commits with identical timestamps ({} total commits)",
            groups.len(),
            total
        ),
        json!({
            "identical_groups": groups.len(),
            "total_identical_commits": total,
            "examples": examples,
        }),
    )])
}
