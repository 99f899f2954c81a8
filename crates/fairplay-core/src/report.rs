//! Run-level aggregation: a pure fold of per-team results.

use chrono::Utc;
use std::collections::BTreeMap;

use crate::types::{HackathonWindow, RunReport, TeamResult, ViolationKind};

/// Fold per-team results into a run report with counts and a violation-kind
/// histogram. No side effects, no I/O.
///
/// The histogram is not deduplicated: a team with three code-reuse findings
/// contributes three to that bucket.
pub fn aggregate(window: &HackathonWindow, results: Vec<TeamResult>) -> RunReport {
    let total_teams = results.len();
    let flagged_teams = results.iter().filter(|r| r.is_flagged()).count();

    let mut summary_stats: BTreeMap<ViolationKind, usize> = BTreeMap::new();
    for result in &results {
        for violation in &result.violations {
            *summary_stats.entry(violation.kind).or_default() += 1;
        }
    }

    RunReport {
        window: window.clone(),
        total_teams,
        flagged_teams,
        results,
        generated_at: Utc::now(),
        summary_stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        RepositorySnapshot, Severity, Team, TeamMember, Violation,
    };
    use chrono::TimeZone;
    use serde_json::json;

    fn window() -> HackathonWindow {
        let start = Utc.with_ymd_and_hms(2026, 9, 25, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 9, 26, 12, 0, 0).unwrap();
        HackathonWindow::new("HackTest", start, end, 2, 4, 1000).unwrap()
    }

    fn result(name: &str, violations: Vec<Violation>) -> TeamResult {
        let team = Team::new(
            name,
            name,
            vec![TeamMember {
                name: "a".into(),
                handle: "a".into(),
                email: None,
            }],
            None,
            "https://example.com/r",
            4,
        )
        .unwrap();
        let snapshot = RepositorySnapshot {
            url: "https://example.com/r".into(),
            name: "r".into(),
            owner: "o".into(),
            created_at: Utc::now(),
            commits: vec![],
            contributors: vec![],
        };
        TeamResult::new(team, snapshot, violations, "s")
    }

    #[test]
    fn counts_and_histogram_match_raw_evidence() {
        let results = vec![
            result(
                "one",
                vec![
                    Violation::new(ViolationKind::CodeReuse, Severity::High, "a", json!({})),
                    Violation::new(ViolationKind::CodeReuse, Severity::Medium, "b", json!({})),
                    Violation::new(
                        ViolationKind::SuspiciousTiming,
                        Severity::Low,
                        "c",
                        json!({}),
                    ),
                ],
            ),
            result(
                "two",
                vec![Violation::new(
                    ViolationKind::SuspiciousTiming,
                    Severity::Medium,
                    "d",
                    json!({}),
                )],
            ),
            result("three", vec![]),
        ];

        let report = aggregate(&window(), results);
        assert_eq!(report.total_teams, 3);
        assert_eq!(report.flagged_teams, 1);
        assert_eq!(report.summary_stats[&ViolationKind::CodeReuse], 2);
        assert_eq!(report.summary_stats[&ViolationKind::SuspiciousTiming], 2);
        let histogram_total: usize = report.summary_stats.values().sum();
        let raw_total: usize = report.results.iter().map(|r| r.violations.len()).sum();
        assert_eq!(histogram_total, raw_total);
    }

    #[test]
    fn failed_results_still_count_toward_totals() {
        let team = Team::new("x", "x", vec![], None, "u", 4).unwrap();
        let results = vec![TeamResult::failed(team, "fetch failed")];
        let report = aggregate(&window(), results);
        assert_eq!(report.total_teams, 1);
        assert_eq!(report.flagged_teams, 0);
        assert!(report.summary_stats.is_empty());
    }
}
