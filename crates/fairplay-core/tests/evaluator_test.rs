//! End-to-end evaluator scenarios: full battery over realistic snapshots.

use chrono::{Duration, TimeZone, Utc};
use fairplay_core::{
    aggregate, AnalysisConfig, Commit, Evaluator, HackathonWindow, RepositorySnapshot, Severity,
    SimilarityEngine, SourceFile, Team, TeamMember, TeamResult, ViolationKind,
};

fn window() -> HackathonWindow {
    let start = Utc.with_ymd_and_hms(2026, 9, 25, 9, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 9, 26, 12, 0, 0).unwrap();
    HackathonWindow::new("HackTest 2026", start, end, 2, 4, 1000).unwrap()
}

fn team(handles: &[&str]) -> Team {
    let members = handles
        .iter()
        .map(|h| TeamMember {
            name: h.to_string(),
            handle: h.to_string(),
            email: Some(format!("{h}@example.com")),
        })
        .collect();
    Team::new("t1", "Rustaceans", members, None, "https://github.com/o/r", 4).unwrap()
}

fn commit(sha: &str, author: &str, ts: chrono::DateTime<Utc>, changes: u64) -> Commit {
    Commit {
        sha: sha.to_string(),
        author: author.to_string(),
        author_email: format!("{author}@example.com"),
        timestamp: ts,
        message: format!("work by {author}"),
        additions: changes,
        deletions: 0,
        files_changed: 2,
    }
}

fn snapshot(commits: Vec<Commit>, contributors: &[&str]) -> RepositorySnapshot {
    RepositorySnapshot {
        url: "https://github.com/o/r".into(),
        name: "r".into(),
        owner: "o".into(),
        created_at: Utc.with_ymd_and_hms(2026, 9, 25, 9, 5, 0).unwrap(),
        commits,
        contributors: contributors.iter().map(|c| c.to_string()).collect(),
    }
}

#[test]
fn clean_repository_produces_no_violations() {
    let w = window();
    let evaluator = Evaluator::new(w.clone(), AnalysisConfig::default(), None);
    let t = team(&["alice", "bob"]);
    let snap = snapshot(
        vec![
            commit("c1", "alice", w.start + Duration::hours(1), 40),
            commit("c2", "bob", w.start + Duration::hours(5), 80),
            commit("c3", "alice", w.end - Duration::hours(1), 30),
        ],
        &["alice", "bob"],
    );

    let result = evaluator.evaluate(&t, &snap);
    assert!(result.violations.is_empty());
    assert!(!result.is_flagged());
    assert!(result.summary.contains("passed all checks"));
}

#[test]
fn early_commits_flag_the_team() {
    let w = window();
    let evaluator = Evaluator::new(w.clone(), AnalysisConfig::default(), None);
    let t = team(&["alice"]);
    let snap = snapshot(
        vec![commit("c1", "alice", w.start - Duration::days(3), 400)],
        &["alice"],
    );

    let result = evaluator.evaluate(&t, &snap);
    assert!(result.is_flagged());
    assert!(result
        .violations
        .iter()
        .any(|v| v.kind == ViolationKind::CommitsOutsideWindow && v.severity == Severity::High));
}

#[test]
fn medium_and_low_findings_do_not_flag() {
    let w = window();
    let evaluator = Evaluator::new(w.clone(), AnalysisConfig::default(), None);
    let t = team(&["alice"]);
    // One small early commit (medium) and a pair of identical timestamps (low).
    let ts = w.start + Duration::hours(1);
    let snap = snapshot(
        vec![
            commit("c1", "alice", w.start - Duration::hours(1), 10),
            commit("c2", "alice", ts, 5),
            commit("c3", "alice", ts, 5),
        ],
        &["alice"],
    );

    let result = evaluator.evaluate(&t, &snap);
    assert!(!result.violations.is_empty());
    assert!(result
        .violations
        .iter()
        .all(|v| v.severity != Severity::High));
    assert!(!result.is_flagged());
}

#[test]
fn code_reuse_runs_only_with_sources() {
    let w = window();
    let reference = "def f():\n    return 1\n";
    let config = AnalysisConfig::default();
    let engine = SimilarityEngine::new("ref.py", reference, &config);
    let evaluator = Evaluator::new(w.clone(), config, Some(engine));
    assert!(evaluator.wants_source_files());

    let t = team(&["alice"]);
    let snap = snapshot(
        vec![commit("c1", "alice", w.start + Duration::hours(1), 40)],
        &["alice"],
    );

    // Without files the reuse check contributes nothing.
    let result = evaluator.evaluate(&t, &snap);
    assert!(result.violations.is_empty());

    let files = vec![SourceFile {
        path: "main.py".into(),
        content: reference.to_string(),
    }];
    let result = evaluator.evaluate_with_sources(&t, &snap, &files);
    let reuse: Vec<_> = result
        .violations
        .iter()
        .filter(|v| v.kind == ViolationKind::CodeReuse)
        .collect();
    assert!(reuse.len() >= 2, "expected ratio and exact-copy evidence");
    assert!(result.is_flagged());
}

#[test]
fn run_report_accounts_for_every_team() {
    let w = window();
    let evaluator = Evaluator::new(w.clone(), AnalysisConfig::default(), None);

    let clean = team(&["alice"]);
    let clean_snap = snapshot(
        vec![commit("c1", "alice", w.start + Duration::hours(1), 40)],
        &["alice"],
    );
    let cheater = team(&["bob"]);
    let cheater_snap = snapshot(
        vec![commit("c2", "bob", w.start - Duration::days(1), 900)],
        &["bob"],
    );
    let broken = team(&["carol"]);

    let results = vec![
        evaluator.evaluate(&clean, &clean_snap),
        evaluator.evaluate(&cheater, &cheater_snap),
        TeamResult::failed(broken, "snapshot fetch failed: 404"),
    ];

    let report = aggregate(&w, results);
    assert_eq!(report.total_teams, 3);
    assert_eq!(report.flagged_teams, 1);
    assert_eq!(
        report.summary_stats[&ViolationKind::CommitsOutsideWindow],
        1
    );
    assert!(report.results.iter().any(|r| r.error.is_some()));
}
