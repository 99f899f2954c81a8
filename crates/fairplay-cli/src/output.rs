//! Human-readable summaries and JSON report persistence.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use fairplay_core::{RunReport, Severity, TeamResult};

/// One status line per team, printed as results come in.
pub fn print_team_line(index: usize, total: usize, result: &TeamResult) {
    let status = if result.error.is_some() {
        "ERROR  "
    } else if result.is_flagged() {
        "FLAGGED"
    } else {
        "CLEAN  "
    };
    println!(
        "[{}/{}] {} {} - {} violation(s)",
        index + 1,
        total,
        status,
        result.team.name,
        result.violations.len()
    );

    if result.violations.is_empty() {
        return;
    }
    let mut per_kind: BTreeMap<&str, (usize, usize, usize)> = BTreeMap::new();
    for violation in &result.violations {
        let counts = per_kind.entry(violation.kind.as_str()).or_default();
        match violation.severity {
            Severity::High => counts.0 += 1,
            Severity::Medium => counts.1 += 1,
            Severity::Low => counts.2 += 1,
        }
    }
    for (kind, (high, medium, low)) in per_kind {
        let mut parts = Vec::new();
        if high > 0 {
            parts.push(format!("{high} high"));
        }
        if medium > 0 {
            parts.push(format!("{medium} medium"));
        }
        if low > 0 {
            parts.push(format!("{low} low"));
        }
        println!("        {}: {}", kind, parts.join(", "));
    }
}

/// Final run totals and the violation-kind histogram.
pub fn print_run_summary(report: &RunReport) {
    println!();
    println!("=== {} ===", report.window.name);
    println!("Teams analyzed: {}", report.total_teams);
    println!("Teams flagged:  {}", report.flagged_teams);
    let failures = report.results.iter().filter(|r| r.error.is_some()).count();
    if failures > 0 {
        println!("Teams failed:   {failures}");
    }
    if !report.summary_stats.is_empty() {
        println!("Violations by kind:");
        for (kind, count) in &report.summary_stats {
            println!("  {kind}: {count}");
        }
    }
}

/// Persist the full report as pretty-printed JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating report file {}", path.display()))?;
    serde_json::to_writer_pretty(file, report).context("serializing report")?;
    println!("Report written to {}", path.display());
    Ok(())
}
