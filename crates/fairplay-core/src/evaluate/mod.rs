//! Rule evaluator: runs the check battery over a team and its repository
//! snapshot and folds the evidence into a [`TeamResult`].

pub mod checks;

use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::similarity::{SimilarityEngine, SourceFile};
use crate::types::{
    HackathonWindow, RepositorySnapshot, Severity, Team, TeamResult, Violation,
};
use checks::{CheckContext, CHECKS};

/// Per-team violation detector.
///
/// Evaluation is a pure function of (team, snapshot, static configuration):
/// no shared mutable state, so teams may be evaluated concurrently.
pub struct Evaluator {
    window: HackathonWindow,
    config: AnalysisConfig,
    similarity: Option<SimilarityEngine>,
}

impl Evaluator {
    pub fn new(
        window: HackathonWindow,
        config: AnalysisConfig,
        similarity: Option<SimilarityEngine>,
    ) -> Self {
        Self {
            window,
            config,
            similarity,
        }
    }

    pub fn window(&self) -> &HackathonWindow {
        &self.window
    }

    /// True when a usable reference corpus is configured, i.e. fetching
    /// candidate source files is worthwhile.
    pub fn wants_source_files(&self) -> bool {
        self.similarity.as_ref().is_some_and(|e| e.is_active())
    }

    /// Run the commit/contributor checks only.
    pub fn evaluate(&self, team: &Team, snapshot: &RepositorySnapshot) -> TeamResult {
        self.evaluate_with_sources(team, snapshot, &[])
    }

    /// Run the full battery, including the code-reuse check over the given
    /// candidate files when a reference corpus is configured.
    ///
    /// Never fails for data-shape issues: a check that errors internally is
    /// logged and contributes no evidence, and the remaining checks still run.
    pub fn evaluate_with_sources(
        &self,
        team: &Team,
        snapshot: &RepositorySnapshot,
        files: &[SourceFile],
    ) -> TeamResult {
        debug!(team = %team.name, commits = snapshot.commits.len(), "evaluating team");

        let ctx = CheckContext {
            team,
            snapshot,
            window: &self.window,
            config: &self.config,
        };

        let mut violations = Vec::new();
        for check in CHECKS {
            match (check.run)(&ctx) {
                Ok(mut found) => violations.append(&mut found),
                Err(err) => {
                    warn!(
                        team = %team.name,
                        check = check.id,
                        error = %err,
                        "check failed; treating as no evidence"
                    );
                }
            }
        }

        if let Some(engine) = &self.similarity {
            if !files.is_empty() {
                violations.extend(engine.compare(files));
            }
        }

        let summary = summarize(team, &violations);
        TeamResult::new(team.clone(), snapshot.clone(), violations, summary)
    }
}

/// Deterministic summary text: a clean message when nothing was found,
/// otherwise one line per non-empty severity tier listing the distinct
/// violation kinds in that tier.
fn summarize(team: &Team, violations: &[Violation]) -> String {
    if violations.is_empty() {
        return format!(
            "Team '{}' passed all checks - no violations detected.",
            team.name
        );
    }

    let mut lines = vec![format!(
        "Team '{}' flagged with {} violation(s):",
        team.name,
        violations.len()
    )];

    for (severity, label) in [
        (Severity::High, "HIGH"),
        (Severity::Medium, "MEDIUM"),
        (Severity::Low, "LOW"),
    ] {
        let tier: Vec<&Violation> = violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect();
        if tier.is_empty() {
            continue;
        }
        let mut kinds: Vec<&str> = Vec::new();
        for violation in &tier {
            let kind = violation.kind.as_str();
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        lines.push(format!(
            "  {} ({}): {}",
            label,
            tier.len(),
            kinds.join(", ")
        ));
    }

    lines.join("\n")
}
