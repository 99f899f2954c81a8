//! Event configuration: the hackathon window and analysis thresholds,
//! loaded once per run from a YAML file.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use std::path::Path;

use fairplay_core::{AnalysisConfig, HackathonWindow};

#[derive(Debug, Deserialize)]
struct EventFile {
    name: String,
    /// RFC 3339 with offset, e.g. `2026-09-25T09:00:00-04:00`.
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
    #[serde(default = "default_grace_hours")]
    grace_period_hours: i64,
    #[serde(default = "default_max_team_size")]
    max_team_size: usize,
    #[serde(default = "default_large_commit_threshold")]
    large_commit_threshold: u64,
    /// Optional analysis-threshold overrides; unset fields keep defaults.
    #[serde(default)]
    analysis: AnalysisOverrides,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisOverrides {
    large_commit_threshold: Option<u64>,
    suspicious_file_count: Option<u64>,
    max_commits_per_minute: Option<usize>,
    reference_file: Option<std::path::PathBuf>,
    similarity_high_threshold: Option<f64>,
    similarity_medium_threshold: Option<f64>,
    max_source_files: Option<usize>,
}

fn default_grace_hours() -> i64 {
    1
}

fn default_max_team_size() -> usize {
    4
}

fn default_large_commit_threshold() -> u64 {
    1000
}

/// Load and validate the event configuration.
pub fn load(path: &Path) -> Result<(HackathonWindow, AnalysisConfig)> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading event config {}", path.display()))?;
    parse(&raw).with_context(|| format!("parsing event config {}", path.display()))
}

fn parse(raw: &str) -> Result<(HackathonWindow, AnalysisConfig)> {
    let event: EventFile = serde_yaml::from_str(raw)?;

    let window = HackathonWindow::new(
        event.name,
        event.start_time.with_timezone(&Utc),
        event.end_time.with_timezone(&Utc),
        event.grace_period_hours,
        event.max_team_size,
        event.large_commit_threshold,
    )?;

    let defaults = AnalysisConfig::default();
    let overrides = event.analysis;
    let config = AnalysisConfig {
        large_commit_threshold: overrides
            .large_commit_threshold
            .unwrap_or(window.large_commit_threshold),
        suspicious_file_count: overrides
            .suspicious_file_count
            .unwrap_or(defaults.suspicious_file_count),
        max_commits_per_minute: overrides
            .max_commits_per_minute
            .unwrap_or(defaults.max_commits_per_minute),
        reference_file: overrides.reference_file,
        similarity_high_threshold: overrides
            .similarity_high_threshold
            .unwrap_or(defaults.similarity_high_threshold),
        similarity_medium_threshold: overrides
            .similarity_medium_threshold
            .unwrap_or(defaults.similarity_medium_threshold),
        max_source_files: overrides
            .max_source_files
            .unwrap_or(defaults.max_source_files),
        ..defaults
    };
    config.validate()?;

    Ok((window, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
name: HackUMBC 2026
start_time: 2026-09-25T09:00:00-04:00
end_time: 2026-09-26T12:00:00-04:00
";

    #[test]
    fn minimal_event_uses_defaults() {
        let (window, config) = parse(MINIMAL).unwrap();
        assert_eq!(window.name, "HackUMBC 2026");
        assert_eq!(window.grace_period_hours, 1);
        assert_eq!(window.max_team_size, 4);
        assert_eq!(config.max_commits_per_minute, 3);
        assert!(config.reference_file.is_none());
        // Offsets are normalized to UTC.
        assert_eq!(window.start.to_rfc3339(), "2026-09-25T13:00:00+00:00");
    }

    #[test]
    fn overrides_are_applied_and_validated() {
        let raw = format!(
            "{MINIMAL}grace_period_hours: 2\nanalysis:\n  max_commits_per_minute: 5\n"
        );
        let (window, config) = parse(&raw).unwrap();
        assert_eq!(window.grace_period_hours, 2);
        assert_eq!(config.max_commits_per_minute, 5);

        let bad = format!("{MINIMAL}analysis:\n  similarity_high_threshold: 0.2\n");
        assert!(parse(&bad).is_err());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let raw = "\
name: Backwards
start_time: 2026-09-26T12:00:00-04:00
end_time: 2026-09-25T09:00:00-04:00
";
        assert!(parse(raw).is_err());
    }
}
