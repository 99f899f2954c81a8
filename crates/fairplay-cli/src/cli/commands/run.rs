//! `fairplay run`: the batch driver. Loads config and roster, fetches each
//! team's snapshot, evaluates, aggregates, and reports.

use anyhow::Context;
use tracing::{info, warn};

use fairplay_core::{aggregate, Evaluator, SimilarityEngine, TeamResult};
use fairplay_github::GithubClient;

use crate::cli::args::RunArgs;
use crate::exit_codes::{EXIT_FLAGGED, EXIT_SUCCESS};
use crate::{event, output, roster};

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let (window, mut config) = event::load(&args.event)?;
    if let Some(reference) = args.reference {
        config.reference_file = Some(reference);
    }
    if let Some(max_files) = args.max_files {
        config.max_source_files = max_files;
    }
    config.validate().context("invalid analysis configuration")?;

    let teams = roster::load_roster(&args.teams, window.max_team_size)?;
    info!(
        event = %window.name,
        teams = teams.len(),
        "starting hackathon analysis"
    );

    let similarity = if args.skip_code_check {
        None
    } else {
        config
            .reference_file
            .as_ref()
            .map(|path| SimilarityEngine::from_reference_file(path, &config))
    };
    let evaluator = Evaluator::new(window.clone(), config.clone(), similarity);

    let github = GithubClient::from_env().context("initializing GitHub client")?;

    let total = teams.len();
    let mut results = Vec::with_capacity(total);
    for (index, team) in teams.into_iter().enumerate() {
        info!(team = %team.name, repo = %team.repository_url, "analyzing team");

        // One team's fetch or parse failure never aborts the batch; it
        // becomes an explicit failure marker in the report.
        let result = match github.fetch_snapshot(&team.repository_url).await {
            Ok(snapshot) => {
                let files = if evaluator.wants_source_files() {
                    match github
                        .fetch_source_files(&team.repository_url, config.max_source_files)
                        .await
                    {
                        Ok(files) => files,
                        Err(err) => {
                            warn!(team = %team.name, error = %err, "source fetch failed; skipping code-reuse check");
                            Vec::new()
                        }
                    }
                } else {
                    Vec::new()
                };
                evaluator.evaluate_with_sources(&team, &snapshot, &files)
            }
            Err(err) => {
                warn!(team = %team.name, error = %err, "snapshot fetch failed");
                TeamResult::failed(team, err.to_string())
            }
        };

        output::print_team_line(index, total, &result);
        results.push(result);
    }

    let report = aggregate(evaluator.window(), results);
    output::print_run_summary(&report);

    if let Some(path) = args.output {
        output::write_report(&report, &path)?;
    }

    Ok(if report.flagged_teams > 0 {
        EXIT_FLAGGED
    } else {
        EXIT_SUCCESS
    })
}
