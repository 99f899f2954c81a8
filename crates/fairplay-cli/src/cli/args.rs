use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fairplay",
    version,
    about = "Audit hackathon team repositories for rule violations and produce a severity-ranked report"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch, evaluate, and report on every team in the roster
    Run(RunArgs),
    /// Validate the event config and roster without touching the network
    Check(CheckArgs),
    Version,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Roster CSV (one row per member, grouped by team_id)
    #[arg(long)]
    pub teams: PathBuf,

    /// Event configuration YAML (window, team rules, thresholds)
    #[arg(long)]
    pub event: PathBuf,

    /// Reference corpus for the code-reuse check (overrides the event config)
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Write the full JSON report here
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Skip the code-reuse check even if a reference corpus is configured
    #[arg(long, default_value_t = false)]
    pub skip_code_check: bool,

    /// Maximum source files fetched per repository for the reuse check
    #[arg(long)]
    pub max_files: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Roster CSV
    #[arg(long)]
    pub teams: PathBuf,

    /// Event configuration YAML
    #[arg(long)]
    pub event: PathBuf,
}
