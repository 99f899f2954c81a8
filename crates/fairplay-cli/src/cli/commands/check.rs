//! `fairplay check`: validate event config and roster without network access.

use crate::cli::args::CheckArgs;
use crate::exit_codes::EXIT_SUCCESS;
use crate::{event, roster};

pub fn run(args: CheckArgs) -> anyhow::Result<i32> {
    let (window, config) = event::load(&args.event)?;
    let teams = roster::load_roster(&args.teams, window.max_team_size)?;

    println!("Event:  {}", window.name);
    println!("Window: {} .. {}", window.start, window.end);
    println!(
        "Grace:  {}h, max team size {}",
        window.grace_period_hours, window.max_team_size
    );
    println!("Teams:  {}", teams.len());
    match &config.reference_file {
        Some(path) => println!("Code comparison reference: {}", path.display()),
        None => println!("Code comparison disabled (no reference file)"),
    }
    println!("OK");
    Ok(EXIT_SUCCESS)
}
