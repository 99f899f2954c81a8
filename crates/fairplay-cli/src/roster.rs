//! Roster loading: one CSV row per member, grouped into teams by team id in
//! first-seen order.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use fairplay_core::{Team, TeamError, TeamMember};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Distinct from an I/O error so the caller can fail fast with a clear
    /// message when the roster simply is not there.
    #[error("teams CSV file not found: {0}")]
    NotFound(String),

    #[error("parsing roster: {0}")]
    Parse(#[from] csv::Error),

    #[error(transparent)]
    Team(#[from] TeamError),
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    team_id: String,
    team_name: String,
    repository_url: String,
    #[serde(default)]
    devpost_url: String,
    member_name: String,
    github_username: String,
    #[serde(default)]
    email: String,
}

/// Load teams from a roster CSV. Team-size violations surface as errors
/// here, before any network traffic.
pub fn load_roster(path: &Path, max_team_size: usize) -> Result<Vec<Team>, RosterError> {
    if !path.exists() {
        return Err(RosterError::NotFound(path.display().to_string()));
    }

    struct Pending {
        name: String,
        repository_url: String,
        profile_url: Option<String>,
        members: Vec<TeamMember>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut pending: HashMap<String, Pending> = HashMap::new();

    let mut reader = csv::Reader::from_path(path)?;
    for row in reader.deserialize() {
        let row: RosterRow = row?;
        let entry = pending.entry(row.team_id.clone()).or_insert_with(|| {
            order.push(row.team_id.clone());
            Pending {
                name: row.team_name.clone(),
                repository_url: row.repository_url.clone(),
                profile_url: None,
                members: Vec::new(),
            }
        });
        if !row.devpost_url.trim().is_empty() {
            entry.profile_url = Some(row.devpost_url.trim().to_string());
        }
        entry.members.push(TeamMember {
            name: row.member_name,
            handle: row.github_username,
            email: if row.email.trim().is_empty() {
                None
            } else {
                Some(row.email.trim().to_string())
            },
        });
    }

    let mut teams = Vec::with_capacity(order.len());
    for id in order {
        let entry = pending.remove(&id).expect("id recorded on first sight");
        teams.push(Team::new(
            id,
            entry.name,
            entry.members,
            entry.profile_url,
            entry.repository_url,
            max_team_size,
        )?);
    }

    info!(teams = teams.len(), "loaded roster");
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "team_id,team_name,repository_url,devpost_url,member_name,github_username,email\n";

    fn write_roster(rows: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{HEADER}{rows}").unwrap();
        file
    }

    #[test]
    fn groups_rows_by_team_in_first_seen_order() {
        let file = write_roster(
            "t2,Beta,https://github.com/o/beta,,Bob,bob,bob@example.com\n\
             t1,Alpha,https://github.com/o/alpha,https://devpost.com/alpha,Alice,alice,\n\
             t2,Beta,https://github.com/o/beta,,Bea,bea,\n",
        );
        let teams = load_roster(file.path(), 4).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].id, "t2");
        assert_eq!(teams[0].members.len(), 2);
        assert_eq!(teams[1].id, "t1");
        assert_eq!(
            teams[1].profile_url.as_deref(),
            Some("https://devpost.com/alpha")
        );
        assert_eq!(teams[0].members[0].email.as_deref(), Some("bob@example.com"));
        assert!(teams[1].members[0].email.is_none());
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let err = load_roster(Path::new("/nonexistent/teams.csv"), 4).unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }

    #[test]
    fn oversized_team_fails_validation() {
        let rows: String = (0..5)
            .map(|i| format!("t1,Big,https://github.com/o/big,,M{i},m{i},\n"))
            .collect();
        let file = write_roster(&rows);
        let err = load_roster(file.path(), 4).unwrap_err();
        assert!(matches!(err, RosterError::Team(TeamError::TooLarge { .. })));
    }
}
