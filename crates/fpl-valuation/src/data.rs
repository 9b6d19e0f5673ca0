// Input loading and output persistence for the pipeline's JSON files.
//
// Inputs are the filtered teams/fixtures/players written by the cleaning
// step. Outputs are only written after every stage has succeeded, so a failed
// run never leaves a partial set of artifacts behind.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::valuation::season_stats::{recent_net_points, GameweekScore};
use crate::valuation::ValuationReport;

pub const TEAMS_FILE: &str = "filtered_teams.json";
pub const FIXTURES_FILE: &str = "filtered_fixtures.json";
pub const PLAYERS_FILE: &str = "filtered_players.json";

pub const TEAMS_OUTPUT_FILE: &str = "teams_cleaned.json";
pub const PLAYERS_OUTPUT_FILE: &str = "final_players_sorted.json";
pub const LEAGUE_OUTPUT_FILE: &str = "league_stats.json";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTeam {
    pub id: u32,
    pub name: String,
}

/// One fixture between two teams. `event` is the gameweek index and is null
/// for fixtures that have not been scheduled yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFixture {
    pub event: Option<u32>,
    #[serde(default)]
    pub finished: bool,
    pub team_a: u32,
    pub team_a_difficulty: u8,
    pub team_h: u32,
    pub team_h_difficulty: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlayer {
    pub id: u32,
    pub first_name: String,
    pub second_name: String,
    pub full_name: String,
    pub team: u32,
    pub element_type: u8,
    pub status: String,
    /// Current season first.
    pub seasons: Vec<RawSeason>,
}

/// A player's totals for one season, as produced by the cleaning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeason {
    pub season: String,
    pub minutes: u32,
    pub total_points: i32,
    pub points_per_game: f64,
    /// Cost in tenths of the display currency.
    pub now_cost: f64,
    /// Net points for up to five most-recent gameweeks, most recent first.
    /// A full chronological gameweek log is also accepted and reduced here.
    #[serde(default, deserialize_with = "deserialize_gw_history")]
    pub gw_history: Vec<i32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GameweekHistory {
    Net(Vec<i32>),
    Log(Vec<GameweekScore>),
}

fn deserialize_gw_history<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match GameweekHistory::deserialize(deserializer)? {
        GameweekHistory::Net(points) => points,
        GameweekHistory::Log(log) => recent_net_points(&log),
    })
}

/// Everything the valuation stages consume, loaded once up front.
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub teams: Vec<RawTeam>,
    pub fixtures: Vec<RawFixture>,
    pub players: Vec<RawPlayer>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Decode a JSON array from any reader. `path` is only used for error context.
fn read_json<T: DeserializeOwned, R: Read>(rdr: R, path: &Path) -> Result<T, DataError> {
    serde_json::from_reader(rdr).map_err(|e| DataError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_json(std::io::BufReader::new(file), path)
}

/// Load the three filtered input files from `dir`.
pub fn load_inputs(dir: &Path) -> Result<PipelineInput, DataError> {
    let teams: Vec<RawTeam> = load_json_file(&dir.join(TEAMS_FILE))?;
    let fixtures: Vec<RawFixture> = load_json_file(&dir.join(FIXTURES_FILE))?;
    let players: Vec<RawPlayer> = load_json_file(&dir.join(PLAYERS_FILE))?;

    info!(
        "Loaded {} teams, {} fixtures, {} players from {}",
        teams.len(),
        fixtures.len(),
        players.len(),
        dir.display()
    );

    Ok(PipelineInput {
        teams,
        fixtures,
        players,
    })
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

fn encode<T: Serialize + ?Sized>(value: &T, path: PathBuf) -> Result<(PathBuf, String), DataError> {
    match serde_json::to_string_pretty(value) {
        Ok(text) => Ok((path, text)),
        Err(e) => Err(DataError::Encode { path, source: e }),
    }
}

/// Write the ranked players, scored teams and league table into `dir`.
///
/// All three documents are encoded before the first byte hits disk.
pub fn write_outputs(dir: &Path, report: &ValuationReport) -> Result<Vec<PathBuf>, DataError> {
    let documents = [
        encode(&report.teams, dir.join(TEAMS_OUTPUT_FILE))?,
        encode(&report.players, dir.join(PLAYERS_OUTPUT_FILE))?,
        encode(&report.league, dir.join(LEAGUE_OUTPUT_FILE))?,
    ];

    std::fs::create_dir_all(dir).map_err(|e| DataError::Write {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::with_capacity(documents.len());
    for (path, text) in documents {
        std::fs::write(&path, text).map_err(|e| DataError::Write {
            path: path.clone(),
            source: e,
        })?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Saved {} output files to {}", written.len(), dir.display());
    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_player_with_seasons() {
        let json = r#"[{
            "id": 7, "first_name": "Bukayo", "second_name": "Saka",
            "full_name": "bukayo saka", "team": 1, "element_type": 3,
            "status": "a",
            "seasons": [{
                "season": "2024/25", "minutes": 900, "total_points": 60,
                "points_per_game": 6.0, "now_cost": 100, "gw_history": [8, 2, 0]
            }]
        }]"#;
        let players: Vec<RawPlayer> = read_json(json.as_bytes(), Path::new("players")).unwrap();
        assert_eq!(players.len(), 1);
        let season = &players[0].seasons[0];
        assert_eq!(season.minutes, 900);
        assert_eq!(season.now_cost, 100.0);
        assert_eq!(season.gw_history, vec![8, 2, 0]);
    }

    #[test]
    fn missing_gw_history_defaults_to_empty() {
        let json = r#"{"season": "2023/24", "minutes": 0, "total_points": 0,
                       "points_per_game": 0.0, "now_cost": 45}"#;
        let season: RawSeason = read_json(json.as_bytes(), Path::new("season")).unwrap();
        assert!(season.gw_history.is_empty());
    }

    #[test]
    fn full_gameweek_log_is_reduced_to_recent_net_points() {
        let json = r#"{"season": "2024/25", "minutes": 400, "total_points": 40,
                       "points_per_game": 5.7, "now_cost": 80,
                       "gw_history": [
                           {"round": 1, "minutes": 90, "total_points": 2},
                           {"round": 2, "minutes": 90, "total_points": 9},
                           {"round": 3, "minutes": 0, "total_points": 0},
                           {"round": 4, "minutes": 30, "total_points": 1},
                           {"round": 5, "minutes": 75, "total_points": 6},
                           {"round": 6, "minutes": 90, "total_points": 14}
                       ]}"#;
        let season: RawSeason = read_json(json.as_bytes(), Path::new("season")).unwrap();
        assert_eq!(season.gw_history, vec![12, 4, 0, 0, 7]);
    }

    #[test]
    fn fixture_with_null_event_parses() {
        let json = r#"[{"event": null, "finished": false, "team_a": 2,
                        "team_a_difficulty": 3, "team_h": 5, "team_h_difficulty": 4}]"#;
        let fixtures: Vec<RawFixture> = read_json(json.as_bytes(), Path::new("fixtures")).unwrap();
        assert_eq!(fixtures[0].event, None);
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let json = r#"[{"id": 1}]"#;
        let err = read_json::<Vec<RawTeam>, _>(json.as_bytes(), Path::new("teams.json")).unwrap_err();
        match err {
            DataError::Decode { path, .. } => assert!(path.ends_with("teams.json")),
            other => panic!("expected Decode, got: {other}"),
        }
    }

    #[test]
    fn missing_input_file_is_a_read_error() {
        let tmp = std::env::temp_dir().join("fpl_data_test_missing_inputs");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let err = load_inputs(&tmp).unwrap_err();
        match err {
            DataError::Read { path, .. } => assert!(path.ends_with(TEAMS_FILE)),
            other => panic!("expected Read, got: {other}"),
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
