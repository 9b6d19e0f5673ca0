// Valuation pipeline: fixture easiness, season stats, consistency,
// league baselines, playing-time value, final ranking.

pub mod consistency;
pub mod fixtures;
pub mod league;
pub mod ranking;
pub mod season_stats;
pub mod stats;
pub mod value_points;

use tracing::info;

use crate::config::Config;
use crate::data::PipelineInput;
use self::fixtures::ScoredTeam;
use self::league::LeagueTable;
use self::ranking::RankedPlayer;

/// Run-wide settings every stage reads. Built once from the config and the
/// resolved next gameweek.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub current_season: String,
    /// Every season label a player record may carry.
    pub seasons: Vec<String>,
    /// First gameweek that has not been played yet.
    pub next_gameweek: u32,
    pub past_season_gameweeks: u32,
}

impl PipelineContext {
    pub fn from_config(config: &Config, next_gameweek: u32) -> Self {
        PipelineContext {
            current_season: config.seasons.current.clone(),
            seasons: config.seasons.all.clone(),
            next_gameweek,
            past_season_gameweeks: config.seasons.past_season_gameweeks,
        }
    }

    pub fn is_current(&self, season: &str) -> bool {
        self.current_season == season
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValuationError {
    #[error("player {player_id} belongs to unknown team {team_id}")]
    UnknownTeam { player_id: u32, team_id: u32 },

    #[error("player {player_id} has a record for unconfigured season `{season}`")]
    UnknownSeason { player_id: u32, season: String },

    #[error("player {player_id} has unknown element type {element_type}")]
    UnknownElementType { player_id: u32, element_type: u8 },
}

/// Everything the persister writes.
#[derive(Debug, Clone)]
pub struct ValuationReport {
    /// Sorted descending by `fer_points`.
    pub teams: Vec<ScoredTeam>,
    /// Sorted descending by `final_value`.
    pub players: Vec<RankedPlayer>,
    pub league: LeagueTable,
}

/// Run every valuation stage over the loaded input.
pub fn run_pipeline(
    input: &PipelineInput,
    ctx: &PipelineContext,
) -> Result<ValuationReport, ValuationError> {
    info!("Calculating fixture easiness ratings...");
    let easiness = fixtures::score_teams(&input.teams, &input.fixtures, ctx);
    info!("Max FER points: {:.3}", easiness.max_fer_points);

    info!("Processing player data...");
    let season_stats = season_stats::process_players(&input.players, &easiness, ctx)?;

    info!("Normalizing consistency...");
    info!("Max consistency values: {:?}", season_stats.max_consistency);
    let normalized = consistency::normalize_players(
        season_stats.players,
        &season_stats.max_consistency,
        ctx,
    );

    info!("Calculating league stats...");
    let league = league::aggregate(&normalized, ctx);
    for (season, data) in &league {
        info!(
            "League stats {season}: {} players, avg {:.2} effective points, avg {:.2} minutes per gameweek",
            data.total_players,
            data.avg_effective_total_points_per_player,
            data.avg_minutes_per_player
        );
    }

    info!("Calculating player values...");
    let (valued, max_value_points) =
        value_points::award_value_points(normalized, &league, easiness.max_fer_points);
    info!("Max value points: {:.3}", max_value_points);

    let players = ranking::rank_players(valued);
    if let Some(top) = players.first() {
        info!(
            "Ranked {} players; top is {} ({}, {}) with final value {:.2}",
            players.len(),
            top.profile.full_name,
            top.profile.position,
            top.profile.team_name,
            top.final_value
        );
    } else {
        info!("No players to rank");
    }

    Ok(ValuationReport {
        teams: easiness.teams,
        players,
        league,
    })
}
