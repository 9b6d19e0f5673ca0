// Per-season performance metrics derived from recent net-point history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{RawPlayer, RawSeason};
use crate::player::{PlayerProfile, Position};
use crate::valuation::fixtures::FixtureEasiness;
use crate::valuation::stats::{mean, population_variance, safe_divide};
use crate::valuation::{PipelineContext, ValuationError};

/// Number of most-recent gameweeks kept in a season's history.
pub const RECENT_GAMEWEEKS: usize = 5;

/// Minutes at which a full appearance bonus is awarded.
const FULL_APPEARANCE_MINUTES: u32 = 60;

const FULL_APPEARANCE_BONUS: i32 = 2;
const PART_APPEARANCE_BONUS: i32 = 1;

/// Variance at which the consistency factor crosses zero.
const CONSISTENCY_CEILING: f64 = 100.0;

/// Costs are published in tenths of the display currency.
pub const COST_SCALE: f64 = 10.0;

// ---------------------------------------------------------------------------
// Net points
// ---------------------------------------------------------------------------

/// One entry of a chronological gameweek log; extra fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GameweekScore {
    pub minutes: u32,
    pub total_points: i32,
}

/// Raw gameweek points minus the appearance bonus, isolating what the player
/// actually did on the pitch.
pub fn net_points(minutes: u32, total_points: i32) -> i32 {
    match minutes {
        0 => total_points,
        m if m >= FULL_APPEARANCE_MINUTES => total_points - FULL_APPEARANCE_BONUS,
        _ => total_points - PART_APPEARANCE_BONUS,
    }
}

/// Net points for the most recent `RECENT_GAMEWEEKS` entries of a
/// chronological gameweek history, most recent first.
pub fn recent_net_points(history: &[GameweekScore]) -> Vec<i32> {
    history
        .iter()
        .rev()
        .take(RECENT_GAMEWEEKS)
        .map(|gw| net_points(gw.minutes, gw.total_points))
        .collect()
}

// ---------------------------------------------------------------------------
// Processed season
// ---------------------------------------------------------------------------

/// Season figures that stay fixed once the history has been summarized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonTotals {
    pub season: String,
    pub minutes: u32,
    pub total_points: i32,
    pub points_per_game: f64,
    /// Rescaled to the display currency.
    pub now_cost: f64,
    pub effective_total_points: f64,
    pub gw_avg_points: f64,
    pub variance: f64,
    pub total_games: u32,
}

/// A season after summarizing its recent history; `consistency_factor` is
/// still on its raw scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedSeason {
    #[serde(flatten)]
    pub totals: SeasonTotals,
    pub consistency_factor: f64,
}

/// Games played, recovered from total points and points-per-game.
///
/// Ties round to even; a player with no points-per-game has played 0 games.
pub fn total_games(total_points: i32, points_per_game: f64) -> u32 {
    let games = safe_divide(f64::from(total_points), points_per_game).round_ties_even();
    if games.is_finite() && games > 0.0 {
        games as u32
    } else {
        0
    }
}

/// `gw_avg_points * (100 - variance)`: high for steady high scorers, and not
/// clamped, so it can go negative.
pub fn consistency_factor(gw_avg_points: f64, variance: f64) -> f64 {
    gw_avg_points * (CONSISTENCY_CEILING - variance)
}

pub fn process_season(raw: &RawSeason) -> ProcessedSeason {
    let history: Vec<f64> = raw.gw_history.iter().map(|p| f64::from(*p)).collect();

    let (effective_total_points, gw_avg_points, variance, consistency) = if history.is_empty() {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        let avg = mean(&history);
        let variance = if history.len() > 1 {
            population_variance(&history)
        } else {
            0.0
        };
        (
            history.iter().sum::<f64>(),
            avg,
            variance,
            consistency_factor(avg, variance),
        )
    };

    ProcessedSeason {
        totals: SeasonTotals {
            season: raw.season.clone(),
            minutes: raw.minutes,
            total_points: raw.total_points,
            points_per_game: raw.points_per_game,
            now_cost: raw.now_cost / COST_SCALE,
            effective_total_points,
            gw_avg_points,
            variance,
            total_games: total_games(raw.total_points, raw.points_per_game),
        },
        consistency_factor: consistency,
    }
}

// ---------------------------------------------------------------------------
// Processed player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedPlayer {
    pub profile: PlayerProfile,
    /// The player's team score from the fixture stage, not yet rescaled.
    pub team_fer_points: f64,
    pub seasons: Vec<ProcessedSeason>,
    pub total_career_games: u32,
}

/// Output of the season stage: processed players plus, per season label, the
/// highest raw consistency factor seen (never below 0).
#[derive(Debug, Clone, Default)]
pub struct SeasonStats {
    pub players: Vec<ProcessedPlayer>,
    pub max_consistency: BTreeMap<String, f64>,
}

/// Summarize every player's seasons and join them to their team.
///
/// Fails on records that reference a team, season or element type the run
/// does not know about.
pub fn process_players(
    players: &[RawPlayer],
    easiness: &FixtureEasiness,
    ctx: &PipelineContext,
) -> Result<SeasonStats, ValuationError> {
    let mut max_consistency: BTreeMap<String, f64> =
        ctx.seasons.iter().map(|s| (s.clone(), 0.0)).collect();
    let mut processed = Vec::with_capacity(players.len());

    for raw in players {
        let position = Position::from_element_type(raw.element_type).ok_or(
            ValuationError::UnknownElementType {
                player_id: raw.id,
                element_type: raw.element_type,
            },
        )?;
        let team = easiness.team(raw.team).ok_or(ValuationError::UnknownTeam {
            player_id: raw.id,
            team_id: raw.team,
        })?;

        let mut seasons = Vec::with_capacity(raw.seasons.len());
        for raw_season in &raw.seasons {
            let max = max_consistency.get_mut(&raw_season.season).ok_or_else(|| {
                ValuationError::UnknownSeason {
                    player_id: raw.id,
                    season: raw_season.season.clone(),
                }
            })?;
            let season = process_season(raw_season);
            *max = max.max(season.consistency_factor);
            seasons.push(season);
        }

        let total_career_games = seasons.iter().map(|s| s.totals.total_games).sum();

        processed.push(ProcessedPlayer {
            profile: PlayerProfile::new(raw, position, &team.name),
            team_fer_points: team.fer_points,
            seasons,
            total_career_games,
        });
    }

    Ok(SeasonStats {
        players: processed,
        max_consistency,
    })
}
