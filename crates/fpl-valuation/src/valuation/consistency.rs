// Consistency normalization and season weighting.
//
// Each season's consistency factor is rescaled against the best in the league
// for that season, then weighted by how much of the player's career that
// season represents. The current season always carries at least half the
// weight, so recent form dominates.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::player::PlayerProfile;
use crate::valuation::season_stats::{ProcessedPlayer, ProcessedSeason, SeasonTotals};
use crate::valuation::stats::{normalize_by_max, safe_divide};
use crate::valuation::PipelineContext;

/// A season with its consistency factor on the league-relative scale and its
/// share of the player's career.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSeason {
    #[serde(flatten)]
    pub totals: SeasonTotals,
    /// At most 1.0; negative when the raw factor was negative.
    pub consistency_factor: f64,
    pub season_factor: f64,
    /// Tier awarded for the normalized consistency factor (0, 4-8).
    pub consistency_tier: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPlayer {
    pub profile: PlayerProfile,
    pub team_fer_points: f64,
    pub seasons: Vec<NormalizedSeason>,
    /// Season-weighted sum of normalized consistency factors.
    pub consistency_overall: f64,
}

/// Weight of one season within a player's career.
///
/// The current season gets `(share + 1) / 2`, every other season
/// `share / 2`, where `share` is the season's fraction of career games.
pub fn season_factor(season_games: u32, career_games: u32, is_current: bool) -> f64 {
    let share = safe_divide(f64::from(season_games), f64::from(career_games));
    if is_current {
        (share + 1.0) / 2.0
    } else {
        share / 2.0
    }
}

/// Step function over a normalized consistency factor.
pub fn consistency_tier(consistency_factor: f64) -> u8 {
    if consistency_factor >= 0.8 {
        8
    } else if consistency_factor >= 0.6 {
        7
    } else if consistency_factor >= 0.4 {
        6
    } else if consistency_factor >= 0.2 {
        5
    } else if consistency_factor > 0.0 {
        4
    } else {
        0
    }
}

fn normalize_season(
    season: ProcessedSeason,
    max_consistency: &BTreeMap<String, f64>,
    career_games: u32,
    ctx: &PipelineContext,
) -> NormalizedSeason {
    let max = max_consistency
        .get(&season.totals.season)
        .copied()
        .unwrap_or(0.0);
    let consistency_factor = normalize_by_max(season.consistency_factor, max);
    let season_factor = season_factor(
        season.totals.total_games,
        career_games,
        ctx.is_current(&season.totals.season),
    );

    NormalizedSeason {
        totals: season.totals,
        consistency_factor,
        season_factor,
        consistency_tier: consistency_tier(consistency_factor),
    }
}

/// Rescale consistency and assign season weights for every player.
pub fn normalize_players(
    players: Vec<ProcessedPlayer>,
    max_consistency: &BTreeMap<String, f64>,
    ctx: &PipelineContext,
) -> Vec<NormalizedPlayer> {
    players
        .into_iter()
        .map(|player| {
            let career_games = player.total_career_games;
            let seasons: Vec<NormalizedSeason> = player
                .seasons
                .into_iter()
                .map(|s| normalize_season(s, max_consistency, career_games, ctx))
                .collect();
            let consistency_overall = seasons
                .iter()
                .map(|s| s.consistency_factor * s.season_factor)
                .sum();

            NormalizedPlayer {
                profile: player.profile,
                team_fer_points: player.team_fer_points,
                seasons,
                consistency_overall,
            }
        })
        .collect()
}
