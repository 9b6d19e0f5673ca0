// Final composite value and ranking.

use serde::Serialize;

use crate::player::PlayerProfile;
use crate::valuation::stats::safe_divide;
use crate::valuation::value_points::{ValuedPlayer, ValuedSeason};

pub const SCORING_WEIGHT: f64 = 53.0;
pub const FIXTURE_WEIGHT: f64 = 27.0;
pub const CONSISTENCY_WEIGHT: f64 = 13.5;
pub const PLAYING_TIME_WEIGHT: f64 = 9.5;

/// A fully valued player as written to `final_players_sorted.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlayer {
    #[serde(flatten)]
    pub profile: PlayerProfile,
    pub seasons: Vec<ValuedSeason>,
    pub fer: f64,
    pub consistency_overall: f64,
    pub value_points: f64,
    pub final_value: f64,
    pub final_value_per_cost: f64,
}

/// Cost of the current (first listed) season, 0 when there is none.
fn current_season_cost(seasons: &[ValuedSeason]) -> f64 {
    seasons
        .first()
        .map(|s| s.normalized.totals.now_cost)
        .unwrap_or(0.0)
}

/// Weighted composite of four factors, each already in [0, 1] apart from
/// `consistency_overall`, which can dip below 0.
///
/// The weights sum to 103 and are applied as-is.
pub fn final_value(value: f64, fer: f64, consistency_overall: f64, value_points: f64) -> f64 {
    SCORING_WEIGHT * value
        + FIXTURE_WEIGHT * fer
        + CONSISTENCY_WEIGHT * consistency_overall
        + PLAYING_TIME_WEIGHT * value_points
}

fn rank_player(player: ValuedPlayer) -> RankedPlayer {
    let value: f64 = player
        .seasons
        .iter()
        .map(|s| s.value * s.normalized.season_factor)
        .sum();
    let final_value = final_value(
        value,
        player.fer,
        player.consistency_overall,
        player.value_points,
    );
    let final_value_per_cost = safe_divide(final_value, current_season_cost(&player.seasons));

    RankedPlayer {
        profile: player.profile,
        seasons: player.seasons,
        fer: player.fer,
        consistency_overall: player.consistency_overall,
        value_points: player.value_points,
        final_value,
        final_value_per_cost,
    }
}

/// Compute final values and sort descending. Ties keep their input order.
pub fn rank_players(players: Vec<ValuedPlayer>) -> Vec<RankedPlayer> {
    let mut ranked: Vec<RankedPlayer> = players.into_iter().map(rank_player).collect();
    ranked.sort_by(|a, b| {
        b.final_value
            .partial_cmp(&a.final_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}
