// League-wide per-season baselines.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::valuation::consistency::NormalizedPlayer;
use crate::valuation::stats::safe_divide;
use crate::valuation::PipelineContext;

/// Aggregate totals and per-player averages for one season.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeagueData {
    pub all_players_effective_total_points: f64,
    pub all_players_minutes: u64,
    pub total_players: usize,
    pub avg_effective_total_points_per_player: f64,
    /// Per-gameweek minutes for the average player.
    pub avg_minutes_per_player: f64,
}

/// League data keyed by season label.
pub type LeagueTable = BTreeMap<String, LeagueData>;

/// Sum the season totals of every player and derive per-player averages.
///
/// Averages are taken over every player in the run, not only those with a
/// record for the season. Minutes are then prorated to a per-gameweek rate:
/// by the gameweeks played so far in the current season, by the full season
/// length otherwise.
pub fn aggregate(players: &[NormalizedPlayer], ctx: &PipelineContext) -> LeagueTable {
    let mut table: LeagueTable = ctx
        .seasons
        .iter()
        .map(|s| {
            (
                s.clone(),
                LeagueData {
                    total_players: players.len(),
                    ..LeagueData::default()
                },
            )
        })
        .collect();

    for player in players {
        for season in &player.seasons {
            if let Some(data) = table.get_mut(&season.totals.season) {
                data.all_players_effective_total_points += season.totals.effective_total_points;
                data.all_players_minutes += u64::from(season.totals.minutes);
            }
        }
    }

    let gameweeks_played = ctx.next_gameweek.saturating_sub(1);

    for (label, data) in table.iter_mut() {
        let count = data.total_players as f64;
        data.avg_effective_total_points_per_player =
            safe_divide(data.all_players_effective_total_points, count);
        let avg_minutes = safe_divide(data.all_players_minutes as f64, count);

        let gameweeks = if ctx.is_current(label) {
            gameweeks_played
        } else {
            ctx.past_season_gameweeks
        };
        data.avg_minutes_per_player = safe_divide(avg_minutes, f64::from(gameweeks));
    }

    table
}
