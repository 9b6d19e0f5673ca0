// Playing-time reliability ("value points").
//
// Rewards players who play full matches, or at least more than the league's
// average player, weighted by season. The result and the team fixture score
// are both rescaled into [0, 1] against their league maxima.

use serde::Serialize;

use crate::player::PlayerProfile;
use crate::valuation::consistency::{NormalizedPlayer, NormalizedSeason};
use crate::valuation::league::LeagueTable;
use crate::valuation::stats::{normalize_by_max, safe_divide};

/// Average minutes per game that counts as a regular starter.
const STARTER_MINUTES: f64 = 60.0;

const STARTER_POINTS: f64 = 4.0;
const ABOVE_AVERAGE_POINTS: f64 = 3.0;
const APPEARANCE_POINTS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuedSeason {
    #[serde(flatten)]
    pub normalized: NormalizedSeason,
    pub minutes_per_game: f64,
    /// Unweighted playing-time award (0, 2, 3 or 4).
    pub playing_time_points: f64,
    /// Per-season scoring value. Nothing upstream produces it yet, so it is
    /// always 0 and contributes nothing to the final value.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuedPlayer {
    pub profile: PlayerProfile,
    pub seasons: Vec<ValuedSeason>,
    /// Team fixture score rescaled against the league maximum.
    pub fer: f64,
    pub consistency_overall: f64,
    /// Season-weighted playing-time award rescaled against the league maximum.
    pub value_points: f64,
}

/// Award for a season's minutes per game against the league's average
/// per-gameweek minutes for that season.
pub fn playing_time_points(minutes_per_game: f64, league_avg_minutes: f64) -> f64 {
    if minutes_per_game >= STARTER_MINUTES {
        STARTER_POINTS
    } else if minutes_per_game >= league_avg_minutes {
        ABOVE_AVERAGE_POINTS
    } else if minutes_per_game > 0.0 {
        APPEARANCE_POINTS
    } else {
        0.0
    }
}

fn value_season(season: NormalizedSeason, league: &LeagueTable) -> ValuedSeason {
    let minutes_per_game = safe_divide(
        f64::from(season.totals.minutes),
        f64::from(season.totals.total_games),
    );
    let league_avg = league
        .get(&season.totals.season)
        .map(|d| d.avg_minutes_per_player)
        .unwrap_or(0.0);

    ValuedSeason {
        playing_time_points: playing_time_points(minutes_per_game, league_avg),
        minutes_per_game,
        value: 0.0,
        normalized: season,
    }
}

/// Score playing time for every player, then rescale `value_points` and the
/// team fixture score into [0, 1].
pub fn award_value_points(
    players: Vec<NormalizedPlayer>,
    league: &LeagueTable,
    max_fer_points: f64,
) -> (Vec<ValuedPlayer>, f64) {
    let mut max_value_points: f64 = 0.0;

    let scored: Vec<(NormalizedPlayer, Vec<ValuedSeason>, f64)> = players
        .into_iter()
        .map(|mut player| {
            let seasons: Vec<ValuedSeason> = std::mem::take(&mut player.seasons)
                .into_iter()
                .map(|s| value_season(s, league))
                .collect();
            let raw_points: f64 = seasons
                .iter()
                .map(|s| s.playing_time_points * s.normalized.season_factor)
                .sum();
            max_value_points = max_value_points.max(raw_points);
            (player, seasons, raw_points)
        })
        .collect();

    let valued = scored
        .into_iter()
        .map(|(player, seasons, raw_points)| ValuedPlayer {
            profile: player.profile,
            seasons,
            fer: normalize_by_max(player.team_fer_points, max_fer_points),
            consistency_overall: player.consistency_overall,
            value_points: normalize_by_max(raw_points, max_value_points),
        })
        .collect();

    (valued, max_value_points)
}
