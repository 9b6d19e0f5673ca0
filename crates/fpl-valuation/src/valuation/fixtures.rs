// Fixture easiness rating (FER).
//
// Scores each team on how kind its next few fixtures are: an easy run of
// similar difficulty beats an easy-on-average but volatile one. Scores are
// expressed relative to the league average so that 1.0 is a typical run.

use serde::Serialize;
use tracing::debug;

use crate::data::{RawFixture, RawTeam};
use crate::valuation::stats::{mean, population_variance, round_to, safe_divide};
use crate::valuation::PipelineContext;

/// Number of upcoming fixtures considered per team.
pub const FER_HORIZON: usize = 5;

/// Ease lost per difficulty step (difficulty 1 → 0.9, difficulty 5 → 0.5).
const DIFFICULTY_STEP: f64 = 0.1;

/// A team with its upcoming fixture ease values and average-relative score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTeam {
    pub id: u32,
    pub name: String,
    pub fer: Vec<f64>,
    pub fer_points: f64,
}

/// Output of the fixture stage: teams sorted by descending `fer_points`,
/// plus the league maximum used later to rescale player FER into [0, 1].
#[derive(Debug, Clone, Default)]
pub struct FixtureEasiness {
    pub teams: Vec<ScoredTeam>,
    pub max_fer_points: f64,
}

impl FixtureEasiness {
    pub fn team(&self, team_id: u32) -> Option<&ScoredTeam> {
        self.teams.iter().find(|t| t.id == team_id)
    }
}

/// Ease of a single fixture given the side's difficulty rating.
pub fn fixture_ease(difficulty: u8) -> f64 {
    1.0 - DIFFICULTY_STEP * f64::from(difficulty)
}

/// Fixtures that have a gameweek assigned and are not yet played.
pub fn upcoming_fixtures(fixtures: &[RawFixture], next_gameweek: u32) -> Vec<&RawFixture> {
    fixtures
        .iter()
        .filter(|f| f.event.is_some_and(|gw| gw >= next_gameweek))
        .collect()
}

/// Ease values for `team_id` from the first `FER_HORIZON` fixtures it plays,
/// in the order the fixtures are given.
pub fn collect_ease(team_id: u32, fixtures: &[&RawFixture]) -> Vec<f64> {
    let mut ease = Vec::with_capacity(FER_HORIZON);
    for fixture in fixtures {
        if fixture.team_a == team_id {
            ease.push(fixture_ease(fixture.team_a_difficulty));
        } else if fixture.team_h == team_id {
            ease.push(fixture_ease(fixture.team_h_difficulty));
        }
        if ease.len() == FER_HORIZON {
            break;
        }
    }
    ease
}

/// `mean(ease) * (1 - variance(ease))`; 0.0 for a team with no fixtures.
pub fn raw_fer_points(ease: &[f64]) -> f64 {
    if ease.is_empty() {
        return 0.0;
    }
    mean(ease) * (1.0 - population_variance(ease))
}

/// Score every team against the upcoming fixtures.
pub fn score_teams(
    teams: &[RawTeam],
    fixtures: &[RawFixture],
    ctx: &PipelineContext,
) -> FixtureEasiness {
    let upcoming = upcoming_fixtures(fixtures, ctx.next_gameweek);
    debug!(
        "{} of {} fixtures are on or after gameweek {}",
        upcoming.len(),
        fixtures.len(),
        ctx.next_gameweek
    );

    let raw: Vec<(Vec<f64>, f64)> = teams
        .iter()
        .map(|team| {
            let ease = collect_ease(team.id, &upcoming);
            let points = raw_fer_points(&ease);
            (ease, points)
        })
        .collect();

    let raw_points: Vec<f64> = raw.iter().map(|(_, points)| *points).collect();
    let league_average = mean(&raw_points);

    let mut max_fer_points: f64 = 0.0;
    let mut scored: Vec<ScoredTeam> = teams
        .iter()
        .zip(raw)
        .map(|(team, (fer, points))| {
            let fer_points = round_to(safe_divide(points, league_average), 3);
            max_fer_points = max_fer_points.max(fer_points);
            ScoredTeam {
                id: team.id,
                name: team.name.clone(),
                fer,
                fer_points,
            }
        })
        .collect();

    // Stable: teams with equal scores keep their input order.
    scored.sort_by(|a, b| {
        b.fer_points
            .partial_cmp(&a.fer_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    FixtureEasiness {
        teams: scored,
        max_fer_points,
    }
}
