// Next-gameweek resolution from the competition's deadline calendar.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::GameweekConfig;

/// Deadline timestamps are published in UTC with a literal `Z` suffix.
const DEADLINE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One calendar entry. Extra fields in the published calendar are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GameweekDeadline {
    pub id: u32,
    pub deadline_time: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GameweekError {
    #[error("failed to read gameweek calendar {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed gameweek calendar {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("gameweek {id} has an unparseable deadline `{value}`: {source}")]
    BadDeadline {
        id: u32,
        value: String,
        source: chrono::ParseError,
    },

    #[error("gameweek calendar is empty")]
    EmptyCalendar,
}

impl GameweekDeadline {
    pub fn deadline(&self) -> Result<DateTime<Utc>, GameweekError> {
        NaiveDateTime::parse_from_str(&self.deadline_time, DEADLINE_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| GameweekError::BadDeadline {
                id: self.id,
                value: self.deadline_time.clone(),
                source: e,
            })
    }
}

/// The first gameweek whose deadline is still ahead of `now`.
///
/// Once every deadline has passed the season is over, and the gameweek after
/// the last one is returned so that the current season counts as complete.
pub fn next_gameweek_at(
    calendar: &[GameweekDeadline],
    now: DateTime<Utc>,
) -> Result<u32, GameweekError> {
    let Some(last) = calendar.last() else {
        return Err(GameweekError::EmptyCalendar);
    };
    for gameweek in calendar {
        if gameweek.deadline()? > now {
            return Ok(gameweek.id);
        }
    }
    Ok(last.id + 1)
}

pub fn load_calendar(path: &Path) -> Result<Vec<GameweekDeadline>, GameweekError> {
    let text = std::fs::read_to_string(path).map_err(|e| GameweekError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| GameweekError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Resolve the next unplayed gameweek: the configured override if present,
/// otherwise the calendar evaluated against the current time.
pub fn resolve_next_gameweek(config: &GameweekConfig) -> Result<u32, GameweekError> {
    if let Some(next) = config.next {
        return Ok(next);
    }
    match &config.calendar {
        Some(path) => {
            let calendar = load_calendar(Path::new(path))?;
            next_gameweek_at(&calendar, Utc::now())
        }
        None => Err(GameweekError::EmptyCalendar),
    }
}
