// Player identity carried unchanged through every valuation stage.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::RawPlayer;

/// Squad positions, keyed by the competition's `element_type` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GKP")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    /// Map an `element_type` code (1-4) to a position.
    pub fn from_element_type(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    /// Short display form, matching the serialized value.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Identity fields of a player plus the joins made against the team list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub id: u32,
    pub first_name: String,
    pub second_name: String,
    pub full_name: String,
    pub team: u32,
    pub team_name: String,
    pub element_type: u8,
    pub position: Position,
    pub status: String,
}

impl PlayerProfile {
    pub fn new(raw: &RawPlayer, position: Position, team_name: &str) -> Self {
        PlayerProfile {
            id: raw.id,
            first_name: raw.first_name.clone(),
            second_name: raw.second_name.clone(),
            full_name: raw.full_name.clone(),
            team: raw.team,
            team_name: team_name.to_string(),
            element_type: raw.element_type,
            position,
            status: raw.status.clone(),
        }
    }
}
