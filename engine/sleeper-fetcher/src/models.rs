use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use standings_engine::{MatchupEntry, Roster, User};

/// NFL state response (`GET /state/nfl`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NflState {
    pub week: Option<u32>,
    pub display_week: Option<u32>,
    pub season: Option<String>,
    pub season_type: Option<String>,
}

impl NflState {
    /// Current scoring week; a missing or zero week counts as week 1
    pub fn current_week(&self) -> u32 {
        self.week.filter(|w| *w > 0).unwrap_or(1)
    }
}

/// Sleeper roster response (`GET /league/{id}/rosters`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SleeperRoster {
    pub roster_id: u32,
    pub owner_id: Option<String>,
    pub settings: Option<RosterSettings>,
}

/// Season-to-date record and points of a roster
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RosterSettings {
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub ties: Option<u32>,
    /// Whole points scored
    pub fpts: Option<serde_json::Value>,
    /// Hundredths of a point scored
    pub fpts_decimal: Option<serde_json::Value>,
}

/// Sleeper user response (`GET /league/{id}/users`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SleeperUser {
    pub user_id: String,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

/// Sleeper matchup response (`GET /league/{id}/matchups/{week}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SleeperMatchup {
    pub matchup_id: Option<u32>,
    pub roster_id: u32,
    pub points: Option<serde_json::Value>,
}

/// Read a JSON number or numeric string; anything else is treated as absent
pub fn numeric(value: Option<&serde_json::Value>) -> Option<Decimal> {
    match value? {
        // Shortest decimal form of the number, so 104.62 stays 104.62
        serde_json::Value::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<SleeperRoster> for Roster {
    fn from(raw: SleeperRoster) -> Self {
        let settings = raw.settings.unwrap_or_default();
        Roster {
            roster_id: raw.roster_id,
            owner_id: raw.owner_id,
            wins: settings.wins.unwrap_or(0),
            losses: settings.losses.unwrap_or(0),
            ties: settings.ties.unwrap_or(0),
            points_whole: numeric(settings.fpts.as_ref()),
            points_hundredths: numeric(settings.fpts_decimal.as_ref()),
        }
    }
}

impl From<SleeperUser> for User {
    fn from(raw: SleeperUser) -> Self {
        User {
            user_id: raw.user_id,
            display_name: raw.display_name,
            username: raw.username,
        }
    }
}

impl From<SleeperMatchup> for MatchupEntry {
    fn from(raw: SleeperMatchup) -> Self {
        MatchupEntry {
            matchup_id: raw.matchup_id,
            roster_id: raw.roster_id,
            points: numeric(raw.points.as_ref()),
        }
    }
}
