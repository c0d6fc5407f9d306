//! Core data model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Roster identifier, unique within a league
pub type RosterId = u32;

/// Matchup grouping key shared by the two rosters playing each other
pub type MatchupId = u32;

/// Season-to-date snapshot of one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub roster_id: RosterId,
    pub owner_id: Option<String>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Whole part of the season points total
    pub points_whole: Option<Decimal>,
    /// Hundredths part of the season points total (0-99)
    pub points_hundredths: Option<Decimal>,
}

impl Roster {
    /// Roster with a record and no points, mostly useful for building fixtures
    pub fn new(
        roster_id: RosterId,
        owner_id: Option<&str>,
        wins: u32,
        losses: u32,
        ties: u32,
    ) -> Self {
        Self {
            roster_id,
            owner_id: owner_id.map(str::to_string),
            wins,
            losses,
            ties,
            points_whole: None,
            points_hundredths: None,
        }
    }

    /// Set the split points representation
    pub fn with_points(mut self, whole: i64, hundredths: i64) -> Self {
        self.points_whole = Some(Decimal::from(whole));
        self.points_hundredths = Some(Decimal::from(hundredths));
        self
    }
}

/// League member owning zero or more rosters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    pub fn new(user_id: &str, display_name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: Some(display_name.to_string()),
            username: None,
        }
    }

    /// First non-empty of display name and username, else the literal "Team"
    pub fn label(&self) -> &str {
        [self.display_name.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or("Team")
    }
}

/// One roster's entry in a week's matchups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupEntry {
    /// `None` (or zero) marks a bye week
    pub matchup_id: Option<MatchupId>,
    pub roster_id: RosterId,
    /// In-progress points for the week, absent counts as zero
    pub points: Option<Decimal>,
}

impl MatchupEntry {
    pub fn new(matchup_id: Option<MatchupId>, roster_id: RosterId, points: Decimal) -> Self {
        Self {
            matchup_id,
            roster_id,
            points: Some(points),
        }
    }

    /// Points used when deciding a hypothetical result
    pub fn current_points(&self) -> Decimal {
        self.points.unwrap_or(Decimal::ZERO)
    }
}

/// Two entries scheduled against each other in the same week
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupPair {
    pub matchup_id: MatchupId,
    pub first: MatchupEntry,
    pub second: MatchupEntry,
}

/// Ranked row of a standings table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    /// 1-based position after sorting
    pub rank: u32,
    pub roster_id: RosterId,
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Season points rounded to one decimal
    pub points: Decimal,
}

impl StandingsRow {
    /// "W-L", or "W-L-T" once the team has a tie
    pub fn record(&self) -> String {
        if self.ties > 0 {
            format!("{}-{}-{}", self.wins, self.losses, self.ties)
        } else {
            format!("{}-{}", self.wins, self.losses)
        }
    }

    /// Games accounted for in the record
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

/// Standings as if the given week's matchups ended with their current scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStandings {
    pub week: u32,
    pub rows: Vec<StandingsRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(wins: u32, losses: u32, ties: u32) -> StandingsRow {
        StandingsRow {
            rank: 1,
            roster_id: 1,
            team: "Team 1".to_string(),
            wins,
            losses,
            ties,
            points: Decimal::ZERO,
        }
    }

    #[test]
    fn record_omits_zero_ties() {
        assert_eq!(row(3, 1, 0).record(), "3-1");
        assert_eq!(row(3, 1, 2).record(), "3-1-2");
        assert_eq!(row(3, 1, 2).games(), 6);
    }

    #[test]
    fn user_label_skips_empty_names() {
        let mut user = User {
            user_id: "u1".to_string(),
            display_name: Some(String::new()),
            username: Some("gridiron".to_string()),
        };
        assert_eq!(user.label(), "gridiron");

        user.username = None;
        assert_eq!(user.label(), "Team");

        user.display_name = Some("Commish".to_string());
        assert_eq!(user.label(), "Commish");
    }

    #[test]
    fn missing_matchup_points_count_as_zero() {
        let entry = MatchupEntry {
            matchup_id: Some(1),
            roster_id: 4,
            points: None,
        };
        assert_eq!(entry.current_points(), Decimal::ZERO);
    }

    #[test]
    fn rows_serialize_points_as_decimal() {
        let mut r = row(1, 0, 0);
        r.points = Decimal::new(1005, 1);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["points"], "100.5");
    }
}
