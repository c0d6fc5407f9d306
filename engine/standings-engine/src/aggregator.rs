//! Season standings aggregation

use std::collections::HashMap;

use tracing::debug;

use crate::points::{normalize_points, round_points};
use crate::types::{Roster, StandingsRow, User};

/// Lookup from owner id to team label
#[derive(Debug, Default)]
pub struct TeamDirectory {
    labels: HashMap<String, String>,
}

impl TeamDirectory {
    /// Build from league users; a repeated user id keeps the last label seen
    pub fn from_users(users: &[User]) -> Self {
        let labels = users
            .iter()
            .map(|u| (u.user_id.clone(), u.label().to_string()))
            .collect();
        Self { labels }
    }

    /// Label for a roster, `Team {roster_id}` when the owner is unknown
    pub fn team_for(&self, roster: &Roster) -> String {
        roster
            .owner_id
            .as_ref()
            .and_then(|owner| self.labels.get(owner))
            .cloned()
            .unwrap_or_else(|| {
                debug!(
                    roster_id = roster.roster_id,
                    "no owner mapping, using fallback label"
                );
                format!("Team {}", roster.roster_id)
            })
    }
}

/// Unranked row carrying the season-to-date record
pub(crate) fn base_row(directory: &TeamDirectory, roster: &Roster) -> StandingsRow {
    let points = normalize_points(roster.points_whole, roster.points_hundredths);
    StandingsRow {
        rank: 0,
        roster_id: roster.roster_id,
        team: directory.team_for(roster),
        wins: roster.wins,
        losses: roster.losses,
        ties: roster.ties,
        points: round_points(points),
    }
}

/// Sort by wins then rounded points, both descending, and assign 1-based ranks.
///
/// The sort is stable: rows equal on both keys keep their input order.
pub fn rank_rows(mut rows: Vec<StandingsRow>) -> Vec<StandingsRow> {
    rows.sort_by(|a, b| {
        b.wins.cmp(&a.wins).then_with(|| b.points.cmp(&a.points))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
    rows
}

/// Ranked season standings, one row per roster
pub fn compute_standings(rosters: &[Roster], users: &[User]) -> Vec<StandingsRow> {
    let directory = TeamDirectory::from_users(users);
    let rows = rosters.iter().map(|r| base_row(&directory, r)).collect();
    rank_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn one_row_per_roster_with_contiguous_ranks() {
        let rosters: Vec<Roster> = (1..=10)
            .map(|id| {
                let roster = Roster::new(id, None, id % 4, 4 - id % 4, 0);
                roster.with_points(900 + id as i64, 0)
            })
            .collect();
        let rows = compute_standings(&rosters, &[]);

        assert_eq!(rows.len(), rosters.len());
        let ranks: Vec<u32> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<u32>>());
    }

    #[test]
    fn sorts_by_wins_then_points() {
        let rosters = vec![
            Roster::new(1, Some("a"), 2, 2, 0).with_points(500, 0),
            Roster::new(2, Some("b"), 3, 1, 0).with_points(400, 0),
            Roster::new(3, Some("c"), 2, 2, 0).with_points(510, 50),
        ];
        let users = vec![
            User::new("a", "Alpha"),
            User::new("b", "Bravo"),
            User::new("c", "Charlie"),
        ];

        let rows = compute_standings(&rosters, &users);
        let teams: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["Bravo", "Charlie", "Alpha"]);
        assert_eq!(rows[1].points, dec("510.5"));
    }

    #[test]
    fn ties_on_wins_and_rounded_points_keep_input_order() {
        // 600.04 and 600.01 both round to 600.0
        let rosters = vec![
            Roster::new(7, None, 4, 0, 0).with_points(600, 1),
            Roster::new(3, None, 4, 0, 0).with_points(600, 4),
            Roster::new(5, None, 4, 0, 0).with_points(600, 0),
        ];
        let rows = compute_standings(&rosters, &[]);
        let ids: Vec<u32> = rows.iter().map(|r| r.roster_id).collect();
        assert_eq!(ids, vec![7, 3, 5]);
        assert!(rows.iter().all(|r| r.points == dec("600.0")));
    }

    #[test]
    fn rounded_points_decide_order_not_full_precision() {
        // 100.04 rounds below 100.05, which rounds up to 100.1
        let rosters = vec![
            Roster::new(1, None, 1, 0, 0).with_points(100, 4),
            Roster::new(2, None, 1, 0, 0).with_points(100, 5),
        ];
        let rows = compute_standings(&rosters, &[]);
        assert_eq!(rows[0].roster_id, 2);
        assert_eq!(rows[0].points, dec("100.1"));
    }

    #[test]
    fn unknown_owner_gets_fallback_label() {
        let rosters = vec![
            Roster::new(1, Some("known"), 1, 0, 0),
            Roster::new(2, Some("ghost"), 0, 1, 0),
            Roster::new(3, None, 0, 1, 0),
        ];
        let users = vec![User::new("known", "Known Owner")];

        let rows = compute_standings(&rosters, &users);
        assert_eq!(rows[0].team, "Known Owner");
        assert_eq!(rows[1].team, "Team 2");
        assert_eq!(rows[2].team, "Team 3");
    }

    #[test]
    fn missing_points_are_zero() {
        let rows = compute_standings(&[Roster::new(9, None, 0, 0, 0)], &[]);
        assert_eq!(rows[0].points, Decimal::ZERO);
        assert_eq!(rows[0].rank, 1);
    }

    #[test]
    fn empty_league_has_no_rows() {
        assert!(compute_standings(&[], &[]).is_empty());
    }
}
