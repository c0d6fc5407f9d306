//! Live "if the week ended now" projection

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::aggregator::{base_row, rank_rows, TeamDirectory};
use crate::pairing::pair_matchups;
use crate::types::{LiveStandings, MatchupEntry, Roster, RosterId, StandingsRow, User};

/// Standings as if every paired matchup of `week` ended with its current score.
///
/// The higher current score gains a win and the other side a loss; equal
/// scores give both a tie. Byes, unpaired entries and entries referencing an
/// unknown roster leave the season record untouched. Rows are rebuilt from the
/// inputs on every call.
pub fn compute_live_projection(
    week: u32,
    rosters: &[Roster],
    users: &[User],
    matchups: &[MatchupEntry],
) -> LiveStandings {
    let directory = TeamDirectory::from_users(users);
    let mut rows: Vec<StandingsRow> = rosters.iter().map(|r| base_row(&directory, r)).collect();
    let by_roster: HashMap<RosterId, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.roster_id, i))
        .collect();

    for pair in pair_matchups(matchups) {
        let (first, second) = (&pair.first, &pair.second);
        let a = by_roster.get(&first.roster_id);
        let b = by_roster.get(&second.roster_id);
        let (Some(&a), Some(&b)) = (a, b) else {
            debug!(
                matchup_id = pair.matchup_id,
                "matchup references unknown roster, skipping"
            );
            continue;
        };
        if a == b {
            debug!(
                matchup_id = pair.matchup_id,
                "roster paired against itself, skipping"
            );
            continue;
        }

        match first.current_points().cmp(&second.current_points()) {
            Ordering::Greater => {
                rows[a].wins += 1;
                rows[b].losses += 1;
            }
            Ordering::Less => {
                rows[b].wins += 1;
                rows[a].losses += 1;
            }
            Ordering::Equal => {
                rows[a].ties += 1;
                rows[b].ties += 1;
            }
        }
    }

    LiveStandings {
        week,
        rows: rank_rows(rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::compute_standings;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn row(live: &LiveStandings, roster_id: u32) -> &StandingsRow {
        live.rows.iter().find(|r| r.roster_id == roster_id).unwrap()
    }

    #[test]
    fn higher_score_takes_the_win() {
        let rosters = vec![Roster::new(1, None, 3, 1, 0), Roster::new(2, None, 3, 1, 0)];
        let matchups = vec![
            MatchupEntry::new(Some(1), 1, dec("100.5")),
            MatchupEntry::new(Some(1), 2, dec("99.0")),
        ];
        let live = compute_live_projection(6, &rosters, &[], &matchups);

        assert_eq!(live.week, 6);
        assert_eq!((row(&live, 1).wins, row(&live, 1).losses), (4, 1));
        assert_eq!((row(&live, 2).wins, row(&live, 2).losses), (3, 2));
    }

    #[test]
    fn second_entry_can_win() {
        let rosters = vec![Roster::new(1, None, 0, 0, 0), Roster::new(2, None, 0, 0, 0)];
        let matchups = vec![
            MatchupEntry::new(Some(3), 1, dec("80.2")),
            MatchupEntry::new(Some(3), 2, dec("80.25")),
        ];
        let live = compute_live_projection(1, &rosters, &[], &matchups);
        assert_eq!(row(&live, 2).record(), "1-0");
        assert_eq!(row(&live, 1).record(), "0-1");
        assert_eq!(live.rows[0].roster_id, 2);
    }

    #[test]
    fn equal_scores_are_a_tie() {
        let rosters = vec![Roster::new(1, None, 3, 1, 0), Roster::new(2, None, 3, 1, 0)];
        let matchups = vec![
            MatchupEntry::new(Some(1), 1, dec("100.0")),
            MatchupEntry::new(Some(1), 2, dec("100.0")),
        ];
        let live = compute_live_projection(6, &rosters, &[], &matchups);
        assert_eq!(row(&live, 1).record(), "3-1-1");
        assert_eq!(row(&live, 2).record(), "3-1-1");
    }

    #[test]
    fn byes_and_unknown_rosters_keep_season_record() {
        let rosters = vec![
            Roster::new(1, None, 2, 2, 0),
            Roster::new(2, None, 2, 2, 0),
            Roster::new(3, None, 2, 2, 0),
        ];
        let matchups = vec![
            MatchupEntry::new(None, 1, dec("120")),
            MatchupEntry::new(Some(7), 2, dec("90")),
            MatchupEntry::new(Some(7), 99, dec("110")),
            MatchupEntry::new(Some(8), 3, dec("75")),
        ];
        let live = compute_live_projection(5, &rosters, &[], &matchups);
        for id in 1..=3 {
            assert_eq!(row(&live, id).record(), "2-2");
        }
    }

    #[test]
    fn only_paired_rows_gain_a_game() {
        let rosters = vec![
            Roster::new(1, None, 1, 3, 0),
            Roster::new(2, None, 2, 2, 0),
            Roster::new(3, None, 3, 1, 0),
            Roster::new(4, None, 4, 0, 0),
            Roster::new(5, None, 2, 1, 1),
        ];
        let matchups = vec![
            MatchupEntry::new(Some(1), 1, dec("101")),
            MatchupEntry::new(Some(1), 2, dec("99")),
            MatchupEntry::new(Some(2), 3, dec("88")),
            MatchupEntry::new(Some(2), 4, dec("88")),
            MatchupEntry::new(None, 5, dec("140")),
        ];
        let season = compute_standings(&rosters, &[]);
        let live = compute_live_projection(5, &rosters, &[], &matchups);

        let season_games: u32 = season.iter().map(StandingsRow::games).sum();
        let live_games: u32 = live.rows.iter().map(StandingsRow::games).sum();
        assert_eq!(live_games, season_games + 4);
        assert_eq!(row(&live, 5).games(), 4);
    }

    #[test]
    fn season_inputs_are_untouched() {
        let rosters = vec![Roster::new(1, None, 0, 0, 0), Roster::new(2, None, 0, 0, 0)];
        let matchups = vec![
            MatchupEntry::new(Some(1), 1, dec("10")),
            MatchupEntry::new(Some(1), 2, dec("5")),
        ];
        let first = compute_live_projection(1, &rosters, &[], &matchups);
        let second = compute_live_projection(1, &rosters, &[], &matchups);

        assert_eq!(rosters[0].wins, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn upset_reorders_a_four_team_league() {
        let rosters = vec![
            Roster::new(1, Some("u1"), 3, 1, 0).with_points(480, 20),
            Roster::new(2, Some("u2"), 2, 2, 0).with_points(455, 0),
            Roster::new(3, Some("u3"), 1, 3, 0).with_points(470, 75),
            Roster::new(4, Some("u4"), 4, 0, 0).with_points(510, 5),
        ];
        let users = vec![
            User::new("u1", "Ozark Outlaws"),
            User::new("u2", "Cape Crushers"),
        ];
        // 3 upsets 4; 1 beats 2
        let matchups = vec![
            MatchupEntry::new(Some(1), 4, dec("71.4")),
            MatchupEntry::new(Some(1), 3, dec("118.9")),
            MatchupEntry::new(Some(2), 1, dec("104.0")),
            MatchupEntry::new(Some(2), 2, dec("97.3")),
        ];

        let season = compute_standings(&rosters, &users);
        let season_order: Vec<u32> = season.iter().map(|r| r.roster_id).collect();
        assert_eq!(season_order, vec![4, 1, 2, 3]);

        let live = compute_live_projection(5, &rosters, &users, &matchups);
        let summary: Vec<(u32, &str, String)> = live
            .rows
            .iter()
            .map(|r| (r.rank, r.team.as_str(), r.record()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Team 4", "4-1".to_string()),
                (2, "Ozark Outlaws", "4-1".to_string()),
                (3, "Team 3", "2-3".to_string()),
                (4, "Cape Crushers", "2-3".to_string()),
            ]
        );
        assert_eq!(row(&live, 4).points, dec("510.1"));
    }
}
