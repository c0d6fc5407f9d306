//! Head-to-head pairing of a week's matchup entries

use std::collections::HashMap;

use tracing::debug;

use crate::types::{MatchupEntry, MatchupId, MatchupPair};

/// Group entries by matchup id and keep groups of exactly two.
///
/// Entries without a matchup id (or with id 0) are byes and are skipped.
/// Singletons and groups larger than two are malformed and dropped without
/// error. Pairs come out in order of each matchup id's first appearance.
pub fn pair_matchups(entries: &[MatchupEntry]) -> Vec<MatchupPair> {
    let mut order: Vec<MatchupId> = Vec::new();
    let mut groups: HashMap<MatchupId, Vec<&MatchupEntry>> = HashMap::new();

    for entry in entries {
        let Some(matchup_id) = entry.matchup_id.filter(|id| *id != 0) else {
            continue;
        };
        groups
            .entry(matchup_id)
            .or_insert_with(|| {
                order.push(matchup_id);
                Vec::with_capacity(2)
            })
            .push(entry);
    }

    order
        .into_iter()
        .filter_map(|matchup_id| {
            let group = groups.remove(&matchup_id)?;
            match group.as_slice() {
                [first, second] => Some(MatchupPair {
                    matchup_id,
                    first: (*first).clone(),
                    second: (*second).clone(),
                }),
                other => {
                    debug!(
                        matchup_id,
                        entries = other.len(),
                        "dropping unpaired matchup"
                    );
                    None
                }
            }
        })
        .collect()
}
