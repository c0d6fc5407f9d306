//! League data source abstraction and fetch plans
//!
//! Independent calls run concurrently; matchups wait on the resolved week.
//! Any failed call fails the whole fetch, so callers never see a partial
//! snapshot.

use async_trait::async_trait;
use standings_engine::{MatchupEntry, Roster, User};
use tracing::info;

use crate::error::Result;

/// Source of league records
#[async_trait]
pub trait LeagueDataSource: Send + Sync {
    /// Current scoring week from the league-state lookup
    async fn current_week(&self) -> Result<u32>;

    async fn rosters(&self, league_id: &str) -> Result<Vec<Roster>>;

    async fn users(&self, league_id: &str) -> Result<Vec<User>>;

    async fn matchups(&self, league_id: &str, week: u32) -> Result<Vec<MatchupEntry>>;
}

/// Records needed for season standings
#[derive(Debug, Clone)]
pub struct LeagueSnapshot {
    pub rosters: Vec<Roster>,
    pub users: Vec<User>,
}

/// Records needed for the live projection
#[derive(Debug, Clone)]
pub struct LiveLeagueSnapshot {
    pub week: u32,
    pub rosters: Vec<Roster>,
    pub users: Vec<User>,
    pub matchups: Vec<MatchupEntry>,
}

/// Fetch rosters and users in parallel
pub async fn fetch_league<S>(source: &S, league_id: &str) -> Result<LeagueSnapshot>
where
    S: LeagueDataSource + ?Sized,
{
    let (rosters, users) = tokio::try_join!(source.rosters(league_id), source.users(league_id))?;
    Ok(LeagueSnapshot { rosters, users })
}

/// Fetch week, rosters and users in parallel, then the week's matchups
pub async fn fetch_live_league<S>(source: &S, league_id: &str) -> Result<LiveLeagueSnapshot>
where
    S: LeagueDataSource + ?Sized,
{
    let (week, rosters, users) = tokio::try_join!(
        source.current_week(),
        source.rosters(league_id),
        source.users(league_id)
    )?;
    let matchups = source.matchups(league_id, week).await?;

    info!(
        "League {} week {}: {} rosters, {} users, {} matchup entries",
        league_id,
        week,
        rosters.len(),
        users.len(),
        matchups.len()
    );
    Ok(LiveLeagueSnapshot {
        week,
        rosters,
        users,
        matchups,
    })
}
