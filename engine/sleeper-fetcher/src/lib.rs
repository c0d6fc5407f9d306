//! Sleeper Fetcher
//!
//! Client for the public Sleeper league API. Fetches the NFL league state,
//! rosters, users and weekly matchups, and converts the wire records into the
//! standings engine's data model.

pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod models;

pub use config::SleeperConfig;
pub use error::{FetchError, Result};
pub use feed::{
    fetch_league, fetch_live_league, LeagueDataSource, LeagueSnapshot, LiveLeagueSnapshot,
};
pub use fetcher::SleeperClient;
pub use models::*;
