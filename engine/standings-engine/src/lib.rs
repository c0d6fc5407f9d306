//! Standings Engine
//!
//! Turns roster, user and matchup records from a fantasy league into a ranked
//! standings table. Also produces the hypothetical "if the current week ended
//! now" table by applying in-progress matchup scores on top of the
//! season-to-date records.
//!
//! Everything in this crate is a pure function of its inputs. Fetching the
//! records and delivering the result live in `sleeper-fetcher` and
//! `standings-bot`.

pub mod aggregator;
pub mod pairing;
pub mod points;
pub mod projection;
pub mod types;

pub use aggregator::{compute_standings, rank_rows, TeamDirectory};
pub use pairing::pair_matchups;
pub use points::{normalize_points, round_points};
pub use projection::compute_live_projection;
pub use types::*;
