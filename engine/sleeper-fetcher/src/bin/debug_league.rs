//! Print season and live standings for one league.
//!
//! Usage: debug-league <league_id>

use anyhow::Context;
use sleeper_fetcher::{fetch_league, fetch_live_league, SleeperClient, SleeperConfig};
use standings_engine::{compute_live_projection, compute_standings, StandingsRow};
use tracing::{error, info};

fn print_rows(rows: &[StandingsRow]) {
    for row in rows {
        println!(
            "{:>3}  {:<28} {:>7} {:>9}",
            row.rank,
            row.team,
            row.record(),
            row.points.to_string()
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let league_id = std::env::args()
        .nth(1)
        .context("usage: debug-league <league_id>")?;
    let client = SleeperClient::new(SleeperConfig::from_env())?;
    client
        .health_check()
        .await
        .context("Sleeper API is not reachable")?;

    info!("Fetching season standings for league {}", league_id);
    match fetch_league(&client, &league_id).await {
        Ok(snapshot) => {
            println!("Season standings");
            print_rows(&compute_standings(&snapshot.rosters, &snapshot.users));
        }
        Err(e) => error!("❌ Failed to fetch league {}: {}", league_id, e),
    }

    info!("Fetching live standings for league {}", league_id);
    let snapshot = fetch_live_league(&client, &league_id).await?;
    let live = compute_live_projection(
        snapshot.week,
        &snapshot.rosters,
        &snapshot.users,
        &snapshot.matchups,
    );
    println!();
    println!("Live standings (if week {} ended now)", live.week);
    print_rows(&live.rows);

    Ok(())
}
