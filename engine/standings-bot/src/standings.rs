//! Fetch, compute, render and post standings for a league

use std::sync::Arc;

use sleeper_fetcher::{fetch_league, fetch_live_league, LeagueDataSource};
use standings_engine::{compute_live_projection, compute_standings, LiveStandings, StandingsRow};
use tracing::{info, warn};

use crate::config::LeagueConfig;
use crate::delivery::{Attachment, ChannelPoster, OutgoingMessage};
use crate::error::Result;
use crate::render::TableRenderer;
use crate::telemetry;

pub const STANDINGS_CONTENT: &str = "**Standings Update**";
pub const LIVE_CONTENT: &str = "**Live Standings**";

pub fn standings_title(league_name: &str) -> String {
    format!("{} — Standings", league_name)
}

pub fn live_title(league_name: &str, week: u32) -> String {
    format!(
        "{} — Live Standings (if Week {} ended now)",
        league_name, week
    )
}

/// Glue between the data source, the standings engine and delivery
pub struct StandingsReporter {
    source: Arc<dyn LeagueDataSource>,
    renderer: Arc<dyn TableRenderer>,
    poster: Arc<dyn ChannelPoster>,
}

impl StandingsReporter {
    pub fn new(
        source: Arc<dyn LeagueDataSource>,
        renderer: Arc<dyn TableRenderer>,
        poster: Arc<dyn ChannelPoster>,
    ) -> Self {
        Self {
            source,
            renderer,
            poster,
        }
    }

    pub fn poster(&self) -> &Arc<dyn ChannelPoster> {
        &self.poster
    }

    /// Season standings for a league
    pub async fn standings(&self, league_id: &str) -> Result<Vec<StandingsRow>> {
        let snapshot = fetch_league(self.source.as_ref(), league_id)
            .await
            .map_err(|e| {
                telemetry::record_fetch_failure();
                e
            })?;
        Ok(compute_standings(&snapshot.rosters, &snapshot.users))
    }

    /// Standings as if the current week ended now
    pub async fn live_projection(&self, league_id: &str) -> Result<LiveStandings> {
        let snapshot = fetch_live_league(self.source.as_ref(), league_id)
            .await
            .map_err(|e| {
                telemetry::record_fetch_failure();
                e
            })?;
        Ok(compute_live_projection(
            snapshot.week,
            &snapshot.rosters,
            &snapshot.users,
            &snapshot.matchups,
        ))
    }

    /// Fetch and render a league's season standings without posting them
    pub async fn prepare_standings(&self, league: &LeagueConfig) -> Result<OutgoingMessage> {
        let rows = self.standings(&league.league_id).await?;
        let title = standings_title(&league.name);
        self.rendered_message(STANDINGS_CONTENT, &title, &rows, "standings")
    }

    /// Post a prepared standings message to the league's channel
    pub async fn deliver_standings(
        &self,
        league: &LeagueConfig,
        message: OutgoingMessage,
    ) -> Result<()> {
        self.poster.post(&league.channel_id, message).await?;
        info!(league = %league.name, channel = %league.channel_id, "Posted standings");
        Ok(())
    }

    /// Post live standings for a league to `channel_id`
    pub async fn post_live(&self, league: &LeagueConfig, channel_id: &str) -> Result<u32> {
        let live = self.live_projection(&league.league_id).await?;
        let title = live_title(&league.name, live.week);
        let message = self.rendered_message(LIVE_CONTENT, &title, &live.rows, "live-standings")?;
        self.poster.post(channel_id, message).await?;
        info!(league = %league.name, week = live.week, "Posted live standings");
        Ok(live.week)
    }

    fn rendered_message(
        &self,
        content: &str,
        title: &str,
        rows: &[StandingsRow],
        file_stem: &str,
    ) -> Result<OutgoingMessage> {
        if rows.is_empty() {
            warn!("Rendering {:?} with no rows", title);
        }
        let table = self.renderer.render(title, rows)?;
        Ok(OutgoingMessage::text(content).with_attachment(Attachment {
            file_name: format!("{}.{}", file_stem, table.extension),
            content_type: table.content_type.to_string(),
            bytes: table.bytes,
        }))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn league(name: &str, id: &str, channel: &str) -> LeagueConfig {
        LeagueConfig {
            name: name.to_string(),
            league_id: id.to_string(),
            channel_id: channel.to_string(),
        }
    }

    fn reporter(source: FakeSource, poster: Arc<RecordingPoster>) -> StandingsReporter {
        StandingsReporter::new(Arc::new(source), Arc::new(PlainRenderer), poster)
    }

    #[tokio::test]
    async fn season_standings_use_fallback_labels() {
        let reporter = reporter(FakeSource::default(), Arc::new(RecordingPoster::default()));
        let rows = reporter.standings("L1").await.unwrap();

        let teams: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(
            teams,
            vec!["Team 4", "Ozark Outlaws", "Cape Crushers", "Team 3"]
        );
        assert_eq!(
            rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[tokio::test]
    async fn live_projection_applies_current_scores() {
        let source = FakeSource {
            week: 5,
            ..Default::default()
        };
        let reporter = reporter(source, Arc::new(RecordingPoster::default()));
        let live = reporter.live_projection("L1").await.unwrap();

        assert_eq!(live.week, 5);
        let summary: Vec<(u32, String)> = live
            .rows
            .iter()
            .map(|r| (r.roster_id, r.record()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (4, "4-1".to_string()),
                (1, "4-1".to_string()),
                (3, "2-3".to_string()),
                (2, "2-3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn prepared_standings_attach_rendered_table() {
        let poster = Arc::new(RecordingPoster::default());
        let reporter = reporter(FakeSource::default(), poster.clone());
        let league = league("SEMO AGS", "L1", "111");

        let message = reporter.prepare_standings(&league).await.unwrap();
        assert!(poster.attempted().is_empty());
        assert_eq!(message.content, STANDINGS_CONTENT);

        let attachment = message.attachment.as_ref().unwrap();
        assert_eq!(attachment.file_name, "standings.txt");
        let text = String::from_utf8(attachment.bytes.clone()).unwrap();
        assert!(text.starts_with("SEMO AGS — Standings\n1|Team 4|4-0\n"));

        reporter.deliver_standings(&league, message).await.unwrap();
        let posts = poster.posted();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "111");
    }

    #[tokio::test]
    async fn post_live_titles_with_week() {
        let poster = Arc::new(RecordingPoster::default());
        let source = FakeSource {
            week: 11,
            ..Default::default()
        };
        let reporter = reporter(source, poster.clone());
        let league = league("SEMO Premo", "L1", "222");
        let week = reporter.post_live(&league, "222").await.unwrap();
        assert_eq!(week, 11);

        let (_, message) = &poster.posted()[0];
        assert_eq!(message.content, LIVE_CONTENT);
        let attachment = message.attachment.as_ref().unwrap();
        assert_eq!(attachment.file_name, "live-standings.txt");
        let text = String::from_utf8(attachment.bytes.clone()).unwrap();
        let heading = "SEMO Premo — Live Standings (if Week 11 ended now)\n";
        assert!(text.starts_with(heading));
    }

    #[tokio::test]
    async fn fetch_failure_posts_nothing() {
        let poster = Arc::new(RecordingPoster::default());
        let reporter = reporter(FakeSource::failing(&["L1"]), poster.clone());
        let league = league("Broken", "L1", "333");

        assert!(reporter.prepare_standings(&league).await.is_err());
        assert!(reporter.post_live(&league, "333").await.is_err());
        assert!(poster.attempted().is_empty());
    }
}
