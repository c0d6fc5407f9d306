use crate::config::SleeperConfig;
use crate::error::{FetchError, Result};
use crate::feed::LeagueDataSource;
use crate::models::*;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use standings_engine::{MatchupEntry, Roster, User};
use std::time::Duration;
use tracing::{debug, info};

/// Sleeper API client
#[derive(Debug, Clone)]
pub struct SleeperClient {
    config: SleeperConfig,
    client: Client,
}

impl SleeperClient {
    /// Create a new client instance
    pub fn new(config: SleeperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// GET a path under the API root and decode the JSON body.
    ///
    /// Any non-success status is an error; the body is not inspected.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint(path);
        debug!("Fetching {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(path, status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }

    /// Get current NFL state
    pub async fn fetch_nfl_state(&self) -> Result<NflState> {
        self.get_json("state/nfl").await
    }

    /// Get all rosters of a league
    pub async fn fetch_rosters(&self, league_id: &str) -> Result<Vec<SleeperRoster>> {
        let path = format!("league/{}/rosters", league_id);
        let rosters: Vec<SleeperRoster> = self.get_json(&path).await?;
        info!(
            "Fetched {} rosters for league {}",
            rosters.len(),
            league_id
        );
        Ok(rosters)
    }

    /// Get all users of a league
    pub async fn fetch_users(&self, league_id: &str) -> Result<Vec<SleeperUser>> {
        let path = format!("league/{}/users", league_id);
        let users: Vec<SleeperUser> = self.get_json(&path).await?;
        info!("Fetched {} users for league {}", users.len(), league_id);
        Ok(users)
    }

    /// Get the matchup entries of a league for one week
    pub async fn fetch_matchups(&self, league_id: &str, week: u32) -> Result<Vec<SleeperMatchup>> {
        let path = format!("league/{}/matchups/{}", league_id, week);
        let matchups: Vec<SleeperMatchup> = self.get_json(&path).await?;
        info!(
            "Fetched {} matchup entries for league {} week {}",
            matchups.len(),
            league_id,
            week
        );
        Ok(matchups)
    }

    /// Health check for Sleeper API
    pub async fn health_check(&self) -> Result<()> {
        self.fetch_nfl_state().await.map(|_| ())
    }
}

#[async_trait]
impl LeagueDataSource for SleeperClient {
    async fn current_week(&self) -> Result<u32> {
        Ok(self.fetch_nfl_state().await?.current_week())
    }

    async fn rosters(&self, league_id: &str) -> Result<Vec<Roster>> {
        let rosters = self.fetch_rosters(league_id).await?;
        Ok(rosters.into_iter().map(Roster::from).collect())
    }

    async fn users(&self, league_id: &str) -> Result<Vec<User>> {
        let users = self.fetch_users(league_id).await?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn matchups(&self, league_id: &str, week: u32) -> Result<Vec<MatchupEntry>> {
        let matchups = self.fetch_matchups(league_id, week).await?;
        Ok(matchups.into_iter().map(MatchupEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fetch_live_league;
    use rust_decimal::Decimal;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Route = (&'static str, u16, &'static str);

    /// Answer every connection with the canned response for its request path
    async fn serve(routes: Vec<Route>) -> SleeperClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = SleeperConfig {
            api_base_url: format!("http://{}/v1", listener.local_addr().unwrap()),
            ..Default::default()
        };
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let request = String::from_utf8_lossy(&buf).to_string();
                    let path = request.split_whitespace().nth(1).unwrap_or_default();
                    let (status, body) = routes
                        .iter()
                        .find(|(route, ..)| *route == path)
                        .map(|(_, status, body)| (*status, *body))
                        .unwrap_or((404, "{}"));
                    let response = format!(
                        "HTTP/1.1 {} OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        SleeperClient::new(config).unwrap()
    }

    const STATE: Route = ("/v1/state/nfl", 200, r#"{"week":3,"season":"2025"}"#);
    const ROSTERS: Route = (
        "/v1/league/L1/rosters",
        200,
        r#"[
            {"roster_id": 1, "owner_id": "u1",
             "settings": {"wins": 2, "losses": 0, "fpts": 250, "fpts_decimal": 40}},
            {"roster_id": 2, "owner_id": "u2",
             "settings": {"wins": 0, "losses": 2, "fpts": 201}}
        ]"#,
    );
    const USERS: Route = (
        "/v1/league/L1/users",
        200,
        r#"[
            {"user_id": "u1", "display_name": "Ozark Outlaws"},
            {"user_id": "u2", "username": "cape"}
        ]"#,
    );
    const MATCHUPS: Route = (
        "/v1/league/L1/matchups/3",
        200,
        r#"[
            {"matchup_id": 1, "roster_id": 1, "points": 88.5},
            {"matchup_id": 1, "roster_id": 2, "points": "91.2"}
        ]"#,
    );

    #[test]
    fn builds_with_default_config() {
        assert!(SleeperClient::new(SleeperConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn unreachable_api_is_a_fetch_error() {
        // Port 9 (discard) on localhost is not serving HTTP
        let config = SleeperConfig {
            api_base_url: "http://127.0.0.1:9/v1".to_string(),
            request_timeout_secs: 2,
        };
        let client = SleeperClient::new(config).unwrap();

        let err = client.current_week().await.unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }

    #[tokio::test]
    async fn week_comes_from_the_state_lookup() {
        let client = serve(vec![STATE]).await;
        assert_eq!(client.current_week().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn error_status_names_the_endpoint() {
        let client = serve(vec![("/v1/league/L1/users", 500, "oops")]).await;

        match client.fetch_users("L1").await.unwrap_err() {
            FetchError::Status { endpoint, status } => {
                assert_eq!(endpoint, "league/L1/users");
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let client = serve(vec![("/v1/state/nfl", 200, "not json")]).await;

        let err = client.current_week().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(err.to_string().contains("state/nfl"));
    }

    #[tokio::test]
    async fn live_league_is_fetched_and_converted() {
        let client = serve(vec![STATE, ROSTERS, USERS, MATCHUPS]).await;

        let snapshot = fetch_live_league(&client, "L1").await.unwrap();
        assert_eq!(snapshot.week, 3);
        assert_eq!(snapshot.rosters.len(), 2);
        let leader = &snapshot.rosters[0];
        assert_eq!(leader.points_hundredths, Some(Decimal::from(40)));
        assert_eq!(snapshot.users[1].label(), "cape");
        assert_eq!(snapshot.matchups[1].points, Some(Decimal::new(912, 1)));
    }

    #[tokio::test]
    async fn failing_endpoint_fails_the_live_fetch() {
        let users = ("/v1/league/L1/users", 503, "");
        let client = serve(vec![STATE, ROSTERS, users, MATCHUPS]).await;

        let err = fetch_live_league(&client, "L1").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }
}
