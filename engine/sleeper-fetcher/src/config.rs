use serde::{Deserialize, Serialize};

/// Default public Sleeper API root
pub const DEFAULT_API_BASE_URL: &str = "https://api.sleeper.app/v1";

/// Configuration for the Sleeper API client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SleeperConfig {
    /// API root, without trailing slash
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for SleeperConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl SleeperConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields that are set in the environment
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SLEEPER_API_BASE_URL") {
            self.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(timeout) = std::env::var("SLEEPER_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout.parse().unwrap_or(self.request_timeout_secs);
        }
    }

    /// Build an endpoint URL from a path relative to the API root
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_public_api() {
        let config = SleeperConfig::default();
        assert_eq!(
            config.endpoint("state/nfl"),
            "https://api.sleeper.app/v1/state/nfl"
        );
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn endpoint_tolerates_extra_slashes() {
        let config = SleeperConfig {
            api_base_url: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint("/league/42/users"),
            "http://localhost:8080/v1/league/42/users"
        );
    }
}
