use std::time::Duration;

use crate::error::{Result, StatsError};

pub const DEFAULT_HENRIK_BASE_URL: &str = "https://api.henrikdev.xyz/valorant";
pub const DEFAULT_TRN_BASE_URL: &str = "https://api.tracker.gg/api/v2/valorant/standard";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Runtime configuration loaded from environment variables (and `.env`).
///
/// | Env Var           | Default                         |
/// |-------------------|---------------------------------|
/// | `HENRIK_API_KEY`  | unset, requests fail            |
/// | `TRN_API_KEY`     | unset, requests fail            |
/// | `DISCORD_TOKEN`   | unset, the bot refuses to start |
/// | `GUILD_ID`        | unset                           |
/// | `HOST`            | `0.0.0.0`                       |
/// | `PORT`            | `8080`                          |
/// | `CACHE_TTL_SECS`  | `300`                           |
/// | `HENRIK_BASE_URL` | Henrik public API               |
/// | `TRN_BASE_URL`    | Tracker Network public API      |
#[derive(Debug, Clone)]
pub struct Config {
    pub henrik_api_key: Option<String>,
    pub trn_api_key: Option<String>,
    pub discord_token: Option<String>,
    pub guild_id: Option<u64>,
    pub host: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub henrik_base_url: String,
    pub trn_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            henrik_api_key: None,
            trn_api_key: None,
            discord_token: None,
            guild_id: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            henrik_base_url: DEFAULT_HENRIK_BASE_URL.to_string(),
            trn_base_url: DEFAULT_TRN_BASE_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let guild_id = get("GUILD_ID")
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|_| StatsError::Config(format!("GUILD_ID must be a number, got {}", v)))
            })
            .transpose()?;

        let port = match get("PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|_| StatsError::Config(format!("PORT must be a valid port, got {}", v)))?,
            None => defaults.port,
        };

        let cache_ttl = match get("CACHE_TTL_SECS") {
            Some(v) => Duration::from_secs(v.parse::<u64>().map_err(|_| {
                StatsError::Config(format!("CACHE_TTL_SECS must be a number, got {}", v))
            })?),
            None => defaults.cache_ttl,
        };

        Ok(Self {
            henrik_api_key: get("HENRIK_API_KEY"),
            trn_api_key: get("TRN_API_KEY"),
            discord_token: get("DISCORD_TOKEN"),
            guild_id,
            host: get("HOST").unwrap_or(defaults.host),
            port,
            cache_ttl,
            henrik_base_url: get("HENRIK_BASE_URL").unwrap_or(defaults.henrik_base_url),
            trn_base_url: get("TRN_BASE_URL").unwrap_or(defaults.trn_base_url),
        })
    }

    /// The bot token is mandatory for the bot process itself.
    pub fn bot_token(&self) -> Result<&str> {
        self.discord_token
            .as_deref()
            .ok_or_else(|| StatsError::missing_key("DISCORD_TOKEN"))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.henrik_base_url, DEFAULT_HENRIK_BASE_URL);
        assert!(config.henrik_api_key.is_none());
        assert!(config.guild_id.is_none());
    }

    #[test]
    fn missing_bot_token_is_a_config_error() {
        let config = config_from(&[("HENRIK_API_KEY", "k")]).unwrap();
        assert_matches!(config.bot_token(), Err(StatsError::Config(msg)) if msg.contains("DISCORD_TOKEN"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[("TRN_API_KEY", "   "), ("DISCORD_TOKEN", "abc")]).unwrap();
        assert!(config.trn_api_key.is_none());
        assert_eq!(config.bot_token().unwrap(), "abc");
    }

    #[test]
    fn bad_guild_id_is_rejected() {
        assert_matches!(config_from(&[("GUILD_ID", "guild")]), Err(StatsError::Config(_)));
        let config = config_from(&[("GUILD_ID", "123456789")]).unwrap();
        assert_eq!(config.guild_id, Some(123456789));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[("PORT", "9000"), ("CACHE_TTL_SECS", "60"), ("HOST", "127.0.0.1")]).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }
}
