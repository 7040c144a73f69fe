use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, StatsError};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const USER_AGENT: &str = "DiscordBot (valorant-stats)";

/// Where a provider expects its API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyPlacement {
    Query(&'static str),
    Header(&'static str),
}

/// Authenticated JSON GET client for one upstream provider.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    provider: &'static str,
    http: Client,
    base_url: String,
    api_key: Option<String>,
    key_env: &'static str,
    placement: ApiKeyPlacement,
}

impl UpstreamClient {
    /// `key_env` names the variable the key comes from, for error messages.
    pub fn new(
        provider: &'static str,
        base_url: impl Into<String>,
        api_key: Option<String>,
        key_env: &'static str,
        placement: ApiKeyPlacement,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json,text/plain,*/*"));

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            provider,
            http,
            base_url: base_url.into(),
            api_key,
            key_env,
            placement,
        })
    }

    /// Builds `base_url/segment/...`, percent-encoding each segment.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StatsError::Config(format!("invalid {} base URL {}: {}", self.provider, self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| StatsError::Config(format!("{} base URL cannot take a path", self.provider)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GETs `segments` with `query` and returns the parsed JSON body untouched.
    ///
    /// Fails without dispatching when no API key is configured. Non-JSON
    /// bodies, non-200 statuses and timeouts all become
    /// [`StatsError::Upstream`]. There are no retries.
    pub async fn fetch(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StatsError::missing_key(self.key_env))?;

        let url = self.url(segments)?;
        debug!("Sending request to {} {}", self.provider, url);

        let mut request = self.http.get(url).query(query);
        request = match self.placement {
            ApiKeyPlacement::Query(name) => request.query(&[(name, api_key)]),
            ApiKeyPlacement::Header(name) => request.header(name, api_key),
        };

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let raw = response.text().await.map_err(|e| self.transport_error(e))?;

        let json: Value = serde_json::from_str(&raw).map_err(|_| {
            StatsError::upstream(self.provider, Some(status), &format!("non-JSON body: {}", raw))
        })?;

        if status != 200 {
            return Err(StatsError::upstream(self.provider, Some(status), &json.to_string()));
        }

        debug!("{} responded {} ({} bytes)", self.provider, status, raw.len());
        Ok(json)
    }

    fn transport_error(&self, e: reqwest::Error) -> StatsError {
        if e.is_timeout() {
            StatsError::upstream(
                self.provider,
                None,
                &format!("request timed out after {}s", REQUEST_TIMEOUT.as_secs()),
            )
        } else {
            StatsError::Http(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn client(base: &str, key: Option<&str>) -> UpstreamClient {
        UpstreamClient::new(
            "Henrik",
            base,
            key.map(str::to_string),
            "HENRIK_API_KEY",
            ApiKeyPlacement::Query("api_key"),
        )
        .unwrap()
    }

    #[test]
    fn url_segments_are_percent_encoded() {
        let c = client("https://api.henrikdev.xyz/valorant", Some("k"));
        let url = c.url(&["v1", "account", "Boku wa Chopper", "0001"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.henrikdev.xyz/valorant/v1/account/Boku%20wa%20Chopper/0001"
        );

        let url = c.url(&["profile", "riot", "Foo#1234"]).unwrap();
        assert!(url.as_str().ends_with("/profile/riot/Foo%231234"));
    }

    #[test]
    fn trailing_slash_in_base_is_tolerated() {
        let c = client("http://127.0.0.1:9/valorant/", Some("k"));
        let url = c.url(&["v2", "mmr"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/valorant/v2/mmr");
    }

    #[tokio::test]
    async fn missing_key_fails_before_dispatch() {
        // Port 9 would refuse the connection; the key check must come first.
        let c = client("http://127.0.0.1:9", None);
        let err = c.fetch(&["v1", "account", "a", "b"], &[]).await.unwrap_err();
        assert_matches!(err, StatsError::Config(msg) if msg.contains("HENRIK_API_KEY"));
    }

    #[tokio::test]
    async fn bad_base_url_is_a_config_error() {
        let c = client("not a url", Some("k"));
        assert_matches!(c.fetch(&["x"], &[]).await, Err(StatsError::Config(_)));
    }
}
