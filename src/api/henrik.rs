use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::upstream::{ApiKeyPlacement, UpstreamClient};
use crate::error::Result;
use crate::models::cache::{cache_key, TtlCache};
use crate::models::player::{PlayerQuery, RiotId};

pub const PROVIDER: &str = "Henrik";
pub const KEY_ENV: &str = "HENRIK_API_KEY";

/// Henrik's unofficial VALORANT API. Every call goes through the shared cache.
pub struct HenrikApi {
    client: UpstreamClient,
    cache: Arc<TtlCache>,
    ttl: Duration,
}

impl HenrikApi {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        cache: Arc<TtlCache>,
        ttl: Duration,
    ) -> Result<Self> {
        let client = UpstreamClient::new(
            PROVIDER,
            base_url,
            api_key,
            KEY_ENV,
            ApiKeyPlacement::Query("api_key"),
        )?;
        Ok(Self { client, cache, ttl })
    }

    pub async fn get_mmr(&self, query: &PlayerQuery) -> Result<Value> {
        let id = &query.id;
        self.cached(
            "mmr",
            &query.to_string(),
            &["v2", "mmr", &query.region, &id.game_name, &id.tag_line],
        )
        .await
    }

    pub async fn get_mmr_history(&self, query: &PlayerQuery) -> Result<Value> {
        let id = &query.id;
        self.cached(
            "mmr-history",
            &query.to_string(),
            &["v1", "mmr-history", &query.region, &id.game_name, &id.tag_line],
        )
        .await
    }

    pub async fn get_account(&self, id: &RiotId) -> Result<Value> {
        self.cached(
            "account",
            &id.to_string(),
            &["v1", "account", &id.game_name, &id.tag_line],
        )
        .await
    }

    async fn cached(&self, endpoint: &str, identity: &str, segments: &[&str]) -> Result<Value> {
        let key = cache_key("henrik", endpoint, identity);
        self.cache
            .get_or_fetch(&key, self.ttl, || async {
                info!("Fetching {} for {}", endpoint, identity);
                self.client.fetch(segments, &[]).await
            })
            .await
    }
}
