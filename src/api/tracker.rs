use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::upstream::{ApiKeyPlacement, UpstreamClient};
use crate::error::Result;
use crate::models::cache::{cache_key, TtlCache};
use crate::models::player::RiotId;

pub const PROVIDER: &str = "TRN";
pub const KEY_ENV: &str = "TRN_API_KEY";

/// Tracker Network profile API.
pub struct TrackerApi {
    client: UpstreamClient,
    cache: Arc<TtlCache>,
    ttl: Duration,
}

impl TrackerApi {
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
            ApiKeyPlacement::Header("TRN-Api-Key"),
        )?;
        Ok(Self { client, cache, ttl })
    }

    /// `force_collect` asks TRN to re-collect the profile and skips our cache
    /// read; a successful result replaces the cached one.
    pub async fn get_profile(&self, id: &RiotId, force_collect: bool) -> Result<Value> {
        let riot_id = id.to_string();
        let key = cache_key("tracker", "profile", &riot_id);
        let fetch = || async {
            info!("Fetching profile for {} (force_collect={})", riot_id, force_collect);
            let query: &[(&str, &str)] = if force_collect {
                &[("forceCollect", "true")]
            } else {
                &[]
            };
            self.client.fetch(&["profile", "riot", &riot_id], query).await
        };

        if force_collect {
            self.cache.refresh(&key, fetch).await
        } else {
            self.cache.get_or_fetch(&key, self.ttl, fetch).await
        }
    }
}
