use std::sync::Arc;
use tracing::info;

use crate::api::henrik::HenrikApi;
use crate::api::tracker::TrackerApi;
use crate::config::Config;
use crate::error::Result;
use crate::models::cache::TtlCache;
use crate::models::message::PresentationMessage;
use crate::models::player::{PlayerQuery, RiotId};
use crate::models::stats::ProviderDocs;
use crate::services::normalizer::normalize;
use crate::services::presenter::{present, StatsView};

/// Fetch, normalize and present. Shared by the chat commands and the web routes.
pub struct StatsService {
    henrik: HenrikApi,
    tracker: TrackerApi,
}

impl StatsService {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_cache(config, Arc::new(TtlCache::new()))
    }

    /// Both providers share `cache`.
    pub fn with_cache(config: &Config, cache: Arc<TtlCache>) -> Result<Self> {
        Ok(Self {
            henrik: HenrikApi::new(
                &config.henrik_base_url,
                config.henrik_api_key.clone(),
                cache.clone(),
                config.cache_ttl,
            )?,
            tracker: TrackerApi::new(
                &config.trn_base_url,
                config.trn_api_key.clone(),
                cache,
                config.cache_ttl,
            )?,
        })
    }

    pub async fn player_stats(&self, query: &PlayerQuery) -> Result<PresentationMessage> {
        info!("Fetching stats for {}", query);
        let (mmr, mmr_history, account) = tokio::try_join!(
            self.henrik.get_mmr(query),
            self.henrik.get_mmr_history(query),
            self.henrik.get_account(&query.id),
        )?;

        let docs = ProviderDocs {
            requested: Some(query.id.clone()),
            region: Some(query.region.clone()),
            mmr: Some(mmr),
            mmr_history: Some(mmr_history),
            account: Some(account),
            profile: None,
        };
        Ok(present(&normalize(&docs), StatsView::Stats))
    }

    pub async fn tracker_stats(&self, id: &RiotId, force_collect: bool) -> Result<PresentationMessage> {
        info!("Fetching tracker profile for {}", id);
        let profile = self.tracker.get_profile(id, force_collect).await?;

        let docs = ProviderDocs {
            requested: Some(id.clone()),
            profile: Some(profile),
            ..Default::default()
        };
        Ok(present(&normalize(&docs), StatsView::Tracker))
    }
}
