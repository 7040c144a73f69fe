use serde::Serialize;
use serde_json::Value;

use crate::models::player::RiotId;

/// Raw upstream documents available for one lookup. Any of them may be missing.
///
/// `requested` and `region` describe what the caller asked for and only fill
/// gaps the documents leave.
#[derive(Debug, Clone, Default)]
pub struct ProviderDocs {
    pub requested: Option<RiotId>,
    pub region: Option<String>,
    pub mmr: Option<Value>,
    pub mmr_history: Option<Value>,
    pub account: Option<Value>,
    /// Tracker Network profile document.
    pub profile: Option<Value>,
}

/// Flat display record built from the provider documents.
///
/// `None` means the upstream did not provide the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStats {
    pub display_name: Option<String>,
    pub tag: Option<String>,
    pub region: Option<String>,
    pub level: Option<i64>,
    pub rank: Option<String>,
    pub rr: Option<i64>,
    pub elo: Option<i64>,
    pub leaderboard_rank: Option<i64>,
    pub season_games: Option<u64>,
    pub last_rr_change: Option<i64>,
    pub games_needed_for_rating: Option<i64>,
    pub last_update: Option<String>,
    pub last_update_raw: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub matches: Option<String>,
    pub wins: Option<String>,
    pub kd: Option<String>,
}

impl NormalizedStats {
    /// `name#tag` when both halves are known.
    pub fn riot_id(&self) -> Option<String> {
        match (&self.display_name, &self.tag) {
            (Some(name), Some(tag)) => Some(format!("{}#{}", name, tag)),
            (Some(name), None) => Some(name.clone()),
            _ => None,
        }
    }
}
