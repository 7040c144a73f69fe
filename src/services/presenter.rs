use crate::models::message::{MessageField, PresentationMessage, EMBED_COLOR};
use crate::models::stats::NormalizedStats;

pub const PLACEHOLDER: &str = "N/A";
pub const XP_NOTE: &str = "Requires signing in to the account (not public for other players).";

/// Which fixed field layout to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsView {
    /// Henrik MMR / account view.
    Stats,
    /// Tracker Network profile view.
    Tracker,
}

pub fn present(stats: &NormalizedStats, view: StatsView) -> PresentationMessage {
    match view {
        StatsView::Stats => present_stats(stats),
        StatsView::Tracker => present_tracker(stats),
    }
}

fn present_stats(stats: &NormalizedStats) -> PresentationMessage {
    let region = stats
        .region
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    PresentationMessage {
        title: format!("VALORANT: {}", or_placeholder(stats.riot_id())),
        description: format!("Region: {}", region),
        color: EMBED_COLOR,
        fields: vec![
            field("Level", show(stats.level), true),
            field("Rank", show(stats.rank.as_ref()), true),
            field("RR", show(stats.rr.map(|rr| format!("{} RR", rr))), true),
            field("Elo", show(stats.elo), true),
            field("Games (current season)", show(stats.season_games), true),
            field("Last RR change", show(stats.last_rr_change), true),
            field("Games needed for rating", show(stats.games_needed_for_rating), true),
            field("Leaderboard rank", show(stats.leaderboard_rank), true),
            field("Last update", show(stats.last_update.as_ref()), false),
            field("XP to next level", XP_NOTE.to_string(), false),
        ],
        thumbnail_url: stats.thumbnail_url.clone(),
        footer: stats
            .last_update_raw
            .map(|raw| format!("last_update_raw: {}", raw)),
    }
}

fn present_tracker(stats: &NormalizedStats) -> PresentationMessage {
    PresentationMessage {
        title: format!("VALORANT Stats: {}", or_placeholder(stats.riot_id())),
        description: "Powered By Tracker Network".to_string(),
        color: EMBED_COLOR,
        fields: vec![
            field("Level", show(stats.level), true),
            field("Rank", show(stats.rank.as_ref()), true),
            field("Matches", show(stats.matches.as_ref()), true),
            field("Wins", show(stats.wins.as_ref()), true),
            field("K/D", show(stats.kd.as_ref()), true),
        ],
        thumbnail_url: stats.thumbnail_url.clone(),
        footer: None,
    }
}

fn field(name: &str, value: String, inline: bool) -> MessageField {
    MessageField {
        name: name.to_string(),
        value,
        inline,
    }
}

fn show<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| PLACEHOLDER.to_string())
}
