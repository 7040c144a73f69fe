//! Reconciles the Henrik and Tracker Network documents into [`NormalizedStats`].
//!
//! Every logical field has an ordered candidate list. Candidates are tried
//! in order and the first one that yields a value wins; nothing is merged.
//! Upstream schema drift is absorbed by editing these tables.

use serde_json::Value;

use crate::models::stats::{NormalizedStats, ProviderDocs};

/// Which upstream document a key path is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Doc {
    Mmr,
    MmrHistory,
    Account,
    Profile,
}

#[derive(Debug, Clone, Copy)]
pub enum Candidate {
    /// Nested object keys inside one document.
    Path(Doc, &'static [&'static str]),
    /// A stat inside the Tracker Network segment list. Segments are scanned
    /// in order and, within a segment, keys in order.
    Segment(&'static [&'static str]),
}

use Candidate::{Path, Segment};

pub const DISPLAY_NAME: &[Candidate] = &[
    Path(Doc::Account, &["data", "name"]),
    Path(Doc::Account, &["name"]),
];
pub const TAG: &[Candidate] = &[
    Path(Doc::Account, &["data", "tag"]),
    Path(Doc::Account, &["tag"]),
];
pub const REGION: &[Candidate] = &[
    Path(Doc::Account, &["data", "region"]),
    Path(Doc::Account, &["region"]),
];
pub const LEVEL: &[Candidate] = &[
    Path(Doc::Account, &["data", "account_level"]),
    Path(Doc::Account, &["account_level"]),
    Segment(&["level"]),
];
pub const RANK: &[Candidate] = &[
    Path(Doc::Mmr, &["data", "current_data", "currenttierpatched"]),
    Path(Doc::Mmr, &["current_data", "currenttierpatched"]),
    Segment(&["rank", "competitiveTier"]),
];
pub const RR: &[Candidate] = &[
    Path(Doc::Mmr, &["data", "current_data", "ranking_in_tier"]),
    Path(Doc::Mmr, &["current_data", "ranking_in_tier"]),
];
pub const ELO: &[Candidate] = &[
    Path(Doc::Mmr, &["data", "current_data", "elo"]),
    Path(Doc::Mmr, &["current_data", "elo"]),
];
pub const LEADERBOARD_RANK: &[Candidate] = &[
    Path(Doc::Mmr, &["data", "leaderboard_placement", "rank"]),
    Path(Doc::Mmr, &["leaderboard_placement", "rank"]),
];
pub const GAMES_NEEDED_FOR_RATING: &[Candidate] = &[
    Path(Doc::Mmr, &["data", "games_needed_for_rating"]),
    Path(Doc::Mmr, &["games_needed_for_rating"]),
];
pub const LAST_UPDATE: &[Candidate] = &[
    Path(Doc::Account, &["data", "last_update"]),
    Path(Doc::Account, &["data", "updated_at"]),
    Path(Doc::Account, &["last_update"]),
    Path(Doc::Account, &["updated_at"]),
];
pub const LAST_UPDATE_RAW: &[Candidate] = &[
    Path(Doc::Account, &["data", "last_update_raw"]),
    Path(Doc::Account, &["last_update_raw"]),
];
pub const THUMBNAIL_URL: &[Candidate] = &[
    Path(Doc::Account, &["data", "card", "small"]),
    Path(Doc::Account, &["card", "small"]),
    Path(Doc::Profile, &["data", "platformInfo", "avatarUrl"]),
    Path(Doc::Profile, &["platformInfo", "avatarUrl"]),
];
pub const USER_HANDLE: &[Candidate] = &[
    Path(Doc::Profile, &["data", "platformInfo", "platformUserHandle"]),
    Path(Doc::Profile, &["platformInfo", "platformUserHandle"]),
];
pub const MATCHES: &[Candidate] = &[Segment(&["matchesPlayed", "matches"])];
pub const WINS: &[Candidate] = &[Segment(&["wins"])];
pub const KD: &[Candidate] = &[Segment(&["kd", "kDRatio"])];

pub const SEASON_ID_KEYS: &[&str] = &["season_id", "seasonId"];
pub const RR_CHANGE_KEY: &str = "mmr_change_to_last_game";

pub fn normalize(docs: &ProviderDocs) -> NormalizedStats {
    let history = history_entries(docs.mmr_history.as_ref());
    let handle = first_text(docs, USER_HANDLE);
    let (handle_name, handle_tag) = match handle.as_deref().and_then(|h| h.rsplit_once('#')) {
        Some((name, tag)) => (Some(name.to_string()), Some(tag.to_string())),
        None => (handle.clone(), None),
    };

    NormalizedStats {
        display_name: first_text(docs, DISPLAY_NAME)
            .or(handle_name)
            .or_else(|| docs.requested.as_ref().map(|id| id.game_name.clone())),
        tag: first_text(docs, TAG)
            .or(handle_tag)
            .or_else(|| docs.requested.as_ref().map(|id| id.tag_line.clone())),
        region: docs.region.clone().or_else(|| first_text(docs, REGION)),
        level: first_int(docs, LEVEL),
        rank: first_text(docs, RANK),
        rr: first_int(docs, RR),
        elo: first_int(docs, ELO),
        leaderboard_rank: first_int(docs, LEADERBOARD_RANK),
        season_games: Some(season_games(history)),
        last_rr_change: history
            .first()
            .and_then(|entry| entry.get(RR_CHANGE_KEY))
            .and_then(as_int),
        games_needed_for_rating: first_int(docs, GAMES_NEEDED_FOR_RATING),
        last_update: first_text(docs, LAST_UPDATE),
        last_update_raw: first_int(docs, LAST_UPDATE_RAW),
        thumbnail_url: first_text(docs, THUMBNAIL_URL),
        matches: first_text(docs, MATCHES),
        wins: first_text(docs, WINS),
        kd: first_text(docs, KD),
    }
}

/// First candidate value that is present and not null.
pub fn lookup<'a>(docs: &'a ProviderDocs, candidates: &[Candidate]) -> Option<&'a Value> {
    candidates.iter().find_map(|candidate| match candidate {
        Path(doc, path) => document(docs, *doc)
            .and_then(|root| get_path(root, path))
            .filter(|v| !v.is_null()),
        Segment(keys) => {
            let root = document(docs, Doc::Profile)?;
            let segments = get_path(root, &["data", "segments"])
                .or_else(|| get_path(root, &["segments"]))
                .and_then(Value::as_array)?;
            find_first_stat(segments, keys).and_then(stat_value)
        }
    })
}

fn first_text(docs: &ProviderDocs, candidates: &[Candidate]) -> Option<String> {
    lookup(docs, candidates).and_then(as_text)
}

fn first_int(docs: &ProviderDocs, candidates: &[Candidate]) -> Option<i64> {
    lookup(docs, candidates).and_then(as_int)
}

fn document(docs: &ProviderDocs, doc: Doc) -> Option<&Value> {
    match doc {
        Doc::Mmr => docs.mmr.as_ref(),
        Doc::MmrHistory => docs.mmr_history.as_ref(),
        Doc::Account => docs.account.as_ref(),
        Doc::Profile => docs.profile.as_ref(),
    }
}

fn get_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.as_object()?.get(*key))
}

/// The first stat object found, scanning segments in order and keys in
/// priority order within each segment.
pub fn find_first_stat<'a>(segments: &'a [Value], keys: &[&str]) -> Option<&'a Value> {
    segments.iter().find_map(|segment| {
        let stats = segment.get("stats")?.as_object()?;
        keys.iter().find_map(|key| stats.get(*key))
    })
}

/// A stat's `displayValue`, falling back to its raw `value`.
pub fn stat_value(stat: &Value) -> Option<&Value> {
    let stat = stat.as_object()?;
    stat.get("displayValue")
        .filter(|v| is_truthy(v))
        .or_else(|| stat.get("value"))
        .filter(|v| !v.is_null())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Match history as a list: `history` when the document (or its `data`)
/// is an object, the array itself when it is one, otherwise empty.
pub fn history_entries(doc: Option<&Value>) -> &[Value] {
    let data = match doc {
        Some(doc) => doc.get("data").unwrap_or(doc),
        None => return &[],
    };
    match data {
        Value::Object(map) => map
            .get("history")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        Value::Array(list) => list.as_slice(),
        _ => &[],
    }
}

/// Games in the season of the most recent entry. Without a season id on that
/// entry every entry counts.
pub fn season_games(history: &[Value]) -> u64 {
    let current = match history.first().and_then(season_id) {
        Some(id) => id,
        None => return history.len() as u64,
    };
    history
        .iter()
        .filter(|entry| season_id(entry) == Some(current))
        .count() as u64
}

fn season_id(entry: &Value) -> Option<&Value> {
    let entry = entry.as_object()?;
    SEASON_ID_KEYS
        .iter()
        .find_map(|key| entry.get(*key))
        .filter(|v| is_truthy(v))
}

/// Strings pass through, numbers and booleans are formatted. Empty strings
/// count as missing.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integers, integral floats and numeric strings.
pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
