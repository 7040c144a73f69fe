use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;

/// A Riot ID, `gameName#tagLine`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiotId {
    pub game_name: String,
    pub tag_line: String,
}

impl RiotId {
    pub fn new(game_name: impl Into<String>, tag_line: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            tag_line: tag_line.into(),
        }
    }

    /// Trimmed, non-empty halves without `#`, so `name#tag` stays unambiguous.
    pub fn parse_parts(game_name: &str, tag_line: &str) -> Result<Self, StatsError> {
        let (name, tag) = (game_name.trim(), tag_line.trim());
        if name.is_empty() || tag.is_empty() {
            return Err(StatsError::InvalidInput(
                "gameName and tagLine must not be empty".to_string(),
            ));
        }
        if name.contains('#') || tag.contains('#') {
            return Err(StatsError::InvalidInput(format!(
                "gameName and tagLine must not contain '#', got {:?} and {:?}",
                name, tag
            )));
        }
        Ok(RiotId::new(name, tag))
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

impl FromStr for RiotId {
    type Err = StatsError;

    /// Exactly one `#`; game names may contain spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, tag) = s
            .trim()
            .split_once('#')
            .ok_or_else(|| StatsError::InvalidInput(format!("expected gameName#tagLine, got {:?}", s)))?;
        RiotId::parse_parts(name, tag)
    }
}

/// Region-qualified player lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerQuery {
    pub region: String,
    pub id: RiotId,
}

impl PlayerQuery {
    /// Region is stored lower-case, the way the upstream expects it.
    pub fn new(region: &str, game_name: &str, tag_line: &str) -> Result<Self, StatsError> {
        let region = region.trim().to_lowercase();
        if region.is_empty() || !region.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StatsError::InvalidInput(format!("invalid region {:?}", region)));
        }
        Ok(Self {
            region,
            id: RiotId::parse_parts(game_name, tag_line)?,
        })
    }
}

impl fmt::Display for PlayerQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn riot_id_keeps_spaces_in_names() {
        let id: RiotId = "Boku wa Chopper#0001".parse().unwrap();
        assert_eq!(id, RiotId::new("Boku wa Chopper", "0001"));
    }

    #[test]
    fn hash_inside_either_half_is_rejected() {
        assert!("we#ird#EUNE".parse::<RiotId>().is_err());
        assert!(RiotId::parse_parts("a#b", "c").is_err());
        assert!(RiotId::parse_parts("a", "b#c").is_err());
        assert!(PlayerQuery::new("eu", "a#b", "c").is_err());
        assert!(PlayerQuery::new("eu", "a", "b#c").is_err());
    }

    #[test]
    fn parts_are_trimmed_and_required() {
        assert_eq!(RiotId::parse_parts(" Foo ", " 1234 ").unwrap(), RiotId::new("Foo", "1234"));
        assert!(RiotId::parse_parts("   ", "1234").is_err());
    }

    #[test]
    fn riot_id_needs_both_halves() {
        assert!("NoTag".parse::<RiotId>().is_err());
        assert!("Name#".parse::<RiotId>().is_err());
        assert!("#1234".parse::<RiotId>().is_err());
    }

    #[test]
    fn query_lowercases_region() {
        let q = PlayerQuery::new("EU", "Foo", "1234").unwrap();
        assert_eq!(q.region, "eu");
        assert_eq!(q.to_string(), "eu:Foo#1234");
        assert!(PlayerQuery::new("e/u", "Foo", "1234").is_err());
    }
}
