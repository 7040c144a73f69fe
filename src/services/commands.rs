//! Chat command surface: parsing, presets, cooldowns and reply rendering.

use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, StatsError};
use crate::models::message::ChatEmbed;
use crate::models::player::{PlayerQuery, RiotId};
use crate::services::cooldown::{Cooldown, COMMAND_COOLDOWN};
use crate::services::stats_service::StatsService;

/// Error details shown to chat users are cut to this many characters.
pub const MAX_ERROR_CHARS: usize = 1800;

lazy_static::lazy_static! {
    /// Shortcut commands bound to fixed players, in help order.
    pub static ref PRESETS: Vec<(&'static str, PlayerQuery)> = [
        ("raducu", "eu", "RaducuXD", "4683"),
        ("choppa", "eu", "Boku wa Chopper", "0001"),
        ("irinel", "eu", "Irinel", "5555"),
        ("louis", "eu", "Boku Wa Luizao", "0001"),
        ("horatiu", "eu", "123cmboy", "EUNE"),
        ("stapot", "eu", "Mizukii", "enana"),
    ]
    .iter()
    .map(|(cmd, region, name, tag)| {
        let query = PlayerQuery {
            region: region.to_string(),
            id: RiotId::new(*name, *tag),
        };
        (*cmd, query)
    })
    .collect();
}

pub fn preset(name: &str) -> Option<&'static PlayerQuery> {
    PRESETS
        .iter()
        .find(|(cmd, _)| cmd.eq_ignore_ascii_case(name))
        .map(|(_, query)| query)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Stats(PlayerQuery),
    Tracker { id: RiotId, force_collect: bool },
    Preset(&'static str),
    Help,
}

impl Command {
    /// Parses `[/]name args...`.
    pub fn parse(line: &str) -> Result<Command> {
        let line = line.trim().trim_start_matches('/');
        let mut tokens = line.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| StatsError::InvalidInput("empty command".to_string()))?
            .to_lowercase();
        let args: Vec<&str> = tokens.collect();

        match name.as_str() {
            "help" => Ok(Command::Help),
            "stats" => match args.split_first() {
                Some((region, rest)) if !rest.is_empty() => {
                    let id: RiotId = rest.join(" ").parse()?;
                    Ok(Command::Stats(PlayerQuery::new(region, &id.game_name, &id.tag_line)?))
                }
                _ => Err(StatsError::InvalidInput(
                    "usage: stats <region> <gameName>#<tagLine>".to_string(),
                )),
            },
            "tracker" => {
                let (force_collect, rest) = match args.split_last() {
                    Some((last, rest)) if last.eq_ignore_ascii_case("force") && !rest.is_empty() => {
                        (true, rest)
                    }
                    _ => (false, args.as_slice()),
                };
                if rest.is_empty() {
                    return Err(StatsError::InvalidInput(
                        "usage: tracker <gameName>#<tagLine> [force]".to_string(),
                    ));
                }
                Ok(Command::Tracker {
                    id: rest.join(" ").parse()?,
                    force_collect,
                })
            }
            other => PRESETS
                .iter()
                .find(|(cmd, _)| *cmd == other)
                .map(|(cmd, _)| Command::Preset(*cmd))
                .ok_or_else(|| StatsError::InvalidInput(format!("unknown command {:?}", other))),
        }
    }

    /// Cooldown bucket name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Stats(_) => "stats",
            Command::Tracker { .. } => "tracker",
            Command::Preset(name) => *name,
            Command::Help => "help",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    Embed(ChatEmbed),
    Text { content: String, ephemeral: bool },
}

impl ChatReply {
    fn ephemeral(content: impl Into<String>) -> Self {
        ChatReply::Text {
            content: content.into(),
            ephemeral: true,
        }
    }
}

pub fn help_text() -> String {
    let mut text = String::from("**Commands:**\n");
    text.push_str("- /stats <region> <gameName>#<tagLine>\n");
    text.push_str("- /tracker <gameName>#<tagLine> [force]\n");
    for (cmd, query) in PRESETS.iter() {
        let _ = writeln!(text, "- /{} ({}, {})", cmd, query.id, query.region.to_uppercase());
    }
    text.push_str("\nNote: XP to the next level requires signing in to the account (not public).");
    text
}

/// User-facing failure text, with the error detail truncated.
pub fn failure_text(err: &StatsError) -> String {
    let mut detail = err.to_string();
    if detail.chars().count() > MAX_ERROR_CHARS {
        detail = detail.chars().take(MAX_ERROR_CHARS).collect();
        detail.push_str("...");
    }
    format!("Could not fetch the data.\nDetails: `{}`", detail)
}

pub struct CommandHandler {
    stats: Arc<StatsService>,
    cooldown: Cooldown,
}

impl CommandHandler {
    pub fn new(stats: Arc<StatsService>) -> Self {
        Self::with_cooldown(stats, Cooldown::new(COMMAND_COOLDOWN))
    }

    pub fn with_cooldown(stats: Arc<StatsService>, cooldown: Cooldown) -> Self {
        Self { stats, cooldown }
    }

    pub async fn handle(&self, user: &str, line: &str) -> ChatReply {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejected command {:?}: {}", line, e);
                return ChatReply::ephemeral(format!("{}\nType /help for the command list.", e));
            }
        };

        // Help is free; lookups are rate limited.
        if command != Command::Help {
            if let Err(wait) = self.cooldown.check(user, command.name()) {
                return ChatReply::ephemeral(format!(
                    "Command is on cooldown. Try again in {:.0}s.",
                    wait.as_secs_f64()
                ));
            }
        }

        debug!("{} ran {:?}", user, command);
        match self.run(&command).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Command {} failed: {}", command.name(), e);
                ChatReply::ephemeral(failure_text(&e))
            }
        }
    }

    async fn run(&self, command: &Command) -> Result<ChatReply> {
        let message = match command {
            Command::Help => return Ok(ChatReply::ephemeral(help_text())),
            Command::Stats(query) => self.stats.player_stats(query).await?,
            Command::Tracker { id, force_collect } => self.stats.tracker_stats(id, *force_collect).await?,
            Command::Preset(name) => {
                let query = preset(name).ok_or_else(|| {
                    StatsError::Config(format!("preset {:?} is not configured", name))
                })?;
                self.stats.player_stats(query).await?
            }
        };
        Ok(ChatReply::Embed(message.to_embed()))
    }
}
