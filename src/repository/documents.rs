use std::collections::BTreeMap;

use poise::serenity_prelude::{ChannelId, GuildId};
use serde::{Deserialize, Serialize};

use crate::models::{
    deserialize_pending, ApprovedRecord, BoardKind, BoardPin, ChannelKey, PendingRecord,
};

/// `config.json`: per-guild channel and role ids, keyed by guild id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub guilds: BTreeMap<String, GuildConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildConfig {
    #[serde(default)]
    pub channels: BTreeMap<String, u64>,
    #[serde(default)]
    pub roles: BTreeMap<String, u64>,
}

impl ConfigDocument {
    pub fn channel_id(&self, guild: GuildId, key: ChannelKey) -> Option<ChannelId> {
        self.guilds
            .get(&guild.to_string())
            .and_then(|config| config.channels.get(key.config_key()))
            .filter(|id| **id != 0)
            .map(|id| ChannelId::new(*id))
    }

    pub fn set_channel_id(&mut self, guild: GuildId, key: ChannelKey, channel: ChannelId) {
        self.guilds
            .entry(guild.to_string())
            .or_default()
            .channels
            .insert(key.config_key().to_string(), channel.get());
    }

    pub fn clear_channel_id(&mut self, guild: GuildId, key: ChannelKey) {
        if let Some(config) = self.guilds.get_mut(&guild.to_string()) {
            config.channels.remove(key.config_key());
        }
    }
}

/// `submissions.json`: the review lifecycle buckets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionsDocument {
    #[serde(default, deserialize_with = "deserialize_pending")]
    pub pending: Vec<PendingRecord>,
    #[serde(default)]
    pub approved: Vec<ApprovedRecord>,
    /// Reserved for seasonal records. Kept as-is so the file round-trips.
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

/// `pins.json`: where each board message lives, keyed by guild id and board.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinsDocument {
    pub guilds: BTreeMap<String, BTreeMap<String, BoardPin>>,
}

impl PinsDocument {
    pub fn pin(&self, guild: GuildId, board: BoardKind) -> Option<BoardPin> {
        self.guilds
            .get(&guild.to_string())
            .and_then(|boards| boards.get(board.pin_key()))
            .copied()
    }

    pub fn set_pin(&mut self, guild: GuildId, board: BoardKind, pin: BoardPin) {
        self.guilds
            .entry(guild.to_string())
            .or_default()
            .insert(board.pin_key().to_string(), pin);
    }

    pub fn clear_pin(&mut self, guild: GuildId, board: BoardKind) {
        if let Some(boards) = self.guilds.get_mut(&guild.to_string()) {
            boards.remove(board.pin_key());
        }
    }
}
