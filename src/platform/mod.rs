//! The chat platform capabilities the bot consumes.
//!
//! Services only talk to the platform through [`Platform`], so they can be exercised
//! against an in-memory fake. Message content is described with neutral types that the
//! serenity adapter turns into embeds and components.

#[cfg(test)]
pub mod fake;
mod serenity_platform;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, RoleId, UserId};

pub use serenity_platform::{create_embed, SerenityPlatform};

/// Persistent custom ids of the buttons the bot posts.
pub mod custom_ids {
    pub const SUBMIT_SOLO: &str = "wr_submit_solo";
    pub const SUBMIT_TEAM: &str = "wr_submit_team";
    pub const APPROVE: &str = "wr_approve";
    pub const REJECT: &str = "wr_reject";
    pub const LEADERBOARD_REFRESH: &str = "wr_lb_refresh";
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("missing permissions: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuildRole {
    pub id: RoleId,
    pub name: String,
}

/// What the bot needs to know about a message it found in a channel's history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: MessageId,
    pub from_self: bool,
    /// Title of the first embed, if any.
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// An embed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<CardField>,
    pub footer: Option<String>,
}

impl Card {
    pub fn new(title: impl Into<String>, color: u32) -> Card {
        Card {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            footer: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Card {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Card {
        self.fields.push(CardField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Card {
        self.footer = Some(footer.into());
        self
    }

    #[cfg(test)]
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

/// The interactive controls attached below a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Controls {
    None,
    SubmissionButtons,
    ApprovalButtons,
    LeaderboardRefresh,
}

/// A message to send, or the full new state of a message to edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: Option<String>,
    pub card: Option<Card>,
    pub controls: Controls,
}

impl OutgoingMessage {
    pub fn card(card: Card, controls: Controls) -> OutgoingMessage {
        OutgoingMessage {
            content: None,
            card: Some(card),
            controls,
        }
    }

    pub fn text(content: impl Into<String>) -> OutgoingMessage {
        OutgoingMessage {
            content: Some(content.into()),
            card: None,
            controls: Controls::None,
        }
    }
}

#[async_trait]
pub trait Platform: Send + Sync + 'static {
    async fn guild_roles(&self, guild: GuildId) -> Result<Vec<GuildRole>, PlatformError>;

    /// Returns `None` if the user isn't a member of the guild.
    async fn member_roles(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<Vec<RoleId>>, PlatformError>;

    async fn add_member_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), PlatformError>;

    async fn remove_member_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
    ) -> Result<(), PlatformError>;

    /// Returns `None` if the user isn't a member of the guild.
    async fn display_name(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<String>, PlatformError>;

    async fn find_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, PlatformError>;

    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageId, PlatformError>;

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        message: OutgoingMessage,
    ) -> Result<(), PlatformError>;

    /// The newest `limit` messages of a channel, newest first.
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageSummary>, PlatformError>;
}
