use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use poise::serenity_prelude::{
    ButtonStyle, Cache, ChannelId, ChannelType, Colour, CreateActionRow, CreateButton,
    CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage, GetMessages, Guild, GuildChannel,
    GuildId, Http, Member, MessageId, RoleId, UserId,
};
use tracing::debug;

use super::{
    custom_ids, Card, Controls, GuildRole, MessageSummary, OutgoingMessage, Platform,
    PlatformError,
};

const AUDIT_LOG_REASON: &str = "WR role update";

/// [`Platform`] over the gateway cache, falling back to the Discord REST API.
#[derive(Clone)]
pub struct SerenityPlatform {
    http: Arc<Http>,
    cache: Arc<Cache>,
    bot_id: UserId,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>, bot_id: UserId) -> SerenityPlatform {
        SerenityPlatform {
            http,
            cache,
            bot_id,
        }
    }

    // Cache entries hold a lock, so only owned values leave these two.
    fn cached_member<T>(
        &self,
        guild: GuildId,
        user: UserId,
        read: impl FnOnce(&Member) -> T,
    ) -> Option<T> {
        self.cache.member(guild, user).map(|member| read(&member))
    }

    fn cached_guild<T>(&self, guild: GuildId, read: impl FnOnce(&Guild) -> T) -> Option<T> {
        self.cache.guild(guild).map(|guild| read(&guild))
    }
}

/// The cached value if there is one, otherwise the fetched one. A fetch that
/// finds nothing is `None`.
async fn cached_or_fetch<T, F>(
    cached: Option<T>,
    fetch: impl FnOnce() -> F,
) -> Result<Option<T>, PlatformError>
where
    F: Future<Output = Result<T, serenity::Error>>,
{
    if let Some(value) = cached {
        return Ok(Some(value));
    }

    match fetch().await.map_err(PlatformError::from) {
        Ok(value) => Ok(Some(value)),
        Err(PlatformError::NotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn text_channel_named<'a>(
    channels: impl IntoIterator<Item = &'a GuildChannel>,
    name: &str,
) -> Option<ChannelId> {
    channels
        .into_iter()
        .find(|channel| channel.kind == ChannelType::Text && channel.name == name)
        .map(|channel| channel.id)
}

impl From<serenity::Error> for PlatformError {
    fn from(err: serenity::Error) -> Self {
        if let serenity::Error::Http(http_error) = &err {
            match http_error.status_code().map(|status| status.as_u16()) {
                Some(403) => return PlatformError::PermissionDenied(err.to_string()),
                Some(404) => return PlatformError::NotFound(err.to_string()),
                _ => {}
            }
        }

        PlatformError::Other(err.to_string())
    }
}

pub fn create_embed(card: &Card) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&card.title)
        .colour(Colour::new(card.color));

    if let Some(description) = &card.description {
        embed = embed.description(description);
    }

    for field in &card.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }

    if let Some(footer) = &card.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }

    embed
}

pub fn create_components(controls: Controls) -> Vec<CreateActionRow> {
    let buttons = match controls {
        Controls::None => return Vec::new(),

        Controls::SubmissionButtons => vec![
            CreateButton::new(custom_ids::SUBMIT_SOLO)
                .label("Submit Run (Solo)")
                .style(ButtonStyle::Primary),
            CreateButton::new(custom_ids::SUBMIT_TEAM)
                .label("Submit Run (Team)")
                .style(ButtonStyle::Secondary),
        ],

        Controls::ApprovalButtons => vec![
            CreateButton::new(custom_ids::APPROVE)
                .label("✅ Approve")
                .style(ButtonStyle::Success),
            CreateButton::new(custom_ids::REJECT)
                .label("❌ Reject")
                .style(ButtonStyle::Danger),
        ],

        Controls::LeaderboardRefresh => vec![CreateButton::new(custom_ids::LEADERBOARD_REFRESH)
            .label("Refresh Leaderboard")
            .style(ButtonStyle::Primary)],
    };

    vec![CreateActionRow::Buttons(buttons)]
}

#[async_trait]
impl Platform for SerenityPlatform {
    async fn guild_roles(&self, guild: GuildId) -> Result<Vec<GuildRole>, PlatformError> {
        let cached = self.cached_guild(guild, |guild| {
            guild
                .roles
                .values()
                .map(|role| GuildRole {
                    id: role.id,
                    name: role.name.clone(),
                })
                .collect::<Vec<_>>()
        });
        if let Some(roles) = cached {
            return Ok(roles);
        }

        let roles = guild.roles(&self.http).await?;

        Ok(roles
            .into_values()
            .map(|role| GuildRole {
                id: role.id,
                name: role.name,
            })
            .collect())
    }

    async fn member_roles(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<Vec<RoleId>>, PlatformError> {
        cached_or_fetch(
            self.cached_member(guild, user, |member| member.roles.clone()),
            || async move { guild.member(&*self.http, user).await.map(|member| member.roles) },
        )
        .await
    }

    async fn add_member_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        self.http
            .add_member_role(guild, user, role, Some(AUDIT_LOG_REASON))
            .await?;
        Ok(())
    }

    async fn remove_member_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
    ) -> Result<(), PlatformError> {
        for role in roles {
            self.http
                .remove_member_role(guild, user, *role, Some(AUDIT_LOG_REASON))
                .await?;
        }
        Ok(())
    }

    async fn display_name(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<String>, PlatformError> {
        cached_or_fetch(
            self.cached_member(guild, user, |member| member.display_name().to_string()),
            || async move {
                guild
                    .member(&*self.http, user)
                    .await
                    .map(|member| member.display_name().to_string())
            },
        )
        .await
    }

    async fn find_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, PlatformError> {
        if let Some(found) =
            self.cached_guild(guild, |guild| text_channel_named(guild.channels.values(), name))
        {
            return Ok(found);
        }

        let channels = guild.channels(&self.http).await?;
        Ok(text_channel_named(channels.values(), name))
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageId, PlatformError> {
        let mut builder =
            CreateMessage::new().components(create_components(message.controls));

        if let Some(content) = &message.content {
            builder = builder.content(content);
        }
        if let Some(card) = &message.card {
            builder = builder.embed(create_embed(card));
        }

        let sent = channel.send_message(&*self.http, builder).await?;
        debug!("Sent message {} to channel {channel}", sent.id);

        Ok(sent.id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        message: OutgoingMessage,
    ) -> Result<(), PlatformError> {
        let builder = EditMessage::new()
            .content(message.content.clone().unwrap_or_default())
            .embeds(message.card.iter().map(create_embed).collect())
            .components(create_components(message.controls));

        channel
            .edit_message(&*self.http, message_id, builder)
            .await?;

        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageSummary>, PlatformError> {
        let messages = channel
            .messages(&*self.http, GetMessages::new().limit(limit))
            .await?;

        Ok(messages
            .into_iter()
            .map(|message| MessageSummary {
                id: message.id,
                from_self: message.author.id == self.bot_id,
                title: message.embeds.first().and_then(|embed| embed.title.clone()),
            })
            .collect())
    }
}
