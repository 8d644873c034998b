use poise::serenity_prelude::{ChannelId, GuildId};

use crate::models::ChannelKey;

use super::{
    store_actor::{StoreMessage, StoreReply},
    RepositoryError, StoreHandle,
};

/// Per-guild channel ids.
#[derive(Clone)]
pub struct ConfigRepository {
    store: StoreHandle,
}

impl ConfigRepository {
    pub fn new(store: StoreHandle) -> ConfigRepository {
        ConfigRepository { store }
    }

    pub async fn channel(
        &self,
        guild: GuildId,
        key: ChannelKey,
    ) -> Result<Option<ChannelId>, RepositoryError> {
        match self.store.send(StoreMessage::GetChannel { guild, key }).await?? {
            StoreReply::Channel(channel) => Ok(channel),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }

    pub async fn set_channel(
        &self,
        guild: GuildId,
        key: ChannelKey,
        channel: ChannelId,
    ) -> Result<(), RepositoryError> {
        match self
            .store
            .send(StoreMessage::SetChannel {
                guild,
                key,
                channel,
            })
            .await??
        {
            StoreReply::Done => Ok(()),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }

    /// Forgets the cached id, e.g. because the channel was deleted.
    pub async fn clear_channel(&self, guild: GuildId, key: ChannelKey) -> Result<(), RepositoryError> {
        match self.store.send(StoreMessage::ClearChannel { guild, key }).await?? {
            StoreReply::Done => Ok(()),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }
}
