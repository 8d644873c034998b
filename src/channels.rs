use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, GuildId};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::{
    models::ChannelKey,
    platform::{Platform, PlatformError},
    repository::{ConfigRepository, RepositoryError},
};

#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Finds the canonical channels of a guild and caches their ids in the config.
#[derive(Clone)]
pub struct ChannelResolver {
    config: ConfigRepository,
    platform: Arc<dyn Platform>,
}

impl ChannelResolver {
    pub fn new(config: ConfigRepository, platform: Arc<dyn Platform>) -> ChannelResolver {
        ChannelResolver { config, platform }
    }

    /// The id of the channel with the canonical name, `None` if the guild has none.
    ///
    /// Channels are looked up by name on every call, so a recreated channel is picked
    /// up right away. The cached id is only used while the lookup fails.
    pub async fn resolve(
        &self,
        guild: GuildId,
        key: ChannelKey,
    ) -> Result<Option<ChannelId>, ChannelError> {
        match self.lookup(guild, key).await {
            Err(ChannelError::Platform(err)) => {
                let Some(cached) = self.config.channel(guild, key).await? else {
                    return Err(err.into());
                };

                warn!(
                    "Could not look up #{}, using the cached id {cached}: {err}",
                    key.canonical_name()
                );
                Ok(Some(cached))
            }
            result => result,
        }
    }

    /// Looks the channel up by name and updates the cached id. A channel that is
    /// gone is dropped from the cache.
    pub async fn lookup(
        &self,
        guild: GuildId,
        key: ChannelKey,
    ) -> Result<Option<ChannelId>, ChannelError> {
        let Some(channel) = self
            .platform
            .find_text_channel(guild, key.canonical_name())
            .await?
        else {
            debug!("Guild {guild} has no #{} channel", key.canonical_name());
            self.config.clear_channel(guild, key).await?;
            return Ok(None);
        };

        self.config.set_channel(guild, key, channel).await?;
        Ok(Some(channel))
    }

    /// Refreshes the cached ids of every canonical channel and forgets the missing ones.
    #[tracing::instrument(skip(self))]
    pub async fn capture_all(&self, guild: GuildId) -> Result<usize, ChannelError> {
        let mut found = 0;
        for key in ChannelKey::iter() {
            if self.lookup(guild, key).await?.is_some() {
                found += 1;
            }
        }

        info!("Captured {found} canonical channels");
        Ok(found)
    }
}
