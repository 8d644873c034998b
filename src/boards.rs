use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, GuildId, MessageId};
use tracing::{debug, info, warn};

use crate::{
    channels::{ChannelError, ChannelResolver},
    models::{BoardKind, BoardPin},
    platform::{OutgoingMessage, Platform, PlatformError},
    repository::{BoardRepository, RepositoryError},
};

/// How many of the newest channel messages are searched for a board to adopt.
const ADOPTION_SCAN_LIMIT: u8 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardUpdate {
    /// The pinned message was edited in place.
    Edited(MessageId),
    /// No pin existed, an older board message of the bot was found and edited.
    Adopted(MessageId),
    Posted(MessageId),
    /// The guild has no channel for this board.
    NoChannel,
}

#[derive(thiserror::Error, Debug)]
pub enum BoardError {
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("could not update the board: {0}")]
    Platform(#[from] PlatformError),
}

/// Keeps a single live message per board and guild.
#[derive(Clone)]
pub struct BoardPublisher {
    boards: BoardRepository,
    channels: ChannelResolver,
    platform: Arc<dyn Platform>,
}

impl BoardPublisher {
    pub fn new(
        boards: BoardRepository,
        channels: ChannelResolver,
        platform: Arc<dyn Platform>,
    ) -> BoardPublisher {
        BoardPublisher {
            boards,
            channels,
            platform,
        }
    }

    /// Posts the board, or updates it if it's already there.
    #[tracing::instrument(skip(self, message))]
    pub async fn publish(
        &self,
        guild: GuildId,
        board: BoardKind,
        message: OutgoingMessage,
    ) -> Result<BoardUpdate, BoardError> {
        let Some(channel) = self.channels.resolve(guild, board.channel()).await? else {
            warn!(
                "No #{} channel, skipping the board",
                board.channel().canonical_name()
            );
            return Ok(BoardUpdate::NoChannel);
        };

        if let Some(pin) = self.boards.pin(guild, board).await? {
            if pin.channel_id == channel {
                match self
                    .platform
                    .edit_message(channel, pin.message_id, message.clone())
                    .await
                {
                    Ok(()) => {
                        debug!("Edited pinned board message {}", pin.message_id);
                        return Ok(BoardUpdate::Edited(pin.message_id));
                    }
                    Err(PlatformError::NotFound(_)) => {
                        info!("Pinned board message {} is gone", pin.message_id);
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            self.boards.clear_pin(guild, board).await?;
        }

        if let Some(existing) = self.find_own_board(channel, board).await? {
            self.platform
                .edit_message(channel, existing, message)
                .await?;
            self.save_pin(guild, board, channel, existing).await?;
            info!("Adopted board message {existing}");
            return Ok(BoardUpdate::Adopted(existing));
        }

        let posted = self.platform.send_message(channel, message).await?;
        self.save_pin(guild, board, channel, posted).await?;
        info!("Posted board message {posted}");
        Ok(BoardUpdate::Posted(posted))
    }

    async fn find_own_board(
        &self,
        channel: ChannelId,
        board: BoardKind,
    ) -> Result<Option<MessageId>, PlatformError> {
        let recent = self
            .platform
            .recent_messages(channel, ADOPTION_SCAN_LIMIT)
            .await?;

        Ok(recent
            .into_iter()
            .find(|message| message.from_self && message.title.as_deref() == Some(board.marker()))
            .map(|message| message.id))
    }

    async fn save_pin(
        &self,
        guild: GuildId,
        board: BoardKind,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), RepositoryError> {
        self.boards
            .set_pin(
                guild,
                board,
                BoardPin {
                    channel_id,
                    message_id,
                },
            )
            .await
    }
}
