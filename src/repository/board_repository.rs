use poise::serenity_prelude::GuildId;

use crate::models::{BoardKind, BoardPin};

use super::{
    store_actor::{StoreMessage, StoreReply},
    RepositoryError, StoreHandle,
};

/// Remembers which message each board lives in.
#[derive(Clone)]
pub struct BoardRepository {
    store: StoreHandle,
}

impl BoardRepository {
    pub fn new(store: StoreHandle) -> BoardRepository {
        BoardRepository { store }
    }

    pub async fn pin(
        &self,
        guild: GuildId,
        board: BoardKind,
    ) -> Result<Option<BoardPin>, RepositoryError> {
        match self.store.send(StoreMessage::GetPin { guild, board }).await?? {
            StoreReply::Pin(pin) => Ok(pin),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }

    pub async fn set_pin(
        &self,
        guild: GuildId,
        board: BoardKind,
        pin: BoardPin,
    ) -> Result<(), RepositoryError> {
        self.expect_done(StoreMessage::SetPin { guild, board, pin })
            .await
    }

    pub async fn clear_pin(&self, guild: GuildId, board: BoardKind) -> Result<(), RepositoryError> {
        self.expect_done(StoreMessage::ClearPin { guild, board })
            .await
    }

    async fn expect_done(&self, message: StoreMessage) -> Result<(), RepositoryError> {
        match self.store.send(message).await?? {
            StoreReply::Done => Ok(()),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }
}
