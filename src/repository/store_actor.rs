use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::{
    actors::{Actor, ActorHandle},
    models::{
        types::UtcDateTime, ApprovedRecord, BoardKind, BoardPin, ChannelKey, PendingRecord,
    },
};

use super::{
    documents::{ConfigDocument, PinsDocument, SubmissionsDocument},
    storage::{Document, Storage},
    RepositoryError,
};

const MAILBOX_SIZE: usize = 64;

pub type StoreHandle = ActorHandle<StoreActor>;

/// Owns the persisted documents. Every read and write goes through this actor,
/// so concurrent flows can't overwrite each other's changes.
pub struct StoreActor {
    storage: Arc<dyn Storage>,
    config: ConfigDocument,
    submissions: SubmissionsDocument,
    pins: PinsDocument,
}

#[derive(Debug)]
pub enum StoreMessage {
    GetChannel {
        guild: GuildId,
        key: ChannelKey,
    },
    SetChannel {
        guild: GuildId,
        key: ChannelKey,
        channel: ChannelId,
    },
    ClearChannel {
        guild: GuildId,
        key: ChannelKey,
    },
    AddPending(PendingRecord),
    ListPending {
        guild: GuildId,
    },
    /// Removes the pending record shown in `message`.
    TakePending {
        message: MessageId,
    },
    /// Moves the pending record shown in `message` to the approved list.
    ApprovePending {
        message: MessageId,
        approver: UserId,
        at: UtcDateTime,
    },
    ListApproved {
        guild: GuildId,
    },
    GetPin {
        guild: GuildId,
        board: BoardKind,
    },
    SetPin {
        guild: GuildId,
        board: BoardKind,
        pin: BoardPin,
    },
    ClearPin {
        guild: GuildId,
        board: BoardKind,
    },
}

#[derive(Debug)]
pub enum StoreReply {
    Done,
    Channel(Option<ChannelId>),
    Pending(Option<PendingRecord>),
    PendingList(Vec<PendingRecord>),
    Approved(Option<ApprovedRecord>),
    ApprovedList(Vec<ApprovedRecord>),
    Pin(Option<BoardPin>),
}

impl StoreActor {
    pub async fn load(storage: Arc<dyn Storage>) -> Result<StoreActor, RepositoryError> {
        let config: ConfigDocument = read_document(storage.as_ref(), Document::Config).await?;
        let submissions: SubmissionsDocument =
            read_document(storage.as_ref(), Document::Submissions).await?;
        let pins: PinsDocument = read_document(storage.as_ref(), Document::Pins).await?;

        info!(
            "Loaded store: {} guild configs, {} pending, {} approved",
            config.guilds.len(),
            submissions.pending.len(),
            submissions.approved.len(),
        );

        Ok(StoreActor {
            storage,
            config,
            submissions,
            pins,
        })
    }

    pub async fn spawn(storage: Arc<dyn Storage>) -> Result<StoreHandle, RepositoryError> {
        let actor = StoreActor::load(storage).await?;
        Ok(ActorHandle::spawn(actor, MAILBOX_SIZE))
    }

    /// Applies `change` to a copy of the submissions and keeps it only once it's written.
    async fn update_submissions<T>(
        &mut self,
        change: impl FnOnce(&mut SubmissionsDocument) -> T,
    ) -> Result<T, RepositoryError> {
        let mut updated = self.submissions.clone();
        let result = change(&mut updated);
        write_document(self.storage.as_ref(), Document::Submissions, &updated).await?;
        self.submissions = updated;
        Ok(result)
    }

    async fn update_config(
        &mut self,
        change: impl FnOnce(&mut ConfigDocument),
    ) -> Result<(), RepositoryError> {
        let mut updated = self.config.clone();
        change(&mut updated);
        if updated == self.config {
            return Ok(());
        }
        write_document(self.storage.as_ref(), Document::Config, &updated).await?;
        self.config = updated;
        Ok(())
    }

    async fn update_pins(
        &mut self,
        change: impl FnOnce(&mut PinsDocument),
    ) -> Result<(), RepositoryError> {
        let mut updated = self.pins.clone();
        change(&mut updated);
        if updated == self.pins {
            return Ok(());
        }
        write_document(self.storage.as_ref(), Document::Pins, &updated).await?;
        self.pins = updated;
        Ok(())
    }
}

#[async_trait]
impl Actor for StoreActor {
    type Message = StoreMessage;
    type Response = Result<StoreReply, RepositoryError>;

    async fn handle_message(&mut self, message: StoreMessage) -> Self::Response {
        use StoreMessage::*;

        debug!("Handling {message:?}");

        match message {
            GetChannel { guild, key } => Ok(StoreReply::Channel(self.config.channel_id(guild, key))),

            SetChannel {
                guild,
                key,
                channel,
            } => {
                self.update_config(|config| config.set_channel_id(guild, key, channel))
                    .await?;
                Ok(StoreReply::Done)
            }

            ClearChannel { guild, key } => {
                self.update_config(|config| config.clear_channel_id(guild, key))
                    .await?;
                Ok(StoreReply::Done)
            }

            AddPending(record) => {
                self.update_submissions(|submissions| {
                    submissions
                        .pending
                        .retain(|pending| pending.pending_message_id != record.pending_message_id);
                    submissions.pending.push(record);
                })
                .await?;
                Ok(StoreReply::Done)
            }

            ListPending { guild } => Ok(StoreReply::PendingList(
                self.submissions
                    .pending
                    .iter()
                    .filter(|pending| pending.record.guild_id == guild)
                    .cloned()
                    .collect(),
            )),

            TakePending { message } => {
                if !self.has_pending(message) {
                    return Ok(StoreReply::Pending(None));
                }

                let taken = self
                    .update_submissions(|submissions| take_pending(submissions, message))
                    .await?;
                Ok(StoreReply::Pending(taken))
            }

            ApprovePending {
                message,
                approver,
                at,
            } => {
                if !self.has_pending(message) {
                    return Ok(StoreReply::Approved(None));
                }

                let approved = self
                    .update_submissions(|submissions| {
                        let pending = take_pending(submissions, message)?;
                        let approved = ApprovedRecord::from_pending(pending, approver, at);
                        submissions.approved.push(approved.clone());
                        Some(approved)
                    })
                    .await?;
                Ok(StoreReply::Approved(approved))
            }

            ListApproved { guild } => Ok(StoreReply::ApprovedList(
                self.submissions
                    .approved
                    .iter()
                    .filter(|approved| approved.record.guild_id == guild)
                    .cloned()
                    .collect(),
            )),

            GetPin { guild, board } => Ok(StoreReply::Pin(self.pins.pin(guild, board))),

            SetPin { guild, board, pin } => {
                self.update_pins(|pins| pins.set_pin(guild, board, pin))
                    .await?;
                Ok(StoreReply::Done)
            }

            ClearPin { guild, board } => {
                self.update_pins(|pins| pins.clear_pin(guild, board)).await?;
                Ok(StoreReply::Done)
            }
        }
    }
}

impl StoreActor {
    fn has_pending(&self, message: MessageId) -> bool {
        self.submissions
            .pending
            .iter()
            .any(|pending| pending.pending_message_id == message)
    }
}

fn take_pending(submissions: &mut SubmissionsDocument, message: MessageId) -> Option<PendingRecord> {
    let index = submissions
        .pending
        .iter()
        .position(|pending| pending.pending_message_id == message)?;
    Some(submissions.pending.remove(index))
}

async fn read_document<T: DeserializeOwned + Default>(
    storage: &dyn Storage,
    document: Document,
) -> Result<T, RepositoryError> {
    match storage.read(document).await? {
        Some(contents) if !contents.trim().is_empty() => serde_json::from_str(&contents)
            .map_err(|source| RepositoryError::Json { document, source }),
        _ => Ok(T::default()),
    }
}

async fn write_document<T: Serialize>(
    storage: &dyn Storage,
    document: Document,
    value: &T,
) -> Result<(), RepositoryError> {
    let contents = serde_json::to_string_pretty(value)
        .map_err(|source| RepositoryError::Json { document, source })?;
    storage.write(document, contents).await
}
