use poise::serenity_prelude::{GuildId, MessageId, UserId};

use crate::models::{types::UtcDateTime, ApprovedRecord, PendingRecord};

use super::{
    store_actor::{StoreMessage, StoreReply},
    RepositoryError, StoreHandle,
};

/// The review lifecycle of submitted runs: pending, then approved or dropped.
#[derive(Clone)]
pub struct SubmissionRepository {
    store: StoreHandle,
}

impl SubmissionRepository {
    pub fn new(store: StoreHandle) -> SubmissionRepository {
        SubmissionRepository { store }
    }

    /// Stores a record for review. A record already keyed by the same pending
    /// message is replaced.
    pub async fn add_pending(&self, record: PendingRecord) -> Result<(), RepositoryError> {
        match self.store.send(StoreMessage::AddPending(record)).await?? {
            StoreReply::Done => Ok(()),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }

    pub async fn pending_in_guild(
        &self,
        guild: GuildId,
    ) -> Result<Vec<PendingRecord>, RepositoryError> {
        match self.store.send(StoreMessage::ListPending { guild }).await?? {
            StoreReply::PendingList(pending) => Ok(pending),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }

    /// Removes and returns the pending record shown in `message`, if there is one.
    pub async fn take_pending(
        &self,
        message: MessageId,
    ) -> Result<Option<PendingRecord>, RepositoryError> {
        match self.store.send(StoreMessage::TakePending { message }).await?? {
            StoreReply::Pending(pending) => Ok(pending),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }

    /// Moves the pending record shown in `message` to the approved list.
    ///
    /// Returns `None` if nothing is pending under that message, e.g. because another
    /// reviewer got there first.
    pub async fn approve_pending(
        &self,
        message: MessageId,
        approver: UserId,
        at: UtcDateTime,
    ) -> Result<Option<ApprovedRecord>, RepositoryError> {
        match self
            .store
            .send(StoreMessage::ApprovePending {
                message,
                approver,
                at,
            })
            .await??
        {
            StoreReply::Approved(approved) => Ok(approved),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }

    pub async fn approved_in_guild(
        &self,
        guild: GuildId,
    ) -> Result<Vec<ApprovedRecord>, RepositoryError> {
        match self.store.send(StoreMessage::ListApproved { guild }).await?? {
            StoreReply::ApprovedList(approved) => Ok(approved),
            _ => Err(RepositoryError::UnexpectedReply),
        }
    }
}
