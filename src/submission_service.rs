use std::sync::Arc;

use poise::serenity_prelude::{GuildId, UserId};
use tracing::{error, info, warn};

use crate::{
    cards::pending_message,
    channels::{ChannelError, ChannelResolver},
    models::{ChannelKey, PendingRecord, SubmissionRecord},
    platform::{Platform, PlatformError},
    repository::{RepositoryError, SubmissionRepository},
};

#[derive(thiserror::Error, Debug)]
pub enum EnqueueError {
    #[error("this server has no #pending-submissions channel")]
    NoPendingChannel,
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("could not post the submission for review: {0}")]
    Platform(#[from] PlatformError),
    #[error("could not save the submission: {0}")]
    Repository(#[from] RepositoryError),
}

/// The best name to show for a member, falling back to the raw id.
pub async fn member_name(platform: &dyn Platform, guild: GuildId, user: UserId) -> String {
    match platform.display_name(guild, user).await {
        Ok(Some(name)) => name,
        Ok(None) => user.to_string(),
        Err(err) => {
            warn!("Could not resolve the name of {user}: {err}");
            user.to_string()
        }
    }
}

/// Hands finished submissions over to review.
#[derive(Clone)]
pub struct SubmissionService {
    submissions: SubmissionRepository,
    channels: ChannelResolver,
    platform: Arc<dyn Platform>,
}

impl SubmissionService {
    pub fn new(
        submissions: SubmissionRepository,
        channels: ChannelResolver,
        platform: Arc<dyn Platform>,
    ) -> SubmissionService {
        SubmissionService {
            submissions,
            channels,
            platform,
        }
    }

    /// Posts the review card to the pending channel and stores the record under the
    /// posted message.
    #[tracing::instrument(skip_all, fields(guild = %record.guild_id, submitter = %record.submitter_id))]
    pub async fn enqueue(&self, record: SubmissionRecord) -> Result<PendingRecord, EnqueueError> {
        let channel = self
            .channels
            .resolve(record.guild_id, ChannelKey::Pending)
            .await?
            .ok_or(EnqueueError::NoPendingChannel)?;

        let submitter = member_name(self.platform.as_ref(), record.guild_id, record.submitter_id).await;
        let message = self
            .platform
            .send_message(channel, pending_message(&record, &submitter))
            .await?;

        let pending = PendingRecord {
            record,
            pending_message_id: message,
            pending_channel_id: Some(channel),
        };

        if let Err(err) = self.submissions.add_pending(pending.clone()).await {
            error!("Review card {message} was posted but the record could not be saved: {err}");
            return Err(err.into());
        }

        info!("Submission queued for review as message {message}");
        Ok(pending)
    }
}
