use std::sync::Arc;

use poise::serenity_prelude::GuildId;
use tracing::{info, warn};

use crate::{
    approval_service::ApprovalService,
    boards::{BoardError, BoardPublisher, BoardUpdate},
    cards::{help_message, submission_box_message},
    channels::ChannelResolver,
    leaderboard::Leaderboard,
    models::BoardKind,
    platform::Platform,
    repository::{BoardRepository, ConfigRepository, StoreHandle, SubmissionRepository},
    role_sync::RoleSynchronizer,
    submission_service::SubmissionService,
};

/// Every service, wired to one store and one platform.
#[derive(Clone)]
pub struct Services {
    pub platform: Arc<dyn Platform>,
    pub submissions: SubmissionRepository,
    pub channels: ChannelResolver,
    pub boards: BoardPublisher,
    pub leaderboard: Leaderboard,
    pub roles: RoleSynchronizer,
    pub intake: SubmissionService,
    pub approvals: ApprovalService,
}

impl Services {
    pub fn new(store: StoreHandle, platform: Arc<dyn Platform>) -> Services {
        let submissions = SubmissionRepository::new(store.clone());
        let channels = ChannelResolver::new(ConfigRepository::new(store.clone()), platform.clone());
        let boards = BoardPublisher::new(
            BoardRepository::new(store),
            channels.clone(),
            platform.clone(),
        );
        let leaderboard = Leaderboard::new(submissions.clone(), platform.clone(), boards.clone());
        let roles = RoleSynchronizer::new(submissions.clone(), platform.clone());
        let intake = SubmissionService::new(submissions.clone(), channels.clone(), platform.clone());
        let approvals = ApprovalService::new(
            submissions.clone(),
            channels.clone(),
            platform.clone(),
            roles.clone(),
            leaderboard.clone(),
        );

        Services {
            platform,
            submissions,
            channels,
            boards,
            leaderboard,
            roles,
            intake,
            approvals,
        }
    }

    pub async fn publish_help(
        &self,
        guild: GuildId,
        approval_role: &str,
    ) -> Result<BoardUpdate, BoardError> {
        self.boards
            .publish(guild, BoardKind::Help, help_message(approval_role))
            .await
    }

    pub async fn publish_submission_box(&self, guild: GuildId) -> Result<BoardUpdate, BoardError> {
        self.boards
            .publish(guild, BoardKind::SubmissionBox, submission_box_message())
            .await
    }

    /// Publishes every board. A failing board doesn't stop the others.
    #[tracing::instrument(skip(self))]
    pub async fn publish_all_boards(&self, guild: GuildId, approval_role: &str) {
        let results = [
            (BoardKind::Help, self.publish_help(guild, approval_role).await),
            (BoardKind::SubmissionBox, self.publish_submission_box(guild).await),
            (BoardKind::Leaderboard, self.leaderboard.refresh(guild).await),
        ];

        for (board, result) in results {
            match result {
                Ok(update) => info!("{}: {update:?}", board.marker()),
                Err(err) => warn!("Could not publish {}: {err}", board.marker()),
            }
        }
    }
}
