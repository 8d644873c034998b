use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, MessageId, UserId};
use tracing::{info, warn};

use crate::{
    boards::BoardUpdate,
    cards::{approved_message, rejected_message},
    channels::ChannelResolver,
    leaderboard::{count_runs, Leaderboard},
    models::{types::UtcDateTime, ApprovedRecord, ChannelKey, PendingRecord},
    platform::Platform,
    repository::{RepositoryError, SubmissionRepository},
    role_sync::{RoleSyncOutcome, RoleSynchronizer},
    submission_service::member_name,
};

#[derive(thiserror::Error, Debug)]
pub enum ApprovalError {
    #[error("Could not find the pending record.")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What happened around an approval. Only moving the record is required to succeed,
/// the follow-up steps are reported here.
#[derive(Debug)]
pub struct ApprovalReport {
    pub approved: ApprovedRecord,
    pub card_updated: bool,
    pub announcement: Option<MessageId>,
    pub role_sync: Vec<(UserId, RoleSyncOutcome)>,
    pub role_sync_failures: usize,
    pub leaderboard: Option<BoardUpdate>,
}

#[derive(Debug)]
pub struct RejectionReport {
    pub rejected: PendingRecord,
    pub card_updated: bool,
}

#[derive(Clone)]
pub struct ApprovalService {
    submissions: SubmissionRepository,
    channels: ChannelResolver,
    platform: Arc<dyn Platform>,
    roles: RoleSynchronizer,
    leaderboard: Leaderboard,
}

impl ApprovalService {
    pub fn new(
        submissions: SubmissionRepository,
        channels: ChannelResolver,
        platform: Arc<dyn Platform>,
        roles: RoleSynchronizer,
        leaderboard: Leaderboard,
    ) -> ApprovalService {
        ApprovalService {
            submissions,
            channels,
            platform,
            roles,
            leaderboard,
        }
    }

    /// Approves the record shown in `message`, then updates the card, announces the
    /// run, syncs the roles of its players and refreshes the leaderboard.
    #[tracing::instrument(skip(self))]
    pub async fn approve(
        &self,
        channel: ChannelId,
        message: MessageId,
        approver: UserId,
    ) -> Result<ApprovalReport, ApprovalError> {
        let approved = self
            .submissions
            .approve_pending(message, approver, UtcDateTime::now())
            .await?
            .ok_or(ApprovalError::NotFound)?;
        let guild = approved.record.guild_id;
        info!("Approved a run of {} player(s)", approved.record.players.len());

        let submitter = member_name(self.platform.as_ref(), guild, approved.record.submitter_id).await;
        let card = approved_message(&approved, &submitter);

        let card_updated = match self.platform.edit_message(channel, message, card.clone()).await {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not finalize the review card: {err}");
                false
            }
        };

        let announcement = match self.channels.resolve(guild, ChannelKey::Records).await {
            Ok(Some(records)) => match self.platform.send_message(records, card).await {
                Ok(announcement) => Some(announcement),
                Err(err) => {
                    warn!("Could not announce the record: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("Could not find the records channel: {err}");
                None
            }
        };

        let counts = count_runs(&self.submissions.approved_in_guild(guild).await?);
        let mut role_sync = Vec::new();
        let mut role_sync_failures = 0;
        for player in &approved.record.players {
            let count = counts.get(player).copied().unwrap_or(0);
            match self.roles.sync_member(guild, *player, Some(count)).await {
                Ok(outcome) => role_sync.push((*player, outcome)),
                Err(err) => {
                    warn!("Could not sync the roles of {player}: {err}");
                    role_sync_failures += 1;
                }
            }
        }

        let leaderboard = match self.leaderboard.refresh(guild).await {
            Ok(update) => Some(update),
            Err(err) => {
                warn!("Could not refresh the leaderboard: {err}");
                None
            }
        };

        Ok(ApprovalReport {
            approved,
            card_updated,
            announcement,
            role_sync,
            role_sync_failures,
            leaderboard,
        })
    }

    /// Drops the record shown in `message` and turns the card into a rejection notice.
    #[tracing::instrument(skip(self))]
    pub async fn reject(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<RejectionReport, ApprovalError> {
        let rejected = self
            .submissions
            .take_pending(message)
            .await?
            .ok_or(ApprovalError::NotFound)?;
        info!("Rejected a run");

        let card_updated = match self
            .platform
            .edit_message(channel, message, rejected_message())
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not update the review card: {err}");
                false
            }
        };

        Ok(RejectionReport {
            rejected,
            card_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use poise::serenity_prelude::{ChannelId, GuildId, UserId};

    use crate::{
        boards::BoardUpdate,
        models::{Metric, RunMode, SubmissionRecord},
        platform::{fake::FakePlatform, Controls},
        repository::{MemoryStorage, StoreActor},
        role_sync::RoleSyncOutcome,
        services::Services,
    };

    use super::ApprovalError;

    const GUILD: GuildId = GuildId::new(1);
    const WARDEN: UserId = UserId::new(50);
    const U1: UserId = UserId::new(101);
    const U2: UserId = UserId::new(102);
    const U3: UserId = UserId::new(103);
    const U4: UserId = UserId::new(104);

    struct Bot {
        platform: Arc<FakePlatform>,
        services: Services,
        pending: ChannelId,
        records: ChannelId,
        leaderboard: ChannelId,
    }

    async fn bot() -> Bot {
        let platform = Arc::new(FakePlatform::new());
        platform.add_tier_roles(GUILD).await;
        for (user, name) in [(U1, "Una"), (U2, "Dos"), (U3, "tres"), (U4, "Cuatro")] {
            platform.add_member(GUILD, user, name).await;
        }
        let pending = platform.add_channel(GUILD, "pending-submissions").await;
        let records = platform.add_channel(GUILD, "world-records").await;
        let leaderboard = platform.add_channel(GUILD, "wr-leaderboard").await;

        let store = StoreActor::spawn(Arc::new(MemoryStorage::new()))
            .await
            .unwrap();

        Bot {
            services: Services::new(store, platform.clone()),
            platform,
            pending,
            records,
            leaderboard,
        }
    }

    fn record(players: &[UserId], metric: Metric, value: &str) -> SubmissionRecord {
        SubmissionRecord {
            guild_id: GUILD,
            submitter_id: players[0],
            mode: if players.len() == 1 {
                RunMode::Solo
            } else {
                RunMode::Team
            },
            size: players.len() as u8,
            players: players.to_vec(),
            metric,
            value: value.to_string(),
            notes: None,
        }
    }

    #[test_log::test(tokio::test)]
    async fn solo_run_from_submission_to_leaderboard() {
        let bot = bot().await;

        let pending = bot
            .services
            .intake
            .enqueue(record(&[U1], Metric::Time, "1:23.45"))
            .await
            .unwrap();

        let queued = bot.services.submissions.pending_in_guild(GUILD).await.unwrap();
        assert_eq!(queued, vec![pending.clone()]);
        let card = bot.platform.message(pending.pending_message_id).await.unwrap();
        assert_eq!(card.channel, bot.pending);
        assert_eq!(card.message.controls, Controls::ApprovalButtons);

        let report = bot
            .services
            .approvals
            .approve(bot.pending, pending.pending_message_id, WARDEN)
            .await
            .unwrap();

        assert!(bot.services.submissions.pending_in_guild(GUILD).await.unwrap().is_empty());
        let approved = bot.services.submissions.approved_in_guild(GUILD).await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].record.value, "1:23.45");
        assert_eq!(approved[0].approved_by, Some(WARDEN));

        assert!(report.card_updated);
        let card = bot.platform.message(pending.pending_message_id).await.unwrap();
        assert_eq!(card.message.card.unwrap().title, "Approved WR");
        assert_eq!(card.message.controls, Controls::None);
        assert_eq!(
            bot.platform.message(report.announcement.unwrap()).await.unwrap().channel,
            bot.records
        );

        assert_eq!(report.role_sync.len(), 1);
        assert_eq!(report.role_sync[0].0, U1);
        assert!(matches!(report.role_sync[0].1, RoleSyncOutcome::Updated { .. }));
        assert_eq!(bot.platform.role_names(GUILD, U1).await, vec!["WR Novice"]);

        assert!(matches!(report.leaderboard, Some(BoardUpdate::Posted(_))));
        let board = bot.platform.messages_in(bot.leaderboard).await;
        assert_eq!(
            board[0].message.card.as_ref().unwrap().description.as_deref(),
            Some("🥇 **Una** — 1 WRs · *WR Novice*")
        );
    }

    #[test_log::test(tokio::test)]
    async fn two_team_runs_make_a_challenger() {
        let bot = bot().await;

        for team in [[U1, U2], [U2, U3]] {
            let pending = bot
                .services
                .intake
                .enqueue(record(&team, Metric::Damage, "10,000"))
                .await
                .unwrap();
            bot.services
                .approvals
                .approve(bot.pending, pending.pending_message_id, WARDEN)
                .await
                .unwrap();
        }

        let standings = bot.services.leaderboard.standings(GUILD).await.unwrap();
        let dos = standings.iter().find(|standing| standing.user == U2).unwrap();
        assert_eq!(dos.count, 2);
        assert_eq!(dos.tier.map(|tier| tier.role_name()), Some("WR Challenger"));
        assert_eq!(standings[0].user, U2);
        assert_eq!(bot.platform.role_names(GUILD, U2).await, vec!["WR Challenger"]);
        assert_eq!(bot.platform.role_names(GUILD, U1).await, vec!["WR Novice"]);

        // One leaderboard message, edited on the second approval.
        assert_eq!(bot.platform.messages_in(bot.leaderboard).await.len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn reject_after_approve_is_not_found() {
        let bot = bot().await;
        let pending = bot
            .services
            .intake
            .enqueue(record(&[U4], Metric::Time, "9:99"))
            .await
            .unwrap();

        bot.services
            .approvals
            .approve(bot.pending, pending.pending_message_id, WARDEN)
            .await
            .unwrap();

        let err = bot
            .services
            .approvals
            .reject(bot.pending, pending.pending_message_id)
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::NotFound));
        assert_eq!(err.to_string(), "Could not find the pending record.");
        assert_eq!(bot.services.submissions.approved_in_guild(GUILD).await.unwrap().len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn reject_drops_the_record() {
        let bot = bot().await;
        let pending = bot
            .services
            .intake
            .enqueue(record(&[U1], Metric::Time, "0:30"))
            .await
            .unwrap();

        let report = bot
            .services
            .approvals
            .reject(bot.pending, pending.pending_message_id)
            .await
            .unwrap();

        assert_eq!(report.rejected, pending);
        assert!(report.card_updated);
        assert!(bot.services.submissions.pending_in_guild(GUILD).await.unwrap().is_empty());
        assert!(bot.services.submissions.approved_in_guild(GUILD).await.unwrap().is_empty());

        let card = bot.platform.message(pending.pending_message_id).await.unwrap();
        assert_eq!(card.message.content.as_deref(), Some("[WR BOT] ❌ Rejected."));
        assert_eq!(card.message.card, None);
        assert!(bot.platform.role_mutations().await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn enqueue_without_pending_channel_stores_nothing() {
        let platform = Arc::new(FakePlatform::new());
        let store = StoreActor::spawn(Arc::new(MemoryStorage::new()))
            .await
            .unwrap();
        let services = Services::new(store, platform.clone());

        assert!(services
            .intake
            .enqueue(record(&[U1], Metric::Time, "1:00"))
            .await
            .is_err());
        assert!(services.submissions.pending_in_guild(GUILD).await.unwrap().is_empty());
        assert!(platform.take_mutations().await.is_empty());
    }
}
