use std::{collections::HashMap, sync::Arc};

use poise::serenity_prelude::{GuildId, RoleId, UserId};
use tracing::{info, warn};

use crate::{
    leaderboard::count_runs,
    platform::{Platform, PlatformError},
    repository::{RepositoryError, SubmissionRepository},
    tiers::{tier_for, Tier},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoleSyncOutcome {
    /// The member already held exactly the right tier role.
    Unchanged,
    Updated {
        removed: Vec<RoleId>,
        added: Option<RoleId>,
    },
    /// The user isn't in the guild, nothing to do.
    NotMember,
}

#[derive(thiserror::Error, Debug)]
pub enum RoleSyncError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("the guild has no \"{0}\" role")]
    MissingRole(&'static str),
    /// The old tier roles were removed but the new one could not be added.
    #[error("removed the old tier roles but could not add the new one: {source}")]
    Partial {
        removed: Vec<RoleId>,
        #[source]
        source: PlatformError,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncAllReport {
    pub updated: usize,
    pub unchanged: usize,
    pub not_members: usize,
    pub failed: usize,
}

/// Keeps each player's tier role in line with their approved run count.
#[derive(Clone)]
pub struct RoleSynchronizer {
    submissions: SubmissionRepository,
    platform: Arc<dyn Platform>,
}

impl RoleSynchronizer {
    pub fn new(submissions: SubmissionRepository, platform: Arc<dyn Platform>) -> RoleSynchronizer {
        RoleSynchronizer {
            submissions,
            platform,
        }
    }

    async fn tier_roles(&self, guild: GuildId) -> Result<HashMap<String, RoleId>, PlatformError> {
        Ok(self
            .platform
            .guild_roles(guild)
            .await?
            .into_iter()
            .filter(|role| Tier::is_tier_role(&role.name))
            .map(|role| (role.name, role.id))
            .collect())
    }

    /// Makes the member hold exactly the tier role for `count` and no other tier role.
    ///
    /// The count is computed from the approved runs if not given. Non-tier roles are
    /// never touched.
    #[tracing::instrument(skip(self))]
    pub async fn sync_member(
        &self,
        guild: GuildId,
        user: UserId,
        count: Option<u32>,
    ) -> Result<RoleSyncOutcome, RoleSyncError> {
        let count = match count {
            Some(count) => count,
            None => {
                let approved = self.submissions.approved_in_guild(guild).await?;
                count_runs(&approved).get(&user).copied().unwrap_or(0)
            }
        };

        let tier_roles = self.tier_roles(guild).await?;
        self.apply(guild, user, count, &tier_roles).await
    }

    async fn apply(
        &self,
        guild: GuildId,
        user: UserId,
        count: u32,
        tier_roles: &HashMap<String, RoleId>,
    ) -> Result<RoleSyncOutcome, RoleSyncError> {
        let Some(member_roles) = self.platform.member_roles(guild, user).await? else {
            return Ok(RoleSyncOutcome::NotMember);
        };

        let target = match tier_for(count) {
            Some(tier) => Some(
                *tier_roles
                    .get(tier.role_name())
                    .ok_or(RoleSyncError::MissingRole(tier.role_name()))?,
            ),
            None => None,
        };

        let current: Vec<RoleId> = member_roles
            .into_iter()
            .filter(|role| tier_roles.values().any(|tier_role| tier_role == role))
            .collect();

        let in_sync = match target {
            Some(target) => current == [target],
            None => current.is_empty(),
        };
        if in_sync {
            return Ok(RoleSyncOutcome::Unchanged);
        }

        if !current.is_empty() {
            self.platform
                .remove_member_roles(guild, user, &current)
                .await?;
        }

        if let Some(target) = target {
            if let Err(source) = self.platform.add_member_role(guild, user, target).await {
                return Err(RoleSyncError::Partial {
                    removed: current,
                    source,
                });
            }
        }

        info!("Updated tier roles for {count} runs");
        Ok(RoleSyncOutcome::Updated {
            removed: current,
            added: target,
        })
    }

    /// Syncs every player that appears in the guild's approved runs.
    ///
    /// A failure for one player doesn't stop the others.
    #[tracing::instrument(skip(self))]
    pub async fn sync_all(&self, guild: GuildId) -> Result<SyncAllReport, RoleSyncError> {
        let approved = self.submissions.approved_in_guild(guild).await?;
        let mut counts: Vec<(UserId, u32)> = count_runs(&approved).into_iter().collect();
        counts.sort();

        let tier_roles = self.tier_roles(guild).await?;
        let mut report = SyncAllReport::default();

        for (user, count) in counts {
            match self.apply(guild, user, count, &tier_roles).await {
                Ok(RoleSyncOutcome::Unchanged) => report.unchanged += 1,
                Ok(RoleSyncOutcome::Updated { .. }) => report.updated += 1,
                Ok(RoleSyncOutcome::NotMember) => report.not_members += 1,
                Err(err) => {
                    warn!("Could not sync the roles of {user}: {err}");
                    report.failed += 1;
                }
            }
        }

        info!("Role sync finished: {report:?}");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{atomic::Ordering, Arc};

    use poise::serenity_prelude::{GuildId, MessageId, UserId};

    use crate::{
        models::{types::UtcDateTime, Metric, PendingRecord, RunMode, SubmissionRecord},
        platform::fake::{FakePlatform, Mutation},
        repository::{MemoryStorage, StoreActor, SubmissionRepository},
    };

    use super::{RoleSyncError, RoleSyncOutcome, RoleSynchronizer, SyncAllReport};

    const GUILD: GuildId = GuildId::new(1);
    const ALICE: UserId = UserId::new(2);

    async fn setup() -> (Arc<FakePlatform>, RoleSynchronizer, SubmissionRepository) {
        let platform = Arc::new(FakePlatform::new());
        platform.add_tier_roles(GUILD).await;
        platform.add_member(GUILD, ALICE, "Alice").await;

        let store = StoreActor::spawn(Arc::new(MemoryStorage::new()))
            .await
            .unwrap();
        let submissions = SubmissionRepository::new(store);

        (
            platform.clone(),
            RoleSynchronizer::new(submissions.clone(), platform),
            submissions,
        )
    }

    async fn approve_solo(submissions: &SubmissionRepository, player: UserId, message: u64) {
        submissions
            .add_pending(PendingRecord {
                record: SubmissionRecord {
                    guild_id: GUILD,
                    submitter_id: player,
                    mode: RunMode::Solo,
                    size: 1,
                    players: vec![player],
                    metric: Metric::Damage,
                    value: "100".to_string(),
                    notes: None,
                },
                pending_message_id: MessageId::new(message),
                pending_channel_id: None,
            })
            .await
            .unwrap();
        submissions
            .approve_pending(MessageId::new(message), UserId::new(99), UtcDateTime::now())
            .await
            .unwrap()
            .unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn second_sync_changes_nothing() {
        let (platform, sync, _) = setup().await;

        let first = sync.sync_member(GUILD, ALICE, Some(2)).await.unwrap();
        assert!(matches!(first, RoleSyncOutcome::Updated { .. }));
        let mutations = platform.role_mutations().await.len();

        let second = sync.sync_member(GUILD, ALICE, Some(2)).await.unwrap();

        assert_eq!(second, RoleSyncOutcome::Unchanged);
        assert_eq!(platform.role_mutations().await.len(), mutations);
        assert_eq!(platform.role_names(GUILD, ALICE).await, vec!["WR Challenger"]);
    }

    #[test_log::test(tokio::test)]
    async fn promotion_replaces_the_old_tier_and_keeps_other_roles() {
        let (platform, sync, _) = setup().await;
        let member_role = platform.role_id(GUILD, "Member").await;
        let novice = platform.role_id(GUILD, "WR Novice").await;
        let pro = platform.role_id(GUILD, "WR Pro").await;
        platform.give_role(GUILD, ALICE, member_role).await;
        platform.give_role(GUILD, ALICE, novice).await;

        let outcome = sync.sync_member(GUILD, ALICE, Some(3)).await.unwrap();

        assert_eq!(
            outcome,
            RoleSyncOutcome::Updated {
                removed: vec![novice],
                added: Some(pro),
            }
        );
        assert_eq!(
            platform.role_mutations().await,
            vec![
                Mutation::RemoveRoles {
                    user: ALICE,
                    roles: vec![novice]
                },
                Mutation::AddRole {
                    user: ALICE,
                    role: pro
                },
            ]
        );
        assert_eq!(platform.role_names(GUILD, ALICE).await, vec!["Member", "WR Pro"]);
    }

    #[test_log::test(tokio::test)]
    async fn zero_runs_clears_every_tier_role() {
        let (platform, sync, _) = setup().await;
        let novice = platform.role_id(GUILD, "WR Novice").await;
        let elite = platform.role_id(GUILD, "WR Elite").await;
        platform.give_role(GUILD, ALICE, novice).await;
        platform.give_role(GUILD, ALICE, elite).await;

        let outcome = sync.sync_member(GUILD, ALICE, Some(0)).await.unwrap();

        assert_eq!(
            outcome,
            RoleSyncOutcome::Updated {
                removed: vec![novice, elite],
                added: None,
            }
        );
        assert!(platform.role_names(GUILD, ALICE).await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn members_outside_the_guild_are_skipped() {
        let (platform, sync, _) = setup().await;

        let outcome = sync
            .sync_member(GUILD, UserId::new(404), Some(1))
            .await
            .unwrap();

        assert_eq!(outcome, RoleSyncOutcome::NotMember);
        assert!(platform.role_mutations().await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn failed_add_is_partial() {
        let (platform, sync, _) = setup().await;
        let novice = platform.role_id(GUILD, "WR Novice").await;
        platform.give_role(GUILD, ALICE, novice).await;
        platform.deny_role_adds.store(true, Ordering::Relaxed);

        let err = sync.sync_member(GUILD, ALICE, Some(2)).await.unwrap_err();

        assert!(matches!(err, RoleSyncError::Partial { ref removed, .. } if removed == &vec![novice]));
        assert!(platform.role_names(GUILD, ALICE).await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn count_is_computed_when_not_given() {
        let (platform, sync, submissions) = setup().await;
        approve_solo(&submissions, ALICE, 100).await;

        sync.sync_member(GUILD, ALICE, None).await.unwrap();

        assert_eq!(platform.role_names(GUILD, ALICE).await, vec!["WR Novice"]);
    }

    #[test_log::test(tokio::test)]
    async fn sync_all_covers_every_recorded_player() {
        let (platform, sync, submissions) = setup().await;
        approve_solo(&submissions, ALICE, 100).await;
        approve_solo(&submissions, ALICE, 101).await;
        approve_solo(&submissions, UserId::new(404), 102).await;

        let report = sync.sync_all(GUILD).await.unwrap();

        assert_eq!(
            report,
            SyncAllReport {
                updated: 1,
                unchanged: 0,
                not_members: 1,
                failed: 0,
            }
        );
        assert_eq!(platform.role_names(GUILD, ALICE).await, vec!["WR Challenger"]);
    }
}
