use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, RoleId, UserId};
use strum::IntoEnumIterator;
use tokio::sync::Mutex;

use crate::tiers::Tier;

use super::{Card, GuildRole, MessageSummary, OutgoingMessage, Platform, PlatformError};

#[derive(Clone, Debug)]
pub struct FakeMember {
    pub display_name: String,
    pub roles: Vec<RoleId>,
}

#[derive(Clone, Debug)]
pub struct FakeMessage {
    pub id: MessageId,
    pub channel: ChannelId,
    pub message: OutgoingMessage,
    pub from_self: bool,
}

/// A platform mutation, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    AddRole {
        user: UserId,
        role: RoleId,
    },
    RemoveRoles {
        user: UserId,
        roles: Vec<RoleId>,
    },
    Send {
        channel: ChannelId,
        message: MessageId,
    },
    Edit {
        channel: ChannelId,
        message: MessageId,
    },
}

/// In-memory guilds. Records every mutation for assertions.
pub struct FakePlatform {
    pub roles: Mutex<HashMap<GuildId, Vec<GuildRole>>>,
    pub members: Mutex<HashMap<(GuildId, UserId), FakeMember>>,
    pub channels: Mutex<HashMap<(GuildId, String), ChannelId>>,
    pub messages: Mutex<Vec<FakeMessage>>,
    pub mutations: Mutex<Vec<Mutation>>,
    pub deny_role_adds: AtomicBool,
    pub fail_channel_lookups: AtomicBool,
    next_id: AtomicU64,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            roles: Mutex::new(HashMap::new()),
            members: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
            messages: Mutex::new(Vec::new()),
            mutations: Mutex::new(Vec::new()),
            deny_role_adds: AtomicBool::new(false),
            fail_channel_lookups: AtomicBool::new(false),
            next_id: AtomicU64::new(10_000),
        }
    }
}

impl FakePlatform {
    pub fn new() -> FakePlatform {
        FakePlatform::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Creates the tier roles plus an unrelated role named `Member`.
    pub async fn add_tier_roles(&self, guild: GuildId) {
        let mut roles: Vec<GuildRole> = Tier::iter()
            .map(|tier| GuildRole {
                id: RoleId::new(self.next_id()),
                name: tier.role_name().to_string(),
            })
            .collect();
        roles.push(GuildRole {
            id: RoleId::new(self.next_id()),
            name: "Member".to_string(),
        });

        self.roles.lock().await.entry(guild).or_default().extend(roles);
    }

    pub async fn role_id(&self, guild: GuildId, name: &str) -> RoleId {
        self.roles.lock().await[&guild]
            .iter()
            .find(|role| role.name == name)
            .map(|role| role.id)
            .unwrap()
    }

    pub async fn add_member(&self, guild: GuildId, user: UserId, display_name: &str) {
        self.members.lock().await.insert(
            (guild, user),
            FakeMember {
                display_name: display_name.to_string(),
                roles: Vec::new(),
            },
        );
    }

    pub async fn give_role(&self, guild: GuildId, user: UserId, role: RoleId) {
        if let Some(member) = self.members.lock().await.get_mut(&(guild, user)) {
            member.roles.push(role);
        }
    }

    /// Names of the roles the member holds, sorted.
    pub async fn role_names(&self, guild: GuildId, user: UserId) -> Vec<String> {
        let roles = self.roles.lock().await;
        let members = self.members.lock().await;

        let mut names: Vec<String> = members[&(guild, user)]
            .roles
            .iter()
            .filter_map(|id| {
                roles
                    .get(&guild)?
                    .iter()
                    .find(|role| role.id == *id)
                    .map(|role| role.name.clone())
            })
            .collect();
        names.sort();
        names
    }

    pub async fn add_channel(&self, guild: GuildId, name: &str) -> ChannelId {
        let id = ChannelId::new(self.next_id());
        self.channels.lock().await.insert((guild, name.to_string()), id);
        id
    }

    pub async fn remove_channel(&self, guild: GuildId, name: &str) {
        self.channels.lock().await.remove(&(guild, name.to_string()));
    }

    /// Puts a message in the channel history without recording a mutation.
    pub async fn seed_message(&self, channel: ChannelId, card: Card, from_self: bool) -> MessageId {
        let id = MessageId::new(self.next_id());
        self.messages.lock().await.push(FakeMessage {
            id,
            channel,
            message: OutgoingMessage::card(card, super::Controls::None),
            from_self,
        });
        id
    }

    pub async fn delete_message(&self, id: MessageId) {
        self.messages.lock().await.retain(|message| message.id != id);
    }

    pub async fn message(&self, id: MessageId) -> Option<FakeMessage> {
        self.messages
            .lock()
            .await
            .iter()
            .find(|message| message.id == id)
            .cloned()
    }

    pub async fn messages_in(&self, channel: ChannelId) -> Vec<FakeMessage> {
        self.messages
            .lock()
            .await
            .iter()
            .filter(|message| message.channel == channel)
            .cloned()
            .collect()
    }

    pub async fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut *self.mutations.lock().await)
    }

    pub async fn role_mutations(&self) -> Vec<Mutation> {
        self.mutations
            .lock()
            .await
            .iter()
            .filter(|mutation| {
                matches!(mutation, Mutation::AddRole { .. } | Mutation::RemoveRoles { .. })
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn guild_roles(&self, guild: GuildId) -> Result<Vec<GuildRole>, PlatformError> {
        Ok(self.roles.lock().await.get(&guild).cloned().unwrap_or_default())
    }

    async fn member_roles(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<Vec<RoleId>>, PlatformError> {
        Ok(self
            .members
            .lock()
            .await
            .get(&(guild, user))
            .map(|member| member.roles.clone()))
    }

    async fn add_member_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        if self.deny_role_adds.load(Ordering::Relaxed) {
            return Err(PlatformError::PermissionDenied("Manage Roles".to_string()));
        }

        let mut members = self.members.lock().await;
        let member = members
            .get_mut(&(guild, user))
            .ok_or_else(|| PlatformError::NotFound(format!("member {user}")))?;
        if !member.roles.contains(&role) {
            member.roles.push(role);
        }

        self.mutations
            .lock()
            .await
            .push(Mutation::AddRole { user, role });
        Ok(())
    }

    async fn remove_member_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
    ) -> Result<(), PlatformError> {
        let mut members = self.members.lock().await;
        let member = members
            .get_mut(&(guild, user))
            .ok_or_else(|| PlatformError::NotFound(format!("member {user}")))?;
        member.roles.retain(|role| !roles.contains(role));

        self.mutations.lock().await.push(Mutation::RemoveRoles {
            user,
            roles: roles.to_vec(),
        });
        Ok(())
    }

    async fn display_name(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<String>, PlatformError> {
        Ok(self
            .members
            .lock()
            .await
            .get(&(guild, user))
            .map(|member| member.display_name.clone()))
    }

    async fn find_text_channel(
        &self,
        guild: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, PlatformError> {
        if self.fail_channel_lookups.load(Ordering::Relaxed) {
            return Err(PlatformError::Other("gateway unavailable".to_string()));
        }

        Ok(self
            .channels
            .lock()
            .await
            .get(&(guild, name.to_string()))
            .copied())
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageId, PlatformError> {
        let id = MessageId::new(self.next_id());

        self.messages.lock().await.push(FakeMessage {
            id,
            channel,
            message,
            from_self: true,
        });
        self.mutations.lock().await.push(Mutation::Send {
            channel,
            message: id,
        });

        Ok(id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        message: OutgoingMessage,
    ) -> Result<(), PlatformError> {
        let mut messages = self.messages.lock().await;
        let existing = messages
            .iter_mut()
            .find(|existing| existing.id == message_id && existing.channel == channel)
            .ok_or_else(|| PlatformError::NotFound(format!("message {message_id}")))?;
        existing.message = message;

        self.mutations.lock().await.push(Mutation::Edit {
            channel,
            message: message_id,
        });
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<MessageSummary>, PlatformError> {
        Ok(self
            .messages
            .lock()
            .await
            .iter()
            .rev()
            .filter(|message| message.channel == channel)
            .take(limit as usize)
            .map(|message| MessageSummary {
                id: message.id,
                from_self: message.from_self,
                title: message.message.card.as_ref().map(|card| card.title.clone()),
            })
            .collect())
    }
}
