//! In-process collaborator doubles
//!
//! Compiled for this crate's tests and, behind the `testing` feature, for
//! downstream integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use modix_core::traits::{
    AuthorizationProvider, ChannelDesignation, Clock, DesignatedChannelLookup, MessageLookup,
    MessagingClient,
};
use modix_core::{
    AuthenticatedUser, AuthorizationClaims, DialogLocation, DomainError, PostedMessage, Snowflake,
};

/// Default bot user for [`RecordingMessenger`]
pub const BOT_USER_ID: Snowflake = Snowflake::new(1_000);

/// One outbound call seen by [`RecordingMessenger`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessengerCall {
    Send {
        channel_id: Snowflake,
        message_id: Snowflake,
        content: String,
    },
    Edit {
        channel_id: Snowflake,
        message_id: Snowflake,
        content: String,
    },
    Delete {
        channel_id: Snowflake,
        message_id: Snowflake,
    },
    AddReaction {
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: String,
    },
    RemoveReaction {
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: String,
    },
}

/// Messaging client that keeps channel history in memory and records calls
///
/// Also serves channel history through [`MessageLookup`].
pub struct RecordingMessenger {
    bot_id: Snowflake,
    next_id: AtomicI64,
    calls: Mutex<Vec<MessengerCall>>,
    /// Live messages in posting order
    messages: Mutex<Vec<PostedMessage>>,
    failing_deletes: Mutex<HashSet<Snowflake>>,
    fail_sends: AtomicBool,
}

impl RecordingMessenger {
    pub fn new(bot_id: Snowflake) -> Self {
        Self {
            bot_id,
            next_id: AtomicI64::new(9_000),
            calls: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            failing_deletes: Mutex::new(HashSet::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    pub fn bot_id(&self) -> Snowflake {
        self.bot_id
    }

    pub fn calls(&self) -> Vec<MessengerCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Messages sent by the bot, in posting order
    pub fn sent(&self) -> Vec<PostedMessage> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MessengerCall::Send {
                    channel_id,
                    message_id,
                    content,
                } => Some(PostedMessage {
                    id: *message_id,
                    channel_id: *channel_id,
                    author_id: self.bot_id,
                    content: content.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(DialogLocation, String)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MessengerCall::Edit {
                    channel_id,
                    message_id,
                    content,
                } => Some((DialogLocation::new(*channel_id, *message_id), content.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<DialogLocation> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MessengerCall::Delete {
                    channel_id,
                    message_id,
                } => Some(DialogLocation::new(*channel_id, *message_id)),
                _ => None,
            })
            .collect()
    }

    /// Current content of a live message
    pub fn content_of(&self, location: DialogLocation) -> Option<String> {
        self.messages
            .lock()
            .iter()
            .find(|m| m.location() == location)
            .map(|m| m.content.clone())
    }

    /// Live messages in a channel, oldest first
    pub fn live_messages(&self, channel_id: Snowflake) -> Vec<PostedMessage> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m.channel_id == channel_id)
            .cloned()
            .collect()
    }

    /// Put a message into channel history without recording a call
    pub fn seed_message(
        &self,
        channel_id: Snowflake,
        author_id: Snowflake,
        content: impl Into<String>,
    ) -> DialogLocation {
        let id = self.mint_id();
        self.messages.lock().push(PostedMessage {
            id,
            channel_id,
            author_id,
            content: content.into(),
        });
        DialogLocation::new(channel_id, id)
    }

    /// Make every delete of `message_id` fail
    pub fn fail_delete(&self, message_id: Snowflake) {
        self.failing_deletes.lock().insert(message_id);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    fn mint_id(&self) -> Snowflake {
        Snowflake::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record(&self, call: MessengerCall) {
        self.calls.lock().push(call);
    }
}

impl Default for RecordingMessenger {
    fn default() -> Self {
        Self::new(BOT_USER_ID)
    }
}

#[async_trait]
impl MessagingClient for RecordingMessenger {
    fn current_user_id(&self) -> Snowflake {
        self.bot_id
    }

    async fn send_message(
        &self,
        channel_id: Snowflake,
        content: &str,
    ) -> Result<Snowflake, DomainError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(DomainError::MessagingError("send rejected".to_string()));
        }
        let message_id = self.mint_id();
        self.messages.lock().push(PostedMessage {
            id: message_id,
            channel_id,
            author_id: self.bot_id,
            content: content.to_string(),
        });
        self.record(MessengerCall::Send {
            channel_id,
            message_id,
            content: content.to_string(),
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: &str,
    ) -> Result<(), DomainError> {
        self.record(MessengerCall::Edit {
            channel_id,
            message_id,
            content: content.to_string(),
        });
        let mut messages = self.messages.lock();
        match messages
            .iter_mut()
            .find(|m| m.channel_id == channel_id && m.id == message_id)
        {
            Some(message) => {
                message.content = content.to_string();
                Ok(())
            }
            None => Err(DomainError::MessagingError(format!(
                "unknown message {message_id}"
            ))),
        }
    }

    async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), DomainError> {
        self.record(MessengerCall::Delete {
            channel_id,
            message_id,
        });
        if self.failing_deletes.lock().contains(&message_id) {
            return Err(DomainError::MessagingError(format!(
                "delete of {message_id} rejected"
            )));
        }
        let mut messages = self.messages.lock();
        let before = messages.len();
        messages.retain(|m| !(m.channel_id == channel_id && m.id == message_id));
        if messages.len() == before {
            return Err(DomainError::MessagingError(format!(
                "unknown message {message_id}"
            )));
        }
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> Result<(), DomainError> {
        self.record(MessengerCall::AddReaction {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> Result<(), DomainError> {
        self.record(MessengerCall::RemoveReaction {
            channel_id,
            message_id,
            user_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl MessageLookup for RecordingMessenger {
    async fn recent_messages(
        &self,
        channel_id: Snowflake,
        limit: usize,
    ) -> Result<Vec<PostedMessage>, DomainError> {
        Ok(self
            .messages
            .lock()
            .iter()
            .rev()
            .filter(|m| m.channel_id == channel_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Fixed guild to channel routing
#[derive(Debug, Default)]
pub struct StaticChannelLookup {
    channels: HashMap<Snowflake, Vec<Snowflake>>,
}

impl StaticChannelLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route promotion dialogs for `guild_id` to `channels`
    pub fn with(mut self, guild_id: Snowflake, channels: impl IntoIterator<Item = Snowflake>) -> Self {
        self.channels
            .entry(guild_id)
            .or_default()
            .extend(channels);
        self
    }
}

#[async_trait]
impl DesignatedChannelLookup for StaticChannelLookup {
    async fn channels_for_designation(
        &self,
        guild_id: Snowflake,
        designation: ChannelDesignation,
    ) -> Result<Vec<Snowflake>, DomainError> {
        Ok(match designation {
            ChannelDesignation::PromotionDialog => {
                self.channels.get(&guild_id).cloned().unwrap_or_default()
            }
        })
    }
}

/// Authorization with a default claim set and per-user overrides
pub struct StaticAuthorization {
    default_claims: AuthorizationClaims,
    overrides: Mutex<HashMap<Snowflake, AuthorizationClaims>>,
    denied: Mutex<HashSet<Snowflake>>,
}

impl StaticAuthorization {
    pub fn new(default_claims: AuthorizationClaims) -> Self {
        Self {
            default_claims,
            overrides: Mutex::new(HashMap::new()),
            denied: Mutex::new(HashSet::new()),
        }
    }

    pub fn grant(&self, user_id: Snowflake, claims: AuthorizationClaims) {
        self.overrides.lock().insert(user_id, claims);
    }

    /// Fail authentication for `user_id` from now on
    pub fn deny(&self, user_id: Snowflake) {
        self.denied.lock().insert(user_id);
    }
}

impl Default for StaticAuthorization {
    fn default() -> Self {
        Self::new(AuthorizationClaims::MEMBER)
    }
}

#[async_trait]
impl AuthorizationProvider for StaticAuthorization {
    async fn authenticate(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<AuthenticatedUser, DomainError> {
        if self.denied.lock().contains(&user_id) {
            return Err(DomainError::AuthenticationFailed(format!(
                "user {user_id} is not a member of guild {guild_id}"
            )));
        }
        let claims = self
            .overrides
            .lock()
            .get(&user_id)
            .copied()
            .unwrap_or(self.default_claims);
        Ok(AuthenticatedUser::new(guild_id, user_id, claims))
    }
}

/// Manually advanced clock
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
