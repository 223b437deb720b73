//! Platform-facing data model.
//!
//! The gateway connection itself lives in the embedding bot; Herald only
//! consumes already-delivered message events and talks back through a
//! [`ReplySink`]. Both sides of that boundary are defined here so the engine
//! and the embedder agree on exactly what a message exposes.

use async_trait::async_trait;
use twilight_model::guild::Permissions;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker};
use twilight_model::id::Id;

/// A single inbound chat message, as delivered by the platform gateway.
///
/// Permission sets are the *effective* sets at the originating location, so
/// the engine never needs to resolve roles or channel overwrites itself.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub id: Id<MessageMarker>,
    pub content: String,
    pub author_id: Id<UserMarker>,
    /// Set for messages authored by bots or webhooks. Such messages are
    /// dropped unconditionally.
    pub author_is_bot: bool,
    pub channel_id: Id<ChannelMarker>,
    /// `None` in direct messages.
    pub guild_id: Option<Id<GuildMarker>>,
    /// The author's effective permissions in the originating channel.
    pub author_permissions: Permissions,
    /// The bot's own effective permissions in the originating channel.
    pub bot_permissions: Permissions,
    /// Structured mention payload shipped with the message. Argument
    /// resolvers use this instead of issuing platform lookups.
    pub mentioned_users: Vec<MentionedUser>,
}

/// A user referenced by a mention in the message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionedUser {
    pub id: Id<UserMarker>,
    pub name: String,
    pub bot: bool,
}

impl MessageEvent {
    pub fn mentioned_user(&self, id: Id<UserMarker>) -> Option<&MentionedUser> {
        self.mentioned_users.iter().find(|user| user.id == id)
    }
}

/// Outbound half of the platform boundary: sending text to a location and
/// reacting to the originating message with a status marker.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_text(&self, channel_id: Id<ChannelMarker>, content: &str) -> anyhow::Result<()>;

    async fn react_failure(
        &self,
        channel_id: Id<ChannelMarker>,
        message_id: Id<MessageMarker>,
    ) -> anyhow::Result<()>;
}
