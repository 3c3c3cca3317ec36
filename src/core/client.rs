// The capability surface the bot needs from the messaging network.
//
// The actual session transport, pairing and wire protocol live in whatever
// client library a deployment links in. The core only ever talks to the
// `ChatClient` trait and consumes `ClientEvent`s, so all of the business
// logic can be exercised against a mock client in tests.

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-side failure reported by the client library.
    #[allow(dead_code)]
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not a known group: {0}")]
    UnknownGroup(String),
}

// ============================================================================
// OUTBOUND CAPABILITIES (PORT)
// ============================================================================

/// Identifying key of a delivered message, used for content-addressed
/// deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageKey {
    pub id: String,
    /// Chat the message was delivered in.
    #[allow(dead_code)]
    pub remote: String,
    /// Whether the bot itself sent the message. Deletion directives on the
    /// wire carry it even though the bot never branches on it.
    #[allow(dead_code)]
    pub from_me: bool,
}

/// One roster entry from group metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParticipant {
    pub id: String,
    pub is_admin: bool,
}

/// Group metadata as the network reports it. Always fetched fresh; the bot
/// never caches rosters.
#[derive(Debug, Clone)]
pub struct GroupInfo {
    pub id: String,
    pub participants: Vec<GroupParticipant>,
}

/// Posting policy of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPolicy {
    /// Only admins may post.
    AdminsOnly,
    /// Everyone may post.
    Everyone,
}

impl GroupPolicy {
    /// Name of the policy on the wire ("announcement" switch).
    pub fn wire_name(&self) -> &'static str {
        match self {
            GroupPolicy::AdminsOnly => "announcement",
            GroupPolicy::Everyone => "not_announcement",
        }
    }
}

/// Everything the bot is allowed to ask of the messaging client.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a text message, optionally tagging participants.
    async fn send_text(
        &self,
        chat: &str,
        text: &str,
        mentions: &[String],
    ) -> Result<(), ClientError>;

    /// Request deletion of a previously delivered message.
    async fn delete_message(&self, chat: &str, key: &MessageKey) -> Result<(), ClientError>;

    /// Fetch the current participant roster of a group.
    async fn group_metadata(&self, group: &str) -> Result<GroupInfo, ClientError>;

    /// Remove participants from a group.
    async fn remove_participants(
        &self,
        group: &str,
        participants: &[String],
    ) -> Result<(), ClientError>;

    /// Switch a group's posting policy.
    async fn set_group_policy(&self, group: &str, policy: GroupPolicy)
        -> Result<(), ClientError>;
}

// ============================================================================
// INBOUND EVENTS
// ============================================================================

/// Message payload variants the network delivers.
///
/// Text resolution walks these in a fixed priority order (plain conversation
/// first, extended text second) instead of chained optional access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain conversation text.
    Conversation(String),
    /// Extended text, possibly quoting another participant's message.
    Extended {
        text: String,
        /// Author of the quoted message, when the shape carries one.
        quoted_sender: Option<String>,
    },
    /// Media and other shapes the bot does not act on.
    Unsupported,
}

impl MessageContent {
    /// First present text field, in priority order. `None` means there is
    /// nothing for the bot to inspect.
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageContent::Conversation(text) => Some(text),
            MessageContent::Extended { text, .. } => Some(text),
            MessageContent::Unsupported => None,
        }
    }

    /// Participant whose message was replied to. This is the target of
    /// `.kick` and `.warn`.
    pub fn reply_target(&self) -> Option<&str> {
        match self {
            MessageContent::Extended { quoted_sender, .. } => quoted_sender.as_deref(),
            _ => None,
        }
    }
}

/// One inbound message as surfaced by the client library.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub key: MessageKey,
    pub sender: String,
    /// Group the message was posted in; `None` for direct messages.
    pub group: Option<String>,
    pub content: MessageContent,
}

impl InboundMessage {
    /// Chat to reply into: the group, or the sender for direct messages.
    pub fn chat_id(&self) -> &str {
        self.group.as_deref().unwrap_or(&self.sender)
    }
}

/// Events the client library pushes at the bot.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Message(InboundMessage),
    /// Updated session credentials, forwarded opaquely to persistence.
    CredentialsUpdate(serde_json::Value),
}

// ============================================================================
// DERIVED MESSAGE CONTEXT
// ============================================================================

/// Per-event read-only context. Fully derived before moderation or command
/// dispatch reads any of it, then discarded.
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub key: MessageKey,
    /// Chat replies go to.
    pub chat: String,
    pub sender: String,
    pub text: String,
    /// Quoted participant, when the message is a reply.
    pub reply_target: Option<String>,
    pub is_group: bool,
    pub is_admin: bool,
    pub is_owner: bool,
}

/// Bare identifier used in mention text (the part before `@server`).
pub fn mention_name(id: &str) -> &str {
    id.split('@').next().unwrap_or(id)
}

// ============================================================================
// CREDENTIAL PERSISTENCE (PORT)
// ============================================================================

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence hook for the client's opaque session credentials. Invoked on
/// every credential-update event.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn save(&self, creds: &serde_json::Value) -> Result<(), CredentialError>;
}

// ============================================================================
// TESTS
// ============================================================================
