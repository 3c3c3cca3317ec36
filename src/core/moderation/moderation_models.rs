// Moderation domain models - data structures for the anti-link system.
//
// These are pure domain types with no transport dependencies.
// The chat layer converts them into messaging-client calls.

use crate::core::client::MessageKey;
use chrono::{DateTime, Utc};

/// What the engine wants done about a flagged message. The chat layer
/// applies actions in order; only the delete is best-effort.
#[derive(Debug, Clone, PartialEq)]
pub enum ModAction {
    /// Delete the offending message, addressed by its network key.
    DeleteMessage { key: MessageKey },
    /// Post a warning notice tagging the sender.
    WarnNotice {
        sender: String,
        count: u32,
        limit: u32,
    },
    /// Remove the sender from the group.
    RemoveParticipant { participant: String },
    /// Post a removal notice tagging the removed participant.
    RemovalNotice { participant: String },
    /// Reset the participant's ledger entry to zero. Ordered after the
    /// removal so a failed removal keeps the count at or above the limit
    /// and the next offense retries the removal.
    ResetWarnings { participant: String },
}

/// Outcome of recording one warning against a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarnVerdict {
    /// Count after the increment.
    pub count: u32,
    pub limit: u32,
    /// True when the count reached the limit and the participant should be
    /// removed. The ledger entry stays put until the caller confirms the
    /// removal with `reset_warnings`.
    pub removed: bool,
}

/// One warning-ledger entry.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct WarnRecord {
    pub count: u32,
    pub last_warning: DateTime<Utc>,
}
