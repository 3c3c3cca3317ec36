// Anti-link engine - core business logic for link moderation.
//
// This service handles:
// - Link detection in message text
// - Warning accumulation per sender
// - Escalation to removal at the configured limit
//
// NO transport dependencies here - just pure domain logic.

use super::moderation_models::{ModAction, WarnVerdict};
use crate::core::client::MessageContext;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    /// The in-memory ledger never fails, but a durable store would.
    #[allow(dead_code)]
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for the warning ledger.
///
/// Counts are keyed by participant only: a warning picked up in one group
/// follows the sender into every other group the bot moderates. That matches
/// the upstream ledger and is covered by a test rather than silently changed.
#[async_trait]
pub trait WarnStore: Send + Sync {
    /// Add one warning. Returns the new total for the participant.
    async fn add_warning(&self, participant: &str) -> Result<u32, ModerationError>;

    /// Current count for a participant.
    #[allow(dead_code)]
    async fn get_warnings(&self, participant: &str) -> Result<u32, ModerationError>;

    /// Reset a participant's count to zero.
    async fn clear_warnings(&self, participant: &str) -> Result<(), ModerationError>;
}

// ============================================================================
// LINK DETECTION
// ============================================================================

/// True when the text contains an `http://` or `https://` scheme followed by
/// at least one non-whitespace character, anywhere in the text,
/// case-insensitively.
pub fn contains_link(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    ["http://", "https://"].iter().any(|scheme| {
        lower.match_indices(scheme).any(|(pos, _)| {
            lower[pos + scheme.len()..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace())
        })
    })
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Link-policy engine: evaluates every inbound group message and decides
/// whether to delete, warn, or remove.
pub struct ModerationService<S: WarnStore> {
    store: S,
    warn_limit: u32,
    /// Process-wide switch, toggled by `.antilink`. Gates the whole engine,
    /// not just the removal step.
    anti_link: AtomicBool,
}

impl<S: WarnStore> ModerationService<S> {
    pub fn new(store: S, warn_limit: u32) -> Self {
        Self {
            store,
            warn_limit,
            anti_link: AtomicBool::new(true),
        }
    }

    pub fn anti_link_enabled(&self) -> bool {
        self.anti_link.load(Ordering::Relaxed)
    }

    pub fn set_anti_link(&self, enabled: bool) {
        self.anti_link.store(enabled, Ordering::Relaxed);
    }

    /// Evaluate one message against the link policy.
    ///
    /// Returns the actions to apply, in order. Empty when the flag is off,
    /// the message is not from a group, the sender is an admin, or the text
    /// carries no link.
    pub async fn evaluate(&self, ctx: &MessageContext) -> Result<Vec<ModAction>, ModerationError> {
        if !self.anti_link_enabled() || !ctx.is_group || ctx.is_admin {
            return Ok(Vec::new());
        }
        if !contains_link(&ctx.text) {
            return Ok(Vec::new());
        }

        let verdict = self.record_warning(&ctx.sender).await?;

        let mut actions = vec![
            ModAction::DeleteMessage {
                key: ctx.key.clone(),
            },
            ModAction::WarnNotice {
                sender: ctx.sender.clone(),
                count: verdict.count,
                limit: verdict.limit,
            },
        ];

        if verdict.removed {
            actions.push(ModAction::RemoveParticipant {
                participant: ctx.sender.clone(),
            });
            actions.push(ModAction::RemovalNotice {
                participant: ctx.sender.clone(),
            });
            actions.push(ModAction::ResetWarnings {
                participant: ctx.sender.clone(),
            });
        }

        Ok(actions)
    }

    /// Record one warning. Shared by the engine and the `.warn` command so
    /// both escalate identically. The ledger is left untouched even at the
    /// limit: callers reset it with [`reset_warnings`](Self::reset_warnings)
    /// once the removal has gone through, so a failed removal is retried on
    /// the next offense instead of restarting the count.
    pub async fn record_warning(&self, participant: &str) -> Result<WarnVerdict, ModerationError> {
        let count = self.store.add_warning(participant).await?;
        Ok(WarnVerdict {
            count,
            limit: self.warn_limit,
            removed: count >= self.warn_limit,
        })
    }

    /// Reset a participant's ledger entry after a confirmed removal.
    pub async fn reset_warnings(&self, participant: &str) -> Result<(), ModerationError> {
        self.store.clear_warnings(participant).await
    }

    /// Current ledger count for a participant.
    #[allow(dead_code)]
    pub async fn warnings(&self, participant: &str) -> Result<u32, ModerationError> {
        self.store.get_warnings(participant).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
