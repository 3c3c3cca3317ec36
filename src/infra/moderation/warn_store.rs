// In-memory implementation of the warning ledger.
//
// This is the only ledger the bot ships: counts live for the lifetime of the
// process and a restart clears all moderation state. That mirrors the
// upstream bot; durability is called out as an explicit non-goal in
// DESIGN.md.

use crate::core::moderation::{ModerationError, WarnRecord, WarnStore};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

/// DashMap-backed ledger. The key is the participant id alone, so counts
/// follow a sender across every group the bot moderates.
pub struct InMemoryWarnStore {
    entries: DashMap<String, WarnRecord>,
}

impl InMemoryWarnStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl Default for InMemoryWarnStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WarnStore for InMemoryWarnStore {
    async fn add_warning(&self, participant: &str) -> Result<u32, ModerationError> {
        let mut entry = self
            .entries
            .entry(participant.to_string())
            .or_insert(WarnRecord {
                count: 0,
                last_warning: Utc::now(),
            });
        entry.count += 1;
        entry.last_warning = Utc::now();
        Ok(entry.count)
    }

    async fn get_warnings(&self, participant: &str) -> Result<u32, ModerationError> {
        Ok(self
            .entries
            .get(participant)
            .map(|entry| entry.count)
            .unwrap_or(0))
    }

    async fn clear_warnings(&self, participant: &str) -> Result<(), ModerationError> {
        self.entries.remove(participant);
        Ok(())
    }
}
