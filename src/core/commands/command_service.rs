// Command dispatcher - resolves the dot-prefix token through the static
// table, applies the authorization gate, and runs the matched handler
// against the messaging-client capability trait.
//
// Handlers execute their outbound calls directly; a mock client in the
// tests records every call so gating can be asserted precisely.

use super::command_models::{self, Command, ParsedCommand};
use crate::core::client::{mention_name, ChatClient, ClientError, GroupPolicy, MessageContext};
use crate::core::config::{AuthGate, BotConfig};
use crate::core::moderation::{ModerationError, ModerationService, WarnStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Moderation error: {0}")]
    Moderation(#[from] ModerationError),
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct CommandService<S: WarnStore> {
    client: Arc<dyn ChatClient>,
    moderation: Arc<ModerationService<S>>,
    owner: String,
    auth_gate: AuthGate,
    started: Instant,
}

impl<S: WarnStore> CommandService<S> {
    pub fn new(
        client: Arc<dyn ChatClient>,
        moderation: Arc<ModerationService<S>>,
        config: &BotConfig,
    ) -> Self {
        Self {
            client,
            moderation,
            owner: config.owner.clone(),
            auth_gate: config.auth_gate,
            started: Instant::now(),
        }
    }

    /// Dispatch one message. Non-command text and unknown tokens are a
    /// no-op; a failed gate check produces exactly one denial reply and
    /// nothing else.
    pub async fn dispatch(&self, ctx: &MessageContext) -> Result<(), CommandError> {
        let Some(parsed) = command_models::parse(&ctx.text) else {
            return Ok(());
        };

        if parsed.spec.admin_only && !self.authorized(ctx) {
            self.client
                .send_text(&ctx.chat, "❌ Only *admins* can use this command.", &[])
                .await?;
            return Ok(());
        }

        if parsed.spec.group_only && !ctx.is_group {
            // Upstream stays silent here; reproduced as-is.
            return Ok(());
        }

        match parsed.spec.command {
            Command::Menu => self.menu(ctx).await,
            Command::Ping => self.ping(ctx).await,
            Command::TagAll => self.tag_all(ctx).await,
            Command::Kick => self.kick(ctx).await,
            Command::Warn => self.warn(ctx).await,
            Command::Open => {
                self.set_policy(ctx, GroupPolicy::Everyone, "🔓 Group opened.")
                    .await
            }
            Command::Close => {
                self.set_policy(ctx, GroupPolicy::AdminsOnly, "🔒 Group closed (admins only).")
                    .await
            }
            Command::AntiLink => self.toggle_anti_link(ctx, &parsed).await,
        }
    }

    fn authorized(&self, ctx: &MessageContext) -> bool {
        match self.auth_gate {
            AuthGate::AdminOnly => ctx.is_admin,
            AuthGate::OwnerOrAdmin => ctx.is_admin || ctx.is_owner,
        }
    }

    // ------------------------------------------------------------------------
    // HANDLERS
    // ------------------------------------------------------------------------

    async fn ping(&self, ctx: &MessageContext) -> Result<(), CommandError> {
        self.client.send_text(&ctx.chat, "📍 Pong!", &[]).await?;
        Ok(())
    }

    async fn toggle_anti_link(
        &self,
        ctx: &MessageContext,
        parsed: &ParsedCommand<'_>,
    ) -> Result<(), CommandError> {
        match command_models::parse_toggle(parsed.args) {
            Some(true) => {
                self.moderation.set_anti_link(true);
                self.client
                    .send_text(&ctx.chat, "🔰 Anti-Link Activated", &[])
                    .await?;
            }
            Some(false) => {
                self.moderation.set_anti_link(false);
                self.client
                    .send_text(&ctx.chat, "⭕ Anti-Link Deactivated", &[])
                    .await?;
            }
            // No recognizable argument: stay silent, like the source does.
            None => {}
        }
        Ok(())
    }

    async fn tag_all(&self, ctx: &MessageContext) -> Result<(), CommandError> {
        let group = self.client.group_metadata(&ctx.chat).await?;

        let mut mentions = Vec::with_capacity(group.participants.len());
        let mut text = String::from("📢 *Tagging Everyone:*\n\n");
        for participant in &group.participants {
            text.push_str(&format!("@{}\n", mention_name(&participant.id)));
            mentions.push(participant.id.clone());
        }

        self.client.send_text(&ctx.chat, &text, &mentions).await?;
        Ok(())
    }

    async fn kick(&self, ctx: &MessageContext) -> Result<(), CommandError> {
        let Some(target) = ctx.reply_target.clone() else {
            self.client
                .send_text(&ctx.chat, "Mention a user to kick.", &[])
                .await?;
            return Ok(());
        };

        self.client
            .remove_participants(&ctx.chat, std::slice::from_ref(&target))
            .await?;
        self.client
            .send_text(
                &ctx.chat,
                &format!("👢 Kicked @{}", mention_name(&target)),
                std::slice::from_ref(&target),
            )
            .await?;
        Ok(())
    }

    async fn warn(&self, ctx: &MessageContext) -> Result<(), CommandError> {
        let Some(target) = ctx.reply_target.clone() else {
            self.client
                .send_text(&ctx.chat, "Mention a user.", &[])
                .await?;
            return Ok(());
        };

        let verdict = self.moderation.record_warning(&target).await?;

        self.client
            .send_text(
                &ctx.chat,
                &format!(
                    "⚠️ @{} warned ({}/{})",
                    mention_name(&target),
                    verdict.count,
                    verdict.limit
                ),
                std::slice::from_ref(&target),
            )
            .await?;

        if verdict.removed {
            self.client
                .remove_participants(&ctx.chat, std::slice::from_ref(&target))
                .await?;
            self.client
                .send_text(
                    &ctx.chat,
                    &format!("🚨 @{} removed (max warnings reached)", mention_name(&target)),
                    std::slice::from_ref(&target),
                )
                .await?;
            // Only a confirmed removal resets the ledger; a failed one
            // leaves the count at the limit so the next warning retries.
            self.moderation.reset_warnings(&target).await?;
        }
        Ok(())
    }

    async fn set_policy(
        &self,
        ctx: &MessageContext,
        policy: GroupPolicy,
        confirmation: &str,
    ) -> Result<(), CommandError> {
        self.client.set_group_policy(&ctx.chat, policy).await?;
        self.client.send_text(&ctx.chat, confirmation, &[]).await?;
        Ok(())
    }

    async fn menu(&self, ctx: &MessageContext) -> Result<(), CommandError> {
        let (hours, minutes, seconds) = split_uptime(self.started.elapsed());
        let anti_link = if self.moderation.anti_link_enabled() {
            "ON ✅"
        } else {
            "OFF ❌"
        };

        let mut command_list = String::new();
        for spec in command_models::COMMAND_TABLE {
            command_list.push_str(&format!("• .{}", spec.token));
            if spec.command == Command::AntiLink {
                command_list.push_str(" on/off");
            }
            command_list.push('\n');
        }

        let menu = format!(
            "╔══✦ *MiniBot Menu* ✦══╗\n\n\
             👑 *Owner:* {}\n\
             🧩 *Anti-Link:* {}\n\
             ⚡ *Uptime:* {}h {}m {}s\n\n\
             🎯 *Commands*\n{}\n\
             ╚═════════════════════╝",
            self.owner, anti_link, hours, minutes, seconds, command_list
        );

        self.client.send_text(&ctx.chat, &menu, &[]).await?;
        Ok(())
    }
}

/// Whole hours, leftover minutes and seconds of a duration.
fn split_uptime(uptime: Duration) -> (u64, u64, u64) {
    let total = uptime.as_secs();
    (total / 3600, (total % 3600) / 60, total % 60)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::{GroupInfo, GroupParticipant, MessageKey};
    use async_trait::async_trait;
    use dashmap::DashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        SendText {
            chat: String,
            text: String,
            mentions: Vec<String>,
        },
        DeleteMessage {
            chat: String,
        },
        GroupMetadata {
            chat: String,
        },
        RemoveParticipants {
            chat: String,
            participants: Vec<String>,
        },
        SetPolicy {
            chat: String,
            policy: GroupPolicy,
        },
    }

    /// Client double that records every outbound call.
    struct MockClient {
        calls: Mutex<Vec<Call>>,
        roster: Vec<GroupParticipant>,
        fail_removals: bool,
    }

    impl MockClient {
        fn new(roster: Vec<GroupParticipant>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                roster,
                fail_removals: false,
            }
        }

        fn failing_removals(roster: Vec<GroupParticipant>) -> Self {
            Self {
                fail_removals: true,
                ..Self::new(roster)
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl ChatClient for MockClient {
        async fn send_text(
            &self,
            chat: &str,
            text: &str,
            mentions: &[String],
        ) -> Result<(), ClientError> {
            self.record(Call::SendText {
                chat: chat.to_string(),
                text: text.to_string(),
                mentions: mentions.to_vec(),
            });
            Ok(())
        }

        async fn delete_message(&self, chat: &str, _key: &MessageKey) -> Result<(), ClientError> {
            self.record(Call::DeleteMessage {
                chat: chat.to_string(),
            });
            Ok(())
        }

        async fn group_metadata(&self, group: &str) -> Result<GroupInfo, ClientError> {
            self.record(Call::GroupMetadata {
                chat: group.to_string(),
            });
            Ok(GroupInfo {
                id: group.to_string(),
                participants: self.roster.clone(),
            })
        }

        async fn remove_participants(
            &self,
            group: &str,
            participants: &[String],
        ) -> Result<(), ClientError> {
            self.record(Call::RemoveParticipants {
                chat: group.to_string(),
                participants: participants.to_vec(),
            });
            if self.fail_removals {
                return Err(ClientError::Transport("removal rejected".to_string()));
            }
            Ok(())
        }

        async fn set_group_policy(
            &self,
            group: &str,
            policy: GroupPolicy,
        ) -> Result<(), ClientError> {
            self.record(Call::SetPolicy {
                chat: group.to_string(),
                policy,
            });
            Ok(())
        }
    }

    struct MockWarnStore {
        counts: DashMap<String, u32>,
    }

    #[async_trait]
    impl WarnStore for MockWarnStore {
        async fn add_warning(&self, participant: &str) -> Result<u32, ModerationError> {
            let mut count = self.counts.entry(participant.to_string()).or_insert(0);
            *count += 1;
            Ok(*count)
        }

        async fn get_warnings(&self, participant: &str) -> Result<u32, ModerationError> {
            Ok(self.counts.get(participant).map(|c| *c).unwrap_or(0))
        }

        async fn clear_warnings(&self, participant: &str) -> Result<(), ModerationError> {
            self.counts.remove(participant);
            Ok(())
        }
    }

    const GROUP: &str = "room@g.net";
    const OWNER: &str = "owner@s.net";

    fn setup(
        warn_limit: u32,
        auth_gate: AuthGate,
        roster: Vec<GroupParticipant>,
    ) -> (Arc<MockClient>, CommandService<MockWarnStore>) {
        setup_with(Arc::new(MockClient::new(roster)), warn_limit, auth_gate)
    }

    fn setup_with(
        client: Arc<MockClient>,
        warn_limit: u32,
        auth_gate: AuthGate,
    ) -> (Arc<MockClient>, CommandService<MockWarnStore>) {
        let moderation = Arc::new(ModerationService::new(
            MockWarnStore {
                counts: DashMap::new(),
            },
            warn_limit,
        ));
        let config = BotConfig {
            owner: OWNER.to_string(),
            warn_limit,
            auth_gate,
            creds_path: "auth/creds.json".into(),
        };
        let service = CommandService::new(client.clone() as Arc<dyn ChatClient>, moderation, &config);
        (client, service)
    }

    fn ctx(text: &str, is_group: bool, is_admin: bool) -> MessageContext {
        MessageContext {
            key: MessageKey {
                id: "m1".to_string(),
                remote: GROUP.to_string(),
                from_me: false,
            },
            chat: if is_group {
                GROUP.to_string()
            } else {
                "user@s.net".to_string()
            },
            sender: "user@s.net".to_string(),
            text: text.to_string(),
            reply_target: None,
            is_group,
            is_admin,
            is_owner: false,
        }
    }

    #[tokio::test]
    async fn ping_replies_with_pong() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);
        service.dispatch(&ctx(".ping", true, false)).await.unwrap();

        assert_eq!(
            client.calls(),
            vec![Call::SendText {
                chat: GROUP.to_string(),
                text: "📍 Pong!".to_string(),
                mentions: vec![],
            }]
        );
    }

    #[tokio::test]
    async fn antilink_toggle_is_idempotent() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);

        service
            .dispatch(&ctx(".antilink on", true, true))
            .await
            .unwrap();
        service
            .dispatch(&ctx(".antilink on", true, true))
            .await
            .unwrap();
        assert!(service.moderation.anti_link_enabled());

        service
            .dispatch(&ctx(".antilink off", true, true))
            .await
            .unwrap();
        assert!(!service.moderation.anti_link_enabled());

        service
            .dispatch(&ctx(".antilink on", true, true))
            .await
            .unwrap();
        assert!(service.moderation.anti_link_enabled());

        // One confirmation per invocation.
        assert_eq!(client.calls().len(), 4);
    }

    #[tokio::test]
    async fn antilink_without_argument_is_silent() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);
        service
            .dispatch(&ctx(".antilink", true, true))
            .await
            .unwrap();

        assert!(client.calls().is_empty());
        assert!(service.moderation.anti_link_enabled());
    }

    #[tokio::test]
    async fn non_admin_gets_one_denial_and_no_side_effects() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);
        service.dispatch(&ctx(".kick", true, false)).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0],
            Call::SendText { text, .. } if text.contains("admins")
        ));
    }

    #[tokio::test]
    async fn owner_passes_the_owner_or_admin_gate() {
        let (client, service) = setup(3, AuthGate::OwnerOrAdmin, vec![]);
        let mut context = ctx(".antilink off", true, false);
        context.is_owner = true;

        service.dispatch(&context).await.unwrap();

        assert!(!service.moderation.anti_link_enabled());
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn owner_does_not_pass_the_admin_only_gate() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);
        let mut context = ctx(".antilink off", true, false);
        context.is_owner = true;

        service.dispatch(&context).await.unwrap();

        assert!(service.moderation.anti_link_enabled());
        assert!(matches!(&client.calls()[..], [Call::SendText { .. }]));
    }

    #[tokio::test]
    async fn tagall_mentions_the_whole_roster_in_order() {
        let roster = vec![
            GroupParticipant {
                id: "a@s.net".to_string(),
                is_admin: true,
            },
            GroupParticipant {
                id: "b@s.net".to_string(),
                is_admin: false,
            },
            GroupParticipant {
                id: "c@s.net".to_string(),
                is_admin: false,
            },
        ];
        let (client, service) = setup(3, AuthGate::AdminOnly, roster);
        service.dispatch(&ctx(".tagall", true, true)).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::GroupMetadata { chat } if chat == GROUP));
        match &calls[1] {
            Call::SendText { text, mentions, .. } => {
                assert_eq!(
                    mentions,
                    &["a@s.net".to_string(), "b@s.net".to_string(), "c@s.net".to_string()]
                );
                assert!(text.contains("@a"));
                assert!(text.contains("@b"));
                assert!(text.contains("@c"));
            }
            other => panic!("expected tagall send, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn kick_without_reply_target_prompts() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);
        service.dispatch(&ctx(".kick", true, true)).await.unwrap();

        assert_eq!(
            client.calls(),
            vec![Call::SendText {
                chat: GROUP.to_string(),
                text: "Mention a user to kick.".to_string(),
                mentions: vec![],
            }]
        );
    }

    #[tokio::test]
    async fn kick_removes_the_reply_target() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);
        let mut context = ctx(".kick", true, true);
        context.reply_target = Some("target@s.net".to_string());

        service.dispatch(&context).await.unwrap();

        let calls = client.calls();
        assert_eq!(
            calls[0],
            Call::RemoveParticipants {
                chat: GROUP.to_string(),
                participants: vec!["target@s.net".to_string()],
            }
        );
        assert!(matches!(
            &calls[1],
            Call::SendText { text, mentions, .. }
                if text.contains("Kicked @target") && mentions == &["target@s.net".to_string()]
        ));
    }

    #[tokio::test]
    async fn warn_escalates_to_removal_at_the_limit() {
        let (client, service) = setup(2, AuthGate::AdminOnly, vec![]);
        let mut context = ctx(".warn", true, true);
        context.reply_target = Some("target@s.net".to_string());

        service.dispatch(&context).await.unwrap();
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0],
            Call::SendText { text, .. } if text.contains("warned (1/2)")
        ));

        service.dispatch(&context).await.unwrap();
        let calls = client.calls();
        assert_eq!(calls.len(), 4);
        assert!(matches!(
            &calls[1],
            Call::SendText { text, .. } if text.contains("warned (2/2)")
        ));
        assert_eq!(
            calls[2],
            Call::RemoveParticipants {
                chat: GROUP.to_string(),
                participants: vec!["target@s.net".to_string()],
            }
        );
        assert!(matches!(
            &calls[3],
            Call::SendText { text, .. } if text.contains("removed (max warnings reached)")
        ));

        // Ledger reset after removal.
        assert_eq!(
            service.moderation.warnings("target@s.net").await.unwrap(),
            0
        );
    }

    // A removal the client rejects must not clear the ledger: the count
    // stays at the limit and the next warning attempts the removal again.
    #[tokio::test]
    async fn warn_keeps_the_count_when_removal_fails() {
        let client = Arc::new(MockClient::failing_removals(vec![]));
        let (client, service) = setup_with(client, 1, AuthGate::AdminOnly);

        let mut context = ctx(".warn", true, true);
        context.reply_target = Some("target@s.net".to_string());

        assert!(service.dispatch(&context).await.is_err());
        assert_eq!(
            service.moderation.warnings("target@s.net").await.unwrap(),
            1
        );

        assert!(service.dispatch(&context).await.is_err());
        assert_eq!(
            service.moderation.warnings("target@s.net").await.unwrap(),
            2
        );
        let removals = client
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::RemoveParticipants { .. }))
            .count();
        assert_eq!(removals, 2);
    }

    #[tokio::test]
    async fn warn_without_reply_target_prompts() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);
        service.dispatch(&ctx(".warn", true, true)).await.unwrap();

        assert!(matches!(
            &client.calls()[..],
            [Call::SendText { text, .. }] if text == "Mention a user."
        ));
    }

    #[tokio::test]
    async fn open_and_close_switch_the_posting_policy() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);

        service.dispatch(&ctx(".open", true, true)).await.unwrap();
        service.dispatch(&ctx(".close", true, true)).await.unwrap();

        let calls = client.calls();
        assert_eq!(
            calls[0],
            Call::SetPolicy {
                chat: GROUP.to_string(),
                policy: GroupPolicy::Everyone,
            }
        );
        assert!(matches!(&calls[1], Call::SendText { text, .. } if text.contains("opened")));
        assert_eq!(
            calls[2],
            Call::SetPolicy {
                chat: GROUP.to_string(),
                policy: GroupPolicy::AdminsOnly,
            }
        );
        assert!(matches!(&calls[3], Call::SendText { text, .. } if text.contains("closed")));
    }

    #[tokio::test]
    async fn group_only_commands_are_silent_in_direct_chats() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);
        // An admin context outside a group; the gate passes, the group
        // check swallows it.
        service.dispatch(&ctx(".tagall", false, true)).await.unwrap();

        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_and_non_command_text_produce_no_output() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);

        service
            .dispatch(&ctx("just chatting", true, true))
            .await
            .unwrap();
        service.dispatch(&ctx(".bogus", true, true)).await.unwrap();

        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn menu_reports_owner_and_flag_state() {
        let (client, service) = setup(3, AuthGate::AdminOnly, vec![]);

        service.dispatch(&ctx(".menu", true, false)).await.unwrap();
        service.moderation.set_anti_link(false);
        service.dispatch(&ctx(".menu", true, false)).await.unwrap();

        let calls = client.calls();
        match (&calls[0], &calls[1]) {
            (Call::SendText { text: first, .. }, Call::SendText { text: second, .. }) => {
                assert!(first.contains(OWNER));
                assert!(first.contains("ON"));
                assert!(first.contains("• .antilink on/off"));
                assert!(first.contains("Uptime"));
                assert!(second.contains("OFF"));
            }
            other => panic!("expected two menu sends, got {other:?}"),
        }
    }

    #[test]
    fn uptime_splits_into_hours_minutes_seconds() {
        assert_eq!(split_uptime(Duration::from_secs(0)), (0, 0, 0));
        assert_eq!(split_uptime(Duration::from_secs(59)), (0, 0, 59));
        assert_eq!(split_uptime(Duration::from_secs(3600 + 61)), (1, 1, 1));
        assert_eq!(split_uptime(Duration::from_secs(7325)), (2, 2, 5));
    }
}
