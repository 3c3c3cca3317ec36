// Console gateway - a development stand-in for the real messaging client.
//
// Production deployments implement `ChatClient` against the actual client
// library; this one backs the bot with a fixed two-person group so every
// code path can be exercised from a terminal. Stdin lines become group
// messages from the resident admin; prefix a line with `user:` to speak as
// the non-admin participant instead (useful for poking the link policy).
// Outbound capability calls are printed.

use crate::core::client::{
    ChatClient, ClientError, ClientEvent, GroupInfo, GroupParticipant, GroupPolicy,
    InboundMessage, MessageContent, MessageKey,
};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const GROUP_ID: &str = "dev-room@g.dev";
const ADMIN_ID: &str = "dev-admin@s.dev";
const USER_ID: &str = "dev-user@s.dev";

pub struct ConsoleGateway {
    group: GroupInfo,
}

impl ConsoleGateway {
    pub fn new() -> Self {
        Self {
            group: GroupInfo {
                id: GROUP_ID.to_string(),
                participants: vec![
                    GroupParticipant {
                        id: ADMIN_ID.to_string(),
                        is_admin: true,
                    },
                    GroupParticipant {
                        id: USER_ID.to_string(),
                        is_admin: false,
                    },
                ],
            },
        }
    }

    /// Turn stdin lines into inbound message events until stdin closes or
    /// the receiving side goes away.
    pub fn spawn_stdin_feed(&self, tx: mpsc::Sender<ClientEvent>) -> JoinHandle<()> {
        let group_id = self.group.id.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut seq = 0u64;

            while let Ok(Some(line)) = lines.next_line().await {
                seq += 1;
                let (sender, text) = match line.strip_prefix("user:") {
                    Some(rest) => (USER_ID, rest.trim().to_string()),
                    None => (ADMIN_ID, line),
                };

                let msg = InboundMessage {
                    key: MessageKey {
                        id: format!("console-{seq}"),
                        remote: group_id.clone(),
                        from_me: false,
                    },
                    sender: sender.to_string(),
                    group: Some(group_id.clone()),
                    content: MessageContent::Conversation(text),
                };

                if tx.send(ClientEvent::Message(msg)).await.is_err() {
                    break;
                }
            }
        })
    }
}

impl Default for ConsoleGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for ConsoleGateway {
    async fn send_text(
        &self,
        chat: &str,
        text: &str,
        mentions: &[String],
    ) -> Result<(), ClientError> {
        if mentions.is_empty() {
            println!("[{chat}] {text}");
        } else {
            println!("[{chat}] (mentions {}) {text}", mentions.join(", "));
        }
        Ok(())
    }

    async fn delete_message(&self, chat: &str, key: &MessageKey) -> Result<(), ClientError> {
        println!("[{chat}] * deleted message {} *", key.id);
        Ok(())
    }

    async fn group_metadata(&self, group: &str) -> Result<GroupInfo, ClientError> {
        if group != self.group.id {
            return Err(ClientError::UnknownGroup(group.to_string()));
        }
        Ok(self.group.clone())
    }

    async fn remove_participants(
        &self,
        chat: &str,
        participants: &[String],
    ) -> Result<(), ClientError> {
        println!("[{chat}] * removed {} *", participants.join(", "));
        Ok(())
    }

    async fn set_group_policy(&self, chat: &str, policy: GroupPolicy) -> Result<(), ClientError> {
        println!("[{chat}] * policy -> {} *", policy.wire_name());
        Ok(())
    }
}
