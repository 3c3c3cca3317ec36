// Per-event context derivation.
//
// Everything a branch later reads - group flag, admin flag, owner flag,
// resolved text, reply target - is built here up front. The admin check
// fetches group metadata fresh on every event; rosters are never cached.

use crate::core::client::{ChatClient, ClientError, InboundMessage, MessageContext};

/// Derive the read-only context for one inbound message.
///
/// `None` when the message shape carries no text; there is nothing for the
/// bot to inspect then. Metadata failures propagate to the event loop.
pub async fn derive_context(
    client: &dyn ChatClient,
    owner: &str,
    msg: &InboundMessage,
) -> Result<Option<MessageContext>, ClientError> {
    let Some(text) = msg.content.text() else {
        return Ok(None);
    };

    let is_admin = match &msg.group {
        Some(group) => {
            let meta = client.group_metadata(group).await?;
            meta.participants
                .iter()
                .any(|p| p.is_admin && p.id == msg.sender)
        }
        None => false,
    };

    Ok(Some(MessageContext {
        key: msg.key.clone(),
        chat: msg.chat_id().to_string(),
        sender: msg.sender.clone(),
        text: text.to_string(),
        reply_target: msg.content.reply_target().map(str::to_string),
        is_group: msg.group.is_some(),
        is_admin,
        is_owner: msg.sender == owner,
    }))
}
