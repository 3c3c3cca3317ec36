// Applies engine verdicts - translates moderation actions into
// messaging-client calls.

use crate::chat::Error;
use crate::core::client::{mention_name, ChatClient, MessageContext};
use crate::core::moderation::{ModAction, ModerationService, WarnStore};

/// Run the link policy over one message and apply whatever the engine
/// decided. Returns `true` when the message was flagged.
///
/// The delete is best-effort: a failure is logged and the remaining actions
/// still run. Failures of the notice sends and the removal propagate.
pub async fn enforce_link_policy<S: WarnStore>(
    client: &dyn ChatClient,
    moderation: &ModerationService<S>,
    ctx: &MessageContext,
) -> Result<bool, Error> {
    let actions = moderation.evaluate(ctx).await?;
    if actions.is_empty() {
        return Ok(false);
    }

    for action in &actions {
        match action {
            ModAction::DeleteMessage { key } => {
                if let Err(e) = client.delete_message(&ctx.chat, key).await {
                    tracing::warn!("Failed to delete flagged message: {e}");
                }
            }
            ModAction::WarnNotice {
                sender,
                count,
                limit,
            } => {
                let text = format!(
                    "⚠️ @{} sent a link!\nWarning: *{}/{}*",
                    mention_name(sender),
                    count,
                    limit
                );
                client
                    .send_text(&ctx.chat, &text, std::slice::from_ref(sender))
                    .await?;
            }
            ModAction::RemoveParticipant { participant } => {
                client
                    .remove_participants(&ctx.chat, std::slice::from_ref(participant))
                    .await?;
            }
            ModAction::RemovalNotice { participant } => {
                let text = format!(
                    "🚨 @{} removed (max warnings reached)",
                    mention_name(participant)
                );
                client
                    .send_text(&ctx.chat, &text, std::slice::from_ref(participant))
                    .await?;
            }
            // Ordered after the removal: if the removal errored out above,
            // the ledger keeps the count and the next link retries it.
            ModAction::ResetWarnings { participant } => {
                moderation.reset_warnings(participant).await?;
            }
        }
    }

    Ok(true)
}
