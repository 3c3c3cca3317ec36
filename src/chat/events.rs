// The event loop.
//
// The client library delivers events serially; one event is fully handled
// (context derivation, then link enforcement, then command dispatch) before
// the next is taken off the channel. That serialization is what lets the
// warning ledger and the anti-link flag go unguarded.

use crate::chat::context::derive_context;
use crate::chat::moderation::enforce_link_policy;
use crate::chat::Error;
use crate::core::client::{ChatClient, ClientEvent, CredentialStore};
use crate::core::commands::CommandService;
use crate::core::moderation::{ModerationService, WarnStore};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Everything the event path needs, wired once in main.
pub struct Bot<S: WarnStore> {
    pub client: Arc<dyn ChatClient>,
    pub moderation: Arc<ModerationService<S>>,
    pub commands: Arc<CommandService<S>>,
    pub credentials: Arc<dyn CredentialStore>,
    pub owner: String,
}

impl<S: WarnStore> Bot<S> {
    /// Drain the event channel until the client side closes it. Errors are
    /// logged per event; a bad event never takes the process down.
    pub async fn run(&self, mut events: mpsc::Receiver<ClientEvent>) {
        while let Some(event) = events.recv().await {
            if let Err(e) = self.handle_event(event).await {
                tracing::error!("Error handling client event: {e}");
            }
        }
        tracing::info!("Event stream closed, shutting down");
    }

    pub async fn handle_event(&self, event: ClientEvent) -> Result<(), Error> {
        match event {
            ClientEvent::CredentialsUpdate(creds) => {
                self.credentials.save(&creds).await?;
                tracing::debug!("Session credentials persisted");
            }
            ClientEvent::Message(msg) => {
                let Some(ctx) =
                    derive_context(self.client.as_ref(), &self.owner, &msg).await?
                else {
                    return Ok(());
                };

                // Link policy first, on every message, command or not.
                enforce_link_policy(self.client.as_ref(), &self.moderation, &ctx).await?;

                self.commands.dispatch(&ctx).await?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
