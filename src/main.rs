// This is the entry point of the moderation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (transport-agnostic): link policy, warning
//   ledger, command dispatch, the messaging-client capability trait
// - `infra/` = Implementations of core ports (in-memory ledger, JSON
//   credential file, console gateway)
// - `chat/` = Event handling: per-message context derivation, link
//   enforcement, command dispatch
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Connect the gateway and run the event loop

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a handful of mod.rs files that all look the same.
#[path = "chat/chat_layer.rs"]
mod chat;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::chat::events::Bot;
use crate::core::client::{ChatClient, CredentialStore};
use crate::core::commands::CommandService;
use crate::core::config::BotConfig;
use crate::core::moderation::ModerationService;
use crate::infra::console::ConsoleGateway;
use crate::infra::credentials::JsonCredentialStore;
use crate::infra::moderation::InMemoryWarnStore;
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config_path =
        std::env::var("MINIBOT_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = BotConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {config_path}"))?;
    tracing::info!(
        owner = %config.owner,
        warn_limit = config.warn_limit,
        "Configuration loaded"
    );

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Wire the services together. The gateway doubles as the ChatClient and
    // the inbound event feed; a real deployment swaps in an implementation
    // backed by the actual messaging library here.

    let gateway = Arc::new(ConsoleGateway::new());
    let client: Arc<dyn ChatClient> = gateway.clone();

    let moderation = Arc::new(ModerationService::new(
        InMemoryWarnStore::new(),
        config.warn_limit,
    ));
    let commands = Arc::new(CommandService::new(
        Arc::clone(&client),
        Arc::clone(&moderation),
        &config,
    ));
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(JsonCredentialStore::new(&config.creds_path));

    let (tx, rx) = mpsc::channel(64);
    gateway.spawn_stdin_feed(tx);

    let bot = Bot {
        client,
        moderation,
        commands,
        credentials,
        owner: config.owner.clone(),
    };

    println!("🤖 MiniBot console session ready!");
    println!("   Type to chat as the group admin; prefix with 'user:' for the non-admin sender.");

    bot.run(rx).await;
    Ok(())
}
