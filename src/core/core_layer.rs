// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "client.rs"]
pub mod client;

#[path = "commands/mod.rs"]
pub mod commands;

#[path = "config.rs"]
pub mod config;

#[path = "moderation/mod.rs"]
pub mod moderation;
