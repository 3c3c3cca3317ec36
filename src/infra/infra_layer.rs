// The infra module contains implementations of core ports.
// Each feature implementation goes in its own submodule.

#[path = "chat/console.rs"]
pub mod console;

#[path = "credentials/json_store.rs"]
pub mod credentials;

#[path = "moderation/warn_store.rs"]
pub mod moderation;
