// Chat layer - event handling for the connected account: context
// derivation, link enforcement, command dispatch.

#[path = "context.rs"]
pub mod context;

#[path = "events.rs"]
pub mod events;

#[path = "moderation.rs"]
pub mod moderation;

/// Boxed error for the event path. Each event is handled independently, so
/// the loop only ever logs these.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
