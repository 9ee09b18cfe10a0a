//! Serenity-backed implementation of the gateway seam.
//!
//! Resolves the launcher's permission set to [`serenity`] gateway intents,
//! forwards gateway events to the handler registry, and owns the actual
//! network session (serenity handles auth, heartbeat, reconnection, and
//! rate limiting).

pub mod forwarder;
pub mod gateway;
pub mod intents;

pub use forwarder::{EventForwarder, SUPPORTED_EVENTS};
pub use gateway::DiscordGateway;
pub use intents::resolve_intents;
