//! The handler trait implemented by every event callback a bot
//! contributes, whether discovered on disk or registered natively.

use {anyhow::Result, async_trait::async_trait, serde_json::Value};

/// An event callback contributed by a bot.
///
/// Handlers are fire-and-forget: the dispatcher spawns each invocation as
/// a detached task and never awaits it. A returned `Err` is reported to the
/// process-level fault channel as a recoverable rejection; a panic inside
/// `handle` is reported as a fatal fault.
#[async_trait]
pub trait BotHandler: Send + Sync {
    /// Name used in logs, conventionally `<bot>/<event>`.
    fn name(&self) -> &str;

    /// Handle one emission of the event this handler is registered for.
    /// `payload` is the emission's payload serialized to JSON.
    async fn handle(&self, payload: &Value) -> Result<()>;
}
