//! Seam between the launcher and the real-time messaging client.

use {anyhow::Result, async_trait::async_trait};

use crate::{fault::FaultSink, intents::IntentSet, registry::HandlerRegistry};

/// The external client that owns the actual network session.
///
/// The launcher never talks to a gateway implementation beyond this one
/// call: everything it resolved (permission set, handler registry, fault
/// sink) is handed over and not retained. The concrete implementation
/// lives in `apiary-discord`; tests substitute a recording mock.
#[async_trait]
pub trait Gateway: Send {
    /// Begin the network session with `token`, wiring every registered
    /// event so each emission invokes that event's handler sequence.
    ///
    /// Runs for the lifetime of the session. Session-level failures are
    /// the implementation's own; the launcher does not interpret them.
    async fn start_session(
        &mut self,
        token: &str,
        intents: IntentSet,
        registry: HandlerRegistry,
        faults: FaultSink,
    ) -> Result<()>;
}
