//! The serenity-backed session.

use {
    anyhow::{Context as _, Result},
    async_trait::async_trait,
    serenity::all::Client,
    tracing::{info, warn},
};

use apiary_common::{FaultSink, Gateway, HandlerRegistry, IntentSet};

use crate::{
    forwarder::{EventForwarder, SUPPORTED_EVENTS},
    intents::resolve_intents,
};

/// [`Gateway`] implementation that starts a real Discord session.
#[derive(Debug, Default)]
pub struct DiscordGateway;

impl DiscordGateway {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn start_session(
        &mut self,
        token: &str,
        intents: IntentSet,
        registry: HandlerRegistry,
        faults: FaultSink,
    ) -> Result<()> {
        for event in registry.event_names() {
            if !SUPPORTED_EVENTS.contains(&event) {
                warn!(%event, "no gateway event with this name, handlers will never fire");
            }
        }

        let resolved = resolve_intents(&intents);
        info!(
            intents = ?resolved,
            handlers = registry.handler_count(),
            "starting gateway session"
        );

        let mut client = Client::builder(token, resolved)
            .event_handler(EventForwarder::new(registry, faults))
            .await
            .context("failed to build gateway client")?;

        client
            .start()
            .await
            .context("gateway session ended with an error")
    }
}
