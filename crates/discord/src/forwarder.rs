//! Forwards serenity gateway events to the handler registry.
//!
//! One forwarder is installed per session. Each supported gateway event is
//! serialized to JSON and dispatched to every handler registered under that
//! event's name, fire-and-forget. The `ready` sequence runs at most once
//! per process no matter how often the gateway re-emits ready (serenity
//! emits it again on every reconnect and per shard).

use std::sync::atomic::{AtomicBool, Ordering};

use {
    serde_json::Value,
    serenity::all::{
        ChannelId, Context, EventHandler, Guild, GuildId, Interaction, Member, Message,
        MessageId, MessageUpdateEvent, Reaction, Ready,
    },
    tracing::{info, warn},
};

use apiary_common::{FaultSink, HandlerRegistry, READY_EVENT};

/// Gateway events the forwarder knows how to deliver. Handler files named
/// anything else never fire; the gateway warns about them at start.
pub const SUPPORTED_EVENTS: &[&str] = &[
    READY_EVENT,
    "message",
    "message_update",
    "message_delete",
    "reaction_add",
    "reaction_remove",
    "guild_create",
    "guild_member_addition",
    "interaction_create",
];

pub struct EventForwarder {
    registry: HandlerRegistry,
    faults: FaultSink,
    ready_fired: AtomicBool,
}

impl EventForwarder {
    #[must_use]
    pub fn new(registry: HandlerRegistry, faults: FaultSink) -> Self {
        Self {
            registry,
            faults,
            ready_fired: AtomicBool::new(false),
        }
    }

    fn dispatch(&self, event: &str, payload: &Value) {
        self.registry.dispatch_detached(event, payload, &self.faults);
    }

    /// Fire the aggregated ready sequence, at most once per forwarder.
    fn fire_ready(&self, payload: &Value) {
        if self.ready_fired.swap(true, Ordering::SeqCst) {
            return;
        }
        self.dispatch(READY_EVENT, payload);
    }

    fn to_payload<T: serde::Serialize>(event: &str, value: &T) -> Value {
        match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%event, %e, "failed to serialize event payload, passing null");
                Value::Null
            },
        }
    }
}

#[serenity::async_trait]
impl EventHandler for EventForwarder {
    async fn ready(&self, _ctx: Context, data_about_bot: Ready) {
        info!(
            bot_name = %data_about_bot.user.name,
            guilds = data_about_bot.guilds.len(),
            "gateway session ready"
        );
        self.fire_ready(&Self::to_payload(READY_EVENT, &data_about_bot));
    }

    async fn message(&self, _ctx: Context, new_message: Message) {
        self.dispatch("message", &Self::to_payload("message", &new_message));
    }

    async fn message_update(
        &self,
        _ctx: Context,
        _old_if_available: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        self.dispatch("message_update", &Self::to_payload("message_update", &event));
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        guild_id: Option<GuildId>,
    ) {
        let payload = serde_json::json!({
            "channel_id": channel_id,
            "message_id": deleted_message_id,
            "guild_id": guild_id,
        });
        self.dispatch("message_delete", &payload);
    }

    async fn reaction_add(&self, _ctx: Context, add_reaction: Reaction) {
        self.dispatch("reaction_add", &Self::to_payload("reaction_add", &add_reaction));
    }

    async fn reaction_remove(&self, _ctx: Context, removed_reaction: Reaction) {
        self.dispatch(
            "reaction_remove",
            &Self::to_payload("reaction_remove", &removed_reaction),
        );
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        self.dispatch("guild_create", &Self::to_payload("guild_create", &guild));
    }

    async fn guild_member_addition(&self, _ctx: Context, new_member: Member) {
        self.dispatch(
            "guild_member_addition",
            &Self::to_payload("guild_member_addition", &new_member),
        );
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        self.dispatch(
            "interaction_create",
            &Self::to_payload("interaction_create", &interaction),
        );
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use {async_trait::async_trait, tokio::sync::mpsc};

    use apiary_common::BotHandler;

    use super::*;

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BotHandler for CountingHandler {
        fn name(&self) -> &str {
            "counter"
        }

        async fn handle(&self, _payload: &Value) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn forwarder_with_ready_counter() -> (EventForwarder, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(
            READY_EVENT,
            Arc::new(CountingHandler {
                calls: Arc::clone(&calls),
            }),
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        (EventForwarder::new(registry, FaultSink::new(tx)), calls)
    }

    #[tokio::test]
    async fn ready_sequence_fires_at_most_once() {
        let (forwarder, calls) = forwarder_with_ready_counter();

        forwarder.fire_ready(&Value::Null);
        forwarder.fire_ready(&Value::Null);
        forwarder.fire_ready(&Value::Null);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_events_fire_every_emission() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(
            "message",
            Arc::new(CountingHandler {
                calls: Arc::clone(&calls),
            }),
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        let forwarder = EventForwarder::new(registry, FaultSink::new(tx));

        forwarder.dispatch("message", &Value::Null);
        forwarder.dispatch("message", &Value::Null);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn message_payloads_are_not_filtered_by_author() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(
            "message",
            Arc::new(CountingHandler {
                calls: Arc::clone(&calls),
            }),
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        let forwarder = EventForwarder::new(registry, FaultSink::new(tx));

        let from_bot = serde_json::json!({ "content": "hi", "author": { "bot": true } });
        let from_user = serde_json::json!({ "content": "hi", "author": { "bot": false } });
        forwarder.dispatch("message", &from_bot);
        forwarder.dispatch("message", &from_user);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn ready_is_a_supported_event() {
        assert!(SUPPORTED_EVENTS.contains(&READY_EVENT));
    }
}
