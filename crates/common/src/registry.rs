//! Event-name → handler-sequence registry built once per launcher start.

use std::{collections::BTreeMap, sync::Arc};

use {serde_json::Value, tracing::debug};

use crate::{
    fault::{FaultSink, spawn_routed},
    handler::BotHandler,
};

/// Reserved event name fired once when the gateway session becomes ready.
pub const READY_EVENT: &str = "ready";

/// Maps event names to the ordered handlers registered for them.
///
/// The [`READY_EVENT`] entry is always present, even when no bot registered
/// a ready handler. Within one event, handlers keep registration order.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Vec<Arc<dyn BotHandler>>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut handlers: BTreeMap<String, Vec<Arc<dyn BotHandler>>> = BTreeMap::new();
        handlers.insert(READY_EVENT.to_string(), Vec::new());
        Self { handlers }
    }

    /// Append a handler to the sequence for `event`.
    pub fn register(&mut self, event: impl Into<String>, handler: Arc<dyn BotHandler>) {
        let event = event.into();
        debug!(%event, handler = handler.name(), "handler registered");
        self.handlers.entry(event).or_default().push(handler);
    }

    /// Handlers registered for `event`, possibly empty.
    #[must_use]
    pub fn handlers_for(&self, event: &str) -> &[Arc<dyn BotHandler>] {
        self.handlers.get(event).map_or(&[], Vec::as_slice)
    }

    /// Every event name with at least one registered handler, plus the
    /// always-present [`READY_EVENT`].
    #[must_use]
    pub fn event_names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Fire every handler registered for `event` with `payload`, each as a
    /// detached task in sequence order. Never blocks on handler work.
    pub fn dispatch_detached(&self, event: &str, payload: &Value, faults: &FaultSink) {
        let handlers = self.handlers_for(event);
        if handlers.is_empty() {
            return;
        }
        debug!(%event, count = handlers.len(), "dispatching event");
        for handler in handlers {
            spawn_routed(Arc::clone(handler), payload.clone(), faults.clone());
        }
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (event, handlers) in &self.handlers {
            map.entry(
                event,
                &handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            );
        }
        map.finish()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use {async_trait::async_trait, tokio::sync::mpsc};

    use super::*;

    struct CountingHandler {
        handler_name: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BotHandler for CountingHandler {
        fn name(&self) -> &str {
            &self.handler_name
        }

        async fn handle(&self, _payload: &Value) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn counting(name: &str) -> (Arc<CountingHandler>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(CountingHandler {
            handler_name: name.to_string(),
            calls: Arc::clone(&calls),
        });
        (handler, calls)
    }

    #[test]
    fn ready_entry_is_always_present() {
        let registry = HandlerRegistry::new();
        assert_eq!(registry.event_names(), vec![READY_EVENT]);
        assert!(registry.handlers_for(READY_EVENT).is_empty());
    }

    #[test]
    fn registration_order_is_preserved_per_event() {
        let mut registry = HandlerRegistry::new();
        let (a, _) = counting("a/message");
        let (b, _) = counting("b/message");
        registry.register("message", a);
        registry.register("message", b);

        let names: Vec<_> = registry
            .handlers_for("message")
            .iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(names, vec!["a/message", "b/message"]);
    }

    #[tokio::test]
    async fn dispatch_invokes_every_handler_exactly_once() {
        let mut registry = HandlerRegistry::new();
        let (a, a_calls) = counting("a/message");
        let (b, b_calls) = counting("b/message");
        registry.register("message", a);
        registry.register("message", b);

        let (tx, _rx) = mpsc::unbounded_channel();
        registry.dispatch_detached("message", &Value::Null, &FaultSink::new(tx));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dispatch_for_unknown_event_is_a_no_op() {
        let registry = HandlerRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.dispatch_detached("typing_start", &Value::Null, &FaultSink::new(tx));
        assert!(rx.try_recv().is_err());
    }
}
