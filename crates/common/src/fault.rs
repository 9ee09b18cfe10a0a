//! Process-level fault channel for detached handler tasks.
//!
//! Handlers are invoked without being awaited, so their failures cannot
//! surface to a caller. Instead every spawned invocation routes its outcome
//! to a single [`FaultSink`]:
//!
//! - a handler that returns an error is a *rejection* — logged as a warning,
//!   the process continues;
//! - a handler that panics is a *fatal fault* — logged as an error, the
//!   process exits with status 1.

use std::sync::Arc;

use {
    serde_json::Value,
    tokio::sync::mpsc,
    tracing::{error, warn},
};

use crate::handler::BotHandler;

/// An outcome reported by a detached handler task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Handler returned an error. Recoverable.
    Rejection { handler: String, error: String },
    /// Handler panicked. The monitor terminates the process.
    Fatal { handler: String, error: String },
}

impl Fault {
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

/// Cloneable sender half of the fault channel.
#[derive(Debug, Clone)]
pub struct FaultSink {
    tx: mpsc::UnboundedSender<Fault>,
}

impl FaultSink {
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<Fault>) -> Self {
        Self { tx }
    }

    pub fn rejection(&self, handler: &str, error: impl Into<String>) {
        // A closed monitor means the process is already going down.
        let _ = self.tx.send(Fault::Rejection {
            handler: handler.to_string(),
            error: error.into(),
        });
    }

    pub fn fatal(&self, handler: &str, error: impl Into<String>) {
        let _ = self.tx.send(Fault::Fatal {
            handler: handler.to_string(),
            error: error.into(),
        });
    }

    /// True if both sinks feed the same monitor. Lets tests assert that
    /// repeated launcher starts do not install a second monitor.
    #[must_use]
    pub fn same_channel(&self, other: &FaultSink) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

/// Owns the receiving side of the fault channel and the task that drains it.
pub struct FaultMonitor {
    sink: FaultSink,
}

impl FaultMonitor {
    /// Spawn the monitor loop on the current runtime.
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(fault) = rx.recv().await {
                match fault {
                    Fault::Rejection { handler, error } => {
                        warn!(%handler, %error, "handler rejected, continuing");
                    },
                    Fault::Fatal { handler, error } => {
                        error!(%handler, %error, "unrecoverable handler fault, exiting");
                        std::process::exit(1);
                    },
                }
            }
        });
        Self {
            sink: FaultSink::new(tx),
        }
    }

    #[must_use]
    pub fn sink(&self) -> FaultSink {
        self.sink.clone()
    }
}

/// Invoke `handler` as a detached task, routing its outcome to `faults`.
///
/// The invocation itself runs on one task; a second task awaits the join
/// handle so a panic is observed as a [`Fault::Fatal`] instead of being
/// silently swallowed.
pub fn spawn_routed(handler: Arc<dyn BotHandler>, payload: Value, faults: FaultSink) {
    let name = handler.name().to_string();
    let invocation = tokio::spawn(async move { handler.handle(&payload).await });
    tokio::spawn(async move {
        match invocation.await {
            Ok(Ok(())) => {},
            Ok(Err(e)) => faults.rejection(&name, format!("{e:#}")),
            Err(join_err) if join_err.is_panic() => {
                faults.fatal(&name, join_err.to_string());
            },
            // Cancelled during shutdown; nothing to report.
            Err(_) => {},
        }
    });
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {anyhow::bail, async_trait::async_trait};

    use super::*;

    struct OkHandler;

    #[async_trait]
    impl BotHandler for OkHandler {
        fn name(&self) -> &str {
            "ok"
        }

        async fn handle(&self, _payload: &Value) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl BotHandler for FailingHandler {
        fn name(&self) -> &str {
            "failer"
        }

        async fn handle(&self, _payload: &Value) -> anyhow::Result<()> {
            bail!("boom")
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl BotHandler for PanickingHandler {
        fn name(&self) -> &str {
            "panicker"
        }

        async fn handle(&self, _payload: &Value) -> anyhow::Result<()> {
            panic!("sync fault")
        }
    }

    #[tokio::test]
    async fn handler_error_is_reported_as_rejection() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_routed(
            Arc::new(FailingHandler),
            Value::Null,
            FaultSink::new(tx),
        );
        let fault = rx.recv().await.unwrap();
        match fault {
            Fault::Rejection { handler, error } => {
                assert_eq!(handler, "failer");
                assert!(error.contains("boom"));
            },
            other => panic!("expected Rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn handler_panic_is_reported_as_fatal() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_routed(Arc::new(PanickingHandler), Value::Null, FaultSink::new(tx));
        let fault = rx.recv().await.unwrap();
        assert!(fault.is_fatal());
    }

    #[tokio::test]
    async fn successful_handler_reports_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_routed(Arc::new(OkHandler), Value::Null, FaultSink::new(tx));
        // Channel closes without a fault once the routing task finishes.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn sinks_from_one_channel_compare_equal() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let a = FaultSink::new(tx.clone());
        let b = FaultSink::new(tx);
        let (other_tx, _other_rx) = mpsc::unbounded_channel();
        let c = FaultSink::new(other_tx);
        assert!(a.same_channel(&b));
        assert!(!a.same_channel(&c));
    }
}
