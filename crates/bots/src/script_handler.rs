//! Script-backed handler that executes a discovered handler file.
//!
//! Each invocation spawns the script as a child process, passes the event
//! payload as JSON on stdin, and waits (under a timeout) for it to exit.
//! Exit 0 is success; anything else is an error, which the dispatcher
//! reports to the fault channel as a recoverable rejection.

use std::{path::PathBuf, time::Duration};

use {
    anyhow::{Context, Result, bail},
    async_trait::async_trait,
    serde_json::Value,
    tokio::{io::AsyncWriteExt, process::Command},
    tracing::debug,
};

use apiary_common::BotHandler;

/// Default per-invocation timeout for handler scripts.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

/// A handler whose callback is an executable file on disk.
pub struct ScriptHandler {
    handler_name: String,
    path: PathBuf,
    timeout: Duration,
}

impl ScriptHandler {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            handler_name: name.into(),
            path: path.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl BotHandler for ScriptHandler {
    fn name(&self) -> &str {
        &self.handler_name
    }

    async fn handle(&self, payload: &Value) -> Result<()> {
        let payload_json =
            serde_json::to_string(payload).context("failed to serialize event payload")?;

        debug!(
            handler = %self.handler_name,
            path = %self.path.display(),
            payload_len = payload_json.len(),
            "spawning handler script"
        );

        let mut child = Command::new(&self.path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn handler script {}", self.path.display()))?;

        // Write payload to stdin (ignore broken pipe if the script doesn't read it).
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(payload_json.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .with_context(|| {
                format!(
                    "handler '{}' timed out after {:?}",
                    self.handler_name, self.timeout
                )
            })?
            .with_context(|| format!("handler '{}' failed to complete", self.handler_name))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "handler '{}' exited with {}: {}",
                self.handler_name,
                output.status,
                stderr.trim()
            );
        }

        Ok(())
    }
}
