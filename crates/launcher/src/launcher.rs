//! The launcher itself.
//!
//! Construction validates the token; the fluent `with_*` setters adjust
//! the discovery conventions; [`Launcher::start`] performs the whole
//! sequence: validate, discover bots, merge intents, build the handler
//! registry, install the fault monitor, hand everything to the gateway.

use std::{path::PathBuf, sync::Arc};

use tracing::info;

use {
    apiary_bots::{BotDiscoverer, FsBotDiscoverer},
    apiary_common::{
        BotHandler, Error, FaultMonitor, FaultSink, Gateway, HandlerRegistry, IntentSet, Result,
    },
};

/// Default name of the per-bot handlers folder.
pub const DEFAULT_HANDLERS_FOLDER: &str = "handlers";
/// Default name of the per-bot intents declaration file.
pub const DEFAULT_INTENTS_FILE: &str = "intents.toml";

/// Pass-through options for the gateway client. Serenity's builder takes
/// no opaque options bag, so this reduces to the explicitly declared
/// intent flags merged into the session permission set.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub intents: IntentSet,
}

/// Construction-time options. Only the token is required.
#[derive(Debug, Clone, Default)]
pub struct LauncherOptions {
    pub token: String,
    pub client_options: ClientOptions,
}

/// Discovers bots and starts the gateway session. One-shot: all discovery
/// state is rebuilt on every [`Launcher::start`] call.
pub struct Launcher {
    token: String,
    client_options: ClientOptions,
    bots_root: PathBuf,
    handlers_folder_name: String,
    intents_file_name: String,
    native_handlers: Vec<(String, Arc<dyn BotHandler>)>,
    faults: Option<FaultSink>,
}

impl Launcher {
    /// Fails with [`Error::MissingToken`] before reading any other field.
    pub fn new(options: LauncherOptions) -> Result<Self> {
        if options.token.trim().is_empty() {
            return Err(Error::MissingToken);
        }
        Ok(Self {
            token: options.token,
            client_options: options.client_options,
            bots_root: PathBuf::new(),
            handlers_folder_name: DEFAULT_HANDLERS_FOLDER.to_string(),
            intents_file_name: DEFAULT_INTENTS_FILE.to_string(),
            native_handlers: Vec::new(),
            faults: None,
        })
    }

    #[must_use]
    pub fn with_bots_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.bots_root = path.into();
        self
    }

    #[must_use]
    pub fn with_handlers_folder_name(mut self, name: impl Into<String>) -> Self {
        self.handlers_folder_name = name.into();
        self
    }

    #[must_use]
    pub fn with_intents_file_name(mut self, name: impl Into<String>) -> Self {
        self.intents_file_name = name.into();
        self
    }

    /// Register an in-process handler for `event`. Native handlers come
    /// before any discovered script handlers in that event's sequence.
    #[must_use]
    pub fn register_handler(mut self, event: impl Into<String>, handler: Arc<dyn BotHandler>) -> Self {
        self.native_handlers.push((event.into(), handler));
        self
    }

    #[must_use]
    pub fn bots_root(&self) -> &PathBuf {
        &self.bots_root
    }

    #[must_use]
    pub fn handlers_folder_name(&self) -> &str {
        &self.handlers_folder_name
    }

    #[must_use]
    pub fn intents_file_name(&self) -> &str {
        &self.intents_file_name
    }

    #[must_use]
    pub fn client_options(&self) -> &ClientOptions {
        &self.client_options
    }

    /// Sink of the fault monitor, once a start has installed it.
    #[must_use]
    pub fn fault_sink(&self) -> Option<&FaultSink> {
        self.faults.as_ref()
    }

    /// Every missing field is reported in one aggregated error; no check
    /// short-circuits the others.
    fn validate(&self) -> Result<()> {
        let mut messages = Vec::new();
        if self.bots_root.as_os_str().is_empty() {
            messages.push("a bots root path must be set".to_string());
        }
        if self.handlers_folder_name.is_empty() {
            messages.push("a handlers folder name must be set".to_string());
        }
        if self.intents_file_name.is_empty() {
            messages.push("an intents file name must be set".to_string());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_config(&messages))
        }
    }

    /// Validate, discover, and start the session on `gateway`.
    ///
    /// Validation failures return before any filesystem or network work.
    /// The fault monitor is installed on the first start and reused by
    /// every later one. Runs for the lifetime of the gateway session.
    pub async fn start<G: Gateway>(&mut self, gateway: &mut G) -> anyhow::Result<()> {
        self.validate()?;

        let discoverer = FsBotDiscoverer::new(
            &self.bots_root,
            self.handlers_folder_name.as_str(),
            self.intents_file_name.as_str(),
        );
        let bots = discoverer.discover()?;

        let mut intents = self.client_options.intents.clone();
        let mut registry = HandlerRegistry::new();
        for (event, handler) in &self.native_handlers {
            registry.register(event.clone(), Arc::clone(handler));
        }
        for bot in bots {
            info!(
                bot = %bot.name,
                intents = bot.intents.len(),
                handlers = bot.handlers.len(),
                "registering bot"
            );
            intents.union_with(bot.intents);
            for (event, handler) in bot.handlers {
                registry.register(event, handler);
            }
        }

        info!(
            bots_root = %self.bots_root.display(),
            intents = %intents,
            handlers = registry.handler_count(),
            "launch resolved"
        );

        let faults = match &self.faults {
            Some(sink) => sink.clone(),
            None => {
                let monitor = FaultMonitor::spawn();
                let sink = monitor.sink();
                self.faults = Some(sink.clone());
                sink
            },
        };

        gateway
            .start_session(&self.token, intents, registry, faults)
            .await
    }
}
