//! Convention-based bot discovery.
//!
//! Every immediate subdirectory of the configured bots root is a bot. A bot
//! may declare gateway intents in a TOML file (default `intents.toml`) and
//! contribute per-event handler scripts in a handlers subfolder (default
//! `handlers/`), where each script's file stem names the gateway event it
//! handles. Both contributions are optional; a missing or malformed file is
//! a per-directory warning, never a launch failure.

pub mod discovery;
pub mod error;
pub mod intents_file;
pub mod script_handler;

pub use discovery::{BotDiscoverer, DiscoveredBot, FsBotDiscoverer};
pub use error::{Error, Result};
pub use script_handler::ScriptHandler;
