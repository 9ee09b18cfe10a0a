//! The bot launcher: validates its configuration, aggregates the intent
//! flags declared by discovered bot directories, builds the handler
//! registry, and starts a gateway session with everything wired up.

pub mod config;
pub mod launcher;

pub use config::{ApiaryConfig, discover_and_load, load_config};
pub use launcher::{
    ClientOptions, DEFAULT_HANDLERS_FOLDER, DEFAULT_INTENTS_FILE, Launcher, LauncherOptions,
};
