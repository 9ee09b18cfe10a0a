//! Bot discovery from the filesystem.
//!
//! Lists the immediate subdirectories of the bots root (one level, no
//! recursion) and collects each bot's declared intents and handler
//! scripts. Directories and files are visited in name order so discovery
//! order is deterministic.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, warn};

use apiary_common::IntentSet;

use crate::{
    error::{Error, Result},
    intents_file::load_intents,
    script_handler::{DEFAULT_SCRIPT_TIMEOUT, ScriptHandler},
};

/// One bot directory's contribution to the launch.
pub struct DiscoveredBot {
    pub name: String,
    pub intents: IntentSet,
    /// `(event name, handler)` pairs in file-name order.
    pub handlers: Vec<(String, Arc<ScriptHandler>)>,
}

/// Discovers bots and their contributions.
pub trait BotDiscoverer {
    /// Scan and return every bot in discovery order.
    fn discover(&self) -> Result<Vec<DiscoveredBot>>;
}

/// Filesystem-backed discoverer following the directory convention.
pub struct FsBotDiscoverer {
    bots_root: PathBuf,
    handlers_folder_name: String,
    intents_file_name: String,
}

impl FsBotDiscoverer {
    pub fn new(
        bots_root: impl Into<PathBuf>,
        handlers_folder_name: impl Into<String>,
        intents_file_name: impl Into<String>,
    ) -> Self {
        Self {
            bots_root: bots_root.into(),
            handlers_folder_name: handlers_folder_name.into(),
            intents_file_name: intents_file_name.into(),
        }
    }

    /// A missing or malformed intents file contributes no flags; only the
    /// offending directory is affected.
    fn bot_intents(&self, bot_dir: &Path) -> IntentSet {
        let path = bot_dir.join(&self.intents_file_name);
        if !path.is_file() {
            warn!(path = %path.display(), "no intents file, contributing no flags");
            return IntentSet::new();
        }
        match load_intents(&path) {
            Ok(intents) => intents,
            Err(e) => {
                warn!(path = %path.display(), %e, "failed to load intents file, ignoring");
                IntentSet::new()
            },
        }
    }

    /// A bot without a handlers folder contributes zero handlers; an
    /// unreadable folder is logged and skipped the same way.
    fn bot_handlers(&self, bot: &str, bot_dir: &Path) -> Vec<(String, Arc<ScriptHandler>)> {
        let dir = bot_dir.join(&self.handlers_folder_name);
        if !dir.is_dir() {
            debug!(path = %dir.display(), "no handlers folder");
            return Vec::new();
        }

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), %e, "failed to list handlers folder, ignoring");
                return Vec::new();
            },
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut handlers = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(event) = path.file_stem().and_then(|s| s.to_str()) else {
                warn!(path = %path.display(), "handler file has no usable name, skipping");
                continue;
            };
            let event = event.to_string();
            let handler =
                ScriptHandler::new(format!("{bot}/{event}"), path, DEFAULT_SCRIPT_TIMEOUT);
            handlers.push((event, Arc::new(handler)));
        }
        handlers
    }
}

impl BotDiscoverer for FsBotDiscoverer {
    fn discover(&self) -> Result<Vec<DiscoveredBot>> {
        let entries = std::fs::read_dir(&self.bots_root)
            .map_err(|e| Error::bots_root_unreadable(&self.bots_root, e))?;

        let mut bot_dirs: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        bot_dirs.sort();

        let mut bots = Vec::with_capacity(bot_dirs.len());
        for bot_dir in bot_dirs {
            let Some(name) = bot_dir.file_name().and_then(|s| s.to_str()) else {
                warn!(path = %bot_dir.display(), "bot directory has no usable name, skipping");
                continue;
            };
            let name = name.to_string();
            let intents = self.bot_intents(&bot_dir);
            let handlers = self.bot_handlers(&name, &bot_dir);
            debug!(
                bot = %name,
                intents = intents.len(),
                handlers = handlers.len(),
                "discovered bot"
            );
            bots.push(DiscoveredBot {
                name,
                intents,
                handlers,
            });
        }
        Ok(bots)
    }
}
