//! Launcher configuration file.
//!
//! ```toml
//! token           = "${APIARY_TOKEN}"
//! bots_root       = "./bots"
//! handlers_folder = "handlers"
//! intents_file    = "intents.toml"
//! intents         = ["GUILDS"]
//! ```
//!
//! `${ENV_VAR}` placeholders are substituted from the environment before
//! parsing; unresolved placeholders are left as-is.

use std::path::{Path, PathBuf};

use {
    serde::Deserialize,
    tracing::{debug, warn},
};

use apiary_common::IntentFlag;

use crate::launcher::{ClientOptions, Launcher, LauncherOptions};

const CONFIG_FILENAME: &str = "apiary.toml";

/// On-disk configuration, all fields optional; the launcher supplies the
/// convention defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiaryConfig {
    pub token: Option<String>,
    pub bots_root: Option<PathBuf>,
    pub handlers_folder: Option<String>,
    pub intents_file: Option<String>,
    /// Flags declared directly by the deployment, merged with every
    /// bot directory's declarations.
    pub intents: Vec<IntentFlag>,
}

impl ApiaryConfig {
    /// Build a [`Launcher`] from this config. Fails if no token is set.
    pub fn into_launcher(self) -> apiary_common::Result<Launcher> {
        let mut launcher = Launcher::new(LauncherOptions {
            token: self.token.unwrap_or_default(),
            client_options: ClientOptions {
                intents: self.intents.into_iter().collect(),
            },
        })?;
        if let Some(root) = self.bots_root {
            launcher = launcher.with_bots_root(root);
        }
        if let Some(folder) = self.handlers_folder {
            launcher = launcher.with_handlers_folder_name(folder);
        }
        if let Some(file) = self.intents_file {
            launcher = launcher.with_intents_file_name(file);
        }
        Ok(launcher)
    }
}

/// Load config from `path`.
pub fn load_config(path: &Path) -> anyhow::Result<ApiaryConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./apiary.toml` (project-local)
/// 2. `~/.config/apiary/apiary.toml` (user-global)
///
/// Returns `ApiaryConfig::default()` if no config file is found or the
/// found file fails to load.
#[must_use]
pub fn discover_and_load() -> ApiaryConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    ApiaryConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "apiary") {
        let global = dirs.config_dir().join(CONFIG_FILENAME);
        if global.exists() {
            return Some(global);
        }
    }
    None
}

/// Replace `${ENV_VAR}` placeholders in the raw config text.
fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if closed && !var_name.is_empty() {
                match lookup(&var_name) {
                    Some(val) => result.push_str(&val),
                    None => {
                        // Leave unresolved placeholder as-is.
                        result.push_str("${");
                        result.push_str(&var_name);
                        result.push('}');
                    },
                }
            } else {
                // Malformed, emit literal.
                result.push_str("${");
                result.push_str(&var_name);
            }
        } else {
            result.push(ch);
        }
    }

    result
}
