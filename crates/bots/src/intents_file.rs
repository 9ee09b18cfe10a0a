//! Per-bot intents declaration file.
//!
//! ```toml
//! intents = ["GUILDS", "GUILD_MESSAGES", 32768]
//! ```

use std::path::Path;

use serde::Deserialize;

use apiary_common::{IntentFlag, IntentSet};

use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
struct IntentsFile {
    #[serde(default)]
    intents: Vec<IntentFlag>,
}

/// Parse a TOML intents declaration into a deduplicated set.
pub fn parse_intents(raw: &str) -> Result<IntentSet> {
    let file: IntentsFile = toml::from_str(raw)?;
    Ok(file.intents.into_iter().collect())
}

/// Load and parse the intents file at `path`.
pub fn load_intents(path: &Path) -> Result<IntentSet> {
    let raw = std::fs::read_to_string(path)?;
    parse_intents(&raw)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_numeric_flags() {
        let set = parse_intents(r#"intents = ["guilds", "MESSAGE_CONTENT", 512]"#).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&IntentFlag::named("GUILDS")));
        assert!(set.contains(&IntentFlag::named("MESSAGE_CONTENT")));
        assert!(set.contains(&IntentFlag::Bits(512)));
    }

    #[test]
    fn duplicate_declarations_collapse() {
        let set = parse_intents(r#"intents = [512, 512, "guilds", "GUILDS"]"#).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn missing_intents_key_is_empty() {
        let set = parse_intents("").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_intents("intents = not-a-list").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_intents(Path::new("/nonexistent/intents.toml")).is_err());
    }
}
