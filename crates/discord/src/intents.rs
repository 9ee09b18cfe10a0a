//! Resolution of declared intent flags to serenity's `GatewayIntents`.

use {serenity::all::GatewayIntents, tracing::warn};

use apiary_common::{IntentFlag, IntentSet};

/// Map a named flag to its gateway intent. Names follow Discord's
/// UPPER_SNAKE spelling.
fn named_intent(name: &str) -> Option<GatewayIntents> {
    let intent = match name {
        "GUILDS" => GatewayIntents::GUILDS,
        "GUILD_MEMBERS" => GatewayIntents::GUILD_MEMBERS,
        "GUILD_MODERATION" => GatewayIntents::GUILD_MODERATION,
        "GUILD_EMOJIS_AND_STICKERS" => GatewayIntents::GUILD_EMOJIS_AND_STICKERS,
        "GUILD_INTEGRATIONS" => GatewayIntents::GUILD_INTEGRATIONS,
        "GUILD_WEBHOOKS" => GatewayIntents::GUILD_WEBHOOKS,
        "GUILD_INVITES" => GatewayIntents::GUILD_INVITES,
        "GUILD_VOICE_STATES" => GatewayIntents::GUILD_VOICE_STATES,
        "GUILD_PRESENCES" => GatewayIntents::GUILD_PRESENCES,
        "GUILD_MESSAGES" => GatewayIntents::GUILD_MESSAGES,
        "GUILD_MESSAGE_REACTIONS" => GatewayIntents::GUILD_MESSAGE_REACTIONS,
        "GUILD_MESSAGE_TYPING" => GatewayIntents::GUILD_MESSAGE_TYPING,
        "DIRECT_MESSAGES" => GatewayIntents::DIRECT_MESSAGES,
        "DIRECT_MESSAGE_REACTIONS" => GatewayIntents::DIRECT_MESSAGE_REACTIONS,
        "DIRECT_MESSAGE_TYPING" => GatewayIntents::DIRECT_MESSAGE_TYPING,
        "MESSAGE_CONTENT" => GatewayIntents::MESSAGE_CONTENT,
        "GUILD_SCHEDULED_EVENTS" => GatewayIntents::GUILD_SCHEDULED_EVENTS,
        "AUTO_MODERATION_CONFIGURATION" => GatewayIntents::AUTO_MODERATION_CONFIGURATION,
        "AUTO_MODERATION_EXECUTION" => GatewayIntents::AUTO_MODERATION_EXECUTION,
        _ => return None,
    };
    Some(intent)
}

/// Union the declared flags into one `GatewayIntents` value.
///
/// Unknown names and unknown raw bits are logged and contribute nothing;
/// the session starts with the flags that did resolve.
#[must_use]
pub fn resolve_intents(set: &IntentSet) -> GatewayIntents {
    let mut intents = GatewayIntents::empty();
    for flag in set.iter() {
        match flag {
            IntentFlag::Named(name) => match named_intent(name) {
                Some(intent) => intents |= intent,
                None => warn!(%name, "unknown intent name, ignoring"),
            },
            IntentFlag::Bits(bits) => match GatewayIntents::from_bits(*bits) {
                Some(intent) => intents |= intent,
                None => warn!(bits, "unknown intent bits, ignoring"),
            },
        }
    }
    intents
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_flags_resolve() {
        let set: IntentSet = [
            IntentFlag::named("guilds"),
            IntentFlag::named("MESSAGE_CONTENT"),
        ]
        .into_iter()
        .collect();
        let intents = resolve_intents(&set);
        assert!(intents.contains(GatewayIntents::GUILDS));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
    }

    #[test]
    fn raw_bits_resolve() {
        let set: IntentSet = [IntentFlag::Bits(GatewayIntents::GUILD_MESSAGES.bits())]
            .into_iter()
            .collect();
        assert!(resolve_intents(&set).contains(GatewayIntents::GUILD_MESSAGES));
    }

    #[test]
    fn unknown_flags_contribute_nothing() {
        let set: IntentSet = [
            IntentFlag::named("NOT_AN_INTENT"),
            IntentFlag::named("GUILDS"),
        ]
        .into_iter()
        .collect();
        assert_eq!(resolve_intents(&set), GatewayIntents::GUILDS);
    }

    #[test]
    fn empty_set_resolves_to_no_intents() {
        assert_eq!(resolve_intents(&IntentSet::new()), GatewayIntents::empty());
    }
}
