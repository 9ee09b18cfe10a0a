//! The session permission set: gateway intent flags declared by bot
//! directories and by the client options, merged without duplicates.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// A single gateway intent flag, either by name (`"GUILD_MESSAGES"`) or as
/// a raw bit value. Names are normalized to upper snake case on insertion
/// so `"guild_messages"` and `"GUILD_MESSAGES"` collapse to one flag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntentFlag {
    Bits(u64),
    Named(String),
}

impl IntentFlag {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into()).normalized()
    }

    fn normalized(self) -> Self {
        match self {
            Self::Named(name) => Self::Named(name.trim().to_ascii_uppercase()),
            bits @ Self::Bits(_) => bits,
        }
    }
}

impl fmt::Display for IntentFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bits(bits) => write!(f, "{bits}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A deduplicated, order-stable collection of [`IntentFlag`]s.
///
/// Deliberately not deserializable: declaration files parse into
/// `Vec<IntentFlag>` and collect into a set, so every flag passes through
/// the normalizing [`IntentSet::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntentSet(BTreeSet<IntentFlag>);

impl IntentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, flag: IntentFlag) {
        self.0.insert(flag.normalized());
    }

    /// Merge every flag from `other` into this set.
    pub fn union_with(&mut self, other: IntentSet) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn contains(&self, flag: &IntentFlag) -> bool {
        self.0.contains(flag)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntentFlag> {
        self.0.iter()
    }
}

impl FromIterator<IntentFlag> for IntentSet {
    fn from_iter<I: IntoIterator<Item = IntentFlag>>(iter: I) -> Self {
        let mut set = Self::new();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl fmt::Display for IntentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{flag}")?;
            first = false;
        }
        Ok(())
    }
}
