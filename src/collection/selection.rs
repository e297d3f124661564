use std::collections::HashSet;

use crate::entries::{EntryKey, MsbEntry};

/// Target of a batch operation: a concrete entry or a (unique) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntrySelector {
    Entry(EntryKey),
    Name(String),
}

impl From<&MsbEntry> for EntrySelector {
    fn from(entry: &MsbEntry) -> Self {
        Self::Entry(entry.key())
    }
}

impl From<EntryKey> for EntrySelector {
    fn from(key: EntryKey) -> Self {
        Self::Entry(key)
    }
}

impl From<&str> for EntrySelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for EntrySelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Resolved selection. An empty selector list resolves to `All`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(HashSet<EntryKey>),
}

impl Selection {
    pub fn includes(&self, key: EntryKey) -> bool {
        match self {
            Self::All => true,
            Self::Only(keys) => keys.contains(&key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes() {
        let a = EntryKey::next();
        let b = EntryKey::next();
        assert!(Selection::All.includes(a));
        let only = Selection::Only([a].into_iter().collect());
        assert!(only.includes(a));
        assert!(!only.includes(b));
    }
}
