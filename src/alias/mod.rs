//! Path alias resolution
//!
//! Sites often publish a page under a friendly alias (`/new-events`) while it
//! lives at a canonical internal path (`/node/5`). Protection has to hold no
//! matter which form a visitor requests, so the gate resolves every request
//! path to its public alias form before matching, and rule validation checks
//! both forms for duplicates.

use std::collections::HashMap;

/// Bidirectional alias lookup. Implementations are pure and infallible: a
/// path without an alias maps to itself.
pub trait AliasResolver: Send + Sync {
    /// Public alias for a canonical path (identity if none registered).
    fn alias_of(&self, path: &str) -> String;

    /// Canonical path behind an alias (identity if none registered).
    fn canonical_of(&self, path: &str) -> String;
}

/// Alias table loaded from configuration, mapping alias -> canonical path.
#[derive(Debug, Default)]
pub struct StaticAliases {
    to_canonical: HashMap<String, String>,
    to_alias: HashMap<String, String>,
}

impl StaticAliases {
    /// Build from an `alias -> canonical` map. Lookups are case-insensitive;
    /// both sides are lowercased on construction.
    pub fn new(aliases: &HashMap<String, String>) -> Self {
        let mut to_canonical = HashMap::new();
        let mut to_alias = HashMap::new();
        for (alias, canonical) in aliases {
            let alias = alias.to_lowercase();
            let canonical = canonical.to_lowercase();
            to_alias.insert(canonical.clone(), alias.clone());
            to_canonical.insert(alias, canonical);
        }
        Self {
            to_canonical,
            to_alias,
        }
    }
}

impl AliasResolver for StaticAliases {
    fn alias_of(&self, path: &str) -> String {
        let key = path.to_lowercase();
        self.to_alias.get(&key).cloned().unwrap_or(key)
    }

    fn canonical_of(&self, path: &str) -> String {
        let key = path.to_lowercase();
        self.to_canonical.get(&key).cloned().unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> StaticAliases {
        let mut map = HashMap::new();
        map.insert("/new-events".to_string(), "/node/5".to_string());
        StaticAliases::new(&map)
    }

    #[test]
    fn test_alias_round_trip() {
        let aliases = resolver();
        assert_eq!(aliases.alias_of("/node/5"), "/new-events");
        assert_eq!(aliases.canonical_of("/new-events"), "/node/5");
    }

    #[test]
    fn test_unmapped_path_is_identity() {
        let aliases = resolver();
        assert_eq!(aliases.alias_of("/about"), "/about");
        assert_eq!(aliases.canonical_of("/about"), "/about");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let aliases = resolver();
        assert_eq!(aliases.alias_of("/Node/5"), "/new-events");
        assert_eq!(aliases.canonical_of("/New-Events"), "/node/5");
    }
}
