//! Resolved per-type descriptors
//!
//! A descriptor is the immutable output of the resolver: the canonical
//! property list, the per-level property subsets, the full alias table and
//! the bound accessor method names. Descriptors are plain serializable data
//! so they can be persisted through the external cache service; the accessor
//! *functions* stay in the process-local [`AccessorTable`].
//!
//! [`AccessorTable`]: crate::schema::AccessorTable

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::statement::LEVEL_ALL;

/// The resolved, immutable schema of one type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Type name this descriptor was resolved for.
    pub class_name: String,

    /// Canonical property names, declaration order. Always equal to the
    /// "all" level's set.
    pub properties: Vec<String>,

    /// Level name -> property subset. Each declared level's set is the union
    /// of its direct properties and the for-all properties. Levels with no
    /// directly-declared property are omitted; lookups for them fall back to
    /// "all" at export time.
    pub levels: IndexMap<String, Vec<String>>,

    /// Full alias table: identity over `properties` overlaid with the
    /// explicit alias declarations (explicit wins on conflict).
    pub aliases: IndexMap<String, String>,

    /// Only the explicit alias declarations.
    pub aliases_different: IndexMap<String, String>,

    /// Property-or-alias -> bound getter method name.
    pub getters: IndexMap<String, String>,

    /// Property-or-alias -> bound setter method name.
    pub setters: IndexMap<String, String>,

    /// Level used by exports when the caller passes none.
    pub default_level: String,
}

impl Descriptor {
    /// Descriptor of a type with no declarations: every key is accepted
    /// dynamically, no getters or setters, no levels.
    pub fn empty(class_name: &str) -> Self {
        Descriptor {
            class_name: class_name.to_string(),
            default_level: LEVEL_ALL.to_string(),
            ..Descriptor::default()
        }
    }

    /// True when the type declared nothing.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.aliases_different.is_empty()
    }

    /// Resolve a key through the alias table; unknown keys resolve to
    /// themselves.
    pub fn resolve_alias<'a>(&'a self, key: &'a str) -> &'a str {
        self.aliases.get(key).map(String::as_str).unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_descriptor() {
        let d = Descriptor::empty("Thing");
        assert_eq!(d.class_name, "Thing");
        assert!(d.is_empty());
        assert_eq!(d.default_level, LEVEL_ALL);
        assert_eq!(d.resolve_alias("anything"), "anything");
    }

    #[test]
    fn test_descriptor_json_round_trip() {
        let mut d = Descriptor::empty("Customer");
        d.properties = vec!["id".into(), "name".into()];
        d.levels
            .insert(LEVEL_ALL.to_string(), vec!["id".into(), "name".into()]);
        d.aliases.insert("id".into(), "id".into());
        d.aliases.insert("name".into(), "name".into());
        d.aliases.insert("identifier".into(), "id".into());
        d.aliases_different.insert("identifier".into(), "id".into());
        d.getters.insert("name".into(), "getname".into());

        let json = serde_json::to_string(&d).unwrap();
        let back: Descriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
        assert_eq!(back.resolve_alias("identifier"), "id");
    }
}
