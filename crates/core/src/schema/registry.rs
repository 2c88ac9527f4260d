//! Process-local registry of declared schemas
//!
//! Maps a type name to its declaration blocks and accessor table. The
//! registry is an injected collaborator (the engine owns one), read-mostly
//! after startup registration; `DashMap` covers the multi-threaded host
//! case, where a first-registration race is harmless because registration
//! is idempotent.

use std::sync::Arc;

use dashmap::DashMap;

use super::accessor::AccessorTable;
use super::statement::DeclarationBlock;
use super::ViewSchema;

/// Snapshot of one type's declarations.
#[derive(Debug, Clone)]
pub struct RegisteredSchema {
    pub class_name: String,
    pub default_level: String,
    pub declarations: Vec<DeclarationBlock>,
    pub accessors: AccessorTable,
}

/// Type name -> registered schema.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: DashMap<String, Arc<RegisteredSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema type; a second registration of the same name is a
    /// no-op and returns the existing entry.
    pub fn register<T: ViewSchema>(&self) -> Arc<RegisteredSchema> {
        let name = T::class_name();
        if let Some(existing) = self.entries.get(name) {
            return existing.clone();
        }
        let entry = Arc::new(RegisteredSchema {
            class_name: name.to_string(),
            default_level: T::default_level(),
            declarations: T::declarations(),
            accessors: T::accessors(),
        });
        self.entries.insert(name.to_string(), entry.clone());
        entry
    }

    pub fn get(&self, class_name: &str) -> Option<Arc<RegisteredSchema>> {
        self.entries.get(class_name).map(|e| e.clone())
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.entries.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::statement::LEVEL_ALL;

    struct Customer;

    impl ViewSchema for Customer {
        fn class_name() -> &'static str {
            "Customer"
        }

        fn declarations() -> Vec<DeclarationBlock> {
            vec![DeclarationBlock::new().property("id").property("name")]
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = SchemaRegistry::new();
        let first = registry.register::<Customer>();
        let second = registry.register::<Customer>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Customer"));
    }

    #[test]
    fn test_defaults_come_from_trait() {
        let registry = SchemaRegistry::new();
        let entry = registry.register::<Customer>();
        assert_eq!(entry.default_level, LEVEL_ALL);
        assert!(entry.accessors.is_empty());
        assert_eq!(entry.declarations.len(), 1);
    }

    #[test]
    fn test_get_unknown_is_none() {
        let registry = SchemaRegistry::new();
        assert!(registry.get("Nope").is_none());
    }
}
