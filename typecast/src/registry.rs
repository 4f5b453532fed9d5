// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Registry of named types and their capabilities
//!
//! The guessing engine needs to answer questions a reflective runtime would
//! resolve with introspection: is this value an instance of that class, is
//! the class traversable, can it be rebuilt from a field map. Here those
//! answers come from explicit registrations instead.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Capabilities and ancestry of a named type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Direct supertypes (parent classes and implemented interfaces)
    pub parents: Vec<String>,
    /// The type can be iterated element-by-element
    pub traversable: bool,
    /// The type has a textual conversion
    pub stringable: bool,
    /// The type represents a date/time and can be built from a date string
    pub date_like: bool,
    /// Instances can be reconstructed from a field map
    pub from_state: bool,
}

/// Named-type registry backing instance and subtype checks
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, TypeInfo>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry with the built-in `DateTime` type registered
    pub fn new() -> Self {
        let mut registry = Self {
            types: HashMap::new(),
        };

        registry.register(
            "DateTime",
            TypeInfo {
                date_like: true,
                stringable: true,
                ..Default::default()
            },
        );

        registry
    }

    /// Register a named type
    pub fn register(&mut self, name: impl Into<String>, info: TypeInfo) {
        self.types.insert(name.into(), info);
    }

    /// Look up a registered type
    pub fn lookup(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    /// Check if a type name is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Check if the named type is traversable
    pub fn is_traversable(&self, name: &str) -> bool {
        self.lookup(name).map_or(false, |info| info.traversable)
    }

    /// Check if the named type has a textual conversion
    pub fn is_stringable(&self, name: &str) -> bool {
        self.lookup(name).map_or(false, |info| info.stringable)
    }

    /// Check if the named type represents a date/time
    pub fn is_date_like(&self, name: &str) -> bool {
        self.lookup(name).map_or(false, |info| info.date_like)
    }

    /// Check if the named type supports reconstruction from a field map
    pub fn has_from_state(&self, name: &str) -> bool {
        self.lookup(name).map_or(false, |info| info.from_state)
    }

    /// Check if `name` is `ancestor` or transitively derives from it
    pub fn is_subtype(&self, name: &str, ancestor: &str) -> bool {
        if name == ancestor {
            return true;
        }

        match self.lookup(name) {
            Some(info) => info
                .parents
                .iter()
                .any(|parent| self.is_subtype(parent, ancestor)),
            None => false,
        }
    }

    /// Check if a value is an instance of the named type, directly or through
    /// its ancestry
    pub fn is_instance(&self, value: &Value, name: &str) -> bool {
        match value.class_name() {
            Some(class) => self.is_subtype(class, name),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectValue;
    use std::collections::BTreeMap;

    fn registry_with_hierarchy() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register("Base", TypeInfo::default());
        registry.register(
            "Derived",
            TypeInfo {
                parents: vec!["Base".to_string()],
                ..Default::default()
            },
        );
        registry.register(
            "Grandchild",
            TypeInfo {
                parents: vec!["Derived".to_string()],
                ..Default::default()
            },
        );
        registry
    }

    #[test]
    fn test_subtype_transitivity() {
        let registry = registry_with_hierarchy();

        assert!(registry.is_subtype("Derived", "Base"));
        assert!(registry.is_subtype("Grandchild", "Base"));
        assert!(registry.is_subtype("Base", "Base"));
        assert!(!registry.is_subtype("Base", "Derived"));
        assert!(!registry.is_subtype("Unknown", "Base"));
    }

    #[test]
    fn test_instance_check() {
        let registry = registry_with_hierarchy();
        let value = Value::Object(ObjectValue::instance("Grandchild", BTreeMap::new()));

        assert!(registry.is_instance(&value, "Base"));
        assert!(registry.is_instance(&value, "Grandchild"));
        assert!(!registry.is_instance(&value, "Unrelated"));
        assert!(!registry.is_instance(&Value::Integer(1), "Base"));
    }

    #[test]
    fn test_builtin_datetime() {
        let registry = TypeRegistry::new();

        assert!(registry.is_date_like("DateTime"));
        assert!(registry.is_stringable("DateTime"));
        assert!(!registry.is_traversable("DateTime"));
    }
}
