//! Enum registry
//!
//! Enum-typed properties and `Enum(type, member)` calls are resolved by
//! name through an ordered list of providers. The first provider that knows
//! a type name wins.

use crate::EnumValue;
use indexmap::IndexMap;
use parking_lot::RwLock;
use policy_expr_diagnostics::{ExprError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Definition of one enumeration type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub type_name: String,
    /// Members in declaration order
    pub members: IndexMap<String, i64>,
    /// Members are bit flags that combine
    #[serde(default)]
    pub flags: bool,
}

impl EnumDefinition {
    pub fn new(type_name: impl Into<String>, flags: bool) -> Self {
        Self {
            type_name: type_name.into(),
            members: IndexMap::new(),
            flags,
        }
    }

    /// Add a member
    pub fn with_member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.insert(name.into(), value);
        self
    }

    /// Parse member text: a member name, a `", "` separated combination of
    /// names, or a number
    pub fn parse(&self, text: &str) -> Result<EnumValue> {
        let trimmed = text.trim();
        if let Ok(number) = trimmed.parse::<i64>() {
            return Ok(self.from_value(number));
        }

        let mut value = 0i64;
        for part in trimmed.split(',') {
            let name = part.trim();
            let member = self.members.get(name).ok_or_else(|| {
                ExprError::invalid_argument(format!(
                    "'{name}' is not a member of {}",
                    self.type_name
                ))
            })?;
            value |= member;
        }
        Ok(self.from_value(value))
    }

    /// Build the enum value for a numeric value, naming it the way the
    /// member list spells it
    pub fn from_value(&self, value: i64) -> EnumValue {
        EnumValue::new(&self.type_name, self.member_text(value), value, self.flags)
    }

    fn member_text(&self, value: i64) -> String {
        if let Some((name, _)) = self.members.iter().find(|(_, v)| **v == value) {
            return name.clone();
        }
        if !self.flags || value == 0 {
            return value.to_string();
        }

        let mut sorted: Vec<(&String, i64)> = self
            .members
            .iter()
            .filter(|(_, v)| **v != 0)
            .map(|(n, v)| (n, *v))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));

        let mut remaining = value;
        let mut names = Vec::new();
        for (name, bits) in sorted {
            if remaining & bits == bits {
                remaining &= !bits;
                names.push((name.as_str(), bits));
            }
        }
        if remaining != 0 {
            return value.to_string();
        }
        names.sort_by_key(|(_, bits)| *bits);
        names
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Source of enum definitions
pub trait EnumProvider: Send + Sync {
    /// Look up a type by its qualified name
    fn resolve(&self, type_name: &str) -> Option<Arc<EnumDefinition>>;
}

/// Provider backed by an in-memory map
#[derive(Debug, Default)]
pub struct StaticEnumProvider {
    definitions: IndexMap<String, Arc<EnumDefinition>>,
}

impl StaticEnumProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, definition: EnumDefinition) -> Self {
        self.definitions
            .insert(definition.type_name.clone(), Arc::new(definition));
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl EnumProvider for StaticEnumProvider {
    fn resolve(&self, type_name: &str) -> Option<Arc<EnumDefinition>> {
        self.definitions.get(type_name).cloned()
    }
}

/// Ordered set of enum providers, shared between engine components
#[derive(Default)]
pub struct EnumRegistry {
    providers: RwLock<Vec<Arc<dyn EnumProvider>>>,
}

impl std::fmt::Debug for EnumRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnumRegistry")
            .field("providers", &self.providers.read().len())
            .finish()
    }
}

impl EnumRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared registry with one provider
    pub fn shared(provider: impl EnumProvider + 'static) -> Arc<Self> {
        let registry = Self::new();
        registry.register(provider);
        Arc::new(registry)
    }

    /// Append a provider; earlier providers take precedence
    pub fn register(&self, provider: impl EnumProvider + 'static) {
        self.providers.write().push(Arc::new(provider));
    }

    /// Find a type definition
    pub fn resolve(&self, type_name: &str) -> Option<Arc<EnumDefinition>> {
        self.providers
            .read()
            .iter()
            .find_map(|p| p.resolve(type_name))
    }

    /// Resolve `member` of `type_name`; unknown types are
    /// `UnsupportedObjectType`
    pub fn parse(&self, type_name: &str, member: &str) -> Result<EnumValue> {
        self.resolve(type_name)
            .ok_or_else(|| ExprError::UnsupportedObjectType {
                type_name: type_name.to_string(),
            })?
            .parse(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permissions() -> EnumDefinition {
        EnumDefinition::new("Demo.Permissions", true)
            .with_member("None", 0)
            .with_member("Read", 1)
            .with_member("Write", 2)
            .with_member("Execute", 4)
    }

    #[test]
    fn test_parse_combination() {
        let value = permissions().parse("Write, Read").unwrap();
        assert_eq!(value.value, 3);
        assert_eq!(value.member, "Read, Write");
        assert!(value.flags);
    }

    #[test]
    fn test_parse_numeric() {
        let def = permissions();
        assert_eq!(def.parse("4").unwrap().member, "Execute");
        assert_eq!(def.parse("0").unwrap().member, "None");
        assert_eq!(def.parse("8").unwrap().member, "8");
        assert!(def.parse("Delete").is_err());
    }

    #[test]
    fn test_registry_order() {
        let registry = EnumRegistry::new();
        registry.register(StaticEnumProvider::new().with_definition(permissions()));
        registry.register(
            StaticEnumProvider::new().with_definition(
                EnumDefinition::new("Demo.Permissions", false).with_member("Other", 9),
            ),
        );
        let resolved = registry.resolve("Demo.Permissions").unwrap();
        assert!(resolved.flags);
        assert!(matches!(
            registry.parse("Demo.Missing", "X"),
            Err(ExprError::UnsupportedObjectType { .. })
        ));
    }

    #[test]
    fn test_definition_from_json() {
        let json = r#"{
            "type_name": "Demo.RecoveryModel",
            "members": { "Full": 1, "BulkLogged": 2, "Simple": 3 }
        }"#;
        let def: EnumDefinition = serde_json::from_str(json).unwrap();
        assert!(!def.flags);
        assert_eq!(def.members.keys().collect::<Vec<_>>(), ["Full", "BulkLogged", "Simple"]);
        assert_eq!(def.parse("Simple").unwrap().value, 3);
    }
}
