//! Facet declarations
//!
//! A facet is the declared property set of a kind of target object. Attributes
//! built against a facet take their type class from the declared property.

use indexmap::IndexMap;
use policy_expr_types::DeclaredType;
use serde::{Deserialize, Serialize};

/// Declared property set of a target object kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub name: String,
    #[serde(default)]
    pub properties: IndexMap<String, DeclaredType>,
}

impl Facet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Declare a property
    pub fn with_property(mut self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.properties.insert(name.into(), declared);
        self
    }

    /// Declared type of a property, matched case-sensitively
    pub fn property(&self, name: &str) -> Option<&DeclaredType> {
        self.properties.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_json() {
        let json = r#"{
            "name": "Database",
            "properties": {
                "Name": { "kind": "String" },
                "Size": { "kind": "Double" },
                "RecoveryModel": { "kind": "Enum", "type_name": "RecoveryModel" }
            }
        }"#;
        let facet: Facet = serde_json::from_str(json).unwrap();
        assert_eq!(facet.name, "Database");
        assert_eq!(facet.property("Size"), Some(&DeclaredType::Double));
        assert!(facet.property("size").is_none());
        assert_eq!(
            facet.properties.keys().collect::<Vec<_>>(),
            vec!["Name", "Size", "RecoveryModel"]
        );
    }
}
