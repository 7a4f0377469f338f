//! Loading conditions, facets, properties and enum definitions

use crate::eval::{EngineSettings, PropertyBag, value_from_json};
use crate::filter::FilterConverter;
use crate::types::{EnumDefinition, EnumRegistry, StaticEnumProvider, Value};
use crate::xml::ExpressionReader;
use crate::{ExpressionNode, Facet};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a command takes its condition from
#[derive(Debug, Clone, Default)]
pub struct ConditionSource {
    /// Condition in filter text
    pub condition: Option<String>,
    /// File holding an XML document or filter text
    pub file: Option<PathBuf>,
}

/// Everything a command needs to build and evaluate a condition
#[derive(Debug, Clone, Default)]
pub struct InputConfig {
    pub source: ConditionSource,
    pub facet: Option<PathBuf>,
    pub enums: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub props: Vec<String>,
    pub props_file: Option<PathBuf>,
}

/// Loaded inputs
pub struct Inputs {
    pub condition: ExpressionNode,
    pub enums: Arc<EnumRegistry>,
    pub settings: EngineSettings,
    pub properties: PropertyBag,
}

impl InputConfig {
    /// Load every input, building the condition last
    pub fn load(&self) -> Result<Inputs> {
        let enums = load_enums(self.enums.as_deref())?;
        let facet = load_facet(self.facet.as_deref())?;
        let settings = match &self.settings {
            Some(path) => EngineSettings::load(path)
                .with_context(|| format!("Failed to load settings: {}", path.display()))?,
            None => EngineSettings::default(),
        };
        let properties = load_properties(&self.props, self.props_file.as_deref())?;
        let condition = load_condition(&self.source, facet.as_ref(), &enums)?;
        Ok(Inputs {
            condition,
            enums,
            settings,
            properties,
        })
    }
}

/// Build the condition from filter text or a file.
///
/// File content starting with `<` is read as an XML document, with or
/// without cached results; anything else is filter text.
pub fn load_condition(
    source: &ConditionSource,
    facet: Option<&Facet>,
    enums: &Arc<EnumRegistry>,
) -> Result<ExpressionNode> {
    let converter = FilterConverter::new().with_enums(Arc::clone(enums));
    match (&source.condition, &source.file) {
        (Some(text), None) => converter
            .parse_condition(text, facet)
            .with_context(|| format!("Failed to parse condition: {text}")),
        (None, Some(path)) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read condition file: {}", path.display()))?;
            if !content.trim_start().starts_with('<') {
                return converter
                    .parse_condition(content.trim(), facet)
                    .with_context(|| format!("Failed to parse condition file: {}", path.display()));
            }
            let plain = ExpressionReader::new().with_enums(Arc::clone(enums));
            plain
                .read(&content)
                .or_else(|e| {
                    log::debug!("not a plain document ({e}), trying with results");
                    ExpressionReader::with_results()
                        .with_enums(Arc::clone(enums))
                        .read(&content)
                })
                .with_context(|| format!("Failed to read document: {}", path.display()))
        }
        (Some(_), Some(_)) => anyhow::bail!("Give either a condition or --file, not both"),
        (None, None) => anyhow::bail!("No condition given. Pass filter text or --file"),
    }
}

/// Load a facet declaration (JSON)
pub fn load_facet(path: Option<&Path>) -> Result<Option<Facet>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read facet file: {}", path.display()))?;
    let facet: Facet = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse facet file: {}", path.display()))?;
    log::debug!("loaded facet {} with {} properties", facet.name, facet.properties.len());
    Ok(Some(facet))
}

/// Load enum definitions (a JSON array) into a registry
pub fn load_enums(path: Option<&Path>) -> Result<Arc<EnumRegistry>> {
    let Some(path) = path else {
        return Ok(Arc::new(EnumRegistry::new()));
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read enum file: {}", path.display()))?;
    let definitions: Vec<EnumDefinition> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse enum file: {}", path.display()))?;
    log::debug!("loaded {} enum definition(s)", definitions.len());
    let provider = definitions
        .into_iter()
        .fold(StaticEnumProvider::new(), StaticEnumProvider::with_definition);
    Ok(EnumRegistry::shared(provider))
}

/// Build the property bag: the JSON file first, then `name=value` overrides
pub fn load_properties(props: &[String], file: Option<&Path>) -> Result<PropertyBag> {
    let mut bag = match file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read properties file: {}", path.display()))?;
            let json: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse properties file: {}", path.display()))?;
            PropertyBag::from_json(&json)
                .with_context(|| format!("Invalid properties file: {}", path.display()))?
        }
        None => PropertyBag::new(),
    };
    for prop in props {
        let (name, value) = parse_property(prop)?;
        bag.set(name, value);
    }
    Ok(bag)
}

/// Parse a `name=value` property
pub fn parse_property(prop: &str) -> Result<(String, Value)> {
    let Some((name, raw)) = prop.split_once('=') else {
        anyhow::bail!("Invalid property format: '{prop}'. Expected 'name=value'");
    };
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Invalid property format: '{prop}'. Name is empty");
    }
    let raw = raw.trim();

    let value = if let Ok(i) = raw.parse::<i32>() {
        Value::Int(i)
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::Long(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Double(f)
    } else if raw == "true" || raw == "false" {
        Value::Bool(raw == "true")
    } else if raw == "null" {
        Value::Null
    } else if raw.starts_with('[') {
        let json: serde_json::Value = serde_json::from_str(raw)
            .with_context(|| format!("Invalid list for property {name}: {raw}"))?;
        value_from_json(&json)?
    } else if let Some(quoted) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        Value::string(quoted)
    } else {
        Value::string(raw)
    };
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EvaluationContext;

    #[test]
    fn test_parse_property() {
        assert_eq!(parse_property("Size=30").unwrap(), ("Size".to_string(), Value::Int(30)));
        assert_eq!(
            parse_property("Big=9000000000").unwrap().1,
            Value::Long(9_000_000_000)
        );
        assert_eq!(parse_property("Ratio=2.5").unwrap().1, Value::Double(2.5));
        assert_eq!(parse_property("Online=true").unwrap().1, Value::Bool(true));
        assert_eq!(parse_property("Owner=null").unwrap().1, Value::Null);
        assert_eq!(parse_property("Name = master").unwrap().1, Value::string("master"));
        assert_eq!(parse_property("Code='42'").unwrap().1, Value::string("42"));
        assert_eq!(
            parse_property("Ports=[1, 2]").unwrap().1,
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_parse_property_invalid() {
        assert!(parse_property("invalid").is_err());
        assert!(parse_property("=1").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let bag = load_properties(&["Name=model".to_string()], None).unwrap();
        assert_eq!(bag.get_property("Name").unwrap(), Value::string("model"));
    }

    #[test]
    fn test_condition_source() {
        let enums = Arc::new(EnumRegistry::new());
        let source = ConditionSource {
            condition: Some("@Name = 'master'".to_string()),
            file: None,
        };
        let node = load_condition(&source, None, &enums).unwrap();
        assert_eq!(node.to_string(), "@Name = 'master'");

        assert!(load_condition(&ConditionSource::default(), None, &enums).is_err());
    }
}
