//! Evaluation context for condition execution

use indexmap::IndexMap;
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{StringComparison, Value};

/// Rows returned by a script, each a list of column values
pub type ScriptRows = Vec<Vec<Value>>;

/// Runs the SQL and WQL scripts behind `ExecuteSql` / `ExecuteWql`
#[cfg_attr(test, mockall::automock)]
pub trait ScriptRunner {
    /// Run a T-SQL script against the target's server
    fn execute_sql(&self, script: &str) -> Result<ScriptRows>;

    /// Run a WQL query in `namespace`
    fn execute_wql(&self, namespace: &str, query: &str) -> Result<ScriptRows>;
}

/// Everything evaluation needs from the outside world
pub trait EvaluationContext {
    /// Value of a property of the target object
    fn get_property(&self, name: &str) -> Result<Value>;

    /// Culture used by `Upper` / `Lower`; `None` is the invariant culture
    fn culture(&self) -> Option<&str> {
        None
    }

    /// How strings compare for equality and LIKE
    fn string_comparison(&self) -> StringComparison {
        StringComparison::Ordinal
    }

    /// Script runner for the physical target, if it can run scripts
    fn physical_target(&self) -> Option<&dyn ScriptRunner> {
        None
    }
}

/// In-memory property source
#[derive(Default)]
pub struct PropertyBag {
    properties: IndexMap<String, Value>,
    culture: Option<String>,
    string_comparison: StringComparison,
    runner: Option<Box<dyn ScriptRunner>>,
}

impl std::fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyBag")
            .field("properties", &self.properties)
            .field("culture", &self.culture)
            .field("string_comparison", &self.string_comparison)
            .field("runner", &self.runner.is_some())
            .finish()
    }
}

impl PropertyBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = Some(culture.into());
        self
    }

    pub fn with_string_comparison(mut self, comparison: StringComparison) -> Self {
        self.string_comparison = comparison;
        self
    }

    pub fn with_script_runner(mut self, runner: impl ScriptRunner + 'static) -> Self {
        self.runner = Some(Box::new(runner));
        self
    }

    /// Build a bag from a JSON object, see [`value_from_json`]
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let object = json
            .as_object()
            .ok_or_else(|| ExprError::invalid_argument("properties must be a JSON object"))?;
        let mut bag = Self::new();
        for (name, value) in object {
            bag.set(name.clone(), value_from_json(value)?);
        }
        Ok(bag)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl EvaluationContext for PropertyBag {
    fn get_property(&self, name: &str) -> Result<Value> {
        self.properties
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::PropertyNotFound {
                property: name.to_string(),
            })
    }

    fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    fn string_comparison(&self) -> StringComparison {
        self.string_comparison
    }

    fn physical_target(&self) -> Option<&dyn ScriptRunner> {
        self.runner.as_deref()
    }
}

/// Convert a JSON value to a runtime value.
///
/// Integers become `Int` when they fit and `Long` otherwise; other numbers
/// become `Double`. Nested objects are rejected.
pub fn value_from_json(json: &serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i32::try_from(i).map_or(Value::Long(i), Value::Int))
            } else {
                n.as_f64()
                    .map(Value::Double)
                    .ok_or_else(|| ExprError::type_conversion(n.to_string(), "Double"))
            }
        }
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(value_from_json)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Json::Object(_) => Err(ExprError::unsupported_type("object")),
    }
}
