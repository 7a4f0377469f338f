//! Engine settings

use policy_expr_diagnostics::{ExprError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs that apply to every evaluation run by one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    /// When false, trees calling `ExecuteSql` / `ExecuteWql` are refused
    pub allow_scripts: bool,
    /// Compare strings ignoring case, whatever the context asks for
    pub case_insensitive_strings: bool,
    /// Culture for `Upper` / `Lower` when the context has none
    pub culture: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            allow_scripts: true,
            case_insensitive_strings: false,
            culture: None,
        }
    }
}

impl EngineSettings {
    /// Parse settings from JSON text; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ExprError::invalid_argument(format!("invalid engine settings: {e}")))
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExprError::invalid_argument(format!("cannot read {}: {e}", path.display()))
        })?;
        let settings = Self::from_json(&text)?;
        log::debug!("loaded engine settings from {}: {settings:?}", path.display());
        Ok(settings)
    }
}
