//! Evaluate command implementation

use super::input::{InputConfig, Inputs};
use super::output::{self, OutputFormat};
use crate::{ExprEngine, serialize_with_results};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;

/// Configuration for evaluate command
pub struct EvaluateConfig {
    pub input: InputConfig,
    /// Print the evaluated tree as a document with results
    pub with_results: bool,
    pub verbose: bool,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Build an engine from the loaded settings and enum definitions
pub fn engine_for(inputs: &Inputs) -> ExprEngine {
    ExprEngine::with_settings(inputs.settings.clone()).with_enums(inputs.enums.clone())
}

/// Evaluate a condition against the given properties
pub fn evaluate(config: EvaluateConfig) -> Result<()> {
    let mut inputs = config.input.load()?;
    if config.verbose {
        eprintln!("Condition: {}", inputs.condition);
        eprintln!("Properties: {}", inputs.properties.len());
    }

    let engine = engine_for(&inputs);
    let result = engine
        .evaluate(&mut inputs.condition, &inputs.properties)
        .with_context(|| format!("Failed to evaluate: {}", inputs.condition))?;
    log::info!("evaluated {} to {result}", inputs.condition);

    if config.with_results {
        let document = serialize_with_results(&inputs.condition)
            .context("Failed to serialize evaluated tree")?;
        return output::write_output(&document, config.output_file.as_deref());
    }

    let content = if config.output_format.is_json() {
        let value = json!({
            "condition": inputs.condition.to_string(),
            "result": inputs.condition.result_string(),
            "type": inputs.condition.type_class().to_string(),
        });
        output::format_json(&value, config.output_format == OutputFormat::JsonPretty)?
    } else {
        output::format_result(&result)
    };
    output::write_output(&content, config.output_file.as_deref())
}
