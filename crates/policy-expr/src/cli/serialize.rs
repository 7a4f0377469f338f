//! Serialize command implementation

use super::evaluate::engine_for;
use super::input::InputConfig;
use super::output;
use crate::{serialize, serialize_with_results};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Configuration for serialize command
pub struct SerializeConfig {
    pub input: InputConfig,
    /// Evaluate first and include every node's result
    pub with_results: bool,
    pub output_file: Option<PathBuf>,
}

/// Write a condition as an XML document
pub fn serialize_condition(config: SerializeConfig) -> Result<()> {
    let mut inputs = config.input.load()?;

    let document = if config.with_results {
        let engine = engine_for(&inputs);
        engine
            .evaluate(&mut inputs.condition, &inputs.properties)
            .with_context(|| format!("Failed to evaluate: {}", inputs.condition))?;
        serialize_with_results(&inputs.condition)
    } else {
        serialize(&inputs.condition)
    }
    .context("Failed to serialize condition")?;

    output::write_output(&document, config.output_file.as_deref())
}
