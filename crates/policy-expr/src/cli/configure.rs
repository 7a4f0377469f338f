//! Configure command implementation

use super::evaluate::engine_for;
use super::input::InputConfig;
use super::output::{self, OutputFormat};
use crate::infer_configuration;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Configuration for configure command
pub struct ConfigureConfig {
    pub input: InputConfig,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Tabled, Serialize)]
struct WriteRow {
    #[tabled(rename = "Property")]
    property: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Evaluate a condition and list the property writes that would make it hold
pub fn configure(config: ConfigureConfig) -> Result<()> {
    let mut inputs = config.input.load()?;
    let engine = engine_for(&inputs);
    let holds = engine
        .check(&mut inputs.condition, &inputs.properties)
        .with_context(|| format!("Failed to evaluate: {}", inputs.condition))?;

    if holds && !config.output_format.is_json() {
        eprintln!(
            "{}",
            output::format_success("Condition already holds; nothing to configure")
        );
        return Ok(());
    }

    let items = infer_configuration(&inputs.condition)
        .with_context(|| format!("Cannot infer configuration for: {}", inputs.condition))?;
    log::debug!("{} property write(s) inferred", items.len());

    let rows = items
        .into_iter()
        .map(|item| WriteRow {
            property: item.property,
            value: item.value.to_string(),
        })
        .collect();
    output::print_rows(
        rows,
        config.output_format,
        "no property writes",
        config.output_file.as_deref(),
    )
}
