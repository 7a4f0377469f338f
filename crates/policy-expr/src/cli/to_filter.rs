//! Filter text command implementation

use super::input::InputConfig;
use super::output;
use crate::filter::FilterConverter;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Configuration for to-filter command
pub struct ToFilterConfig {
    pub input: InputConfig,
    pub output_file: Option<PathBuf>,
}

/// Print a condition in the boolean filter grammar
pub fn to_filter(config: ToFilterConfig) -> Result<()> {
    let inputs = config.input.load()?;
    if !inputs.condition.filter_compatible() {
        log::warn!("{} is not marked filter compatible", inputs.condition);
    }

    let converter = FilterConverter::new().with_enums(inputs.enums.clone());
    let filter = converter
        .to_filter(&inputs.condition)
        .with_context(|| format!("Cannot express as a filter: {}", inputs.condition))?;

    output::write_output(&filter.to_string(), config.output_file.as_deref())
}
