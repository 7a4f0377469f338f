//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;
use tabled::{Table, Tabled, settings::Style};

use crate::Value;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    #[default]
    Table,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" | "json-pretty" => Self::JsonPretty,
            _ => Self::Table,
        }
    }

    pub fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty)
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Color an evaluation result: green for true, red for false
pub fn format_result(value: &Value) -> String {
    match value {
        Value::Bool(true) => "True".green().bold().to_string(),
        Value::Bool(false) => "False".red().bold().to_string(),
        Value::Null => "NULL".dimmed().to_string(),
        other => other.to_string().cyan().to_string(),
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Serialize to JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

/// Render rows as a table, or a placeholder when there are none
pub fn format_table<T: Tabled>(rows: Vec<T>, empty: &str) -> String {
    if rows.is_empty() {
        return format!("({empty})");
    }
    Table::new(rows).with(Style::modern()).to_string()
}

/// Print rows in the requested format
pub fn print_rows<T: Tabled + Serialize>(
    rows: Vec<T>,
    format: OutputFormat,
    empty: &str,
    output_file: Option<&Path>,
) -> Result<()> {
    let content = match format {
        OutputFormat::Json => format_json(&rows, false)?,
        OutputFormat::JsonPretty => format_json(&rows, true)?,
        OutputFormat::Table => format_table(rows, empty),
    };
    write_output(&content, output_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        #[tabled(rename = "Property")]
        property: String,
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("pretty"), OutputFormat::JsonPretty);
        assert_eq!(OutputFormat::parse("anything"), OutputFormat::Table);
        assert!(OutputFormat::JsonPretty.is_json());
    }

    #[test]
    fn test_format_table() {
        assert_eq!(format_table(Vec::<Row>::new(), "no rows"), "(no rows)");
        let table = format_table(
            vec![Row {
                property: "AutoClose".to_string(),
            }],
            "no rows",
        );
        assert!(table.contains("Property"));
        assert!(table.contains("AutoClose"));
    }

    #[test]
    fn test_format_json() {
        let rows = vec![Row {
            property: "AutoClose".to_string(),
        }];
        assert_eq!(format_json(&rows, false).unwrap(), r#"[{"property":"AutoClose"}]"#);
    }
}
