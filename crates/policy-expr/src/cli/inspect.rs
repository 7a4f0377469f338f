//! Inspect command implementation

use super::evaluate::engine_for;
use super::input::InputConfig;
use super::output::{self, OutputFormat};
use crate::ExpressionNode;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Configuration for inspect command
pub struct InspectConfig {
    pub input: InputConfig,
    /// Evaluate first so the table shows each node's result
    pub evaluate: bool,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// One node of the tree, in depth-first order
#[derive(Debug, Tabled, Serialize)]
pub struct NodeRow {
    #[tabled(rename = "Depth")]
    pub depth: usize,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Class")]
    pub class: String,
    #[tabled(rename = "Node")]
    pub text: String,
    #[tabled(rename = "Result")]
    pub result: String,
}

/// Derived facts about the whole tree
#[derive(Debug, Serialize)]
pub struct TreeSummary {
    pub condition: String,
    pub has_script: bool,
    pub filter_compatible: bool,
    pub name_condition: Option<String>,
    pub attributes: Vec<String>,
    pub nodes: Vec<NodeRow>,
}

/// Flatten a tree into rows
pub fn node_rows(node: &ExpressionNode) -> Vec<NodeRow> {
    let mut rows = Vec::new();
    collect_rows(node, 0, &mut rows);
    rows
}

fn collect_rows(node: &ExpressionNode, depth: usize, rows: &mut Vec<NodeRow>) {
    let text = match node {
        ExpressionNode::Operator(o) => o.op().symbol().to_string(),
        ExpressionNode::Function(f) => format!("{}()", f.kind()),
        ExpressionNode::Group(_) => "( )".to_string(),
        other => other.to_string(),
    };
    rows.push(NodeRow {
        depth,
        kind: node.kind().to_string(),
        class: node.type_class().to_string(),
        text: format!("{}{text}", "  ".repeat(depth)),
        result: node.result_string(),
    });
    for child in node.children() {
        collect_rows(child, depth + 1, rows);
    }
}

/// Summarize a tree
pub fn summarize(node: &ExpressionNode) -> TreeSummary {
    let name = node.name_condition();
    let name_condition = name.object_name.as_ref().map(|object| format!("{:?} '{object}'", name.kind));
    let mut attributes = node.enum_attributes();
    attributes.dedup();
    TreeSummary {
        condition: node.to_string(),
        has_script: node.has_script(),
        filter_compatible: node.filter_compatible(),
        name_condition,
        attributes,
        nodes: node_rows(node),
    }
}

/// Print the node table and derived flags of a condition
pub fn inspect(config: InspectConfig) -> Result<()> {
    let mut inputs = config.input.load()?;
    if config.evaluate {
        let engine = engine_for(&inputs);
        engine
            .evaluate(&mut inputs.condition, &inputs.properties)
            .with_context(|| format!("Failed to evaluate: {}", inputs.condition))?;
    }

    let summary = summarize(&inputs.condition);
    let content = match config.output_format {
        OutputFormat::Json => output::format_json(&summary, false)?,
        OutputFormat::JsonPretty => output::format_json(&summary, true)?,
        OutputFormat::Table => {
            let mut lines = vec![
                format!("Condition:         {}", summary.condition),
                format!("Has script:        {}", summary.has_script),
                format!("Filter compatible: {}", summary.filter_compatible),
            ];
            if let Some(name) = &summary.name_condition {
                lines.push(format!("Name condition:    {name}"));
            }
            lines.push(format!("Attributes:        {}", summary.attributes.join(", ")));
            lines.push(output::format_table(summary.nodes, "no nodes"));
            lines.join("\n")
        }
    };
    output::write_output(&content, config.output_file.as_deref())
}
