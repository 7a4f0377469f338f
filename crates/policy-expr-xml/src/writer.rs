//! Document writer
//!
//! Produces the indented element form of a tree: two spaces per level, one
//! element per line, no declaration. Constant values are additionally
//! quote-doubled so the text can be pasted into filter expressions.

use crate::tags;
use crate::type_name::{NULL_TYPE, type_name, value_to_text};
use policy_expr_ast::ExpressionNode;
use policy_expr_diagnostics::Result;
use policy_expr_types::Value;
use policy_expr_types::escape::urn_escape;

/// Serialize a tree without cached results
pub fn serialize(node: &ExpressionNode) -> Result<String> {
    ExpressionWriter::new().write(node)
}

/// Serialize a tree together with every node's cached result
pub fn serialize_with_results(node: &ExpressionNode) -> Result<String> {
    ExpressionWriter::with_results().write(node)
}

/// Writer for expression documents
#[derive(Debug, Default, Clone)]
pub struct ExpressionWriter {
    /// Emit result blocks for attributes, operators and functions
    pub include_results: bool,
}

impl ExpressionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results() -> Self {
        Self {
            include_results: true,
        }
    }

    /// Write `node` as a document
    pub fn write(&self, node: &ExpressionNode) -> Result<String> {
        let mut doc = Document::default();
        self.write_node(&mut doc, node)?;
        Ok(doc.finish())
    }

    fn write_node(&self, doc: &mut Document, node: &ExpressionNode) -> Result<()> {
        let element = node.kind().name();
        doc.open(element);
        doc.write_element(tags::TYPE_CLASS, node.type_class().name());

        match node {
            ExpressionNode::Constant(c) => {
                // constants never carry a result block
                if c.value().is_null() {
                    doc.write_element(tags::OBJ_TYPE, NULL_TYPE);
                    doc.write_element(tags::VALUE, NULL_TYPE);
                } else {
                    doc.write_element(tags::OBJ_TYPE, &type_name(c.value()));
                    doc.write_element(tags::VALUE, &urn_escape(&value_to_text(c.value())?));
                }
            }
            ExpressionNode::Attribute(a) => {
                doc.write_element(tags::NAME, a.name());
                self.write_result(doc, node)?;
            }
            ExpressionNode::Operator(op) => {
                doc.write_element(tags::OP_TYPE, op.op().name());
                self.write_result(doc, node)?;
                self.write_children(doc, &node.children())?;
            }
            ExpressionNode::Function(func) => {
                doc.write_element(tags::FUNCTION_TYPE, func.kind().name());
                doc.write_element(tags::RETURN_TYPE, func.return_type().name());
                self.write_result(doc, node)?;
                self.write_children(doc, &node.children())?;
            }
            ExpressionNode::Group(_) => self.write_children(doc, &node.children())?,
        }

        doc.close(element);
        Ok(())
    }

    fn write_children(&self, doc: &mut Document, children: &[&ExpressionNode]) -> Result<()> {
        doc.write_element(tags::COUNT, &children.len().to_string());
        for child in children {
            self.write_node(doc, child)?;
        }
        Ok(())
    }

    fn write_result(&self, doc: &mut Document, node: &ExpressionNode) -> Result<()> {
        if !self.include_results {
            return Ok(());
        }
        let result = node.last_result();
        doc.write_element(tags::RESULT_OBJ_TYPE, &type_name(result));
        match result {
            Value::Array(items) => {
                doc.open(tags::RESULT_VALUE);
                doc.write_element(tags::COUNT, &items.len().to_string());
                for item in items {
                    doc.write_element(tags::RESULT_OBJ_TYPE, &type_name(item));
                    doc.write_element(tags::RESULT_VALUE, &value_to_text(item)?);
                }
                doc.close(tags::RESULT_VALUE);
            }
            scalar => doc.write_element(tags::RESULT_VALUE, &value_to_text(scalar)?),
        }
        Ok(())
    }
}

/// Output buffer tracking the indentation level
#[derive(Debug, Default)]
struct Document {
    xml: String,
    level: usize,
}

impl Document {
    fn write_indent(&mut self) {
        if !self.xml.is_empty() {
            self.xml.push('\n');
        }
        for _ in 0..self.level {
            self.xml.push_str("  ");
        }
    }

    fn open(&mut self, name: &str) {
        self.write_indent();
        self.xml.push('<');
        self.xml.push_str(name);
        self.xml.push('>');
        self.level += 1;
    }

    fn close(&mut self, name: &str) {
        self.level = self.level.saturating_sub(1);
        self.write_indent();
        self.xml.push_str("</");
        self.xml.push_str(name);
        self.xml.push('>');
    }

    fn write_element(&mut self, name: &str, text: &str) {
        self.write_indent();
        if text.is_empty() {
            self.xml.push('<');
            self.xml.push_str(name);
            self.xml.push_str(" />");
            return;
        }
        self.xml.push('<');
        self.xml.push_str(name);
        self.xml.push('>');
        self.xml.push_str(&escape_xml(text));
        self.xml.push_str("</");
        self.xml.push_str(name);
        self.xml.push('>');
    }

    fn finish(self) -> String {
        self.xml
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
