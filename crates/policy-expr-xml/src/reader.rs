//! Document reader
//!
//! Reading is positional: every element must appear exactly where the writer
//! puts it, and the first deviation fails with a `Serialization` error naming
//! what was found and what was expected. Whitespace between elements is
//! ignored, text inside an element is kept as is.

use crate::tags;
use crate::type_name::{NULL_TYPE, value_from_text};
use policy_expr_ast::{ExpressionNode, FunctionKind, NodeKind};
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::escape::urn_unescape;
use policy_expr_types::{EnumRegistry, OperatorType, TypeClass, Value};
use quick_xml::Reader;
use quick_xml::events::{BytesRef, Event};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::name::QName;
use std::sync::Arc;

/// Deserialize a tree written by [`crate::serialize`]
pub fn deserialize(text: &str) -> Result<ExpressionNode> {
    ExpressionReader::new().read(text)
}

/// Deserialize a tree written by [`crate::serialize_with_results`]
pub fn deserialize_with_results(text: &str) -> Result<ExpressionNode> {
    ExpressionReader::with_results().read(text)
}

/// Reader for expression documents
#[derive(Debug, Clone)]
pub struct ExpressionReader {
    include_results: bool,
    /// Resolves enum type names found in the document
    enums: Arc<EnumRegistry>,
}

impl Default for ExpressionReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionReader {
    pub fn new() -> Self {
        Self {
            include_results: false,
            enums: Arc::new(EnumRegistry::new()),
        }
    }

    /// Expect result blocks, as written by a results-including writer
    pub fn with_results() -> Self {
        Self {
            include_results: true,
            ..Self::new()
        }
    }

    pub fn with_enums(mut self, enums: Arc<EnumRegistry>) -> Self {
        self.enums = enums;
        self
    }

    /// Read one tree; anything after the root element is an error
    pub fn read(&self, text: &str) -> Result<ExpressionNode> {
        let mut cursor = Cursor::new(text);
        let node = self.read_node(&mut cursor)?;
        match cursor.next_significant()? {
            Token::Eof => Ok(node),
            other => Err(ExprError::serialization(other.describe(), "end of document")),
        }
    }

    fn read_node(&self, cursor: &mut Cursor<'_>) -> Result<ExpressionNode> {
        let name = match cursor.next_significant()? {
            Token::Start(name) => name,
            other => return Err(ExprError::serialization(other.describe(), "node element")),
        };
        let kind = NodeKind::from_name(&name)
            .ok_or_else(|| ExprError::serialization(format!("Element {name}"), "node element"))?;
        let class: TypeClass = cursor.read_element(tags::TYPE_CLASS)?.parse()?;

        let node = match kind {
            NodeKind::Constant => {
                let obj_type = cursor.read_element(tags::OBJ_TYPE)?;
                let text = cursor.read_element(tags::VALUE)?;
                let value = if obj_type == NULL_TYPE {
                    Value::Null
                } else {
                    value_from_text(&obj_type, &urn_unescape(&text), &self.enums)?
                };
                ExpressionNode::constant(value)?.with_type_class(class)
            }
            NodeKind::Attribute => {
                let name = cursor.read_element(tags::NAME)?;
                let result = self.read_result(cursor)?;
                let mut node = ExpressionNode::attribute_with_class(name, class)?;
                node.set_result(result);
                node
            }
            NodeKind::Operator => {
                let op_text = cursor.read_element(tags::OP_TYPE)?;
                let op = OperatorType::from_name(&op_text)?;
                let result = self.read_result(cursor)?;
                let [left, right] = self.read_children::<2>(cursor)?;
                let mut node = ExpressionNode::operator_from_parts(op, left, right).with_type_class(class);
                node.set_result(result);
                node
            }
            NodeKind::Group => {
                let [child] = self.read_children::<1>(cursor)?;
                ExpressionNode::group(child).with_type_class(class)
            }
            NodeKind::Function => {
                let function = cursor.read_element(tags::FUNCTION_TYPE)?;
                let function_kind = FunctionKind::from_name(&function)
                    .ok_or_else(|| ExprError::serialization(function.as_str(), "FunctionType"))?;
                let return_type: TypeClass = cursor.read_element(tags::RETURN_TYPE)?.parse()?;
                let result = self.read_result(cursor)?;
                let args = self.read_child_list(cursor)?;
                let mut node = ExpressionNode::function_from_parts(function_kind, return_type, args)
                    .with_type_class(class);
                node.set_result(result);
                node
            }
        };

        cursor.expect_end(kind.name())?;
        Ok(node)
    }

    fn read_child_list(&self, cursor: &mut Cursor<'_>) -> Result<Vec<ExpressionNode>> {
        let count = parse_count(&cursor.read_element(tags::COUNT)?)?;
        (0..count).map(|_| self.read_node(cursor)).collect()
    }

    fn read_children<const N: usize>(&self, cursor: &mut Cursor<'_>) -> Result<[ExpressionNode; N]> {
        let children = self.read_child_list(cursor)?;
        <[ExpressionNode; N]>::try_from(children).map_err(|children| {
            ExprError::serialization(
                format!("{} child node(s)", children.len()),
                format!("{N} child node(s)"),
            )
        })
    }

    /// Read a result block when results are expected; otherwise `Null`
    fn read_result(&self, cursor: &mut Cursor<'_>) -> Result<Value> {
        if !self.include_results {
            return Ok(Value::Null);
        }
        let type_name = cursor.read_element(tags::RESULT_OBJ_TYPE)?;
        if !type_name.ends_with("[]") {
            let text = cursor.read_element(tags::RESULT_VALUE)?;
            return value_from_text(&type_name, &text, &self.enums);
        }

        cursor.expect_start(tags::RESULT_VALUE)?;
        let count = parse_count(&cursor.read_element(tags::COUNT)?)?;
        let mut items = Vec::new();
        for _ in 0..count {
            let item_type = cursor.read_element(tags::RESULT_OBJ_TYPE)?;
            let text = cursor.read_element(tags::RESULT_VALUE)?;
            items.push(value_from_text(&item_type, &text, &self.enums)?);
        }
        cursor.expect_end(tags::RESULT_VALUE)?;
        Ok(Value::Array(items))
    }
}

fn parse_count(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| ExprError::type_conversion(text, "System.Int32"))
}

/// Flattened view of the event stream
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Start(String),
    Empty(String),
    End(String),
    Text(String),
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Start(name) | Token::Empty(name) => format!("Element {name}"),
            Token::End(name) => format!("EndElement {name}"),
            Token::Text(_) => "Text".to_string(),
            Token::Eof => "end of document".to_string(),
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Token::Text(t) if t.chars().all(char::is_whitespace))
    }
}

struct Cursor<'a> {
    reader: Reader<&'a [u8]>,
    pending: Option<Token>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            reader: Reader::from_str(text),
            pending: None,
        }
    }

    fn xml_error(&self, e: impl std::fmt::Display) -> ExprError {
        ExprError::Xml {
            message: format!("{e} at position {}", self.reader.buffer_position()),
        }
    }

    /// Next token; adjacent text, CDATA and entity references are merged
    fn next_token(&mut self) -> Result<Token> {
        if let Some(token) = self.pending.take() {
            return Ok(token);
        }

        let mut text: Option<String> = None;
        loop {
            let event = self.reader.read_event().map_err(|e| self.xml_error(e))?;
            let token = match event {
                Event::Text(t) => {
                    let decoded = t.decode().map_err(|e| self.xml_error(e))?;
                    text.get_or_insert_with(String::new).push_str(&decoded);
                    continue;
                }
                Event::CData(c) => {
                    let decoded = c.decode().map_err(|e| self.xml_error(e))?;
                    text.get_or_insert_with(String::new).push_str(&decoded);
                    continue;
                }
                Event::GeneralRef(r) => {
                    let resolved = self.resolve_reference(&r)?;
                    text.get_or_insert_with(String::new).push_str(&resolved);
                    continue;
                }
                Event::Start(e) => Token::Start(self.element_name(e.name())?),
                Event::Empty(e) => Token::Empty(self.element_name(e.name())?),
                Event::End(e) => Token::End(self.element_name(e.name())?),
                Event::Eof => Token::Eof,
                _ => continue,
            };

            return Ok(match text {
                Some(text) => {
                    self.pending = Some(token);
                    Token::Text(text)
                }
                None => token,
            });
        }
    }

    /// Next token that is not whitespace between elements
    fn next_significant(&mut self) -> Result<Token> {
        loop {
            let token = self.next_token()?;
            if !token.is_whitespace() {
                return Ok(token);
            }
        }
    }

    fn element_name(&self, name: QName<'_>) -> Result<String> {
        std::str::from_utf8(name.as_ref())
            .map(str::to_string)
            .map_err(|e| self.xml_error(e))
    }

    fn resolve_reference(&self, reference: &BytesRef<'_>) -> Result<String> {
        if let Some(c) = reference.resolve_char_ref().map_err(|e| self.xml_error(e))? {
            return Ok(c.to_string());
        }
        let name = reference.decode().map_err(|e| self.xml_error(e))?;
        resolve_predefined_entity(&name)
            .map(str::to_string)
            .ok_or_else(|| self.xml_error(format!("unknown entity &{name};")))
    }

    fn expect_start(&mut self, name: &str) -> Result<()> {
        match self.next_significant()? {
            Token::Start(found) if found == name => Ok(()),
            other => Err(ExprError::serialization(other.describe(), format!("Element {name}"))),
        }
    }

    fn expect_end(&mut self, name: &str) -> Result<()> {
        match self.next_significant()? {
            Token::End(found) if found == name => Ok(()),
            other => Err(ExprError::serialization(
                other.describe(),
                format!("EndElement {name}"),
            )),
        }
    }

    /// Read `<name>text</name>` (or `<name />`) and return the text
    fn read_element(&mut self, name: &str) -> Result<String> {
        match self.next_significant()? {
            Token::Empty(found) if found == name => return Ok(String::new()),
            Token::Start(found) if found == name => {}
            other => {
                return Err(ExprError::serialization(other.describe(), format!("Element {name}")));
            }
        }
        match self.next_token()? {
            Token::End(found) if found == name => Ok(String::new()),
            Token::Text(text) => {
                self.expect_end(name)?;
                Ok(text)
            }
            other => Err(ExprError::serialization(other.describe(), "Text")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_constant() {
        let xml = "<Constant>\n  <TypeClass>String</TypeClass>\n  <ObjType>System.String</ObjType>\n  <Value>O''Brien &amp; co</Value>\n</Constant>";
        let node = deserialize(xml).unwrap();
        assert_eq!(
            node.as_constant().unwrap().value(),
            &Value::string("O'Brien & co")
        );
    }

    #[test]
    fn test_whitespace_inside_value_is_kept() {
        let xml = "<Constant><TypeClass>String</TypeClass><ObjType>System.String</ObjType><Value>  </Value></Constant>";
        let node = deserialize(xml).unwrap();
        assert_eq!(node.as_constant().unwrap().value(), &Value::string("  "));
    }

    #[test]
    fn test_out_of_order_element() {
        let xml = "<Attribute><Name>A</Name><TypeClass>String</TypeClass></Attribute>";
        match deserialize(xml) {
            Err(ExprError::Serialization { found, expected }) => {
                assert_eq!(found, "Element Name");
                assert_eq!(expected, "Element TypeClass");
            }
            other => panic!("expected a serialization error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_node_element() {
        let xml = "<Variable><TypeClass>String</TypeClass></Variable>";
        assert!(matches!(
            deserialize(xml),
            Err(ExprError::Serialization { .. })
        ));
    }

    #[test]
    fn test_trailing_content() {
        let xml = "<Attribute><TypeClass>String</TypeClass><Name>A</Name></Attribute><Attribute/>";
        assert!(matches!(
            deserialize(xml),
            Err(ExprError::Serialization { .. })
        ));
    }

    #[test]
    fn test_operator_needs_two_children() {
        let xml = "<Operator><TypeClass>Bool</TypeClass><OpType>EQ</OpType><Count>1</Count>\
                   <Attribute><TypeClass>String</TypeClass><Name>A</Name></Attribute></Operator>";
        assert!(matches!(
            deserialize(xml),
            Err(ExprError::Serialization { .. })
        ));
    }

    #[test]
    fn test_bad_count() {
        let xml = "<Group><TypeClass>Bool</TypeClass><Count>one</Count></Group>";
        assert!(matches!(
            deserialize(xml),
            Err(ExprError::TypeConversion { .. })
        ));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            deserialize("<Attribute><TypeClass>String</Name></Attribute>"),
            Err(ExprError::Xml { .. })
        ));
    }
}
