//! Conversion between expression trees and the filter AST
//!
//! The filter grammar is smaller than the tree: booleans become `true()` /
//! `false()` calls, enum constructors collapse to their numeric value and
//! `NOT_LIKE` is spelled `not(like(..))`. Anything else the grammar cannot
//! express is `ConversionNotSupported`.

use crate::node::{FilterConstant, FilterFunctionType, FilterNode, FilterOperatorType};
use policy_expr_ast::{ExpressionNode, Facet, FunctionKind, FunctionNode};
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{EnumRegistry, OperatorType, Value};
use std::sync::Arc;

/// Convert a tree to the filter AST.
///
/// No enum types are known here, so `Enum(..)` calls fail with
/// `ConversionNotSupported`; use [`FilterConverter::with_enums`] for trees
/// that contain them.
pub fn to_filter(node: &ExpressionNode) -> Result<FilterNode> {
    FilterConverter::new().to_filter(node)
}

/// Convert a filter AST to a tree, checking attributes against `facet` when
/// one is given
pub fn from_filter(filter: &FilterNode, facet: Option<&Facet>) -> Result<ExpressionNode> {
    FilterConverter::new().from_filter(filter, facet)
}

/// Filter text of a tree
pub fn to_filter_string(node: &ExpressionNode) -> Result<String> {
    to_filter(node).map(|filter| filter.to_string())
}

/// Two-way converter; `Enum(type, member)` calls are resolved through the
/// registry
#[derive(Debug, Clone, Default)]
pub struct FilterConverter {
    enums: Arc<EnumRegistry>,
}

impl FilterConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enums(mut self, enums: Arc<EnumRegistry>) -> Self {
        self.enums = enums;
        self
    }

    // === Tree -> filter ===

    pub fn to_filter(&self, node: &ExpressionNode) -> Result<FilterNode> {
        match node {
            ExpressionNode::Constant(c) => constant_to_filter(c.value()),
            ExpressionNode::Attribute(a) => Ok(FilterNode::attribute(a.name())),
            ExpressionNode::Group(g) => Ok(FilterNode::group(self.to_filter(g.child())?)),
            ExpressionNode::Operator(op) => {
                let kind = op.op();
                let target = match kind {
                    OperatorType::Like | OperatorType::NotLike => None,
                    other => Some(filter_operator(other).ok_or_else(|| {
                        ExprError::conversion_not_supported(format!(
                            "operator {} has no filter form",
                            other.name()
                        ))
                    })?),
                };
                let left = self.to_filter(op.left())?;
                let right = self.to_filter(op.right())?;
                Ok(match target {
                    Some(filter_op) => FilterNode::operator(filter_op, left, right),
                    None => {
                        let like = FilterNode::function(FilterFunctionType::Like, vec![left, right]);
                        if kind == OperatorType::NotLike {
                            FilterNode::function(FilterFunctionType::Not, vec![like])
                        } else {
                            like
                        }
                    }
                })
            }
            ExpressionNode::Function(func) => self.function_to_filter(func),
        }
    }

    fn function_to_filter(&self, func: &FunctionNode) -> Result<FilterNode> {
        match func.kind() {
            FunctionKind::True => Ok(FilterNode::function(FilterFunctionType::True, vec![])),
            FunctionKind::False => Ok(FilterNode::function(FilterFunctionType::False, vec![])),
            FunctionKind::String => Ok(FilterNode::function(
                FilterFunctionType::String,
                self.args_to_filter(func.args())?,
            )),
            FunctionKind::Enum => self.enum_to_filter(func),
            other => Ok(FilterNode::user_defined(
                other.name(),
                self.args_to_filter(func.args())?,
            )),
        }
    }

    fn args_to_filter(&self, args: &[ExpressionNode]) -> Result<Vec<FilterNode>> {
        args.iter().map(|arg| self.to_filter(arg)).collect()
    }

    /// `Enum('Type', 'Member')` becomes the member's numeric value
    fn enum_to_filter(&self, func: &FunctionNode) -> Result<FilterNode> {
        let text_arg = |index: usize| {
            func.args()
                .get(index)
                .and_then(ExpressionNode::as_constant)
                .and_then(|c| c.value().as_str())
                .ok_or_else(|| {
                    ExprError::conversion_not_supported(
                        "Enum() needs constant type and member names",
                    )
                })
        };
        let (type_name, member) = (text_arg(0)?, text_arg(1)?);
        if self.enums.resolve(type_name).is_none() {
            return Err(ExprError::conversion_not_supported(format!(
                "enum type {type_name} is not registered with this converter"
            )));
        }
        let value = self.enums.parse(type_name, member).inspect_err(|e| {
            log::debug!("cannot resolve Enum('{type_name}', '{member}'): {e}");
        })?;
        Ok(FilterNode::number(value.value as f64))
    }

    // === Filter -> tree ===

    pub fn from_filter(&self, filter: &FilterNode, facet: Option<&Facet>) -> Result<ExpressionNode> {
        match filter {
            FilterNode::Attribute(name) => match facet {
                Some(facet) => ExpressionNode::attribute_in_facet(name.as_str(), facet),
                None => ExpressionNode::attribute(name.as_str()),
            },
            FilterNode::Constant(c) => ExpressionNode::constant(match c {
                FilterConstant::Number(n) => Value::Double(*n),
                FilterConstant::Boolean(b) => Value::Bool(*b),
                FilterConstant::String(s) => Value::string(s.as_str()),
            }),
            FilterNode::Operator { op, left, right } => {
                let left = self.from_filter(left, facet)?;
                let right = self.from_filter(right, facet)?;
                ExpressionNode::operator(tree_operator(*op), left, right)
            }
            FilterNode::Negation(operand) => match operand.as_ref() {
                FilterNode::Constant(FilterConstant::Number(n)) => {
                    ExpressionNode::constant(Value::Double(-n))
                }
                other => Err(ExprError::conversion_not_supported(format!(
                    "cannot negate {other}"
                ))),
            },
            FilterNode::Function { kind, name, args } => {
                self.function_from_filter(*kind, name, args, facet)
            }
            FilterNode::Group(child) => Ok(ExpressionNode::group(self.from_filter(child, facet)?)),
        }
    }

    fn function_from_filter(
        &self,
        kind: FilterFunctionType,
        name: &str,
        args: &[FilterNode],
        facet: Option<&Facet>,
    ) -> Result<ExpressionNode> {
        match kind {
            FilterFunctionType::True => ExpressionNode::function(FunctionKind::True, vec![]),
            FilterFunctionType::False => ExpressionNode::function(FunctionKind::False, vec![]),
            FilterFunctionType::String => {
                ExpressionNode::function(FunctionKind::String, self.args_from_filter(args, facet)?)
            }
            FilterFunctionType::Like => {
                let (left, right) = self.like_operands(args, facet)?;
                ExpressionNode::operator(OperatorType::Like, left, right)
            }
            // not(like(a, b)) is how NOT_LIKE is written
            FilterFunctionType::Not => match args {
                [
                    FilterNode::Function {
                        kind: FilterFunctionType::Like,
                        args: like_args,
                        ..
                    },
                ] => {
                    let (left, right) = self.like_operands(like_args, facet)?;
                    ExpressionNode::operator(OperatorType::NotLike, left, right)
                }
                _ => Err(ExprError::conversion_not_supported(
                    "not() is only supported around like()",
                )),
            },
            FilterFunctionType::UserDefined => {
                let function = FunctionKind::from_name_ignore_case(name).ok_or_else(|| {
                    ExprError::conversion_not_supported(format!("unknown function {name}"))
                })?;
                ExpressionNode::function(function, self.args_from_filter(args, facet)?)
            }
            other => Err(ExprError::conversion_not_supported(format!(
                "function {}() has no expression form",
                other.name()
            ))),
        }
    }

    fn args_from_filter(
        &self,
        args: &[FilterNode],
        facet: Option<&Facet>,
    ) -> Result<Vec<ExpressionNode>> {
        args.iter().map(|arg| self.from_filter(arg, facet)).collect()
    }

    fn like_operands(
        &self,
        args: &[FilterNode],
        facet: Option<&Facet>,
    ) -> Result<(ExpressionNode, ExpressionNode)> {
        let [left, right] = args else {
            return Err(ExprError::WrongArgumentsNumber {
                function: FilterFunctionType::Like.name().to_string(),
                expected: 2,
                found: args.len(),
            });
        };
        Ok((self.from_filter(left, facet)?, self.from_filter(right, facet)?))
    }
}

fn constant_to_filter(value: &Value) -> Result<FilterNode> {
    match value {
        Value::Int(_)
        | Value::Long(_)
        | Value::Short(_)
        | Value::Byte(_)
        | Value::Double(_)
        | Value::Single(_)
        | Value::Decimal(_)
        | Value::Enum(_) => Ok(FilterNode::number(policy_expr_types::to_f64(value)?)),
        Value::String(s) => Ok(FilterNode::string(s.as_str())),
        // the rest of the string family travels as text
        Value::Char(_) | Value::DateTime(_) | Value::Guid(_) => {
            Ok(FilterNode::string(value.to_string()))
        }
        Value::Bool(true) => Ok(FilterNode::function(FilterFunctionType::True, vec![])),
        Value::Bool(false) => Ok(FilterNode::function(FilterFunctionType::False, vec![])),
        other => Err(ExprError::conversion_not_supported(format!(
            "constant of type {} has no filter form",
            other.kind_name()
        ))),
    }
}

fn filter_operator(op: OperatorType) -> Option<FilterOperatorType> {
    match op {
        OperatorType::And => Some(FilterOperatorType::And),
        OperatorType::Or => Some(FilterOperatorType::Or),
        OperatorType::Eq => Some(FilterOperatorType::Eq),
        OperatorType::Ne => Some(FilterOperatorType::Ne),
        OperatorType::Gt => Some(FilterOperatorType::Gt),
        OperatorType::Ge => Some(FilterOperatorType::Ge),
        OperatorType::Lt => Some(FilterOperatorType::Lt),
        OperatorType::Le => Some(FilterOperatorType::Le),
        _ => None,
    }
}

fn tree_operator(op: FilterOperatorType) -> OperatorType {
    match op {
        FilterOperatorType::And => OperatorType::And,
        FilterOperatorType::Or => OperatorType::Or,
        FilterOperatorType::Eq => OperatorType::Eq,
        FilterOperatorType::Ne => OperatorType::Ne,
        FilterOperatorType::Gt => OperatorType::Gt,
        FilterOperatorType::Ge => OperatorType::Ge,
        FilterOperatorType::Lt => OperatorType::Lt,
        FilterOperatorType::Le => OperatorType::Le,
    }
}
