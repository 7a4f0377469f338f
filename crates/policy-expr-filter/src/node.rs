//! Filter AST
//!
//! The filter grammar is a reduced boolean language: attributes, three kinds
//! of constants, comparison and logical operators, a handful of functions and
//! numeric negation. Every node prints back as filter text.

use policy_expr_types::escape::urn_escape;
use std::fmt;

/// Literal held by a filter constant
#[derive(Debug, Clone, PartialEq)]
pub enum FilterConstant {
    Number(f64),
    Boolean(bool),
    String(String),
}

/// Built-in filter functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterFunctionType {
    True,
    False,
    String,
    Contains,
    /// Any name the grammar does not know; the call keeps its name
    UserDefined,
    Not,
    Boolean,
    Like,
    In,
}

impl FilterFunctionType {
    pub const BUILT_IN: [FilterFunctionType; 8] = [
        FilterFunctionType::True,
        FilterFunctionType::False,
        FilterFunctionType::String,
        FilterFunctionType::Contains,
        FilterFunctionType::Not,
        FilterFunctionType::Boolean,
        FilterFunctionType::Like,
        FilterFunctionType::In,
    ];

    /// Name as written in filter text
    pub fn name(&self) -> &'static str {
        match self {
            FilterFunctionType::True => "true",
            FilterFunctionType::False => "false",
            FilterFunctionType::String => "string",
            FilterFunctionType::Contains => "contains",
            FilterFunctionType::UserDefined => "userdefined",
            FilterFunctionType::Not => "not",
            FilterFunctionType::Boolean => "boolean",
            FilterFunctionType::Like => "like",
            FilterFunctionType::In => "in",
        }
    }

    /// Built-in function spelled exactly `name`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::BUILT_IN.iter().copied().find(|f| f.name() == name)
    }
}

/// Binary filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperatorType {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    Or,
    And,
}

impl FilterOperatorType {
    /// Operator text, including the spaces around `and`/`or`
    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOperatorType::Lt => "<",
            FilterOperatorType::Gt => ">",
            FilterOperatorType::Le => "<=",
            FilterOperatorType::Ge => ">=",
            FilterOperatorType::Eq => "=",
            FilterOperatorType::Ne => "!=",
            FilterOperatorType::Or => " or ",
            FilterOperatorType::And => " and ",
        }
    }
}

/// A node of the filter AST
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// `@Name`
    Attribute(String),
    Constant(FilterConstant),
    Operator {
        op: FilterOperatorType,
        left: Box<FilterNode>,
        right: Box<FilterNode>,
    },
    /// Unary minus
    Negation(Box<FilterNode>),
    Function {
        kind: FilterFunctionType,
        name: String,
        args: Vec<FilterNode>,
    },
    Group(Box<FilterNode>),
}

impl FilterNode {
    // === Construction ===

    pub fn attribute(name: impl Into<String>) -> Self {
        FilterNode::Attribute(name.into())
    }

    pub fn number(value: f64) -> Self {
        FilterNode::Constant(FilterConstant::Number(value))
    }

    pub fn boolean(value: bool) -> Self {
        FilterNode::Constant(FilterConstant::Boolean(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        FilterNode::Constant(FilterConstant::String(value.into()))
    }

    pub fn operator(op: FilterOperatorType, left: FilterNode, right: FilterNode) -> Self {
        FilterNode::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negation(operand: FilterNode) -> Self {
        FilterNode::Negation(Box::new(operand))
    }

    /// Call a built-in function
    pub fn function(kind: FilterFunctionType, args: Vec<FilterNode>) -> Self {
        FilterNode::Function {
            kind,
            name: kind.name().to_string(),
            args,
        }
    }

    /// Call a function the grammar does not know
    pub fn user_defined(name: impl Into<String>, args: Vec<FilterNode>) -> Self {
        FilterNode::Function {
            kind: FilterFunctionType::UserDefined,
            name: name.into(),
            args,
        }
    }

    pub fn group(child: FilterNode) -> Self {
        FilterNode::Group(Box::new(child))
    }
}

impl fmt::Display for FilterConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterConstant::Number(n) => write!(f, "{n}"),
            FilterConstant::Boolean(true) => f.write_str("true()"),
            FilterConstant::Boolean(false) => f.write_str("false()"),
            FilterConstant::String(s) => write!(f, "'{}'", urn_escape(s)),
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Attribute(name) => write!(f, "@{name}"),
            FilterNode::Constant(c) => write!(f, "{c}"),
            FilterNode::Operator { op, left, right } => {
                write!(f, "{left}{}{right}", op.symbol())
            }
            FilterNode::Negation(operand) => write!(f, "-{operand}"),
            FilterNode::Function { name, args, .. } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            FilterNode::Group(child) => write!(f, "({child})"),
        }
    }
}
