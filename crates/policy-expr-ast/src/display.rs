//! Text rendering of expression trees

use crate::{ExpressionNode, FunctionKind, NodeKind};
use policy_expr_types::escape::urn_escape;
use policy_expr_types::{Value, datetime_to_iso, parse_datetime};
use std::fmt;

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionNode::Constant(c) => match c.value() {
                Value::Null => f.write_str("NULL"),
                Value::String(s) => write!(f, "'{}'", urn_escape(s)),
                other => write!(f, "{other}"),
            },
            ExpressionNode::Attribute(a) => write!(f, "@{}", a.name()),
            ExpressionNode::Operator(o) => {
                write!(f, "{} {} {}", o.left(), o.op().symbol(), o.right())
            }
            ExpressionNode::Group(g) => write!(f, "({})", g.child()),
            ExpressionNode::Function(func) => {
                write!(f, "{}(", func.kind())?;
                for (i, arg) in func.args().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl ExpressionNode {
    /// Short text for UI display.
    ///
    /// Only constants, attributes and constant-argument calls to True,
    /// False, Enum, DateTime and Guid have a display form.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            ExpressionNode::Constant(_) | ExpressionNode::Attribute(_) => Some(self.to_string()),
            ExpressionNode::Operator(_) | ExpressionNode::Group(_) => None,
            ExpressionNode::Function(func) => {
                if func.args().iter().any(|a| a.kind() != NodeKind::Constant) {
                    return None;
                }
                let arg_text = |i: usize| {
                    func.args()
                        .get(i)
                        .and_then(ExpressionNode::as_constant)
                        .map(|c| c.value().to_string())
                };
                match func.kind() {
                    FunctionKind::True => Some("True".to_string()),
                    FunctionKind::False => Some("False".to_string()),
                    FunctionKind::Enum => arg_text(1),
                    FunctionKind::DateTime => arg_text(0)
                        .and_then(|text| parse_datetime(&text).ok())
                        .map(|dt| datetime_to_iso(&dt)),
                    FunctionKind::Guid => arg_text(0),
                    _ => None,
                }
            }
        }
    }

    /// Cached result as text: empty when unset, strings quoted, arrays as
    /// `{a,b}`
    pub fn result_string(&self) -> String {
        match self.last_result() {
            Value::Null => String::new(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_string).collect();
                format!("{{{}}}", parts.join(","))
            }
            Value::String(s) => format!("'{s}'"),
            other => other.to_string(),
        }
    }
}
