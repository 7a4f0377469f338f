//! Operator types

use policy_expr_diagnostics::{ExprError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operator of an operator node.
///
/// `Beq`/`Bne` are the bitwise forms of `Eq`/`Ne`; they are only produced
/// when evaluation canonicalizes a comparison against a bitmapped enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorType {
    None,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    In,
    Like,
    NotIn,
    NotLike,
    Beq,
    Bne,
}

impl OperatorType {
    const ALL: [OperatorType; 15] = [
        OperatorType::None,
        OperatorType::And,
        OperatorType::Or,
        OperatorType::Eq,
        OperatorType::Ne,
        OperatorType::Lt,
        OperatorType::Gt,
        OperatorType::Le,
        OperatorType::Ge,
        OperatorType::In,
        OperatorType::Like,
        OperatorType::NotIn,
        OperatorType::NotLike,
        OperatorType::Beq,
        OperatorType::Bne,
    ];

    /// Name used in serialized documents (`EQ`, `NOT_LIKE`, ...)
    pub const fn name(&self) -> &'static str {
        match self {
            OperatorType::None => "NONE",
            OperatorType::And => "AND",
            OperatorType::Or => "OR",
            OperatorType::Eq => "EQ",
            OperatorType::Ne => "NE",
            OperatorType::Lt => "LT",
            OperatorType::Gt => "GT",
            OperatorType::Le => "LE",
            OperatorType::Ge => "GE",
            OperatorType::In => "IN",
            OperatorType::Like => "LIKE",
            OperatorType::NotIn => "NOT_IN",
            OperatorType::NotLike => "NOT_LIKE",
            OperatorType::Beq => "BEQ",
            OperatorType::Bne => "BNE",
        }
    }

    /// Parse a serialized operator name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| ExprError::serialization(name, "OperatorType"))
    }

    /// Display symbol (`=`, `!=`, `NOT LIKE`, ...)
    pub const fn symbol(&self) -> &'static str {
        match self {
            OperatorType::And => "AND",
            OperatorType::Or => "OR",
            OperatorType::Eq | OperatorType::Beq => "=",
            OperatorType::Ne | OperatorType::Bne => "!=",
            OperatorType::Lt => "<",
            OperatorType::Gt => ">",
            OperatorType::Le => "<=",
            OperatorType::Ge => ">=",
            OperatorType::In => "IN",
            OperatorType::Like => "LIKE",
            OperatorType::NotIn => "NOT IN",
            OperatorType::NotLike => "NOT LIKE",
            OperatorType::None => "",
        }
    }

    /// Inverse of [`OperatorType::symbol`]; bitwise forms are never returned
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol {
            "AND" => Ok(OperatorType::And),
            "OR" => Ok(OperatorType::Or),
            "=" => Ok(OperatorType::Eq),
            "!=" => Ok(OperatorType::Ne),
            "<" => Ok(OperatorType::Lt),
            ">" => Ok(OperatorType::Gt),
            "<=" => Ok(OperatorType::Le),
            ">=" => Ok(OperatorType::Ge),
            "IN" => Ok(OperatorType::In),
            "LIKE" => Ok(OperatorType::Like),
            "NOT IN" => Ok(OperatorType::NotIn),
            "NOT LIKE" => Ok(OperatorType::NotLike),
            other => Err(ExprError::invalid_argument(format!(
                "'{other}' is not an operator"
            ))),
        }
    }

    /// AND or OR
    pub const fn is_logical(&self) -> bool {
        matches!(self, OperatorType::And | OperatorType::Or)
    }

    /// IN or NOT IN
    pub const fn is_membership(&self) -> bool {
        matches!(self, OperatorType::In | OperatorType::NotIn)
    }

    /// The bitwise form of an equality operator, if it has one
    pub const fn bitwise(&self) -> Option<OperatorType> {
        match self {
            OperatorType::Eq => Some(OperatorType::Beq),
            OperatorType::Ne => Some(OperatorType::Bne),
            _ => None,
        }
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_round_trip() {
        for op in OperatorType::ALL {
            if matches!(op, OperatorType::None | OperatorType::Beq | OperatorType::Bne) {
                continue;
            }
            assert_eq!(OperatorType::from_symbol(op.symbol()).unwrap(), op);
        }
        assert!(OperatorType::from_symbol("<>").is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(OperatorType::NotLike.name(), "NOT_LIKE");
        assert_eq!(OperatorType::from_name("BEQ").unwrap(), OperatorType::Beq);
        assert!(OperatorType::from_name("eq").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(OperatorType::NotIn.to_string(), "NOT IN");
        assert_eq!(OperatorType::Beq.to_string(), "=");
        assert_eq!(OperatorType::Eq.bitwise(), Some(OperatorType::Beq));
        assert_eq!(OperatorType::Gt.bitwise(), None);
    }
}
