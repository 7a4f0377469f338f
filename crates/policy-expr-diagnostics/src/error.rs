//! Expression engine error types

use crate::error_code::{
    ErrorCode, PEX0001, PEX0002, PEX0003, PEX0004, PEX0005, PEX0006, PEX0007, PEX0008, PEX0100,
    PEX0101, PEX0102, PEX0103, PEX0104, PEX0105, PEX0106, PEX0107, PEX0108, PEX0109, PEX0200,
    PEX0201, PEX0202, PEX0300, PEX0301, PEX0302, PEX0400, PEX0401,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad family an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Tree could not be built as requested
    Structural,
    /// Failure while evaluating a tree
    Evaluation,
    /// Failure while reading or writing the serialized document
    Serialization,
    /// Failure converting to or from the filter grammar
    Conversion,
    /// Failure inferring property writes from a condition
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Structural => write!(f, "structural"),
            ErrorCategory::Evaluation => write!(f, "evaluation"),
            ErrorCategory::Serialization => write!(f, "serialization"),
            ErrorCategory::Conversion => write!(f, "conversion"),
            ErrorCategory::Configuration => write!(f, "configuration"),
        }
    }
}

/// Main expression engine error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("operand {operand} is not valid for operator {operator}")]
    InvalidOperand { operator: String, operand: String },

    #[error("operator {operator} is not applicable to type {type_class}")]
    OperatorNotApplicable { operator: String, type_class: String },

    #[error("invalid IN operator: {message}")]
    InvalidInOperator { message: String },

    #[error("function {function} expects {expected} argument(s), found {found}")]
    WrongArgumentsNumber {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {position} of {function} must be {expected}, found {found}")]
    WrongArgumentType {
        function: String,
        position: usize,
        expected: String,
        found: String,
    },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("facet {facet} has no property {property}")]
    MissingProperty { facet: String, property: String },

    #[error("unsupported type: {type_name}")]
    UnsupportedType { type_name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("unsupported object type: {type_name}")]
    UnsupportedObjectType { type_name: String },

    #[error("bad date part: {part}")]
    BadDatePart { part: String },

    #[error("property not found: {property}")]
    PropertyNotFound { property: String },

    #[error("script failed: {message}")]
    ScriptFailed { message: String },

    #[error("scripts are disabled, cannot evaluate {function}")]
    ScriptsDisabled { function: String },

    #[error("no script target available for {function}")]
    NoScriptTarget { function: String },

    #[error("script returned {count} columns, expected 1")]
    TooManyColumns { count: usize },

    #[error("bad expression tree: {message}")]
    BadExpressionTree { message: String },

    #[error("invalid LIKE pattern '{pattern}': {message}")]
    InvalidLikePattern { pattern: String, message: String },

    #[error("unexpected element: found {found}, expected {expected}")]
    Serialization { found: String, expected: String },

    #[error("cannot convert '{value}' to {type_name}")]
    TypeConversion { value: String, type_name: String },

    #[error("xml error: {message}")]
    Xml { message: String },

    #[error("conversion not supported: {message}")]
    ConversionNotSupported { message: String },

    #[error("parse error: {message}")]
    Parse { message: String, input: String },

    #[error("date part must be quoted in: {input}")]
    UnquotedDatePart { input: String },

    #[error("expression is not configurable: {expression}")]
    NotConfigurable { expression: String },

    #[error("operator in {expression} cannot configure property {property}")]
    NotConfigurableOperator { property: String, expression: String },
}

impl ExprError {
    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ExprError::InvalidOperand { .. } => PEX0001,
            ExprError::OperatorNotApplicable { .. } => PEX0002,
            ExprError::InvalidInOperator { .. } => PEX0003,
            ExprError::WrongArgumentsNumber { .. } => PEX0004,
            ExprError::WrongArgumentType { .. } => PEX0005,
            ExprError::InvalidArgument { .. } => PEX0006,
            ExprError::MissingProperty { .. } => PEX0007,
            ExprError::UnsupportedType { .. } => PEX0008,
            ExprError::TypeMismatch { .. } => PEX0100,
            ExprError::UnsupportedObjectType { .. } => PEX0101,
            ExprError::BadDatePart { .. } => PEX0102,
            ExprError::PropertyNotFound { .. } => PEX0103,
            ExprError::ScriptFailed { .. } => PEX0104,
            ExprError::ScriptsDisabled { .. } => PEX0105,
            ExprError::NoScriptTarget { .. } => PEX0106,
            ExprError::TooManyColumns { .. } => PEX0107,
            ExprError::BadExpressionTree { .. } => PEX0108,
            ExprError::InvalidLikePattern { .. } => PEX0109,
            ExprError::Serialization { .. } => PEX0200,
            ExprError::TypeConversion { .. } => PEX0201,
            ExprError::Xml { .. } => PEX0202,
            ExprError::ConversionNotSupported { .. } => PEX0300,
            ExprError::Parse { .. } => PEX0301,
            ExprError::UnquotedDatePart { .. } => PEX0302,
            ExprError::NotConfigurable { .. } => PEX0400,
            ExprError::NotConfigurableOperator { .. } => PEX0401,
        }
    }

    /// Category derived from the code range
    pub fn category(&self) -> ErrorCategory {
        let code = self.code();
        if code.is_structural_error() {
            ErrorCategory::Structural
        } else if code.is_evaluation_error() {
            ErrorCategory::Evaluation
        } else if code.is_serialization_error() {
            ErrorCategory::Serialization
        } else if code.is_conversion_error() {
            ErrorCategory::Conversion
        } else {
            ErrorCategory::Configuration
        }
    }

    pub fn invalid_operand(operator: impl Into<String>, operand: impl Into<String>) -> Self {
        Self::InvalidOperand {
            operator: operator.into(),
            operand: operand.into(),
        }
    }

    pub fn operator_not_applicable(
        operator: impl Into<String>,
        type_class: impl Into<String>,
    ) -> Self {
        Self::OperatorNotApplicable {
            operator: operator.into(),
            type_class: type_class.into(),
        }
    }

    pub fn invalid_in(message: impl Into<String>) -> Self {
        Self::InvalidInOperator {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn serialization(found: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Serialization {
            found: found.into(),
            expected: expected.into(),
        }
    }

    pub fn type_conversion(value: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::TypeConversion {
            value: value.into(),
            type_name: type_name.into(),
        }
    }

    pub fn conversion_not_supported(message: impl Into<String>) -> Self {
        Self::ConversionNotSupported {
            message: message.into(),
        }
    }

    pub fn not_configurable(expression: impl Into<String>) -> Self {
        Self::NotConfigurable {
            expression: expression.into(),
        }
    }

    /// Check whether this is a type mismatch
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, ExprError::TypeMismatch { .. })
    }
}
