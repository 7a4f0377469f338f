//! Expression engine error codes following a structured numbering system
//!
//! Error code ranges:
//! - PEX0001-PEX0099: Structural errors (node construction, signatures)
//! - PEX0100-PEX0199: Evaluation errors (runtime)
//! - PEX0200-PEX0299: Serialization errors (document reading and writing)
//! - PEX0300-PEX0399: Conversion errors (filter bridge, text parsing)
//! - PEX0400-PEX0499: Configuration errors (inverse inference)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a structural error (0001-0099)
    pub const fn is_structural_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is an evaluation error (0100-0199)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a serialization error (0200-0299)
    pub const fn is_serialization_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a conversion error (0300-0399)
    pub const fn is_conversion_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a configuration error (0400-0499)
    pub const fn is_configuration_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PEX{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Structural errors (0001-0099)
    map.insert(
        1,
        ErrorInfo::new("Invalid operand").with_help(
            "Comparison operands must be constants, attributes or functions; \
             AND/OR operands must be operators or groups",
        ),
    );
    map.insert(2, ErrorInfo::new("Operator not applicable to type"));
    map.insert(
        3,
        ErrorInfo::new("Invalid IN operator")
            .with_help("The right side of IN must be an Array() call or an array attribute"),
    );
    map.insert(4, ErrorInfo::new("Wrong number of function arguments"));
    map.insert(5, ErrorInfo::new("Wrong function argument type"));
    map.insert(6, ErrorInfo::new("Invalid argument"));
    map.insert(7, ErrorInfo::new("Property missing from facet"));
    map.insert(8, ErrorInfo::new("Unsupported value type"));

    // Evaluation errors (0100-0199)
    map.insert(100, ErrorInfo::new("Type mismatch"));
    map.insert(101, ErrorInfo::new("Unsupported object type"));
    map.insert(
        102,
        ErrorInfo::new("Bad date part").with_help(
            "Use one of YEAR, MONTH, DAYOFYEAR, DAY, WEEKDAY, HOUR, MINUTE, SECOND, MILLISECOND",
        ),
    );
    map.insert(103, ErrorInfo::new("Property not found"));
    map.insert(104, ErrorInfo::new("Script execution failed"));
    map.insert(
        105,
        ErrorInfo::new("Scripts disabled").with_help("Set allow_scripts in the engine settings"),
    );
    map.insert(106, ErrorInfo::new("No script target available"));
    map.insert(107, ErrorInfo::new("Script returned too many columns"));
    map.insert(108, ErrorInfo::new("Bad expression tree"));
    map.insert(109, ErrorInfo::new("Invalid LIKE pattern"));

    // Serialization errors (0200-0299)
    map.insert(200, ErrorInfo::new("Unexpected serialized element"));
    map.insert(201, ErrorInfo::new("Scalar type conversion failed"));
    map.insert(202, ErrorInfo::new("Malformed XML document"));

    // Conversion errors (0300-0399)
    map.insert(300, ErrorInfo::new("Conversion not supported"));
    map.insert(301, ErrorInfo::new("Condition text could not be parsed"));
    map.insert(
        302,
        ErrorInfo::new("Unquoted date part")
            .with_help("Date parts are string arguments: DateAdd('day', 1, GetDate())"),
    );

    // Configuration errors (0400-0499)
    map.insert(400, ErrorInfo::new("Expression is not configurable"));
    map.insert(401, ErrorInfo::new("Operator is not configurable"));

    map
});

// Structural errors
pub const PEX0001: ErrorCode = ErrorCode::new(1);
pub const PEX0002: ErrorCode = ErrorCode::new(2);
pub const PEX0003: ErrorCode = ErrorCode::new(3);
pub const PEX0004: ErrorCode = ErrorCode::new(4);
pub const PEX0005: ErrorCode = ErrorCode::new(5);
pub const PEX0006: ErrorCode = ErrorCode::new(6);
pub const PEX0007: ErrorCode = ErrorCode::new(7);
pub const PEX0008: ErrorCode = ErrorCode::new(8);

// Evaluation errors
pub const PEX0100: ErrorCode = ErrorCode::new(100);
pub const PEX0101: ErrorCode = ErrorCode::new(101);
pub const PEX0102: ErrorCode = ErrorCode::new(102);
pub const PEX0103: ErrorCode = ErrorCode::new(103);
pub const PEX0104: ErrorCode = ErrorCode::new(104);
pub const PEX0105: ErrorCode = ErrorCode::new(105);
pub const PEX0106: ErrorCode = ErrorCode::new(106);
pub const PEX0107: ErrorCode = ErrorCode::new(107);
pub const PEX0108: ErrorCode = ErrorCode::new(108);
pub const PEX0109: ErrorCode = ErrorCode::new(109);

// Serialization errors
pub const PEX0200: ErrorCode = ErrorCode::new(200);
pub const PEX0201: ErrorCode = ErrorCode::new(201);
pub const PEX0202: ErrorCode = ErrorCode::new(202);

// Conversion errors
pub const PEX0300: ErrorCode = ErrorCode::new(300);
pub const PEX0301: ErrorCode = ErrorCode::new(301);
pub const PEX0302: ErrorCode = ErrorCode::new(302);

// Configuration errors
pub const PEX0400: ErrorCode = ErrorCode::new(400);
pub const PEX0401: ErrorCode = ErrorCode::new(401);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(PEX0001.to_string(), "PEX0001");
        assert_eq!(PEX0302.to_string(), "PEX0302");
    }

    #[test]
    fn test_error_ranges() {
        assert!(PEX0001.is_structural_error());
        assert!(!PEX0001.is_evaluation_error());
        assert!(PEX0100.is_evaluation_error());
        assert!(PEX0201.is_serialization_error());
        assert!(PEX0300.is_conversion_error());
        assert!(PEX0401.is_configuration_error());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(PEX0102.info().description, "Bad date part");
        assert!(PEX0102.info().help.is_some());
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }
}
