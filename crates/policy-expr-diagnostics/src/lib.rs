//! Policy expression diagnostics and error handling
//!
//! This crate provides the error infrastructure shared by every layer of the
//! expression engine: the `ExprError` taxonomy, stable error codes, and the
//! error category callers branch on (for example, a UI shows a friendly
//! message only for conversion and configuration errors).

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for expression engine operations
pub type Result<T> = std::result::Result<T, ExprError>;
