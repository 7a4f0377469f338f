//! Boolean filter grammar for policy conditions
//!
//! This crate provides:
//! - The filter AST and its text form (`@Name='x' and like(@Path, 'C:%')`)
//! - A parser from filter text, either to the AST or straight to an
//!   expression tree
//! - Conversion between expression trees and the filter AST
//!
//! ```text
//! @Name='master' and not(like(@Path, 'C:%'))
//! ```

pub mod convert;
pub mod node;
pub mod parser;

pub use convert::{FilterConverter, from_filter, to_filter, to_filter_string};
pub use node::{FilterConstant, FilterFunctionType, FilterNode, FilterOperatorType};
pub use parser::{parse_condition, parse_filter};
