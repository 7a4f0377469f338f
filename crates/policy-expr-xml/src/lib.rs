//! Document form of policy condition expression trees
//!
//! This crate provides:
//! - A writer producing the canonical, indented element document for a tree,
//!   optionally including every node's cached evaluation result
//! - A positional, fail-fast reader for the same documents
//! - The mapping between runtime values and `System.*` type names
//!
//! ```text
//! <Operator>
//!   <TypeClass>Bool</TypeClass>
//!   <OpType>EQ</OpType>
//!   <Count>2</Count>
//!   <Attribute>
//!     <TypeClass>String</TypeClass>
//!     <Name>Name</Name>
//!   </Attribute>
//!   <Constant>
//!     <TypeClass>String</TypeClass>
//!     <ObjType>System.String</ObjType>
//!     <Value>master</Value>
//!   </Constant>
//! </Operator>
//! ```

pub mod reader;
pub mod type_name;
pub mod writer;

pub use reader::{ExpressionReader, deserialize, deserialize_with_results};
pub use type_name::{ARRAY_TYPE, NULL_TYPE, type_name, value_from_text, value_to_text};
pub use writer::{ExpressionWriter, serialize, serialize_with_results};

/// Element names shared by the writer and the reader
mod tags {
    pub const TYPE_CLASS: &str = "TypeClass";
    pub const OBJ_TYPE: &str = "ObjType";
    pub const VALUE: &str = "Value";
    pub const NAME: &str = "Name";
    pub const OP_TYPE: &str = "OpType";
    pub const FUNCTION_TYPE: &str = "FunctionType";
    pub const RETURN_TYPE: &str = "ReturnType";
    pub const COUNT: &str = "Count";
    pub const RESULT_OBJ_TYPE: &str = "ResultObjType";
    pub const RESULT_VALUE: &str = "ResultValue";
}
