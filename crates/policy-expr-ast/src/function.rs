//! Built-in function library and signatures

use policy_expr_types::TypeClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in functions callable from an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    // === Scripts ===
    /// Run a T-SQL query against the target; first argument names the result class
    ExecuteSql,
    /// Run a WQL query against the target
    ExecuteWql,

    // === Date/Time ===
    GetDate,
    DateAdd,
    DatePart,

    // === Aggregates ===
    Sum,
    Avg,
    Count,

    Len,
    IsNull,
    Array,

    // === Arithmetic ===
    Add,
    Subtract,
    Multiply,
    Divide,
    BitwiseAnd,
    BitwiseOr,
    Power,
    Mod,
    Round,

    // === Constructors ===
    Enum,
    DateTime,
    String,
    True,
    False,
    Guid,

    // === Strings ===
    Upper,
    Lower,
    Concatenate,
    Escape,
}

/// Return class and parameter classes of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub return_type: TypeClass,
    pub params: &'static [TypeClass],
}

impl Signature {
    const fn new(return_type: TypeClass, params: &'static [TypeClass]) -> Self {
        Self {
            return_type,
            params,
        }
    }

    /// Any number of arguments sharing one class
    pub fn is_var_args(&self) -> bool {
        self.params.first() == Some(&TypeClass::VarArgs)
    }

    /// Fixed argument count; `None` for var-args
    pub fn arity(&self) -> Option<usize> {
        if self.is_var_args() {
            None
        } else {
            Some(self.params.len())
        }
    }

    /// The return class is taken from the first argument, which names it
    pub fn returns_named_class(&self) -> bool {
        self.return_type == TypeClass::Variant && self.params.first() == Some(&TypeClass::String)
    }
}

use TypeClass::{
    Array as A, Bool as B, DateTime as D, Guid as G, Numeric as N, String as S, VarArgs as V,
    Variant as X,
};

const NUMERIC_BINARY: Signature = Signature::new(N, &[N, N]);

impl FunctionKind {
    pub const ALL: [FunctionKind; 30] = [
        FunctionKind::ExecuteSql,
        FunctionKind::ExecuteWql,
        FunctionKind::GetDate,
        FunctionKind::DateAdd,
        FunctionKind::DatePart,
        FunctionKind::Sum,
        FunctionKind::Avg,
        FunctionKind::Count,
        FunctionKind::Len,
        FunctionKind::IsNull,
        FunctionKind::Array,
        FunctionKind::Add,
        FunctionKind::Subtract,
        FunctionKind::Multiply,
        FunctionKind::Divide,
        FunctionKind::BitwiseAnd,
        FunctionKind::BitwiseOr,
        FunctionKind::Power,
        FunctionKind::Mod,
        FunctionKind::Round,
        FunctionKind::Enum,
        FunctionKind::DateTime,
        FunctionKind::String,
        FunctionKind::True,
        FunctionKind::False,
        FunctionKind::Guid,
        FunctionKind::Upper,
        FunctionKind::Lower,
        FunctionKind::Concatenate,
        FunctionKind::Escape,
    ];

    /// Name used in documents and display text
    pub const fn name(&self) -> &'static str {
        match self {
            FunctionKind::ExecuteSql => "ExecuteSql",
            FunctionKind::ExecuteWql => "ExecuteWql",
            FunctionKind::GetDate => "GetDate",
            FunctionKind::DateAdd => "DateAdd",
            FunctionKind::DatePart => "DatePart",
            FunctionKind::Sum => "Sum",
            FunctionKind::Avg => "Avg",
            FunctionKind::Count => "Count",
            FunctionKind::Len => "Len",
            FunctionKind::IsNull => "IsNull",
            FunctionKind::Array => "Array",
            FunctionKind::Add => "Add",
            FunctionKind::Subtract => "Subtract",
            FunctionKind::Multiply => "Multiply",
            FunctionKind::Divide => "Divide",
            FunctionKind::BitwiseAnd => "BitwiseAnd",
            FunctionKind::BitwiseOr => "BitwiseOr",
            FunctionKind::Power => "Power",
            FunctionKind::Mod => "Mod",
            FunctionKind::Round => "Round",
            FunctionKind::Enum => "Enum",
            FunctionKind::DateTime => "DateTime",
            FunctionKind::String => "String",
            FunctionKind::True => "True",
            FunctionKind::False => "False",
            FunctionKind::Guid => "Guid",
            FunctionKind::Upper => "Upper",
            FunctionKind::Lower => "Lower",
            FunctionKind::Concatenate => "Concatenate",
            FunctionKind::Escape => "Escape",
        }
    }

    /// Exact name lookup
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Name lookup ignoring ASCII case, as filter text spells functions freely
    pub fn from_name_ignore_case(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn signature(&self) -> Signature {
        match self {
            FunctionKind::ExecuteSql => Signature::new(X, &[S, S]),
            FunctionKind::ExecuteWql => Signature::new(X, &[S, S, S]),
            FunctionKind::GetDate => Signature::new(D, &[]),
            FunctionKind::DateAdd => Signature::new(D, &[S, N, D]),
            FunctionKind::DatePart => Signature::new(N, &[S, D]),
            FunctionKind::Sum | FunctionKind::Avg | FunctionKind::Count => {
                Signature::new(N, &[V])
            }
            FunctionKind::Len => Signature::new(N, &[S]),
            FunctionKind::IsNull => Signature::new(X, &[X, X]),
            FunctionKind::Array => Signature::new(A, &[V]),
            FunctionKind::Add
            | FunctionKind::Subtract
            | FunctionKind::Multiply
            | FunctionKind::Divide
            | FunctionKind::BitwiseAnd
            | FunctionKind::BitwiseOr
            | FunctionKind::Power
            | FunctionKind::Mod
            | FunctionKind::Round => NUMERIC_BINARY,
            FunctionKind::Enum => Signature::new(N, &[S, S]),
            FunctionKind::DateTime => Signature::new(D, &[S]),
            FunctionKind::String => Signature::new(S, &[X]),
            FunctionKind::True | FunctionKind::False => Signature::new(B, &[]),
            FunctionKind::Guid => Signature::new(G, &[S]),
            FunctionKind::Upper | FunctionKind::Lower => Signature::new(S, &[S]),
            FunctionKind::Concatenate => Signature::new(S, &[S, S]),
            FunctionKind::Escape => Signature::new(S, &[S, S, S]),
        }
    }

    /// Function delegates to the physical target
    pub fn is_script(&self) -> bool {
        matches!(self, FunctionKind::ExecuteSql | FunctionKind::ExecuteWql)
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in FunctionKind::ALL {
            assert_eq!(FunctionKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(FunctionKind::from_name("dateadd"), None);
        assert_eq!(
            FunctionKind::from_name_ignore_case("dateadd"),
            Some(FunctionKind::DateAdd)
        );
    }

    #[test]
    fn test_signatures() {
        assert_eq!(FunctionKind::GetDate.signature().arity(), Some(0));
        assert_eq!(FunctionKind::Escape.signature().arity(), Some(3));
        assert!(FunctionKind::Array.signature().is_var_args());
        assert_eq!(FunctionKind::Count.signature().arity(), None);
        assert!(FunctionKind::ExecuteSql.signature().returns_named_class());
        assert!(!FunctionKind::IsNull.signature().returns_named_class());
    }
}
