//! Canonical nodes for runtime values

use crate::{ExpressionNode, FunctionKind};
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{Value, datetime_to_iso};

/// Build the node that evaluates to `value`.
///
/// Numbers and strings become constants; everything else becomes the
/// constructor call that produces it, e.g. `DateTime('2020-01-01T00:00:00.0000000')`.
pub fn construct_node(value: &Value) -> Result<ExpressionNode> {
    let text = |s: String| ExpressionNode::constant(Value::String(s));
    match value {
        Value::Null | Value::Empty => Err(ExprError::UnsupportedObjectType {
            type_name: value.kind_name().to_string(),
        }),
        Value::Enum(e) => ExpressionNode::function(
            FunctionKind::Enum,
            vec![text(e.type_name.clone())?, text(e.member.clone())?],
        ),
        Value::Int(_)
        | Value::Long(_)
        | Value::Short(_)
        | Value::Byte(_)
        | Value::Double(_)
        | Value::Single(_)
        | Value::Decimal(_)
        | Value::String(_)
        | Value::Char(_)
        | Value::Secure(_) => ExpressionNode::constant(value.clone()),
        Value::DateTime(dt) => {
            ExpressionNode::function(FunctionKind::DateTime, vec![text(datetime_to_iso(dt))?])
        }
        Value::Bool(true) => ExpressionNode::function(FunctionKind::True, vec![]),
        Value::Bool(false) => ExpressionNode::function(FunctionKind::False, vec![]),
        Value::Guid(g) => ExpressionNode::function(FunctionKind::Guid, vec![text(g.to_string())?]),
        Value::Array(items) => {
            let args = items
                .iter()
                .cloned()
                .map(ExpressionNode::constant)
                .collect::<Result<Vec<_>>>()?;
            ExpressionNode::function(FunctionKind::Array, args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;
    use chrono::NaiveDate;
    use policy_expr_types::{EnumValue, TypeClass};
    use uuid::Uuid;

    #[test]
    fn test_scalars_become_constants() {
        let node = construct_node(&Value::Int(7)).unwrap();
        assert_eq!(node.kind(), NodeKind::Constant);
        assert_eq!(construct_node(&Value::string("x")).unwrap().to_string(), "'x'");
    }

    #[test]
    fn test_constructor_calls() {
        assert_eq!(construct_node(&Value::Bool(true)).unwrap().to_string(), "True()");
        assert_eq!(construct_node(&Value::Bool(false)).unwrap().to_string(), "False()");

        let dt = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            construct_node(&Value::DateTime(dt)).unwrap().to_string(),
            "DateTime('2020-01-01T00:00:00.0000000')"
        );

        let g = Uuid::parse_str("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap();
        assert_eq!(
            construct_node(&Value::Guid(g)).unwrap().to_string(),
            "Guid('6f9619ff-8b86-d011-b42d-00c04fc964ff')"
        );

        let e = Value::Enum(EnumValue::new("RecoveryModel", "Full", 1, false));
        assert_eq!(
            construct_node(&e).unwrap().to_string(),
            "Enum('RecoveryModel', 'Full')"
        );
    }

    #[test]
    fn test_arrays() {
        let node = construct_node(&Value::Array(vec![Value::Int(1), Value::Int(2)])).unwrap();
        assert_eq!(node.to_string(), "Array(1, 2)");
        assert_eq!(node.type_class(), TypeClass::Array);

        let mixed = Value::Array(vec![Value::Int(1), Value::string("a")]);
        assert!(construct_node(&mixed).is_err());
    }

    #[test]
    fn test_null_rejected() {
        assert!(matches!(
            construct_node(&Value::Null),
            Err(ExprError::UnsupportedObjectType { .. })
        ));
    }
}
