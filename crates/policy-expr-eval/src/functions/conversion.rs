//! Conversion Functions
//!
//! Implements: Enum, Guid (True and False are dispatched inline)

use super::arg;
use crate::engine::ExprEngine;
use policy_expr_diagnostics::Result;
use policy_expr_types::{Value, to_guid, to_text};

impl ExprEngine {
    /// Evaluate Enum(type, member) through the engine's enum registry
    pub fn eval_enum(&self, args: &[Value]) -> Result<Value> {
        let type_name = to_text(arg(args, 0));
        let member = to_text(arg(args, 1));
        let value = self.enums().parse(&type_name, &member).inspect_err(|e| {
            log::debug!("cannot resolve Enum('{type_name}', '{member}'): {e}");
        })?;
        Ok(Value::Enum(value))
    }

    /// Evaluate Guid(text)
    pub fn eval_guid(&self, args: &[Value]) -> Result<Value> {
        to_guid(arg(args, 0)).map(Value::Guid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_expr_diagnostics::ExprError;
    use policy_expr_types::{EnumDefinition, EnumRegistry, StaticEnumProvider};

    #[test]
    fn test_enum_resolution() {
        let provider = StaticEnumProvider::new().with_definition(
            EnumDefinition::new("RecoveryModel", false)
                .with_member("Simple", 3)
                .with_member("Full", 1),
        );
        let engine = ExprEngine::new().with_enums(EnumRegistry::shared(provider));

        match engine
            .eval_enum(&[Value::string("RecoveryModel"), Value::string("Full")])
            .unwrap()
        {
            Value::Enum(e) => {
                assert_eq!(e.value, 1);
                assert_eq!(e.member, "Full");
                assert!(!e.flags);
            }
            other => panic!("expected enum, got {other:?}"),
        }

        assert!(matches!(
            engine.eval_enum(&[Value::string("Unknown"), Value::string("Full")]),
            Err(ExprError::UnsupportedObjectType { .. })
        ));
        assert!(matches!(
            engine.eval_enum(&[Value::string("RecoveryModel"), Value::string("Bulk")]),
            Err(ExprError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_guid() {
        let engine = ExprEngine::new();
        let text = "6f9619ff-8b86-d011-b42d-00c04fc964ff";
        let value = engine.eval_guid(&[Value::string(text)]).unwrap();
        assert_eq!(value.to_string(), text);
        assert!(matches!(
            engine.eval_guid(&[Value::string("not-a-guid")]),
            Err(ExprError::TypeConversion { .. })
        ));
    }
}
