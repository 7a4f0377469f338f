//! String Functions
//!
//! Implements: Len, String, Upper, Lower, Concatenate, Escape

use super::arg;
use crate::context::EvaluationContext;
use crate::engine::ExprEngine;
use policy_expr_diagnostics::{ExprError, Result};
use policy_expr_types::{Value, to_text};

impl ExprEngine {
    /// Evaluate Len: number of characters, null counts as empty
    pub fn eval_len(&self, args: &[Value]) -> Result<Value> {
        let count = to_text(arg(args, 0)).chars().count();
        i32::try_from(count)
            .map(Value::Int)
            .map_err(|_| ExprError::type_conversion(count.to_string(), "Int32"))
    }

    /// Evaluate String: text form of any value
    pub fn eval_string(&self, args: &[Value]) -> Value {
        Value::String(to_text(arg(args, 0)))
    }

    /// Evaluate Upper using the culture of the context
    pub fn eval_upper(&self, args: &[Value], ctx: &dyn EvaluationContext) -> Value {
        let text = to_text(arg(args, 0));
        Value::String(to_upper(&text, self.culture(ctx)))
    }

    /// Evaluate Lower using the culture of the context
    pub fn eval_lower(&self, args: &[Value], ctx: &dyn EvaluationContext) -> Value {
        let text = to_text(arg(args, 0));
        Value::String(to_lower(&text, self.culture(ctx)))
    }

    pub fn eval_concatenate(&self, args: &[Value]) -> Value {
        let mut result = to_text(arg(args, 0));
        result.push_str(&to_text(arg(args, 1)));
        Value::String(result)
    }

    /// Evaluate Escape(text, needle, prefix)
    ///
    /// Every occurrence of `needle` in `text` is preceded by `prefix`.
    pub fn eval_escape(&self, args: &[Value]) -> Result<Value> {
        let text = to_text(arg(args, 0));
        let needle = to_text(arg(args, 1));
        let prefix = to_text(arg(args, 2));
        if needle.is_empty() {
            return Err(ExprError::invalid_argument(
                "the string to escape cannot be null or empty",
            ));
        }
        let replacement = format!("{prefix}{needle}");
        Ok(Value::String(text.replace(&needle, &replacement)))
    }
}

/// Turkish and Azeri map dotted and dotless i differently from every
/// other culture
fn has_turkic_casing(culture: Option<&str>) -> bool {
    culture.is_some_and(|c| {
        let language = c.split(['-', '_']).next().unwrap_or(c);
        language.eq_ignore_ascii_case("tr") || language.eq_ignore_ascii_case("az")
    })
}

fn to_upper(text: &str, culture: Option<&str>) -> String {
    if has_turkic_casing(culture) {
        text.chars()
            .map(|c| match c {
                'i' => "\u{130}".to_string(),
                'ı' => "I".to_string(),
                other => other.to_uppercase().collect(),
            })
            .collect()
    } else {
        text.to_uppercase()
    }
}

fn to_lower(text: &str, culture: Option<&str>) -> String {
    if has_turkic_casing(culture) {
        text.chars()
            .map(|c| match c {
                'I' => "ı".to_string(),
                '\u{130}' => "i".to_string(),
                other => other.to_lowercase().collect(),
            })
            .collect()
    } else {
        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyBag;

    #[test]
    fn test_len_counts_chars() {
        let engine = ExprEngine::new();
        assert_eq!(engine.eval_len(&[Value::string("héllo")]).unwrap(), Value::Int(5));
        assert_eq!(engine.eval_len(&[Value::Null]).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_culture_casing() {
        assert_eq!(to_upper("istanbul", None), "ISTANBUL");
        assert_eq!(to_upper("istanbul", Some("tr-TR")), "İSTANBUL");
        assert_eq!(to_lower("DIŞ", Some("tr")), "dış");
        assert_eq!(to_lower("DIŞ", Some("en-US")), "diş");
    }

    #[test]
    fn test_upper_uses_context_culture() {
        let engine = ExprEngine::new();
        let ctx = PropertyBag::new().with_culture("az-Latn-AZ");
        assert_eq!(
            engine.eval_upper(&[Value::string("bir")], &ctx),
            Value::string("BİR")
        );
    }

    #[test]
    fn test_escape() {
        let engine = ExprEngine::new();
        let args = [Value::string("50%_off"), Value::string("%"), Value::string("\\")];
        assert_eq!(engine.eval_escape(&args).unwrap(), Value::string("50\\%_off"));

        let empty = [Value::string("abc"), Value::string(""), Value::string("\\")];
        assert!(matches!(
            engine.eval_escape(&empty),
            Err(ExprError::InvalidArgument { .. })
        ));
    }
}
