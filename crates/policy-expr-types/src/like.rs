//! LIKE pattern support
//!
//! LIKE patterns follow T-SQL conventions: `%` matches any run of characters,
//! `_` a single character, `[abc]` / `[^abc]` character classes, and `\`
//! escapes the next character. Patterns are translated to an anchored regex.

use policy_expr_diagnostics::{ExprError, Result};
use regex::RegexBuilder;

fn invalid(pattern: &str, message: impl Into<String>) -> ExprError {
    ExprError::InvalidLikePattern {
        pattern: pattern.to_string(),
        message: message.into(),
    }
}

/// Translate a LIKE pattern into an anchored regular expression
pub fn like_to_regex(like_pattern: &str) -> Result<String> {
    let pattern = like_pattern.replace("''", "'");
    let chars: Vec<char> = pattern.chars().collect();

    let mut rx = String::with_capacity(pattern.len() + 8);
    rx.push_str(r"\A");

    let mut escape_mode = false;
    let mut open_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let mut enter_escape = false;
        match c {
            '\\' if escape_mode => rx.push_str(r"\\"),
            '\\' => enter_escape = true,
            '%' if escape_mode => rx.push('%'),
            '%' => rx.push_str(".*"),
            '_' if escape_mode => rx.push('_'),
            '_' => rx.push('.'),
            '[' if escape_mode => rx.push_str(r"\["),
            '[' => {
                // `[x]` is a bracketed literal, e.g. `[%]`
                if i + 2 < chars.len() && chars[i + 2] == ']' {
                    rx.push_str(&regex::escape(&chars[i + 1].to_string()));
                    i += 3;
                    escape_mode = false;
                    continue;
                }
                rx.push('[');
                if chars.get(i + 1) == Some(&'^') {
                    rx.push('^');
                    i += 1;
                }
                open_class = true;
            }
            ']' if escape_mode => rx.push_str(r"\]"),
            ']' => {
                rx.push(']');
                open_class = false;
            }
            '*' | '.' | '(' | ')' | '^' | '$' | '+' | '?' | '{' | '}' | '|' => {
                rx.push('\\');
                rx.push(c);
            }
            other => rx.push(other),
        }
        escape_mode = enter_escape;
        i += 1;
    }

    if open_class {
        return Err(invalid(like_pattern, "unclosed bracket"));
    }

    rx.push_str(r"\z");
    Ok(rx)
}

/// Match `input` against a LIKE pattern
pub fn like_match(input: &str, like_pattern: &str, case_insensitive: bool) -> Result<bool> {
    let rx = like_to_regex(like_pattern)?;
    let regex = RegexBuilder::new(&rx)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| invalid(like_pattern, e.to_string()))?;
    Ok(regex.is_match(input))
}
