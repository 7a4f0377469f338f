//! Filter text parser using winnow
//!
//! Recursive descent over the filter grammar, lowest precedence first:
//!
//! ```text
//! or         := and ( 'or' and )*
//! and        := comparison ( 'and' comparison )*
//! comparison := unary ( ('=' | '!=' | '<=' | '>=' | '<' | '>') unary )*
//! unary      := '-' number | '-' unary | primary
//! primary    := '@' name | string | number | '(' or ')' | name '(' args ')'
//! ```

use crate::convert::FilterConverter;
use crate::node::{FilterFunctionType, FilterNode, FilterOperatorType};
use policy_expr_ast::{ExpressionNode, Facet};
use policy_expr_diagnostics::{ExprError, Result};
use regex::Regex;
use std::sync::LazyLock;
use winnow::ascii::digit1;
use winnow::combinator::{opt, separated};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{literal, one_of, take_while};

type Input<'a> = &'a str;
type PResult<T> = std::result::Result<T, ContextError>;

/// DATEADD/DATEPART written with a bare date part, e.g. `DATEADD(year, 1, ...)`
static UNQUOTED_DATE_PART: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| {
        Regex::new(
            r"(?i)(DATEADD|DATEPART)\(\s*(YEAR|Y|YY|YYYY|MONTH|MM|M|DAYOFYEAR|DY|DAY|DD|D|WEEKDAY|DW|HOUR|HH|MINUTE|MI|N|SECOND|SS|S|MILLISECOND|MS)\s*,",
        )
    });

/// Parse filter text into the filter AST
pub fn parse_filter(text: &str) -> Result<FilterNode> {
    condition.parse(text).map_err(|e| ExprError::Parse {
        message: format!("unexpected input at offset {}", e.offset()),
        input: text.to_string(),
    })
}

/// Parse condition text straight into an expression tree.
///
/// Text that fails to parse because a DATEADD/DATEPART part was left
/// unquoted is reported as `UnquotedDatePart`.
pub fn parse_condition(text: &str, facet: Option<&Facet>) -> Result<ExpressionNode> {
    FilterConverter::new().parse_condition(text, facet)
}

impl FilterConverter {
    /// Parse condition text, resolving enum calls through this converter
    pub fn parse_condition(&self, text: &str, facet: Option<&Facet>) -> Result<ExpressionNode> {
        let filter = parse_filter(text).map_err(|e| {
            if has_unquoted_date_part(text) {
                ExprError::UnquotedDatePart {
                    input: text.to_string(),
                }
            } else {
                log::debug!("cannot parse condition: {e}");
                e
            }
        })?;
        self.from_filter(&filter, facet)
    }
}

fn has_unquoted_date_part(text: &str) -> bool {
    UNQUOTED_DATE_PART
        .as_ref()
        .is_ok_and(|re| re.is_match(text))
}

// ============================================================================
// Tokens
// ============================================================================

fn ws(input: &mut Input<'_>) -> PResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

fn lit<'a>(s: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    literal(s)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Keyword not followed by another name character
fn keyword<'a>(word: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    move |input: &mut Input<'a>| {
        let checkpoint = *input;
        let matched = lit(word).parse_next(input)?;
        if input.starts_with(is_name_char) {
            *input = checkpoint;
            return Err(ContextError::new());
        }
        Ok(matched)
    }
}

fn padded_keyword<'a>(word: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    move |input: &mut Input<'a>| {
        let checkpoint = *input;
        ws.parse_next(input)?;
        match keyword(word).parse_next(input) {
            Ok(matched) => {
                ws.parse_next(input)?;
                Ok(matched)
            }
            Err(e) => {
                *input = checkpoint;
                Err(e)
            }
        }
    }
}

fn name<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    (
        one_of(|c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., is_name_char),
    )
        .take()
        .parse_next(input)
}

fn until_quote<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    take_while(0.., |c: char| c != '\'').parse_next(input)
}

/// Single-quoted string; a doubled quote stands for one quote
fn string_literal(input: &mut Input<'_>) -> PResult<String> {
    lit("'").parse_next(input)?;
    let mut text = String::new();
    loop {
        text.push_str(until_quote(input)?);
        lit("'").parse_next(input)?;
        if lit("'").parse_next(input).is_ok() {
            text.push('\'');
        } else {
            return Ok(text);
        }
    }
}

fn number_literal(input: &mut Input<'_>) -> PResult<f64> {
    let digits = (digit1, opt((lit("."), digit1)))
        .take()
        .parse_next(input)?;
    str::parse::<f64>(digits).map_err(|_| ContextError::new())
}

// ============================================================================
// Expressions
// ============================================================================

fn condition(input: &mut Input<'_>) -> PResult<FilterNode> {
    ws.parse_next(input)?;
    let node = or_expression(input)?;
    ws.parse_next(input)?;
    Ok(node)
}

fn or_expression(input: &mut Input<'_>) -> PResult<FilterNode> {
    let mut left = and_expression(input)?;
    while padded_keyword("or").parse_next(input).is_ok() {
        let right = and_expression(input)?;
        left = FilterNode::operator(FilterOperatorType::Or, left, right);
    }
    Ok(left)
}

fn and_expression(input: &mut Input<'_>) -> PResult<FilterNode> {
    let mut left = comparison(input)?;
    while padded_keyword("and").parse_next(input).is_ok() {
        let right = comparison(input)?;
        left = FilterNode::operator(FilterOperatorType::And, left, right);
    }
    Ok(left)
}

fn comparison_operator(input: &mut Input<'_>) -> PResult<FilterOperatorType> {
    ws.parse_next(input)?;
    // two-character operators first
    let op = if lit("!=").parse_next(input).is_ok() {
        FilterOperatorType::Ne
    } else if lit("<=").parse_next(input).is_ok() {
        FilterOperatorType::Le
    } else if lit(">=").parse_next(input).is_ok() {
        FilterOperatorType::Ge
    } else if lit("=").parse_next(input).is_ok() {
        FilterOperatorType::Eq
    } else if lit("<").parse_next(input).is_ok() {
        FilterOperatorType::Lt
    } else if lit(">").parse_next(input).is_ok() {
        FilterOperatorType::Gt
    } else {
        return Err(ContextError::new());
    };
    ws.parse_next(input)?;
    Ok(op)
}

fn comparison(input: &mut Input<'_>) -> PResult<FilterNode> {
    let mut left = unary(input)?;
    loop {
        let checkpoint = *input;
        let Ok(op) = comparison_operator(input) else {
            *input = checkpoint;
            return Ok(left);
        };
        let right = unary(input)?;
        left = FilterNode::operator(op, left, right);
    }
}

fn unary(input: &mut Input<'_>) -> PResult<FilterNode> {
    ws.parse_next(input)?;
    if lit("-").parse_next(input).is_ok() {
        // a minus directly before a number is part of the literal
        if input.starts_with(|c: char| c.is_ascii_digit()) {
            return Ok(FilterNode::number(-number_literal(input)?));
        }
        return Ok(FilterNode::negation(unary(input)?));
    }
    primary(input)
}

fn primary(input: &mut Input<'_>) -> PResult<FilterNode> {
    if lit("@").parse_next(input).is_ok() {
        return Ok(FilterNode::attribute(name(input)?));
    }
    if input.starts_with('\'') {
        return Ok(FilterNode::string(string_literal(input)?));
    }
    if input.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(FilterNode::number(number_literal(input)?));
    }
    if lit("(").parse_next(input).is_ok() {
        ws.parse_next(input)?;
        let inner = or_expression(input)?;
        ws.parse_next(input)?;
        lit(")").parse_next(input)?;
        return Ok(FilterNode::group(inner));
    }
    function_call(input)
}

fn function_call(input: &mut Input<'_>) -> PResult<FilterNode> {
    let function = name(input)?;
    ws.parse_next(input)?;
    lit("(").parse_next(input)?;
    ws.parse_next(input)?;
    let args: Vec<FilterNode> = if lit(")").parse_next(input).is_ok() {
        Vec::new()
    } else {
        let args: Vec<FilterNode> = separated(
            1..,
            |input: &mut Input<'_>| -> PResult<FilterNode> {
                ws.parse_next(input)?;
                let arg = or_expression(input)?;
                ws.parse_next(input)?;
                Ok(arg)
            },
            ",",
        )
        .parse_next(input)?;
        lit(")").parse_next(input)?;
        args
    };

    Ok(match FilterFunctionType::from_name(function) {
        Some(kind) => FilterNode::function(kind, args),
        None => FilterNode::user_defined(function, args),
    })
}
