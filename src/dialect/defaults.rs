//! Default expression parsing shared by the dialects.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::unquote;
use crate::model::{DefaultValue, FieldType};

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").expect("valid regex"));

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid regex")
});

/// Trailing Postgres cast: `'x'::character varying`, `0::bigint`, `'{}'::text[]`.
static PG_CAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?s)(.*?)::[A-Za-z_][\w\s."]*(\(\d+(,\s*\d+)?\))?(\[\])*$"#)
        .expect("valid regex")
});

/// Parse a literal default for the given field type.
///
/// Quoted values become strings (or booleans for boolean fields), numeric
/// literals are checked against the field type, and anything else is kept
/// verbatim as an expression.
pub(crate) fn parse_literal(raw: &str, field_type: &FieldType) -> Option<DefaultValue> {
    let value = strip_parens(raw.trim());
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }

    let quoted = value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2;
    let literal = if quoted {
        unquote(value)
    } else {
        value.to_string()
    };

    match field_type {
        FieldType::Bool => {
            if let Some(b) = parse_bool(&literal) {
                return Some(DefaultValue::Bool(b));
            }
        }
        ft if ft.is_integer() => {
            if INTEGER.is_match(&literal) {
                return Some(match literal.parse::<i64>() {
                    Ok(i) => DefaultValue::Int(i),
                    Err(_) => DefaultValue::Number(literal),
                });
            }
        }
        ft if ft.is_numeric() => {
            if NUMBER.is_match(&literal) {
                return Some(DefaultValue::Number(literal));
            }
        }
        _ => {
            if quoted {
                return Some(DefaultValue::Str(literal));
            }
        }
    }

    Some(DefaultValue::Expr(value.to_string()))
}

/// Remove trailing Postgres casts, repeatedly: `('a'::text)::varchar` → `'a'`.
pub(crate) fn strip_casts(raw: &str) -> &str {
    let mut value = raw.trim();
    loop {
        let stripped = strip_parens(value);
        let next = match PG_CAST.captures(stripped).and_then(|c| c.get(1)) {
            Some(inner) => inner.as_str().trim(),
            None => stripped,
        };
        if next == value {
            return value;
        }
        value = next;
    }
}

/// Whether the expression is a sequence-backed default.
pub(crate) fn is_sequence_default(raw: &str) -> bool {
    raw.trim().to_lowercase().starts_with("nextval(")
}

fn parse_bool(literal: &str) -> Option<bool> {
    match literal.to_lowercase().as_str() {
        "true" | "t" | "1" | "b'1'" | "yes" | "on" => Some(true),
        "false" | "f" | "0" | "b'0'" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Strip parentheses that wrap the whole expression.
fn strip_parens(mut value: &str) -> &str {
    while value.starts_with('(') && value.ends_with(')') && wraps_whole(value) {
        value = value[1..value.len() - 1].trim();
    }
    value
}

fn wraps_whole(value: &str) -> bool {
    let mut depth = 0i32;
    let mut in_quote = false;
    let last = value.len() - 1;
    for (i, c) in value.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 && i != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
