//! Identifier case conversion.

use inflector::Inflector;

use super::fixed_point;

/// Convert an identifier to CamelCase.
///
/// Splits on `_`, `-`, whitespace and `.`, and uppercases the first character
/// of every segment. The rest of each segment is left as is, so existing
/// capitals survive: `user_ID` becomes `UserID`.
pub fn camelize(identifier: &str) -> String {
    identifier
        .split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert an identifier to snake_case.
pub fn snake(identifier: &str) -> String {
    if identifier.is_empty() {
        return String::new();
    }
    fixed_point(identifier, |s| {
        let converted = s.to_snake_case();
        // inflector drops everything for identifiers with no alphanumerics
        if converted.is_empty() {
            s.to_string()
        } else {
            converted
        }
    })
}
