//! Catalog-level column types.
//!
//! [`ColumnType`] is the parsed form of a raw database type string as
//! reported by the catalog. It is intentionally wider than the logical
//! [`FieldType`](crate::model::FieldType) vocabulary: every type a supported
//! dialect can report has a `ColumnType`, even when no lossless logical
//! mapping exists.
//!
//! Parsing is split in two. [`TypeSpec::parse`] breaks a raw type string into
//! its head words, parenthesized parameters and trailing modifiers; each
//! dialect then matches the head against its own vocabulary.

use std::fmt;

/// Parsed catalog column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Boolean type.
    Bool,

    /// Integer with width in bits.
    Int { bits: u8, unsigned: bool },

    /// IEEE floating point with width in bits.
    Float { bits: u8 },

    /// Fixed-point decimal. `None` precision means unconstrained.
    Decimal {
        precision: Option<u32>,
        scale: Option<u32>,
    },

    /// Fixed-length character string.
    Char { length: Option<u32> },

    /// Variable-length character string.
    Varchar { length: Option<u32> },

    /// Unbounded text.
    Text,

    /// Binary data, optionally length-limited.
    Binary { length: Option<u32> },

    Date,
    Time,
    Timestamp,
    TimestampTz,

    /// MySQL `YEAR`.
    Year,

    Json,
    Uuid,

    /// Enumerated string values, in declaration order.
    Enum { values: Vec<String> },

    /// MySQL `SET`: any subset of the values.
    Set { values: Vec<String> },

    /// Bit string of the given width.
    Bit { width: u32 },

    Interval,
    Money,

    /// Geometric / spatial types (`point`, `geometry`, `polygon`, ...).
    Spatial { name: String },

    /// Network address types (`inet`, `cidr`, `macaddr`).
    Network { name: String },

    /// Array of another column type.
    Array { element: Box<ColumnType> },
}

impl ColumnType {
    /// Shorthand for a signed integer column type.
    pub fn int(bits: u8) -> Self {
        ColumnType::Int {
            bits,
            unsigned: false,
        }
    }

    /// Returns true if this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, ColumnType::Int { .. })
    }

    /// Returns true if this is a string/text type.
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            ColumnType::Char { .. } | ColumnType::Varchar { .. } | ColumnType::Text
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Bool => write!(f, "bool"),
            ColumnType::Int { bits, unsigned } => {
                write!(f, "{}int{}", if *unsigned { "u" } else { "" }, bits)
            }
            ColumnType::Float { bits } => write!(f, "float{}", bits),
            ColumnType::Decimal {
                precision: Some(p),
                scale,
            } => write!(f, "decimal({}, {})", p, scale.unwrap_or(0)),
            ColumnType::Decimal { precision: None, .. } => write!(f, "decimal"),
            ColumnType::Char { length: Some(n) } => write!(f, "char({})", n),
            ColumnType::Char { length: None } => write!(f, "char"),
            ColumnType::Varchar { length: Some(n) } => write!(f, "varchar({})", n),
            ColumnType::Varchar { length: None } => write!(f, "varchar"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Binary { length: Some(n) } => write!(f, "binary({})", n),
            ColumnType::Binary { length: None } => write!(f, "binary"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Time => write!(f, "time"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::TimestampTz => write!(f, "timestamptz"),
            ColumnType::Year => write!(f, "year"),
            ColumnType::Json => write!(f, "json"),
            ColumnType::Uuid => write!(f, "uuid"),
            ColumnType::Enum { values } => write!(f, "enum({})", values.join(", ")),
            ColumnType::Set { values } => write!(f, "set({})", values.join(", ")),
            ColumnType::Bit { width } => write!(f, "bit({})", width),
            ColumnType::Interval => write!(f, "interval"),
            ColumnType::Money => write!(f, "money"),
            ColumnType::Spatial { name } | ColumnType::Network { name } => write!(f, "{}", name),
            ColumnType::Array { element } => write!(f, "{}[]", element),
        }
    }
}

/// Structural breakdown of a raw type string.
///
/// `"decimal(10,2) unsigned zerofill"` parses to head `"decimal"`, params
/// `["10", "2"]` and modifiers `["unsigned", "zerofill"]`. Postgres
/// `"timestamp(3) with time zone"` keeps `"timestamp with time zone"` as its
/// head. A trailing `[]` (or the catalog's `_` element prefix) sets `array`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub head: String,
    pub params: Vec<String>,
    pub modifiers: Vec<String>,
    pub array: bool,
}

/// Modifiers that trail the type name rather than belonging to it.
const TRAILING_MODIFIERS: &[&str] = &["unsigned", "signed", "zerofill"];

impl TypeSpec {
    /// Split a raw type string. Returns `None` for empty or malformed input.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut s = raw.trim().to_string();
        if s.is_empty() {
            return None;
        }

        let mut array = false;
        while let Some(stripped) = s.strip_suffix("[]") {
            array = true;
            s = stripped.trim_end().to_string();
        }

        let (before, params, after) = match s.find('(') {
            Some(open) => {
                let close = find_closing_paren(&s, open)?;
                let inner = &s[open + 1..close];
                (
                    s[..open].to_string(),
                    split_params(inner)?,
                    s[close + 1..].to_string(),
                )
            }
            None => (s.clone(), Vec::new(), String::new()),
        };

        let mut head_words: Vec<String> = before
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        let mut modifiers = Vec::new();

        for word in after.split_whitespace().map(|w| w.to_lowercase()) {
            if TRAILING_MODIFIERS.contains(&word.as_str()) {
                modifiers.push(word);
            } else {
                head_words.push(word);
            }
        }

        // Modifiers may also trail a bare head: "int unsigned".
        while let Some(last) = head_words.last() {
            if head_words.len() > 1 && TRAILING_MODIFIERS.contains(&last.as_str()) {
                if let Some(word) = head_words.pop() {
                    modifiers.insert(0, word);
                }
            } else {
                break;
            }
        }

        if head_words.is_empty() {
            return None;
        }

        let mut head = head_words.join(" ");
        if let Some(element) = head.strip_prefix('_') {
            // udt_name form of Postgres arrays: _int4, _text.
            head = element.to_string();
            array = true;
        }

        Some(TypeSpec {
            head,
            params,
            modifiers,
            array,
        })
    }

    /// Whether the `unsigned` modifier is present.
    pub fn is_unsigned(&self) -> bool {
        self.modifiers.iter().any(|m| m == "unsigned")
    }

    /// Parse the nth parameter as an integer.
    pub fn param_u32(&self, index: usize) -> Option<u32> {
        self.params.get(index).and_then(|p| p.trim().parse().ok())
    }

    /// Parameters with their surrounding single quotes removed.
    pub fn quoted_values(&self) -> Vec<String> {
        self.params.iter().map(|p| unquote(p)).collect()
    }

    /// The same spec without the array flag.
    pub fn element(&self) -> TypeSpec {
        TypeSpec {
            array: false,
            ..self.clone()
        }
    }
}

fn find_closing_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quote = false;
    for (i, c) in s.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a parameter list on commas outside single quotes.
fn split_params(inner: &str) -> Option<Vec<String>> {
    if inner.trim().is_empty() {
        return None;
    }
    let mut params = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                // '' inside a quoted value is an escaped quote.
                if in_quote && chars.peek() == Some(&'\'') {
                    current.push('\'');
                    current.push('\'');
                    chars.next();
                    continue;
                }
                in_quote = !in_quote;
                current.push(c);
            }
            ',' if !in_quote => {
                params.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if in_quote {
        return None;
    }
    let last = current.trim().to_string();
    if !last.is_empty() || !params.is_empty() {
        params.push(last);
    }
    if params.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(params)
}

/// Strip one level of single quotes and unescape `''`.
pub(crate) fn unquote(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'"),
        None => trimmed.to_string(),
    }
}
