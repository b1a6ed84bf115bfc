//! Pluralization and singularization of table names.
//!
//! Irregular plurals common in database schemas are looked up first; other
//! words fall back to the `inflector` crate's suffix rules. Snake-case
//! compounds (`user_roles`) are inflected on their last segment only.
//!
//! Both functions are iterated to a fixed point so that applying them twice
//! never changes the result of applying them once.

use inflector::Inflector;

use super::fixed_point;

/// Known irregular plurals that inflector doesn't handle well for database contexts.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    // People
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    // Body parts
    ("foot", "feet"),
    ("tooth", "teeth"),
    // Animals
    ("goose", "geese"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    // -f/-fe → -ves
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("shelf", "shelves"),
    ("calf", "calves"),
    ("loaf", "loaves"),
    // -o → -oes
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
    ("hero", "heroes"),
    // Latin/Greek
    ("analysis", "analyses"),
    ("crisis", "crises"),
    ("diagnosis", "diagnoses"),
    ("hypothesis", "hypotheses"),
    ("thesis", "theses"),
    ("phenomenon", "phenomena"),
    ("criterion", "criteria"),
    ("index", "indices"),
    ("appendix", "appendices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
];

/// Words whose singular and plural forms coincide in schema naming.
static UNCOUNTABLE: &[&str] = &[
    "data",
    "media",
    "metadata",
    "news",
    "series",
    "species",
    "equipment",
    "information",
    "feedback",
    "status",
    "settings",
];

/// Pluralize a word, handling irregulars first then falling back to inflector.
///
/// # Examples
/// ```ignore
/// assert_eq!(pluralize("customer"), "customers");
/// assert_eq!(pluralize("user_role"), "user_roles");
/// assert_eq!(pluralize("person"), "people");
/// ```
pub fn pluralize(word: &str) -> String {
    fixed_point(word, |w| inflect_last_segment(w, pluralize_word))
}

/// Singularize a word, handling irregulars first then falling back to inflector.
///
/// # Examples
/// ```ignore
/// assert_eq!(singularize("customers"), "customer");
/// assert_eq!(singularize("user_roles"), "user_role");
/// assert_eq!(singularize("people"), "person");
/// ```
pub fn singularize(word: &str) -> String {
    fixed_point(word, |w| inflect_last_segment(w, singularize_word))
}

fn pluralize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    // Check irregular plurals first
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return match_case(word, plural);
        }
    }

    // Fall back to inflector for regular words
    word.to_plural()
}

fn singularize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    // Check irregular plurals first
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *plural || lower == *singular {
            return match_case(word, singular);
        }
    }

    // Fall back to inflector for regular words
    word.to_singular()
}

/// Apply `inflect` to the part after the last underscore.
fn inflect_last_segment(word: &str, inflect: fn(&str) -> String) -> String {
    match word.rfind('_') {
        Some(pos) if pos + 1 < word.len() => {
            let (prefix, last) = word.split_at(pos + 1);
            format!("{}{}", prefix, inflect(last))
        }
        Some(_) => word.to_string(),
        None if word.is_empty() => String::new(),
        None => inflect(word),
    }
}

/// Carry the capitalization of the first letter over to the replacement.
fn match_case(original: &str, replacement: &str) -> String {
    let upper = original.chars().next().is_some_and(|c| c.is_uppercase());
    if !upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
