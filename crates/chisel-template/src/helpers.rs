//! Helper functions callable from templates.
//!
//! A helper maps a list of resolved [`Value`] arguments to a string. The
//! built-in set is seeded by [`HelperRegistry::with_builtins`].

use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};

use crate::value::Value;

/// Default `formatDate` pattern.
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default `truncate` suffix.
const DEFAULT_TRUNCATE_SUFFIX: &str = "...";

/// Default `join` separator.
const DEFAULT_JOIN_SEPARATOR: &str = ", ";

/// Error raised by a helper while executing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HelperError {
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("{0}")]
    Failed(String),
}

/// Result of a helper call.
pub type HelperResult = Result<String, HelperError>;

/// A registered helper function.
pub type Helper = Arc<dyn Fn(&[Value]) -> HelperResult + Send + Sync>;

/// Named helper functions.
#[derive(Clone, Default)]
pub struct HelperRegistry {
    helpers: HashMap<String, Helper>,
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("HelperRegistry")
            .field("helpers", &names)
            .finish()
    }
}

impl HelperRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in helpers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("formatDate", format_date);
        registry.register("upper", upper);
        registry.register("lower", lower);
        registry.register("capitalize", capitalize);
        registry.register("length", length);
        registry.register("truncate", truncate);
        registry.register("join", join);
        registry.register("add", add);
        registry.register("subtract", subtract);
        registry
    }

    /// Register a helper, replacing any helper with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn(&[Value]) -> HelperResult + Send + Sync + 'static,
    {
        self.helpers.insert(name.into(), Arc::new(helper));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.helpers.keys().map(String::as_str)
    }
}

/// `formatDate(value, fmt?)`: strftime-style formatting in local time.
///
/// Strings are returned unchanged; other non-date values render empty.
fn format_date(args: &[Value]) -> HelperResult {
    let date = match args.first() {
        Some(Value::Date(date)) => date,
        Some(Value::String(s)) => return Ok(s.clone()),
        _ => return Ok(String::new()),
    };
    let format = match args.get(1) {
        Some(Value::String(format)) => format.as_str(),
        _ => DEFAULT_DATE_FORMAT,
    };

    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(HelperError::InvalidDateFormat(format.to_owned()));
    }
    let mut out = String::new();
    write!(out, "{}", date.format_with_items(items.iter()))
        .map_err(|_| HelperError::InvalidDateFormat(format.to_owned()))?;
    Ok(out)
}

fn first_string(args: &[Value]) -> String {
    args.first().map(ToString::to_string).unwrap_or_default()
}

fn upper(args: &[Value]) -> HelperResult {
    Ok(first_string(args).to_uppercase())
}

fn lower(args: &[Value]) -> HelperResult {
    Ok(first_string(args).to_lowercase())
}

fn capitalize(args: &[Value]) -> HelperResult {
    let s = first_string(args);
    let mut chars = s.chars();
    Ok(match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => s,
    })
}

/// Character count of a string, size of an array or object, else `0`.
fn length(args: &[Value]) -> HelperResult {
    let len = match args.first() {
        Some(Value::String(s)) => s.chars().count(),
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(fields)) => fields.len(),
        _ => 0,
    };
    Ok(len.to_string())
}

/// `truncate(str, max, suffix?)`; the suffix counts towards `max`.
fn truncate(args: &[Value]) -> HelperResult {
    let s = first_string(args);
    let Some(max) = args.get(1).and_then(Value::to_number) else {
        return Ok(s);
    };
    if max < 0.0 || max.is_nan() {
        return Ok(s);
    }
    // Saturating float-to-int cast; the guard above rules out negatives.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max = max as usize;

    if s.chars().count() <= max {
        return Ok(s);
    }
    let suffix = args
        .get(2)
        .map_or_else(|| DEFAULT_TRUNCATE_SUFFIX.to_owned(), ToString::to_string);
    let keep = max.saturating_sub(suffix.chars().count());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(&suffix);
    Ok(out)
}

/// `join(array, sep?)`; non-arrays render empty.
fn join(args: &[Value]) -> HelperResult {
    let Some(Value::Array(items)) = args.first() else {
        return Ok(String::new());
    };
    let separator = args
        .get(1)
        .map_or_else(|| DEFAULT_JOIN_SEPARATOR.to_owned(), ToString::to_string);
    Ok(items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&separator))
}

/// Sum of all numeric operands; unparsable operands are skipped.
fn add(args: &[Value]) -> HelperResult {
    if args.len() < 2 {
        return Ok("0".to_owned());
    }
    let sum: f64 = args.iter().filter_map(Value::to_number).sum();
    Ok(Value::Number(sum).to_string())
}

/// First operand minus the rest; an unparsable first operand yields `0`.
fn subtract(args: &[Value]) -> HelperResult {
    let [first, rest @ ..] = args else {
        return Ok("0".to_owned());
    };
    if rest.is_empty() {
        return Ok("0".to_owned());
    }
    let Some(start) = first.to_number() else {
        return Ok("0".to_owned());
    };
    let result = rest
        .iter()
        .filter_map(Value::to_number)
        .fold(start, |acc, n| acc - n);
    Ok(Value::Number(result).to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;

    use super::*;

    fn call(name: &str, args: &[Value]) -> HelperResult {
        let registry = HelperRegistry::with_builtins();
        let helper = registry.get(name).expect("builtin helper");
        helper(args)
    }

    fn s(value: &str) -> Value {
        Value::from(value)
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = HelperRegistry::with_builtins();
        let mut names: Vec<&str> = registry.names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "add",
                "capitalize",
                "formatDate",
                "join",
                "length",
                "lower",
                "subtract",
                "truncate",
                "upper",
            ]
        );
        assert!(HelperRegistry::new().names().next().is_none());
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = HelperRegistry::with_builtins();
        registry.register("upper", |_: &[Value]| Ok("shadowed".to_owned()));
        assert_eq!(registry.get("upper").unwrap()(&[s("x")]), Ok("shadowed".to_owned()));
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(call("upper", &[s("bob")]), Ok("BOB".to_owned()));
        assert_eq!(call("lower", &[s("BoB")]), Ok("bob".to_owned()));
        assert_eq!(call("capitalize", &[s("hello world")]), Ok("Hello world".to_owned()));
        assert_eq!(call("capitalize", &[s("")]), Ok(String::new()));
        assert_eq!(call("upper", &[]), Ok(String::new()));
        assert_eq!(call("upper", &[Value::from(true)]), Ok("TRUE".to_owned()));
    }

    #[test]
    fn test_length() {
        assert_eq!(call("length", &[s("héllo")]), Ok("5".to_owned()));
        assert_eq!(call("length", &[Value::from(vec![1, 2, 3])]), Ok("3".to_owned()));
        let object: Value = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(call("length", &[object]), Ok("2".to_owned()));
        assert_eq!(call("length", &[Value::from(9)]), Ok("0".to_owned()));
        assert_eq!(call("length", &[]), Ok("0".to_owned()));
    }

    #[test]
    fn test_truncate() {
        let text = s("The quick brown fox");
        assert_eq!(
            call("truncate", &[text.clone(), Value::from(10)]),
            Ok("The qui...".to_owned())
        );
        assert_eq!(
            call("truncate", &[text.clone(), Value::from(9), s("~")]),
            Ok("The quic~".to_owned())
        );
        assert_eq!(
            call("truncate", &[text.clone(), Value::from(100)]),
            Ok("The quick brown fox".to_owned())
        );
        assert_eq!(
            call("truncate", &[text.clone(), s("5")]),
            Ok("Th...".to_owned())
        );
        assert_eq!(
            call("truncate", &[text.clone(), s("many")]),
            Ok("The quick brown fox".to_owned())
        );
        assert_eq!(call("truncate", &[text, Value::from(2)]), Ok("...".to_owned()));
    }

    #[test]
    fn test_join() {
        let tags = Value::from(vec!["rust", "web"]);
        assert_eq!(call("join", &[tags.clone()]), Ok("rust, web".to_owned()));
        assert_eq!(call("join", &[tags, s(" | ")]), Ok("rust | web".to_owned()));
        assert_eq!(call("join", &[s("not an array")]), Ok(String::new()));
    }

    #[test]
    fn test_add_and_subtract() {
        assert_eq!(call("add", &[Value::from(1), Value::from(2)]), Ok("3".to_owned()));
        assert_eq!(call("add", &[Value::from(1), s("2.5"), s("x")]), Ok("3.5".to_owned()));
        assert_eq!(call("add", &[Value::from(1)]), Ok("0".to_owned()));
        assert_eq!(
            call("subtract", &[Value::from(10), Value::from(3), s("junk")]),
            Ok("7".to_owned())
        );
        assert_eq!(call("subtract", &[s("junk"), Value::from(3)]), Ok("0".to_owned()));
        assert_eq!(call("subtract", &[Value::from(5)]), Ok("0".to_owned()));
    }

    #[test]
    fn test_format_date() {
        let date = Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(
            call("formatDate", &[Value::from(date)]),
            Ok("2024-01-15".to_owned())
        );
        assert_eq!(
            call("formatDate", &[Value::from(date), s("%d/%m/%Y %H:%M")]),
            Ok("15/01/2024 09:30".to_owned())
        );
        assert_eq!(
            call("formatDate", &[s("yesterday"), s("%Y")]),
            Ok("yesterday".to_owned())
        );
        assert_eq!(call("formatDate", &[Value::from(3)]), Ok(String::new()));
        assert_eq!(call("formatDate", &[]), Ok(String::new()));
    }

    #[test]
    fn test_format_date_rejects_invalid_format() {
        let date = Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(
            call("formatDate", &[Value::from(date), s("%Q")]),
            Err(HelperError::InvalidDateFormat("%Q".to_owned()))
        );
    }
}
