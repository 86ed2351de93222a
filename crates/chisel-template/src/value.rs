//! Template values and render contexts.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Local};

/// Format used when a date is interpolated directly.
const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A value available to templates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Date(DateTime<Local>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Default for Value {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl Value {
    /// Whether the value selects the true branch of `{{#if}}`.
    ///
    /// Strings, arrays and objects are truthy when non-empty, numbers when
    /// nonzero, dates always.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::String(s) => !s.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Object(fields) => !fields.is_empty(),
            Self::Number(n) => *n != 0.0,
            Self::Date(_) => true,
        }
    }

    /// Coerce to a number, parsing the string form of non-numbers.
    #[must_use]
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            other => other.to_string().trim().parse().ok(),
        }
    }

    /// Follow `path` through nested objects.
    ///
    /// An empty path returns the value itself; any missing field or
    /// non-object along the way yields `None`.
    #[must_use]
    pub fn get_path<'a, S: AsRef<str>>(&'a self, path: &[S]) -> Option<&'a Value> {
        path.iter().try_fold(self, |current, key| match current {
            Self::Object(fields) => fields.get(key.as_ref()),
            _ => None,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Stringification used for interpolation.
///
/// Integral numbers print without a fractional part, dates print in local
/// time, and composite values print as opaque `[array]` / `[object]` tokens.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write_number(f, *n),
            Self::Date(date) => write!(f, "{}", date.format(DATE_DISPLAY_FORMAT)),
            Self::Array(_) => f.write_str("[array]"),
            Self::Object(_) => f.write_str("[object]"),
        }
    }
}

/// Integral values print without a fraction, others in shortest round-trip form.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    // `-0` prints as `0`.
    if n == 0.0 {
        f.write_str("0")
    } else {
        write!(f, "{n}")
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<DateTime<Local>> for Value {
    fn from(value: DateTime<Local>) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self::Object(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Object(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Top-level name → value mapping for a render call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Context {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

/// A chain of name bindings layered over a [`Context`].
///
/// Loop variables and layout content are pushed as borrowed bindings so that
/// nested renders never copy or mutate the caller's context.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scope<'a> {
    Root(&'a Context),
    Bound {
        name: &'a str,
        value: &'a Value,
        parent: &'a Scope<'a>,
    },
}

impl<'a> Scope<'a> {
    pub(crate) fn get(&self, name: &str) -> Option<&'a Value> {
        match *self {
            Self::Root(context) => context.get(name),
            Self::Bound {
                name: bound,
                value,
                parent,
            } => {
                if bound == name {
                    Some(value)
                } else {
                    parent.get(name)
                }
            }
        }
    }

    /// Resolve a dotted path such as `page.author.name`.
    ///
    /// Empty segments are ignored; an empty path resolves to nothing.
    pub(crate) fn resolve(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.').filter(|segment| !segment.is_empty());
        let root = self.get(segments.next()?)?;
        let rest: Vec<&str> = segments.collect();
        root.get_path(rest.as_slice())
    }
}
