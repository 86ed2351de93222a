//! YAML frontmatter at the top of content files.
//!
//! ```text
//! ---
//! title: Release notes
//! layout: post
//! tags: [rust, cli]
//! ---
//! # Body starts here
//! ```

use std::collections::BTreeMap;

use chisel_template::Value;
use serde_yaml::{Mapping, Value as YamlValue};

/// Layout used when frontmatter does not name one.
pub const DEFAULT_LAYOUT: &str = "default";

const FENCE: &str = "---";

/// Error returned when frontmatter is present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frontmatter must be a mapping of keys to values")]
    NotAMapping,
}

/// Known frontmatter keys plus everything else as custom fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub layout: String,
    pub date: Option<String>,
    pub classes: Vec<String>,
    pub tags: Vec<String>,
    /// Unrecognized keys, converted to template values.
    pub fields: BTreeMap<String, Value>,
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: None,
            layout: DEFAULT_LAYOUT.to_owned(),
            date: None,
            classes: Vec::new(),
            tags: Vec::new(),
            fields: BTreeMap::new(),
        }
    }
}

impl Frontmatter {
    /// Parse the YAML block between the fences.
    ///
    /// Empty blocks yield the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, FrontmatterError> {
        let mut frontmatter = Self::default();
        let trimmed = yaml.trim();
        if trimmed.is_empty() {
            return Ok(frontmatter);
        }

        let mapping = match serde_yaml::from_str::<YamlValue>(trimmed)? {
            YamlValue::Mapping(mapping) => mapping,
            YamlValue::Null => Mapping::new(),
            _ => return Err(FrontmatterError::NotAMapping),
        };

        for (key, value) in mapping {
            let Some(key) = scalar_string(&key) else {
                continue;
            };
            match key.as_str() {
                "title" => frontmatter.title = scalar_string(&value),
                "layout" => {
                    if let Some(layout) = scalar_string(&value).filter(|l| !l.is_empty()) {
                        frontmatter.layout = layout;
                    }
                }
                "date" => frontmatter.date = scalar_string(&value),
                "classes" => frontmatter.classes = string_list(&value),
                "tags" => frontmatter.tags = string_list(&value),
                _ => {
                    frontmatter.fields.insert(key, yaml_to_value(value));
                }
            }
        }
        Ok(frontmatter)
    }
}

/// Split `input` into its frontmatter block and body.
///
/// Frontmatter starts with a `---` line and ends at the next `---` line.
/// Without both fences the whole input is the body.
#[must_use]
pub fn split_frontmatter(input: &str) -> (Option<&str>, &str) {
    let Some(rest) = strip_fence_line(input) else {
        return (None, input);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, input)
}

/// Parse frontmatter and return it with the remaining body.
pub fn parse_frontmatter(input: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    match split_frontmatter(input) {
        (Some(yaml), body) => Ok((Frontmatter::from_yaml(yaml)?, body)),
        (None, body) => Ok((Frontmatter::default(), body)),
    }
}

fn strip_fence_line(input: &str) -> Option<&str> {
    let rest = input.strip_prefix(FENCE)?;
    let (first, rest) = rest.split_once('\n')?;
    first.trim().is_empty().then_some(rest)
}

fn scalar_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Tagged(tagged) => scalar_string(&tagged.value),
        YamlValue::Null | YamlValue::Sequence(_) | YamlValue::Mapping(_) => None,
    }
}

/// A single string or a list of strings.
fn string_list(value: &YamlValue) -> Vec<String> {
    match value {
        YamlValue::Sequence(items) => items.iter().filter_map(scalar_string).collect(),
        other => scalar_string(other).into_iter().collect(),
    }
}

/// Convert YAML into a template value.
///
/// Null becomes an empty string and non-string mapping keys are dropped.
pub(crate) fn yaml_to_value(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::default(),
        YamlValue::Bool(b) => Value::Boolean(b),
        YamlValue::Number(n) => n
            .as_f64()
            .map_or_else(|| Value::String(n.to_string()), Value::Number),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_value).collect()),
        YamlValue::Mapping(mapping) => mapping
            .into_iter()
            .filter_map(|(key, value)| Some((scalar_string(&key)?, yaml_to_value(value))))
            .collect(),
        YamlValue::Tagged(tagged) => yaml_to_value(tagged.value),
    }
}
