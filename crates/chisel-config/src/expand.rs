//! `${VAR}` expansion for configuration strings.
//!
//! - `${VAR}` expands to the value of `VAR` and is an error when unset
//! - `${VAR:-default}` falls back to `default` when `VAR` is unset

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// Values without `${` are returned unchanged, so a bare `$` is safe in
/// URLs and names.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok());

    // Unset variables without a default are left in place by the expander.
    if let Some(var) = unresolved_var(&expanded) {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var}}} not set"),
        });
    }
    Ok(expanded.into_owned())
}

/// Name inside the first remaining `${...}` reference.
fn unresolved_var(text: &str) -> Option<&str> {
    let start = text.find("${")? + 2;
    let len = text[start..].find(['}', ':'])?;
    Some(&text[start..start + len])
}
