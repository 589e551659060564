//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces). Values
/// without any `${` are returned unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok());

    // Unset variables without a default are left in place by shellexpand.
    if let Some(var_name) = unresolved_var(&expanded) {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{var_name}}} not set"),
        });
    }

    Ok(expanded.into_owned())
}

/// Name of the first `${VAR}` reference still present after expansion.
fn unresolved_var(value: &str) -> Option<&str> {
    let start = value.find("${")? + 2;
    let len = value[start..].find('}')?;
    let name = &value[start..start + len];
    (!name.is_empty() && !name.contains(":-")).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env("content", "content.root").unwrap();
        assert_eq!(result, "content");
    }

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("FOLIO_TEST_ROOT", "/srv/site");
        }
        let result = expand_env("${FOLIO_TEST_ROOT}/content", "content.root").unwrap();
        assert_eq!(result, "/srv/site/content");
        unsafe {
            std::env::remove_var("FOLIO_TEST_ROOT");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("FOLIO_UNSET_TITLE");
        }
        let result = expand_env("${FOLIO_UNSET_TITLE:-My Site}", "site.title").unwrap();
        assert_eq!(result, "My Site");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("FOLIO_MISSING_VAR");
        }
        let err = expand_env("${FOLIO_MISSING_VAR}", "content.root").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("FOLIO_MISSING_VAR"));
        assert!(err.to_string().contains("content.root"));
    }

    #[test]
    fn test_unresolved_var() {
        assert_eq!(unresolved_var("a ${B} c"), Some("B"));
        assert_eq!(unresolved_var("plain"), None);
        assert_eq!(unresolved_var("${}"), None);
    }
}
