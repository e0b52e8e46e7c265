//! `${VAR}` and `${VAR:-default}` references in config values.
//!
//! An unset `${VAR}` without a default is an error naming the config key.

use crate::ConfigError;

/// Expand `${VAR}` references in `value`.
///
/// Values without `${` are returned unchanged, so bare `$VAR` and paths
/// containing `$` are left alone.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var)
            .map(Some)
            .map_err(|_| UnsetVar(var.to_owned()))
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.0),
    })
}

/// Name of a variable that was referenced but not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    /// Run `check` with `name` set to `value` (or unset for `None`).
    fn with_var(name: &str, value: Option<&str>, check: impl FnOnce()) {
        // SAFETY: every test uses its own variable names
        unsafe {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
        check();
        unsafe { std::env::remove_var(name) }
    }

    #[test]
    fn test_whole_value_reference() {
        with_var("PLANTCACHE_EXPAND_JAR", Some("/opt/plantuml.jar"), || {
            let jar = expand_env("${PLANTCACHE_EXPAND_JAR}", "renderer.jar").unwrap();
            assert_eq!(jar, "/opt/plantuml.jar");
        });
    }

    #[test]
    fn test_reference_inside_path() {
        with_var("PLANTCACHE_EXPAND_HOME", Some("/usr/lib/jvm/17"), || {
            let bin = expand_env("${PLANTCACHE_EXPAND_HOME}/bin/java", "renderer.java_bin");
            assert_eq!(bin.unwrap(), "/usr/lib/jvm/17/bin/java");
        });
    }

    #[test]
    fn test_fallback_for_unset_reference() {
        with_var("PLANTCACHE_EXPAND_FALLBACK", None, || {
            let bin = expand_env("${PLANTCACHE_EXPAND_FALLBACK:-java}", "renderer.java_bin");
            assert_eq!(bin.unwrap(), "java");
        });
    }

    #[test]
    fn test_unset_reference_names_field_and_variable() {
        with_var("PLANTCACHE_EXPAND_UNSET", None, || {
            let err = expand_env("${PLANTCACHE_EXPAND_UNSET}", "renderer.jar").unwrap_err();
            assert_eq!(
                err.to_string(),
                "Cannot expand renderer.jar: ${PLANTCACHE_EXPAND_UNSET} not set"
            );
        });
    }

    #[test]
    fn test_plain_dollar_left_alone() {
        assert_eq!(
            expand_env("/opt/$plantuml.jar", "renderer.jar").unwrap(),
            "/opt/$plantuml.jar"
        );
    }
}
