//! Pipeline configuration.

use livecode_transpile::TranspileOptions;
use livecode_types::DEFAULT_EXCERPT_LIMIT;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for a [`Runner`](crate::Runner), loadable from JSON.
///
/// ```json
/// { "excerpt_limit": 120, "transpile": { "jsx_factory": "h", "typescript": false } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiveConfig {
    /// Maximum bytes of code attached to an error, per excerpt.
    pub excerpt_limit: usize,
    pub transpile: TranspileOptions,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            excerpt_limit: DEFAULT_EXCERPT_LIMIT,
            transpile: TranspileOptions::default(),
        }
    }
}

impl LiveConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        if config.excerpt_limit == 0 {
            return Err(ConfigError::ZeroExcerptLimit);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(LiveConfig::from_json_str("{}").unwrap(), LiveConfig::default());
    }

    #[test]
    fn test_partial_transpile_options() {
        let config = LiveConfig::from_json_str(
            r#"{ "excerpt_limit": 80, "transpile": { "jsx_factory": "h" } }"#,
        )
        .unwrap();
        assert_eq!(config.excerpt_limit, 80);
        assert_eq!(config.transpile.jsx_factory, "h");
        assert_eq!(config.transpile.jsx_fragment, "React.Fragment");
        assert!(config.transpile.typescript);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = LiveConfig::from_json_str(r#"{ "cache": false }"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `cache`"));
        assert!(LiveConfig::from_json_str(r#"{ "transpile": { "jsx": true } }"#).is_err());
    }

    #[test]
    fn test_zero_excerpt_limit_rejected() {
        assert!(matches!(
            LiveConfig::from_json_str(r#"{ "excerpt_limit": 0 }"#),
            Err(ConfigError::ZeroExcerptLimit)
        ));
    }
}
