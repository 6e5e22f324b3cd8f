//! Theme manager errors.

use thiserror::Error;

use crate::style::StyleError;

/// Error returned by theme registration and switching.
///
/// These report integration mistakes and are never raised for a missing
/// document or unavailable storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    /// The theme object or its name failed structural validation.
    #[error("invalid theme '{name}': {reason}")]
    InvalidTheme { name: String, reason: String },

    /// No theme is registered under the requested name.
    #[error("unknown theme '{name}' (registered: {})", available.join(", "))]
    UnknownTheme { name: String, available: Vec<String> },

    /// The theme's `apply` failed to inject its styles.
    #[error("theme '{name}' failed to apply: {source}")]
    Apply {
        name: String,
        #[source]
        source: StyleError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_theme_display() {
        let err = ThemeError::InvalidTheme {
            name: "dark".to_string(),
            reason: "no apply".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("dark"));
        assert!(msg.contains("no apply"));
    }

    #[test]
    fn test_unknown_theme_display_lists_available() {
        let err = ThemeError::UnknownTheme {
            name: "neon".to_string(),
            available: vec!["dark".to_string(), "light".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("neon"));
        assert!(msg.contains("dark, light"));
    }

    #[test]
    fn test_apply_error_has_source() {
        use std::error::Error as _;

        let err = ThemeError::Apply {
            name: "dark".to_string(),
            source: StyleError::EmptyId,
        };
        assert!(err.source().is_some());
    }
}
