//! Theme manager configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default storage key for the persisted theme preference.
pub const DEFAULT_STORAGE_KEY: &str = "themeable.theme";
/// Default prefix for root marker classes (`theme-dark`).
pub const DEFAULT_MARKER_PREFIX: &str = "theme-";
/// Default prefix for theme style unit identifiers.
pub const DEFAULT_STYLE_ID_PREFIX: &str = "theme-";
/// Default name of the document event fired on every switch.
pub const DEFAULT_EVENT_NAME: &str = "themechange";

/// Naming and persistence settings for a [`ThemeManager`](crate::ThemeManager).
///
/// Every field has a default, so partial YAML or JSON documents are accepted:
///
/// ```rust
/// use themeable::ThemeConfig;
///
/// let config = ThemeConfig::from_yaml_str("storage_key: app.theme\n").unwrap();
/// assert_eq!(config.storage_key, "app.theme");
/// assert_eq!(config.marker_class("dark"), "theme-dark");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub storage_key: String,
    pub marker_prefix: String,
    pub style_id_prefix: String,
    pub event_name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
            style_id_prefix: DEFAULT_STYLE_ID_PREFIX.to_string(),
            event_name: DEFAULT_EVENT_NAME.to_string(),
        }
    }
}

impl ThemeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn marker_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.marker_prefix = prefix.into();
        self
    }

    pub fn style_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.style_id_prefix = prefix.into();
        self
    }

    pub fn event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = name.into();
        self
    }

    /// Root class that marks `theme` as active.
    pub fn marker_class(&self, theme: &str) -> String {
        format!("{}{}", self.marker_prefix, theme)
    }

    /// Identifier of the style unit `theme` injects.
    pub fn style_id(&self, theme: &str) -> String {
        format!("{}{}", self.style_id_prefix, theme)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Error returned when a configuration document cannot be parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML theme configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON theme configuration: {0}")]
    Json(#[from] serde_json::Error),
}
