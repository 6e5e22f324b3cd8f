//! The theme capability trait and the context themes act through.

use crate::config::ThemeConfig;
use crate::document::Document;
use crate::style::{Injected, Priority, StyleError, StyleRegistry};

/// A named, swappable bundle of style overrides.
///
/// Only [`apply`](Self::apply) is required. By convention an implementation
/// starts `apply` by calling its own [`remove`](Self::remove) so that
/// re-applying always re-establishes the theme from scratch.
///
/// Closures with the `apply` signature implement `Theme`:
///
/// ```rust
/// use themeable::{Document, StyleError, StyleRegistry, ThemeContext, ThemeManager};
///
/// let manager = ThemeManager::new(StyleRegistry::new(Document::new()));
/// manager
///     .register("plain", |cx: &ThemeContext<'_>| -> Result<(), StyleError> {
///         cx.add_marker();
///         Ok(())
///     })
///     .unwrap();
/// assert_eq!(manager.current().as_deref(), Some("plain"));
/// ```
pub trait Theme {
    /// Establishes the theme in the document.
    fn apply(&self, cx: &ThemeContext<'_>) -> Result<(), StyleError>;

    /// Tears the theme down. The default does nothing.
    fn remove(&self, cx: &ThemeContext<'_>) {
        let _ = cx;
    }

    /// CSS this theme exports when active under `marker_class`, if any.
    fn styles(&self, marker_class: &str) -> Option<String> {
        let _ = marker_class;
        None
    }

    /// Structural self-check run at registration.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl<F> Theme for F
where
    F: Fn(&ThemeContext<'_>) -> Result<(), StyleError>,
{
    fn apply(&self, cx: &ThemeContext<'_>) -> Result<(), StyleError> {
        self(cx)
    }
}

/// Everything a theme needs while applying or removing itself.
#[derive(Debug)]
pub struct ThemeContext<'a> {
    name: &'a str,
    marker_class: String,
    style_id: String,
    registry: &'a StyleRegistry,
}

impl<'a> ThemeContext<'a> {
    pub fn new(name: &'a str, config: &ThemeConfig, registry: &'a StyleRegistry) -> Self {
        Self {
            name,
            marker_class: config.marker_class(name),
            style_id: config.style_id(name),
            registry,
        }
    }

    /// Registered name of the theme.
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn marker_class(&self) -> &str {
        &self.marker_class
    }

    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    pub fn registry(&self) -> &StyleRegistry {
        self.registry
    }

    pub fn document(&self) -> Option<&Document> {
        self.registry.document()
    }

    /// Injects `css` as this theme's style unit at [`Priority::High`].
    pub fn inject_styles(&self, css: impl Into<String>) -> Result<Injected, StyleError> {
        self.registry.inject(&self.style_id, css, Priority::High)
    }

    /// Removes this theme's style unit. Returns true if one was present.
    pub fn remove_styles(&self) -> bool {
        self.registry.remove(&self.style_id)
    }

    /// Adds the marker class to the root element.
    pub fn add_marker(&self) {
        if let Some(document) = self.document() {
            document.add_root_class(&self.marker_class);
        }
    }

    pub fn remove_marker(&self) {
        if let Some(document) = self.document() {
            document.remove_root_class(&self.marker_class);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_names_follow_config() {
        let registry = StyleRegistry::detached();
        let config = ThemeConfig::new().marker_prefix("is-").style_id_prefix("skin-");
        let cx = ThemeContext::new("sepia", &config, &registry);

        assert_eq!(cx.name(), "sepia");
        assert_eq!(cx.marker_class(), "is-sepia");
        assert_eq!(cx.style_id(), "skin-sepia");
        assert!(cx.document().is_none());
    }

    #[test]
    fn test_context_injects_at_high_priority() {
        let document = Document::new();
        let registry = StyleRegistry::new(document.clone());
        let config = ThemeConfig::default();
        let cx = ThemeContext::new("dark", &config, &registry);

        registry.inject("button", ".btn {}", Priority::Normal).unwrap();
        cx.inject_styles(":root { --bg: #000; }").unwrap();
        registry.inject("card", ".card {}", Priority::Normal).unwrap();

        let unit = document.find_style("theme-dark").unwrap();
        assert_eq!(unit.priority(), Priority::High);
        assert_eq!(document.style_position("theme-dark"), Some(2));

        assert!(cx.remove_styles());
        assert!(!cx.remove_styles());
    }

    #[test]
    fn test_context_markers() {
        let document = Document::new();
        let registry = StyleRegistry::new(document.clone());
        let config = ThemeConfig::default();
        let cx = ThemeContext::new("dark", &config, &registry);

        cx.add_marker();
        assert!(document.has_root_class("theme-dark"));
        cx.remove_marker();
        assert!(!document.has_root_class("theme-dark"));
    }

    #[test]
    fn test_closure_theme_defaults() {
        let theme = |cx: &ThemeContext<'_>| -> Result<(), StyleError> {
            cx.add_marker();
            Ok(())
        };
        assert!(theme.styles("theme-x").is_none());
        assert!(theme.validate().is_ok());
    }
}
