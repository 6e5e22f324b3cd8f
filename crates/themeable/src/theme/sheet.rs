//! Ready-made theme built from CSS custom properties.

use std::collections::BTreeMap;

use super::theme::{Theme, ThemeContext};
use crate::style::StyleError;

/// A theme defined by CSS custom properties plus optional raw CSS.
///
/// The exported stylesheet scopes the variables to the root element carrying
/// the theme's marker class, so the variables of an inactive theme's unit left
/// in the head have no effect. Raw blocks added with [`css`](Self::css) are
/// emitted as written and stay live until the unit is removed; scope them
/// under the marker class when they must not outlast the theme.
///
/// # Example
///
/// ```rust
/// use themeable::StyleSheetTheme;
///
/// let dark = StyleSheetTheme::new()
///     .variable("--bg", "#111")
///     .variable("--fg", "#eee")
///     .css(".btn { border-color: var(--fg); }");
///
/// let css = dark.export("theme-dark");
/// assert!(css.starts_with(":root.theme-dark {"));
/// assert!(css.contains("  --bg: #111;"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheetTheme {
    variables: BTreeMap<String, String>,
    css: Vec<String>,
}

impl StyleSheetTheme {
    /// Creates an empty theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom property, returning the updated theme for chaining.
    ///
    /// Names must be custom properties (`--name`); anything else is rejected
    /// when the theme is registered.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Appends raw CSS emitted after the variable block.
    ///
    /// The block is not scoped to the marker class. A theme switch does not
    /// remove this theme's unit, so unscoped rules keep applying after
    /// another theme becomes active.
    pub fn css(mut self, css: impl Into<String>) -> Self {
        self.css.push(css.into());
        self
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.css.is_empty()
    }

    /// Renders the stylesheet for a root carrying `marker_class`.
    pub fn export(&self, marker_class: &str) -> String {
        let mut out = String::new();
        if !self.variables.is_empty() {
            out.push_str(":root.");
            // Writing into a String cannot fail.
            let _ = cssparser::serialize_identifier(marker_class, &mut out);
            out.push_str(" {\n");
            for (name, value) in &self.variables {
                out.push_str("  ");
                out.push_str(name);
                out.push_str(": ");
                out.push_str(value);
                out.push_str(";\n");
            }
            out.push('}');
        }
        for block in &self.css {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(block);
        }
        out
    }
}

impl Theme for StyleSheetTheme {
    fn apply(&self, cx: &ThemeContext<'_>) -> Result<(), StyleError> {
        self.remove(cx);
        cx.inject_styles(self.export(cx.marker_class()))?;
        cx.add_marker();
        Ok(())
    }

    fn remove(&self, cx: &ThemeContext<'_>) {
        cx.remove_styles();
        cx.remove_marker();
    }

    fn styles(&self, marker_class: &str) -> Option<String> {
        (!self.is_empty()).then(|| self.export(marker_class))
    }

    fn validate(&self) -> Result<(), String> {
        let invalid: Vec<&str> = self
            .variables
            .keys()
            .filter(|name| !name.starts_with("--") || !super::validate::is_css_identifier(name))
            .map(String::as_str)
            .collect();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "not CSS custom properties: {}",
                invalid.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeConfig;
    use crate::document::Document;
    use crate::style::{Priority, StyleRegistry};

    #[test]
    fn test_export_variables_and_css() {
        let theme = StyleSheetTheme::new()
            .variable("--fg", "#eee")
            .variable("--bg", "#111")
            .css(".btn { color: var(--fg); }");

        assert_eq!(
            theme.export("theme-dark"),
            ":root.theme-dark {\n  --bg: #111;\n  --fg: #eee;\n}\n.btn { color: var(--fg); }"
        );
    }

    #[test]
    fn test_export_css_only() {
        let theme = StyleSheetTheme::new().css("body { margin: 0; }");
        assert_eq!(theme.export("theme-x"), "body { margin: 0; }");
    }

    #[test]
    fn test_export_escapes_marker() {
        let theme = StyleSheetTheme::new().variable("--a", "1");
        assert!(theme.export("theme-2.0").starts_with(":root.theme-2\\.0 {"));
    }

    #[test]
    fn test_styles_none_when_empty() {
        assert!(StyleSheetTheme::new().styles("theme-x").is_none());
        assert!(StyleSheetTheme::new()
            .variable("--a", "1")
            .styles("theme-x")
            .is_some());
    }

    #[test]
    fn test_validate_rejects_plain_properties() {
        let theme = StyleSheetTheme::new()
            .variable("--ok", "1")
            .variable("color", "red");
        let err = theme.validate().unwrap_err();
        assert!(err.contains("color"));
        assert!(!err.contains("--ok"));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let document = Document::new();
        let registry = StyleRegistry::new(document.clone());
        let config = ThemeConfig::default();
        let cx = ThemeContext::new("dark", &config, &registry);
        let theme = StyleSheetTheme::new().variable("--bg", "#000");

        registry.inject("button", ".btn {}", Priority::Normal).unwrap();
        theme.apply(&cx).unwrap();
        registry.inject("card", ".card {}", Priority::Normal).unwrap();
        theme.apply(&cx).unwrap();

        let ids: Vec<String> = registry.debug_order().ids().map(String::from).collect();
        assert_eq!(ids, vec!["button", "card", "theme-dark"]);
        assert!(document.has_root_class("theme-dark"));
    }

    #[test]
    fn test_remove_clears_unit_and_marker() {
        let document = Document::new();
        let registry = StyleRegistry::new(document.clone());
        let config = ThemeConfig::default();
        let cx = ThemeContext::new("dark", &config, &registry);
        let theme = StyleSheetTheme::new().variable("--bg", "#000");

        theme.apply(&cx).unwrap();
        theme.remove(&cx);

        assert!(registry.is_empty());
        assert!(!document.has_root_class("theme-dark"));
    }

    #[test]
    fn test_raw_css_outlives_marker() {
        let document = Document::new();
        let registry = StyleRegistry::new(document.clone());
        let config = ThemeConfig::default();
        let dark = StyleSheetTheme::new()
            .variable("--bg", "#000")
            .css("body { font-weight: 300; }");
        let light = StyleSheetTheme::new().variable("--bg", "#fff");

        let dark_cx = ThemeContext::new("dark", &config, &registry);
        dark.apply(&dark_cx).unwrap();
        dark_cx.remove_marker();
        light
            .apply(&ThemeContext::new("light", &config, &registry))
            .unwrap();

        // Variables stay scoped to the inactive marker; raw blocks do not.
        let sheet = document.stylesheet_text();
        assert!(sheet.contains(":root.theme-dark {"));
        assert!(sheet.contains("\nbody { font-weight: 300; }"));
        assert!(!document.has_root_class("theme-dark"));
        assert!(document.has_root_class("theme-light"));
    }
}
