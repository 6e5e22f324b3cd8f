//! Registration-time theme checks and diagnostics.

use cssparser::{Parser, ParserInput, Token};

use super::error::ThemeError;
use super::theme::Theme;
use crate::config::ThemeConfig;

/// What registration learned about a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeReport {
    pub name: String,
    pub marker_class: String,
    pub style_id: String,
    /// The theme exports a stylesheet through [`Theme::styles`].
    pub has_styles: bool,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

/// Returns true if `value` is exactly one CSS identifier token.
///
/// Custom property names (`--accent`) are identifiers too.
pub fn is_css_identifier(value: &str) -> bool {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '/') {
        return false;
    }
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let is_ident = matches!(parser.next(), Ok(Token::Ident(_)));
    is_ident && parser.is_exhausted()
}

/// Checks that `theme` can be registered as `name`.
///
/// # Errors
///
/// Returns [`ThemeError::InvalidTheme`] if the name is empty, if the derived
/// marker class or style id is not a CSS identifier, or if the theme's own
/// [`Theme::validate`] fails.
pub fn validate_theme(
    name: &str,
    theme: &dyn Theme,
    config: &ThemeConfig,
) -> Result<ThemeReport, ThemeError> {
    let invalid = |reason: String| ThemeError::InvalidTheme {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("theme name must not be empty".to_string()));
    }

    let marker_class = config.marker_class(name);
    if !is_css_identifier(&marker_class) {
        return Err(invalid(format!(
            "marker class '{}' is not a CSS identifier",
            marker_class
        )));
    }

    let style_id = config.style_id(name);
    if !is_css_identifier(&style_id) {
        return Err(invalid(format!(
            "style id '{}' is not a CSS identifier",
            style_id
        )));
    }

    theme.validate().map_err(invalid)?;

    let mut warnings = Vec::new();
    let has_styles = match theme.styles(&marker_class) {
        Some(css) if css.trim().is_empty() => {
            warnings.push("theme exports an empty stylesheet".to_string());
            false
        }
        Some(_) => true,
        None => {
            warnings.push("theme exports no stylesheet".to_string());
            false
        }
    };

    Ok(ThemeReport {
        name: name.to_string(),
        marker_class,
        style_id,
        has_styles,
        warnings,
    })
}
