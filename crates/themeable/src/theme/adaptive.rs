//! Theme selection that follows the system color mode.

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use serde::{Deserialize, Serialize};

/// The user's preferred color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Light,
    Dark,
}

/// Function that reports the current color mode.
///
/// Defaults to [`os_theme_detector`]; tests substitute a fixed mode.
pub type ThemeDetector = fn() -> ColorMode;

/// Names of the registered themes to use for each color mode.
///
/// Used by [`ThemeManager::init_or_adapt`](crate::ThemeManager::init_or_adapt)
/// when no stored preference exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveSelection {
    pub light: String,
    pub dark: String,
}

impl AdaptiveSelection {
    pub fn new(light: impl Into<String>, dark: impl Into<String>) -> Self {
        Self {
            light: light.into(),
            dark: dark.into(),
        }
    }

    /// Theme name for `mode`.
    pub fn resolve(&self, mode: ColorMode) -> &str {
        match mode {
            ColorMode::Light => &self.light,
            ColorMode::Dark => &self.dark,
        }
    }
}

/// Asks the operating system whether dark mode is enabled.
pub fn os_theme_detector() -> ColorMode {
    match detect_os_theme() {
        OsThemeMode::Dark => ColorMode::Dark,
        _ => ColorMode::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_mode() {
        let selection = AdaptiveSelection::new("paper", "ink");
        assert_eq!(selection.resolve(ColorMode::Light), "paper");
        assert_eq!(selection.resolve(ColorMode::Dark), "ink");
    }

    #[test]
    fn test_selection_from_yaml() {
        let selection: AdaptiveSelection =
            serde_yaml::from_str("light: paper\ndark: ink\n").unwrap();
        assert_eq!(selection, AdaptiveSelection::new("paper", "ink"));
    }
}
