//! Theme system: swappable style bundles and the manager that switches them.
//!
//! This module provides:
//!
//! - [`Theme`]: The capability trait every theme implements
//! - [`ThemeContext`]: What a theme acts through while applying
//! - [`StyleSheetTheme`]: A theme built from CSS custom properties
//! - [`ThemeManager`]: Named theme registry with a single active theme
//! - [`AdaptiveSelection`]: Light/dark theme pair picked by system color mode
//! - [`validate_theme`]: Registration-time checks and diagnostics
//!
//! Themes inject their CSS at [`Priority::High`](crate::Priority::High), so
//! switching never requires re-rendering components: cascade order does the
//! work.

mod adaptive;
mod error;
mod manager;
mod sheet;
#[allow(clippy::module_inception)]
mod theme;
mod validate;

pub use adaptive::{os_theme_detector, AdaptiveSelection, ColorMode, ThemeDetector};
pub use error::ThemeError;
pub use manager::{ObserverId, Subscription, ThemeChange, ThemeManager, ThemeObserver};
pub use sheet::StyleSheetTheme;
pub use theme::{Theme, ThemeContext};
pub use validate::{is_css_identifier, validate_theme, ThemeReport};
