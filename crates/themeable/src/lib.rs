//! # Themeable - runtime style injection and theme cascade
//!
//! `themeable` injects CSS from independent, unordered sources into one
//! document and keeps the result in a deterministic cascade order:
//!
//! - **Deduplicated injection**: each style identifier enters the document once
//! - **Tiered ordering**: base < normal < high < override, by position in the head
//! - **Live theme switching**: themes inject at `high`, so a switch restyles
//!   everything without touching components
//! - **Persistence and notification**: the chosen theme is stored and
//!   observers plus a document event are told about every change
//!
//! ## Quick start
//!
//! ```rust
//! use themeable::{
//!     ComponentStyle, Document, MemoryStore, Priority, StyleRegistry, StyleSheetTheme,
//!     ThemeManager,
//! };
//!
//! const BUTTON: ComponentStyle =
//!     ComponentStyle::new("button", ".btn { background: var(--bg); }");
//!
//! let document = Document::new();
//! let registry = StyleRegistry::new(document.clone());
//! registry.inject("reset", "* { margin: 0; }", Priority::Base).unwrap();
//!
//! let manager = ThemeManager::new(registry.clone()).with_storage(MemoryStore::new());
//! manager.register("light", StyleSheetTheme::new().variable("--bg", "#fff")).unwrap();
//! manager.register("dark", StyleSheetTheme::new().variable("--bg", "#000")).unwrap();
//!
//! // Components inject lazily; the theme unit stays last.
//! BUTTON.ensure(&registry).unwrap();
//! BUTTON.ensure(&registry).unwrap();
//!
//! manager.switch("dark").unwrap();
//!
//! let order = registry.debug_order();
//! let ids: Vec<&str> = order.ids().collect();
//! assert_eq!(ids, vec!["reset", "button", "theme-light", "theme-dark"]);
//! assert!(document.has_root_class("theme-dark"));
//! ```
//!
//! ## Runtime model
//!
//! Everything is single-threaded and synchronous. Shared state lives behind
//! `Rc` handles: [`Document`] and [`StyleRegistry`] clones refer to the same
//! document and registry. Build one of each at startup and pass them (and the
//! [`ThemeManager`]) by reference.
//!
//! A registry without a document ([`StyleRegistry::detached`]) and a manager
//! without storage are valid configurations; the affected operations do
//! nothing.

pub mod config;
pub mod document;
pub mod storage;
pub mod style;
pub mod theme;

pub use config::{ConfigError, ThemeConfig};
pub use document::{Document, DocumentEvent, EventListenerId, StyleElement};
pub use storage::{JsonFileStore, MemoryStore, PreferenceStore, StorageError, UnavailableStore};
pub use style::{
    ComponentStyle, Injected, ParsePriorityError, Priority, StyleError, StyleOrder,
    StyleOrderEntry, StyleRegistry,
};
pub use theme::{
    is_css_identifier, os_theme_detector, validate_theme, AdaptiveSelection, ColorMode,
    ObserverId, StyleSheetTheme, Subscription, Theme, ThemeChange, ThemeContext, ThemeDetector,
    ThemeError, ThemeManager, ThemeObserver, ThemeReport,
};
