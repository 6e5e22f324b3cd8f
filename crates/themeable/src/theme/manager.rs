//! Theme registry, active-theme pointer and change notification.
//!
//! [`ThemeManager`] owns the mapping from theme name to theme object and the
//! single "current theme" pointer. It is built once at startup around a
//! [`StyleRegistry`] and passed by reference to whoever needs to switch.
//!
//! # Switching
//!
//! [`ThemeManager::switch`] runs these steps in order:
//!
//! 1. Remove the active theme's marker class from the root element
//! 2. Call the new theme's `apply()`
//! 3. Update the current-theme pointer
//! 4. Notify observers (each isolated; errors and panics are logged)
//! 5. Dispatch the configured document event
//! 6. Persist the theme name (failures are logged and ignored)
//!
//! # Re-entrancy
//!
//! No internal borrow is held while theme or observer code runs. Observers
//! receive the manager and may call `switch` again; they see the pointer
//! already updated. When an observer switches to another theme, the outer
//! switch stops notifying and skips its event and persistence, so observers,
//! listeners and storage all end on the nested switch's theme.
//!
//! Every successful switch notifies and dispatches, including a switch to the
//! theme that is already active.

use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

use super::adaptive::{os_theme_detector, AdaptiveSelection, ThemeDetector};
use super::error::ThemeError;
use super::theme::{Theme, ThemeContext};
use super::validate::{validate_theme, ThemeReport};
use crate::config::ThemeConfig;
use crate::document::DocumentEvent;
use crate::storage::PreferenceStore;
use crate::style::StyleRegistry;

/// Payload delivered to observers after a switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeChange {
    pub previous: Option<String>,
    pub current: String,
}

/// Callback notified after every theme change.
pub trait ThemeObserver {
    fn on_theme_change(&self, manager: &ThemeManager, change: &ThemeChange) -> anyhow::Result<()>;
}

impl<F> ThemeObserver for F
where
    F: Fn(&ThemeManager, &ThemeChange) -> anyhow::Result<()>,
{
    fn on_theme_change(&self, manager: &ThemeManager, change: &ThemeChange) -> anyhow::Result<()> {
        self(manager, change)
    }
}

/// Identifier for a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type ObserverList = RefCell<Vec<(ObserverId, Rc<dyn ThemeObserver>)>>;

/// Handle returned by [`ThemeManager::observe`].
///
/// Dropping the handle unsubscribes the observer. Call
/// [`keep_alive`](Self::keep_alive) to leave it registered for the lifetime
/// of the manager.
#[must_use = "dropping a Subscription unsubscribes the observer"]
pub struct Subscription {
    id: ObserverId,
    observers: Weak<ObserverList>,
    active: bool,
}

impl Subscription {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Removes the observer now.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    /// Leaves the observer registered after this handle is gone.
    pub fn keep_alive(mut self) {
        self.active = false;
    }

    fn detach(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(observers) = self.observers.upgrade() {
            observers.borrow_mut().retain(|(id, _)| *id != self.id);
            debug!(theme.observer_id = self.id.0, "Theme observer removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

/// Registry of named themes with a single active theme.
///
/// # Example
///
/// ```rust
/// use themeable::{Document, MemoryStore, StyleRegistry, StyleSheetTheme, ThemeManager};
///
/// let document = Document::new();
/// let manager = ThemeManager::new(StyleRegistry::new(document.clone()))
///     .with_storage(MemoryStore::new());
///
/// manager.register("light", StyleSheetTheme::new().variable("--bg", "#fff")).unwrap();
/// manager.register("dark", StyleSheetTheme::new().variable("--bg", "#000")).unwrap();
///
/// // The first registered theme is applied automatically.
/// assert_eq!(manager.current().as_deref(), Some("light"));
///
/// manager.switch("dark").unwrap();
/// assert!(document.has_root_class("theme-dark"));
/// assert!(!document.has_root_class("theme-light"));
/// ```
pub struct ThemeManager {
    registry: StyleRegistry,
    config: ThemeConfig,
    storage: Option<Box<dyn PreferenceStore>>,
    detector: ThemeDetector,
    themes: RefCell<HashMap<String, Rc<dyn Theme>>>,
    current: RefCell<Option<String>>,
    observers: Rc<ObserverList>,
    next_observer_id: Cell<u64>,
    bootstrapped: Cell<bool>,
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("config", &self.config)
            .field("registered", &self.registered())
            .field("current", &self.current.borrow())
            .field("observers", &self.observers.borrow().len())
            .field("storage", &self.storage.is_some())
            .finish()
    }
}

impl ThemeManager {
    /// Creates a manager with default configuration and no storage.
    pub fn new(registry: StyleRegistry) -> Self {
        Self {
            registry,
            config: ThemeConfig::default(),
            storage: None,
            detector: os_theme_detector,
            themes: RefCell::new(HashMap::new()),
            current: RefCell::new(None),
            observers: Rc::new(RefCell::new(Vec::new())),
            next_observer_id: Cell::new(1),
            bootstrapped: Cell::new(false),
        }
    }

    pub fn with_config(mut self, config: ThemeConfig) -> Self {
        self.config = config;
        self
    }

    /// Persists the chosen theme in `storage`.
    pub fn with_storage(mut self, storage: impl PreferenceStore + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Overrides the color mode detector used by [`init_or_adapt`](Self::init_or_adapt).
    pub fn with_detector(mut self, detector: ThemeDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers `theme` under `name`, replacing any theme with that name.
    ///
    /// The first theme ever registered is applied immediately when no theme
    /// is active. That bootstrap switch notifies observers but does not
    /// overwrite the stored preference.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::InvalidTheme`] if validation fails, or
    /// [`ThemeError::Apply`] if the bootstrap apply fails (the theme stays
    /// registered).
    pub fn register(
        &self,
        name: &str,
        theme: impl Theme + 'static,
    ) -> Result<ThemeReport, ThemeError> {
        let report = validate_theme(name, &theme, &self.config)?;
        for warning in &report.warnings {
            debug!(theme.name = name, warning = %warning, "Theme diagnostics");
        }

        let theme: Rc<dyn Theme> = Rc::new(theme);
        let first = {
            let mut themes = self.themes.borrow_mut();
            let replaced = themes.insert(name.to_string(), Rc::clone(&theme)).is_some();
            if replaced {
                debug!(theme.name = name, "Theme replaced");
            } else {
                debug!(theme.name = name, "Theme registered");
            }
            !replaced && themes.len() == 1
        };

        if first && !self.bootstrapped.get() && self.current.borrow().is_none() {
            self.bootstrapped.set(true);
            trace!(theme.name = name, "Applying first registered theme");
            self.activate(name, theme, None, false)?;
        }
        Ok(report)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.themes.borrow().contains_key(name)
    }

    /// Names of all registered themes.
    pub fn registered(&self) -> BTreeSet<String> {
        self.themes.borrow().keys().cloned().collect()
    }

    /// Name of the active theme.
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    // =========================================================================
    // Switching
    // =========================================================================

    /// Makes `name` the active theme.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::UnknownTheme`] without touching the document if
    /// `name` is not registered, or [`ThemeError::Apply`] if the theme fails
    /// to inject its styles (the previous marker is restored and the pointer
    /// is left unchanged).
    pub fn switch(&self, name: &str) -> Result<(), ThemeError> {
        let theme = self.lookup(name)?;
        let previous = self.current();
        self.activate(name, theme, previous, true)
    }

    fn lookup(&self, name: &str) -> Result<Rc<dyn Theme>, ThemeError> {
        self.themes
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| ThemeError::UnknownTheme {
                name: name.to_string(),
                available: self.registered().into_iter().collect(),
            })
    }

    fn activate(
        &self,
        name: &str,
        theme: Rc<dyn Theme>,
        previous: Option<String>,
        persist: bool,
    ) -> Result<(), ThemeError> {
        let document = self.registry.document();
        let previous_marker = previous.as_deref().map(|p| self.config.marker_class(p));
        if let (Some(document), Some(marker)) = (document, &previous_marker) {
            document.remove_root_class(marker);
        }

        let cx = ThemeContext::new(name, &self.config, &self.registry);
        if let Err(source) = theme.apply(&cx) {
            if let (Some(document), Some(marker)) = (document, &previous_marker) {
                document.add_root_class(marker);
            }
            warn!(theme.name = name, error = %source, "Theme failed to apply");
            return Err(ThemeError::Apply {
                name: name.to_string(),
                source,
            });
        }

        *self.current.borrow_mut() = Some(name.to_string());
        info!(
            theme.from = previous.as_deref().unwrap_or(""),
            theme.to = name,
            "Theme switched"
        );

        let change = ThemeChange {
            previous,
            current: name.to_string(),
        };
        self.notify_observers(&change);

        if !self.is_current(name) {
            trace!(theme.name = name, "Superseded by a nested switch");
            return Ok(());
        }
        self.broadcast(&change);

        if persist {
            self.persist(name);
        }
        Ok(())
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Registers an observer called after every theme change.
    ///
    /// Observers are independent: their order relative to each other is
    /// unspecified, and one failing observer never affects the others.
    pub fn observe<O>(&self, observer: O) -> Subscription
    where
        O: ThemeObserver + 'static,
    {
        let id = ObserverId(self.next_observer_id.get());
        self.next_observer_id.set(id.0 + 1);
        let observer: Rc<dyn ThemeObserver> = Rc::new(observer);
        self.observers.borrow_mut().push((id, observer));
        debug!(theme.observer_id = id.0, "Theme observer registered");
        Subscription {
            id,
            observers: Rc::downgrade(&self.observers),
            active: true,
        }
    }

    fn notify_observers(&self, change: &ThemeChange) {
        let observers: Vec<(ObserverId, Rc<dyn ThemeObserver>)> = self
            .observers
            .borrow()
            .iter()
            .map(|(id, observer)| (*id, Rc::clone(observer)))
            .collect();

        for (id, observer) in observers {
            // A nested switch has already notified everyone of a newer change.
            if !self.is_current(&change.current) {
                break;
            }
            match catch_unwind(AssertUnwindSafe(|| observer.on_theme_change(self, change))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(
                    theme.observer_id = id.0,
                    theme.name = %change.current,
                    error = %err,
                    "Theme observer failed"
                ),
                Err(_) => warn!(
                    theme.observer_id = id.0,
                    theme.name = %change.current,
                    "Theme observer panicked"
                ),
            }
        }
    }

    fn is_current(&self, name: &str) -> bool {
        self.current.borrow().as_deref() == Some(name)
    }

    fn broadcast(&self, change: &ThemeChange) {
        let Some(document) = self.registry.document() else {
            return;
        };
        let event = DocumentEvent::new(
            self.config.event_name.clone(),
            json!({
                "theme": change.current,
                "previous_theme": change.previous,
            }),
        );
        let delivered = document.dispatch_event(&event);
        trace!(event.name = %event.name, event.listeners = delivered, "Theme event dispatched");
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn persist(&self, name: &str) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(err) = storage.save(&self.config.storage_key, name) {
            debug!(theme.name = name, error = %err, "Could not persist theme preference");
        }
    }

    /// The stored theme name, if storage holds a usable one.
    pub fn stored_preference(&self) -> Option<String> {
        let storage = self.storage.as_ref()?;
        match storage.load(&self.config.storage_key) {
            Ok(Some(name)) if !name.trim().is_empty() => Some(name),
            Ok(_) => None,
            Err(err) => {
                debug!(error = %err, "Could not read theme preference");
                None
            }
        }
    }

    /// Deletes the stored preference. Storage failures are ignored.
    pub fn forget_preference(&self) {
        if let Some(storage) = &self.storage {
            if let Err(err) = storage.clear(&self.config.storage_key) {
                debug!(error = %err, "Could not clear theme preference");
            }
        }
    }

    /// Restores the stored theme if it is registered.
    ///
    /// Returns the restored name. A missing, unreadable, or unregistered
    /// preference leaves the current state untouched and returns `Ok(None)`.
    pub fn init(&self) -> Result<Option<String>, ThemeError> {
        let Some(name) = self.stored_preference() else {
            return Ok(None);
        };
        if !self.is_registered(&name) {
            debug!(theme.name = %name, "Stored theme is not registered");
            return Ok(None);
        }
        self.switch(&name)?;
        Ok(Some(name))
    }

    /// Like [`init`](Self::init), but falls back to the theme matching the
    /// system color mode when no preference was restored.
    ///
    /// The fallback is skipped if the selected theme is not registered.
    pub fn init_or_adapt(
        &self,
        selection: &AdaptiveSelection,
    ) -> Result<Option<String>, ThemeError> {
        if let Some(name) = self.init()? {
            return Ok(Some(name));
        }
        let mode = (self.detector)();
        let name = selection.resolve(mode);
        if !self.is_registered(name) {
            debug!(theme.name = name, "Adaptive theme is not registered");
            return Ok(None);
        }
        self.switch(name)?;
        Ok(Some(name.to_string()))
    }
}
