//! Style registry for ordered, deduplicated style injection.
//!
//! This module provides [`StyleRegistry`], the single point through which CSS
//! text enters a [`Document`].
//!
//! # Ordering
//!
//! Every unit is tagged with a [`Priority`] tier and a sequence number. The
//! head is kept sorted at all times:
//!
//! 1. Units of a lower tier precede units of a higher tier
//! 2. Within a tier, units appear in registration order
//!
//! The order is restored on each insertion (scan for the first unit of a
//! strictly greater tier and insert before it), never at read time, so code
//! that inspects the document right after an injection sees the final
//! cascade.
//!
//! # Deduplication
//!
//! Identifiers are unique in the head. Injecting an identifier that is
//! already present does nothing, which makes lazy "inject on first
//! construction" calls from components safe to repeat.
//!
//! # Detached registries
//!
//! A registry created with [`StyleRegistry::detached`] has no document
//! (server-side rendering, bare unit tests). All injections succeed and do
//! nothing.
//!
//! # Example
//!
//! ```rust
//! use themeable::{Document, Priority, StyleRegistry};
//!
//! let document = Document::new();
//! let registry = StyleRegistry::new(document.clone());
//!
//! registry.inject("theme-dark", ":root { --bg: #000; }", Priority::High).unwrap();
//! registry.inject("button", ".btn { color: red; }", Priority::Normal).unwrap();
//! registry.inject("reset", "* { margin: 0; }", Priority::Base).unwrap();
//!
//! let order = registry.debug_order();
//! let ids: Vec<&str> = order.ids().collect();
//! assert_eq!(ids, vec!["reset", "button", "theme-dark"]);
//! ```

use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace};

use super::error::StyleError;
use super::priority::Priority;
use crate::document::{Document, StyleElement};

/// Outcome of a single [`StyleRegistry::inject`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injected {
    /// A new unit was inserted at `position` in the head.
    Inserted { position: usize, sequence: u64 },
    /// A unit with the same identifier already exists.
    Skipped,
    /// The registry has no document.
    Detached,
}

impl Injected {
    /// Returns true if this call added a unit to the document.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Injected::Inserted { .. })
    }
}

/// One entry of a [`StyleOrder`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOrderEntry {
    pub id: String,
    pub priority: Priority,
    pub sequence: u64,
}

/// Snapshot of the head's style units in document order.
///
/// The snapshot is taken once; iterating it is lazy and can be repeated any
/// number of times. Intended for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct StyleOrder {
    entries: Rc<[StyleOrderEntry]>,
}

impl StyleOrder {
    pub fn iter(&self) -> std::slice::Iter<'_, StyleOrderEntry> {
        self.entries.iter()
    }

    /// Identifiers in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a StyleOrder {
    type Item = &'a StyleOrderEntry;
    type IntoIter = std::slice::Iter<'a, StyleOrderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Registry that owns insertion into a document's head.
///
/// Cloning a registry yields a handle to the same registry: the sequence
/// counter is shared, so clones keep numbering monotonically.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    document: Option<Document>,
    next_sequence: Rc<Cell<u64>>,
}

impl StyleRegistry {
    /// Creates a registry that injects into `document`.
    pub fn new(document: Document) -> Self {
        Self {
            document: Some(document),
            next_sequence: Rc::new(Cell::new(0)),
        }
    }

    /// Creates a registry with no document. Every injection is a no-op.
    pub fn detached() -> Self {
        Self::default()
    }

    /// The document this registry injects into, if any.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn is_detached(&self) -> bool {
        self.document.is_none()
    }

    /// Injects `css` under `id` at the given priority tier.
    ///
    /// Does nothing if `id` is already present or if the registry is
    /// detached. The CSS text is not validated.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::EmptyId`] if `id` is empty.
    pub fn inject(
        &self,
        id: &str,
        css: impl Into<String>,
        priority: Priority,
    ) -> Result<Injected, StyleError> {
        if id.is_empty() {
            return Err(StyleError::EmptyId);
        }

        let Some(document) = &self.document else {
            trace!(style.id = id, "No document, skipping style injection");
            return Ok(Injected::Detached);
        };

        let sequence = self.next_sequence.get();
        let position = document.with_head_mut(|head| {
            if head.iter().any(|unit| unit.id() == id) {
                return None;
            }
            let position = head
                .iter()
                .position(|unit| unit.priority() > priority)
                .unwrap_or(head.len());
            head.insert(position, StyleElement::new(id, css, priority, sequence));
            Some(position)
        });

        match position {
            Some(position) => {
                self.next_sequence.set(sequence + 1);
                debug!(
                    style.id = id,
                    style.priority = %priority,
                    style.sequence = sequence,
                    style.position = position,
                    "Style injected"
                );
                Ok(Injected::Inserted { position, sequence })
            }
            None => {
                trace!(style.id = id, "Style already present");
                Ok(Injected::Skipped)
            }
        }
    }

    /// Injects at the default ([`Priority::Normal`]) tier.
    pub fn inject_default(&self, id: &str, css: impl Into<String>) -> Result<Injected, StyleError> {
        self.inject(id, css, Priority::default())
    }

    /// Removes the unit with `id`. Returns true if a unit was removed.
    pub fn remove(&self, id: &str) -> bool {
        let Some(document) = &self.document else {
            return false;
        };
        let removed = document.remove_style(id).is_some();
        if removed {
            debug!(style.id = id, "Style removed");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.document
            .as_ref()
            .is_some_and(|document| document.style_position(id).is_some())
    }

    /// Number of units in the document head.
    pub fn len(&self) -> usize {
        self.document.as_ref().map_or(0, Document::style_count)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of `{id, priority, sequence}` in document order.
    pub fn debug_order(&self) -> StyleOrder {
        let entries: Vec<StyleOrderEntry> = self
            .document
            .as_ref()
            .map(|document| {
                document
                    .styles()
                    .into_iter()
                    .map(|unit| StyleOrderEntry {
                        id: unit.id().to_string(),
                        priority: unit.priority(),
                        sequence: unit.sequence(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        StyleOrder {
            entries: entries.into(),
        }
    }
}

/// Static style declaration for a component type.
///
/// Components declare their CSS once as a constant and call
/// [`ensure`](Self::ensure) from their constructor; only the first call per
/// identifier reaches the document.
///
/// ```rust
/// use themeable::{ComponentStyle, Document, StyleRegistry};
///
/// const BUTTON: ComponentStyle = ComponentStyle::new("button", ".btn { padding: 4px; }");
///
/// let registry = StyleRegistry::new(Document::new());
/// BUTTON.ensure(&registry).unwrap();
/// BUTTON.ensure(&registry).unwrap();
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStyle {
    id: &'static str,
    css: &'static str,
    priority: Priority,
}

impl ComponentStyle {
    pub const fn new(id: &'static str, css: &'static str) -> Self {
        Self {
            id,
            css,
            priority: Priority::Normal,
        }
    }

    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Injects this style if it is not already in the document.
    pub fn ensure(&self, registry: &StyleRegistry) -> Result<Injected, StyleError> {
        registry.inject(self.id, self.css, self.priority)
    }
}
