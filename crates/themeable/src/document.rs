//! Headless document model.
//!
//! A [`Document`] holds the three pieces of page state the cascade engine
//! touches:
//!
//! - the ordered style units in the head
//! - the class list of the root element
//! - a broadcast event bus for custom events
//!
//! `Document` is a cheap handle: clones share the same underlying state, the
//! way every script on a page shares one `document`. It is single-threaded
//! (`!Send`) by construction.
//!
//! Style units are only inserted and removed through
//! [`StyleRegistry`](crate::StyleRegistry); the document itself exposes read
//! access to the head.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{trace, warn};

use crate::style::Priority;

/// Attribute carrying a style unit's identifier.
pub const STYLE_ID_ATTR: &str = "data-style-id";
/// Attribute carrying a style unit's priority tier.
pub const STYLE_PRIORITY_ATTR: &str = "data-style-priority";
/// Attribute carrying a style unit's insertion sequence number.
pub const STYLE_SEQUENCE_ATTR: &str = "data-style-sequence";

/// A single `<style>` unit in the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleElement {
    id: String,
    css: String,
    priority: Priority,
    sequence: u64,
}

impl StyleElement {
    pub(crate) fn new(
        id: impl Into<String>,
        css: impl Into<String>,
        priority: Priority,
        sequence: u64,
    ) -> Self {
        Self {
            id: id.into(),
            css: css.into(),
            priority,
            sequence,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Reads one of the inspectable `data-style-*` attributes.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            STYLE_ID_ATTR => Some(self.id.clone()),
            STYLE_PRIORITY_ATTR => Some(self.priority.as_str().to_string()),
            STYLE_SEQUENCE_ATTR => Some(self.sequence.to_string()),
            _ => None,
        }
    }

    /// Renders the unit as markup, attributes included.
    ///
    /// The id is escaped as an attribute value and `</` in the CSS is written
    /// as `<\/` so the body cannot close the element early.
    pub fn to_html(&self) -> String {
        format!(
            "<style {}=\"{}\" {}=\"{}\" {}=\"{}\">{}</style>",
            STYLE_ID_ATTR,
            escape_attribute(&self.id),
            STYLE_PRIORITY_ATTR,
            self.priority,
            STYLE_SEQUENCE_ATTR,
            self.sequence,
            self.css.replace("</", "<\\/")
        )
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// A named custom event with a JSON detail payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEvent {
    pub name: String,
    pub detail: Value,
}

impl DocumentEvent {
    pub fn new(name: impl Into<String>, detail: Value) -> Self {
        Self {
            name: name.into(),
            detail,
        }
    }
}

/// Identifier for a registered document event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventListenerId(u64);

type EventListener = Rc<dyn Fn(&DocumentEvent)>;

#[derive(Default)]
struct DocumentState {
    head: RefCell<Vec<StyleElement>>,
    root_classes: RefCell<BTreeSet<String>>,
    listeners: RefCell<Vec<(EventListenerId, String, EventListener)>>,
    next_listener_id: Cell<u64>,
}

/// Shared handle to a headless document.
///
/// The head is read-only from outside the crate:
///
/// ```compile_fail
/// let document = themeable::Document::new();
/// document.remove_style("button");
/// ```
#[derive(Clone, Default)]
pub struct Document {
    state: Rc<DocumentState>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("styles", &self.state.head.borrow().len())
            .field("root_classes", &self.state.root_classes.borrow())
            .field(
                "listeners",
                &format!("{} listeners", self.state.listeners.borrow().len()),
            )
            .finish()
    }
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if both handles point at the same document.
    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    // =========================================================================
    // Head
    // =========================================================================

    /// Snapshot of the head's style units in document order.
    pub fn styles(&self) -> Vec<StyleElement> {
        self.state.head.borrow().clone()
    }

    pub fn style_count(&self) -> usize {
        self.state.head.borrow().len()
    }

    pub fn find_style(&self, id: &str) -> Option<StyleElement> {
        self.state
            .head
            .borrow()
            .iter()
            .find(|unit| unit.id() == id)
            .cloned()
    }

    /// Position of the unit with `id` in document order.
    pub fn style_position(&self, id: &str) -> Option<usize> {
        self.state.head.borrow().iter().position(|unit| unit.id() == id)
    }

    /// Concatenated CSS of every unit, in cascade order.
    pub fn stylesheet_text(&self) -> String {
        self.state
            .head
            .borrow()
            .iter()
            .map(StyleElement::css)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Removes the unit with `id`, returning it if present.
    pub(crate) fn remove_style(&self, id: &str) -> Option<StyleElement> {
        let mut head = self.state.head.borrow_mut();
        let position = head.iter().position(|unit| unit.id() == id)?;
        Some(head.remove(position))
    }

    /// Runs `f` with mutable access to the head.
    ///
    /// The borrow is released before this returns; `f` must not call back
    /// into the document.
    pub(crate) fn with_head_mut<R>(&self, f: impl FnOnce(&mut Vec<StyleElement>) -> R) -> R {
        f(&mut self.state.head.borrow_mut())
    }

    // =========================================================================
    // Root element classes
    // =========================================================================

    /// Adds a class to the root element. Returns false if already present.
    pub fn add_root_class(&self, class: &str) -> bool {
        self.state.root_classes.borrow_mut().insert(class.to_string())
    }

    /// Removes a class from the root element. Returns false if absent.
    pub fn remove_root_class(&self, class: &str) -> bool {
        self.state.root_classes.borrow_mut().remove(class)
    }

    pub fn has_root_class(&self, class: &str) -> bool {
        self.state.root_classes.borrow().contains(class)
    }

    /// Root element classes, sorted.
    pub fn root_classes(&self) -> Vec<String> {
        self.state.root_classes.borrow().iter().cloned().collect()
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Registers a listener for events named `name`.
    pub fn add_event_listener<F>(&self, name: &str, listener: F) -> EventListenerId
    where
        F: Fn(&DocumentEvent) + 'static,
    {
        let id = EventListenerId(self.state.next_listener_id.get());
        self.state.next_listener_id.set(id.0 + 1);
        let listener: EventListener = Rc::new(listener);
        self.state
            .listeners
            .borrow_mut()
            .push((id, name.to_string(), listener));
        trace!(event.name = name, event.listener_id = id.0, "Event listener added");
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove_event_listener(&self, id: EventListenerId) -> bool {
        let mut listeners = self.state.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Delivers `event` to every listener registered for its name.
    ///
    /// A panicking listener is logged and skipped. Listeners may add or
    /// remove listeners while the event is being delivered; such changes
    /// take effect on the next dispatch.
    pub fn dispatch_event(&self, event: &DocumentEvent) -> usize {
        let targets: Vec<(EventListenerId, EventListener)> = self
            .state
            .listeners
            .borrow()
            .iter()
            .filter(|(_, name, _)| *name == event.name)
            .map(|(id, _, listener)| (*id, Rc::clone(listener)))
            .collect();

        for (id, listener) in &targets {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!(
                    event.name = %event.name,
                    event.listener_id = id.0,
                    "Event listener panicked"
                );
            }
        }
        targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit(id: &str, priority: Priority, sequence: u64) -> StyleElement {
        StyleElement::new(id, format!(".{id} {{}}"), priority, sequence)
    }

    #[test]
    fn test_style_element_attributes() {
        let el = unit("button", Priority::Normal, 7);
        assert_eq!(el.attribute(STYLE_ID_ATTR).as_deref(), Some("button"));
        assert_eq!(el.attribute(STYLE_PRIORITY_ATTR).as_deref(), Some("normal"));
        assert_eq!(el.attribute(STYLE_SEQUENCE_ATTR).as_deref(), Some("7"));
        assert_eq!(el.attribute("class"), None);
    }

    #[test]
    fn test_style_element_html() {
        let html = unit("card", Priority::High, 2).to_html();
        assert!(html.starts_with("<style data-style-id=\"card\""));
        assert!(html.contains("data-style-priority=\"high\""));
        assert!(html.contains("data-style-sequence=\"2\""));
        assert!(html.ends_with(".card {}</style>"));
    }

    #[test]
    fn test_style_element_html_escapes_id_and_body() {
        let el = StyleElement::new(
            "a\"b<&>",
            "/* </style><script> */ .x {}",
            Priority::Normal,
            0,
        );
        let html = el.to_html();

        assert!(html.starts_with("<style data-style-id=\"a&quot;b&lt;&amp;&gt;\" "));
        assert!(html.contains("/* <\\/style><script> */ .x {}"));
        assert_eq!(html.matches("</style>").count(), 1);
        assert!(html.ends_with("</style>"));
    }

    #[test]
    fn test_clones_share_state() {
        let doc = Document::new();
        let other = doc.clone();
        doc.with_head_mut(|head| head.push(unit("a", Priority::Base, 0)));

        assert_eq!(other.style_count(), 1);
        assert!(doc.same_document(&other));
        assert!(!doc.same_document(&Document::new()));
    }

    #[test]
    fn test_remove_style() {
        let doc = Document::new();
        doc.with_head_mut(|head| {
            head.push(unit("a", Priority::Base, 0));
            head.push(unit("b", Priority::Base, 1));
        });

        let removed = doc.remove_style("a").unwrap();
        assert_eq!(removed.id(), "a");
        assert!(doc.remove_style("a").is_none());
        assert_eq!(doc.style_position("b"), Some(0));
    }

    #[test]
    fn test_stylesheet_text_in_order() {
        let doc = Document::new();
        doc.with_head_mut(|head| {
            head.push(unit("a", Priority::Base, 0));
            head.push(unit("b", Priority::Normal, 1));
        });
        assert_eq!(doc.stylesheet_text(), ".a {}\n.b {}");
    }

    #[test]
    fn test_root_classes() {
        let doc = Document::new();
        assert!(doc.add_root_class("theme-dark"));
        assert!(!doc.add_root_class("theme-dark"));
        assert!(doc.has_root_class("theme-dark"));
        assert!(doc.remove_root_class("theme-dark"));
        assert!(!doc.remove_root_class("theme-dark"));
        assert!(doc.root_classes().is_empty());
    }

    #[test]
    fn test_dispatch_only_matching_listeners() {
        let doc = Document::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        doc.add_event_listener("themechange", move |event| {
            sink.borrow_mut().push(event.detail["theme"].clone());
        });
        doc.add_event_listener("other", |_| panic!("wrong listener"));

        let delivered = doc.dispatch_event(&DocumentEvent::new(
            "themechange",
            json!({ "theme": "dark" }),
        ));

        assert_eq!(delivered, 1);
        assert_eq!(*seen.borrow(), vec![json!("dark")]);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let doc = Document::new();
        let calls = Rc::new(Cell::new(0));

        doc.add_event_listener("ping", |_| panic!("boom"));
        let counter = Rc::clone(&calls);
        doc.add_event_listener("ping", move |_| counter.set(counter.get() + 1));

        doc.dispatch_event(&DocumentEvent::new("ping", Value::Null));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_remove_event_listener() {
        let doc = Document::new();
        let id = doc.add_event_listener("ping", |_| {});
        assert!(doc.remove_event_listener(id));
        assert!(!doc.remove_event_listener(id));
        assert_eq!(doc.dispatch_event(&DocumentEvent::new("ping", Value::Null)), 0);
    }
}
