//! Synthetic events dispatched into the document under test.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Interface family of a synthetic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Plain `Event`
    Basic,
    /// `MouseEvent`, used for the press/release around a click
    Mouse,
}

/// A synthetic event
///
/// Payload keys supplied by the scenario travel in `detail` rather than
/// being grafted onto the event object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticEvent {
    /// Event type, e.g. `input` or `keydown`
    pub event_type: String,
    /// Interface family
    pub kind: EventKind,
    /// Whether the event bubbles
    pub bubbles: bool,
    /// Whether the event is cancelable
    pub cancelable: bool,
    /// Extension fields copied from the scenario payload
    pub detail: Map<String, Value>,
}

impl SyntheticEvent {
    /// Create a non-bubbling, non-cancelable event
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            kind: EventKind::Basic,
            bubbles: false,
            cancelable: false,
            detail: Map::new(),
        }
    }

    /// Create a bubbling, cancelable event
    #[must_use]
    pub fn bubbling(event_type: impl Into<String>) -> Self {
        Self::new(event_type).with_bubbles(true).with_cancelable(true)
    }

    /// Create a bubbling, cancelable mouse event
    #[must_use]
    pub fn mouse(event_type: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Mouse,
            ..Self::bubbling(event_type)
        }
    }

    /// Set bubbling
    #[must_use]
    pub const fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    /// Set cancelable
    #[must_use]
    pub const fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Copy every own key of a JSON object into `detail`.
    ///
    /// Non-object payloads carry no keys and are ignored.
    #[must_use]
    pub fn with_data(mut self, data: &Value) -> Self {
        if let Value::Object(map) = data {
            for (key, value) in map {
                self.detail.insert(key.clone(), value.clone());
            }
        }
        self
    }

    /// Read an extension field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.detail.get(key)
    }
}

/// Where an event is dispatched, as named by a scenario step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchTarget {
    /// The `document` object
    Document,
    /// The `window` object
    Window,
    /// The first element matching a selector
    Selector(String),
}

impl DispatchTarget {
    /// Parse the target keyword; anything but `document`/`window` is a selector
    #[must_use]
    pub fn parse(target: &str) -> Self {
        match target {
            "document" => Self::Document,
            "window" => Self::Window,
            selector => Self::Selector(selector.to_string()),
        }
    }
}

impl From<&str> for DispatchTarget {
    fn from(target: &str) -> Self {
        Self::parse(target)
    }
}

/// A resolved dispatch target handed to the DOM backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget<'a, N> {
    /// The `document` object
    Document,
    /// The `window` object
    Window,
    /// A specific element
    Node(&'a N),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_defaults() {
        let event = SyntheticEvent::new("keydown");
        assert_eq!(event.kind, EventKind::Basic);
        assert!(!event.bubbles);
        assert!(!event.cancelable);
        assert!(event.detail.is_empty());
    }

    #[test]
    fn test_mouse_bubbles() {
        let event = SyntheticEvent::mouse("mousedown");
        assert_eq!(event.kind, EventKind::Mouse);
        assert!(event.bubbles && event.cancelable);
    }

    #[test]
    fn test_with_data_copies_object_keys() {
        let event =
            SyntheticEvent::new("keydown").with_data(&json!({"keyCode": 13, "key": "Enter"}));
        assert_eq!(event.get("keyCode"), Some(&json!(13)));
        assert_eq!(event.get("key"), Some(&json!("Enter")));
    }

    #[test]
    fn test_with_data_ignores_scalars() {
        let event = SyntheticEvent::new("x").with_data(&json!(42));
        assert!(event.detail.is_empty());
    }

    #[test]
    fn test_dispatch_target_parse() {
        assert_eq!(DispatchTarget::parse("document"), DispatchTarget::Document);
        assert_eq!(DispatchTarget::from("window"), DispatchTarget::Window);
        assert_eq!(
            DispatchTarget::parse("#field"),
            DispatchTarget::Selector("#field".to_string())
        );
    }
}
