//! The DOM seam.
//!
//! The live document belongs to the host (a browser, or [`crate::MemoryDom`]
//! in headless runs). Everything in this crate talks to it through [`Dom`],
//! and every fallible call reports faults as [`SpecdomError`] values so the
//! assertion layer can turn them into outcomes.

use crate::event::{EventTarget, SyntheticEvent};
use crate::result::SpecdomResult;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Rectangle installed by a layout override
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRect {
    /// Top edge
    pub top: f64,
    /// Left edge
    pub left: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Stacking order used by hit testing
    #[serde(default)]
    pub z_index: i32,
}

impl LayoutRect {
    /// Create a new rectangle at stacking level 0
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
            z_index: 0,
        }
    }

    /// Set the stacking level
    #[must_use]
    pub const fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Check if a point lies inside the rectangle (edges inclusive)
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.top <= y
            && self.top + self.height >= y
            && self.left <= x
            && self.left + self.width >= x
    }
}

/// Result of a bounding-rectangle query
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientRect {
    /// Top edge
    pub top: f64,
    /// Left edge
    pub left: f64,
    /// Right edge
    pub right: f64,
    /// Bottom edge
    pub bottom: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl ClientRect {
    /// Create from position and size
    #[must_use]
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            right: left + width,
            bottom: top + height,
            width,
            height,
        }
    }

    /// All-zero rectangle returned when a query fails
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            top: 0.0,
            left: 0.0,
            right: 0.0,
            bottom: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Check if a point lies inside the rectangle (edges inclusive)
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.left <= x && x <= self.right && self.top <= y && y <= self.bottom
    }
}

impl From<LayoutRect> for ClientRect {
    fn from(rect: LayoutRect) -> Self {
        Self::new(rect.top, rect.left, rect.width, rect.height)
    }
}

/// Access to the document under test.
///
/// `Node` is the backend's element handle. Lookups that can fail on a
/// malformed selector or a detached node return `SpecdomResult`.
pub trait Dom {
    /// Element handle
    type Node: Clone + Debug;

    /// First element matching `selector` in document order
    fn query_selector(&self, selector: &str) -> SpecdomResult<Option<Self::Node>>;

    /// Whether `node` matches `selector`
    fn matches(&self, node: &Self::Node, selector: &str) -> SpecdomResult<bool>;

    /// Parent element, `None` at the root
    fn parent_element(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Upper-case tag name
    fn tag_name(&self, node: &Self::Node) -> SpecdomResult<String>;

    /// Concatenated descendant text
    fn text_content(&self, node: &Self::Node) -> SpecdomResult<String>;

    /// Attribute value, `None` when absent
    fn attribute(&self, node: &Self::Node, name: &str) -> SpecdomResult<Option<String>>;

    /// Class list membership
    fn has_class(&self, node: &Self::Node, class: &str) -> SpecdomResult<bool>;

    /// Resolved (computed) style property
    fn computed_style(&self, node: &Self::Node, property: &str) -> SpecdomResult<String>;

    /// Inline `style` property, empty when unset
    fn inline_style(&self, node: &Self::Node, property: &str) -> SpecdomResult<String>;

    /// Form control value, `None` for elements without one
    fn value(&self, node: &Self::Node) -> SpecdomResult<Option<String>>;

    /// Assign the form control value
    fn set_value(&mut self, node: &Self::Node, value: &str) -> SpecdomResult<()>;

    /// `disabled` property
    fn is_disabled(&self, node: &Self::Node) -> SpecdomResult<bool>;

    /// `checked` property
    fn is_checked(&self, node: &Self::Node) -> SpecdomResult<bool>;

    /// Native click activation
    fn click(&mut self, node: &Self::Node) -> SpecdomResult<()>;

    /// Dispatch a synthetic event
    fn dispatch(
        &mut self,
        target: EventTarget<'_, Self::Node>,
        event: SyntheticEvent,
    ) -> SpecdomResult<()>;

    /// Geometry from the real layout engine
    fn native_bounding_rect(&self, node: &Self::Node) -> SpecdomResult<ClientRect>;

    /// Topmost element at a point according to the real layout engine
    fn native_element_from_point(&self, x: f64, y: f64) -> SpecdomResult<Option<Self::Node>>;

    /// Document title
    fn title(&self) -> String;

    /// Current location as a string
    fn location(&self) -> String;

    /// `document.body.innerHTML`
    fn body_html(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod layout_rect_tests {
        use super::*;

        #[test]
        fn test_contains_inclusive_edges() {
            let rect = LayoutRect::new(10.0, 20.0, 100.0, 50.0);
            assert!(rect.contains(20.0, 10.0));
            assert!(rect.contains(120.0, 60.0));
            assert!(!rect.contains(121.0, 30.0));
            assert!(!rect.contains(50.0, 61.0));
        }

        #[test]
        fn test_contains_uses_x_for_horizontal_bound() {
            // Wide, short rectangle: x far right of `top` must still hit.
            let rect = LayoutRect::new(0.0, 200.0, 100.0, 10.0);
            assert!(rect.contains(250.0, 5.0));
            assert!(!rect.contains(5.0, 5.0));
        }

        #[test]
        fn test_camel_case_serde() {
            let rect: LayoutRect = serde_json::from_str(
                r#"{"top":1,"left":2,"width":3,"height":4,"zIndex":7}"#,
            )
            .unwrap_or_else(|e| panic!("{e}"));
            assert_eq!(rect, LayoutRect::new(1.0, 2.0, 3.0, 4.0).with_z_index(7));
        }
    }

    mod client_rect_tests {
        use super::*;

        #[test]
        fn test_from_layout_fills_edges() {
            let rect = ClientRect::from(LayoutRect::new(10.0, 20.0, 30.0, 40.0));
            assert_eq!(rect.right, 50.0);
            assert_eq!(rect.bottom, 50.0);
        }

        #[test]
        fn test_zeroed() {
            assert_eq!(ClientRect::zeroed(), ClientRect::default());
        }
    }
}
