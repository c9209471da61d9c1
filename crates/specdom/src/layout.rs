//! Layout virtualization.
//!
//! Tests can pin the geometry of elements without running real layout. An
//! ordered list of `(selector, rectangle)` overrides is consulted first by
//! the bounding-rectangle query and by point hit testing; anything the list
//! does not cover falls through to the native geometry of the [`Dom`].
//!
//! The overrides never patch the backend. Callers go through
//! [`Geometry`], which decorates a `Dom` with the active override list.

use crate::dom::{ClientRect, Dom, LayoutRect};
use crate::result::SpecdomResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// One geometry override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOverride {
    /// Elements matching this selector take the rectangle
    pub selector: String,
    /// The substitute geometry
    pub rect: LayoutRect,
}

impl LayoutOverride {
    /// Create a new override
    #[must_use]
    pub fn new(selector: impl Into<String>, rect: LayoutRect) -> Self {
        Self {
            selector: selector.into(),
            rect,
        }
    }
}

impl<S: Into<String>> From<(S, LayoutRect)> for LayoutOverride {
    fn from((selector, rect): (S, LayoutRect)) -> Self {
        Self::new(selector, rect)
    }
}

/// The active override list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutOverrides {
    entries: Vec<LayoutOverride>,
}

impl LayoutOverrides {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list; no merging with earlier entries
    pub fn set<I, E>(&mut self, entries: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<LayoutOverride>,
    {
        self.entries = entries.into_iter().map(Into::into).collect();
        debug!(count = self.entries.len(), "layout overrides installed");
    }

    /// Drop every override
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Installed overrides in priority order
    #[must_use]
    pub fn entries(&self) -> &[LayoutOverride] {
        &self.entries
    }

    /// Check if no override is installed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decorate `dom` with this list
    #[must_use]
    pub const fn geometry<'a, D: Dom>(&'a self, dom: &'a D) -> Geometry<'a, D> {
        Geometry {
            dom,
            overrides: self,
        }
    }
}

/// Geometry queries answered from overrides first, native layout second
#[derive(Debug)]
pub struct Geometry<'a, D: Dom> {
    dom: &'a D,
    overrides: &'a LayoutOverrides,
}

impl<'a, D: Dom> Geometry<'a, D> {
    /// Bounding rectangle of an element.
    ///
    /// The first override, in list order, whose selector matches the
    /// element wins.
    pub fn bounding_rect(&self, node: &D::Node) -> SpecdomResult<ClientRect> {
        for entry in &self.overrides.entries {
            if self.dom.matches(node, &entry.selector)? {
                return Ok(entry.rect.into());
            }
        }
        self.dom.native_bounding_rect(node)
    }

    /// Bounding rectangle of the first element matching `selector`.
    ///
    /// Never fails: a missing element or any fault gives a zeroed rectangle.
    pub fn query_rect(&self, selector: &str) -> ClientRect {
        let rect = self
            .dom
            .query_selector(selector)
            .and_then(|node| node.map_or(Ok(ClientRect::zeroed()), |n| self.bounding_rect(&n)));
        rect.unwrap_or_else(|err| {
            trace!(selector, error = %err, "bounding rect query failed");
            ClientRect::zeroed()
        })
    }

    /// Topmost element at `(x, y)`.
    ///
    /// Among overrides containing the point whose selector currently
    /// matches an element, the highest z-index wins (list order breaks
    /// ties). With no such override the native hit test answers.
    pub fn element_from_point(&self, x: f64, y: f64) -> SpecdomResult<Option<D::Node>> {
        let mut candidates = Vec::new();
        for entry in &self.overrides.entries {
            if !entry.rect.contains(x, y) {
                continue;
            }
            if let Some(node) = self.dom.query_selector(&entry.selector)? {
                candidates.push((entry.rect.z_index, node));
            }
        }
        // Stable sort keeps list order among equal z-indexes.
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        if let Some((z_index, node)) = candidates.into_iter().next() {
            trace!(x, y, z_index, "hit test answered by override");
            return Ok(Some(node));
        }
        self.dom.native_element_from_point(x, y)
    }

    /// Tag name of the topmost element at `(x, y)`, `None` when nothing is hit
    pub fn hit_test(&self, x: f64, y: f64) -> Option<String> {
        match self.element_from_point(x, y) {
            Ok(Some(node)) => self.dom.tag_name(&node).ok(),
            Ok(None) => None,
            Err(err) => {
                trace!(x, y, error = %err, "hit test failed");
                None
            }
        }
    }
}
