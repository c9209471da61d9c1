//! In-memory reference DOM.
//!
//! An arena-backed document used for headless runs and for this crate's own
//! tests. It keeps only what the assertion engine reads: tags, attributes,
//! classes, inline and computed styles, form state, text, and a native
//! geometry per element. Dispatched events are recorded rather than run.

use crate::dom::{ClientRect, Dom};
use crate::event::{EventTarget, SyntheticEvent};
use crate::result::{SpecdomError, SpecdomResult};
use crate::selector::{Selector, SelectorSubject};
use std::collections::HashMap;

/// Handle to a node in a [`MemoryDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

const VOID_TAGS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];
const FORM_TAGS: &[&str] = &["input", "textarea", "select", "option", "button"];

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    inline_style: Vec<(String, String)>,
    computed: HashMap<String, String>,
    value: Option<String>,
    checked: bool,
    disabled: bool,
    native_rect: Option<ClientRect>,
}

impl ElementData {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn inline(&self, property: &str) -> Option<&str> {
        self.inline_style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Where a recorded event was dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedTarget {
    /// The document
    Document,
    /// The window
    Window,
    /// An element
    Node(NodeId),
}

/// An event observed by the in-memory DOM
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Dispatch target
    pub target: RecordedTarget,
    /// The event as dispatched
    pub event: SyntheticEvent,
}

/// Arena-backed document
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    document: NodeId,
    body: NodeId,
    title: String,
    location: String,
    events: Vec<RecordedEvent>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert `zIndex` style property names to `z-index`
fn normalize_property(property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn initial_style(property: &str) -> &'static str {
    match property {
        "display" => "block",
        "opacity" => "1",
        "visibility" => "visible",
        "z-index" => "auto",
        "position" => "static",
        _ => "",
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl MemoryDom {
    /// Create a document containing `<html><body></body></html>`
    #[must_use]
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            document: NodeId(0),
            body: NodeId(0),
            title: String::new(),
            location: "about:blank".to_string(),
            events: Vec::new(),
        };
        let html = dom.create_element("html");
        dom.attach(dom.document, html);
        let body = dom.create_element("body");
        dom.attach(html, body);
        dom.body = body;
        dom
    }

    /// The `<body>` element
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let value = FORM_TAGS.contains(&tag.as_str()).then(String::new);
        self.push(NodeKind::Element(ElementData {
            tag,
            value,
            ..ElementData::default()
        }))
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let child = self.create_element(tag);
        self.attach(parent, child);
        child
    }

    /// Append a text node to `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let child = self.push(NodeKind::Text(text.to_string()));
        self.attach(parent, child);
        child
    }

    /// Move `child` under `parent`
    ///
    /// # Errors
    ///
    /// Returns [`SpecdomError::DetachedNode`] for handles that do not belong
    /// to this document, and [`SpecdomError::HierarchyRequest`] when `child`
    /// is `parent` itself, one of its ancestors, or `parent` is a text node.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> SpecdomResult<()> {
        let (Some(container), Some(_)) = (self.node(parent), self.node(child)) else {
            return Err(SpecdomError::DetachedNode {
                message: format!("{parent:?} or {child:?} belongs to another document"),
            });
        };
        if matches!(container.kind, NodeKind::Text(_)) {
            return Err(SpecdomError::HierarchyRequest {
                message: format!("text node {parent:?} cannot have children"),
            });
        }
        if self.ancestors_or_self(parent).any(|ancestor| ancestor == child) {
            return Err(SpecdomError::HierarchyRequest {
                message: format!("{child:?} contains {parent:?}"),
            });
        }
        self.detach(child);
        self.attach(parent, child);
        Ok(())
    }

    /// Detach a node from the document
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            if let Some(slot) = el.attributes.iter_mut().find(|(k, _)| k == name) {
                slot.1 = value.to_string();
            } else {
                el.attributes.push((name.to_string(), value.to_string()));
            }
        }
    }

    /// Add a class to the class list
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        let current = self
            .element(node)
            .and_then(|el| el.attribute("class"))
            .unwrap_or_default()
            .to_string();
        if current.split_whitespace().any(|c| c == class) {
            return;
        }
        let next = if current.is_empty() {
            class.to_string()
        } else {
            format!("{current} {class}")
        };
        self.set_attribute(node, "class", &next);
    }

    /// Set an inline style property
    pub fn set_inline_style(&mut self, node: NodeId, property: &str, value: &str) {
        let property = normalize_property(property);
        if let Some(el) = self.element_mut(node) {
            if let Some(slot) = el.inline_style.iter_mut().find(|(k, _)| *k == property) {
                slot.1 = value.to_string();
            } else {
                el.inline_style.push((property, value.to_string()));
            }
        }
    }

    /// Force a computed style value, as a stylesheet rule would
    pub fn set_computed_style(&mut self, node: NodeId, property: &str, value: &str) {
        let property = normalize_property(property);
        if let Some(el) = self.element_mut(node) {
            el.computed.insert(property, value.to_string());
        }
    }

    /// Set the geometry reported by the native layout
    pub fn set_native_rect(&mut self, node: NodeId, rect: ClientRect) {
        if let Some(el) = self.element_mut(node) {
            el.native_rect = Some(rect);
        }
    }

    /// Set the `disabled` property
    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if let Some(el) = self.element_mut(node) {
            el.disabled = disabled;
        }
    }

    /// Set the `checked` property
    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(el) = self.element_mut(node) {
            el.checked = checked;
        }
    }

    /// Set the document title
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// Set the current location
    pub fn set_location(&mut self, location: &str) {
        self.location = location.to_string();
    }

    /// Events dispatched so far, oldest first
    #[must_use]
    pub fn dispatched_events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Event types dispatched on a node, oldest first
    #[must_use]
    pub fn event_types_on(&self, node: NodeId) -> Vec<String> {
        self.events
            .iter()
            .filter(|e| e.target == RecordedTarget::Node(node))
            .map(|e| e.event.event_type.clone())
            .collect()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Link a parentless `child` under `parent`; foreign handles and text
    /// parents are ignored
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let container = self
            .node(parent)
            .is_some_and(|n| !matches!(n.kind, NodeKind::Text(_)));
        if !container || parent == child {
            return;
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        } else {
            return;
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node.0).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.retain(|c| *c != node);
        }
    }

    fn ancestors_or_self(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(node).map(|_| node), |id| self.node(*id)?.parent)
    }

    /// Element children of the node's parent, with the node's index among them
    fn sibling_elements(&self, node: NodeId) -> Option<(Vec<NodeId>, usize)> {
        let parent = self.node(node)?.parent?;
        let siblings: Vec<NodeId> = self
            .node(parent)?
            .children
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect();
        let index = siblings.iter().position(|c| *c == node)?;
        Some((siblings, index))
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.ancestors_or_self(node).any(|id| id == self.document)
    }

    /// Element data for a node still attached to the document
    fn live(&self, node: NodeId) -> SpecdomResult<&ElementData> {
        if !self.is_connected(node) {
            return Err(SpecdomError::DetachedNode {
                message: format!("{node:?}"),
            });
        }
        self.element(node)
            .ok_or_else(|| SpecdomError::dom(format!("{node:?} is not an element")))
    }

    fn live_mut(&mut self, node: NodeId) -> SpecdomResult<&mut ElementData> {
        self.live(node)?;
        self.element_mut(node)
            .ok_or_else(|| SpecdomError::dom(format!("{node:?} is not an element")))
    }

    /// Elements in document order
    fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if matches!(node.kind, NodeKind::Element(_)) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(current) = self.node(node) else {
            return;
        };
        match &current.kind {
            NodeKind::Text(text) => out.push_str(text),
            _ => {
                for child in &current.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn serialize(&self, node: NodeId, out: &mut String) {
        let Some(current) = self.node(node) else {
            return;
        };
        match &current.kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Document => self.serialize_children(node, out),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attributes {
                    out.push_str(&format!(" {name}=\"{}\"", value.replace('"', "&quot;")));
                }
                if !el.inline_style.is_empty() {
                    let style: Vec<String> = el
                        .inline_style
                        .iter()
                        .map(|(k, v)| format!("{k}: {v};"))
                        .collect();
                    out.push_str(&format!(" style=\"{}\"", style.join(" ")));
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                self.serialize_children(node, out);
                out.push_str(&format!("</{}>", el.tag));
            }
        }
    }

    fn serialize_children(&self, node: NodeId, out: &mut String) {
        for child in self.node(node).map(|n| n.children.as_slice()).unwrap_or_default() {
            self.serialize(*child, out);
        }
    }

    fn record(&mut self, target: RecordedTarget, event: SyntheticEvent) {
        self.events.push(RecordedEvent { target, event });
    }
}

impl SelectorSubject for MemoryDom {
    type Id = NodeId;

    fn tag(&self, id: NodeId) -> &str {
        self.element(id).map_or("", |el| el.tag.as_str())
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|c| c.split_whitespace().any(|x| x == class))
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id)?.parent?;
        self.element(parent).map(|_| parent)
    }

    fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (siblings, index) = self.sibling_elements(id)?;
        siblings.get(index.checked_sub(1)?).copied()
    }

    fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (siblings, index) = self.sibling_elements(id)?;
        siblings.get(index + 1).copied()
    }

    fn has_child_nodes(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| !n.children.is_empty())
    }

    fn checked_state(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.checked)
    }

    fn disabled_state(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.disabled)
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn query_selector(&self, selector: &str) -> SpecdomResult<Option<NodeId>> {
        let parsed = Selector::parse(selector)?;
        Ok(self
            .elements()
            .into_iter()
            .find(|id| parsed.matches(self, *id)))
    }

    fn matches(&self, node: &NodeId, selector: &str) -> SpecdomResult<bool> {
        let parsed = Selector::parse(selector)?;
        self.live(*node)?;
        Ok(parsed.matches(self, *node))
    }

    fn parent_element(&self, node: &NodeId) -> Option<NodeId> {
        SelectorSubject::parent(self, *node)
    }

    fn tag_name(&self, node: &NodeId) -> SpecdomResult<String> {
        Ok(self.live(*node)?.tag.to_ascii_uppercase())
    }

    fn text_content(&self, node: &NodeId) -> SpecdomResult<String> {
        self.live(*node)?;
        let mut out = String::new();
        self.collect_text(*node, &mut out);
        Ok(out)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> SpecdomResult<Option<String>> {
        Ok(self.live(*node)?.attribute(name).map(str::to_string))
    }

    fn has_class(&self, node: &NodeId, class: &str) -> SpecdomResult<bool> {
        self.live(*node)?;
        Ok(SelectorSubject::has_class(self, *node, class))
    }

    fn computed_style(&self, node: &NodeId, property: &str) -> SpecdomResult<String> {
        let el = self.live(*node)?;
        let property = normalize_property(property);
        let value = el
            .computed
            .get(&property)
            .map(String::as_str)
            .or_else(|| el.inline(&property))
            .unwrap_or_else(|| initial_style(&property));
        Ok(value.to_string())
    }

    fn inline_style(&self, node: &NodeId, property: &str) -> SpecdomResult<String> {
        let el = self.live(*node)?;
        Ok(el
            .inline(&normalize_property(property))
            .unwrap_or_default()
            .to_string())
    }

    fn value(&self, node: &NodeId) -> SpecdomResult<Option<String>> {
        Ok(self.live(*node)?.value.clone())
    }

    fn set_value(&mut self, node: &NodeId, value: &str) -> SpecdomResult<()> {
        self.live_mut(*node)?.value = Some(value.to_string());
        Ok(())
    }

    fn is_disabled(&self, node: &NodeId) -> SpecdomResult<bool> {
        Ok(self.live(*node)?.disabled)
    }

    fn is_checked(&self, node: &NodeId) -> SpecdomResult<bool> {
        Ok(self.live(*node)?.checked)
    }

    fn click(&mut self, node: &NodeId) -> SpecdomResult<()> {
        let el = self.live_mut(*node)?;
        if el.disabled {
            return Ok(());
        }
        if el.tag == "input" {
            let input_type = el.attribute("type").map(str::to_ascii_lowercase);
            match input_type.as_deref() {
                Some("checkbox") => el.checked = !el.checked,
                Some("radio") => el.checked = true,
                _ => {}
            }
        }
        self.record(RecordedTarget::Node(*node), SyntheticEvent::mouse("click"));
        Ok(())
    }

    fn dispatch(
        &mut self,
        target: EventTarget<'_, NodeId>,
        event: SyntheticEvent,
    ) -> SpecdomResult<()> {
        let target = match target {
            EventTarget::Document => RecordedTarget::Document,
            EventTarget::Window => RecordedTarget::Window,
            EventTarget::Node(node) => {
                self.live(*node)?;
                RecordedTarget::Node(*node)
            }
        };
        self.record(target, event);
        Ok(())
    }

    fn native_bounding_rect(&self, node: &NodeId) -> SpecdomResult<ClientRect> {
        Ok(self.live(*node)?.native_rect.unwrap_or_default())
    }

    fn native_element_from_point(&self, x: f64, y: f64) -> SpecdomResult<Option<NodeId>> {
        // Later elements in document order paint over earlier ones.
        Ok(self.elements().into_iter().rev().find(|id| {
            self.element(*id)
                .and_then(|el| el.native_rect)
                .is_some_and(|rect| rect.contains(x, y))
        }))
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    fn body_html(&self) -> String {
        let mut out = String::new();
        self.serialize_children(self.body, &mut out);
        out
    }
}
