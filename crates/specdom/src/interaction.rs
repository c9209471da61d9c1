//! Interaction primitives: clicks, form values and synthetic events.

use crate::dom::Dom;
use crate::event::{DispatchTarget, EventTarget, SyntheticEvent};
use crate::outcome::{bold, bold_string, Outcome};
use crate::resolver::with_element_mut;
use crate::result::SpecdomResult;
use serde_json::Value;
use tracing::trace;

/// Click the element matching `selector`.
///
/// With `mouse_events` set, the native click is bracketed by synthetic
/// `mousedown` and `mouseup` events.
pub fn click<D: Dom>(dom: &mut D, selector: &str, mouse_events: bool) -> Outcome {
    with_element_mut(dom, selector, |dom, node| {
        if mouse_events {
            dom.dispatch(EventTarget::Node(node), SyntheticEvent::mouse("mousedown"))?;
        }
        dom.click(node)?;
        if mouse_events {
            dom.dispatch(EventTarget::Node(node), SyntheticEvent::mouse("mouseup"))?;
        }
        trace!(selector, "clicked");
        Ok(Outcome::pass(format!("Clicked: {}", bold(selector))))
    })
}

fn fire<D: Dom>(dom: &mut D, node: &D::Node, event_name: &str) -> SpecdomResult<()> {
    dom.dispatch(EventTarget::Node(node), SyntheticEvent::bubbling(event_name))
}

/// Assign `value` to the element's value property
pub fn set_value<D: Dom>(dom: &mut D, value: &str, selector: &str) -> Outcome {
    with_element_mut(dom, selector, |dom, node| {
        dom.set_value(node, value)?;
        Ok(Outcome::pass(format!(
            "Set value to {} of {}",
            bold_string(value),
            bold(selector)
        )))
    })
}

/// Assign `value`, then fire a bubbling, cancelable `event_name`
pub fn set_value_and_dispatch<D: Dom>(
    dom: &mut D,
    value: &str,
    selector: &str,
    event_name: &str,
) -> Outcome {
    with_element_mut(dom, selector, |dom, node| {
        dom.set_value(node, value)?;
        fire(dom, node, event_name)?;
        Ok(Outcome::pass(format!(
            "Set value to {} of {}; dispatching event {}",
            bold_string(value),
            bold(selector),
            bold_string(event_name)
        )))
    })
}

/// Reset the element's value to the empty string
pub fn clear_value<D: Dom>(dom: &mut D, selector: &str) -> Outcome {
    with_element_mut(dom, selector, |dom, node| {
        dom.set_value(node, "")?;
        Ok(Outcome::pass(format!("Cleared value of {}", bold(selector))))
    })
}

/// Reset the value, then fire a bubbling, cancelable `event_name`
pub fn clear_value_and_dispatch<D: Dom>(dom: &mut D, selector: &str, event_name: &str) -> Outcome {
    with_element_mut(dom, selector, |dom, node| {
        dom.set_value(node, "")?;
        fire(dom, node, event_name)?;
        Ok(Outcome::pass(format!(
            "Cleared value of {}; dispatching event {}",
            bold(selector),
            bold_string(event_name)
        )))
    })
}

/// Dispatch `event_type` carrying the keys of `data` in its detail map.
///
/// Document and window targets always pass; element targets go through
/// the resolver.
pub fn dispatch_event<D: Dom>(
    dom: &mut D,
    event_type: &str,
    data: &Value,
    target: &DispatchTarget,
) -> Outcome {
    let event = SyntheticEvent::new(event_type).with_data(data);
    let (resolved, name) = match target {
        DispatchTarget::Document => (EventTarget::Document, "document"),
        DispatchTarget::Window => (EventTarget::Window, "window"),
        DispatchTarget::Selector(selector) => {
            return with_element_mut(dom, selector, |dom, node| {
                dom.dispatch(EventTarget::Node(node), event)?;
                Ok(Outcome::pass(format!(
                    "Dispatched event {} on element {}",
                    bold(event_type),
                    bold(selector)
                )))
            });
        }
    };
    if let Err(err) = dom.dispatch(resolved, event) {
        // Global targets have no failure path of their own.
        trace!(event_type, error = %err, "global dispatch fault ignored");
    }
    Outcome::pass(format!("Dispatched event {} on {}", bold(event_type), bold(name)))
}
