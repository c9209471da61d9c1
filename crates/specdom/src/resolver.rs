//! Element lookup with uniform failure handling.
//!
//! Every DOM-touching check goes through [`resolve`] or [`with_element`], so
//! a missing element and a backend fault both surface as
//! [`Outcome::Error`] and never as a native error.

use crate::dom::Dom;
use crate::outcome::{bold, Outcome};
use crate::result::SpecdomResult;

/// Look up exactly one element for `selector`.
///
/// No match yields `Error("Element not found: <selector>")`; a backend
/// fault yields `Error(<fault description>)`.
pub fn resolve<D: Dom>(dom: &D, selector: &str) -> Result<D::Node, Outcome> {
    match dom.query_selector(selector) {
        Ok(Some(node)) => Ok(node),
        Ok(None) => Err(not_found(selector)),
        Err(err) => Err(Outcome::error(err.to_string())),
    }
}

/// Error outcome for a selector with no match
#[must_use]
pub fn not_found(selector: &str) -> Outcome {
    Outcome::error(format!("Element not found: {}", bold(selector)))
}

/// Resolve `selector` and evaluate `check` against the element.
///
/// Faults raised inside `check` are folded into an Error outcome too.
pub fn with_element<D, F>(dom: &D, selector: &str, check: F) -> Outcome
where
    D: Dom,
    F: FnOnce(&D, &D::Node) -> SpecdomResult<Outcome>,
{
    match resolve(dom, selector) {
        Ok(node) => check(dom, &node).unwrap_or_else(|err| Outcome::error(err.to_string())),
        Err(outcome) => outcome,
    }
}

/// Mutable counterpart of [`with_element`] for interactions
pub fn with_element_mut<D, F>(dom: &mut D, selector: &str, action: F) -> Outcome
where
    D: Dom,
    F: FnOnce(&mut D, &D::Node) -> SpecdomResult<Outcome>,
{
    match resolve(dom, selector) {
        Ok(node) => action(dom, &node).unwrap_or_else(|err| Outcome::error(err.to_string())),
        Err(outcome) => outcome,
    }
}
