//! Computed-style visibility walk.

use crate::dom::Dom;
use crate::outcome::{bold, Outcome};
use crate::result::SpecdomResult;

/// Why an element is hidden
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HiddenBy {
    /// `display: none`
    DisplayNone,
    /// `opacity: 0`
    ZeroOpacity,
    /// `visibility: hidden`
    VisibilityHidden,
    /// Negative `z-index`, carrying the computed value
    NegativeZIndex(String),
    /// Some ancestor is hidden
    Parent,
}

impl HiddenBy {
    /// Human-readable reason used in failure messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::DisplayNone => bold("display: none"),
            Self::ZeroOpacity => bold("opacity: 0"),
            Self::VisibilityHidden => bold("visibility: hidden"),
            Self::NegativeZIndex(z) => bold(format!("z-index: {z}")),
            Self::Parent => "parent element.".to_string(),
        }
    }
}

/// Leading numeric prefix, as `parseFloat`/`parseInt` read CSS values
fn leading_number(value: &str, allow_fraction: bool) -> Option<f64> {
    let value = value.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, ch) in value.char_indices() {
        let ok = ch.is_ascii_digit()
            || ((ch == '-' || ch == '+') && i == 0)
            || (allow_fraction && ch == '.' && !seen_dot);
        if !ok {
            break;
        }
        seen_dot |= ch == '.';
        end = i + ch.len_utf8();
    }
    value[..end].parse().ok()
}

/// Hiding reason found on the element itself, ignoring ancestors
pub fn own_hiding_style<D: Dom>(dom: &D, node: &D::Node) -> SpecdomResult<Option<HiddenBy>> {
    if dom.computed_style(node, "display")? == "none" {
        return Ok(Some(HiddenBy::DisplayNone));
    }
    if leading_number(&dom.computed_style(node, "opacity")?, true) == Some(0.0) {
        return Ok(Some(HiddenBy::ZeroOpacity));
    }
    if dom.computed_style(node, "visibility")? == "hidden" {
        return Ok(Some(HiddenBy::VisibilityHidden));
    }
    let z_index = dom.computed_style(node, "z-index")?;
    if z_index != "auto" && leading_number(&z_index, false).is_some_and(|z| z < 0.0) {
        return Ok(Some(HiddenBy::NegativeZIndex(z_index)));
    }
    Ok(None)
}

/// Walk `node` and its ancestors; `None` means nothing hides it.
///
/// The element's own style is checked first, in the order display,
/// opacity, visibility, z-index. A hidden ancestor is reported as
/// [`HiddenBy::Parent`] without its specific reason.
pub fn hidden_by<D: Dom>(dom: &D, node: &D::Node) -> SpecdomResult<Option<HiddenBy>> {
    if let Some(reason) = own_hiding_style(dom, node)? {
        return Ok(Some(reason));
    }
    let mut ancestor = dom.parent_element(node);
    while let Some(current) = ancestor {
        if own_hiding_style(dom, &current)?.is_some() {
            return Ok(Some(HiddenBy::Parent));
        }
        ancestor = dom.parent_element(&current);
    }
    Ok(None)
}

/// Fail outcome naming the hiding reason, or `None` when visible
pub fn check_visibility<D: Dom>(
    dom: &D,
    node: &D::Node,
    selector: &str,
) -> SpecdomResult<Option<Outcome>> {
    Ok(hidden_by(dom, node)?.map(|reason| {
        Outcome::fail(format!(
            "Element {} is hidden by {}",
            bold(selector),
            reason.describe()
        ))
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory_dom::{MemoryDom, NodeId};
    use crate::outcome::strip_markup;

    fn nested() -> (MemoryDom, NodeId, NodeId) {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let outer = dom.append_element(body, "div");
        let inner = dom.append_element(outer, "span");
        (dom, outer, inner)
    }

    mod number_tests {
        use super::*;

        #[test]
        fn test_leading_number() {
            assert_eq!(leading_number("0", true), Some(0.0));
            assert_eq!(leading_number("0.0", true), Some(0.0));
            assert_eq!(leading_number("0.5", true), Some(0.5));
            assert_eq!(leading_number("-1", false), Some(-1.0));
            assert_eq!(leading_number("-3px", false), Some(-3.0));
            assert_eq!(leading_number("auto", false), None);
            assert_eq!(leading_number("", true), None);
        }
    }

    mod own_style_tests {
        use super::*;

        #[test]
        fn test_visible_by_default() {
            let (dom, _, inner) = nested();
            assert_eq!(hidden_by(&dom, &inner).unwrap(), None);
        }

        #[test]
        fn test_display_none() {
            let (mut dom, _, inner) = nested();
            dom.set_computed_style(inner, "display", "none");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), Some(HiddenBy::DisplayNone));
        }

        #[test]
        fn test_zero_opacity() {
            let (mut dom, _, inner) = nested();
            dom.set_inline_style(inner, "opacity", "0.0");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), Some(HiddenBy::ZeroOpacity));
        }

        #[test]
        fn test_partial_opacity_is_visible() {
            let (mut dom, _, inner) = nested();
            dom.set_inline_style(inner, "opacity", "0.01");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), None);
        }

        #[test]
        fn test_visibility_hidden() {
            let (mut dom, _, inner) = nested();
            dom.set_computed_style(inner, "visibility", "hidden");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), Some(HiddenBy::VisibilityHidden));
        }

        #[test]
        fn test_negative_z_index() {
            let (mut dom, _, inner) = nested();
            dom.set_computed_style(inner, "zIndex", "-1");
            assert_eq!(
                hidden_by(&dom, &inner).unwrap(),
                Some(HiddenBy::NegativeZIndex("-1".to_string()))
            );
        }

        #[test]
        fn test_zero_z_index_is_visible() {
            let (mut dom, _, inner) = nested();
            dom.set_computed_style(inner, "z-index", "0");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), None);
        }

        #[test]
        fn test_priority_display_first() {
            let (mut dom, _, inner) = nested();
            dom.set_computed_style(inner, "visibility", "hidden");
            dom.set_computed_style(inner, "opacity", "0");
            dom.set_computed_style(inner, "display", "none");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), Some(HiddenBy::DisplayNone));
        }
    }

    mod ancestor_tests {
        use super::*;

        #[test]
        fn test_hidden_parent() {
            let (mut dom, outer, inner) = nested();
            dom.set_computed_style(outer, "opacity", "0");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), Some(HiddenBy::Parent));
        }

        #[test]
        fn test_own_reason_beats_parent() {
            let (mut dom, outer, inner) = nested();
            dom.set_computed_style(outer, "display", "none");
            dom.set_computed_style(inner, "display", "none");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), Some(HiddenBy::DisplayNone));
        }

        #[test]
        fn test_hidden_body_hides_everything() {
            let (mut dom, _, inner) = nested();
            let body = dom.body();
            dom.set_computed_style(body, "visibility", "hidden");
            assert_eq!(hidden_by(&dom, &inner).unwrap(), Some(HiddenBy::Parent));
        }
    }

    mod message_tests {
        use super::*;

        #[test]
        fn test_fail_message() {
            let (mut dom, _, inner) = nested();
            dom.set_computed_style(inner, "display", "none");
            let outcome = check_visibility(&dom, &inner, "span").unwrap().unwrap();
            assert!(outcome.is_fail());
            assert_eq!(
                strip_markup(outcome.message()),
                "Element span is hidden by display: none"
            );
        }

        #[test]
        fn test_parent_message() {
            let (mut dom, outer, inner) = nested();
            dom.set_computed_style(outer, "display", "none");
            let outcome = check_visibility(&dom, &inner, "span").unwrap().unwrap();
            assert_eq!(
                strip_markup(outcome.message()),
                "Element span is hidden by parent element."
            );
        }

        #[test]
        fn test_visible_is_none() {
            let (dom, _, inner) = nested();
            assert_eq!(check_visibility(&dom, &inner, "span").unwrap(), None);
        }
    }
}
