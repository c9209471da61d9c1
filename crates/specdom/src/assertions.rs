//! DOM and document assertions.
//!
//! Element checks take their arguments followed by the selector, resolve
//! the element through [`crate::resolver`], and report Pass or Fail with a
//! message naming the selector, the checked property and the compared
//! value. Document checks read title, location or body markup directly.

use crate::dom::Dom;
use crate::outcome::{bold, bold_string, Outcome};
use crate::resolver::{resolve, with_element};
use crate::visibility::check_visibility;

/// Element text content includes `value`
pub fn contains_text<D: Dom>(dom: &D, value: &str, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        let text = dom.text_content(node)?;
        Ok(if text.contains(value) {
            Outcome::pass(format!(
                "Element {} contains text {}",
                bold(selector),
                bold_string(value)
            ))
        } else {
            Outcome::fail(format!(
                "Element {} text {} does not contain {}",
                bold(selector),
                bold_string(&text),
                bold_string(value)
            ))
        })
    })
}

/// Attribute value (empty when absent) includes `value`
pub fn attribute_contains<D: Dom>(
    dom: &D,
    attribute: &str,
    value: &str,
    selector: &str,
) -> Outcome {
    with_element(dom, selector, |dom, node| {
        let actual = dom.attribute(node, attribute)?.unwrap_or_default();
        Ok(if actual.contains(value) {
            Outcome::pass(format!(
                "Attribute {} of element {} contains text {}",
                bold(attribute),
                bold(selector),
                bold_string(value)
            ))
        } else {
            Outcome::fail(format!(
                "Attribute {} of element {} does not contain text {}",
                bold(attribute),
                bold(selector),
                bold_string(value)
            ))
        })
    })
}

/// Attribute value (empty when absent) equals `value`
pub fn attribute_equals<D: Dom>(dom: &D, attribute: &str, value: &str, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        let actual = dom.attribute(node, attribute)?.unwrap_or_default();
        Ok(if actual == value {
            Outcome::pass(format!(
                "Attribute {} of element {} equals {}",
                bold(attribute),
                bold(selector),
                bold_string(value)
            ))
        } else {
            Outcome::fail(format!(
                "Attribute {} of element {} does not equal {}: {}",
                bold(attribute),
                bold(selector),
                bold_string(value),
                bold_string(&actual)
            ))
        })
    })
}

/// Class list contains `class`
pub fn class_present<D: Dom>(dom: &D, class: &str, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        Ok(if dom.has_class(node, class)? {
            Outcome::pass(format!("Element {} has class {}", bold(selector), bold(class)))
        } else {
            Outcome::fail(format!(
                "Element {} does not have class {}",
                bold(selector),
                bold(class)
            ))
        })
    })
}

fn style_outcome(selector: &str, style: &str, value: &str, actual: &str) -> Outcome {
    if actual == value {
        Outcome::pass(format!(
            "Element {} has style {} with value {}",
            bold(selector),
            bold(style),
            bold_string(value)
        ))
    } else {
        Outcome::fail(format!(
            "Element {} does not have style {}: {} with value {}",
            bold(selector),
            bold(style),
            bold(actual),
            bold_string(value)
        ))
    }
}

/// Computed style property equals `value`
pub fn style_equals<D: Dom>(dom: &D, style: &str, value: &str, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        let actual = dom.computed_style(node, style)?;
        Ok(style_outcome(selector, style, value, &actual))
    })
}

/// Inline style property equals `value`
pub fn inline_style_equals<D: Dom>(dom: &D, style: &str, value: &str, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        let actual = dom.inline_style(node, style)?;
        Ok(style_outcome(selector, style, value, &actual))
    })
}

/// Form value (empty when absent) includes `text`
pub fn value_contains<D: Dom>(dom: &D, text: &str, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        let value = dom.value(node)?.unwrap_or_default();
        Ok(if value.contains(text) {
            Outcome::pass(format!(
                "Value {} of element {} contains text {}",
                bold_string(&value),
                bold(selector),
                bold_string(text)
            ))
        } else {
            Outcome::fail(format!(
                "Value {} of element {} does not contain text {}",
                bold_string(&value),
                bold(selector),
                bold_string(text)
            ))
        })
    })
}

/// Form value (empty when absent) equals `text`
pub fn value_equals<D: Dom>(dom: &D, text: &str, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        let value = dom.value(node)?.unwrap_or_default();
        Ok(if value == text {
            Outcome::pass(format!(
                "Value of element {} equals {}",
                bold(selector),
                bold_string(text)
            ))
        } else {
            Outcome::fail(format!(
                "Value {} of element {} does not equal {}",
                bold_string(&value),
                bold(selector),
                bold_string(text)
            ))
        })
    })
}

/// Some element matches `selector`
pub fn element_present<D: Dom>(dom: &D, selector: &str) -> Outcome {
    match resolve(dom, selector) {
        Ok(_) => Outcome::pass(format!("Element {} is present", bold(selector))),
        Err(outcome) => outcome,
    }
}

/// `disabled` property is set
pub fn element_disabled<D: Dom>(dom: &D, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        Ok(if dom.is_disabled(node)? {
            Outcome::pass(format!("Element {} is disabled", bold(selector)))
        } else {
            Outcome::fail(format!("Element {} is not disabled", bold(selector)))
        })
    })
}

/// `checked` property is set
pub fn checkbox_checked<D: Dom>(dom: &D, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        Ok(if dom.is_checked(node)? {
            Outcome::pass(format!("Element {} is checked", bold(selector)))
        } else {
            Outcome::fail(format!("Element {} is unchecked", bold(selector)))
        })
    })
}

/// Nothing in the element's own style or its ancestors hides it
pub fn element_visible<D: Dom>(dom: &D, selector: &str) -> Outcome {
    with_element(dom, selector, |dom, node| {
        Ok(check_visibility(dom, node, selector)?.unwrap_or_else(|| {
            Outcome::pass(format!(
                "Element {} should be visible (no CSS used to hide it)",
                bold(selector)
            ))
        }))
    })
}

/// Attribute value of the matched element; `Err` carries the resolver outcome
pub fn get_attribute<D: Dom>(
    dom: &D,
    attribute: &str,
    selector: &str,
) -> Result<Option<String>, Outcome> {
    let node = resolve(dom, selector)?;
    dom.attribute(&node, attribute)
        .map_err(|err| Outcome::error(err.to_string()))
}

/// Document title includes `text`
pub fn title_contains<D: Dom>(dom: &D, text: &str) -> Outcome {
    let title = dom.title();
    if title.contains(text) {
        Outcome::pass(format!(
            "Title {} contains text {}",
            bold_string(&title),
            bold_string(text)
        ))
    } else {
        Outcome::fail(format!(
            "Title {} does not contain text {}",
            bold_string(&title),
            bold_string(text)
        ))
    }
}

/// Document title equals `text`
pub fn title_equals<D: Dom>(dom: &D, text: &str) -> Outcome {
    let title = dom.title();
    if title == text {
        Outcome::pass(format!("Title equals {}", bold_string(text)))
    } else {
        Outcome::fail(format!(
            "Title {} does not equal {}",
            bold_string(&title),
            bold_string(text)
        ))
    }
}

/// Current location includes `text`
pub fn url_contains<D: Dom>(dom: &D, text: &str) -> Outcome {
    let url = dom.location();
    if url.contains(text) {
        Outcome::pass(format!(
            "URL {} contains text {}",
            bold_string(&url),
            bold_string(text)
        ))
    } else {
        Outcome::fail(format!(
            "URL {} does not contain text {}",
            bold_string(&url),
            bold_string(text)
        ))
    }
}

/// Current location equals `text`
pub fn url_equals<D: Dom>(dom: &D, text: &str) -> Outcome {
    let url = dom.location();
    if url == text {
        Outcome::pass(format!("URL equals {}", bold_string(text)))
    } else {
        Outcome::fail(format!(
            "URL {} does not equal {}",
            bold(&url),
            bold_string(text)
        ))
    }
}

/// Body markup includes `text`
pub fn body_contains<D: Dom>(dom: &D, text: &str) -> Outcome {
    let body = dom.body_html();
    if body.contains(text) {
        Outcome::pass(format!(
            "Body {} contains text {}",
            bold_string(&body),
            bold_string(text)
        ))
    } else {
        Outcome::fail(format!(
            "Body {} does not contain text {}",
            bold_string(&body),
            bold_string(text)
        ))
    }
}

/// Body markup equals `text`
pub fn body_equals<D: Dom>(dom: &D, text: &str) -> Outcome {
    let body = dom.body_html();
    if body == text {
        Outcome::pass(format!("Body equals {}", bold_string(text)))
    } else {
        Outcome::fail(format!(
            "Body {} does not equal {}",
            bold_string(&body),
            bold_string(text)
        ))
    }
}

/// Always passes, embedding the body markup for diagnostics
pub fn log_body<D: Dom>(dom: &D) -> Outcome {
    Outcome::pass(format!("Body: {}", bold_string(dom.body_html())))
}
