//! Three-valued assertion outcome and the message markup convention.
//!
//! Every check produced by this crate returns exactly one [`Outcome`]. The
//! message embeds literal values wrapped in ANSI bold escapes; string
//! literals are additionally double-quoted. Converting that markup for
//! display elsewhere is a pure transform ([`ansi_to_html`], [`strip_markup`]).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Escape sequence opening a bold span
pub const BOLD_START: &str = "\x1b[1m";

/// Escape sequence closing a bold span (full attribute reset)
pub const BOLD_END: &str = "\x1b[0m";

/// Result of evaluating a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message")]
pub enum Outcome {
    /// The checked condition holds
    Pass(String),
    /// The checked condition does not hold
    Fail(String),
    /// The check could not be evaluated
    Error(String),
}

impl Outcome {
    /// Create a passing outcome
    #[must_use]
    pub fn pass(message: impl Into<String>) -> Self {
        Self::Pass(message.into())
    }

    /// Create a failing outcome
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Create an error outcome
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Check if this is a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    /// Check if this is a fail
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// Check if this is an error
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The message carried by the outcome
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Pass(m) | Self::Fail(m) | Self::Error(m) => m,
        }
    }

    /// Short label for the variant
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass(_) => "Pass",
            Self::Fail(_) => "Fail",
            Self::Error(_) => "Error",
        }
    }

    /// Same outcome with bold markers removed from the message
    #[must_use]
    pub fn plain(&self) -> Self {
        let message = strip_markup(self.message());
        match self {
            Self::Pass(_) => Self::Pass(message),
            Self::Fail(_) => Self::Fail(message),
            Self::Error(_) => Self::Error(message),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message())
    }
}

/// Wrap a value in bold markers
#[must_use]
pub fn bold(value: impl fmt::Display) -> String {
    format!("{BOLD_START}{value}{BOLD_END}")
}

/// Wrap a string literal in quotes and bold markers
#[must_use]
pub fn bold_string(value: impl fmt::Display) -> String {
    bold(format!("\"{value}\""))
}

#[allow(clippy::expect_used)]
fn bold_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Older runtimes closed spans with ESC[21m; accept both.
    RE.get_or_init(|| Regex::new(r"(?s)\x1b\[1m(.*?)\x1b\[(?:0|21)m").expect("static pattern"))
}

/// Convert bold markers into `<b>` tags
#[must_use]
pub fn ansi_to_html(value: &str) -> String {
    bold_span().replace_all(value, "<b>$1</b>").into_owned()
}

/// Remove bold markers, keeping the wrapped text
#[must_use]
pub fn strip_markup(value: &str) -> String {
    bold_span().replace_all(value, "$1").into_owned()
}
