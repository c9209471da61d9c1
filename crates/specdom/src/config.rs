//! Engine configuration

use crate::http_mock::MockResponse;
use crate::result::SpecdomResult;
use serde::{Deserialize, Serialize};

/// Whether outcome messages keep their bold markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Keep the ANSI bold markers
    #[default]
    Always,
    /// Strip markers; quotes around string literals remain
    Never,
}

impl ColorChoice {
    /// Should markers be kept
    #[must_use]
    pub const fn should_color(self) -> bool {
        matches!(self, Self::Always)
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Message marker handling
    pub color: ColorChoice,
    /// Response recorded for requests the mock queue does not match
    pub unhandled_response: MockResponse,
    /// Bracket clicks with synthetic `mousedown`/`mouseup`
    pub click_mouse_events: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Always,
            unhandled_response: MockResponse::default(),
            click_mouse_events: true,
        }
    }
}

impl EngineConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set the response used for unhandled requests
    #[must_use]
    pub fn with_unhandled_response(mut self, response: MockResponse) -> Self {
        self.unhandled_response = response;
        self
    }

    /// Enable or disable the synthetic mouse events around clicks
    #[must_use]
    pub const fn with_click_mouse_events(mut self, enabled: bool) -> Self {
        self.click_mouse_events = enabled;
        self
    }

    /// Load from a YAML document; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or has unknown fields.
    pub fn from_yaml_str(yaml: &str) -> SpecdomResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load from a JSON document; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or has unknown fields.
    pub fn from_json_str(json: &str) -> SpecdomResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
