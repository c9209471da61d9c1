//! Report forwarding to a host-registered callback.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

type ReportCallback = Box<dyn FnMut(Value)>;

/// Destination for structured reports
#[derive(Default)]
pub struct ReportSink {
    callback: Option<ReportCallback>,
}

impl fmt::Debug for ReportSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportSink")
            .field("registered", &self.callback.is_some())
            .finish()
    }
}

impl ReportSink {
    /// Create a sink with no callback
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback`, replacing any earlier one
    pub fn register(&mut self, callback: impl FnMut(Value) + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Remove the callback
    pub fn unregister(&mut self) {
        self.callback = None;
    }

    /// Check whether a callback is installed
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.callback.is_some()
    }

    /// Forward `report`; a no-op without a callback
    pub fn report(&mut self, report: Value) {
        match self.callback.as_mut() {
            Some(callback) => {
                debug!("forwarding report");
                callback(report);
            }
            None => debug!("report dropped, no sink registered"),
        }
    }

    /// Serialize `report` to JSON and forward it
    pub fn report_serialized<T: Serialize>(&mut self, report: &T) {
        match serde_json::to_value(report) {
            Ok(value) => self.report(value),
            Err(err) => warn!(error = %err, "report could not be serialized"),
        }
    }
}
