//! Inbound message channels of the embedded application.
//!
//! Scenarios can push values into the running app through named ports.
//! The app side is abstracted by [`AppPorts`]; [`PortRegistry`] is a
//! queue-backed implementation for headless runs and tests.

use crate::outcome::{bold, Outcome};
use crate::result::{SpecdomError, SpecdomResult};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Named inbound ports exposed by an embedded application
pub trait AppPorts {
    /// Check whether the app exposes `name`
    fn has_port(&self, name: &str) -> bool;

    /// Deliver `payload` on `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the app rejects the message.
    fn send(&mut self, name: &str, payload: &Value) -> SpecdomResult<()>;
}

/// Send `payload` into the app through the port `name`.
///
/// A missing port is a Fail; a delivery fault is an Error.
pub fn input_via_port<P: AppPorts + ?Sized>(ports: &mut P, name: &str, payload: &Value) -> Outcome {
    if !ports.has_port(name) {
        return Outcome::fail(format!("Cannot find port: \"{}\" in the app.", bold(name)));
    }
    match ports.send(name, payload) {
        Ok(()) => {
            debug!(port = name, "port message delivered");
            Outcome::pass(format!(
                "Port: \"{}\" with payload: {}",
                bold(name),
                bold(payload)
            ))
        }
        Err(err) => Outcome::error(err.to_string()),
    }
}

/// Queue-backed [`AppPorts`]
#[derive(Debug, Clone, Default)]
pub struct PortRegistry {
    queues: HashMap<String, VecDeque<Value>>,
    closed: HashMap<String, String>,
}

impl PortRegistry {
    /// Create a registry with no ports
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose a port
    #[must_use]
    pub fn with_port(mut self, name: impl Into<String>) -> Self {
        self.open(name);
        self
    }

    /// Expose a port
    pub fn open(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.closed.remove(&name);
        self.queues.entry(name).or_default();
    }

    /// Keep the port visible but reject every send with `reason`
    pub fn close(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        let name = name.into();
        self.queues.entry(name.clone()).or_default();
        self.closed.insert(name, reason.into());
    }

    /// Payloads delivered on `name`, oldest first
    #[must_use]
    pub fn received(&self, name: &str) -> Vec<Value> {
        self.queues
            .get(name)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pop the oldest payload delivered on `name`
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.queues.get_mut(name)?.pop_front()
    }
}

impl AppPorts for PortRegistry {
    fn has_port(&self, name: &str) -> bool {
        self.queues.contains_key(name)
    }

    fn send(&mut self, name: &str, payload: &Value) -> SpecdomResult<()> {
        if let Some(reason) = self.closed.get(name) {
            return Err(SpecdomError::PortFault {
                message: reason.clone(),
            });
        }
        let queue = self.queues.get_mut(name).ok_or_else(|| SpecdomError::PortFault {
            message: format!("port {name} is not open"),
        })?;
        queue.push_back(payload.clone());
        Ok(())
    }
}
