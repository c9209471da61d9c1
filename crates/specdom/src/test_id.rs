//! Test identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based identity of the test currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub u64);

impl TestId {
    /// Create a test id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Decode the runtime's one-based test counter.
///
/// The runtime publishes `id + 1` so that zero can mean "no test running".
#[must_use]
pub fn current_test_id(signal: Option<u64>) -> Option<TestId> {
    match signal {
        Some(n) if n > 0 => Some(TestId(n - 1)),
        _ => None,
    }
}
