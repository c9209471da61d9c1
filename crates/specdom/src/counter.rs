//! Keyed invocation counter.

use std::collections::HashMap;

/// Counts how many times each key has been hit
#[derive(Debug, Clone, Default)]
pub struct InvocationCounter {
    counts: HashMap<String, u64>,
}

impl InvocationCounter {
    /// Create an empty counter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation of `key` and return its new count (1 on first use)
    pub fn increment(&mut self, key: &str) -> u64 {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current count without recording an invocation
    #[must_use]
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }
}
