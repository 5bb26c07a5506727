//! Named counters for tracking events between reports

use std::collections::HashMap;

pub struct Counter {
    counters: HashMap<&'static str, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            counters: HashMap::new(),
        }
    }

    pub fn increment(&mut self, name: &'static str, value: usize) {
        *self.counters.entry(name).or_insert(0) += value;
    }

    pub fn get(&self, name: &'static str) -> usize {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Read a counter and reset it to zero.
    pub fn take(&mut self, name: &'static str) -> usize {
        self.counters.insert(name, 0).unwrap_or(0)
    }

}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_resets() {
        let mut counter = Counter::new();
        counter.increment("spawned", 2);
        counter.increment("spawned", 3);
        assert_eq!(counter.get("spawned"), 5);
        assert_eq!(counter.take("spawned"), 5);
        assert_eq!(counter.get("spawned"), 0);
        assert_eq!(counter.take("missing"), 0);
    }
}
