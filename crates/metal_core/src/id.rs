//! Monotonic instance id generation

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe id generator
///
/// Ids start at 1 so that 0 can be used as "no id" in flat records.
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a new id generator
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Generate the next unique id
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Peek at the id that would be returned next
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
