//! Bounded recency cache of message bodies already handled in this run.
//!
//! Keys are the verbatim message text: two posts that differ only in
//! whitespace are distinct.

use std::collections::{HashSet, VecDeque};

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    order: VecDeque<String>,
    members: HashSet<String>,
    capacity: usize,
}

impl Default for DuplicateFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DuplicateFilter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Exact-string membership
    pub fn seen(&self, text: &str) -> bool {
        self.members.contains(text)
    }

    /// Remember `text`, evicting the oldest entry when full
    pub fn record(&mut self, text: &str) {
        if self.members.contains(text) {
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.order.push_back(text.to_string());
        self.members.insert(text.to_string());
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
