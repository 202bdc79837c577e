//! Newest-first bounded deque with an eviction callback.

use std::collections::VecDeque;

/// Ordered history capped at `capacity` entries, newest at index 0.
///
/// Insertion order is the ordering key. Pushing past the cap hands every
/// overflowing entry, oldest first, to the caller's eviction callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CappedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> CappedHistory<T> {
    /// Create an empty history.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Wrap an existing newest-first list.
    ///
    /// The list is kept as-is even if it already exceeds `capacity`; the
    /// excess is evicted on the next push.
    pub fn from_vec(items: Vec<T>, capacity: usize) -> Self {
        Self {
            items: items.into(),
            capacity,
        }
    }

    /// Prepend `item`, then evict from the tail until within capacity.
    pub fn push_front_with<F>(&mut self, item: T, mut on_evict: F)
    where
        F: FnMut(T),
    {
        self.items.push_front(item);
        while self.items.len() > self.capacity {
            match self.items.pop_back() {
                Some(evicted) => on_evict(evicted),
                None => break,
            }
        }
    }

    /// Prepend `item` and return the evicted entries.
    pub fn push_front(&mut self, item: T) -> Vec<T> {
        let mut evicted = Vec::new();
        self.push_front_with(item, |e| evicted.push(e));
        evicted
    }

    /// Keep only entries matching `keep`. Returns how many were removed.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    /// Most recent entry.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Consume into a newest-first `Vec`.
    pub fn into_vec(self) -> Vec<T> {
        self.items.into()
    }
}
