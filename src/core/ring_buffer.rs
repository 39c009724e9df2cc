// # Ring Buffer Module
//
// Bounded, newest-first log. Pushing onto a full log evicts the oldest entry.
//
// ```text
//   push(E) ──▶ ┌───┬───┬───┬─────┬───┐
//               │ E │ D │ C │ ... │ A │ ──▶ A evicted when len == capacity
//               └───┴───┴───┴─────┴───┘
//               newest          oldest
// ```
//
// Backs the diary; persistence is layered on top by the history store.

use std::collections::VecDeque;

/// Fixed-capacity list ordered most-recent-first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> RecentLog<T> {
    /// Create an empty log. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild a log from entries already ordered newest-first, keeping the first
    /// `capacity` of them.
    pub fn from_newest_first(entries: Vec<T>, capacity: usize) -> Self {
        let mut log = Self::new(capacity);
        log.entries.extend(entries.into_iter().take(log.capacity));
        log
    }

    /// Insert `entry` as the newest element. Returns the evicted oldest entry, if any.
    pub fn push(&mut self, entry: T) -> Option<T> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Newest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn newest(&self) -> Option<&T> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Contiguous newest-first view, for serialization.
    pub fn as_slice(&mut self) -> &[T] {
        self.entries.make_contiguous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_orders_newest_first() {
        let mut log = RecentLog::new(3);
        assert!(log.is_empty());
        log.push(1);
        log.push(2);
        assert_eq!(log.iter().copied().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(log.newest(), Some(&2));
    }

    #[test]
    fn test_full_log_evicts_oldest() {
        let mut log = RecentLog::new(3);
        for i in 1..=3 {
            assert_eq!(log.push(i), None);
        }
        assert_eq!(log.push(4), Some(1));
        assert_eq!(log.len(), 3);
        assert_eq!(log.as_slice(), &[4, 3, 2]);
    }

    #[test]
    fn test_from_newest_first_truncates() {
        let log = RecentLog::from_newest_first(vec![9, 8, 7, 6], 2);
        assert_eq!(log.iter().copied().collect::<Vec<_>>(), vec![9, 8]);
        assert_eq!(log.capacity(), 2);

        let zero = RecentLog::<u8>::new(0);
        assert_eq!(zero.capacity(), 1);
    }
}
