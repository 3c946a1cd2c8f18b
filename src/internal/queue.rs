//! Fixed-capacity FIFO of request-slot indices.
//!
//! Channels track their request pool with small index queues instead of
//! linked lists; a slot index is one byte and the queues never allocate.

/// Circular FIFO holding up to `N` slot indices.
pub struct IndexQueue<const N: usize> {
    slots: [u8; N],
    head: usize,
    len: usize,
}

impl<const N: usize> IndexQueue<N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            slots: [0; N],
            head: 0,
            len: 0,
        }
    }

    /// Number of indices currently queued
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check whether the queue holds no indices
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether the queue is at capacity
    #[inline(always)]
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Append an index at the back. Returns `false` if the queue is full.
    pub fn push_back(&mut self, index: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.slots[(self.head + self.len) % N] = index;
        self.len += 1;
        true
    }

    /// Remove and return the front index
    pub fn pop_front(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let index = self.slots[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(index)
    }

    /// Peek at the front index without removing it
    #[inline]
    pub fn front(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.slots[self.head])
        }
    }

    /// Get the index at FIFO position `pos` (0 = front)
    #[inline]
    pub fn get(&self, pos: usize) -> Option<u8> {
        if pos < self.len {
            Some(self.slots[(self.head + pos) % N])
        } else {
            None
        }
    }

    /// Drop all indices
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for IndexQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut q: IndexQueue<4> = IndexQueue::new();
        assert!(q.push_back(3));
        assert!(q.push_back(1));
        assert!(q.push_back(2));

        assert_eq!(q.pop_front(), Some(3));
        assert_eq!(q.pop_front(), Some(1));
        assert_eq!(q.pop_front(), Some(2));
        assert_eq!(q.pop_front(), None);
    }

    #[test]
    fn push_back_fails_when_full() {
        let mut q: IndexQueue<2> = IndexQueue::new();
        assert!(q.push_back(0));
        assert!(q.push_back(1));
        assert!(!q.push_back(2));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn get_by_fifo_position() {
        let mut q: IndexQueue<4> = IndexQueue::new();
        q.push_back(5);
        q.push_back(6);
        q.push_back(7);

        assert_eq!(q.get(0), Some(5));
        assert_eq!(q.get(1), Some(6));
        assert_eq!(q.get(2), Some(7));
        assert_eq!(q.get(3), None);
    }

    #[test]
    fn wraparound_after_many_cycles() {
        let mut q: IndexQueue<3> = IndexQueue::new();
        for i in 0..20u8 {
            assert!(q.push_back(i % 10));
            assert_eq!(q.pop_front(), Some(i % 10));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn clear_empties_queue() {
        let mut q: IndexQueue<4> = IndexQueue::new();
        q.push_back(1);
        q.push_back(2);
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.pop_front(), None);
        // Still usable after clear
        assert!(q.push_back(7));
        assert_eq!(q.front(), Some(7));
    }
}
