//! Interrupt-to-worker completion pipeline.
//!
//! Hard-IRQ entry points only acknowledge hardware status and mark the
//! channel in a [`DispatchSet`]; the worker stage (`process_completions`)
//! drains the set, re-reads hardware state, and retires requests. The set
//! is one bit per channel, so an interrupt burst coalesces into a single
//! pending bit and a hand-off can never be dropped for lack of queue space.

use core::sync::atomic::{AtomicU32, Ordering};

use super::request::{TransferCallback, TransferOutcome};

/// Pending-channel set shared between the IRQ stage and the worker.
///
/// Marking is idempotent. The worker clears a channel's bit before
/// processing it, so a mark racing the clear is either covered by the
/// processing that follows or stays pending for the next pass; either way
/// no event is lost.
pub struct DispatchSet {
    pending: AtomicU32,
}

impl DispatchSet {
    /// Create an empty set
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// Mark a channel as having work for the worker stage (ISR side)
    #[inline]
    pub fn mark(&self, channel: u8) {
        self.pending.fetch_or(1 << channel, Ordering::Release);
    }

    /// Take the lowest-numbered pending channel, clearing its bit
    pub fn pop(&self) -> Option<u8> {
        let pending = self.pending.load(Ordering::Acquire);
        if pending == 0 {
            return None;
        }
        let channel = pending.trailing_zeros() as u8;
        self.pending.fetch_and(!(1u32 << channel), Ordering::AcqRel);
        Some(channel)
    }

    /// Check whether any channel is pending
    pub fn is_empty(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 0
    }
}

impl Default for DispatchSet {
    fn default() -> Self {
        Self::new()
    }
}

/// A retired transfer whose callback has not run yet.
///
/// The dispatcher settles all queue state before returning this, so the
/// caller can invoke the callback outside any critical section.
#[derive(Debug, Clone, Copy)]
pub struct CompletionEvent {
    /// Channel the transfer ran on
    pub channel: usize,
    /// Client callback, if one was attached
    pub callback: Option<TransferCallback>,
    /// Client context passed through to the callback
    pub context: usize,
    /// How the transfer finished
    pub outcome: TransferOutcome,
}

impl CompletionEvent {
    /// Run the callback, if any
    #[inline]
    pub fn invoke(&self) {
        if let Some(callback) = self.callback {
            callback(self.context, self.outcome);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn pop_returns_lowest_pending_first() {
        let set = DispatchSet::new();
        assert!(set.is_empty());

        set.mark(5);
        set.mark(0);
        set.mark(12);

        assert_eq!(set.pop(), Some(0));
        assert_eq!(set.pop(), Some(5));
        assert_eq!(set.pop(), Some(12));
        assert_eq!(set.pop(), None);
        assert!(set.is_empty());
    }

    #[test]
    fn marks_coalesce_per_channel() {
        let set = DispatchSet::new();
        for _ in 0..100 {
            set.mark(3);
        }
        assert_eq!(set.pop(), Some(3));
        assert_eq!(set.pop(), None);
    }

    #[test]
    fn burst_on_one_channel_never_crowds_out_another() {
        let set = DispatchSet::new();
        for _ in 0..100 {
            set.mark(0);
        }
        set.mark(9);

        assert_eq!(set.pop(), Some(0));
        assert_eq!(set.pop(), Some(9));
        assert_eq!(set.pop(), None);
    }

    #[test]
    fn remark_after_pop_stays_pending() {
        let set = DispatchSet::new();
        set.mark(2);
        assert_eq!(set.pop(), Some(2));
        set.mark(2);
        assert_eq!(set.pop(), Some(2));
        assert_eq!(set.pop(), None);
    }

    #[test]
    fn completion_event_invokes_callback() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        fn on_done(context: usize, outcome: TransferOutcome) {
            assert_eq!(context, 0xABCD);
            assert_eq!(outcome, TransferOutcome::Complete);
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let event = CompletionEvent {
            channel: 1,
            callback: Some(on_done),
            context: 0xABCD,
            outcome: TransferOutcome::Complete,
        };
        event.invoke();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completion_event_without_callback_is_noop() {
        let event = CompletionEvent {
            channel: 0,
            callback: None,
            context: 0,
            outcome: TransferOutcome::Error,
        };
        // Must not panic
        event.invoke();
    }
}
