//! Transfer request bookkeeping.
//!
//! Each channel owns a fixed pool of [`TransferRequest`] slots. Preparation
//! claims a slot and returns an opaque [`RequestHandle`]; submission assigns
//! a monotonically increasing [`Cookie`] the client can poll with
//! `tx_status`.

use super::config::TransferDirection;
use crate::internal::constants::MAX_SG_SEGMENTS;

/// Monotonic per-channel transfer identifier. Zero is never assigned.
pub type Cookie = u32;

/// Completion callback: `(context, outcome)`.
///
/// Plain function pointer so requests stay `Copy`-free but statically sized;
/// per-transfer state travels through the `usize` context.
pub type TransferCallback = fn(usize, TransferOutcome);

/// How a transfer finished, as reported to the completion callback and
/// `tx_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferOutcome {
    /// All descriptors of the chain executed
    Complete,
    /// The channel faulted while the chain was outstanding
    Error,
}

/// Client-visible state of a submitted transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    /// Submitted, not yet retired
    InProgress,
    /// Retired successfully
    Complete,
    /// Retired by a channel fault or never submitted
    Error,
}

/// Opaque handle to a prepared transfer on a specific channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RequestHandle {
    pub(crate) channel: u8,
    pub(crate) slot: u8,
}

impl RequestHandle {
    /// Channel the prepared transfer belongs to
    #[must_use]
    pub const fn channel(&self) -> usize {
        self.channel as usize
    }
}

/// One contiguous piece of a scatter-gather transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SgSegment {
    /// Memory-side address of the segment
    pub addr: u32,
    /// Segment length in bytes
    pub len: u32,
}

/// What a request describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RequestKind {
    /// Memory-to-memory copy
    #[default]
    MemCopy,
    /// Scatter-gather transfer against a bound slave
    SlaveSg,
}

/// Lifecycle of a request slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RequestStatus {
    /// Slot unused
    #[default]
    Free,
    /// Prepared, waiting for submit
    Prepared,
    /// Submitted, waiting for or undergoing execution
    Queued,
    /// FIFO head, descriptors handed to hardware and channel armed
    Active,
}

/// One slot of a channel's request pool.
pub(crate) struct TransferRequest {
    pub(crate) kind: RequestKind,
    pub(crate) status: RequestStatus,
    /// Memcpy source address
    pub(crate) src: u32,
    /// Memcpy destination address
    pub(crate) dst: u32,
    /// Memcpy length in bytes
    pub(crate) len: u32,
    /// Slave transfer direction
    pub(crate) direction: TransferDirection,
    /// Scatter-gather segments (first `seg_count` entries valid)
    pub(crate) segments: [SgSegment; MAX_SG_SEGMENTS],
    pub(crate) seg_count: usize,
    /// Cookie assigned at submit; zero until then
    pub(crate) cookie: Cookie,
    pub(crate) callback: Option<TransferCallback>,
    pub(crate) context: usize,
    /// First ring sequence of the published chain
    pub(crate) start_seq: u64,
    /// One past the last ring sequence of the published chain
    pub(crate) end_seq: u64,
    /// Descriptors are in the ring (the request may still be queued
    /// behind the active one)
    pub(crate) published: bool,
}

impl TransferRequest {
    pub(crate) const fn new() -> Self {
        Self {
            kind: RequestKind::MemCopy,
            status: RequestStatus::Free,
            src: 0,
            dst: 0,
            len: 0,
            direction: TransferDirection::MemToDev,
            segments: [SgSegment { addr: 0, len: 0 }; MAX_SG_SEGMENTS],
            seg_count: 0,
            cookie: 0,
            callback: None,
            context: 0,
            start_seq: 0,
            end_seq: 0,
            published: false,
        }
    }

    /// Return the slot to the free pool, dropping all transfer state
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Number of ring slots the request's chain occupies
    pub(crate) fn chain_len(&self) -> usize {
        match self.kind {
            RequestKind::MemCopy => 1,
            RequestKind::SlaveSg => self.seg_count,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_is_free() {
        let req = TransferRequest::new();
        assert_eq!(req.status, RequestStatus::Free);
        assert_eq!(req.cookie, 0);
        assert!(!req.published);
        assert!(req.callback.is_none());
    }

    #[test]
    fn reset_clears_all_state() {
        let mut req = TransferRequest::new();
        req.kind = RequestKind::SlaveSg;
        req.status = RequestStatus::Queued;
        req.seg_count = 3;
        req.cookie = 7;
        req.published = true;
        req.start_seq = 10;
        req.end_seq = 13;

        req.reset();
        assert_eq!(req.status, RequestStatus::Free);
        assert_eq!(req.seg_count, 0);
        assert_eq!(req.cookie, 0);
        assert!(!req.published);
        assert_eq!(req.end_seq, 0);
    }

    #[test]
    fn chain_len_per_kind() {
        let mut req = TransferRequest::new();
        assert_eq!(req.chain_len(), 1);

        req.kind = RequestKind::SlaveSg;
        req.seg_count = 5;
        assert_eq!(req.chain_len(), 5);
    }

    #[test]
    fn handle_exposes_channel() {
        let handle = RequestHandle { channel: 3, slot: 0 };
        assert_eq!(handle.channel(), 3);
    }
}
