//! Circular ring of link-mode DMA descriptors.
//!
//! Slot reuse is governed by the hardware-ownership bit: a slot whose header
//! still carries LV belongs to the controller and is never overwritten.
//! Progress is tracked with monotonic sequence numbers (`slot = seq % N`),
//! which keeps full/empty unambiguous and gives every published chain a
//! stable identity across wraparound.

use super::descriptor::bits::header;
use super::descriptor::LinkDescriptor;

/// Payload words for one descriptor slot, computed by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorTemplate {
    /// Source address
    pub sa: u32,
    /// Destination address
    pub da: u32,
    /// Transfer byte count
    pub tb: u32,
    /// Channel configuration word to load
    pub chcfg: u32,
}

/// Half-open sequence range `[start, end)` occupied by one published chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSpan {
    /// Sequence of the chain's first descriptor
    pub start: u64,
    /// One past the sequence of the chain's last descriptor
    pub end: u64,
}

/// Circular descriptor ring with sequence-number head/tail tracking.
pub struct DescriptorRing<const N: usize> {
    descriptors: [LinkDescriptor; N],
    /// Sequence of the oldest descriptor still owned by hardware
    head_seq: u64,
    /// Sequence of the next slot to populate
    tail_seq: u64,
}

impl<const N: usize> DescriptorRing<N> {
    /// Create a new ring with all descriptors zeroed and unlinked.
    ///
    /// [`Self::init`] must run before the ring is used; descriptor addresses
    /// are only known once the ring sits at its final location.
    pub const fn new() -> Self {
        Self {
            descriptors: [const { LinkDescriptor::new() }; N],
            head_seq: 0,
            tail_seq: 0,
        }
    }

    /// Link every slot's `nxla` to its circular successor and clear headers.
    pub fn init(&mut self) {
        for i in 0..N {
            let next = &self.descriptors[(i + 1) % N] as *const LinkDescriptor;
            self.descriptors[i].release();
            self.descriptors[i].nxla.set(next as u32);
        }
        self.head_seq = 0;
        self.tail_seq = 0;
    }

    /// Number of descriptor slots in the ring
    #[inline(always)]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring has zero capacity
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Number of slots free for new chains
    #[inline(always)]
    pub fn available(&self) -> usize {
        N - (self.tail_seq - self.head_seq) as usize
    }

    /// Sequence of the oldest hardware-owned descriptor
    #[inline(always)]
    pub const fn head_seq(&self) -> u64 {
        self.head_seq
    }

    /// Sequence of the next slot to populate
    #[inline(always)]
    pub const fn tail_seq(&self) -> u64 {
        self.tail_seq
    }

    /// Get the descriptor occupying sequence `seq`
    #[inline(always)]
    pub fn at_seq(&self, seq: u64) -> &LinkDescriptor {
        &self.descriptors[(seq % N as u64) as usize]
    }

    /// Physical address of the descriptor occupying sequence `seq`
    #[inline(always)]
    pub fn descriptor_addr(&self, seq: u64) -> u32 {
        self.at_seq(seq) as *const LinkDescriptor as u32
    }

    /// Publish a single-descriptor chain for a memory-to-memory copy.
    ///
    /// Returns `None` without touching any slot if the ring is full. The
    /// header is written last so the slot never looks hardware-owned while
    /// its payload is stale.
    pub fn populate_memcpy(
        &mut self,
        src: u32,
        dst: u32,
        len: u32,
        chcfg: u32,
    ) -> Option<ChainSpan> {
        if self.available() < 1 {
            return None;
        }
        let seq = self.tail_seq;
        let desc = self.at_seq(seq);
        desc.write_payload(src, dst, len, chcfg);
        desc.publish(header::LE);
        self.tail_seq += 1;
        Some(ChainSpan {
            start: seq,
            end: seq + 1,
        })
    }

    /// Publish a multi-descriptor scatter-gather chain.
    ///
    /// One descriptor per template, in order; the last carries LE. When
    /// `mask_interior` is set, every descriptor but the last also carries
    /// the interrupt-mask flag so only the chain end raises an interrupt.
    ///
    /// All-or-nothing: returns `None` without touching any slot if the ring
    /// cannot hold the whole chain.
    pub fn populate_slave_sg(
        &mut self,
        templates: &[DescriptorTemplate],
        mask_interior: bool,
    ) -> Option<ChainSpan> {
        if templates.is_empty() || self.available() < templates.len() {
            return None;
        }
        let start = self.tail_seq;
        let last = templates.len() - 1;
        for (i, t) in templates.iter().enumerate() {
            let desc = self.at_seq(start + i as u64);
            desc.write_payload(t.sa, t.da, t.tb, t.chcfg);
            let flags = if i == last {
                header::LE
            } else if mask_interior {
                header::DIM
            } else {
                0
            };
            desc.publish(flags);
        }
        self.tail_seq += templates.len() as u64;
        Some(ChainSpan {
            start,
            end: start + templates.len() as u64,
        })
    }

    /// Advance the head past every descriptor hardware has released.
    ///
    /// Returns the number of slots reclaimed. Stops at the first descriptor
    /// whose LV bit is still set; slots between head and tail are reclaimed
    /// strictly in order.
    pub fn reclaim(&mut self) -> usize {
        let mut reclaimed = 0;
        while self.head_seq < self.tail_seq {
            let desc = self.at_seq(self.head_seq);
            if desc.is_hw_owned() {
                break;
            }
            desc.release();
            self.head_seq += 1;
            reclaimed += 1;
        }
        reclaimed
    }

    /// Drop every outstanding chain and clear all headers.
    ///
    /// The circular `nxla` links are preserved. Used after a hardware error
    /// or terminate, when the controller is already stopped.
    pub fn reset(&mut self) {
        for desc in &self.descriptors {
            desc.release();
        }
        self.head_seq = 0;
        self.tail_seq = 0;
    }

    /// Simulate hardware consuming the descriptor at `seq` (clears LV,
    /// keeps the rest of the header as written back).
    #[cfg(test)]
    pub fn simulate_writeback(&self, seq: u64) {
        let desc = self.at_seq(seq);
        desc.header.update(|h| (h & !header::LV) | header::WBD);
    }
}

impl<const N: usize> Default for DescriptorRing<N> {
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

    fn template(n: u32) -> DescriptorTemplate {
        DescriptorTemplate {
            sa: 0x1000 + n,
            da: 0x2000 + n,
            tb: 64,
            chcfg: 0,
        }
    }

    #[test]
    fn init_links_slots_circularly() {
        let mut ring: DescriptorRing<4> = DescriptorRing::new();
        ring.init();

        for i in 0..4u64 {
            let next_addr = ring.descriptor_addr((i + 1) % 4);
            assert_eq!(ring.at_seq(i).nxla.get(), next_addr);
        }
        assert_eq!(ring.available(), 4);
    }

    #[test]
    fn memcpy_chain_occupies_one_slot() {
        let mut ring: DescriptorRing<4> = DescriptorRing::new();
        ring.init();

        let span = ring.populate_memcpy(0x1000, 0x2000, 256, 0x8040_0008).unwrap();
        assert_eq!(span, ChainSpan { start: 0, end: 1 });
        assert_eq!(ring.available(), 3);

        let desc = ring.at_seq(0);
        assert!(desc.is_hw_owned());
        assert!(desc.is_chain_end());
        assert_eq!(desc.sa.get(), 0x1000);
        assert_eq!(desc.da.get(), 0x2000);
        assert_eq!(desc.tb.get(), 256);
    }

    #[test]
    fn populate_fails_when_full_without_touching_slots() {
        let mut ring: DescriptorRing<2> = DescriptorRing::new();
        ring.init();

        assert!(ring.populate_memcpy(0, 0, 1, 0).is_some());
        assert!(ring.populate_memcpy(0, 0, 2, 0).is_some());
        assert!(ring.populate_memcpy(0xDEAD, 0xDEAD, 3, 0).is_none());

        // Hardware-owned slots were not overwritten
        assert_eq!(ring.at_seq(0).tb.get(), 1);
        assert_eq!(ring.at_seq(1).tb.get(), 2);
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn sg_chain_flags_last_with_le() {
        let mut ring: DescriptorRing<8> = DescriptorRing::new();
        ring.init();

        let templates = [template(0), template(1), template(2)];
        let span = ring.populate_slave_sg(&templates, false).unwrap();
        assert_eq!(span, ChainSpan { start: 0, end: 3 });

        assert!(ring.at_seq(0).is_hw_owned());
        assert!(!ring.at_seq(0).is_chain_end());
        assert!(!ring.at_seq(1).is_chain_end());
        assert!(ring.at_seq(2).is_chain_end());
    }

    #[test]
    fn sg_chain_masks_interior_interrupts() {
        let mut ring: DescriptorRing<8> = DescriptorRing::new();
        ring.init();

        let templates = [template(0), template(1), template(2)];
        ring.populate_slave_sg(&templates, true).unwrap();

        assert_ne!(ring.at_seq(0).header.get() & header::DIM, 0);
        assert_ne!(ring.at_seq(1).header.get() & header::DIM, 0);
        // Chain end interrupts normally
        assert_eq!(ring.at_seq(2).header.get() & header::DIM, 0);
    }

    #[test]
    fn sg_chain_all_or_nothing() {
        let mut ring: DescriptorRing<4> = DescriptorRing::new();
        ring.init();

        ring.populate_memcpy(0, 0, 1, 0).unwrap();
        ring.populate_memcpy(0, 0, 2, 0).unwrap();

        // Only 2 slots left, 3 requested
        let templates = [template(0), template(1), template(2)];
        assert!(ring.populate_slave_sg(&templates, false).is_none());
        assert_eq!(ring.available(), 2);

        // A chain that fits still goes through
        assert!(ring.populate_slave_sg(&templates[..2], false).is_some());
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn reclaim_stops_at_hw_owned_descriptor() {
        let mut ring: DescriptorRing<4> = DescriptorRing::new();
        ring.init();

        ring.populate_memcpy(0, 0, 1, 0).unwrap();
        ring.populate_memcpy(0, 0, 2, 0).unwrap();
        ring.populate_memcpy(0, 0, 3, 0).unwrap();

        // Hardware finished only the first descriptor
        ring.simulate_writeback(0);
        assert_eq!(ring.reclaim(), 1);
        assert_eq!(ring.head_seq(), 1);
        assert_eq!(ring.available(), 2);

        // Nothing more to reclaim until hardware releases slot 1
        assert_eq!(ring.reclaim(), 0);

        ring.simulate_writeback(1);
        ring.simulate_writeback(2);
        assert_eq!(ring.reclaim(), 2);
        assert_eq!(ring.available(), 4);
    }

    #[test]
    fn sequence_numbers_survive_wraparound() {
        let mut ring: DescriptorRing<4> = DescriptorRing::new();
        ring.init();

        for i in 0..10u64 {
            let span = ring.populate_memcpy(0, 0, i as u32, 0).unwrap();
            assert_eq!(span.start, i);
            ring.simulate_writeback(i);
            assert_eq!(ring.reclaim(), 1);
        }
        assert_eq!(ring.head_seq(), 10);
        assert_eq!(ring.tail_seq(), 10);
        assert_eq!(ring.available(), 4);
    }

    #[test]
    fn reset_clears_outstanding_chains_and_keeps_links() {
        let mut ring: DescriptorRing<4> = DescriptorRing::new();
        ring.init();

        ring.populate_memcpy(0, 0, 1, 0).unwrap();
        ring.populate_memcpy(0, 0, 2, 0).unwrap();
        let link0 = ring.at_seq(0).nxla.get();

        ring.reset();
        assert_eq!(ring.available(), 4);
        assert_eq!(ring.head_seq(), 0);
        assert!(!ring.at_seq(0).is_hw_owned());
        assert_eq!(ring.at_seq(0).nxla.get(), link0);
    }

    #[test]
    fn descriptor_addr_is_stable_per_slot() {
        let mut ring: DescriptorRing<4> = DescriptorRing::new();
        ring.init();

        // seq 1 and seq 5 share slot 1
        assert_eq!(ring.descriptor_addr(1), ring.descriptor_addr(5));
        assert_ne!(ring.descriptor_addr(0), ring.descriptor_addr(1));
    }
}
