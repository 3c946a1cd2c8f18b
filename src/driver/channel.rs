//! Per-channel transfer state machine.
//!
//! Each channel owns a descriptor ring, a fixed request pool, and the
//! register handles for its window. Requests move through
//! free -> prepared -> queued -> active; at most one request is active at a
//! time, but descriptors for requests queued behind it are published into
//! the ring as long as capacity allows, so the dispatcher can hand the next
//! chain to hardware without repopulating.

use core::sync::atomic::{fence, Ordering};

use super::config::{InterruptPolicy, SlaveEntry, SlaveParams, TransferDirection};
use super::dispatch::CompletionEvent;
use super::request::{
    Cookie, RequestKind, RequestStatus, SgSegment, TransferCallback, TransferOutcome,
    TransferRequest, TxState,
};
use crate::error::{ConfigError, HardwareError, HardwareResult, RequestError, Result};
use crate::internal::constants::{ENABLE_SPIN_LIMIT, MAX_SG_SEGMENTS};
use crate::internal::queue::IndexQueue;
use crate::internal::register::channel::{
    chcfg_dds, chcfg_sds, ChannelRegs, CHCFG_DAD, CHCFG_DDS_MASK, CHCFG_DMS, CHCFG_MEM_COPY,
    CHCFG_REQD, CHCFG_SAD, CHCFG_SDS_MASK, CHCFG_SEL_MASK, CHCTRL_CLREND, CHCTRL_CLRTC,
    CHCTRL_DEFAULT, CHCTRL_SETEN, CHCTRL_SWRST, CHSTAT_EN, CHSTAT_END, CHSTAT_ER, CHSTAT_TACT,
};
use crate::internal::register::common::DmarsReg;
use crate::internal::ring::{DescriptorRing, DescriptorTemplate};

/// One DMA channel: ring, request pool, and register window.
pub(crate) struct Channel<const N_DESC: usize, const N_REQ: usize> {
    index: u8,
    regs: ChannelRegs,
    dmars: DmarsReg,
    ring: DescriptorRing<N_DESC>,
    requests: [TransferRequest; N_REQ],
    free: IndexQueue<N_REQ>,
    queued: IndexQueue<N_REQ>,
    /// FIFO head currently armed on hardware (at most one)
    active: Option<u8>,
    /// Routing entry bound by `channel_filter`
    slave: Option<SlaveEntry>,
    /// Per-channel overrides from `config()`; `None` means the routing
    /// entry's address and widths drive the transfer
    slave_params: Option<SlaveParams>,
    interrupt_policy: InterruptPolicy,
    /// Last assigned cookie (0 = none yet)
    last_cookie: Cookie,
    /// Highest cookie retired successfully
    completed_cookie: Cookie,
    /// Highest cookie retired by fault or terminate
    last_error_cookie: Cookie,
    resources_allocated: bool,
    /// Fault latched by the IRQ entry, handled by the dispatcher
    pending_error: bool,
}

impl<const N_DESC: usize, const N_REQ: usize> Channel<N_DESC, N_REQ> {
    pub(crate) const fn new() -> Self {
        Self {
            index: 0,
            regs: ChannelRegs::unbound(),
            dmars: DmarsReg::unbound(),
            ring: DescriptorRing::new(),
            requests: [const { TransferRequest::new() }; N_REQ],
            free: IndexQueue::new(),
            queued: IndexQueue::new(),
            active: None,
            slave: None,
            slave_params: None,
            interrupt_policy: InterruptPolicy::EachDescriptor,
            last_cookie: 0,
            completed_cookie: 0,
            last_error_cookie: 0,
            resources_allocated: false,
            pending_error: false,
        }
    }

    /// Resolve register handles and put the channel into a known-idle state.
    pub(crate) fn bind(
        &mut self,
        index: usize,
        ctrl_base: usize,
        dmars_base: usize,
        policy: InterruptPolicy,
    ) {
        self.index = index as u8;
        self.regs = ChannelRegs::new(ctrl_base, index);
        self.dmars = DmarsReg::new(dmars_base, index);
        self.interrupt_policy = policy;
        self.ring.init();
        self.regs.set_control(CHCTRL_DEFAULT);
    }

    // =========================================================================
    // Resource Management
    // =========================================================================

    /// Set up the request pool. Idempotent; returns the pool size.
    pub(crate) fn alloc_resources(&mut self) -> usize {
        if self.resources_allocated {
            return N_REQ;
        }
        self.free.clear();
        self.queued.clear();
        for slot in 0..N_REQ {
            self.free.push_back(slot as u8);
        }
        self.ring.init();
        self.resources_allocated = true;
        N_REQ
    }

    /// Tear down the channel: stop hardware, drop every outstanding request
    /// without callbacks, release the pool.
    pub(crate) fn free_resources(&mut self) {
        self.terminate();
        self.free.clear();
        self.slave = None;
        self.resources_allocated = false;
    }

    pub(crate) fn is_allocated(&self) -> bool {
        self.resources_allocated
    }

    /// Bind a routing entry. Idempotent for the same entry; rebinding to a
    /// different slave is allowed while no transfer is outstanding.
    pub(crate) fn bind_slave(&mut self, entry: SlaveEntry) {
        self.slave = Some(entry);
    }

    pub(crate) fn bound_slave(&self) -> Option<SlaveEntry> {
        self.slave
    }

    /// Override the routing entry's device address and access widths
    pub(crate) fn set_slave_params(&mut self, params: SlaveParams) {
        self.slave_params = Some(params);
    }

    // =========================================================================
    // Preparation and Submission
    // =========================================================================

    /// Claim a request slot for a memory-to-memory copy
    pub(crate) fn prepare_memcpy(&mut self, src: u32, dst: u32, len: u32) -> Result<u8> {
        if !self.resources_allocated {
            return Err(ConfigError::NotAllocated.into());
        }
        if len == 0 {
            return Err(RequestError::EmptyTransfer.into());
        }
        let slot = self
            .free
            .pop_front()
            .ok_or(RequestError::NoRequestsAvailable)?;
        let req = &mut self.requests[slot as usize];
        req.kind = RequestKind::MemCopy;
        req.status = RequestStatus::Prepared;
        req.src = src;
        req.dst = dst;
        req.len = len;
        Ok(slot)
    }

    /// Claim a request slot for a scatter-gather slave transfer
    pub(crate) fn prepare_slave_sg(
        &mut self,
        segments: &[SgSegment],
        direction: TransferDirection,
    ) -> Result<u8> {
        if !self.resources_allocated {
            return Err(ConfigError::NotAllocated.into());
        }
        if self.slave.is_none() {
            return Err(ConfigError::InvalidTransferConfig.into());
        }
        if segments.is_empty() {
            return Err(RequestError::EmptyTransfer.into());
        }
        if segments.len() > MAX_SG_SEGMENTS {
            return Err(RequestError::TooManySegments.into());
        }
        if segments.len() > self.ring.len() {
            // The chain could never fit, even into an empty ring
            return Err(RequestError::NoDescriptorsAvailable.into());
        }
        let slot = self
            .free
            .pop_front()
            .ok_or(RequestError::NoRequestsAvailable)?;
        let req = &mut self.requests[slot as usize];
        req.kind = RequestKind::SlaveSg;
        req.status = RequestStatus::Prepared;
        req.direction = direction;
        req.seg_count = segments.len();
        req.segments[..segments.len()].copy_from_slice(segments);
        Ok(slot)
    }

    /// Attach a completion callback to a prepared request
    pub(crate) fn set_completion(
        &mut self,
        slot: u8,
        callback: TransferCallback,
        context: usize,
    ) -> Result<()> {
        let req = self
            .requests
            .get_mut(slot as usize)
            .filter(|r| r.status == RequestStatus::Prepared)
            .ok_or(RequestError::InvalidHandle)?;
        req.callback = Some(callback);
        req.context = context;
        Ok(())
    }

    /// Move a prepared request onto the submission FIFO and assign its cookie
    pub(crate) fn submit(&mut self, slot: u8) -> Result<Cookie> {
        let last_cookie = self.last_cookie;
        let req = self
            .requests
            .get_mut(slot as usize)
            .filter(|r| r.status == RequestStatus::Prepared)
            .ok_or(RequestError::InvalidHandle)?;

        let mut cookie = last_cookie.wrapping_add(1);
        if cookie == 0 {
            cookie = 1;
        }
        req.cookie = cookie;
        req.status = RequestStatus::Queued;
        self.last_cookie = cookie;
        // Pool and FIFO have the same capacity, push cannot fail
        self.queued.push_back(slot);
        Ok(cookie)
    }

    /// Publish descriptors for everything queued (as capacity allows) and
    /// arm the hardware if it is idle.
    pub(crate) fn issue_pending(&mut self) -> Result<()> {
        self.publish_queued();
        self.start_if_idle()?;
        Ok(())
    }

    // =========================================================================
    // Descriptor Publication
    // =========================================================================

    /// Publish ring descriptors for queued requests in FIFO order.
    ///
    /// Stops at the first request whose chain no longer fits; that is not an
    /// error, the next issue or retirement retries.
    fn publish_queued(&mut self) {
        for pos in 0..self.queued.len() {
            let Some(slot) = self.queued.get(pos) else {
                break;
            };
            let idx = slot as usize;
            if self.requests[idx].published {
                continue;
            }
            if self.ring.available() < self.requests[idx].chain_len() {
                break;
            }

            let span = match self.requests[idx].kind {
                RequestKind::MemCopy => {
                    let (src, dst, len) = (
                        self.requests[idx].src,
                        self.requests[idx].dst,
                        self.requests[idx].len,
                    );
                    self.ring.populate_memcpy(src, dst, len, CHCFG_MEM_COPY)
                }
                RequestKind::SlaveSg => {
                    let direction = self.requests[idx].direction;
                    let chcfg = self.slave_chcfg(direction);
                    let dev_addr = self.device_addr(direction);
                    let seg_count = self.requests[idx].seg_count;
                    let mut templates = [DescriptorTemplate::default(); MAX_SG_SEGMENTS];
                    for (i, template) in templates.iter_mut().take(seg_count).enumerate() {
                        let seg = self.requests[idx].segments[i];
                        let (sa, da) = match direction {
                            TransferDirection::MemToDev => (seg.addr, dev_addr),
                            TransferDirection::DevToMem => (dev_addr, seg.addr),
                        };
                        *template = DescriptorTemplate {
                            sa,
                            da,
                            tb: seg.len,
                            chcfg,
                        };
                    }
                    let mask_interior =
                        matches!(self.interrupt_policy, InterruptPolicy::ChainEnd);
                    self.ring
                        .populate_slave_sg(&templates[..seg_count], mask_interior)
                }
            };

            match span {
                Some(span) => {
                    let req = &mut self.requests[idx];
                    req.start_seq = span.start;
                    req.end_seq = span.end;
                    req.published = true;
                }
                None => break,
            }
        }
    }

    /// CHCFG word for slave transfers in the given direction.
    ///
    /// Starts from the routing entry's base word (request detection,
    /// default widths); a `config()` call replaces the width fields. Mode,
    /// routing select and direction bits are always owned by the driver.
    fn slave_chcfg(&self, direction: TransferDirection) -> u32 {
        const DRIVER_OWNED: u32 =
            CHCFG_DMS | CHCFG_SEL_MASK | CHCFG_REQD | CHCFG_SAD | CHCFG_DAD;

        let mut chcfg = self.slave.map_or(0, |e| e.chcfg) & !DRIVER_OWNED;
        if let Some(params) = self.slave_params {
            chcfg = (chcfg & !(CHCFG_SDS_MASK | CHCFG_DDS_MASK))
                | chcfg_sds(params.src_width.to_selector())
                | chcfg_dds(params.dst_width.to_selector());
        }
        chcfg |= CHCFG_DMS | (u32::from(self.index % 8) & CHCFG_SEL_MASK);
        match direction {
            // Device side is the fixed address; the request line follows
            // the side the peripheral sits on
            TransferDirection::MemToDev => chcfg |= CHCFG_DAD | CHCFG_REQD,
            TransferDirection::DevToMem => chcfg |= CHCFG_SAD,
        }
        chcfg
    }

    /// Device-side address for a slave transfer: `config()` wins, otherwise
    /// the routing entry's data register address drives both directions.
    fn device_addr(&self, direction: TransferDirection) -> u32 {
        if let Some(params) = self.slave_params {
            return match direction {
                TransferDirection::MemToDev => params.dst_addr,
                TransferDirection::DevToMem => params.src_addr,
            };
        }
        self.slave.map_or(0, |e| e.addr)
    }

    // =========================================================================
    // Hardware Sequencing
    // =========================================================================

    /// Promote the FIFO head to active and arm the hardware, if idle.
    ///
    /// On an enable timeout the request goes back to the head of the FIFO
    /// and the channel is left disabled.
    fn start_if_idle(&mut self) -> HardwareResult<()> {
        if self.active.is_some() {
            return Ok(());
        }
        let Some(slot) = self.queued.front() else {
            return Ok(());
        };
        let idx = slot as usize;
        if !self.requests[idx].published {
            return Ok(());
        }

        let chcfg = match self.requests[idx].kind {
            RequestKind::MemCopy => CHCFG_MEM_COPY,
            RequestKind::SlaveSg => self.slave_chcfg(self.requests[idx].direction),
        };
        let start_seq = self.requests[idx].start_seq;

        match self.hw_enable(start_seq, chcfg) {
            Ok(()) => {
                self.queued.pop_front();
                self.requests[idx].status = RequestStatus::Active;
                self.active = Some(slot);
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "log")]
                log::warn!("channel {}: enable handshake failed", self.index);
                Err(e)
            }
        }
    }

    /// Register-level enable sequence.
    ///
    /// Skipped entirely if the channel is still armed (it will walk to the
    /// published descriptors on its own). Otherwise: route the request line,
    /// point NXLA at the chain head, load CHCFG, reset the datapath, wait
    /// for idle, then arm.
    fn hw_enable(&mut self, start_seq: u64, chcfg: u32) -> HardwareResult<()> {
        if self.regs.status() & CHSTAT_EN != 0 {
            return Ok(());
        }

        if let Some(entry) = self.slave {
            self.dmars.set_mid_rid(entry.mid_rid);
        }

        // Descriptor stores must be visible before hardware is pointed at them
        fence(Ordering::SeqCst);

        self.regs.set_next_link_addr(self.ring.descriptor_addr(start_seq));
        self.regs.set_config(chcfg);
        self.regs.set_control(CHCTRL_SWRST);

        let mut spins = 0;
        while self.regs.status() & (CHSTAT_EN | CHSTAT_TACT) != 0 {
            spins += 1;
            if spins > ENABLE_SPIN_LIMIT {
                self.regs.set_control(CHCTRL_DEFAULT);
                return Err(HardwareError::EnableTimeout);
            }
            core::hint::spin_loop();
        }

        self.regs.set_control(CHCTRL_SETEN);
        Ok(())
    }

    /// One-shot stop: clears every latch and disarms the channel
    fn hw_disable(&mut self) {
        self.regs.set_control(CHCTRL_DEFAULT);
    }

    // =========================================================================
    // Interrupt Entry
    // =========================================================================

    /// Hard-IRQ stage: read and acknowledge CHSTAT.
    ///
    /// Returns `true` if the dispatcher has work for this channel. Never
    /// touches queue state; faults are latched for the worker stage.
    pub(crate) fn handle_irq(&mut self) -> bool {
        let status = self.regs.status();

        if status & CHSTAT_ER != 0 {
            #[cfg(feature = "log")]
            log::warn!(
                "channel {}: hardware fault, CHSTAT={:#010x}",
                self.index,
                status
            );
            self.hw_disable();
            self.pending_error = true;
            return true;
        }

        if status & CHSTAT_END != 0 {
            self.regs.set_control(CHCTRL_CLREND | CHCTRL_CLRTC);
            return true;
        }

        false
    }

    // =========================================================================
    // Dispatcher (worker stage)
    // =========================================================================

    /// Process one retirement for this channel.
    ///
    /// Reclaims consumed descriptors, retires the active request if its
    /// whole chain is done, promotes the next queued request, and returns
    /// the completion for the caller to invoke outside any lock. An END
    /// event with no active request is benign (a terminate may have raced
    /// the interrupt).
    pub(crate) fn dispatch(&mut self) -> Option<CompletionEvent> {
        if self.pending_error {
            return self.dispatch_error();
        }

        self.ring.reclaim();

        let slot = self.active?;
        let idx = slot as usize;
        if self.ring.head_seq() < self.requests[idx].end_seq {
            // Chain still outstanding (interior descriptor interrupt)
            return None;
        }

        let event = self.retire(slot, TransferOutcome::Complete);
        self.restart();
        event
    }

    /// Fault path: the IRQ stage already stopped the channel. Retire the
    /// active request with an error outcome, drop all published chains, and
    /// republish the survivors.
    fn dispatch_error(&mut self) -> Option<CompletionEvent> {
        self.pending_error = false;

        let event = self.active.map(|slot| {
            self.active = None;
            let idx = slot as usize;
            self.last_error_cookie = self.requests[idx].cookie;
            let completion = CompletionEvent {
                channel: self.index as usize,
                callback: self.requests[idx].callback,
                context: self.requests[idx].context,
                outcome: TransferOutcome::Error,
            };
            self.requests[idx].reset();
            self.free.push_back(slot);
            completion
        });

        // Every published chain died with the ring; requeue them
        self.ring.reset();
        for pos in 0..self.queued.len() {
            if let Some(slot) = self.queued.get(pos) {
                let req = &mut self.requests[slot as usize];
                req.published = false;
                req.start_seq = 0;
                req.end_seq = 0;
            }
        }

        self.restart();
        event
    }

    /// Retire a finished request: settle cookies and pool state, build the
    /// completion event.
    fn retire(&mut self, slot: u8, outcome: TransferOutcome) -> Option<CompletionEvent> {
        let idx = slot as usize;
        self.active = None;
        match outcome {
            TransferOutcome::Complete => self.completed_cookie = self.requests[idx].cookie,
            TransferOutcome::Error => self.last_error_cookie = self.requests[idx].cookie,
        }
        let event = CompletionEvent {
            channel: self.index as usize,
            callback: self.requests[idx].callback,
            context: self.requests[idx].context,
            outcome,
        };
        self.requests[idx].reset();
        self.free.push_back(slot);
        Some(event)
    }

    /// Publish whatever now fits and hand the next chain to hardware.
    /// An enable failure here is already logged; the request stays at the
    /// FIFO head and the next `issue_pending` retries.
    fn restart(&mut self) {
        self.publish_queued();
        let _ = self.start_if_idle();
    }

    // =========================================================================
    // Status and Termination
    // =========================================================================

    /// Client-visible state of a submitted cookie
    pub(crate) fn tx_status(&self, cookie: Cookie) -> TxState {
        if cookie == 0 || cookie > self.last_cookie {
            return TxState::Error;
        }
        if cookie <= self.completed_cookie {
            TxState::Complete
        } else if cookie <= self.last_error_cookie {
            TxState::Error
        } else {
            TxState::InProgress
        }
    }

    /// Synchronously stop the channel and drop every outstanding request.
    ///
    /// No callbacks fire; cookies of dropped requests report `Error`.
    pub(crate) fn terminate(&mut self) {
        self.hw_disable();
        self.ring.reset();

        if let Some(slot) = self.active.take() {
            self.requests[slot as usize].reset();
            self.free.push_back(slot);
        }
        while let Some(slot) = self.queued.pop_front() {
            self.requests[slot as usize].reset();
            self.free.push_back(slot);
        }
        // Prepared-but-unsubmitted slots stay claimed; cancelling those is
        // the client's job via the pool running dry, matching submit-based
        // ownership transfer
        self.last_error_cookie = self.last_cookie;
        self.pending_error = false;
    }

    #[cfg(test)]
    pub(crate) fn test_ring(&mut self) -> &mut DescriptorRing<N_DESC> {
        &mut self.ring
    }

    #[cfg(test)]
    pub(crate) fn test_active(&self) -> Option<u8> {
        self.active
    }

    #[cfg(test)]
    pub(crate) fn test_queued_len(&self) -> usize {
        self.queued.len()
    }

    #[cfg(test)]
    pub(crate) fn test_is_published(&self, slot: u8) -> bool {
        self.requests[slot as usize].published
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
