//! DMA engine facade.
//!
//! [`Engine`] owns every channel plus the controller-level state: the
//! request routing table, the group common registers, and the IRQ-to-worker
//! dispatch queue. All client operations are inherent methods here; the
//! platform passes register bases in [`EngineConfig`] and wires its ISRs to
//! [`Engine::handle_channel_irq`] / [`Engine::handle_error_irq`].

use embedded_hal::delay::DelayNs;

use super::channel::Channel;
use super::config::{
    channel_count_supported, EngineConfig, SlaveEntry, SlaveParams, State, TransferDirection,
};
use super::dispatch::{CompletionEvent, DispatchSet};
use super::request::{Cookie, RequestHandle, SgSegment, TransferCallback, TxState};
use crate::error::{ConfigError, ConfigResult, Result};
use crate::internal::register::common::{CommonRegs, DCTRL_DEFAULT};

/// Link-mode DMA engine over `CHANNELS` channels, each with an `N_DESC`-slot
/// descriptor ring and an `N_REQ`-slot request pool.
///
/// Statically allocated; `const fn new()` makes it suitable for a `static`.
pub struct Engine<'t, const CHANNELS: usize, const N_DESC: usize, const N_REQ: usize> {
    channels: [Channel<N_DESC, N_REQ>; CHANNELS],
    /// Request routing table, owned by the platform for the engine's lifetime
    slave_table: &'t [SlaveEntry],
    dispatch: DispatchSet,
    common_low: CommonRegs,
    common_high: CommonRegs,
    state: State,
}

impl<'t, const CHANNELS: usize, const N_DESC: usize, const N_REQ: usize>
    Engine<'t, CHANNELS, N_DESC, N_REQ>
{
    /// Create an uninitialized engine (const, suitable for static allocation)
    pub const fn new() -> Self {
        Self {
            channels: [const { Channel::new() }; CHANNELS],
            slave_table: &[],
            dispatch: DispatchSet::new(),
            common_low: CommonRegs::unbound(),
            common_high: CommonRegs::unbound(),
            state: State::Uninitialized,
        }
    }

    /// Current driver state
    pub fn state(&self) -> State {
        self.state
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bind the register blocks, quiesce every channel, and program the
    /// controller-level defaults.
    ///
    /// `delay` covers the settle time between the per-channel stop writes
    /// and the first use of the controller.
    pub fn init<D: DelayNs>(
        &mut self,
        config: EngineConfig<'t>,
        delay: &mut D,
    ) -> ConfigResult<()> {
        if self.state != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized);
        }
        if !channel_count_supported(CHANNELS) {
            return Err(ConfigError::InvalidChannelCount);
        }

        for (index, channel) in self.channels.iter_mut().enumerate() {
            channel.bind(
                index,
                config.ctrl_base,
                config.dmars_base,
                config.interrupt_policy,
            );
        }

        self.common_low = CommonRegs::new(config.ctrl_base, 0);
        self.common_low.set_control(DCTRL_DEFAULT);
        if CHANNELS > 8 {
            self.common_high = CommonRegs::new(config.ctrl_base, 8);
            self.common_high.set_control(DCTRL_DEFAULT);
        }

        delay.delay_us(1);

        self.slave_table = config.slave_table;
        self.state = State::Ready;
        Ok(())
    }

    // =========================================================================
    // Channel Resource Management
    // =========================================================================

    /// Set up a channel's request pool; returns the pool size
    pub fn alloc_channel_resources(&mut self, channel: usize) -> Result<usize> {
        Ok(self.channel_mut(channel)?.alloc_resources())
    }

    /// Stop a channel and release its resources.
    ///
    /// Outstanding transfers are dropped silently, like `terminate_all`.
    pub fn free_channel_resources(&mut self, channel: usize) -> Result<()> {
        self.channel_mut(channel)?.free_resources();
        Ok(())
    }

    /// Bind a routing-table entry to a channel.
    ///
    /// Idempotent: repeating the call with the same slave is a no-op. An
    /// identifier missing from the table is a configuration error.
    pub fn channel_filter(&mut self, channel: usize, slave_id: u16) -> Result<()> {
        let entry = self
            .find_slave(slave_id)
            .ok_or(ConfigError::InvalidSlaveId)?;
        self.channel_mut(channel)?.bind_slave(entry);
        Ok(())
    }

    /// Set device-side addresses and access widths for slave transfers
    pub fn config(&mut self, channel: usize, params: SlaveParams) -> Result<()> {
        self.channel_mut(channel)?.set_slave_params(params);
        Ok(())
    }

    fn find_slave(&self, slave_id: u16) -> Option<SlaveEntry> {
        self.slave_table
            .iter()
            .find(|e| e.slave_id == slave_id)
            .copied()
    }

    // =========================================================================
    // Transfer Preparation
    // =========================================================================

    /// Prepare a memory-to-memory copy
    pub fn prepare_memcpy(
        &mut self,
        channel: usize,
        src: u32,
        dst: u32,
        len: u32,
    ) -> Result<RequestHandle> {
        let slot = self.channel_mut(channel)?.prepare_memcpy(src, dst, len)?;
        Ok(RequestHandle {
            channel: channel as u8,
            slot,
        })
    }

    /// Prepare a scatter-gather transfer against the channel's bound slave
    pub fn prepare_slave_sg(
        &mut self,
        channel: usize,
        segments: &[SgSegment],
        direction: TransferDirection,
    ) -> Result<RequestHandle> {
        let slot = self
            .channel_mut(channel)?
            .prepare_slave_sg(segments, direction)?;
        Ok(RequestHandle {
            channel: channel as u8,
            slot,
        })
    }

    /// Attach a completion callback to a prepared transfer
    pub fn set_completion(
        &mut self,
        handle: RequestHandle,
        callback: TransferCallback,
        context: usize,
    ) -> Result<()> {
        self.channel_mut(handle.channel())?
            .set_completion(handle.slot, callback, context)
    }

    /// Queue a prepared transfer; returns its cookie
    pub fn submit(&mut self, handle: RequestHandle) -> Result<Cookie> {
        self.channel_mut(handle.channel())?.submit(handle.slot)
    }

    /// Publish descriptors for everything queued on the channel and arm the
    /// hardware if it is idle
    pub fn issue_pending(&mut self, channel: usize) -> Result<()> {
        self.channel_mut(channel)?.issue_pending()
    }

    // =========================================================================
    // Status and Termination
    // =========================================================================

    /// Client-visible state of a submitted cookie
    pub fn tx_status(&self, channel: usize, cookie: Cookie) -> Result<TxState> {
        Ok(self.channel_ref(channel)?.tx_status(cookie))
    }

    /// Synchronously stop a channel and drop every outstanding transfer.
    /// No completion callbacks fire.
    pub fn terminate_all(&mut self, channel: usize) -> Result<()> {
        self.channel_mut(channel)?.terminate();
        Ok(())
    }

    // =========================================================================
    // Interrupt Entry Points
    // =========================================================================

    /// Hard-IRQ entry for a channel's end/error interrupt.
    ///
    /// Only acknowledges hardware status and marks the channel pending for
    /// the worker stage; never invokes callbacks or touches queue ordering.
    /// Marking is a per-channel bit, so bursts coalesce and the hand-off is
    /// never dropped. Out-of-range indices and spurious interrupts are
    /// ignored.
    pub fn handle_channel_irq(&mut self, channel: usize) {
        if self.state != State::Ready || channel >= CHANNELS {
            return;
        }
        if self.channels[channel].handle_irq() {
            self.dispatch.mark(channel as u8);
        }
    }

    /// Hard-IRQ entry for the controller's aggregated error line.
    ///
    /// Scans the per-group error status registers and routes each faulted
    /// channel through the same path as its own interrupt.
    pub fn handle_error_irq(&mut self) {
        if self.state != State::Ready {
            return;
        }
        let mut faults = self.common_low.error_status() & 0xFF;
        if CHANNELS > 8 {
            faults |= (self.common_high.error_status() & 0xFF) << 8;
        }
        for channel in 0..CHANNELS {
            if faults & (1 << channel) != 0 {
                self.handle_channel_irq(channel);
            }
        }
    }

    /// Worker stage of the completion pipeline.
    ///
    /// Drains pending channels, retires at most one transfer, and returns
    /// its completion with all queue state already settled, so the caller
    /// can invoke the callback outside any critical section. Call in a loop
    /// until it returns `None`.
    pub fn process_completions(&mut self) -> Option<CompletionEvent> {
        while let Some(channel) = self.dispatch.pop() {
            let index = channel as usize;
            if index >= CHANNELS {
                continue;
            }
            if let Some(event) = self.channels[index].dispatch() {
                // Coalesced interrupts can leave another finished chain
                // behind this one; re-check the channel on the next call
                self.dispatch.mark(channel);
                return Some(event);
            }
        }
        None
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn channel_mut(&mut self, index: usize) -> Result<&mut Channel<N_DESC, N_REQ>> {
        if self.state != State::Ready {
            return Err(ConfigError::NotInitialized.into());
        }
        self.channels
            .get_mut(index)
            .ok_or_else(|| ConfigError::InvalidChannel.into())
    }

    fn channel_ref(&self, index: usize) -> Result<&Channel<N_DESC, N_REQ>> {
        if self.state != State::Ready {
            return Err(ConfigError::NotInitialized.into());
        }
        self.channels
            .get(index)
            .ok_or_else(|| ConfigError::InvalidChannel.into())
    }

    #[cfg(test)]
    pub(crate) fn test_channel(&mut self, index: usize) -> &mut Channel<N_DESC, N_REQ> {
        &mut self.channels[index]
    }
}

impl<const CHANNELS: usize, const N_DESC: usize, const N_REQ: usize> Default
    for Engine<'_, CHANNELS, N_DESC, N_REQ>
{
    fn default() -> Self {
        Self::new()
    }
}

/// Default engine configuration (16 channels, 16 descriptors, 16 requests)
pub type EngineDefault<'t> = Engine<'t, 16, 16, 16>;

/// Small engine configuration for memory-constrained systems
pub type EngineSmall<'t> = Engine<'t, 8, 8, 8>;

/// Large engine configuration for deep per-channel pipelining
pub type EngineLarge<'t> = Engine<'t, 16, 32, 32>;

// =============================================================================
// Tests
// =============================================================================
