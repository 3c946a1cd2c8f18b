//! Test utilities for host-side driver testing.
//!
//! [`MockDmac`] backs the controller and DMARS register blocks with plain
//! host memory so the engine can be exercised without hardware. Tests drive
//! the "hardware" by flipping status bits and descriptor ownership, then
//! deliver interrupts by calling the engine's IRQ entry points.

extern crate std;

use std::vec;
use std::vec::Vec;

use crate::internal::register::channel::{
    CHANNEL_0_7_OFFSET, CHANNEL_8_15_OFFSET, CHANNEL_STRIDE, CHCFG_OFFSET, CHCTRL_OFFSET,
    CHSTAT_OFFSET, CHSTAT_END, CHSTAT_ER, NXLA_OFFSET,
};
use crate::internal::register::common::{COMMON_0_7_OFFSET, COMMON_8_15_OFFSET, DSTAT_ER_OFFSET};

/// Host-memory stand-in for the DMAC register blocks.
///
/// The boxed storage is stable for the struct's lifetime, so the engine can
/// hold raw base addresses into it.
pub struct MockDmac {
    ctrl: Vec<u32>,
    dmars: Vec<u32>,
}

impl MockDmac {
    /// Allocate zeroed register blocks
    pub fn new() -> Self {
        Self {
            ctrl: vec![0u32; 0x800 / 4],
            dmars: vec![0u32; 8],
        }
    }

    /// Base address of the controller block
    pub fn ctrl_base(&mut self) -> usize {
        self.ctrl.as_mut_ptr() as usize
    }

    /// Base address of the DMARS block
    pub fn dmars_base(&mut self) -> usize {
        self.dmars.as_mut_ptr() as usize
    }

    fn channel_word(channel: usize, offset: usize) -> usize {
        let group = if channel < 8 {
            CHANNEL_0_7_OFFSET
        } else {
            CHANNEL_8_15_OFFSET
        };
        (group + (channel % 8) * CHANNEL_STRIDE + offset) / 4
    }

    /// Read a channel register word as the driver would see it
    pub fn channel_reg(&self, channel: usize, offset: usize) -> u32 {
        self.ctrl[Self::channel_word(channel, offset)]
    }

    /// Last value the driver wrote to CHCTRL
    pub fn chctrl(&self, channel: usize) -> u32 {
        self.channel_reg(channel, CHCTRL_OFFSET)
    }

    /// Last value the driver wrote to CHCFG
    pub fn chcfg(&self, channel: usize) -> u32 {
        self.channel_reg(channel, CHCFG_OFFSET)
    }

    /// Last value the driver wrote to NXLA
    pub fn nxla(&self, channel: usize) -> u32 {
        self.channel_reg(channel, NXLA_OFFSET)
    }

    /// Routing word pair containing the given channel's half
    pub fn dmars_word(&self, channel: usize) -> u32 {
        self.dmars[channel / 2]
    }

    /// Set CHSTAT to an arbitrary value
    pub fn set_status(&mut self, channel: usize, value: u32) {
        self.ctrl[Self::channel_word(channel, CHSTAT_OFFSET)] = value;
    }

    /// Raise the end-of-descriptor status bit
    pub fn raise_end(&mut self, channel: usize) {
        self.set_status(channel, CHSTAT_END);
    }

    /// Raise the channel fault status bit
    pub fn raise_error(&mut self, channel: usize) {
        self.set_status(channel, CHSTAT_ER);
    }

    /// Clear CHSTAT (as hardware would after the driver acks)
    pub fn clear_status(&mut self, channel: usize) {
        self.set_status(channel, 0);
    }

    /// Fault a channel: raises its CHSTAT error bit and its bit in the
    /// group's aggregated error status register
    pub fn raise_group_error(&mut self, channel: usize) {
        let group = if channel < 8 {
            COMMON_0_7_OFFSET
        } else {
            COMMON_8_15_OFFSET
        };
        self.ctrl[(group + DSTAT_ER_OFFSET) / 4] |= 1 << (channel % 8);
        self.raise_error(channel);
    }
}

impl Default for MockDmac {
    fn default() -> Self {
        Self::new()
    }
}

/// No-op delay for engine init in host tests
pub struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
