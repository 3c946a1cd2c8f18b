//! Per-channel register window definitions
//!
//! Each DMA channel owns a 0x40-byte register window. Channels 0-7 live in
//! the low half of the control block, channels 8-15 in the high half; each
//! group additionally shares a common register block (see
//! [`super::common`]).

use super::{read_reg, write_reg};

// =============================================================================
// Channel Window Layout
// =============================================================================

/// Offset of the channel 0-7 windows inside the control block
pub const CHANNEL_0_7_OFFSET: usize = 0x0000;
/// Offset of the channel 8-15 windows inside the control block
pub const CHANNEL_8_15_OFFSET: usize = 0x0400;
/// Distance between consecutive channel windows
pub const CHANNEL_STRIDE: usize = 0x0040;

// =============================================================================
// Register Offsets (relative to a channel window)
// =============================================================================

/// Channel Status Register offset (read-only)
pub const CHSTAT_OFFSET: usize = 0x24;
/// Channel Control Register offset (write-only command bits)
pub const CHCTRL_OFFSET: usize = 0x28;
/// Channel Configuration Register offset
pub const CHCFG_OFFSET: usize = 0x2C;
/// Channel Interval Register offset
pub const CHITVL_OFFSET: usize = 0x30;
/// Channel Extension Register offset
pub const CHEXT_OFFSET: usize = 0x34;
/// Next Link Address Register offset (physical address of next descriptor)
pub const NXLA_OFFSET: usize = 0x38;
/// Current Link Address Register offset (read-only)
pub const CRLA_OFFSET: usize = 0x3C;

// =============================================================================
// Status Register (CHSTAT) Bits
// =============================================================================

/// Channel Enabled - the channel is armed and may transfer
pub const CHSTAT_EN: u32 = 1 << 0;
/// Request Pending - a transfer request has been latched
pub const CHSTAT_RQST: u32 = 1 << 1;
/// Transfer Active - the datapath is currently moving data
pub const CHSTAT_TACT: u32 = 1 << 2;
/// Suspended - the channel is suspended
pub const CHSTAT_SUS: u32 = 1 << 3;
/// Error - the channel aborted on a bus or descriptor fault
pub const CHSTAT_ER: u32 = 1 << 4;
/// End - a descriptor finished with its end-interrupt unmasked
pub const CHSTAT_END: u32 = 1 << 5;
/// Terminal Count - the byte counter for the descriptor reached zero
pub const CHSTAT_TC: u32 = 1 << 6;

// =============================================================================
// Control Register (CHCTRL) Bits
// =============================================================================

/// Set the enable bit (arms the channel)
pub const CHCTRL_SETEN: u32 = 1 << 0;
/// Clear the enable bit (disarms the channel)
pub const CHCTRL_CLREN: u32 = 1 << 1;
/// Stage trigger - software kick for a latched request
pub const CHCTRL_STG: u32 = 1 << 2;
/// Software reset - returns the channel datapath to its idle state
pub const CHCTRL_SWRST: u32 = 1 << 3;
/// Clear latched request
pub const CHCTRL_CLRRQ: u32 = 1 << 4;
/// Clear the END status bit (interrupt acknowledge)
pub const CHCTRL_CLREND: u32 = 1 << 5;
/// Clear the terminal-count status bit
pub const CHCTRL_CLRTC: u32 = 1 << 6;
/// Set the suspend bit
pub const CHCTRL_SETSUS: u32 = 1 << 8;
/// Clear the suspend bit
pub const CHCTRL_CLRSUS: u32 = 1 << 9;
/// Set the interrupt mask
pub const CHCTRL_SETINTMSK: u32 = 1 << 16;
/// Clear the interrupt mask
pub const CHCTRL_CLRINTMSK: u32 = 1 << 17;

/// Default control word: one write that unmasks interrupts, clears suspend,
/// terminal-count, end and request latches, resets the datapath and disarms
/// the channel. Used for both normal init and emergency stop.
pub const CHCTRL_DEFAULT: u32 = CHCTRL_CLRINTMSK
    | CHCTRL_CLRSUS
    | CHCTRL_CLRTC
    | CHCTRL_CLREND
    | CHCTRL_CLRRQ
    | CHCTRL_SWRST
    | CHCTRL_CLREN;

// =============================================================================
// Configuration Register (CHCFG) Bits
// =============================================================================

/// Request select mask (low 3 bits of the routing word)
pub const CHCFG_SEL_MASK: u32 = 0x7;
/// Request Direction - request line follows the destination side
pub const CHCFG_REQD: u32 = 1 << 3;
/// Low-edge request detection enable
pub const CHCFG_LOEN: u32 = 1 << 4;
/// High-edge request detection enable
pub const CHCFG_HIEN: u32 = 1 << 5;
/// Level request detection
pub const CHCFG_LVL: u32 = 1 << 6;
/// ACK mode shift
pub const CHCFG_AM_SHIFT: u32 = 8;
/// ACK mode mask
pub const CHCFG_AM_MASK: u32 = 0x7 << 8;
/// Source Data Size shift (3-bit width selector, 8..1024 bits)
pub const CHCFG_SDS_SHIFT: u32 = 12;
/// Source Data Size mask
pub const CHCFG_SDS_MASK: u32 = 0xF << 12;
/// Destination Data Size shift (3-bit width selector, 8..1024 bits)
pub const CHCFG_DDS_SHIFT: u32 = 16;
/// Destination Data Size mask
pub const CHCFG_DDS_MASK: u32 = 0xF << 16;
/// Source Address Fixed - source address does not increment
pub const CHCFG_SAD: u32 = 1 << 20;
/// Destination Address Fixed - destination address does not increment
pub const CHCFG_DAD: u32 = 1 << 21;
/// Transfer Mode - single (one-shot) trigger
pub const CHCFG_TM: u32 = 1 << 22;
/// DMA End interrupt Mask - suppress the per-descriptor end interrupt
pub const CHCFG_DEM: u32 = 1 << 24;
/// Descriptor Mode Select - hardware walks the link-mode descriptor chain
pub const CHCFG_DMS: u32 = 1 << 31;

/// Fixed configuration word for memory-to-memory copies: link mode, one-shot
/// software trigger, request routed to the destination side.
pub const CHCFG_MEM_COPY: u32 = CHCFG_DMS | CHCFG_TM | CHCFG_REQD;

/// Pack a 3-bit source data width selector into a CHCFG word
#[inline(always)]
pub const fn chcfg_sds(width_bits: u32) -> u32 {
    (width_bits << CHCFG_SDS_SHIFT) & CHCFG_SDS_MASK
}

/// Pack a 3-bit destination data width selector into a CHCFG word
#[inline(always)]
pub const fn chcfg_dds(width_bits: u32) -> u32 {
    (width_bits << CHCFG_DDS_SHIFT) & CHCFG_DDS_MASK
}

// =============================================================================
// Channel Register Access
// =============================================================================

/// Handle over one channel's register window.
///
/// Cheap to copy; holds only the resolved window base address.
#[derive(Debug, Clone, Copy)]
pub struct ChannelRegs {
    base: usize,
}

impl ChannelRegs {
    /// Placeholder handle used before engine init resolves the real base.
    pub const fn unbound() -> Self {
        Self { base: 0 }
    }

    /// Resolve the window for channel `index` inside the control block.
    pub fn new(ctrl_base: usize, index: usize) -> Self {
        let group = if index < 8 {
            CHANNEL_0_7_OFFSET
        } else {
            CHANNEL_8_15_OFFSET
        };
        Self {
            base: ctrl_base + group + (index % 8) * CHANNEL_STRIDE,
        }
    }

    /// Base address of the window (for diagnostics).
    #[inline(always)]
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Read the channel status register
    #[inline(always)]
    pub fn status(&self) -> u32 {
        unsafe { read_reg(self.base + CHSTAT_OFFSET) }
    }

    /// Write the channel control register
    #[inline(always)]
    pub fn set_control(&self, value: u32) {
        unsafe { write_reg(self.base + CHCTRL_OFFSET, value) }
    }

    /// Read the channel configuration register
    #[inline(always)]
    pub fn config(&self) -> u32 {
        unsafe { read_reg(self.base + CHCFG_OFFSET) }
    }

    /// Write the channel configuration register
    #[inline(always)]
    pub fn set_config(&self, value: u32) {
        unsafe { write_reg(self.base + CHCFG_OFFSET, value) }
    }

    /// Write the transfer interval register
    #[inline(always)]
    pub fn set_interval(&self, value: u32) {
        unsafe { write_reg(self.base + CHITVL_OFFSET, value) }
    }

    /// Write the channel extension register
    #[inline(always)]
    pub fn set_extension(&self, value: u32) {
        unsafe { write_reg(self.base + CHEXT_OFFSET, value) }
    }

    /// Write the next-descriptor physical address
    #[inline(always)]
    pub fn set_next_link_addr(&self, addr: u32) {
        unsafe { write_reg(self.base + NXLA_OFFSET, addr) }
    }

    /// Read the next-descriptor physical address
    #[inline(always)]
    pub fn next_link_addr(&self) -> u32 {
        unsafe { read_reg(self.base + NXLA_OFFSET) }
    }

    /// Read the current-descriptor physical address (hardware progress)
    #[inline(always)]
    pub fn current_link_addr(&self) -> u32 {
        unsafe { read_reg(self.base + CRLA_OFFSET) }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bases_for_low_group() {
        let regs = ChannelRegs::new(0x1000, 0);
        assert_eq!(regs.base(), 0x1000);

        let regs = ChannelRegs::new(0x1000, 3);
        assert_eq!(regs.base(), 0x1000 + 3 * CHANNEL_STRIDE);

        let regs = ChannelRegs::new(0x1000, 7);
        assert_eq!(regs.base(), 0x1000 + 7 * CHANNEL_STRIDE);
    }

    #[test]
    fn window_bases_for_high_group() {
        let regs = ChannelRegs::new(0x1000, 8);
        assert_eq!(regs.base(), 0x1000 + CHANNEL_8_15_OFFSET);

        let regs = ChannelRegs::new(0x1000, 15);
        assert_eq!(
            regs.base(),
            0x1000 + CHANNEL_8_15_OFFSET + 7 * CHANNEL_STRIDE
        );
    }

    #[test]
    fn default_control_word_composition() {
        // The default write must clear everything and disarm in one shot
        assert_ne!(CHCTRL_DEFAULT & CHCTRL_CLRINTMSK, 0);
        assert_ne!(CHCTRL_DEFAULT & CHCTRL_CLRSUS, 0);
        assert_ne!(CHCTRL_DEFAULT & CHCTRL_CLRTC, 0);
        assert_ne!(CHCTRL_DEFAULT & CHCTRL_CLREND, 0);
        assert_ne!(CHCTRL_DEFAULT & CHCTRL_CLRRQ, 0);
        assert_ne!(CHCTRL_DEFAULT & CHCTRL_SWRST, 0);
        assert_ne!(CHCTRL_DEFAULT & CHCTRL_CLREN, 0);
        // ...without arming the channel
        assert_eq!(CHCTRL_DEFAULT & CHCTRL_SETEN, 0);
    }

    #[test]
    fn mem_copy_config_word() {
        assert_ne!(CHCFG_MEM_COPY & CHCFG_DMS, 0);
        assert_ne!(CHCFG_MEM_COPY & CHCFG_TM, 0);
        assert_ne!(CHCFG_MEM_COPY & CHCFG_REQD, 0);
        // No address-fixed flags on plain copies
        assert_eq!(CHCFG_MEM_COPY & (CHCFG_SAD | CHCFG_DAD), 0);
    }

    #[test]
    fn width_selector_packing() {
        assert_eq!(chcfg_sds(0), 0);
        assert_eq!(chcfg_sds(2), 0x2 << CHCFG_SDS_SHIFT);
        assert_eq!(chcfg_dds(7), 0x7 << CHCFG_DDS_SHIFT);
        // Out-of-range selectors are masked, never smear other fields
        assert_eq!(chcfg_sds(0xFF) & !CHCFG_SDS_MASK, 0);
    }

    #[test]
    fn register_window_read_write() {
        // Back a fake window with host memory
        let mut window = [0u32; 0x40 / 4];
        let regs = ChannelRegs {
            base: window.as_mut_ptr() as usize,
        };

        regs.set_config(CHCFG_MEM_COPY);
        assert_eq!(regs.config(), CHCFG_MEM_COPY);

        regs.set_next_link_addr(0x2000_0040);
        assert_eq!(regs.next_link_addr(), 0x2000_0040);

        regs.set_control(CHCTRL_DEFAULT);
        assert_eq!(window[CHCTRL_OFFSET / 4], CHCTRL_DEFAULT);
    }
}
