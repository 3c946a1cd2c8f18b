//! Common (per-group) register block and DMARS routing registers
//!
//! Each group of eight channels shares a small common block holding the
//! priority control and the aggregated interrupt status registers. The
//! DMARS registers live in a separate extension block and pack the request
//! routing for two adjacent channels into one 32-bit word.

use super::{modify_reg, read_reg, write_reg};

// =============================================================================
// Common Block Layout
// =============================================================================

/// Offset of the channel 0-7 common block inside the control block
pub const COMMON_0_7_OFFSET: usize = 0x0300;
/// Offset of the channel 8-15 common block inside the control block
pub const COMMON_8_15_OFFSET: usize = 0x0700;

/// DMA Control Register offset (relative to a common block)
pub const DCTRL_OFFSET: usize = 0x00;
/// DMA Status (END) aggregate register offset
pub const DSTAT_EN_OFFSET: usize = 0x10;
/// DMA Status (ERROR) aggregate register offset
pub const DSTAT_ER_OFFSET: usize = 0x14;

// =============================================================================
// DCTRL Bits
// =============================================================================

/// Priority Rotation - round-robin channel arbitration
pub const DCTRL_PR: u32 = 1 << 0;
/// Level Interrupt - interrupt outputs are level-sensitive
pub const DCTRL_LVINT: u32 = 1 << 1;

/// Control word written at engine init: round-robin priority with
/// level-sensitive interrupt outputs.
pub const DCTRL_DEFAULT: u32 = DCTRL_PR | DCTRL_LVINT;

// =============================================================================
// DMARS Packing
// =============================================================================

/// Width of one channel's routing field inside a DMARS word
pub const DMARS_FIELD_WIDTH: u32 = 16;
/// Mask of the combined mid+rid routing value (8-bit mid, 2-bit rid)
pub const DMARS_MID_RID_MASK: u32 = 0x3FF;

// =============================================================================
// Common Register Access
// =============================================================================

/// Handle over one group's common register block.
#[derive(Debug, Clone, Copy)]
pub struct CommonRegs {
    base: usize,
}

impl CommonRegs {
    /// Placeholder handle used before engine init resolves the real base.
    pub const fn unbound() -> Self {
        Self { base: 0 }
    }

    /// Resolve the common block for the group containing channel `index`.
    pub fn new(ctrl_base: usize, index: usize) -> Self {
        let group = if index < 8 {
            COMMON_0_7_OFFSET
        } else {
            COMMON_8_15_OFFSET
        };
        Self {
            base: ctrl_base + group,
        }
    }

    /// Write the group control register
    #[inline(always)]
    pub fn set_control(&self, value: u32) {
        unsafe { write_reg(self.base + DCTRL_OFFSET, value) }
    }

    /// Read the aggregated end-interrupt status (one bit per channel)
    #[inline(always)]
    pub fn end_status(&self) -> u32 {
        unsafe { read_reg(self.base + DSTAT_EN_OFFSET) }
    }

    /// Read the aggregated error-interrupt status (one bit per channel)
    #[inline(always)]
    pub fn error_status(&self) -> u32 {
        unsafe { read_reg(self.base + DSTAT_ER_OFFSET) }
    }
}

/// Handle over the DMARS half-word routing a single channel's request line.
///
/// Even channels occupy the low 16 bits of their pair word, odd channels the
/// high 16 bits; writes are read-modify-write to leave the sibling untouched.
#[derive(Debug, Clone, Copy)]
pub struct DmarsReg {
    addr: usize,
    shift: u32,
}

impl DmarsReg {
    /// Placeholder handle used before engine init resolves the real base.
    pub const fn unbound() -> Self {
        Self { addr: 0, shift: 0 }
    }

    /// Resolve the pair word and half for channel `index`.
    pub fn new(dmars_base: usize, index: usize) -> Self {
        Self {
            addr: dmars_base + (index / 2) * 4,
            shift: if index % 2 == 1 { DMARS_FIELD_WIDTH } else { 0 },
        }
    }

    /// Program this channel's mid+rid routing value.
    #[inline]
    pub fn set_mid_rid(&self, mid_rid: u16) {
        let field = (u32::from(mid_rid) & DMARS_MID_RID_MASK) << self.shift;
        let mask = DMARS_MID_RID_MASK << self.shift;
        unsafe { modify_reg(self.addr, |v| (v & !mask) | field) }
    }

    /// Read back this channel's routing value.
    #[inline]
    pub fn mid_rid(&self) -> u16 {
        let word = unsafe { read_reg(self.addr) };
        ((word >> self.shift) & DMARS_MID_RID_MASK) as u16
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_block_bases() {
        let low = CommonRegs::new(0x1000, 0);
        assert_eq!(low.base, 0x1000 + COMMON_0_7_OFFSET);

        let low = CommonRegs::new(0x1000, 7);
        assert_eq!(low.base, 0x1000 + COMMON_0_7_OFFSET);

        let high = CommonRegs::new(0x1000, 8);
        assert_eq!(high.base, 0x1000 + COMMON_8_15_OFFSET);

        let high = CommonRegs::new(0x1000, 15);
        assert_eq!(high.base, 0x1000 + COMMON_8_15_OFFSET);
    }

    #[test]
    fn dctrl_default_word() {
        assert_eq!(DCTRL_DEFAULT, 0x3);
    }

    #[test]
    fn common_block_read_write() {
        let mut block = [0u32; 0x20 / 4];
        let regs = CommonRegs {
            base: block.as_mut_ptr() as usize,
        };

        regs.set_control(DCTRL_DEFAULT);
        assert_eq!(block[DCTRL_OFFSET / 4], DCTRL_DEFAULT);

        block[DSTAT_EN_OFFSET / 4] = 0b0101;
        block[DSTAT_ER_OFFSET / 4] = 0b0010;
        assert_eq!(regs.end_status(), 0b0101);
        assert_eq!(regs.error_status(), 0b0010);
    }

    #[test]
    fn dmars_pair_packing() {
        let mut words = [0u32; 8];
        let base = words.as_mut_ptr() as usize;

        // Channels 2 and 3 share words[1]
        let even = DmarsReg::new(base, 2);
        let odd = DmarsReg::new(base, 3);

        even.set_mid_rid(0x255);
        odd.set_mid_rid(0x1AA);

        assert_eq!(words[1], (0x1AA << 16) | 0x255);
        assert_eq!(even.mid_rid(), 0x255);
        assert_eq!(odd.mid_rid(), 0x1AA);

        // Rewriting one half leaves the sibling untouched
        even.set_mid_rid(0x011);
        assert_eq!(odd.mid_rid(), 0x1AA);
        assert_eq!(even.mid_rid(), 0x011);
    }

    #[test]
    fn dmars_value_masked_to_ten_bits() {
        let mut words = [0u32; 1];
        let reg = DmarsReg::new(words.as_mut_ptr() as usize, 0);

        reg.set_mid_rid(0xFFFF);
        assert_eq!(words[0], DMARS_MID_RID_MASK);
    }
}
