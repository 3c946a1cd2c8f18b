//! Link-mode descriptor bit field constants.
//!
//! Based on the RZ/G2L DMAC hardware manual, link-mode descriptor format.

#![allow(dead_code)]

// =============================================================================
// Header Word - Ownership and Chain Control
// =============================================================================

/// Descriptor header word bit field constants
pub mod header {
    /// Link Valid - when set, descriptor is owned by hardware and will be
    /// executed; hardware clears it after consuming the descriptor
    pub const LV: u32 = 1 << 0;
    /// Link End - this is the last descriptor of the chain; hardware halts
    /// after executing it instead of following `nxla`
    pub const LE: u32 = 1 << 1;
    /// Write Back Disable - hardware does not write completion status back
    /// into the header word
    pub const WBD: u32 = 1 << 2;
    /// Descriptor Interrupt Mask - suppress the end interrupt for this
    /// descriptor (loaded into CHCFG.DEM when the descriptor executes)
    pub const DIM: u32 = 1 << 3;
}

// =============================================================================
// Descriptor Word Layout
// =============================================================================

/// Byte offsets of the eight words inside one 32-byte descriptor record
pub mod word {
    /// Header (ownership/chain control)
    pub const HEADER: usize = 0x00;
    /// Source address
    pub const SA: usize = 0x04;
    /// Destination address
    pub const DA: usize = 0x08;
    /// Transfer byte count
    pub const TB: usize = 0x0C;
    /// Channel configuration loaded for this descriptor
    pub const CHCFG: usize = 0x10;
    /// Channel interval loaded for this descriptor
    pub const CHITVL: usize = 0x14;
    /// Channel extension loaded for this descriptor
    pub const CHEXT: usize = 0x18;
    /// Next link address (physical address of the next descriptor)
    pub const NXLA: usize = 0x1C;
}
