//! Configuration types for the RZ/G2L DMAC driver

use crate::internal::constants::MAX_CHANNELS;

/// Direction of a slave transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferDirection {
    /// Memory to device (peripheral consumes the data)
    #[default]
    MemToDev,
    /// Device to memory (peripheral produces the data)
    DevToMem,
}

/// Bus access width for one side of a slave transfer
///
/// The discriminant is the raw SDS/DDS selector programmed into CHCFG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferWidth {
    /// 1-byte accesses
    #[default]
    Bytes1 = 0,
    /// 2-byte accesses
    Bytes2 = 1,
    /// 4-byte accesses
    Bytes4 = 2,
    /// 8-byte accesses
    Bytes8 = 3,
    /// 16-byte accesses
    Bytes16 = 4,
    /// 32-byte accesses
    Bytes32 = 5,
    /// 64-byte accesses
    Bytes64 = 6,
    /// 128-byte accesses
    Bytes128 = 7,
}

impl TransferWidth {
    /// Raw selector value for the CHCFG SDS/DDS fields
    #[must_use]
    pub const fn to_selector(self) -> u32 {
        self as u32
    }
}

/// One entry of the request routing table.
///
/// Carries everything needed to run a slave transfer against one
/// peripheral: its data register address, a base channel-configuration
/// word (request detection and default access widths), and the mid+rid
/// value the DMARS register routes onto the channel's request line. A
/// later `config()` call overrides the address and widths per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveEntry {
    /// Platform slave identifier (matched by `channel_filter`)
    pub slave_id: u16,
    /// Device-side data register address
    pub addr: u32,
    /// Base channel-configuration word. Mode, routing-select and
    /// direction bits are owned by the driver and masked out.
    pub chcfg: u32,
    /// Combined 8-bit mid and 2-bit rid routing value
    pub mid_rid: u16,
}

impl SlaveEntry {
    /// Create a routing entry
    #[must_use]
    pub const fn new(slave_id: u16, addr: u32, chcfg: u32, mid_rid: u16) -> Self {
        Self {
            slave_id,
            addr,
            chcfg,
            mid_rid,
        }
    }
}

/// Per-channel slave transfer parameters, set through `config()` to
/// override the routing-table entry's address and width defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveParams {
    /// Device-side address for mem-to-dev transfers
    pub dst_addr: u32,
    /// Device-side address for dev-to-mem transfers
    pub src_addr: u32,
    /// Access width on the device side for mem-to-dev transfers
    pub dst_width: TransferWidth,
    /// Access width on the device side for dev-to-mem transfers
    pub src_width: TransferWidth,
}

/// When the hardware raises an end interrupt for a multi-descriptor chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptPolicy {
    /// Interrupt after every descriptor
    #[default]
    EachDescriptor,
    /// Interrupt only on the last descriptor of a chain (interior
    /// descriptors carry the end-interrupt mask)
    ChainEnd,
}

/// Engine driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not initialized
    #[default]
    Uninitialized,
    /// Initialized, channels ready for allocation
    Ready,
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig<'t> {
    /// Base address of the controller register block
    pub ctrl_base: usize,
    /// Base address of the DMARS routing register block
    pub dmars_base: usize,
    /// Request routing table (platform-owned, read-only)
    pub slave_table: &'t [SlaveEntry],
    /// Interrupt granularity for multi-descriptor chains
    pub interrupt_policy: InterruptPolicy,
}

impl<'t> EngineConfig<'t> {
    /// Create a configuration over the given register blocks
    #[must_use]
    pub const fn new(ctrl_base: usize, dmars_base: usize) -> Self {
        Self {
            ctrl_base,
            dmars_base,
            slave_table: &[],
            interrupt_policy: InterruptPolicy::EachDescriptor,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the request routing table
    #[must_use]
    pub const fn with_slave_table(mut self, table: &'t [SlaveEntry]) -> Self {
        self.slave_table = table;
        self
    }

    /// Set the interrupt granularity for multi-descriptor chains
    #[must_use]
    pub const fn with_interrupt_policy(mut self, policy: InterruptPolicy) -> Self {
        self.interrupt_policy = policy;
        self
    }
}

/// Check that a channel count fits the controller's register map
#[must_use]
pub const fn channel_count_supported(count: usize) -> bool {
    count > 0 && count <= MAX_CHANNELS
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = EngineConfig::new(0x1182_0000, 0x1182_0800);

        assert_eq!(config.ctrl_base, 0x1182_0000);
        assert_eq!(config.dmars_base, 0x1182_0800);
        assert!(config.slave_table.is_empty());
        assert_eq!(config.interrupt_policy, InterruptPolicy::EachDescriptor);
    }

    #[test]
    fn builder_methods_chain() {
        static TABLE: [SlaveEntry; 2] = [
            SlaveEntry::new(0x21, 0x1004_002C, 0x0001_1060, 0x255),
            SlaveEntry::new(0x22, 0x1004_0024, 0x0002_2060, 0x256),
        ];

        let config = EngineConfig::new(0x1000, 0x2000)
            .with_slave_table(&TABLE)
            .with_interrupt_policy(InterruptPolicy::ChainEnd);

        assert_eq!(config.slave_table.len(), 2);
        assert_eq!(config.slave_table[0].mid_rid, 0x255);
        assert_eq!(config.slave_table[0].addr, 0x1004_002C);
        assert_eq!(config.interrupt_policy, InterruptPolicy::ChainEnd);
    }

    #[test]
    fn width_selectors_match_register_encoding() {
        assert_eq!(TransferWidth::Bytes1.to_selector(), 0);
        assert_eq!(TransferWidth::Bytes2.to_selector(), 1);
        assert_eq!(TransferWidth::Bytes4.to_selector(), 2);
        assert_eq!(TransferWidth::Bytes8.to_selector(), 3);
        assert_eq!(TransferWidth::Bytes128.to_selector(), 7);
    }

    #[test]
    fn channel_count_bounds() {
        assert!(!channel_count_supported(0));
        assert!(channel_count_supported(1));
        assert!(channel_count_supported(8));
        assert!(channel_count_supported(16));
        assert!(!channel_count_supported(17));
    }

    #[test]
    fn state_default_is_uninitialized() {
        assert_eq!(State::default(), State::Uninitialized);
    }
}
