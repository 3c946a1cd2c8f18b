//! Link-mode DMA descriptor structure.
//!
//! Each descriptor is a 32-byte record the hardware walks via its `nxla`
//! pointer. The header word carries the CPU/hardware ownership bit.

pub mod bits;

use bits::header;

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: VolatileCell is safe to share between threads because all access
// is through volatile operations which are atomic for u32 on the Cortex-A55.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }

    /// Update the value using a function (read-modify-write)
    #[inline(always)]
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let old = self.get();
        self.set(f(old));
    }
}

impl<T: Copy + Default> Default for VolatileCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// One link-mode descriptor record.
///
/// Field layout and order match the hardware format exactly. Hardware reads
/// every word and writes the header back (unless WBD is set), so all fields
/// are volatile cells.
#[repr(C, align(32))]
pub struct LinkDescriptor {
    /// Ownership and chain control (LV, LE, WBD, DIM)
    pub header: VolatileCell<u32>,
    /// Source address
    pub sa: VolatileCell<u32>,
    /// Destination address
    pub da: VolatileCell<u32>,
    /// Transfer byte count
    pub tb: VolatileCell<u32>,
    /// Channel configuration to load for this descriptor
    pub chcfg: VolatileCell<u32>,
    /// Channel interval to load for this descriptor
    pub chitvl: VolatileCell<u32>,
    /// Channel extension to load for this descriptor
    pub chext: VolatileCell<u32>,
    /// Physical address of the next descriptor
    pub nxla: VolatileCell<u32>,
}

impl LinkDescriptor {
    /// Create a zeroed descriptor (not owned by hardware)
    pub const fn new() -> Self {
        Self {
            header: VolatileCell::new(0),
            sa: VolatileCell::new(0),
            da: VolatileCell::new(0),
            tb: VolatileCell::new(0),
            chcfg: VolatileCell::new(0),
            chitvl: VolatileCell::new(0),
            chext: VolatileCell::new(0),
            nxla: VolatileCell::new(0),
        }
    }

    /// Check if the descriptor is owned by hardware (LV set)
    #[inline]
    pub fn is_hw_owned(&self) -> bool {
        self.header.get() & header::LV != 0
    }

    /// Check if the descriptor ends its chain (LE set)
    #[inline]
    pub fn is_chain_end(&self) -> bool {
        self.header.get() & header::LE != 0
    }

    /// Fill the payload words of the descriptor.
    ///
    /// Does not touch the header; ownership is handed to hardware separately
    /// so the header write is always the last store (publish ordering).
    #[inline]
    pub fn write_payload(&self, sa: u32, da: u32, tb: u32, chcfg: u32) {
        self.sa.set(sa);
        self.da.set(da);
        self.tb.set(tb);
        self.chcfg.set(chcfg);
        self.chitvl.set(0);
        self.chext.set(0);
    }

    /// Hand the descriptor to hardware with the given chain flags.
    ///
    /// `flags` may include [`header::LE`] and [`header::DIM`]; LV is always
    /// set. Must only be called after the payload words are written.
    #[inline]
    pub fn publish(&self, flags: u32) {
        self.header.set(header::LV | flags);
    }

    /// Reclaim the descriptor for CPU use (clears the whole header)
    #[inline]
    pub fn release(&self) {
        self.header.set(0);
    }
}

impl Default for LinkDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_size_and_alignment() {
        assert_eq!(core::mem::size_of::<LinkDescriptor>(), 32);
        assert_eq!(core::mem::align_of::<LinkDescriptor>(), 32);
    }

    #[test]
    fn new_descriptor_is_cpu_owned() {
        let desc = LinkDescriptor::new();
        assert!(!desc.is_hw_owned());
        assert!(!desc.is_chain_end());
    }

    #[test]
    fn publish_sets_lv_and_flags() {
        let desc = LinkDescriptor::new();
        desc.write_payload(0x1000, 0x2000, 64, 0);

        desc.publish(header::LE);
        assert!(desc.is_hw_owned());
        assert!(desc.is_chain_end());

        desc.release();
        assert!(!desc.is_hw_owned());
        assert!(!desc.is_chain_end());
    }

    #[test]
    fn write_payload_leaves_header_untouched() {
        let desc = LinkDescriptor::new();
        desc.publish(0);
        desc.write_payload(0xAAAA_0000, 0xBBBB_0000, 128, 0x8040_0008);

        assert!(desc.is_hw_owned());
        assert_eq!(desc.sa.get(), 0xAAAA_0000);
        assert_eq!(desc.da.get(), 0xBBBB_0000);
        assert_eq!(desc.tb.get(), 128);
        assert_eq!(desc.chcfg.get(), 0x8040_0008);
    }

    #[test]
    fn volatile_cell_update() {
        let cell = VolatileCell::new(0x0Fu32);
        cell.update(|v| v | 0xF0);
        assert_eq!(cell.get(), 0xFF);
    }
}
