//! Memory-mapped register definitions for the RZ/G2L DMAC
//!
//! This module provides type-safe access to the DMA controller registers.
//! All register access is volatile to ensure proper hardware interaction.
//!
//! Unlike fixed-address peripherals, the DMAC register bases are supplied by
//! the platform at engine init, so accessors are methods on small handle
//! structs ([`channel::ChannelRegs`], [`common::CommonRegs`],
//! [`common::DmarsReg`]) rather than free functions over a compile-time base.

pub mod channel;
pub mod common;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

/// Modify a register using a read-modify-write operation
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn modify_reg<F>(addr: usize, f: F)
where
    F: FnOnce(u32) -> u32,
{
    // SAFETY: caller guarantees address validity
    let value = unsafe { read_reg(addr) };
    unsafe { write_reg(addr, f(value)) }
}
