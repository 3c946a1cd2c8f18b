//! RZ/G2L DMAC Driver
//!
//! A `no_std`, `no_alloc` Rust implementation of the Renesas RZ/G2L general
//! purpose DMA controller in link mode.
//!
//! The controller walks chains of 32-byte descriptors that it fetches from
//! memory itself; the driver builds those chains in per-channel rings, hands
//! ownership to the hardware through the descriptor header bits, and reclaims
//! them after write-back.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Engine Layer** ([`driver::engine`]): Client-facing facade over all channels
//! 2. **Channel Layer** (`driver::channel`): Request pools, cookies, ring management
//! 3. **Register Layer** (`internal::register`): Channel, common, and routing blocks
//!
//! ## Transfer Lifecycle
//!
//! A transfer moves through four stages, mirroring the classic DMA-engine
//! contract:
//!
//! 1. **Prepare**: [`Engine::prepare_memcpy`] / [`Engine::prepare_slave_sg`]
//!    reserve a request and capture the transfer parameters
//! 2. **Submit**: [`Engine::submit`] assigns a cookie and queues the request
//! 3. **Issue**: [`Engine::issue_pending`] publishes descriptors and arms the
//!    hardware
//! 4. **Complete**: the ISR calls [`Engine::handle_channel_irq`], then the
//!    worker drains [`Engine::process_completions`] and invokes callbacks
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for error and status types
//! - `log`: Enable log-crate diagnostics on fault and overflow paths
//! - `critical-section`: Enable the ISR-safe [`SharedEngine`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use rzg2l_dmac::{Engine, EngineConfig, SlaveEntry, TransferDirection};
//! use embedded_hal::delay::DelayNs;
//!
//! // Your delay implementation (from the platform HAL or custom)
//! let mut delay = /* your DelayNs implementation */;
//!
//! static SLAVES: [SlaveEntry; 1] =
//!     [SlaveEntry::new(0x21, 0x1004_0024, 0x0002_2060, 0x255)];
//!
//! // Static allocation
//! static mut DMAC: Engine<16, 16, 16> = Engine::new();
//!
//! let engine = unsafe { &mut DMAC };
//!
//! // Configure with builder pattern
//! let config = EngineConfig::new(0x1182_0000, 0x1182_0800)
//!     .with_slave_table(&SLAVES);
//!
//! engine.init(config, &mut delay).unwrap();
//! engine.alloc_channel_resources(0).unwrap();
//!
//! let handle = engine.prepare_memcpy(0, src_addr, dst_addr, len).unwrap();
//! let cookie = engine.submit(handle).unwrap();
//! engine.issue_pending(0).unwrap();
//! ```
//!
//! # Memory Requirements
//!
//! With the default configuration (16 channels, 16 descriptors and 16
//! requests per channel):
//! - Total: ~24 KB of DMA-visible SRAM, dominated by the descriptor rings
//!
//! Descriptor rings must live in memory the controller can fetch from; on
//! systems with a cache in front of that memory, place the engine in a
//! non-cached region.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod error;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{
    EngineConfig, InterruptPolicy, SlaveEntry, SlaveParams, State, TransferDirection,
    TransferWidth,
};
pub use driver::dispatch::CompletionEvent;
pub use driver::engine::{Engine, EngineDefault, EngineLarge, EngineSmall};
pub use driver::request::{
    Cookie, RequestHandle, SgSegment, TransferCallback, TransferOutcome, TxState,
};
pub use error::{
    ConfigError, ConfigResult, Error, HardwareError, HardwareResult, RequestError, RequestResult,
    Result,
};

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users
/// should prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the RZ/G2L DMAC hardware and accept responsibility for correct
/// sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::channel::ChannelRegs;
    pub use crate::internal::register::common::{CommonRegs, DmarsReg};
}

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::{SharedEngine, SharedEngineDefault, SharedEngineLarge, SharedEngineSmall};

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{ENABLE_SPIN_LIMIT, MAX_CHANNELS, MAX_SG_SEGMENTS};
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe engine instance for synchronous use.
///
/// This macro expands to a `SharedEngine` static, reducing boilerplate for
/// bare-metal bring-up where the engine is shared between thread context and
/// the DMAC interrupt handlers.
///
/// # Examples
///
/// ```ignore
/// rzg2l_dmac::dmac_static_sync!(DMAC);
///
/// DMAC.with(|engine| {
///     engine.init(config, &mut delay).unwrap();
///     engine.alloc_channel_resources(0).unwrap();
/// });
/// ```
#[cfg(feature = "critical-section")]
#[macro_export]
macro_rules! dmac_static_sync {
    ($name:ident) => {
        $crate::dmac_static_sync!($name, 16, 16, 16);
    };
    ($name:ident, $channels:expr, $desc:expr, $req:expr) => {
        static $name: $crate::sync::SharedEngine<$channels, $desc, $req> =
            $crate::sync::SharedEngine::new();
    };
}
