//! Thread-safe and ISR-safe wrappers for the DMA engine.
//!
//! This module provides synchronization primitives for sharing the engine
//! between thread context and interrupt handlers:
//!
//! - [`SharedEngine`] - critical-section based wrapper for synchronous use
//! - [`CriticalSectionCell`] - the underlying ISR-safe cell
//!
//! # Usage Pattern
//!
//! Declare the engine as a static, drive it from thread context, and ack
//! interrupts from the handlers:
//!
//! ```ignore
//! use rzg2l_dmac::sync::SharedEngine;
//!
//! static DMAC: SharedEngine<16, 16, 16> = SharedEngine::new();
//!
//! fn main() {
//!     DMAC.with(|engine| engine.init(config, &mut delay)).unwrap();
//!     loop {
//!         DMAC.run_completions();
//!     }
//! }
//! ```

mod primitives;
mod shared;

pub use primitives::CriticalSectionCell;
pub use shared::{SharedEngine, SharedEngineDefault, SharedEngineLarge, SharedEngineSmall};
