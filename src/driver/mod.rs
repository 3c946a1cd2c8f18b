//! Core driver components for the RZ/G2L DMA controller.
//!
//! This module contains the essential building blocks for configuring and
//! operating the engine:
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`request`] - Transfer request types, handles, and cookies
//! - [`dispatch`] - Interrupt-to-worker completion pipeline
//! - [`engine`] - The engine facade and per-channel machinery
//!
//! # Example
//!
//! ```ignore
//! use rzg2l_dmac::driver::{Engine, EngineConfig};
//!
//! let config = EngineConfig::new(0x1182_0000, 0x1182_0800)
//!     .with_slave_table(&SLAVE_TABLE);
//! ```

// Submodules
mod channel;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod request;

// Re-exports for convenience
pub use config::{
    EngineConfig, InterruptPolicy, SlaveEntry, SlaveParams, State, TransferDirection,
    TransferWidth,
};
pub use dispatch::CompletionEvent;
pub use engine::{Engine, EngineDefault, EngineLarge, EngineSmall};
pub use request::{
    Cookie, RequestHandle, SgSegment, TransferCallback, TransferOutcome, TxState,
};
