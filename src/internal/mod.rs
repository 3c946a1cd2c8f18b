//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`register`]: Raw memory-mapped register definitions
//! - [`constants`]: Internal constants and magic numbers
//! - [`descriptor`]: Link-mode DMA descriptor structures
//! - [`ring`]: Circular descriptor ring with hardware-ownership tracking
//! - [`queue`]: Fixed-capacity index FIFO for request bookkeeping
//!
//! # Stability
//!
//! **WARNING:** This module is `pub(crate)` only. Do not depend on any types
//! or functions in this module from external code. They are subject to change
//! without notice.

// Register maps and descriptor fields are defined in full even where the
// driver exercises only a subset.
#![allow(dead_code)]

pub(crate) mod constants;
pub(crate) mod descriptor;
pub(crate) mod queue;
pub(crate) mod register;
pub(crate) mod ring;
