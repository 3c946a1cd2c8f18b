//! Driver-wide sizing and timing constants.

/// Number of channel windows the controller exposes
pub const MAX_CHANNELS: usize = 16;

/// Maximum scatter-gather segments in a single prepared transfer
pub const MAX_SG_SEGMENTS: usize = 8;

/// Bounded spin count for the channel reset handshake before declaring
/// an enable timeout
pub const ENABLE_SPIN_LIMIT: u32 = 1024;
