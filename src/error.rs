//! Error types for the RZ/G2L DMAC driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Initialization and configuration failures
//! - [`RequestError`]: Transfer preparation and resource exhaustion
//! - [`HardwareError`]: Channel start/stop handshake failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most driver methods.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These errors occur during engine setup, channel binding, or slave
/// parameter validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Engine already initialized
    AlreadyInitialized,
    /// Engine not initialized
    NotInitialized,
    /// Channel count exceeds what the controller exposes
    InvalidChannelCount,
    /// Channel index out of range
    InvalidChannel,
    /// Slave identifier not present in the routing table
    InvalidSlaveId,
    /// Transfer parameters rejected (width, direction, address)
    InvalidTransferConfig,
    /// Channel resources not allocated
    NotAllocated,
    /// Controller reset failed or timed out
    ResetFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyInitialized => "already initialized",
            ConfigError::NotInitialized => "not initialized",
            ConfigError::InvalidChannelCount => "invalid channel count",
            ConfigError::InvalidChannel => "invalid channel index",
            ConfigError::InvalidSlaveId => "unknown slave identifier",
            ConfigError::InvalidTransferConfig => "invalid transfer configuration",
            ConfigError::NotAllocated => "channel resources not allocated",
            ConfigError::ResetFailed => "controller reset failed",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Transfer preparation and queueing errors
///
/// These errors relate to request pool and descriptor ring capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Request pool exhausted for this channel
    NoRequestsAvailable,
    /// Descriptor ring cannot hold the chain
    NoDescriptorsAvailable,
    /// Scatter-gather list exceeds the per-transfer segment limit
    TooManySegments,
    /// Zero-length transfer or empty scatter-gather list
    EmptyTransfer,
    /// Handle does not refer to a prepared request
    InvalidHandle,
}

impl core::fmt::Display for RequestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RequestError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestError::NoRequestsAvailable => "no transfer requests available",
            RequestError::NoDescriptorsAvailable => "no descriptors available",
            RequestError::TooManySegments => "too many scatter-gather segments",
            RequestError::EmptyTransfer => "empty transfer",
            RequestError::InvalidHandle => "invalid request handle",
        }
    }
}

// =============================================================================
// Hardware Errors
// =============================================================================

/// Channel start/stop handshake failures
///
/// These errors occur when the controller does not acknowledge a
/// register-level sequencing step within its bounded spin window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareError {
    /// Channel did not reach idle during the enable handshake
    EnableTimeout,
    /// Channel reported an error condition (CHSTAT.ER)
    ChannelFault,
}

impl core::fmt::Display for HardwareError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HardwareError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            HardwareError::EnableTimeout => "channel enable timed out",
            HardwareError::ChannelFault => "channel fault",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InvalidSlaveId)) => { /* ... */ }
///     Err(Error::Request(RequestError::NoDescriptorsAvailable)) => { /* ... */ }
///     Err(Error::Hardware(HardwareError::EnableTimeout)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Request error
    Request(RequestError),
    /// Hardware error
    Hardware(HardwareError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Request(e) => write!(f, "request: {}", e.as_str()),
            Error::Hardware(e) => write!(f, "hardware: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        Error::Request(e)
    }
}

impl From<HardwareError> for Error {
    fn from(e: HardwareError) -> Self {
        Error::Hardware(e)
    }
}

/// Result type alias for DMAC operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for request operations
pub type RequestResult<T> = core::result::Result<T, RequestError>;

/// Result type alias for hardware handshake operations
pub type HardwareResult<T> = core::result::Result<T, HardwareError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    // =========================================================================
    // ConfigError Tests
    // =========================================================================

    #[test]
    fn config_error_as_str_non_empty() {
        let variants = [
            ConfigError::AlreadyInitialized,
            ConfigError::NotInitialized,
            ConfigError::InvalidChannelCount,
            ConfigError::InvalidChannel,
            ConfigError::InvalidSlaveId,
            ConfigError::InvalidTransferConfig,
            ConfigError::NotAllocated,
            ConfigError::ResetFailed,
        ];

        for variant in variants {
            let s = variant.as_str();
            assert!(!s.is_empty(), "ConfigError::{:?} has empty string", variant);
        }
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidSlaveId;
        let display = format!("{}", err);
        assert_eq!(display, "unknown slave identifier");
    }

    #[test]
    fn config_error_equality() {
        assert_eq!(ConfigError::InvalidChannel, ConfigError::InvalidChannel);
        assert_ne!(ConfigError::InvalidChannel, ConfigError::ResetFailed);
    }

    // =========================================================================
    // RequestError Tests
    // =========================================================================

    #[test]
    fn request_error_as_str_non_empty() {
        let variants = [
            RequestError::NoRequestsAvailable,
            RequestError::NoDescriptorsAvailable,
            RequestError::TooManySegments,
            RequestError::EmptyTransfer,
            RequestError::InvalidHandle,
        ];

        for variant in variants {
            let s = variant.as_str();
            assert!(!s.is_empty(), "RequestError::{:?} has empty string", variant);
        }
    }

    #[test]
    fn request_error_display() {
        let err = RequestError::NoDescriptorsAvailable;
        let display = format!("{}", err);
        assert_eq!(display, "no descriptors available");
    }

    // =========================================================================
    // HardwareError Tests
    // =========================================================================

    #[test]
    fn hardware_error_display() {
        let err = HardwareError::EnableTimeout;
        let display = format!("{}", err);
        assert_eq!(display, "channel enable timed out");
    }

    #[test]
    fn hardware_error_equality() {
        assert_eq!(HardwareError::ChannelFault, HardwareError::ChannelFault);
        assert_ne!(HardwareError::ChannelFault, HardwareError::EnableTimeout);
    }

    // =========================================================================
    // Unified Error Tests
    // =========================================================================

    #[test]
    fn error_from_config_error() {
        let config_err = ConfigError::InvalidSlaveId;
        let err: Error = config_err.into();

        match err {
            Error::Config(e) => assert_eq!(e, ConfigError::InvalidSlaveId),
            _ => panic!("Expected Error::Config"),
        }
    }

    #[test]
    fn error_from_request_error() {
        let request_err = RequestError::NoRequestsAvailable;
        let err: Error = request_err.into();

        match err {
            Error::Request(e) => assert_eq!(e, RequestError::NoRequestsAvailable),
            _ => panic!("Expected Error::Request"),
        }
    }

    #[test]
    fn error_from_hardware_error() {
        let hw_err = HardwareError::EnableTimeout;
        let err: Error = hw_err.into();

        match err {
            Error::Hardware(e) => assert_eq!(e, HardwareError::EnableTimeout),
            _ => panic!("Expected Error::Hardware"),
        }
    }

    #[test]
    fn error_display_config() {
        let err = Error::Config(ConfigError::ResetFailed);
        let display = format!("{}", err);
        assert!(display.contains("config"));
        assert!(display.contains("reset"));
    }

    #[test]
    fn error_display_request() {
        let err = Error::Request(RequestError::TooManySegments);
        let display = format!("{}", err);
        assert!(display.contains("request"));
        assert!(display.contains("segments"));
    }

    #[test]
    fn error_display_hardware() {
        let err = Error::Hardware(HardwareError::ChannelFault);
        let display = format!("{}", err);
        assert!(display.contains("hardware"));
        assert!(display.contains("fault"));
    }

    #[test]
    fn error_equality() {
        let err1 = Error::Config(ConfigError::NotInitialized);
        let err2 = Error::Config(ConfigError::NotInitialized);
        let err3 = Error::Config(ConfigError::InvalidChannel);

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    // =========================================================================
    // Result Type Alias Tests
    // =========================================================================

    #[test]
    fn result_type_works() {
        fn test_fn() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(test_fn().unwrap(), 42);
    }

    #[test]
    fn request_result_type_works() {
        fn test_fn() -> RequestResult<u32> {
            Err(RequestError::InvalidHandle)
        }

        assert!(test_fn().is_err());
    }

    #[test]
    fn hardware_result_type_works() {
        fn test_fn() -> HardwareResult<u32> {
            Err(HardwareError::EnableTimeout)
        }

        assert!(test_fn().is_err());
    }
}
