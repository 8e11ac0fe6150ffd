//! Bridge error type
//!
//! Driver-level failures (`EcError`, `AcpiStatus`) stay local to their
//! modules and are mapped into [`BridgeError`] at the endpoint boundary.
//! The controlling agent only ever sees [`BridgeError::errno`]; anything
//! richer goes to the log.

use core::fmt;

/// Generic invalid-argument code returned for every hardware/firmware failure
pub const EINVAL: i32 = -22;

/// Error type for endpoint operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// PCI device or embedded controller not found
    TargetAbsent,
    /// Embedded controller byte transfer failed
    TransportFailure,
    /// Firmware path does not resolve to a handle
    ///
    /// Part of the taxonomy only: unresolved paths are logged and never
    /// returned from an endpoint.
    ResolutionFailure,
    /// Firmware method exists but evaluation failed
    EvaluationFailure,
    /// Input could not be stored (numeric input is parsed permissively and
    /// never raises this)
    MalformedInput,
    /// Physical memory window could not be mapped
    MapFailed,
    /// Endpoint has no read operation
    NotReadable,
    /// Endpoint is not currently registered
    NoSuchEndpoint,
    /// Lifecycle operation not valid in the current state
    InvalidState,
    /// The registration service refused an endpoint
    Registration(i32),
}

impl BridgeError {
    /// Failure code handed back through the endpoint interface
    pub fn errno(&self) -> i32 {
        match self {
            Self::Registration(code) => *code,
            _ => EINVAL,
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetAbsent => write!(f, "target not present"),
            Self::TransportFailure => write!(f, "embedded controller transfer failed"),
            Self::ResolutionFailure => write!(f, "firmware path did not resolve"),
            Self::EvaluationFailure => write!(f, "firmware method evaluation failed"),
            Self::MalformedInput => write!(f, "malformed input"),
            Self::MapFailed => write!(f, "memory window could not be mapped"),
            Self::NotReadable => write!(f, "endpoint is write-only"),
            Self::NoSuchEndpoint => write!(f, "endpoint not registered"),
            Self::InvalidState => write!(f, "invalid lifecycle state"),
            Self::Registration(code) => write!(f, "endpoint registration failed ({})", code),
        }
    }
}

/// Result type for endpoint operations
pub type Result<T> = core::result::Result<T, BridgeError>;
