//! Error types for context and device operations.

use thiserror::Error;

use crate::algorithm::{Algorithm, Family};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from device and context operations.
///
/// Every kind except [`Error::CryptoFault`] leaves the context in the state it
/// had before the failing call, so the caller may retry with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The device does not implement the requested algorithm.
    #[error("unsupported algorithm: {algorithm}")]
    Unsupported {
        /// The algorithm that was requested.
        algorithm: Algorithm,
    },

    /// Malformed or out-of-range configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: &'static str,
    },

    /// Operation called out of sequence.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Which sequencing rule was violated.
        reason: &'static str,
    },

    /// Context is destroyed or belongs to another device.
    #[error("invalid context handle")]
    InvalidHandle,

    /// A buffer or data length violates the operation's size constraints.
    #[error("invalid length {len}: {reason}")]
    InvalidLength {
        /// The offending length in bytes.
        len: usize,
        /// The constraint that was violated.
        reason: &'static str,
    },

    /// Key size is not supported by the algorithm.
    #[error("invalid key length: {bits} bits")]
    InvalidKeyLength {
        /// Requested key size in bits.
        bits: usize,
    },

    /// Operation belongs to a different primitive family than the context.
    #[error("operation for {actual} issued on a {expected} context")]
    WrongFamily {
        /// Family of the context.
        expected: Family,
        /// Family the operation belongs to.
        actual: Family,
    },

    /// Authentication tag did not verify.
    #[error("authentication tag mismatch")]
    AuthFailed,

    /// The accelerator reported a failure while executing.
    #[error("crypto fault: {reason}")]
    CryptoFault {
        /// Backend-provided description.
        reason: String,
    },

    /// The accelerator is temporarily unavailable.
    #[error("device busy")]
    DeviceBusy,
}

impl Error {
    /// Returns true if re-issuing the same call may succeed.
    ///
    /// Only [`Error::DeviceBusy`] is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DeviceBusy)
    }

    /// Returns true if the context is unusable after this error.
    ///
    /// A fatal error means the context must be destroyed and recreated.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::CryptoFault { .. } => true,

            Self::Unsupported { .. }
            | Self::InvalidConfig { .. }
            | Self::InvalidState { .. }
            | Self::InvalidHandle
            | Self::InvalidLength { .. }
            | Self::InvalidKeyLength { .. }
            | Self::WrongFamily { .. }
            | Self::AuthFailed
            | Self::DeviceBusy => false,
        }
    }
}
