//! Accelerator backend abstraction.
//!
//! The `Backend` trait is the outbound boundary of the context layer: each
//! primitive family maps to a small set of raw operations (random pull, CRC
//! compute with parameters, hash init/update/finish, cipher crypt). The core
//! validates sequencing and sizes, then hands already-checked requests to the
//! backend. This enables:
//!
//! - Hardware drivers: register-level engines behind the same contract
//! - Software fallback: a pure-software accelerator for hosts without one
//! - Simulation: seeded, fault-injecting backends for deterministic tests
//!
//! # Invariants
//!
//! - Capability stability: `capabilities()` and `id()` never change for the
//!   lifetime of the backend
//! - No partial mutation: an operation that returns [`BackendError::Busy`]
//!   must not have modified its inputs or outputs
//! - Isolation: backends must not share mutable state between hash states

use std::fmt;

use thiserror::Error;

use crate::{
    algorithm::{AlgorithmSet, Direction, HashAlgorithm, SymmetricAlgorithm},
    config::CrcConfig,
    error::Error,
};

/// Length of a GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Identity reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Failures reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Engine temporarily unavailable. Nothing was modified.
    #[error("engine busy")]
    Busy,

    /// Engine failed while executing.
    #[error("engine fault: {reason}")]
    Fault {
        /// Description of the failure.
        reason: String,
    },

    /// GCM tag verification failed. Nothing was written.
    #[error("tag mismatch")]
    AuthFailed,
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Busy => Self::DeviceBusy,
            BackendError::Fault { reason } => Self::CryptoFault { reason },
            BackendError::AuthFailed => Self::AuthFailed,
        }
    }
}

/// Result alias for backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// A fully validated cipher request.
///
/// `key` has one of the supported AES lengths and `iv` has the mode's IV
/// length (empty for ECB). For block-aligned modes the buffer handed along
/// with the request is a whole number of blocks. Its `Debug` output shows
/// the key length, never the key.
#[derive(Clone, Copy)]
pub struct CipherRequest<'a> {
    /// Cipher mode.
    pub algorithm: SymmetricAlgorithm,
    /// Encrypt or decrypt.
    pub direction: Direction,
    /// Key bytes.
    pub key: &'a [u8],
    /// IV bytes.
    pub iv: &'a [u8],
}

impl fmt::Debug for CipherRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherRequest")
            .field("algorithm", &self.algorithm)
            .field("direction", &self.direction)
            .field("key", &format_args!("<{} bytes redacted>", self.key.len()))
            .field("iv", &self.iv)
            .finish()
    }
}

/// Raw operation set of a crypto accelerator.
///
/// Implementations are shared by reference between every context of a
/// device, so they take `&self` and serialise internally if the engine
/// requires it. Calls block until the engine completes.
pub trait Backend: Send + Sync {
    /// Partial hash state carried by a hash context between updates.
    type HashState: Clone + Send;

    /// Stable identity of this accelerator.
    fn id(&self) -> DeviceId;

    /// Algorithms this accelerator implements.
    fn capabilities(&self) -> AlgorithmSet;

    /// Whether the CRC engine supports a register of `width` bits.
    fn supports_crc_width(&self, width: u8) -> bool;

    /// Fills `buffer` from the entropy source.
    fn rng_fill(&self, buffer: &mut [u8]) -> BackendResult<()>;

    /// Computes a CRC over `data` in one shot.
    ///
    /// `config` has been validated and its width is supported.
    fn crc_compute(&self, config: &CrcConfig, data: &[u8]) -> BackendResult<u32>;

    /// Starts a new digest.
    fn hash_init(&self, algorithm: HashAlgorithm) -> BackendResult<Self::HashState>;

    /// Absorbs `data` into `state`.
    fn hash_update(&self, state: &mut Self::HashState, data: &[u8]) -> BackendResult<()>;

    /// Writes the full digest of `state` into `out`.
    ///
    /// `out` is exactly the algorithm's native digest length. `state` is left
    /// as it was so a failed finish can be retried.
    fn hash_finish(&self, state: &Self::HashState, out: &mut [u8]) -> BackendResult<()>;

    /// Encrypts or decrypts `buffer` in place with an unauthenticated mode.
    fn cipher_crypt(&self, request: CipherRequest<'_>, buffer: &mut [u8]) -> BackendResult<()>;

    /// GCM-encrypts `buffer` in place and returns the tag.
    fn gcm_seal(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
    ) -> BackendResult<[u8; TAG_LEN]>;

    /// Verifies `tag` and GCM-decrypts `buffer` in place.
    ///
    /// On [`BackendError::AuthFailed`] the buffer content is unspecified; the
    /// context discards it.
    fn gcm_open(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_LEN],
    ) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn backend_errors_map_to_context_errors() {
        assert_eq!(Error::from(BackendError::Busy), Error::DeviceBusy);
        assert_eq!(Error::from(BackendError::AuthFailed), Error::AuthFailed);
        assert_eq!(
            Error::from(BackendError::Fault { reason: "parity".to_string() }),
            Error::CryptoFault { reason: "parity".to_string() }
        );
    }

    #[test]
    fn cipher_request_debug_hides_the_key() {
        let key = hex!("2b7e151628aed2a6abf7158809cf4f3c");
        let iv = hex!("000102030405060708090a0b0c0d0e0f");
        let request = CipherRequest {
            algorithm: SymmetricAlgorithm::AesCbc,
            direction: Direction::Encrypt,
            key: &key,
            iv: &iv,
        };

        let printed = format!("{request:?}");
        assert!(printed.contains("<16 bytes redacted>"), "{printed}");
        assert!(!printed.contains("43, 126, 21"), "{printed}");
        assert!(printed.contains("AesCbc"), "{printed}");
    }

    #[test]
    fn device_id_displays_as_hex() {
        assert_eq!(DeviceId(0xAB).to_string(), "00000000000000ab");
    }
}
