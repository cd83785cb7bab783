//! Software engine failures.

use hwcrypto_core::{Algorithm, BackendError};
use thiserror::Error;

/// Failures inside the software engines.
///
/// All of them surface to contexts as [`BackendError::Fault`]; the context
/// layer validates inputs before they get here, so each one indicates a bug
/// or a broken host rather than caller error.
#[derive(Debug, Error)]
pub enum SoftError {
    /// The algorithm has no software implementation.
    #[error("{0} has no software implementation")]
    NotImplemented(Algorithm),

    /// A cipher rejected the key or IV length.
    #[error("cipher rejected key or IV length")]
    Length(#[from] aes::cipher::InvalidLength),

    /// Block-aligned mode given a partial block.
    #[error("input is not block aligned")]
    Unaligned,

    /// The OS entropy source failed.
    #[error("entropy source failed: {0}")]
    Entropy(getrandom::Error),

    /// The engine lock was poisoned by a panicking caller.
    #[error("engine lock poisoned")]
    Poisoned,
}

impl From<SoftError> for BackendError {
    fn from(err: SoftError) -> Self {
        tracing::warn!(error = %err, "software engine fault");
        Self::Fault { reason: err.to_string() }
    }
}
