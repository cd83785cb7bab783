//! Retry policy for transient device errors.
//!
//! Only [`Error::DeviceBusy`] is retried. Every other error, including
//! [`Error::CryptoFault`], is returned on first occurrence.
//!
//! [`Error::DeviceBusy`]: hwcrypto_core::Error::DeviceBusy
//! [`Error::CryptoFault`]: hwcrypto_core::Error::CryptoFault

use hwcrypto_core::Result;

/// Policy for operations that fail with
/// [`Error::DeviceBusy`](hwcrypto_core::Error::DeviceBusy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Return the first error.
    #[default]
    None,

    /// Re-issue busy operations.
    Retry {
        /// Total attempts including the first one.
        max_attempts: u32,
    },
}

impl RetryPolicy {
    /// Maximum number of times an operation is issued.
    pub const fn max_attempts(self) -> u32 {
        match self {
            Self::None => 1,
            Self::Retry { max_attempts } => {
                if max_attempts == 0 {
                    1
                } else {
                    max_attempts
                }
            },
        }
    }

    /// Runs `op` until it returns something other than
    /// [`Error::DeviceBusy`](hwcrypto_core::Error::DeviceBusy) or the attempts
    /// are exhausted.
    ///
    /// Operations that fail busy leave the context untouched, so re-issuing
    /// the same call is always safe.
    pub fn run<T>(self, label: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;
        loop {
            match op() {
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    tracing::debug!(op = label, attempt, max_attempts, "device busy, retrying");
                    attempt += 1;
                },
                Err(err) => {
                    if err.is_retryable() {
                        tracing::warn!(op = label, attempts = attempt, "device still busy");
                    }
                    return Err(err);
                },
                Ok(value) => return Ok(value),
            }
        }
    }
}
