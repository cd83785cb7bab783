//! Validation run configuration.

use crate::retry::RetryPolicy;

/// Parameters of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Bytes drawn for the RNG uniformity check.
    pub rng_sample_bytes: usize,
    /// Minimum count every byte value must reach in the sample.
    pub rng_min_count: usize,
    /// How busy operations are retried.
    pub retry: RetryPolicy,
}

impl ValidationConfig {
    /// Default RNG sample size.
    pub const DEFAULT_RNG_SAMPLE_BYTES: usize = 256_000;

    /// Default per-value minimum. The sample averages 1000 per value; 700
    /// is about ten standard deviations below that.
    pub const DEFAULT_RNG_MIN_COUNT: usize = 700;
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            rng_sample_bytes: Self::DEFAULT_RNG_SAMPLE_BYTES,
            rng_min_count: Self::DEFAULT_RNG_MIN_COUNT,
            retry: RetryPolicy::None,
        }
    }
}
