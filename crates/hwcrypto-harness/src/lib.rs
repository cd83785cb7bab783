//! Validation harness for hwcrypto devices.
//!
//! This crate exercises a [`Device`](hwcrypto_core::Device) from the outside,
//! the way bring-up and acceptance tests of an accelerator do:
//!
//! - Known-answer checks: CRC, SHA-256, AES-ECB and AES-GCM vectors plus an
//!   RNG uniformity smoke check, collected into a [`ValidationReport`]
//! - Simulation: [`SimBackend`], a seeded backend that injects busy and
//!   fault responses on a schedule
//! - Model-based testing: a reference state machine ([`ModelWorld`]) that
//!   predicts the outcome of every context operation
//!
//! The `hwcrypto-validate` binary runs the checks against the software
//! device and exits non-zero when any of them fails.
//!
//! # Example
//!
//! ```rust
//! use hwcrypto_harness::{ValidationConfig, run_all};
//!
//! let device = hwcrypto_soft::default_device();
//! let config =
//!     ValidationConfig { rng_sample_bytes: 25_600, rng_min_count: 40, ..Default::default() };
//! let report = run_all(&device, &config);
//! assert!(report.is_success());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checks;
pub mod config;
pub mod model;
pub mod report;
pub mod retry;
pub mod sim;
pub mod vectors;

pub use checks::run_all;
pub use config::ValidationConfig;
pub use model::{
    ModelContext, ModelWorld, ObservableState, Operation, OperationError, OperationResult,
    RealWorld, SmallData,
};
pub use report::{CheckOutcome, CheckStatus, ValidationReport};
pub use retry::RetryPolicy;
pub use sim::{SimBackend, SimConfig, sim_device};

/// Installs a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
/// `RUST_LOG` selects the level, defaulting to `debug`.
pub fn init_test_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        // Another subscriber may already be installed by the test binary.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_test_writer()
            .try_init();
    });
}
