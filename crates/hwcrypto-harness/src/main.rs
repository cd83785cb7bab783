//! Crypto device validation binary.
//!
//! # Usage
//!
//! ```bash
//! # Run every check against the software device
//! hwcrypto-validate
//!
//! # Withhold algorithms; their checks are reported as skipped
//! hwcrypto-validate --disable aes-gcm sha384
//!
//! # Larger RNG sample, verbose output
//! RUST_LOG=debug hwcrypto-validate --rng-bytes 1024000 --rng-min-count 3000
//! ```

use std::process::ExitCode;

use clap::Parser;
use hwcrypto_core::{Algorithm, AlgorithmSet};
use hwcrypto_harness::{RetryPolicy, ValidationConfig, run_all};
use hwcrypto_soft::{SoftConfig, device_with};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crypto device validation
#[derive(Parser, Debug)]
#[command(name = "hwcrypto-validate")]
#[command(about = "Known-answer validation of the host crypto device")]
#[command(version)]
struct Args {
    /// Bytes drawn for the RNG uniformity check
    #[arg(long, default_value_t = ValidationConfig::DEFAULT_RNG_SAMPLE_BYTES)]
    rng_bytes: usize,

    /// Minimum occurrences of every byte value in the RNG sample
    #[arg(long, default_value_t = ValidationConfig::DEFAULT_RNG_MIN_COUNT)]
    rng_min_count: usize,

    /// Attempts per operation while the device reports busy (1 disables retry)
    #[arg(long, default_value_t = 1)]
    retries: u32,

    /// Algorithms to withhold from the device (e.g. aes-gcm, sha384)
    #[arg(long, num_args = 1.., value_parser = parse_algorithm)]
    disable: Vec<Algorithm>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_algorithm(name: &str) -> Result<Algorithm, String> {
    Algorithm::from_name(name).ok_or_else(|| format!("unknown algorithm '{name}'"))
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let disabled: AlgorithmSet = args.disable.iter().copied().collect();
    if !disabled.is_empty() {
        tracing::info!(?disabled, "withholding algorithms");
    }
    let device = device_with(SoftConfig::default().without(disabled));

    let retry = if args.retries > 1 {
        RetryPolicy::Retry { max_attempts: args.retries }
    } else {
        RetryPolicy::None
    };
    let config = ValidationConfig {
        rng_sample_bytes: args.rng_bytes,
        rng_min_count: args.rng_min_count,
        retry,
    };

    let report = run_all(&device, &config);
    if report.is_success() {
        return ExitCode::SUCCESS;
    }

    let failed: Vec<&str> = report
        .outcomes()
        .iter()
        .filter(|outcome| outcome.failed())
        .map(|outcome| outcome.name)
        .collect();
    tracing::error!(?failed, "validation failed");
    ExitCode::FAILURE
}
