//! Software Crypto Accelerator
//!
//! This crate provides [`SoftBackend`], a [`Backend`](hwcrypto_core::Backend)
//! built on the RustCrypto crates and the OS entropy source, and the device
//! discovery entry point [`default_device`].
//!
//! # Engines
//!
//! - RNG: `getrandom`
//! - CRC: parametric table-driven engine, widths 8, 16 and 32
//! - Hash: SHA-224, SHA-256, SHA-384 and SHA-512 via `sha2`
//! - Cipher: AES-ECB, AES-CBC and AES-CTR via `aes`, `cbc` and `ctr`;
//!   AES-GCM via `aes-gcm`
//!
//! MD5, SHA-1 and AES-CFB are never advertised.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use hwcrypto_core::Device;

mod backend;
mod cipher;
pub mod config;
pub mod crc;
pub mod error;
pub mod hash;

pub use backend::SoftBackend;
pub use config::{DEFAULT_DEVICE_ID, SoftConfig};
pub use error::SoftError;
pub use hash::SoftHash;

/// Discovers the host's crypto device.
///
/// Always yields a software device advertising every implemented algorithm.
pub fn default_device() -> Device<SoftBackend> {
    device_with(SoftConfig::default())
}

/// Builds a software device from `config`.
pub fn device_with(config: SoftConfig) -> Device<SoftBackend> {
    let device = Device::new(SoftBackend::new(config));
    tracing::info!(
        id = %device.id(),
        algorithms = device.capabilities().algorithms().count(),
        "software crypto device ready"
    );
    device
}
