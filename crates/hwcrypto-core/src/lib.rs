//! Hardware Crypto Context Layer
//!
//! This crate provides a single dispatch contract over the primitives a crypto
//! accelerator offers: true-random generation, CRC checksums, cryptographic
//! hashing and AES ciphers.
//!
//! # Design
//!
//! A caller obtains a [`Device`], opens a typed [`Context`] for one
//! [`Algorithm`], drives it through its family's protocol and destroys it.
//! The core never computes cryptography itself. It validates sequencing and
//! sizes, then forwards checked requests to a [`Backend`]:
//!
//! - Hardware drivers implement [`Backend`] over their engines
//! - A software accelerator lives in a separate crate
//! - Tests use deterministic, fault-injecting backends
//!
//! # Guarantees
//!
//! - Family safety: a context is bound to one family for its whole life and
//!   rejects operations of other families with [`Error::WrongFamily`]
//! - No partial writes: on error, caller output buffers are left untouched
//! - Key hygiene: key material is wiped when a context is destroyed or dropped
//! - No leaks: every created context is counted until it is released

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod backend;
pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod op;

#[cfg(test)]
mod mock;

pub use algorithm::{
    Algorithm, AlgorithmSet, CrcAlgorithm, Direction, Family, HashAlgorithm, SymmetricAlgorithm,
};
pub use backend::{Backend, BackendError, BackendResult, CipherRequest, DeviceId, TAG_LEN};
pub use config::{CrcConfig, CrcFlags, KeySize};
pub use context::{Context, Phase};
pub use device::Device;
pub use error::{Error, Result};
pub use op::{Request, Response};
