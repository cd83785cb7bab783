//! Deterministic simulated accelerator.
//!
//! [`SimBackend`] answers RNG requests from a seeded ChaCha20 stream and
//! forwards every other primitive to [`SoftBackend`]. On top of that it can
//! inject the two failure modes a real accelerator exhibits:
//!
//! - Busy: every `busy_every`-th data operation returns
//!   [`BackendError::Busy`] without touching its inputs
//! - Fault: every data operation after the `fault_after`-th returns
//!   [`BackendError::Fault`]
//!
//! Data operations are RNG fills, CRC computes, hash updates and finishes,
//! and cipher calls. Starting a hash is not counted, so context creation
//! never fails by injection.
//!
//! # Reproducibility
//!
//! Given the same [`SimConfig`] and the same call sequence, a simulated
//! device produces the same random bytes and the same injected failures.
//! The seed is logged when the backend is built.

use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use hwcrypto_core::{
    AlgorithmSet, Backend, BackendError, BackendResult, CipherRequest, CrcConfig, Device, DeviceId,
    HashAlgorithm, TAG_LEN,
};
use hwcrypto_soft::{SoftBackend, SoftConfig, SoftHash};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Identity reported by simulated devices.
pub const SIM_DEVICE_ID: DeviceId = DeviceId(0x7369_6d00_0000_0001);

/// Simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Seed of the RNG stream.
    pub seed: u64,
    /// Every N-th data operation reports busy. `None` or zero disables it.
    pub busy_every: Option<u64>,
    /// Data operations after the N-th report a fault. `None` disables it.
    pub fault_after: Option<u64>,
}

impl SimConfig {
    /// A fault-free simulation with the given seed.
    pub const fn seeded(seed: u64) -> Self {
        Self { seed, busy_every: None, fault_after: None }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::seeded(0)
    }
}

/// A seeded, fault-injecting [`Backend`].
pub struct SimBackend {
    config: SimConfig,
    inner: SoftBackend,
    rng: Mutex<ChaCha20Rng>,
    operations: AtomicU64,
}

impl SimBackend {
    /// Creates a simulated backend advertising every software algorithm.
    pub fn new(config: SimConfig) -> Self {
        Self::with_algorithms(config, SoftConfig::default())
    }

    /// Creates a simulated backend advertising the algorithms of `soft`.
    pub fn with_algorithms(config: SimConfig, soft: SoftConfig) -> Self {
        tracing::info!(
            seed = config.seed,
            busy_every = ?config.busy_every,
            fault_after = ?config.fault_after,
            "simulated crypto device"
        );
        Self {
            config,
            inner: SoftBackend::new(SoftConfig { id: SIM_DEVICE_ID, ..soft }),
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(config.seed)),
            operations: AtomicU64::new(0),
        }
    }

    /// Simulation parameters.
    pub fn config(&self) -> SimConfig {
        self.config
    }

    /// Number of data operations issued so far, including failed ones.
    pub fn operations(&self) -> u64 {
        self.operations.load(Ordering::Acquire)
    }

    fn inject(&self, op: &'static str) -> BackendResult<()> {
        let n = self.operations.fetch_add(1, Ordering::AcqRel) + 1;

        if self.config.fault_after.is_some_and(|after| n > after) {
            tracing::debug!(op, n, "injecting fault");
            return Err(BackendError::Fault { reason: format!("injected fault at operation {n}") });
        }
        if self.config.busy_every.is_some_and(|every| every != 0 && n % every == 0) {
            tracing::trace!(op, n, "injecting busy");
            return Err(BackendError::Busy);
        }
        Ok(())
    }
}

impl std::fmt::Debug for SimBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimBackend")
            .field("config", &self.config)
            .field("operations", &self.operations())
            .finish_non_exhaustive()
    }
}

impl Backend for SimBackend {
    type HashState = SoftHash;

    fn id(&self) -> DeviceId {
        self.inner.id()
    }

    fn capabilities(&self) -> AlgorithmSet {
        self.inner.capabilities()
    }

    fn supports_crc_width(&self, width: u8) -> bool {
        self.inner.supports_crc_width(width)
    }

    fn rng_fill(&self, buffer: &mut [u8]) -> BackendResult<()> {
        self.inject("rng_fill")?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| BackendError::Fault { reason: "RNG lock poisoned".to_string() })?;
        rng.fill_bytes(buffer);
        Ok(())
    }

    fn crc_compute(&self, config: &CrcConfig, data: &[u8]) -> BackendResult<u32> {
        self.inject("crc_compute")?;
        self.inner.crc_compute(config, data)
    }

    fn hash_init(&self, algorithm: HashAlgorithm) -> BackendResult<SoftHash> {
        self.inner.hash_init(algorithm)
    }

    fn hash_update(&self, state: &mut SoftHash, data: &[u8]) -> BackendResult<()> {
        self.inject("hash_update")?;
        self.inner.hash_update(state, data)
    }

    fn hash_finish(&self, state: &SoftHash, out: &mut [u8]) -> BackendResult<()> {
        self.inject("hash_finish")?;
        self.inner.hash_finish(state, out)
    }

    fn cipher_crypt(&self, request: CipherRequest<'_>, buffer: &mut [u8]) -> BackendResult<()> {
        self.inject("cipher_crypt")?;
        self.inner.cipher_crypt(request, buffer)
    }

    fn gcm_seal(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
    ) -> BackendResult<[u8; TAG_LEN]> {
        self.inject("gcm_seal")?;
        self.inner.gcm_seal(key, nonce, aad, buffer)
    }

    fn gcm_open(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_LEN],
    ) -> BackendResult<()> {
        self.inject("gcm_open")?;
        self.inner.gcm_open(key, nonce, aad, buffer, tag)
    }
}

/// Builds a simulated device.
pub fn sim_device(config: SimConfig) -> Device<SimBackend> {
    Device::new(SimBackend::new(config))
}
