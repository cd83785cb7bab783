//! Software accelerator implementing [`Backend`].

use std::sync::{Mutex, MutexGuard};

use hwcrypto_core::{
    AlgorithmSet, Backend, BackendError, BackendResult, CipherRequest, CrcConfig, DeviceId,
    HashAlgorithm, TAG_LEN,
};

use crate::{cipher, config::SoftConfig, crc::CrcEngine, error::SoftError, hash::SoftHash};

/// A crypto accelerator emulated in software.
///
/// Operations are serialised through one engine lock, mirroring a device
/// with a single request queue. Calls block until the engine is free.
pub struct SoftBackend {
    config: SoftConfig,
    engine: Mutex<()>,
}

impl SoftBackend {
    /// Creates a backend advertising the implemented subset of
    /// `config.algorithms`.
    pub fn new(config: SoftConfig) -> Self {
        let config = SoftConfig { algorithms: config.effective_algorithms(), ..config };
        Self { config, engine: Mutex::new(()) }
    }

    fn engine(&self) -> Result<MutexGuard<'_, ()>, SoftError> {
        self.engine.lock().map_err(|_| SoftError::Poisoned)
    }
}

impl Default for SoftBackend {
    fn default() -> Self {
        Self::new(SoftConfig::default())
    }
}

impl std::fmt::Debug for SoftBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftBackend").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Backend for SoftBackend {
    type HashState = SoftHash;

    fn id(&self) -> DeviceId {
        self.config.id
    }

    fn capabilities(&self) -> AlgorithmSet {
        self.config.algorithms
    }

    fn supports_crc_width(&self, width: u8) -> bool {
        matches!(width, 8 | 16 | 32)
    }

    fn rng_fill(&self, buffer: &mut [u8]) -> BackendResult<()> {
        let _engine = self.engine()?;
        getrandom::fill(buffer).map_err(|err| {
            tracing::error!(error = %err, len = buffer.len(), "entropy source failed");
            SoftError::Entropy(err)
        })?;
        Ok(())
    }

    fn crc_compute(&self, config: &CrcConfig, data: &[u8]) -> BackendResult<u32> {
        let _engine = self.engine()?;
        Ok(CrcEngine::new(*config).compute(data))
    }

    fn hash_init(&self, algorithm: HashAlgorithm) -> BackendResult<SoftHash> {
        Ok(SoftHash::new(algorithm)?)
    }

    fn hash_update(&self, state: &mut SoftHash, data: &[u8]) -> BackendResult<()> {
        let _engine = self.engine()?;
        state.update(data);
        Ok(())
    }

    fn hash_finish(&self, state: &SoftHash, out: &mut [u8]) -> BackendResult<()> {
        let _engine = self.engine()?;
        state.finish_into(out);
        Ok(())
    }

    fn cipher_crypt(&self, request: CipherRequest<'_>, buffer: &mut [u8]) -> BackendResult<()> {
        let _engine = self.engine()?;
        Ok(cipher::crypt(request, buffer)?)
    }

    fn gcm_seal(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
    ) -> BackendResult<[u8; TAG_LEN]> {
        let _engine = self.engine()?;
        Ok(cipher::gcm_seal(key, nonce, aad, buffer)?)
    }

    fn gcm_open(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_LEN],
    ) -> BackendResult<()> {
        let _engine = self.engine()?;
        if cipher::gcm_open(key, nonce, aad, buffer, tag)? {
            Ok(())
        } else {
            tracing::debug!(aad_len = aad.len(), len = buffer.len(), "GCM tag mismatch");
            Err(BackendError::AuthFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use hwcrypto_core::CrcAlgorithm;

    use super::*;

    #[test]
    fn capabilities_are_clamped_to_implemented() {
        let config = SoftConfig { algorithms: AlgorithmSet::all(), ..SoftConfig::default() };
        let backend = SoftBackend::new(config);
        assert!(!backend.capabilities().contains(AlgorithmSet::SHA1));
        assert!(backend.capabilities().contains(AlgorithmSet::SHA384));
    }

    #[test]
    fn rng_fills_the_whole_buffer() {
        let backend = SoftBackend::default();
        let mut buffer = [0u8; 64];
        backend.rng_fill(&mut buffer).unwrap();
        // 64 zero bytes from a working entropy source is vanishingly unlikely.
        assert_ne!(buffer, [0u8; 64]);
    }

    #[test]
    fn crc_uses_the_given_parameters() {
        let backend = SoftBackend::default();
        let crc = backend.crc_compute(&CrcConfig::preset(CrcAlgorithm::Crc32), &[1, 2, 3, 4]);
        assert_eq!(crc, Ok(0xB63C_FBCD));
    }

    #[test]
    fn unimplemented_hash_is_a_fault() {
        let backend = SoftBackend::default();
        assert!(matches!(backend.hash_init(HashAlgorithm::Md5), Err(BackendError::Fault { .. })));
    }
}
