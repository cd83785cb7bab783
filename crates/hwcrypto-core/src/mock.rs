//! Deterministic in-crate backend for unit tests.
//!
//! The "algorithms" here are trivial stand-ins (xor ciphers, byte-sum CRC) so
//! that the context state machines can be exercised without a real engine.

use std::sync::Mutex;

use crate::{
    algorithm::{AlgorithmSet, HashAlgorithm},
    backend::{Backend, BackendError, BackendResult, CipherRequest, DeviceId, TAG_LEN},
    config::CrcConfig,
};

pub(crate) struct MockBackend {
    capabilities: AlgorithmSet,
    fail_next: Mutex<Option<BackendError>>,
    counter: Mutex<u8>,
}

#[derive(Clone)]
pub(crate) struct MockHash {
    algorithm: HashAlgorithm,
    data: Vec<u8>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::without(AlgorithmSet::empty())
    }

    pub(crate) fn without(disabled: AlgorithmSet) -> Self {
        Self {
            capabilities: AlgorithmSet::all().difference(disabled),
            fail_next: Mutex::new(None),
            counter: Mutex::new(0),
        }
    }

    pub(crate) fn fail_next_with_busy(&self) {
        *self.fail_next.lock().unwrap() = Some(BackendError::Busy);
    }

    pub(crate) fn fail_next_with_fault(&self) {
        *self.fail_next.lock().unwrap() = Some(BackendError::Fault { reason: "injected".into() });
    }

    fn check(&self) -> BackendResult<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn xor(key: &[u8], buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte ^= key[i % key.len()];
        }
    }

    fn fold_tag(aad: &[u8], data: &[u8]) -> [u8; TAG_LEN] {
        let mut tag = [0u8; TAG_LEN];
        for (i, byte) in aad.iter().chain(data).enumerate() {
            tag[i % TAG_LEN] = tag[i % TAG_LEN].wrapping_add(*byte).rotate_left(3);
        }
        tag
    }
}

impl Backend for MockBackend {
    type HashState = MockHash;

    fn id(&self) -> DeviceId {
        DeviceId(0x4d4f_434b)
    }

    fn capabilities(&self) -> AlgorithmSet {
        self.capabilities
    }

    fn supports_crc_width(&self, width: u8) -> bool {
        matches!(width, 8 | 16 | 32)
    }

    fn rng_fill(&self, buffer: &mut [u8]) -> BackendResult<()> {
        self.check()?;
        let mut counter = self.counter.lock().unwrap();
        for byte in buffer {
            *byte = *counter;
            *counter = counter.wrapping_add(1);
        }
        Ok(())
    }

    fn crc_compute(&self, config: &CrcConfig, data: &[u8]) -> BackendResult<u32> {
        self.check()?;
        let sum = data.iter().fold(config.last_val, |acc, b| acc.wrapping_add(u32::from(*b)));
        Ok((sum ^ config.xorout) & config.mask())
    }

    fn hash_init(&self, algorithm: HashAlgorithm) -> BackendResult<MockHash> {
        self.check()?;
        Ok(MockHash { algorithm, data: Vec::new() })
    }

    fn hash_update(&self, state: &mut MockHash, data: &[u8]) -> BackendResult<()> {
        self.check()?;
        state.data.extend_from_slice(data);
        Ok(())
    }

    fn hash_finish(&self, state: &MockHash, out: &mut [u8]) -> BackendResult<()> {
        self.check()?;
        assert_eq!(out.len(), state.algorithm.digest_len());
        let tag = Self::fold_tag(&[], &state.data);
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = tag[i % TAG_LEN];
        }
        Ok(())
    }

    fn cipher_crypt(&self, request: CipherRequest<'_>, buffer: &mut [u8]) -> BackendResult<()> {
        self.check()?;
        // xor is its own inverse, direction does not matter
        Self::xor(request.key, buffer);
        Ok(())
    }

    fn gcm_seal(
        &self,
        key: &[u8],
        _nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
    ) -> BackendResult<[u8; TAG_LEN]> {
        self.check()?;
        Self::xor(key, buffer);
        Ok(Self::fold_tag(aad, buffer))
    }

    fn gcm_open(
        &self,
        key: &[u8],
        _nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_LEN],
    ) -> BackendResult<()> {
        self.check()?;
        if Self::fold_tag(aad, buffer) != *tag {
            return Err(BackendError::AuthFailed);
        }
        Self::xor(key, buffer);
        Ok(())
    }
}
