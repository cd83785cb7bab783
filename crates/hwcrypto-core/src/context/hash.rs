//! Streaming digests.

use super::{Context, Phase, State};
use crate::{
    algorithm::{Algorithm, Family},
    backend::Backend,
    error::{Error, Result},
};

#[derive(Clone)]
pub(crate) enum HashState<H> {
    Active { inner: H, fed: bool },
    Finished { digest: Vec<u8> },
}

impl<H> HashState<H> {
    pub(crate) fn fresh(inner: H) -> Self {
        Self::Active { inner, fed: false }
    }

    pub(crate) fn phase(&self) -> Phase {
        match self {
            Self::Active { fed: false, .. } => Phase::Created,
            Self::Active { .. } => Phase::Active,
            Self::Finished { .. } => Phase::Finished,
        }
    }
}

impl<B: Backend> Context<'_, B> {
    /// Absorbs `data` into the running digest.
    ///
    /// Fails with [`Error::InvalidState`] once the digest has been finished.
    /// [`Error::DeviceBusy`] leaves the partial digest as it was.
    pub fn hash_update(&mut self, data: &[u8]) -> Result<()> {
        let algorithm = self.algorithm;
        let backend = self.backend();
        let State::Hash(hash) = &mut self.state else {
            return Err(self.state.misuse(algorithm, Family::Hash));
        };
        let HashState::Active { inner, fed } = hash else {
            return Err(Error::InvalidState { reason: "hash already finished" });
        };

        // Work on a copy so a busy or faulted engine cannot leave a half-fed state.
        let mut next = inner.clone();
        let result = backend.hash_update(&mut next, data).map_err(Error::from);
        if result.is_ok() {
            *inner = next;
            *fed = true;
        }
        self.guard(result)
    }

    /// Finalises the digest and writes its first `digest_len` bytes to `out`.
    ///
    /// `digest_len` must be in `1..=native size` and `out` must hold at least
    /// that many bytes, otherwise [`Error::InvalidLength`]. Finishing twice
    /// fails with [`Error::InvalidState`] and leaves `out` untouched.
    pub fn hash_finish(&mut self, out: &mut [u8], digest_len: usize) -> Result<usize> {
        let algorithm = self.algorithm;
        let backend = self.backend();
        let State::Hash(hash) = &mut self.state else {
            return Err(self.state.misuse(algorithm, Family::Hash));
        };
        let HashState::Active { inner, .. } = hash else {
            return Err(Error::InvalidState { reason: "hash already finished" });
        };
        let Algorithm::Hash(id) = algorithm else {
            return Err(Error::InvalidState { reason: "hash state on non-hash algorithm" });
        };

        let native = id.digest_len();
        if digest_len == 0 || digest_len > native {
            return Err(Error::InvalidLength {
                len: digest_len,
                reason: "digest length outside 1..=native size",
            });
        }
        if out.len() < digest_len {
            return Err(Error::InvalidLength {
                len: out.len(),
                reason: "output shorter than digest",
            });
        }

        let mut full = vec![0u8; native];
        let result = backend.hash_finish(inner, &mut full).map_err(Error::from);
        if result.is_ok() {
            full.truncate(digest_len);
            out[..digest_len].copy_from_slice(&full);
            *hash = HashState::Finished { digest: full };
        }
        self.guard(result).map(|()| digest_len)
    }

    /// Digest produced by [`hash_finish`](Self::hash_finish), truncated to the
    /// requested length.
    pub fn digest(&self) -> Option<&[u8]> {
        match &self.state {
            State::Hash(HashState::Finished { digest }) => Some(digest),
            _ => None,
        }
    }

    /// Discards any partial or finished digest and starts over.
    pub fn hash_reset(&mut self) -> Result<()> {
        let algorithm = self.algorithm;
        let backend = self.backend();
        let State::Hash(hash) = &mut self.state else {
            return Err(self.state.misuse(algorithm, Family::Hash));
        };
        let Algorithm::Hash(id) = algorithm else {
            return Err(Error::InvalidState { reason: "hash state on non-hash algorithm" });
        };

        let result = backend.hash_init(id).map_err(Error::from);
        let result = result.map(|inner| *hash = HashState::fresh(inner));
        self.guard(result)
    }
}
