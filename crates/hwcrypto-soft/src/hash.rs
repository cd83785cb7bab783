//! SHA-2 digest engines.

use hwcrypto_core::{Algorithm, HashAlgorithm};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::error::SoftError;

/// Partial digest state carried by a hash context.
#[derive(Clone)]
pub enum SoftHash {
    /// SHA-224 state.
    Sha224(Sha224),
    /// SHA-256 state.
    Sha256(Sha256),
    /// SHA-384 state.
    Sha384(Sha384),
    /// SHA-512 state.
    Sha512(Sha512),
}

impl SoftHash {
    pub(crate) fn new(algorithm: HashAlgorithm) -> Result<Self, SoftError> {
        Ok(match algorithm {
            HashAlgorithm::Sha224 => Self::Sha224(Sha224::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => Self::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
            HashAlgorithm::Md5 | HashAlgorithm::Sha1 => {
                return Err(SoftError::NotImplemented(Algorithm::Hash(algorithm)));
            },
        })
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha224(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    /// Writes the digest of a copy of the state; `out` is the native length.
    pub(crate) fn finish_into(&self, out: &mut [u8]) {
        match self {
            Self::Sha224(h) => out.copy_from_slice(&h.clone().finalize()),
            Self::Sha256(h) => out.copy_from_slice(&h.clone().finalize()),
            Self::Sha384(h) => out.copy_from_slice(&h.clone().finalize()),
            Self::Sha512(h) => out.copy_from_slice(&h.clone().finalize()),
        }
    }
}

impl std::fmt::Debug for SoftHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sha224(_) => "Sha224",
            Self::Sha256(_) => "Sha256",
            Self::Sha384(_) => "Sha384",
            Self::Sha512(_) => "Sha512",
        };
        f.debug_tuple("SoftHash").field(&name).finish()
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn sha224_abc() {
        let mut state = SoftHash::new(HashAlgorithm::Sha224).unwrap();
        state.update(b"abc");
        let mut out = [0u8; 28];
        state.finish_into(&mut out);
        assert_eq!(out, hex!("23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"));
    }

    #[test]
    fn finish_leaves_state_reusable() {
        let mut state = SoftHash::new(HashAlgorithm::Sha512).unwrap();
        state.update(b"abc");
        let mut first = [0u8; 64];
        let mut second = [0u8; 64];
        state.finish_into(&mut first);
        state.finish_into(&mut second);
        assert_eq!(first, second);
        assert_eq!(first[..16], hex!("ddaf35a193617abacc417349ae204131"));
    }

    #[test]
    fn legacy_digests_are_not_implemented() {
        assert!(matches!(SoftHash::new(HashAlgorithm::Md5), Err(SoftError::NotImplemented(_))));
        assert!(matches!(SoftHash::new(HashAlgorithm::Sha1), Err(SoftError::NotImplemented(_))));
    }
}
