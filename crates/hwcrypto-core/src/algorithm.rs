//! Algorithm identifiers and capability sets.
//!
//! An [`Algorithm`] names one concrete primitive a device may implement. Its
//! [`Family`] is derived, never supplied separately, so a context can never
//! be created with a family that disagrees with its algorithm.

use std::fmt;

use bitflags::bitflags;

/// Coarse primitive category that decides which operation protocol a context
/// follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// True random number generation.
    Rng,
    /// Cyclic redundancy checks.
    Crc,
    /// Cryptographic hashing.
    Hash,
    /// Symmetric block ciphers.
    Symmetric,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rng => "rng",
            Self::Crc => "crc",
            Self::Hash => "hash",
            Self::Symmetric => "symmetric",
        };
        f.write_str(name)
    }
}

/// CRC algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrcAlgorithm {
    /// CRC-8, polynomial 0x07.
    Crc8,
    /// CRC-16/ARC, polynomial 0x8005, reflected.
    Crc16,
    /// CRC-32 (ISO 3309), polynomial 0x04C11DB7, reflected.
    Crc32,
    /// CRC-16/CCITT-FALSE, polynomial 0x1021.
    Ccitt,
    /// CRC-16/DNP, polynomial 0x3D65, reflected.
    Dnp,
}

impl CrcAlgorithm {
    /// Register width in bits.
    pub const fn width(self) -> u8 {
        match self {
            Self::Crc8 => 8,
            Self::Crc16 | Self::Ccitt | Self::Dnp => 16,
            Self::Crc32 => 32,
        }
    }
}

/// Hash algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5 (legacy).
    Md5,
    /// SHA-1 (legacy).
    Sha1,
    /// SHA-224.
    Sha224,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// Native digest size in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

/// Symmetric cipher identifiers. All are AES modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymmetricAlgorithm {
    /// Electronic codebook.
    AesEcb,
    /// Cipher block chaining.
    AesCbc,
    /// Cipher feedback.
    AesCfb,
    /// Counter mode.
    AesCtr,
    /// Galois/counter mode (authenticated).
    AesGcm,
}

impl SymmetricAlgorithm {
    /// Cipher block size in bytes.
    pub const BLOCK_SIZE: usize = 16;

    /// Required IV length, or `None` when the mode takes no IV.
    pub const fn iv_len(self) -> Option<usize> {
        match self {
            Self::AesEcb => None,
            Self::AesCbc | Self::AesCfb | Self::AesCtr => Some(16),
            Self::AesGcm => Some(12),
        }
    }

    /// Whether input must be a whole number of blocks (no padding support).
    pub const fn requires_block_multiple(self) -> bool {
        matches!(self, Self::AesEcb | Self::AesCbc)
    }

    /// Whether the mode produces an authentication tag.
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::AesGcm)
    }

    /// Whether the keystream is derived from the IV, so two encryptions
    /// under one key and IV repeat it.
    pub const fn requires_unique_iv(self) -> bool {
        matches!(self, Self::AesCfb | Self::AesCtr | Self::AesGcm)
    }
}

/// A concrete algorithm a device may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Hardware entropy source.
    Rng,
    /// Checksum engine.
    Crc(CrcAlgorithm),
    /// Digest engine.
    Hash(HashAlgorithm),
    /// Cipher engine.
    Symmetric(SymmetricAlgorithm),
}

impl Algorithm {
    /// Every algorithm identifier, in capability-bit order.
    pub const ALL: [Self; 17] = [
        Self::Rng,
        Self::Crc(CrcAlgorithm::Crc8),
        Self::Crc(CrcAlgorithm::Crc16),
        Self::Crc(CrcAlgorithm::Crc32),
        Self::Crc(CrcAlgorithm::Ccitt),
        Self::Crc(CrcAlgorithm::Dnp),
        Self::Hash(HashAlgorithm::Md5),
        Self::Hash(HashAlgorithm::Sha1),
        Self::Hash(HashAlgorithm::Sha224),
        Self::Hash(HashAlgorithm::Sha256),
        Self::Hash(HashAlgorithm::Sha384),
        Self::Hash(HashAlgorithm::Sha512),
        Self::Symmetric(SymmetricAlgorithm::AesEcb),
        Self::Symmetric(SymmetricAlgorithm::AesCbc),
        Self::Symmetric(SymmetricAlgorithm::AesCfb),
        Self::Symmetric(SymmetricAlgorithm::AesCtr),
        Self::Symmetric(SymmetricAlgorithm::AesGcm),
    ];

    /// Family this algorithm belongs to.
    pub const fn family(self) -> Family {
        match self {
            Self::Rng => Family::Rng,
            Self::Crc(_) => Family::Crc,
            Self::Hash(_) => Family::Hash,
            Self::Symmetric(_) => Family::Symmetric,
        }
    }

    /// Capability bit for this algorithm.
    pub const fn flag(self) -> AlgorithmSet {
        match self {
            Self::Rng => AlgorithmSet::RNG,
            Self::Crc(crc) => match crc {
                CrcAlgorithm::Crc8 => AlgorithmSet::CRC8,
                CrcAlgorithm::Crc16 => AlgorithmSet::CRC16,
                CrcAlgorithm::Crc32 => AlgorithmSet::CRC32,
                CrcAlgorithm::Ccitt => AlgorithmSet::CCITT,
                CrcAlgorithm::Dnp => AlgorithmSet::DNP,
            },
            Self::Hash(hash) => match hash {
                HashAlgorithm::Md5 => AlgorithmSet::MD5,
                HashAlgorithm::Sha1 => AlgorithmSet::SHA1,
                HashAlgorithm::Sha224 => AlgorithmSet::SHA224,
                HashAlgorithm::Sha256 => AlgorithmSet::SHA256,
                HashAlgorithm::Sha384 => AlgorithmSet::SHA384,
                HashAlgorithm::Sha512 => AlgorithmSet::SHA512,
            },
            Self::Symmetric(sym) => match sym {
                SymmetricAlgorithm::AesEcb => AlgorithmSet::AES_ECB,
                SymmetricAlgorithm::AesCbc => AlgorithmSet::AES_CBC,
                SymmetricAlgorithm::AesCfb => AlgorithmSet::AES_CFB,
                SymmetricAlgorithm::AesCtr => AlgorithmSet::AES_CTR,
                SymmetricAlgorithm::AesGcm => AlgorithmSet::AES_GCM,
            },
        }
    }

    /// Stable lowercase name, also accepted by [`Algorithm::from_name`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rng => "rng",
            Self::Crc(crc) => match crc {
                CrcAlgorithm::Crc8 => "crc8",
                CrcAlgorithm::Crc16 => "crc16",
                CrcAlgorithm::Crc32 => "crc32",
                CrcAlgorithm::Ccitt => "ccitt",
                CrcAlgorithm::Dnp => "dnp",
            },
            Self::Hash(hash) => match hash {
                HashAlgorithm::Md5 => "md5",
                HashAlgorithm::Sha1 => "sha1",
                HashAlgorithm::Sha224 => "sha224",
                HashAlgorithm::Sha256 => "sha256",
                HashAlgorithm::Sha384 => "sha384",
                HashAlgorithm::Sha512 => "sha512",
            },
            Self::Symmetric(sym) => match sym {
                SymmetricAlgorithm::AesEcb => "aes-ecb",
                SymmetricAlgorithm::AesCbc => "aes-cbc",
                SymmetricAlgorithm::AesCfb => "aes-cfb",
                SymmetricAlgorithm::AesCtr => "aes-ctr",
                SymmetricAlgorithm::AesGcm => "aes-gcm",
            },
        }
    }

    /// Looks up an algorithm by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|algo| algo.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of algorithms, one bit per [`Algorithm`].
    ///
    /// A device's capability table is an `AlgorithmSet`; it is fixed when the
    /// device is constructed.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AlgorithmSet: u32 {
        /// Entropy source.
        const RNG = 1 << 0;
        /// CRC-8.
        const CRC8 = 1 << 1;
        /// CRC-16/ARC.
        const CRC16 = 1 << 2;
        /// CRC-32.
        const CRC32 = 1 << 3;
        /// CRC-16/CCITT-FALSE.
        const CCITT = 1 << 4;
        /// CRC-16/DNP.
        const DNP = 1 << 5;
        /// MD5.
        const MD5 = 1 << 6;
        /// SHA-1.
        const SHA1 = 1 << 7;
        /// SHA-224.
        const SHA224 = 1 << 8;
        /// SHA-256.
        const SHA256 = 1 << 9;
        /// SHA-384.
        const SHA384 = 1 << 10;
        /// SHA-512.
        const SHA512 = 1 << 11;
        /// AES-ECB.
        const AES_ECB = 1 << 12;
        /// AES-CBC.
        const AES_CBC = 1 << 13;
        /// AES-CFB.
        const AES_CFB = 1 << 14;
        /// AES-CTR.
        const AES_CTR = 1 << 15;
        /// AES-GCM.
        const AES_GCM = 1 << 16;
    }
}

impl AlgorithmSet {
    /// Whether `algorithm` is in the set.
    pub const fn has(self, algorithm: Algorithm) -> bool {
        self.contains(algorithm.flag())
    }

    /// Iterates the algorithms in the set.
    pub fn algorithms(self) -> impl Iterator<Item = Algorithm> {
        Algorithm::ALL.into_iter().filter(move |algo| self.has(*algo))
    }
}

impl FromIterator<Algorithm> for AlgorithmSet {
    fn from_iter<T: IntoIterator<Item = Algorithm>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), |set, algo| set | algo.flag())
    }
}

/// Cipher direction, chosen per `crypt` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Plaintext to ciphertext.
    Encrypt,
    /// Ciphertext to plaintext.
    Decrypt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_algorithm_has_a_distinct_flag() {
        let mut seen = AlgorithmSet::empty();
        for algo in Algorithm::ALL {
            assert!(!seen.intersects(algo.flag()), "{algo} shares a capability bit");
            seen |= algo.flag();
        }
        assert_eq!(seen, AlgorithmSet::all());
    }

    #[test]
    fn family_follows_algorithm() {
        assert_eq!(Algorithm::Rng.family(), Family::Rng);
        assert_eq!(Algorithm::Crc(CrcAlgorithm::Dnp).family(), Family::Crc);
        assert_eq!(Algorithm::Hash(HashAlgorithm::Sha256).family(), Family::Hash);
        assert_eq!(Algorithm::Symmetric(SymmetricAlgorithm::AesGcm).family(), Family::Symmetric);
    }

    #[test]
    fn names_round_trip() {
        for algo in Algorithm::ALL {
            assert_eq!(Algorithm::from_name(algo.name()), Some(algo));
        }
        assert_eq!(
            Algorithm::from_name("AES-GCM"),
            Some(Algorithm::Symmetric(SymmetricAlgorithm::AesGcm))
        );
        assert_eq!(Algorithm::from_name("rc4"), None);
    }

    #[test]
    fn set_collects_and_iterates() {
        let set: AlgorithmSet =
            [Algorithm::Rng, Algorithm::Hash(HashAlgorithm::Sha256)].into_iter().collect();
        assert!(set.has(Algorithm::Rng));
        assert!(!set.has(Algorithm::Hash(HashAlgorithm::Sha512)));
        assert_eq!(set.algorithms().count(), 2);
    }

    #[test]
    fn mode_properties() {
        assert_eq!(SymmetricAlgorithm::AesEcb.iv_len(), None);
        assert_eq!(SymmetricAlgorithm::AesGcm.iv_len(), Some(12));
        assert!(SymmetricAlgorithm::AesCbc.requires_block_multiple());
        assert!(!SymmetricAlgorithm::AesCtr.requires_block_multiple());
        assert!(SymmetricAlgorithm::AesGcm.is_authenticated());
    }
}
