//! Software device configuration.

use hwcrypto_core::{AlgorithmSet, DeviceId};

/// Identity reported by the default software device.
pub const DEFAULT_DEVICE_ID: DeviceId = DeviceId(0x736f_6674_0000_0001);

/// Configuration for [`SoftBackend`](crate::SoftBackend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftConfig {
    /// Identity the device reports.
    pub id: DeviceId,
    /// Algorithms the device advertises.
    pub algorithms: AlgorithmSet,
}

impl SoftConfig {
    /// Every algorithm the software engines implement.
    ///
    /// MD5, SHA-1 and AES-CFB have no software engine.
    pub const IMPLEMENTED: AlgorithmSet = AlgorithmSet::RNG
        .union(AlgorithmSet::CRC8)
        .union(AlgorithmSet::CRC16)
        .union(AlgorithmSet::CRC32)
        .union(AlgorithmSet::CCITT)
        .union(AlgorithmSet::DNP)
        .union(AlgorithmSet::SHA224)
        .union(AlgorithmSet::SHA256)
        .union(AlgorithmSet::SHA384)
        .union(AlgorithmSet::SHA512)
        .union(AlgorithmSet::AES_ECB)
        .union(AlgorithmSet::AES_CBC)
        .union(AlgorithmSet::AES_CTR)
        .union(AlgorithmSet::AES_GCM);

    /// Removes `algorithms` from the advertised set.
    #[must_use]
    pub fn without(mut self, algorithms: AlgorithmSet) -> Self {
        self.algorithms.remove(algorithms);
        self
    }

    /// Advertised set, restricted to what is implemented.
    pub fn effective_algorithms(&self) -> AlgorithmSet {
        self.algorithms & Self::IMPLEMENTED
    }
}

impl Default for SoftConfig {
    fn default() -> Self {
        Self { id: DEFAULT_DEVICE_ID, algorithms: Self::IMPLEMENTED }
    }
}
