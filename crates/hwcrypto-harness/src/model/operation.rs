//! Operations for model-based testing.
//!
//! Operations are generated randomly by proptest (or decoded from fuzzer
//! input) and applied to both the model and a real device. Every field is a
//! small integer class; the helpers on [`Operation`] expand classes into the
//! concrete values both sides use, so the two can never disagree about
//! inputs.

use arbitrary::Arbitrary;
use hwcrypto_core::{Algorithm, CrcAlgorithm, CrcConfig, Direction, Error, Family};

/// Context slot index. Slots are reused; creating into an occupied slot
/// drops the previous context.
pub type Slot = u8;

/// Number of context slots in a world.
pub const NUM_SLOTS: usize = 4;

/// Tag the real side supplies when no genuine tag is available.
pub const BOGUS_TAG: [u8; 16] = [0xA5; 16];

/// Operations that can be applied to a world.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Create a context into a slot.
    Create {
        /// Target slot.
        slot: Slot,
        /// Index into [`Algorithm::ALL`], taken modulo its length.
        algorithm: u8,
    },

    /// Destroy the context in a slot.
    Destroy {
        /// Target slot.
        slot: Slot,
    },

    /// Duplicate a context into another slot.
    Duplicate {
        /// Slot to copy from.
        from: Slot,
        /// Slot to copy into.
        to: Slot,
    },

    /// Draw a random word.
    NextU32 {
        /// Target slot.
        slot: Slot,
    },

    /// Apply CRC parameters.
    CrcConfigure {
        /// Target slot.
        slot: Slot,
        /// Preset class, see [`Operation::crc_config`].
        preset: u8,
        /// Corruption class, see [`Operation::crc_config`].
        corrupt: u8,
    },

    /// Compute a CRC.
    CrcUpdate {
        /// Target slot.
        slot: Slot,
        /// Input.
        data: SmallData,
    },

    /// Absorb bytes into a digest.
    HashUpdate {
        /// Target slot.
        slot: Slot,
        /// Input.
        data: SmallData,
    },

    /// Finish a digest.
    HashFinish {
        /// Target slot.
        slot: Slot,
        /// Requested digest length in bytes.
        digest_len: u8,
    },

    /// Restart a digest.
    HashReset {
        /// Target slot.
        slot: Slot,
    },

    /// Apply a cipher key.
    SetKey {
        /// Target slot.
        slot: Slot,
        /// Key size class, see [`Operation::key_bits`].
        bits_class: u8,
        /// Material length class, see [`Operation::key_material`].
        len_class: u8,
    },

    /// Apply an IV.
    SetIv {
        /// Target slot.
        slot: Slot,
        /// Length class, see [`Operation::iv_bytes`].
        len_class: u8,
        /// First byte of the IV.
        seed: u8,
    },

    /// Set GCM additional authenticated data.
    SetAad {
        /// Target slot.
        slot: Slot,
        /// AAD bytes.
        data: SmallData,
    },

    /// Set the tag the next GCM decryption verifies against.
    SetTag {
        /// Target slot.
        slot: Slot,
        /// Use the tag the context last produced, if it has one.
        genuine: bool,
    },

    /// Encrypt or decrypt caller-chosen bytes.
    Crypt {
        /// Target slot.
        slot: Slot,
        /// Encrypt when true.
        encrypt: bool,
        /// Input.
        data: SmallData,
    },

    /// Decrypt the output of the slot's last successful encryption.
    Replay {
        /// Target slot.
        slot: Slot,
    },

    /// Read the last GCM tag.
    Tag {
        /// Target slot.
        slot: Slot,
    },
}

impl Operation {
    /// Algorithm selected by an algorithm index.
    pub fn algorithm(index: u8) -> Algorithm {
        Algorithm::ALL[usize::from(index) % Algorithm::ALL.len()]
    }

    /// CRC parameters selected by a preset and corruption class.
    ///
    /// Corruption class 1 widens the register to 24 bits, class 2 clears the
    /// polynomial's low bit; anything else leaves the preset intact.
    pub fn crc_config(preset: u8, corrupt: u8) -> CrcConfig {
        const PRESETS: [CrcAlgorithm; 5] = [
            CrcAlgorithm::Crc8,
            CrcAlgorithm::Crc16,
            CrcAlgorithm::Crc32,
            CrcAlgorithm::Ccitt,
            CrcAlgorithm::Dnp,
        ];
        let mut config = CrcConfig::preset(PRESETS[usize::from(preset) % PRESETS.len()]);
        match corrupt % 4 {
            1 => config.width = 24,
            2 => config.poly &= !1,
            _ => {},
        }
        config
    }

    /// Key size in bits: 64, 128, 192 or 256.
    pub const fn key_bits(class: u8) -> usize {
        match class % 4 {
            0 => 64,
            1 => 128,
            2 => 192,
            _ => 256,
        }
    }

    /// Key material of 0, 8, 16, 24 or 32 bytes.
    pub fn key_material(class: u8) -> Vec<u8> {
        let len = usize::from(class % 5) * 8;
        (0u8..).take(len).map(|i| i.wrapping_mul(7).wrapping_add(1)).collect()
    }

    /// IV of 12, 16, 0 or 7 bytes starting at `seed`.
    pub fn iv_bytes(class: u8, seed: u8) -> Vec<u8> {
        let len = match class % 4 {
            0 => 12,
            1 => 16,
            2 => 0,
            _ => 7,
        };
        (0u8..).take(len).map(|i| seed.wrapping_add(i)).collect()
    }

    /// Cipher direction.
    pub const fn direction(encrypt: bool) -> Direction {
        if encrypt { Direction::Encrypt } else { Direction::Decrypt }
    }

    /// Family of the context operation, or `None` for slot management.
    pub const fn family(&self) -> Option<Family> {
        match self {
            Self::Create { .. } | Self::Destroy { .. } | Self::Duplicate { .. } => None,
            Self::NextU32 { .. } => Some(Family::Rng),
            Self::CrcConfigure { .. } | Self::CrcUpdate { .. } => Some(Family::Crc),
            Self::HashUpdate { .. } | Self::HashFinish { .. } | Self::HashReset { .. } => {
                Some(Family::Hash)
            },
            Self::SetKey { .. }
            | Self::SetIv { .. }
            | Self::SetAad { .. }
            | Self::SetTag { .. }
            | Self::Crypt { .. }
            | Self::Replay { .. }
            | Self::Tag { .. } => Some(Family::Symmetric),
        }
    }
}

/// Small byte string for testing.
///
/// Content is deterministic from the seed, which keeps shrunk cases readable.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub struct SmallData {
    /// First byte of the content.
    pub seed: u8,
    /// Length class: 0, 5, 16, 33 or 64 bytes.
    pub size_class: u8,
}

impl SmallData {
    /// Expand to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = match self.size_class % 5 {
            0 => 0,
            1 => 5,
            2 => 16,
            3 => 33,
            _ => 64,
        };
        (0u8..).take(len).map(|i| self.seed.wrapping_add(i)).collect()
    }
}

/// Result of applying an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Operation failed.
    Error(OperationError),
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

/// Error kinds compared between model and device.
///
/// Reasons are dropped; lengths, key sizes and families are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The slot has never held a context.
    EmptySlot,
    /// Algorithm not implemented by the device.
    Unsupported(Algorithm),
    /// Configuration rejected.
    InvalidConfig,
    /// Operation out of sequence.
    InvalidState,
    /// Context destroyed.
    InvalidHandle,
    /// Length constraint violated.
    InvalidLength(usize),
    /// Key size rejected.
    InvalidKeyLength(usize),
    /// Operation for another family.
    WrongFamily {
        /// Family of the context.
        expected: Family,
        /// Family of the operation.
        actual: Family,
    },
    /// GCM tag mismatch.
    AuthFailed,
    /// Device fault.
    CryptoFault,
    /// Device busy.
    DeviceBusy,
}

impl From<&Error> for OperationError {
    fn from(err: &Error) -> Self {
        match err {
            Error::Unsupported { algorithm } => Self::Unsupported(*algorithm),
            Error::InvalidConfig { .. } => Self::InvalidConfig,
            Error::InvalidState { .. } => Self::InvalidState,
            Error::InvalidHandle => Self::InvalidHandle,
            Error::InvalidLength { len, .. } => Self::InvalidLength(*len),
            Error::InvalidKeyLength { bits } => Self::InvalidKeyLength(*bits),
            Error::WrongFamily { expected, actual } => {
                Self::WrongFamily { expected: *expected, actual: *actual }
            },
            Error::AuthFailed => Self::AuthFailed,
            Error::CryptoFault { .. } => Self::CryptoFault,
            Error::DeviceBusy => Self::DeviceBusy,
        }
    }
}

impl<T> From<Result<T, Error>> for OperationResult {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(err) => Self::Error(OperationError::from(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_index_wraps() {
        assert_eq!(Operation::algorithm(0), Algorithm::Rng);
        assert_eq!(Operation::algorithm(17), Algorithm::Rng);
    }

    #[test]
    fn crc_corruption_classes() {
        assert_eq!(Operation::crc_config(2, 0), CrcConfig::preset(CrcAlgorithm::Crc32));
        assert_eq!(Operation::crc_config(2, 1).width, 24);
        assert!(Operation::crc_config(2, 2).validate().is_err());
    }

    #[test]
    fn material_lengths() {
        assert_eq!(Operation::key_material(0).len(), 0);
        assert_eq!(Operation::key_material(4).len(), 32);
        assert_eq!(Operation::iv_bytes(0, 9).len(), 12);
        assert_eq!(Operation::iv_bytes(1, 9)[0], 9);
        assert_eq!(SmallData { seed: 0, size_class: 3 }.to_bytes().len(), 33);
    }
}
