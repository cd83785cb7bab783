//! Plain configuration values applied to contexts.

use bitflags::bitflags;

use crate::{
    algorithm::CrcAlgorithm,
    error::{Error, Result},
};

bitflags! {
    /// Bit-reflection options for a CRC engine.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CrcFlags: u8 {
        /// Reflect each input byte before it enters the register.
        const REFIN = 1 << 0;
        /// Reflect the final register before the output xor.
        const REFOUT = 1 << 1;
    }
}

/// Parameters of a CRC computation.
///
/// Follows the usual parameter model: the register starts at `last_val`, input
/// bytes are optionally reflected, the final register is optionally reflected
/// and then xored with `xorout`. All values are right-aligned in `width` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrcConfig {
    /// Initial register value.
    pub last_val: u32,
    /// Generator polynomial, without the implicit top bit.
    pub poly: u32,
    /// Register width in bits.
    pub width: u8,
    /// Mask xored into the result.
    pub xorout: u32,
    /// Reflection options.
    pub flags: CrcFlags,
}

impl CrcConfig {
    /// Standard parameters for a CRC identifier.
    pub const fn preset(algorithm: CrcAlgorithm) -> Self {
        let reflected = CrcFlags::REFIN.union(CrcFlags::REFOUT);
        match algorithm {
            CrcAlgorithm::Crc8 => {
                Self { last_val: 0, poly: 0x07, width: 8, xorout: 0, flags: CrcFlags::empty() }
            },
            CrcAlgorithm::Crc16 => {
                Self { last_val: 0, poly: 0x8005, width: 16, xorout: 0, flags: reflected }
            },
            CrcAlgorithm::Crc32 => Self {
                last_val: 0xFFFF_FFFF,
                poly: 0x04C1_1DB7,
                width: 32,
                xorout: 0xFFFF_FFFF,
                flags: reflected,
            },
            CrcAlgorithm::Ccitt => Self {
                last_val: 0xFFFF,
                poly: 0x1021,
                width: 16,
                xorout: 0,
                flags: CrcFlags::empty(),
            },
            CrcAlgorithm::Dnp => {
                Self { last_val: 0, poly: 0x3D65, width: 16, xorout: 0xFFFF, flags: reflected }
            },
        }
    }

    /// Mask covering `width` bits.
    pub const fn mask(&self) -> u32 {
        if self.width >= 32 { u32::MAX } else { (1u32 << self.width) - 1 }
    }

    /// Checks that every field fits in `width` bits.
    ///
    /// Width support itself is a device property and is checked against the
    /// device, not here.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.width > 32 {
            return Err(Error::InvalidConfig { reason: "CRC width must be 1..=32 bits" });
        }
        let mask = self.mask();
        if self.poly & !mask != 0 {
            return Err(Error::InvalidConfig { reason: "CRC polynomial wider than width" });
        }
        if self.poly & 1 == 0 {
            return Err(Error::InvalidConfig { reason: "CRC polynomial must have its low bit set" });
        }
        if self.last_val & !mask != 0 {
            return Err(Error::InvalidConfig { reason: "CRC initial value wider than width" });
        }
        if self.xorout & !mask != 0 {
            return Err(Error::InvalidConfig { reason: "CRC xor mask wider than width" });
        }
        Ok(())
    }
}

/// Supported symmetric key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// 128-bit key.
    Bits128,
    /// 192-bit key.
    Bits192,
    /// 256-bit key.
    Bits256,
}

impl KeySize {
    /// Parses a bit length, rejecting anything but 128, 192 and 256.
    pub const fn from_bits(bits: usize) -> Result<Self> {
        match bits {
            128 => Ok(Self::Bits128),
            192 => Ok(Self::Bits192),
            256 => Ok(Self::Bits256),
            _ => Err(Error::InvalidKeyLength { bits }),
        }
    }

    /// Key length in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Bits128 => 16,
            Self::Bits192 => 24,
            Self::Bits256 => 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid_and_match_their_width() {
        for algo in [
            CrcAlgorithm::Crc8,
            CrcAlgorithm::Crc16,
            CrcAlgorithm::Crc32,
            CrcAlgorithm::Ccitt,
            CrcAlgorithm::Dnp,
        ] {
            let config = CrcConfig::preset(algo);
            assert_eq!(config.validate(), Ok(()), "{algo:?}");
            assert_eq!(config.width, algo.width());
        }
    }

    #[test]
    fn rejects_fields_wider_than_width() {
        let mut config = CrcConfig::preset(CrcAlgorithm::Crc16);
        config.last_val = 0x1_0000;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

        let mut config = CrcConfig::preset(CrcAlgorithm::Crc8);
        config.poly = 0x107;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

        let mut config = CrcConfig::preset(CrcAlgorithm::Crc8);
        config.xorout = 0x100;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_zero_and_oversized_width() {
        let mut config = CrcConfig::preset(CrcAlgorithm::Crc32);
        config.width = 0;
        assert!(config.validate().is_err());
        config.width = 33;
        assert!(config.validate().is_err());
    }

    #[test]
    fn key_sizes() {
        assert_eq!(KeySize::from_bits(128).map(KeySize::bytes), Ok(16));
        assert_eq!(KeySize::from_bits(256).map(KeySize::bytes), Ok(32));
        assert_eq!(KeySize::from_bits(64), Err(Error::InvalidKeyLength { bits: 64 }));
    }
}
