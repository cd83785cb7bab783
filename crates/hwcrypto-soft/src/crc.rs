//! Parametric CRC engine.
//!
//! Table-driven over a 32-bit register with the CRC aligned to the top bit,
//! which handles every width from 1 to 32 with one table layout. Reflected
//! variants reflect each input byte on the way in and the register on the
//! way out.

use hwcrypto_core::{CrcConfig, CrcFlags};

/// CRC engine built for one parameter set.
#[derive(Clone)]
pub struct CrcEngine {
    table: [u32; 256],
    config: CrcConfig,
}

impl CrcEngine {
    /// Builds the lookup table for `config`.
    ///
    /// `config` must already be validated; widths outside `1..=32` produce
    /// meaningless results.
    pub fn new(config: CrcConfig) -> Self {
        let top_poly = config.poly << Self::shift(config.width);
        let mut table = [0u32; 256];
        for (byte, slot) in (0u32..).zip(table.iter_mut()) {
            let mut crc = byte << 24;
            for _ in 0..8 {
                crc = if crc & 0x8000_0000 != 0 { (crc << 1) ^ top_poly } else { crc << 1 };
            }
            *slot = crc;
        }
        Self { table, config }
    }

    /// Computes the CRC of `data`, starting from the configured initial value.
    pub fn compute(&self, data: &[u8]) -> u32 {
        let shift = Self::shift(self.config.width);
        let refin = self.config.flags.contains(CrcFlags::REFIN);

        let mut crc = self.config.last_val << shift;
        for &byte in data {
            let byte = if refin { byte.reverse_bits() } else { byte };
            let index = crc.to_be_bytes()[0] ^ byte;
            crc = (crc << 8) ^ self.table[usize::from(index)];
        }

        let mut crc = crc >> shift;
        if self.config.flags.contains(CrcFlags::REFOUT) {
            crc = crc.reverse_bits() >> shift;
        }
        (crc ^ self.config.xorout) & self.config.mask()
    }

    fn shift(width: u8) -> u32 {
        32 - u32::from(width.clamp(1, 32))
    }
}
