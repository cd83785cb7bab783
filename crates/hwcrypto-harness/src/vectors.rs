//! Known-answer vectors.
//!
//! The short vectors (`[1, 2, 3, 4]` inputs) are the device bring-up vectors;
//! the rest come from the published standards named on each constant.

use hex_literal::hex;
use hwcrypto_core::CrcAlgorithm;

/// Input for the bring-up CRC and SHA-256 vectors.
pub const SHORT_MESSAGE: [u8; 4] = [1, 2, 3, 4];

/// CRC-32 of [`SHORT_MESSAGE`].
pub const CRC32_SHORT: u32 = 0xB63C_FBCD;

/// Standard CRC check input.
pub const CHECK_INPUT: &[u8] = b"123456789";

/// Check value of every CRC preset over [`CHECK_INPUT`].
pub const CRC_CHECK_VALUES: [(CrcAlgorithm, u32); 5] = [
    (CrcAlgorithm::Crc8, 0xF4),
    (CrcAlgorithm::Crc16, 0xBB3D),
    (CrcAlgorithm::Crc32, 0xCBF4_3926),
    (CrcAlgorithm::Ccitt, 0x29B1),
    (CrcAlgorithm::Dnp, 0xEA82),
];

/// SHA-256 of [`SHORT_MESSAGE`].
pub const SHA256_SHORT: [u8; 32] =
    hex!("9f64a747e1b97f131fabb6b447296c9b6f0201e79fb3c5356e6c77e89b6a806a");

/// AES-128 bring-up key: `01 02 03 04` followed by zeros.
pub const AES128_KEY: [u8; 16] = hex!("01020304000000000000000000000000");

/// AES-128 bring-up plaintext: `05 06 07 08` followed by zeros.
pub const AES128_PLAIN: [u8; 16] = hex!("05060708000000000000000000000000");

/// ECB encryption of [`AES128_PLAIN`] under [`AES128_KEY`].
pub const AES128_CIPHER: [u8; 16] = hex!("6b73bf534fca5874181f064380454662");

/// FIPS-197 appendix C.1 key.
pub const FIPS197_KEY: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");

/// FIPS-197 appendix C.1 plaintext.
pub const FIPS197_PLAIN: [u8; 16] = hex!("00112233445566778899aabbccddeeff");

/// FIPS-197 appendix C.1 ciphertext.
pub const FIPS197_CIPHER: [u8; 16] = hex!("69c4e0d86a7b0430d8cdb78070b4c55a");

/// NIST GCM test case 2: all-zero key, nonce and plaintext.
pub mod gcm_case_2 {
    use hex_literal::hex;

    /// 128-bit key.
    pub const KEY: [u8; 16] = [0; 16];
    /// 96-bit nonce.
    pub const NONCE: [u8; 12] = [0; 12];
    /// One block of plaintext.
    pub const PLAIN: [u8; 16] = [0; 16];
    /// Expected ciphertext.
    pub const CIPHER: [u8; 16] = hex!("0388dace60b6a392f328c2b971b2fe78");
    /// Expected tag.
    pub const TAG: [u8; 16] = hex!("ab6e47d42cec13bdf53a67b21257bddf");
}
