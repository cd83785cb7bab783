//! AES engines: ECB, CBC and CTR over the `aes` block cipher, GCM over
//! `aes-gcm`.
//!
//! Key size picks the concrete AES type; every mode is dispatched through
//! `with_aes!` so each arm is monomorphic.

use aes::{
    Aes128, Aes192, Aes256,
    cipher::{
        BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit,
        StreamCipher, block_padding::NoPadding, consts::U12, generic_array::GenericArray,
    },
};
use aes_gcm::{AeadInPlace, AesGcm};
use hwcrypto_core::{Algorithm, CipherRequest, Direction, SymmetricAlgorithm, TAG_LEN};

use crate::error::SoftError;

const BLOCK: usize = SymmetricAlgorithm::BLOCK_SIZE;

/// Binds `$aes` to the AES type matching the key length and evaluates `$body`.
macro_rules! with_aes {
    ($key:expr, $aes:ident => $body:expr) => {
        match $key.len() {
            16 => {
                type $aes = Aes128;
                $body
            },
            24 => {
                type $aes = Aes192;
                $body
            },
            32 => {
                type $aes = Aes256;
                $body
            },
            _ => Err(SoftError::Length(aes::cipher::InvalidLength)),
        }
    };
}

/// Runs an unauthenticated mode over `buffer` in place.
pub(crate) fn crypt(request: CipherRequest<'_>, buffer: &mut [u8]) -> Result<(), SoftError> {
    let CipherRequest { algorithm, direction, key, iv } = request;
    if algorithm.requires_block_multiple() && buffer.len() % BLOCK != 0 {
        return Err(SoftError::Unaligned);
    }

    match algorithm {
        SymmetricAlgorithm::AesEcb => with_aes!(key, A => ecb::<A>(key, direction, buffer)),
        SymmetricAlgorithm::AesCbc => with_aes!(key, A => {
            let len = buffer.len();
            match direction {
                Direction::Encrypt => cbc::Encryptor::<A>::new_from_slices(key, iv)?
                    .encrypt_padded_mut::<NoPadding>(buffer, len)
                    .map(|_| ())
                    .map_err(|_| SoftError::Unaligned),
                Direction::Decrypt => cbc::Decryptor::<A>::new_from_slices(key, iv)?
                    .decrypt_padded_mut::<NoPadding>(buffer)
                    .map(|_| ())
                    .map_err(|_| SoftError::Unaligned),
            }
        }),
        SymmetricAlgorithm::AesCtr => with_aes!(key, A => {
            // Keystream xor; both directions are the same operation.
            ctr::Ctr128BE::<A>::new_from_slices(key, iv)?.apply_keystream(buffer);
            Ok(())
        }),
        SymmetricAlgorithm::AesCfb | SymmetricAlgorithm::AesGcm => {
            Err(SoftError::NotImplemented(Algorithm::Symmetric(algorithm)))
        },
    }
}

fn ecb<C>(key: &[u8], direction: Direction, buffer: &mut [u8]) -> Result<(), SoftError>
where
    C: KeyInit + BlockEncrypt + BlockDecrypt,
{
    let cipher = C::new_from_slice(key)?;
    for block in buffer.chunks_exact_mut(BLOCK) {
        let block = GenericArray::from_mut_slice(block);
        match direction {
            Direction::Encrypt => cipher.encrypt_block(block),
            Direction::Decrypt => cipher.decrypt_block(block),
        }
    }
    Ok(())
}

/// GCM-encrypts `buffer` in place and returns the detached tag.
pub(crate) fn gcm_seal(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    buffer: &mut [u8],
) -> Result<[u8; TAG_LEN], SoftError> {
    with_aes!(key, A => {
        let cipher = AesGcm::<A, U12>::new_from_slice(key)?;
        let nonce = GenericArray::from_slice(nonce);
        let tag = cipher
            .encrypt_in_place_detached(nonce, aad, buffer)
            .map_err(|_| SoftError::Length(aes::cipher::InvalidLength))?;
        let mut out = [0u8; TAG_LEN];
        out.copy_from_slice(&tag);
        Ok(out)
    })
}

/// Verifies `tag` and GCM-decrypts `buffer` in place.
///
/// Returns `Ok(false)` on tag mismatch.
pub(crate) fn gcm_open(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    buffer: &mut [u8],
    tag: &[u8; TAG_LEN],
) -> Result<bool, SoftError> {
    with_aes!(key, A => {
        let cipher = AesGcm::<A, U12>::new_from_slice(key)?;
        let nonce = GenericArray::from_slice(nonce);
        let tag = GenericArray::from_slice(tag);
        Ok(cipher.decrypt_in_place_detached(nonce, aad, buffer, tag).is_ok())
    })
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const SP800_KEY: [u8; 16] = hex!("2b7e151628aed2a6abf7158809cf4f3c");
    const SP800_PLAIN: [u8; 16] = hex!("6bc1bee22e409f96e93d7e117393172a");

    fn request<'a>(
        algorithm: SymmetricAlgorithm,
        direction: Direction,
        key: &'a [u8],
        iv: &'a [u8],
    ) -> CipherRequest<'a> {
        CipherRequest { algorithm, direction, key, iv }
    }

    #[test]
    fn ecb_fips197() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let mut block = hex!("00112233445566778899aabbccddeeff");
        crypt(request(SymmetricAlgorithm::AesEcb, Direction::Encrypt, &key, &[]), &mut block)
            .unwrap();
        assert_eq!(block, hex!("69c4e0d86a7b0430d8cdb78070b4c55a"));
    }

    #[test]
    fn cbc_sp800_38a() {
        let iv = hex!("000102030405060708090a0b0c0d0e0f");
        let mut block = SP800_PLAIN;
        crypt(request(SymmetricAlgorithm::AesCbc, Direction::Encrypt, &SP800_KEY, &iv), &mut block)
            .unwrap();
        assert_eq!(block, hex!("7649abac8119b246cee98e9b12e9197d"));

        crypt(request(SymmetricAlgorithm::AesCbc, Direction::Decrypt, &SP800_KEY, &iv), &mut block)
            .unwrap();
        assert_eq!(block, SP800_PLAIN);
    }

    #[test]
    fn ctr_sp800_38a() {
        let iv = hex!("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
        let mut block = SP800_PLAIN;
        crypt(request(SymmetricAlgorithm::AesCtr, Direction::Encrypt, &SP800_KEY, &iv), &mut block)
            .unwrap();
        assert_eq!(block, hex!("874d6191b620e3261bef6864990db6ce"));
    }

    #[test]
    fn gcm_nist_case_2() {
        let key = [0u8; 16];
        let nonce = [0u8; 12];
        let mut buffer = [0u8; 16];
        let tag = gcm_seal(&key, &nonce, &[], &mut buffer).unwrap();
        assert_eq!(buffer, hex!("0388dace60b6a392f328c2b971b2fe78"));
        assert_eq!(tag, hex!("ab6e47d42cec13bdf53a67b21257bddf"));

        assert!(gcm_open(&key, &nonce, &[], &mut buffer, &tag).unwrap());
        assert_eq!(buffer, [0u8; 16]);
    }

    #[test]
    fn gcm_rejects_wrong_tag() {
        let key = [0u8; 32];
        let nonce = [1u8; 12];
        let mut buffer = *b"payload";
        let mut tag = gcm_seal(&key, &nonce, b"aad", &mut buffer).unwrap();
        tag[0] ^= 0x80;
        assert!(!gcm_open(&key, &nonce, b"aad", &mut buffer, &tag).unwrap());
    }

    #[test]
    fn unaligned_block_mode_is_rejected() {
        let key = [0u8; 24];
        let mut buffer = [0u8; 17];
        let result =
            crypt(request(SymmetricAlgorithm::AesEcb, Direction::Encrypt, &key, &[]), &mut buffer);
        assert!(matches!(result, Err(SoftError::Unaligned)));
    }
}
