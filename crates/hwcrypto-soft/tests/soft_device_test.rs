//! End-to-end tests of the software device through the context layer.
//!
//! Every check here goes through `Device::create_context`, so the sequencing
//! rules of the core and the engines of the software backend are exercised
//! together.

use hex_literal::hex;
use hwcrypto_core::{
    Algorithm, AlgorithmSet, CrcAlgorithm, CrcConfig, Device, Direction, Error, HashAlgorithm,
    Phase, SymmetricAlgorithm,
};
use hwcrypto_soft::{SoftBackend, SoftConfig, default_device, device_with};
use proptest::prelude::*;

const ECB: Algorithm = Algorithm::Symmetric(SymmetricAlgorithm::AesEcb);
const GCM: Algorithm = Algorithm::Symmetric(SymmetricAlgorithm::AesGcm);
const SHA256: Algorithm = Algorithm::Hash(HashAlgorithm::Sha256);

fn crc(device: &Device<SoftBackend>, algorithm: CrcAlgorithm, data: &[u8]) -> u32 {
    let mut ctx = device.create_context(Algorithm::Crc(algorithm)).unwrap();
    ctx.crc_configure(CrcConfig::preset(algorithm)).unwrap();
    ctx.crc_update(data).unwrap()
}

#[test]
fn crc32_known_vector() {
    let device = default_device();
    assert_eq!(crc(&device, CrcAlgorithm::Crc32, &[1, 2, 3, 4]), 0xB63C_FBCD);
}

#[test]
fn every_crc_preset_matches_its_check_value() {
    let device = default_device();
    let cases = [
        (CrcAlgorithm::Crc8, 0xF4),
        (CrcAlgorithm::Crc16, 0xBB3D),
        (CrcAlgorithm::Crc32, 0xCBF4_3926),
        (CrcAlgorithm::Ccitt, 0x29B1),
        (CrcAlgorithm::Dnp, 0xEA82),
    ];
    for (algorithm, expected) in cases {
        assert_eq!(crc(&device, algorithm, b"123456789"), expected, "{algorithm:?}");
    }
}

#[test]
fn sha256_known_vector() {
    let device = default_device();
    let mut ctx = device.create_context(SHA256).unwrap();
    ctx.hash_update(&[1, 2, 3, 4]).unwrap();

    let mut out = [0u8; 32];
    assert_eq!(ctx.hash_finish(&mut out, 32), Ok(32));
    assert_eq!(out, hex!("9f64a747e1b97f131fabb6b447296c9b6f0201e79fb3c5356e6c77e89b6a806a"));
}

#[test]
fn sha256_streaming_matches_one_shot() {
    let device = default_device();
    let mut split = device.create_context(SHA256).unwrap();
    split.hash_update(&[1, 2]).unwrap();
    split.hash_update(&[]).unwrap();
    split.hash_update(&[3, 4]).unwrap();

    let mut out = [0u8; 32];
    split.hash_finish(&mut out, 32).unwrap();
    assert_eq!(out, hex!("9f64a747e1b97f131fabb6b447296c9b6f0201e79fb3c5356e6c77e89b6a806a"));
}

#[test]
fn double_finish_keeps_first_digest() {
    let device = default_device();
    let mut ctx = device.create_context(SHA256).unwrap();
    ctx.hash_update(&[1, 2, 3, 4]).unwrap();

    let mut first = [0u8; 32];
    ctx.hash_finish(&mut first, 32).unwrap();

    let mut second = [0u8; 32];
    assert!(matches!(ctx.hash_finish(&mut second, 32), Err(Error::InvalidState { .. })));
    assert_eq!(second, [0u8; 32]);
    assert_eq!(ctx.digest(), Some(&first[..]));
}

#[test]
fn aes128_ecb_original_vector() {
    let device = default_device();
    let mut ctx = device.create_context(ECB).unwrap();
    let mut key = [0u8; 16];
    key[..4].copy_from_slice(&[1, 2, 3, 4]);
    let mut message = [0u8; 16];
    message[..4].copy_from_slice(&[5, 6, 7, 8]);
    ctx.set_key(&key, 128).unwrap();

    let mut cipher = [0u8; 16];
    ctx.crypt(Direction::Encrypt, &message, &mut cipher).unwrap();
    assert_eq!(cipher, hex!("6b73bf534fca5874181f064380454662"));

    let mut plain = [0u8; 16];
    ctx.crypt(Direction::Decrypt, &cipher, &mut plain).unwrap();
    assert_eq!(plain, message);
}

#[test]
fn aes_cbc_chains_only_within_a_call() {
    let device = default_device();
    let mut ctx = device.create_context(Algorithm::Symmetric(SymmetricAlgorithm::AesCbc)).unwrap();
    ctx.set_key(&hex!("2b7e151628aed2a6abf7158809cf4f3c"), 128).unwrap();
    ctx.set_iv(&hex!("000102030405060708090a0b0c0d0e0f")).unwrap();

    let plain = hex!("6bc1bee22e409f96e93d7e117393172a");
    let mut first = [0u8; 16];
    let mut second = [0u8; 16];
    ctx.crypt(Direction::Encrypt, &plain, &mut first).unwrap();
    ctx.crypt(Direction::Encrypt, &plain, &mut second).unwrap();
    assert_eq!(first, hex!("7649abac8119b246cee98e9b12e9197d"));
    assert_eq!(first, second);
}

#[test]
fn aes_ctr_refuses_keystream_reuse() {
    let device = default_device();
    let mut ctx = device.create_context(Algorithm::Symmetric(SymmetricAlgorithm::AesCtr)).unwrap();
    ctx.set_key(&hex!("2b7e151628aed2a6abf7158809cf4f3c"), 128).unwrap();
    ctx.set_iv(&hex!("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff")).unwrap();

    let plain = hex!("6bc1bee22e409f96e93d7e117393172a");
    let mut first = [0u8; 16];
    ctx.crypt(Direction::Encrypt, &plain, &mut first).unwrap();
    assert_eq!(first, hex!("874d6191b620e3261bef6864990db6ce"));

    let mut second = [0u8; 16];
    assert!(matches!(
        ctx.crypt(Direction::Encrypt, &plain, &mut second),
        Err(Error::InvalidState { .. })
    ));
    assert_eq!(second, [0u8; 16]);

    ctx.set_iv(&hex!("f0f1f2f3f4f5f6f7f8f9fafbfcfdff00")).unwrap();
    ctx.crypt(Direction::Encrypt, &plain, &mut second).unwrap();
    assert_ne!(first, second);
}

#[test]
fn aes_gcm_nist_case_2_and_tamper() {
    let device = default_device();
    let mut ctx = device.create_context(GCM).unwrap();
    ctx.set_key(&[0u8; 16], 128).unwrap();
    ctx.set_iv(&[0u8; 12]).unwrap();

    let mut cipher = [0u8; 16];
    ctx.crypt(Direction::Encrypt, &[0u8; 16], &mut cipher).unwrap();
    assert_eq!(cipher, hex!("0388dace60b6a392f328c2b971b2fe78"));

    let mut tag = [0u8; 16];
    ctx.tag(&mut tag).unwrap();
    assert_eq!(tag, hex!("ab6e47d42cec13bdf53a67b21257bddf"));

    let mut tampered = tag;
    tampered[15] ^= 1;
    ctx.set_tag(&tampered).unwrap();
    let mut plain = [0xFFu8; 16];
    assert_eq!(ctx.crypt(Direction::Decrypt, &cipher, &mut plain), Err(Error::AuthFailed));
    assert_eq!(plain, [0xFFu8; 16]);

    ctx.set_tag(&tag).unwrap();
    ctx.crypt(Direction::Decrypt, &cipher, &mut plain).unwrap();
    assert_eq!(plain, [0u8; 16]);
}

#[test]
fn unsupported_algorithms_allocate_nothing() {
    let device = device_with(SoftConfig::default().without(AlgorithmSet::AES_GCM));

    for algorithm in [
        GCM,
        Algorithm::Hash(HashAlgorithm::Md5),
        Algorithm::Symmetric(SymmetricAlgorithm::AesCfb),
    ] {
        assert_eq!(device.create_context(algorithm).unwrap_err(), Error::Unsupported { algorithm });
    }
    assert_eq!(device.live_contexts(), 0);
}

#[test]
fn rng_words_vary() {
    let device = default_device();
    let mut ctx = device.create_context(Algorithm::Rng).unwrap();
    let words: Vec<u32> = (0..8).map(|_| ctx.next_u32().unwrap()).collect();
    assert!(words.windows(2).any(|pair| pair[0] != pair[1]));
    assert_eq!(ctx.phase(), Phase::Active);
}

#[test]
fn contexts_on_one_device_run_from_many_threads() {
    let device = default_device();
    std::thread::scope(|scope| {
        for seed in 0..4u8 {
            let device = &device;
            scope.spawn(move || {
                let mut ctx = device.create_context(SHA256).unwrap();
                ctx.hash_update(&[seed; 64]).unwrap();
                let mut out = [0u8; 32];
                ctx.hash_finish(&mut out, 32).unwrap();
            });
        }
    });
    assert_eq!(device.live_contexts(), 0);
}

proptest! {
    #[test]
    fn aes128_ecb_round_trip(key in any::<[u8; 16]>(), block in any::<[u8; 16]>()) {
        let device = default_device();
        let mut ctx = device.create_context(ECB).unwrap();
        ctx.set_key(&key, 128).unwrap();

        let mut cipher = [0u8; 16];
        let mut plain = [0u8; 16];
        ctx.crypt(Direction::Encrypt, &block, &mut cipher).unwrap();
        ctx.crypt(Direction::Decrypt, &cipher, &mut plain).unwrap();
        prop_assert_eq!(plain, block);
    }

    #[test]
    fn crc_is_single_shot(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let device = default_device();
        let mut ctx = device.create_context(Algorithm::Crc(CrcAlgorithm::Crc32)).unwrap();
        ctx.crc_configure(CrcConfig::preset(CrcAlgorithm::Crc32)).unwrap();

        let first = ctx.crc_update(&data).unwrap();
        let second = ctx.crc_update(&data).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn aes_ctr_round_trip_any_length(
        key in any::<[u8; 32]>(),
        iv in any::<[u8; 16]>(),
        data in prop::collection::vec(any::<u8>(), 0..100),
    ) {
        let device = default_device();
        let mut ctx = device
            .create_context(Algorithm::Symmetric(SymmetricAlgorithm::AesCtr))
            .unwrap();
        ctx.set_key(&key, 256).unwrap();
        ctx.set_iv(&iv).unwrap();

        let mut buffer = data.clone();
        ctx.crypt_in_place(Direction::Encrypt, &mut buffer).unwrap();
        ctx.crypt_in_place(Direction::Decrypt, &mut buffer).unwrap();
        prop_assert_eq!(buffer, data);
    }
}
