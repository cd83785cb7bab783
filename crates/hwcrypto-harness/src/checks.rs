//! Device validation checks.
//!
//! Each check opens its own contexts, drives them through the public context
//! API and compares the results against [`vectors`](crate::vectors). A check
//! ends in one of three ways:
//!
//! - Pass: every comparison held
//! - Skipped: the device reported [`Error::Unsupported`] for an algorithm the
//!   check needs
//! - Fail: a comparison failed or the device returned any other error
//!
//! Every data operation goes through the configured [`RetryPolicy`], so a
//! busy device does not fail a check unless it stays busy.

use hwcrypto_core::{
    Algorithm, Backend, CrcAlgorithm, CrcConfig, Device, Direction, Error, HashAlgorithm,
    SymmetricAlgorithm, TAG_LEN,
};
use thiserror::Error;

use crate::{
    config::ValidationConfig,
    report::{CheckOutcome, CheckStatus, ValidationReport},
    retry::RetryPolicy,
    vectors::{self, gcm_case_2},
};

const ECB: Algorithm = Algorithm::Symmetric(SymmetricAlgorithm::AesEcb);
const GCM: Algorithm = Algorithm::Symmetric(SymmetricAlgorithm::AesGcm);
const SHA256: Algorithm = Algorithm::Hash(HashAlgorithm::Sha256);

#[derive(Debug, Error)]
enum CheckError {
    #[error(transparent)]
    Device(#[from] Error),

    #[error("{what}: expected {expected}, got {actual}")]
    Mismatch { what: &'static str, expected: String, actual: String },
}

type CheckResult = Result<(), CheckError>;

fn expect_bytes(what: &'static str, expected: &[u8], actual: &[u8]) -> CheckResult {
    if expected == actual {
        return Ok(());
    }
    Err(CheckError::Mismatch {
        what,
        expected: hex::encode(expected),
        actual: hex::encode(actual),
    })
}

fn expect_word(what: &'static str, expected: u32, actual: u32) -> CheckResult {
    if expected == actual {
        return Ok(());
    }
    Err(CheckError::Mismatch {
        what,
        expected: format!("{expected:#x}"),
        actual: format!("{actual:#x}"),
    })
}

fn outcome(name: &'static str, result: CheckResult) -> CheckOutcome {
    let status = match result {
        Ok(()) => CheckStatus::Pass,
        Err(CheckError::Device(Error::Unsupported { algorithm })) => {
            CheckStatus::Skipped { reason: format!("device lacks {algorithm}") }
        },
        Err(err) => CheckStatus::Fail { reason: err.to_string() },
    };

    match &status {
        CheckStatus::Pass => tracing::info!(check = name, "pass"),
        CheckStatus::Skipped { reason } => tracing::warn!(check = name, %reason, "skipped"),
        CheckStatus::Fail { reason } => tracing::error!(check = name, %reason, "FAIL"),
    }
    CheckOutcome { name, status }
}

/// Draws `rng_sample_bytes` from the entropy source and requires every byte
/// value to appear at least `rng_min_count` times.
pub fn rng_uniformity<B: Backend>(device: &Device<B>, config: &ValidationConfig) -> CheckOutcome {
    outcome("rng_uniformity", rng_histogram(device, config))
}

fn rng_histogram<B: Backend>(device: &Device<B>, config: &ValidationConfig) -> CheckResult {
    let mut ctx = device.create_context(Algorithm::Rng)?;
    let mut counts = [0usize; 256];

    let words = config.rng_sample_bytes.div_ceil(4);
    for _ in 0..words {
        let word = config.retry.run("next_u32", || ctx.next_u32())?;
        for byte in word.to_le_bytes() {
            counts[usize::from(byte)] += 1;
        }
    }
    ctx.destroy()?;

    let Some((value, &count)) = counts.iter().enumerate().min_by_key(|(_, count)| **count) else {
        return Ok(());
    };
    if count < config.rng_min_count {
        return Err(CheckError::Mismatch {
            what: "least frequent byte value",
            expected: format!("at least {} occurrences", config.rng_min_count),
            actual: format!("{count} occurrences of {value:#04x}"),
        });
    }
    tracing::debug!(words, min_count = count, "RNG histogram");
    Ok(())
}

/// CRC-32 of the bring-up vector.
pub fn crc32_known_answer<B: Backend>(
    device: &Device<B>,
    config: &ValidationConfig,
) -> CheckOutcome {
    let result = crc_of(device, config.retry, CrcAlgorithm::Crc32, &vectors::SHORT_MESSAGE)
        .and_then(|crc| expect_word("CRC-32", vectors::CRC32_SHORT, crc));
    outcome("crc32_known_answer", result)
}

const fn check_value_name(algorithm: CrcAlgorithm) -> &'static str {
    match algorithm {
        CrcAlgorithm::Crc8 => "crc8_check_value",
        CrcAlgorithm::Crc16 => "crc16_check_value",
        CrcAlgorithm::Crc32 => "crc32_check_value",
        CrcAlgorithm::Ccitt => "ccitt_check_value",
        CrcAlgorithm::Dnp => "dnp_check_value",
    }
}

/// Check value of every CRC preset, one outcome per preset.
pub fn crc_check_values<B: Backend>(
    device: &Device<B>,
    config: &ValidationConfig,
) -> Vec<CheckOutcome> {
    vectors::CRC_CHECK_VALUES
        .into_iter()
        .map(|(algorithm, expected)| {
            let result = crc_of(device, config.retry, algorithm, vectors::CHECK_INPUT)
                .and_then(|crc| expect_word("CRC check value", expected, crc));
            outcome(check_value_name(algorithm), result)
        })
        .collect()
}

fn crc_of<B: Backend>(
    device: &Device<B>,
    retry: RetryPolicy,
    algorithm: CrcAlgorithm,
    data: &[u8],
) -> Result<u32, CheckError> {
    let mut ctx = device.create_context(Algorithm::Crc(algorithm))?;
    ctx.crc_configure(CrcConfig::preset(algorithm))?;
    Ok(retry.run("crc_update", || ctx.crc_update(data))?)
}

/// SHA-256 of the bring-up vector.
pub fn sha256_known_answer<B: Backend>(
    device: &Device<B>,
    config: &ValidationConfig,
) -> CheckOutcome {
    outcome("sha256_known_answer", sha256_digest(device, config.retry))
}

fn sha256_digest<B: Backend>(device: &Device<B>, retry: RetryPolicy) -> CheckResult {
    let mut ctx = device.create_context(SHA256)?;
    retry.run("hash_update", || ctx.hash_update(&vectors::SHORT_MESSAGE))?;

    let mut digest = [0u8; 32];
    retry.run("hash_finish", || ctx.hash_finish(&mut digest, 32))?;
    expect_bytes("SHA-256 digest", &vectors::SHA256_SHORT, &digest)
}

/// A second finish must fail with `InvalidState` and keep the first digest.
pub fn hash_double_finish<B: Backend>(
    device: &Device<B>,
    config: &ValidationConfig,
) -> CheckOutcome {
    outcome("hash_double_finish", double_finish(device, config.retry))
}

fn double_finish<B: Backend>(device: &Device<B>, retry: RetryPolicy) -> CheckResult {
    let mut ctx = device.create_context(SHA256)?;
    retry.run("hash_update", || ctx.hash_update(&vectors::SHORT_MESSAGE))?;

    let mut first = [0u8; 32];
    retry.run("hash_finish", || ctx.hash_finish(&mut first, 32))?;

    let mut second = [0u8; 32];
    match ctx.hash_finish(&mut second, 32) {
        Err(Error::InvalidState { .. }) => {},
        Err(err) => return Err(err.into()),
        Ok(_) => {
            return Err(CheckError::Mismatch {
                what: "second finish",
                expected: "InvalidState".to_string(),
                actual: "a digest".to_string(),
            });
        },
    }
    expect_bytes("untouched output", &[0u8; 32], &second)?;
    expect_bytes("retained digest", &first, ctx.digest().unwrap_or_default())
}

/// AES-128 ECB encryption of the bring-up vector and decryption back.
pub fn aes128_ecb_round_trip<B: Backend>(
    device: &Device<B>,
    config: &ValidationConfig,
) -> CheckOutcome {
    let result = ecb_known_answer(
        device,
        config.retry,
        &vectors::AES128_KEY,
        &vectors::AES128_PLAIN,
        &vectors::AES128_CIPHER,
    );
    outcome("aes128_ecb_round_trip", result)
}

/// AES-128 known answer from FIPS-197 appendix C.1.
pub fn aes128_fips197<B: Backend>(device: &Device<B>, config: &ValidationConfig) -> CheckOutcome {
    let result = ecb_known_answer(
        device,
        config.retry,
        &vectors::FIPS197_KEY,
        &vectors::FIPS197_PLAIN,
        &vectors::FIPS197_CIPHER,
    );
    outcome("aes128_fips197", result)
}

fn ecb_known_answer<B: Backend>(
    device: &Device<B>,
    retry: RetryPolicy,
    key: &[u8; 16],
    plain: &[u8; 16],
    cipher: &[u8; 16],
) -> CheckResult {
    let mut ctx = device.create_context(ECB)?;
    ctx.set_key(key, 128)?;

    let mut encrypted = [0u8; 16];
    retry.run("crypt", || ctx.crypt(Direction::Encrypt, plain, &mut encrypted))?;
    expect_bytes("ciphertext", cipher, &encrypted)?;

    let mut decrypted = [0u8; 16];
    retry.run("crypt", || ctx.crypt(Direction::Decrypt, &encrypted, &mut decrypted))?;
    expect_bytes("round-trip plaintext", plain, &decrypted)
}

/// NIST GCM test case 2: ciphertext, tag, verified decryption and rejection
/// of a tampered tag.
pub fn aes_gcm_tag<B: Backend>(device: &Device<B>, config: &ValidationConfig) -> CheckOutcome {
    outcome("aes_gcm_tag", gcm_case(device, config.retry))
}

fn gcm_case<B: Backend>(device: &Device<B>, retry: RetryPolicy) -> CheckResult {
    let mut ctx = device.create_context(GCM)?;
    ctx.set_key(&gcm_case_2::KEY, 128)?;
    ctx.set_iv(&gcm_case_2::NONCE)?;

    let mut cipher = [0u8; 16];
    retry.run("crypt", || ctx.crypt(Direction::Encrypt, &gcm_case_2::PLAIN, &mut cipher))?;
    expect_bytes("GCM ciphertext", &gcm_case_2::CIPHER, &cipher)?;

    let mut tag = [0u8; TAG_LEN];
    ctx.tag(&mut tag)?;
    expect_bytes("GCM tag", &gcm_case_2::TAG, &tag)?;

    let mut tampered = tag;
    tampered[0] ^= 0x01;
    ctx.set_tag(&tampered)?;
    let mut plain = [0u8; 16];
    match retry.run("crypt", || ctx.crypt(Direction::Decrypt, &cipher, &mut plain)) {
        Err(Error::AuthFailed) => {},
        Err(err) => return Err(err.into()),
        Ok(()) => {
            return Err(CheckError::Mismatch {
                what: "tampered tag",
                expected: "AuthFailed".to_string(),
                actual: "accepted".to_string(),
            });
        },
    }

    ctx.set_tag(&tag)?;
    retry.run("crypt", || ctx.crypt(Direction::Decrypt, &cipher, &mut plain))?;
    expect_bytes("GCM plaintext", &gcm_case_2::PLAIN, &plain)
}

/// Runs every check against `device`.
pub fn run_all<B: Backend>(device: &Device<B>, config: &ValidationConfig) -> ValidationReport {
    tracing::info!(device = %device.id(), "validation started");

    let mut report = ValidationReport::new();
    report.record(rng_uniformity(device, config));
    report.record(crc32_known_answer(device, config));
    for outcome in crc_check_values(device, config) {
        report.record(outcome);
    }
    report.record(sha256_known_answer(device, config));
    report.record(hash_double_finish(device, config));
    report.record(aes128_ecb_round_trip(device, config));
    report.record(aes128_fips197(device, config));
    report.record(aes_gcm_tag(device, config));

    tracing::info!(
        passed = report.passed(),
        failed = report.failed(),
        skipped = report.skipped(),
        "validation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use hwcrypto_core::AlgorithmSet;
    use hwcrypto_soft::{SoftConfig, default_device, device_with};

    use super::*;

    fn quick() -> ValidationConfig {
        ValidationConfig { rng_sample_bytes: 25_600, rng_min_count: 40, ..Default::default() }
    }

    #[test]
    fn software_device_passes_every_check() {
        let report = run_all(&default_device(), &quick());
        assert!(report.is_success(), "{:?}", report.outcomes());
        assert_eq!(report.skipped(), 0);
        assert_eq!(report.passed(), report.outcomes().len());
    }

    #[test]
    fn missing_gcm_is_skipped_not_failed() {
        let device = device_with(SoftConfig::default().without(AlgorithmSet::AES_GCM));
        let outcome = aes_gcm_tag(&device, &quick());
        assert!(matches!(outcome.status, CheckStatus::Skipped { .. }));
    }

    #[test]
    fn impossible_rng_threshold_fails() {
        let config = ValidationConfig { rng_sample_bytes: 256, rng_min_count: 2, ..quick() };
        // 256 bytes cannot hold every value twice.
        let outcome = rng_uniformity(&default_device(), &config);
        assert!(outcome.failed());
    }

    #[test]
    fn byte_mismatch_is_hex() {
        let err = expect_bytes("digest", &[0x00, 0xAB], &[0x10]).unwrap_err();
        assert_eq!(err.to_string(), "digest: expected 00ab, got 10");
    }

    #[test]
    fn mismatch_names_both_values() {
        let err = expect_word("CRC-32", 0xB63C_FBCD, 0x1234).unwrap_err();
        assert_eq!(err.to_string(), "CRC-32: expected 0xb63cfbcd, got 0x1234");
    }
}
