//! Behavior of contexts on a simulated device that reports busy and faults.

use hwcrypto_core::{
    Algorithm, AlgorithmSet, CrcAlgorithm, CrcConfig, Device, Direction, Error, HashAlgorithm,
    Phase, SymmetricAlgorithm,
};
use hwcrypto_harness::{
    RetryPolicy, SimBackend, SimConfig, ValidationConfig, init_test_tracing, run_all, sim_device,
};
use hwcrypto_soft::SoftConfig;

const SHA256: Algorithm = Algorithm::Hash(HashAlgorithm::Sha256);

fn quick(retry: RetryPolicy) -> ValidationConfig {
    ValidationConfig { rng_sample_bytes: 25_600, rng_min_count: 40, retry }
}

#[test]
fn busy_is_retryable_and_leaves_state() {
    init_test_tracing();
    let device = sim_device(SimConfig { busy_every: Some(2), ..SimConfig::seeded(7) });
    let mut ctx = device.create_context(SHA256).unwrap();

    ctx.hash_update(b"abc").unwrap();
    let err = ctx.hash_update(b"def").unwrap_err();
    assert_eq!(err, Error::DeviceBusy);
    assert!(err.is_retryable());
    assert_eq!(ctx.phase(), Phase::Active);

    // The retry reaches an odd operation count and succeeds.
    ctx.hash_update(b"def").unwrap();
    assert_eq!(device.backend().operations(), 3);
}

#[test]
fn retry_policy_absorbs_busy() {
    init_test_tracing();
    let device = sim_device(SimConfig { busy_every: Some(2), ..SimConfig::seeded(7) });
    let mut ctx = device.create_context(Algorithm::Rng).unwrap();
    let policy = RetryPolicy::Retry { max_attempts: 3 };

    for _ in 0..10 {
        policy.run("next_u32", || ctx.next_u32()).unwrap();
    }
    assert_eq!(ctx.phase(), Phase::Active);
}

#[test]
fn retry_exhaustion_reports_busy() {
    init_test_tracing();
    let device = sim_device(SimConfig { busy_every: Some(1), ..SimConfig::seeded(7) });
    let mut ctx = device.create_context(Algorithm::Rng).unwrap();
    let policy = RetryPolicy::Retry { max_attempts: 4 };

    assert_eq!(policy.run("next_u32", || ctx.next_u32()), Err(Error::DeviceBusy));
    assert_eq!(device.backend().operations(), 4);
    assert_eq!(ctx.phase(), Phase::Created);
}

#[test]
fn fault_moves_context_to_faulted() {
    init_test_tracing();
    let device = sim_device(SimConfig { fault_after: Some(1), ..SimConfig::seeded(7) });
    let mut ctx = device.create_context(Algorithm::Crc(CrcAlgorithm::Crc32)).unwrap();
    ctx.crc_configure(CrcConfig::preset(CrcAlgorithm::Crc32)).unwrap();

    assert_eq!(ctx.crc_update(b"123456789").unwrap(), 0xCBF4_3926);
    let err = ctx.crc_update(b"123456789").unwrap_err();
    assert!(matches!(err, Error::CryptoFault { .. }), "{err:?}");
    assert!(err.is_fatal());
    assert_eq!(ctx.phase(), Phase::Faulted);

    assert!(matches!(ctx.crc_update(b"x"), Err(Error::InvalidState { .. })));
    assert!(matches!(ctx.duplicate(), Err(Error::InvalidState { .. })));

    assert_eq!(device.live_contexts(), 1);
    ctx.destroy().unwrap();
    assert_eq!(ctx.phase(), Phase::Destroyed);
    assert_eq!(device.live_contexts(), 0);
}

#[test]
fn fault_does_not_spread_to_other_contexts() {
    init_test_tracing();
    let device = sim_device(SimConfig { fault_after: Some(0), ..SimConfig::seeded(7) });
    let mut faulty = device.create_context(SHA256).unwrap();
    let other = device.create_context(SHA256).unwrap();

    assert!(matches!(faulty.hash_update(b"abc"), Err(Error::CryptoFault { .. })));
    assert_eq!(faulty.phase(), Phase::Faulted);
    assert_eq!(other.phase(), Phase::Created);
}

#[test]
fn gcm_busy_keeps_key_and_iv() {
    init_test_tracing();
    let device = sim_device(SimConfig { busy_every: Some(1), ..SimConfig::seeded(7) });
    let mut ctx = device.create_context(Algorithm::Symmetric(SymmetricAlgorithm::AesGcm)).unwrap();
    ctx.set_key(&[0u8; 16], 128).unwrap();
    ctx.set_iv(&[0u8; 12]).unwrap();

    let mut out = [0u8; 16];
    assert_eq!(ctx.crypt(Direction::Encrypt, &[0u8; 16], &mut out), Err(Error::DeviceBusy));
    assert_eq!(ctx.phase(), Phase::IvSet);
    let mut tag = [0u8; 16];
    assert!(matches!(ctx.tag(&mut tag), Err(Error::InvalidState { .. })));
}

#[test]
fn same_seed_same_words() {
    init_test_tracing();
    let words = |seed| {
        let device = sim_device(SimConfig::seeded(seed));
        let mut ctx = device.create_context(Algorithm::Rng).unwrap();
        (0..8).map(|_| ctx.next_u32().unwrap()).collect::<Vec<_>>()
    };

    assert_eq!(words(99), words(99));
    assert_ne!(words(99), words(100));
}

#[test]
fn validation_passes_through_busy_with_retry() {
    init_test_tracing();
    let device = sim_device(SimConfig { busy_every: Some(5), ..SimConfig::seeded(3) });

    let report = run_all(&device, &quick(RetryPolicy::Retry { max_attempts: 3 }));
    assert!(report.is_success(), "{:?}", report.outcomes());
    assert_eq!(report.skipped(), 0);
}

#[test]
fn validation_fails_on_busy_without_retry() {
    init_test_tracing();
    let device = sim_device(SimConfig { busy_every: Some(5), ..SimConfig::seeded(3) });

    let report = run_all(&device, &quick(RetryPolicy::None));
    assert!(!report.is_success());
}

#[test]
fn validation_fails_on_faulty_device() {
    init_test_tracing();
    let device = sim_device(SimConfig { fault_after: Some(0), ..SimConfig::seeded(3) });

    let report = run_all(&device, &quick(RetryPolicy::Retry { max_attempts: 3 }));
    assert_eq!(report.passed(), 0);
    assert_eq!(report.failed(), report.outcomes().len());
}

#[test]
fn simulated_device_honors_withheld_algorithms() {
    init_test_tracing();
    let soft = SoftConfig::default().without(AlgorithmSet::AES_GCM);
    let device = Device::new(SimBackend::with_algorithms(SimConfig::seeded(1), soft));

    assert!(matches!(
        device.create_context(Algorithm::Symmetric(SymmetricAlgorithm::AesGcm)),
        Err(Error::Unsupported { .. })
    ));
    let report = run_all(&device, &quick(RetryPolicy::None));
    assert!(report.is_success());
    assert_eq!(report.skipped(), 1);
}
