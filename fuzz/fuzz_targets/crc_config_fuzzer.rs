//! Fuzz target for CRC parameter handling
//!
//! # Invariants
//!
//! - `crc_configure` accepts exactly the configurations that pass
//!   [`CrcConfig::validate`] at a supported width matching the algorithm
//! - A rejected configuration leaves the context unconfigured
//! - Every computed CRC fits in the configured width
//! - NEVER panic on any parameter set

#![no_main]

use arbitrary::Arbitrary;
use hwcrypto_core::{Algorithm, Backend, CrcAlgorithm, CrcConfig, CrcFlags, Error, Phase};
use hwcrypto_soft::default_device;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    algorithm: u8,
    last_val: u32,
    poly: u32,
    width: u8,
    xorout: u32,
    flags: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    const ALGORITHMS: [CrcAlgorithm; 5] = [
        CrcAlgorithm::Crc8,
        CrcAlgorithm::Crc16,
        CrcAlgorithm::Crc32,
        CrcAlgorithm::Ccitt,
        CrcAlgorithm::Dnp,
    ];
    let algorithm = ALGORITHMS[usize::from(input.algorithm) % ALGORITHMS.len()];

    let device = default_device();
    let mut ctx = match device.create_context(Algorithm::Crc(algorithm)) {
        Ok(ctx) => ctx,
        Err(err) => panic!("software device rejected {algorithm:?}: {err}"),
    };

    let config = CrcConfig {
        last_val: input.last_val,
        poly: input.poly,
        width: input.width,
        xorout: input.xorout,
        flags: CrcFlags::from_bits_truncate(input.flags),
    };
    let acceptable = device.backend().supports_crc_width(config.width)
        && config.width == algorithm.width()
        && config.validate().is_ok();

    match ctx.crc_configure(config) {
        Ok(()) => {
            assert!(acceptable, "accepted invalid config {config:?}");
            assert_eq!(ctx.phase(), Phase::Configured);

            let crc = ctx.crc_update(&input.data).expect("configured CRC must compute");
            assert_eq!(crc & !config.mask(), 0, "CRC {crc:#x} exceeds width {}", config.width);
        },
        Err(Error::InvalidConfig { .. }) => {
            assert!(!acceptable, "rejected valid config {config:?}");
            assert_eq!(ctx.phase(), Phase::Created);
            assert!(matches!(ctx.crc_update(&input.data), Err(Error::InvalidState { .. })));
        },
        Err(err) => panic!("unexpected error {err:?} for {config:?}"),
    }
});
