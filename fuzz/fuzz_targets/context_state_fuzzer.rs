//! Fuzz target for the context state machine
//!
//! Drives the same operation sequence through [`ModelWorld`] and a software
//! device, and checks that every result and every phase agree.
//!
//! # Strategy
//!
//! - Operation sequences: arbitrary creates, destroys and duplicates mixed
//!   with operations of every family
//! - Family confusion: operations routinely hit contexts of the wrong family
//! - Withheld algorithms: the device capability set is fuzzed too
//!
//! # Invariants
//!
//! - Model and device agree on every result and every phase
//! - `Destroyed` is terminal until the slot is recreated
//! - Live context count equals occupied, non-destroyed slots
//! - NEVER panic on any operation sequence

#![no_main]

use arbitrary::Arbitrary;
use hwcrypto_core::{AlgorithmSet, Phase};
use hwcrypto_harness::{ModelWorld, Operation, RealWorld};
use hwcrypto_soft::{SoftConfig, device_with};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Algorithms withheld from the device, as raw capability bits.
    withheld: u32,
    operations: Vec<Operation>,
}

fuzz_target!(|input: FuzzInput| {
    let withheld = AlgorithmSet::from_bits_truncate(input.withheld);
    let device = device_with(SoftConfig::default().without(withheld));
    let mut model = ModelWorld::new(device.capabilities());
    let mut real = RealWorld::new(&device);

    for (i, op) in input.operations.iter().enumerate() {
        let before = real.observable_state();

        let expected = model.apply(op);
        let actual = real.apply(op);
        assert_eq!(expected, actual, "result divergence at operation {i}: {op:?}");

        let state = real.observable_state();
        assert_eq!(model.observable_state(), state, "state divergence at operation {i}: {op:?}");

        // Only a create or a duplicate may bring a destroyed slot back.
        if !matches!(op, Operation::Create { .. } | Operation::Duplicate { .. }) {
            for (slot, phase) in before.phases.iter().enumerate() {
                if *phase == Some(Phase::Destroyed) {
                    assert_eq!(state.phases[slot], Some(Phase::Destroyed), "slot {slot} revived");
                }
            }
        }

        let live =
            state.phases.iter().flatten().filter(|phase| **phase != Phase::Destroyed).count();
        assert_eq!(state.live_contexts, live);
    }
});
