//! Model world: a device's capability table plus a fixed set of context
//! slots.

use hwcrypto_core::{AlgorithmSet, Phase};

use super::{
    context::{CipherInput, ModelContext},
    operation::{NUM_SLOTS, Operation, OperationError, OperationResult, Slot},
};

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Contexts created and not yet destroyed.
    pub live_contexts: usize,
    /// Phase of the context in each slot.
    pub phases: Vec<Option<Phase>>,
}

/// Model world - the reference implementation.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    capabilities: AlgorithmSet,
    slots: Vec<Option<ModelContext>>,
}

impl ModelWorld {
    /// Creates a world for a device implementing `capabilities`.
    pub fn new(capabilities: AlgorithmSet) -> Self {
        Self { capabilities, slots: vec![None; NUM_SLOTS] }
    }

    /// Context in `slot`, if any.
    pub fn context(&self, slot: Slot) -> Option<&ModelContext> {
        self.slots.get(usize::from(slot) % NUM_SLOTS)?.as_ref()
    }

    /// Apply an operation and return the predicted result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Create { slot, algorithm } => self.apply_create(*slot, *algorithm),
            Operation::Destroy { slot } => self.with(*slot, ModelContext::destroy),
            Operation::Duplicate { from, to } => self.apply_duplicate(*from, *to),
            Operation::NextU32 { slot } => self.with(*slot, ModelContext::next_u32),
            Operation::CrcConfigure { slot, preset, corrupt } => {
                let config = Operation::crc_config(*preset, *corrupt);
                self.with(*slot, |ctx| ctx.crc_configure(&config))
            },
            Operation::CrcUpdate { slot, .. } => self.with(*slot, ModelContext::crc_update),
            Operation::HashUpdate { slot, .. } => self.with(*slot, ModelContext::hash_update),
            Operation::HashFinish { slot, digest_len } => {
                self.with(*slot, |ctx| ctx.hash_finish(usize::from(*digest_len)))
            },
            Operation::HashReset { slot } => self.with(*slot, ModelContext::hash_reset),
            Operation::SetKey { slot, bits_class, len_class } => {
                let material = Operation::key_material(*len_class);
                let bits = Operation::key_bits(*bits_class);
                self.with(*slot, |ctx| ctx.set_key(&material, bits))
            },
            Operation::SetIv { slot, len_class, seed } => {
                let iv = Operation::iv_bytes(*len_class, *seed);
                self.with(*slot, |ctx| ctx.set_iv(&iv))
            },
            Operation::SetAad { slot, data } => {
                let aad = data.to_bytes();
                self.with(*slot, |ctx| ctx.set_aad(&aad))
            },
            Operation::SetTag { slot, genuine } => self.with(*slot, |ctx| ctx.set_tag(*genuine)),
            Operation::Crypt { slot, encrypt, data } => {
                let data = data.to_bytes();
                self.with(*slot, |ctx| ctx.crypt(Operation::direction(*encrypt), &data))
            },
            Operation::Replay { slot } => self.with(*slot, |ctx| {
                let seal = ctx.last_seal().cloned();
                ctx.decrypt(&CipherInput::Replay(seal.as_ref()))
            }),
            Operation::Tag { slot } => self.with(*slot, ModelContext::tag),
        }
    }

    fn with(
        &mut self,
        slot: Slot,
        op: impl FnOnce(&mut ModelContext) -> OperationResult,
    ) -> OperationResult {
        match self.slots[usize::from(slot) % NUM_SLOTS].as_mut() {
            Some(ctx) => op(ctx),
            None => OperationResult::Error(OperationError::EmptySlot),
        }
    }

    fn apply_create(&mut self, slot: Slot, index: u8) -> OperationResult {
        let algorithm = Operation::algorithm(index);
        if !self.capabilities.has(algorithm) {
            return OperationResult::Error(OperationError::Unsupported(algorithm));
        }
        self.slots[usize::from(slot) % NUM_SLOTS] = Some(ModelContext::new(algorithm));
        OperationResult::Ok
    }

    fn apply_duplicate(&mut self, from: Slot, to: Slot) -> OperationResult {
        let copy = match self.context(from).map(ModelContext::duplicate) {
            None => return OperationResult::Error(OperationError::EmptySlot),
            Some(Err(err)) => return OperationResult::Error(err),
            Some(Ok(copy)) => copy,
        };
        self.slots[usize::from(to) % NUM_SLOTS] = Some(copy);
        OperationResult::Ok
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let live_contexts = self.slots.iter().flatten().filter(|ctx| !ctx.is_destroyed()).count();
        let phases = self.slots.iter().map(|slot| slot.as_ref().map(ModelContext::phase)).collect();
        ObservableState { live_contexts, phases }
    }
}
