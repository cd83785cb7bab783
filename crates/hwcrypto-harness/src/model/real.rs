//! Real-device side of model-based testing.
//!
//! [`RealWorld`] mirrors [`ModelWorld`](super::ModelWorld): the same slots,
//! the same operation decoding, but every operation runs against contexts of
//! an actual [`Device`] through [`Context::execute`].

use hwcrypto_core::{Backend, Context, Device, Direction, Request, Response, Result};

use super::{
    operation::{BOGUS_TAG, NUM_SLOTS, Operation, OperationError, OperationResult, Slot},
    world::ObservableState,
};

struct RealSlot<'d, B: Backend> {
    ctx: Context<'d, B>,
    last_ciphertext: Vec<u8>,
}

/// Real system wrapper that mirrors `ModelWorld`'s interface.
pub struct RealWorld<'d, B: Backend> {
    device: &'d Device<B>,
    slots: Vec<Option<RealSlot<'d, B>>>,
}

impl<'d, B: Backend> RealWorld<'d, B> {
    /// Creates an empty world over `device`.
    pub fn new(device: &'d Device<B>) -> Self {
        Self { device, slots: (0..NUM_SLOTS).map(|_| None).collect() }
    }

    /// The device under test.
    pub fn device(&self) -> &'d Device<B> {
        self.device
    }

    /// Context in `slot`, if any.
    pub fn context(&self, slot: Slot) -> Option<&Context<'d, B>> {
        self.slots[usize::from(slot) % NUM_SLOTS].as_ref().map(|entry| &entry.ctx)
    }

    /// Apply an operation to the device.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Create { slot, algorithm } => self.apply_create(*slot, *algorithm),
            Operation::Destroy { slot } => self.with(*slot, |entry| entry.ctx.destroy().into()),
            Operation::Duplicate { from, to } => self.apply_duplicate(*from, *to),
            Operation::NextU32 { slot } => self.execute(*slot, Request::NextU32),
            Operation::CrcConfigure { slot, preset, corrupt } => {
                let config = Operation::crc_config(*preset, *corrupt);
                self.execute(*slot, Request::CrcConfigure(config))
            },
            Operation::CrcUpdate { slot, data } => {
                self.execute(*slot, Request::CrcUpdate(&data.to_bytes()))
            },
            Operation::HashUpdate { slot, data } => {
                self.execute(*slot, Request::HashUpdate(&data.to_bytes()))
            },
            Operation::HashFinish { slot, digest_len } => {
                let digest_len = usize::from(*digest_len);
                self.execute(*slot, Request::HashFinish { digest_len })
            },
            Operation::HashReset { slot } => self.execute(*slot, Request::HashReset),
            Operation::SetKey { slot, bits_class, len_class } => {
                let key = Operation::key_material(*len_class);
                let bits = Operation::key_bits(*bits_class);
                self.execute(*slot, Request::SetKey { key: &key, bits })
            },
            Operation::SetIv { slot, len_class, seed } => {
                self.execute(*slot, Request::SetIv(&Operation::iv_bytes(*len_class, *seed)))
            },
            Operation::SetAad { slot, data } => {
                self.execute(*slot, Request::SetAad(&data.to_bytes()))
            },
            Operation::SetTag { slot, genuine } => self.with(*slot, |entry| {
                let mut tag = BOGUS_TAG;
                if *genuine && entry.ctx.tag(&mut tag).is_err() {
                    tag = BOGUS_TAG;
                }
                entry.ctx.execute(Request::SetTag(&tag)).into()
            }),
            Operation::Crypt { slot, encrypt, data } => self.with(*slot, |entry| {
                let direction = Operation::direction(*encrypt);
                let input = data.to_bytes();
                let result = entry.ctx.execute(Request::Crypt { direction, input: &input });
                record(entry, direction, result)
            }),
            Operation::Replay { slot } => self.with(*slot, |entry| {
                let input = entry.last_ciphertext.clone();
                let direction = Direction::Decrypt;
                entry.ctx.execute(Request::Crypt { direction, input: &input }).into()
            }),
            Operation::Tag { slot } => self.execute(*slot, Request::Tag),
        }
    }

    fn with(
        &mut self,
        slot: Slot,
        op: impl FnOnce(&mut RealSlot<'d, B>) -> OperationResult,
    ) -> OperationResult {
        match self.slots[usize::from(slot) % NUM_SLOTS].as_mut() {
            Some(entry) => op(entry),
            None => OperationResult::Error(OperationError::EmptySlot),
        }
    }

    fn execute(&mut self, slot: Slot, request: Request<'_>) -> OperationResult {
        self.with(slot, |entry| entry.ctx.execute(request).into())
    }

    fn apply_create(&mut self, slot: Slot, index: u8) -> OperationResult {
        match self.device.create_context(Operation::algorithm(index)) {
            Ok(ctx) => {
                let entry = RealSlot { ctx, last_ciphertext: Vec::new() };
                self.slots[usize::from(slot) % NUM_SLOTS] = Some(entry);
                OperationResult::Ok
            },
            Err(err) => OperationResult::Error(OperationError::from(&err)),
        }
    }

    fn apply_duplicate(&mut self, from: Slot, to: Slot) -> OperationResult {
        let Some(source) = self.slots[usize::from(from) % NUM_SLOTS].as_ref() else {
            return OperationResult::Error(OperationError::EmptySlot);
        };
        let copy = match source.ctx.duplicate() {
            Ok(ctx) => RealSlot { ctx, last_ciphertext: source.last_ciphertext.clone() },
            Err(err) => return OperationResult::Error(OperationError::from(&err)),
        };
        self.slots[usize::from(to) % NUM_SLOTS] = Some(copy);
        OperationResult::Ok
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let phases =
            self.slots.iter().map(|slot| slot.as_ref().map(|entry| entry.ctx.phase())).collect();
        ObservableState { live_contexts: self.device.live_contexts(), phases }
    }
}

fn record<B: Backend>(
    entry: &mut RealSlot<'_, B>,
    direction: Direction,
    result: Result<Response>,
) -> OperationResult {
    if let (Direction::Encrypt, Ok(Response::Output(ciphertext))) = (direction, &result) {
        entry.last_ciphertext.clone_from(ciphertext);
    }
    result.into()
}
