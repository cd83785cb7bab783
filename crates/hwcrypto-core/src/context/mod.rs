//! Crypto contexts.
//!
//! A [`Context`] is one in-flight use of one algorithm on one device. Its
//! state is a closed set of variants, one per primitive family, each carrying
//! only what that family needs:
//!
//! ```text
//! Rng        Created ─► Active
//! Crc        Created ─► Configured ─► Active
//! Hash       Created ─► Active(partial) ─► Finished
//! Symmetric  Created ─► KeySet ─► IvSet ─► Active
//!
//! any ──CryptoFault──► Faulted      any ──destroy──► Destroyed
//! ```
//!
//! The per-family operations live in the submodules. Each checks that the
//! context is alive and of the right family before doing anything else.
//!
//! # Ownership
//!
//! Every operation takes `&mut self`: a context has exactly one user at a time
//! and performs no internal locking. Callers that need concurrent crypto open
//! one context per thread; the device is shared.
//!
//! # Destruction
//!
//! Operations are synchronous and borrow the context mutably, so no operation
//! can be in flight when the context is destroyed or dropped. Destruction
//! therefore releases immediately (drain-then-release with an empty queue).

mod crc;
mod hash;
mod rng;
mod symmetric;

use crate::{
    algorithm::{Algorithm, Family},
    backend::{Backend, DeviceId},
    device::Device,
    error::{Error, Result},
};

pub(crate) use self::{crc::CrcState, hash::HashState, symmetric::SymmetricState};

/// Observable lifecycle phase of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Created, no configuration or data yet.
    Created,
    /// CRC parameters applied.
    Configured,
    /// Cipher key applied, IV missing or not used by the mode.
    KeySet,
    /// Cipher key and IV applied.
    IvSet,
    /// At least one data operation completed.
    Active,
    /// Hash digest produced.
    Finished,
    /// A hardware fault occurred; only destruction is possible.
    Faulted,
    /// Released.
    Destroyed,
}

#[derive(Clone)]
pub(crate) enum State<H> {
    Rng { pulled: bool },
    Crc(CrcState),
    Hash(HashState<H>),
    Symmetric(SymmetricState),
    Faulted,
    Destroyed,
}

impl<H> State<H> {
    pub(crate) fn initial<B>(backend: &B, algorithm: Algorithm) -> Result<Self>
    where
        B: Backend<HashState = H>,
    {
        Ok(match algorithm {
            Algorithm::Rng => Self::Rng { pulled: false },
            Algorithm::Crc(_) => Self::Crc(CrcState::default()),
            Algorithm::Hash(hash) => Self::Hash(HashState::fresh(backend.hash_init(hash)?)),
            Algorithm::Symmetric(_) => Self::Symmetric(SymmetricState::default()),
        })
    }

    /// Error for an operation of `family` that does not match this state.
    fn misuse(&self, algorithm: Algorithm, family: Family) -> Error {
        match self {
            Self::Destroyed => Error::InvalidHandle,
            Self::Faulted => {
                Error::InvalidState { reason: "context faulted; destroy and recreate" }
            },
            _ => Error::WrongFamily { expected: algorithm.family(), actual: family },
        }
    }
}

/// A bound, stateful handle for one algorithm on one device.
///
/// Created by [`Device::create_context`]. The lifetime ties the context to
/// its device.
pub struct Context<'d, B: Backend> {
    device: &'d Device<B>,
    algorithm: Algorithm,
    state: State<B::HashState>,
}

impl<'d, B: Backend> Context<'d, B> {
    pub(crate) fn new(
        device: &'d Device<B>,
        algorithm: Algorithm,
        state: State<B::HashState>,
    ) -> Self {
        Self { device, algorithm, state }
    }

    /// Algorithm this context was created for.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Primitive family; fixed for the lifetime of the context.
    pub fn family(&self) -> Family {
        self.algorithm.family()
    }

    /// Identity of the owning device.
    pub fn device_id(&self) -> DeviceId {
        self.device.id()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        match &self.state {
            State::Rng { pulled: false } => Phase::Created,
            State::Rng { pulled: true } => Phase::Active,
            State::Crc(crc) => crc.phase(),
            State::Hash(hash) => hash.phase(),
            State::Symmetric(sym) => sym.phase(self.algorithm),
            State::Faulted => Phase::Faulted,
            State::Destroyed => Phase::Destroyed,
        }
    }

    /// Whether the context has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, State::Destroyed)
    }

    /// Destroys the context through its owning device.
    ///
    /// Permitted from every phase. A second call fails with
    /// [`Error::InvalidHandle`].
    pub fn destroy(&mut self) -> Result<()> {
        let device = self.device;
        device.destroy_context(self)
    }

    /// Creates an independent copy of this context on the same device,
    /// including partial hash state, CRC parameters and cipher key and IV.
    pub fn duplicate(&self) -> Result<Self> {
        match &self.state {
            State::Destroyed => Err(Error::InvalidHandle),
            State::Faulted => {
                Err(Error::InvalidState { reason: "context faulted; destroy and recreate" })
            },
            state => {
                let state = state.clone();
                self.device.acquire_slot();
                Ok(Self { device: self.device, algorithm: self.algorithm, state })
            },
        }
    }

    pub(crate) fn belongs_to(&self, device: &Device<B>) -> bool {
        std::ptr::eq(self.device, device)
    }

    pub(crate) fn release(&mut self) {
        if !self.is_destroyed() {
            // Dropping the previous state wipes any key material.
            self.state = State::Destroyed;
            self.device.release_slot();
        }
    }

    fn backend(&self) -> &'d B {
        self.device.backend()
    }

    /// Moves the context to `Faulted` when `result` carries a fatal error.
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() {
                self.state = State::Faulted;
            }
        }
        result
    }
}

impl<B: Backend> Drop for Context<'_, B> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<B: Backend> std::fmt::Debug for Context<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("device", &self.device.id())
            .field("algorithm", &self.algorithm)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
