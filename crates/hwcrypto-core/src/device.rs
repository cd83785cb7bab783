//! Device handle and context factory.
//!
//! A [`Device`] wraps one backend. It is obtained once and passed by
//! reference to every call site; there is no ambient default device in this
//! crate. Contexts borrow their device, so the borrow checker guarantees that
//! no context outlives it.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    algorithm::{Algorithm, AlgorithmSet},
    backend::{Backend, DeviceId},
    context::{Context, State},
    error::{Error, Result},
};

/// Handle to one crypto accelerator.
///
/// Identity and capabilities are read once from the backend at construction
/// and never change. The only mutable part is the live-context counter.
pub struct Device<B: Backend> {
    backend: B,
    id: DeviceId,
    capabilities: AlgorithmSet,
    live: AtomicUsize,
}

impl<B: Backend> Device<B> {
    /// Wraps `backend`, snapshotting its identity and capability table.
    pub fn new(backend: B) -> Self {
        let id = backend.id();
        let capabilities = backend.capabilities();
        Self { backend, id, capabilities, live: AtomicUsize::new(0) }
    }

    /// Device identity.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Algorithms this device implements.
    pub fn capabilities(&self) -> AlgorithmSet {
        self.capabilities
    }

    /// Whether `algorithm` can be opened on this device.
    pub fn supports(&self, algorithm: Algorithm) -> bool {
        self.capabilities.has(algorithm)
    }

    /// Number of contexts created on this device and not yet destroyed.
    pub fn live_contexts(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// The backend this device dispatches to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Opens a context for `algorithm`.
    ///
    /// Fails with [`Error::Unsupported`] when the device lacks the algorithm.
    /// No resource is held after any failure.
    pub fn create_context(&self, algorithm: Algorithm) -> Result<Context<'_, B>> {
        if !self.supports(algorithm) {
            return Err(Error::Unsupported { algorithm });
        }

        let state = State::initial(&self.backend, algorithm)?;
        self.live.fetch_add(1, Ordering::AcqRel);
        Ok(Context::new(self, algorithm, state))
    }

    /// Destroys `ctx`, releasing its resources and wiping key material.
    ///
    /// Fails with [`Error::InvalidHandle`] when `ctx` was created by another
    /// device or has already been destroyed; the context is not touched in
    /// that case.
    pub fn destroy_context(&self, ctx: &mut Context<'_, B>) -> Result<()> {
        if !ctx.belongs_to(self) || ctx.is_destroyed() {
            return Err(Error::InvalidHandle);
        }
        ctx.release();
        Ok(())
    }

    pub(crate) fn acquire_slot(&self) {
        self.live.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn release_slot(&self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<B: Backend> std::fmt::Debug for Device<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("capabilities", &self.capabilities)
            .field("live_contexts", &self.live_contexts())
            .finish_non_exhaustive()
    }
}
