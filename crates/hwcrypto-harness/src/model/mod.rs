//! Reference model for model-based testing.
//!
//! The model captures the context sequencing rules without any cryptography.
//! It serves as the oracle against which real devices are verified: the same
//! [`Operation`] sequence is applied to a [`ModelWorld`] and a [`RealWorld`],
//! and every result and every [`ObservableState`] must agree.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Sequencing only: predicts which calls succeed, never what they compute
//! - Deterministic: Same inputs produce same outputs

mod context;
pub mod operation;
mod real;
mod world;

pub use context::{CipherInput, ModelContext, Seal};
pub use operation::{
    BOGUS_TAG, NUM_SLOTS, Operation, OperationError, OperationResult, Slot, SmallData,
};
pub use real::RealWorld;
pub use world::{ModelWorld, ObservableState};
