//! True-random generation.

use super::{Context, State};
use crate::{
    algorithm::Family,
    backend::Backend,
    error::Result,
};

impl<B: Backend> Context<'_, B> {
    /// Draws the next 32-bit word from the device random stream.
    ///
    /// The word is the next four stream bytes in little-endian order.
    pub fn next_u32(&mut self) -> Result<u32> {
        let mut word = [0u8; 4];
        self.fill(&mut word)?;
        Ok(u32::from_le_bytes(word))
    }

    /// Fills `buffer` from the device random stream.
    pub fn fill(&mut self, buffer: &mut [u8]) -> Result<()> {
        if !matches!(self.state, State::Rng { .. }) {
            return Err(self.state.misuse(self.algorithm, Family::Rng));
        }

        let result = self.backend().rng_fill(buffer).map_err(Into::into);
        self.guard(result)?;
        self.state = State::Rng { pulled: true };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        algorithm::Algorithm, context::Phase, device::Device, error::Error, mock::MockBackend,
    };

    #[test]
    fn next_u32_reads_little_endian() {
        let device = Device::new(MockBackend::new());
        let mut ctx = device.create_context(Algorithm::Rng).unwrap();
        assert_eq!(ctx.phase(), Phase::Created);

        // Mock stream is 0, 1, 2, 3, ...
        assert_eq!(ctx.next_u32().unwrap(), 0x0302_0100);
        assert_eq!(ctx.next_u32().unwrap(), 0x0706_0504);
        assert_eq!(ctx.phase(), Phase::Active);
    }

    #[test]
    fn busy_leaves_state_and_is_retryable() {
        let device = Device::new(MockBackend::new());
        let mut ctx = device.create_context(Algorithm::Rng).unwrap();

        device.backend().fail_next_with_busy();
        let err = ctx.next_u32().unwrap_err();
        assert_eq!(err, Error::DeviceBusy);
        assert!(err.is_retryable());
        assert_eq!(ctx.phase(), Phase::Created);
        assert!(ctx.next_u32().is_ok());
    }

    #[test]
    fn fill_rejects_non_rng_context() {
        let device = Device::new(MockBackend::new());
        let mut ctx = device
            .create_context(Algorithm::Hash(crate::algorithm::HashAlgorithm::Sha256))
            .unwrap();
        let mut buffer = [0u8; 8];
        assert!(matches!(ctx.fill(&mut buffer), Err(Error::WrongFamily { .. })));
    }
}
