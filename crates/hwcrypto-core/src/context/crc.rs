//! CRC checksums.
//!
//! CRC contexts are single-shot: every [`Context::crc_update`] computes over
//! exactly the bytes it is given, seeded from the configured initial value.
//! Two calls do not continue each other.

use super::{Context, Phase, State};
use crate::{
    algorithm::{Algorithm, Family},
    backend::Backend,
    config::CrcConfig,
    error::{Error, Result},
};

#[derive(Debug, Clone, Default)]
pub(crate) struct CrcState {
    config: Option<CrcConfig>,
    computed: bool,
}

impl CrcState {
    pub(crate) fn phase(&self) -> Phase {
        match (self.config, self.computed) {
            (None, _) => Phase::Created,
            (Some(_), false) => Phase::Configured,
            (Some(_), true) => Phase::Active,
        }
    }
}

impl<B: Backend> Context<'_, B> {
    /// Applies CRC parameters. Must be called exactly once.
    ///
    /// Fails with [`Error::InvalidConfig`] when the width is unsupported by
    /// the device or differs from the algorithm's width, or when a field does
    /// not fit in `width` bits. A second call fails with
    /// [`Error::InvalidState`] and keeps the applied parameters.
    pub fn crc_configure(&mut self, config: CrcConfig) -> Result<()> {
        let algorithm = self.algorithm;
        let backend = self.backend();
        let State::Crc(crc) = &mut self.state else {
            return Err(self.state.misuse(algorithm, Family::Crc));
        };

        if crc.config.is_some() {
            return Err(Error::InvalidState { reason: "CRC already configured" });
        }
        if !backend.supports_crc_width(config.width) {
            return Err(Error::InvalidConfig { reason: "CRC width not supported by device" });
        }
        if let Algorithm::Crc(id) = algorithm {
            if id.width() != config.width {
                return Err(Error::InvalidConfig { reason: "CRC width does not match algorithm" });
            }
        }
        config.validate()?;

        crc.config = Some(config);
        Ok(())
    }

    /// Computes the CRC of `data` from the configured initial value.
    pub fn crc_update(&mut self, data: &[u8]) -> Result<u32> {
        let algorithm = self.algorithm;
        let backend = self.backend();
        let State::Crc(crc) = &mut self.state else {
            return Err(self.state.misuse(algorithm, Family::Crc));
        };
        let Some(config) = crc.config else {
            return Err(Error::InvalidState { reason: "CRC not configured" });
        };

        let result = backend.crc_compute(&config, data).map_err(Error::from);
        if result.is_ok() {
            crc.computed = true;
        }
        self.guard(result)
    }

    /// Parameters applied by [`crc_configure`](Self::crc_configure), if any.
    pub fn crc_config(&self) -> Option<CrcConfig> {
        match &self.state {
            State::Crc(crc) => crc.config,
            _ => None,
        }
    }
}
