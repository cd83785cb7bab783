//! AES block cipher modes, including GCM.
//!
//! The IV is applied afresh on every [`Context::crypt`] call; it never chains
//! from one call to the next. Encrypting and then decrypting on the same
//! context therefore round-trips.
//!
//! GCM keeps two extra pieces of state: the tag produced by the last
//! encryption and the tag the next decryption must verify against. Changing
//! key, IV or AAD clears the produced tag.
//!
//! CFB, CTR and GCM derive their keystream from the IV. After one successful
//! encryption the IV is spent: a second encryption fails with
//! [`Error::InvalidState`] until `set_iv` or `set_key` is called again.
//! Decryption is not limited. Choosing an IV that was never used with the key
//! remains the caller's job.

use zeroize::Zeroizing;

use super::{Context, Phase, State};
use crate::{
    algorithm::{Algorithm, Direction, Family, SymmetricAlgorithm},
    backend::{Backend, CipherRequest, TAG_LEN},
    config::KeySize,
    error::{Error, Result},
};

#[derive(Clone, Default)]
pub(crate) struct SymmetricState {
    key: Option<Zeroizing<Vec<u8>>>,
    iv: Option<Vec<u8>>,
    aad: Vec<u8>,
    tag: Option<[u8; TAG_LEN]>,
    expected_tag: Option<[u8; TAG_LEN]>,
    used: bool,
    iv_spent: bool,
}

impl SymmetricState {
    pub(crate) fn phase(&self, algorithm: Algorithm) -> Phase {
        let takes_iv = matches!(algorithm, Algorithm::Symmetric(mode) if mode.iv_len().is_some());
        match (&self.key, &self.iv) {
            (None, _) => Phase::Created,
            _ if self.used => Phase::Active,
            (Some(_), Some(_)) if takes_iv => Phase::IvSet,
            (Some(_), _) => Phase::KeySet,
        }
    }
}

fn not_gcm() -> Error {
    Error::InvalidState { reason: "only available on AES-GCM contexts" }
}

impl<B: Backend> Context<'_, B> {
    /// Applies a `key_bits`-bit key taken from the front of `key`.
    ///
    /// `key_bits` must be 128, 192 or 256 and `key` must hold at least that
    /// many bits, otherwise [`Error::InvalidKeyLength`]. Re-keying replaces
    /// the old key and clears any GCM tag.
    pub fn set_key(&mut self, key: &[u8], key_bits: usize) -> Result<()> {
        let sym = self.symmetric_mut()?;
        let size = KeySize::from_bits(key_bits)?;
        let Some(material) = key.get(..size.bytes()) else {
            return Err(Error::InvalidKeyLength { bits: key.len() * 8 });
        };

        sym.key = Some(Zeroizing::new(material.to_vec()));
        sym.tag = None;
        sym.expected_tag = None;
        sym.used = false;
        sym.iv_spent = false;
        Ok(())
    }

    /// Applies the IV or GCM nonce.
    ///
    /// CBC, CFB and CTR take 16 bytes, GCM takes 12; anything else fails with
    /// [`Error::InvalidLength`]. ECB accepts and ignores any IV.
    pub fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        let mode = self.mode()?;
        let sym = self.symmetric_mut()?;
        let Some(expected) = mode.iv_len() else {
            return Ok(());
        };
        if iv.len() != expected {
            return Err(Error::InvalidLength {
                len: iv.len(),
                reason: "IV length does not match mode",
            });
        }

        sym.iv = Some(iv.to_vec());
        sym.tag = None;
        sym.iv_spent = false;
        Ok(())
    }

    /// Sets the additional authenticated data for subsequent GCM operations.
    pub fn set_aad(&mut self, aad: &[u8]) -> Result<()> {
        let mode = self.mode()?;
        let sym = self.symmetric_mut()?;
        if !mode.is_authenticated() {
            return Err(not_gcm());
        }

        aad.clone_into(&mut sym.aad);
        sym.tag = None;
        Ok(())
    }

    /// Sets the tag the next GCM decryption must verify against.
    pub fn set_tag(&mut self, tag: &[u8]) -> Result<()> {
        let mode = self.mode()?;
        let sym = self.symmetric_mut()?;
        if !mode.is_authenticated() {
            return Err(not_gcm());
        }
        let Ok(tag) = <[u8; TAG_LEN]>::try_from(tag) else {
            return Err(Error::InvalidLength { len: tag.len(), reason: "GCM tag must be 16 bytes" });
        };

        sym.expected_tag = Some(tag);
        Ok(())
    }

    /// Copies the tag produced by the last GCM encryption into `out`.
    pub fn tag(&self, out: &mut [u8]) -> Result<usize> {
        let State::Symmetric(sym) = &self.state else {
            return Err(self.state.misuse(self.algorithm, Family::Symmetric));
        };
        if !self.mode()?.is_authenticated() {
            return Err(not_gcm());
        }
        let Some(tag) = sym.tag else {
            return Err(Error::InvalidState { reason: "no tag before an encryption" });
        };
        let Some(dst) = out.get_mut(..TAG_LEN) else {
            return Err(Error::InvalidLength { len: out.len(), reason: "output shorter than tag" });
        };

        dst.copy_from_slice(&tag);
        Ok(TAG_LEN)
    }

    /// Encrypts or decrypts `input` into the front of `output`.
    ///
    /// Requires a key, and an IV for every mode except ECB. ECB and CBC take
    /// whole blocks only. `output` must be at least as long as `input`. On any
    /// error `output` is left untouched.
    pub fn crypt(&mut self, direction: Direction, input: &[u8], output: &mut [u8]) -> Result<()> {
        if output.len() < input.len() {
            // Family and liveness errors take precedence over length errors.
            self.symmetric_mut()?;
            return Err(Error::InvalidLength {
                len: output.len(),
                reason: "output shorter than input",
            });
        }

        let result = self.transform(direction, input)?;
        output[..input.len()].copy_from_slice(&result);
        Ok(())
    }

    /// Encrypts or decrypts `buffer` in place.
    pub fn crypt_in_place(&mut self, direction: Direction, buffer: &mut [u8]) -> Result<()> {
        let result = self.transform(direction, buffer)?;
        buffer.copy_from_slice(&result);
        Ok(())
    }

    /// Key currently applied, if any.
    pub fn key(&self) -> Option<&[u8]> {
        match &self.state {
            State::Symmetric(sym) => sym.key.as_deref().map(Vec::as_slice),
            _ => None,
        }
    }

    /// IV currently applied, if any. Always `None` for ECB.
    pub fn iv(&self) -> Option<&[u8]> {
        match &self.state {
            State::Symmetric(sym) => sym.iv.as_deref(),
            _ => None,
        }
    }

    fn mode(&self) -> Result<SymmetricAlgorithm> {
        match self.algorithm {
            Algorithm::Symmetric(mode) => Ok(mode),
            _ => Err(self.state.misuse(self.algorithm, Family::Symmetric)),
        }
    }

    fn symmetric_mut(&mut self) -> Result<&mut SymmetricState> {
        match &mut self.state {
            State::Symmetric(sym) => Ok(sym),
            state => Err(state.misuse(self.algorithm, Family::Symmetric)),
        }
    }

    /// Runs the cipher over a scratch copy of `input`, so nothing the caller
    /// owns is written unless the whole operation succeeds.
    fn transform(&mut self, direction: Direction, input: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let mode = self.mode()?;
        let backend = self.backend();
        let sym = self.symmetric_mut()?;

        let Some(key) = sym.key.as_deref() else {
            return Err(Error::InvalidState { reason: "key not set" });
        };
        let iv: &[u8] = match mode.iv_len() {
            None => &[],
            Some(_) => sym.iv.as_deref().ok_or(Error::InvalidState { reason: "IV not set" })?,
        };
        if mode.requires_block_multiple() && input.len() % SymmetricAlgorithm::BLOCK_SIZE != 0 {
            return Err(Error::InvalidLength {
                len: input.len(),
                reason: "not a multiple of the block size",
            });
        }
        let encrypting = direction == Direction::Encrypt;
        if encrypting && mode.requires_unique_iv() && sym.iv_spent {
            return Err(Error::InvalidState {
                reason: "IV already used for an encryption; set a fresh IV",
            });
        }

        let mut buffer = Zeroizing::new(input.to_vec());
        let result = match (mode, direction) {
            (SymmetricAlgorithm::AesGcm, Direction::Encrypt) => {
                backend.gcm_seal(key, iv, &sym.aad, buffer.as_mut_slice()).map(Some)
            },
            (SymmetricAlgorithm::AesGcm, Direction::Decrypt) => {
                let Some(expected) = sym.expected_tag else {
                    return Err(Error::InvalidState { reason: "GCM decryption requires a tag" });
                };
                backend.gcm_open(key, iv, &sym.aad, buffer.as_mut_slice(), &expected).map(|()| None)
            },
            _ => {
                let request = CipherRequest { algorithm: mode, direction, key, iv };
                backend.cipher_crypt(request, buffer.as_mut_slice()).map(|()| None)
            },
        };

        let result = result.map_err(Error::from).map(|tag| {
            if tag.is_some() {
                sym.tag = tag;
            }
            sym.used = true;
            sym.iv_spent |= encrypting && mode.requires_unique_iv();
            buffer
        });
        self.guard(result)
    }
}
