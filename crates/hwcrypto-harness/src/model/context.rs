//! Reference context state machine.
//!
//! The model tracks sequencing only. It never computes a CRC, digest or
//! ciphertext; it predicts which calls succeed, which error kind each failing
//! call returns and which lifecycle phase the context ends up in.
//!
//! GCM authentication is predicted symbolically. A ciphertext is identified
//! by the key, IV and plaintext that produced it (empty ciphertexts are all
//! the same), and a tag verifies only when key, IV, AAD and ciphertext all
//! match the encryption that produced it.

use hwcrypto_core::{Algorithm, CrcConfig, Direction, Family, KeySize, Phase, SymmetricAlgorithm};

use super::operation::{OperationError, OperationResult};

type Outcome = Result<(), OperationError>;

/// One successful encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seal {
    key: Vec<u8>,
    iv: Vec<u8>,
    aad: Vec<u8>,
    plain_len: usize,
    ciphertext: Ciphertext,
}

/// Symbolic identity of a ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Ciphertext {
    Empty,
    Sealed { key: Vec<u8>, iv: Vec<u8>, plain: Vec<u8> },
    Opaque,
}

impl Ciphertext {
    fn of(key: &[u8], iv: &[u8], plain: &[u8]) -> Self {
        if plain.is_empty() {
            Self::Empty
        } else {
            Self::Sealed { key: key.to_vec(), iv: iv.to_vec(), plain: plain.to_vec() }
        }
    }

    fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Opaque, _) | (_, Self::Opaque) => false,
            _ => self == other,
        }
    }
}

/// Input of a decryption.
#[derive(Debug, Clone)]
pub enum CipherInput<'a> {
    /// Caller-chosen bytes.
    Bytes(&'a [u8]),
    /// Output of an earlier encryption.
    Replay(Option<&'a Seal>),
}

impl CipherInput<'_> {
    fn len(&self) -> usize {
        match self {
            Self::Bytes(bytes) => bytes.len(),
            Self::Replay(seal) => seal.map_or(0, |seal| seal.plain_len),
        }
    }

    fn ciphertext(&self) -> Ciphertext {
        match self {
            Self::Bytes([]) | Self::Replay(None) => Ciphertext::Empty,
            Self::Bytes(_) => Ciphertext::Opaque,
            Self::Replay(Some(seal)) => seal.ciphertext.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExpectedTag {
    Genuine(Seal),
    Bogus,
}

#[derive(Debug, Clone, Default)]
struct Cipher {
    key: Option<Vec<u8>>,
    iv: Option<Vec<u8>>,
    aad: Vec<u8>,
    tag: Option<Seal>,
    expected: Option<ExpectedTag>,
    used: bool,
    iv_spent: bool,
}

#[derive(Debug, Clone)]
enum ModelState {
    Rng { pulled: bool },
    Crc { configured: bool, computed: bool },
    Hash { fed: bool, finished: bool },
    Symmetric(Cipher),
    Destroyed,
}

/// Model of one context.
#[derive(Debug, Clone)]
pub struct ModelContext {
    algorithm: Algorithm,
    state: ModelState,
    last_seal: Option<Seal>,
}

impl ModelContext {
    /// A freshly created context.
    pub fn new(algorithm: Algorithm) -> Self {
        let state = match algorithm {
            Algorithm::Rng => ModelState::Rng { pulled: false },
            Algorithm::Crc(_) => ModelState::Crc { configured: false, computed: false },
            Algorithm::Hash(_) => ModelState::Hash { fed: false, finished: false },
            Algorithm::Symmetric(_) => ModelState::Symmetric(Cipher::default()),
        };
        Self { algorithm, state, last_seal: None }
    }

    /// Algorithm the context was created for.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Whether the context has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, ModelState::Destroyed)
    }

    /// Last successful encryption on this context.
    pub fn last_seal(&self) -> Option<&Seal> {
        self.last_seal.as_ref()
    }

    /// Predicted lifecycle phase.
    pub fn phase(&self) -> Phase {
        match &self.state {
            ModelState::Rng { pulled: false } => Phase::Created,
            ModelState::Rng { pulled: true } => Phase::Active,
            ModelState::Crc { configured: false, .. } => Phase::Created,
            ModelState::Crc { computed: false, .. } => Phase::Configured,
            ModelState::Crc { .. } => Phase::Active,
            ModelState::Hash { finished: true, .. } => Phase::Finished,
            ModelState::Hash { fed: true, .. } => Phase::Active,
            ModelState::Hash { .. } => Phase::Created,
            ModelState::Symmetric(cipher) => match (&cipher.key, &cipher.iv) {
                (None, _) => Phase::Created,
                _ if cipher.used => Phase::Active,
                (Some(_), Some(_)) => Phase::IvSet,
                (Some(_), None) => Phase::KeySet,
            },
            ModelState::Destroyed => Phase::Destroyed,
        }
    }

    /// Destroys the context.
    pub fn destroy(&mut self) -> OperationResult {
        if self.is_destroyed() {
            return OperationResult::Error(OperationError::InvalidHandle);
        }
        self.state = ModelState::Destroyed;
        OperationResult::Ok
    }

    /// Copy of the context for duplication.
    pub fn duplicate(&self) -> Result<Self, OperationError> {
        if self.is_destroyed() {
            return Err(OperationError::InvalidHandle);
        }
        Ok(self.clone())
    }

    fn misuse(&self, family: Family) -> OperationError {
        match self.state {
            ModelState::Destroyed => OperationError::InvalidHandle,
            _ => OperationError::WrongFamily { expected: self.algorithm.family(), actual: family },
        }
    }

    /// Draws a random word.
    pub fn next_u32(&mut self) -> OperationResult {
        let outcome = match &mut self.state {
            ModelState::Rng { pulled } => {
                *pulled = true;
                Ok(())
            },
            _ => Err(self.misuse(Family::Rng)),
        };
        done(outcome)
    }

    /// Applies CRC parameters.
    pub fn crc_configure(&mut self, config: &CrcConfig) -> OperationResult {
        let Algorithm::Crc(id) = self.algorithm else {
            return done(Err(self.misuse(Family::Crc)));
        };
        let ModelState::Crc { configured, .. } = &mut self.state else {
            return done(Err(self.misuse(Family::Crc)));
        };

        let outcome = if *configured {
            Err(OperationError::InvalidState)
        } else if !matches!(config.width, 8 | 16 | 32)
            || config.width != id.width()
            || config.validate().is_err()
        {
            Err(OperationError::InvalidConfig)
        } else {
            *configured = true;
            Ok(())
        };
        done(outcome)
    }

    /// Computes a CRC.
    pub fn crc_update(&mut self) -> OperationResult {
        let outcome = match &mut self.state {
            ModelState::Crc { configured: false, .. } => Err(OperationError::InvalidState),
            ModelState::Crc { computed, .. } => {
                *computed = true;
                Ok(())
            },
            _ => Err(self.misuse(Family::Crc)),
        };
        done(outcome)
    }

    /// Absorbs bytes into the digest.
    pub fn hash_update(&mut self) -> OperationResult {
        let outcome = match &mut self.state {
            ModelState::Hash { finished: true, .. } => Err(OperationError::InvalidState),
            ModelState::Hash { fed, .. } => {
                *fed = true;
                Ok(())
            },
            _ => Err(self.misuse(Family::Hash)),
        };
        done(outcome)
    }

    /// Finishes the digest with `digest_len` bytes requested.
    pub fn hash_finish(&mut self, digest_len: usize) -> OperationResult {
        let Algorithm::Hash(id) = self.algorithm else {
            return done(Err(self.misuse(Family::Hash)));
        };
        let outcome = match &mut self.state {
            ModelState::Hash { finished: true, .. } => Err(OperationError::InvalidState),
            ModelState::Hash { .. } if digest_len == 0 || digest_len > id.digest_len() => {
                Err(OperationError::InvalidLength(digest_len))
            },
            ModelState::Hash { finished, .. } => {
                *finished = true;
                Ok(())
            },
            _ => Err(self.misuse(Family::Hash)),
        };
        done(outcome)
    }

    /// Restarts the digest.
    pub fn hash_reset(&mut self) -> OperationResult {
        let outcome = match &mut self.state {
            ModelState::Hash { fed, finished } => {
                *fed = false;
                *finished = false;
                Ok(())
            },
            _ => Err(self.misuse(Family::Hash)),
        };
        done(outcome)
    }

    fn cipher(&mut self) -> Result<(SymmetricAlgorithm, &mut Cipher), OperationError> {
        let misuse = self.misuse(Family::Symmetric);
        match (self.algorithm, &mut self.state) {
            (Algorithm::Symmetric(mode), ModelState::Symmetric(cipher)) => Ok((mode, cipher)),
            _ => Err(misuse),
        }
    }

    /// Applies `key_bits` of `material`.
    pub fn set_key(&mut self, material: &[u8], key_bits: usize) -> OperationResult {
        done(self.cipher().and_then(|(_, cipher)| {
            let size = KeySize::from_bits(key_bits)
                .map_err(|_| OperationError::InvalidKeyLength(key_bits))?;
            let Some(key) = material.get(..size.bytes()) else {
                return Err(OperationError::InvalidKeyLength(material.len() * 8));
            };
            cipher.key = Some(key.to_vec());
            cipher.tag = None;
            cipher.expected = None;
            cipher.used = false;
            cipher.iv_spent = false;
            Ok(())
        }))
    }

    /// Applies an IV.
    pub fn set_iv(&mut self, iv: &[u8]) -> OperationResult {
        done(self.cipher().and_then(|(mode, cipher)| {
            let Some(expected) = mode.iv_len() else {
                return Ok(());
            };
            if iv.len() != expected {
                return Err(OperationError::InvalidLength(iv.len()));
            }
            cipher.iv = Some(iv.to_vec());
            cipher.tag = None;
            cipher.iv_spent = false;
            Ok(())
        }))
    }

    /// Sets GCM additional authenticated data.
    pub fn set_aad(&mut self, aad: &[u8]) -> OperationResult {
        done(self.cipher().and_then(|(mode, cipher)| {
            if !mode.is_authenticated() {
                return Err(OperationError::InvalidState);
            }
            aad.clone_into(&mut cipher.aad);
            cipher.tag = None;
            Ok(())
        }))
    }

    /// Sets the tag to verify. A genuine request uses the context's own tag
    /// when it has one.
    pub fn set_tag(&mut self, genuine: bool) -> OperationResult {
        done(self.cipher().and_then(|(mode, cipher)| {
            if !mode.is_authenticated() {
                return Err(OperationError::InvalidState);
            }
            cipher.expected = match (&cipher.tag, genuine) {
                (Some(seal), true) => Some(ExpectedTag::Genuine(seal.clone())),
                _ => Some(ExpectedTag::Bogus),
            };
            Ok(())
        }))
    }

    /// Whether the context currently holds a GCM tag.
    pub fn has_tag(&self) -> bool {
        matches!(&self.state, ModelState::Symmetric(Cipher { tag: Some(_), .. }))
    }

    /// Reads the last GCM tag.
    pub fn tag(&mut self) -> OperationResult {
        done(self.cipher().and_then(|(mode, cipher)| {
            if !mode.is_authenticated() || cipher.tag.is_none() {
                return Err(OperationError::InvalidState);
            }
            Ok(())
        }))
    }

    /// Encrypts `plain`.
    pub fn encrypt(&mut self, plain: &[u8]) -> OperationResult {
        let seal = self.cipher().and_then(|(mode, cipher)| {
            let (key, iv) = ready(mode, cipher, plain.len())?;
            if mode.requires_unique_iv() && cipher.iv_spent {
                return Err(OperationError::InvalidState);
            }
            let seal = Seal {
                ciphertext: Ciphertext::of(&key, &iv, plain),
                key,
                iv,
                aad: cipher.aad.clone(),
                plain_len: plain.len(),
            };
            if mode.is_authenticated() {
                cipher.tag = Some(seal.clone());
            }
            cipher.used = true;
            cipher.iv_spent = mode.requires_unique_iv();
            Ok(seal)
        });
        done(seal.map(|seal| self.last_seal = Some(seal)))
    }

    /// Decrypts `input`.
    pub fn decrypt(&mut self, input: &CipherInput<'_>) -> OperationResult {
        done(self.cipher().and_then(|(mode, cipher)| {
            let (key, iv) = ready(mode, cipher, input.len())?;
            if mode.is_authenticated() {
                let verified = match &cipher.expected {
                    None => return Err(OperationError::InvalidState),
                    Some(ExpectedTag::Bogus) => false,
                    Some(ExpectedTag::Genuine(seal)) => {
                        seal.key == key
                            && seal.iv == iv
                            && seal.aad == cipher.aad
                            && seal.ciphertext.matches(&input.ciphertext())
                    },
                };
                if !verified {
                    return Err(OperationError::AuthFailed);
                }
            }
            cipher.used = true;
            Ok(())
        }))
    }

    /// Applies a cipher operation in `direction`.
    pub fn crypt(&mut self, direction: Direction, data: &[u8]) -> OperationResult {
        match direction {
            Direction::Encrypt => self.encrypt(data),
            Direction::Decrypt => self.decrypt(&CipherInput::Bytes(data)),
        }
    }
}

/// Key and IV of a context ready to process `len` bytes.
fn ready(
    mode: SymmetricAlgorithm,
    cipher: &Cipher,
    len: usize,
) -> Result<(Vec<u8>, Vec<u8>), OperationError> {
    let key = cipher.key.clone().ok_or(OperationError::InvalidState)?;
    let iv = match mode.iv_len() {
        None => Vec::new(),
        Some(_) => cipher.iv.clone().ok_or(OperationError::InvalidState)?,
    };
    if mode.requires_block_multiple() && len % SymmetricAlgorithm::BLOCK_SIZE != 0 {
        return Err(OperationError::InvalidLength(len));
    }
    Ok((key, iv))
}

fn done(outcome: Outcome) -> OperationResult {
    match outcome {
        Ok(()) => OperationResult::Ok,
        Err(err) => OperationResult::Error(err),
    }
}
