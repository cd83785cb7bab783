//! Uniform request/response dispatch over contexts.
//!
//! [`Context::execute`] is the single entry point for callers that drive
//! contexts generically (harnesses, fuzzers, RPC front ends). Each request
//! names the family it belongs to and is routed through the same family
//! checks as the typed methods.

use crate::{
    algorithm::{Direction, Family},
    backend::{Backend, TAG_LEN},
    config::CrcConfig,
    context::Context,
    error::Result,
};

const MAX_DIGEST_LEN: usize = 64;

/// One operation on a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    /// Draw a 32-bit random word.
    NextU32,
    /// Draw `len` random bytes.
    Fill {
        /// Number of bytes.
        len: usize,
    },
    /// Apply CRC parameters.
    CrcConfigure(CrcConfig),
    /// Compute a CRC over the bytes.
    CrcUpdate(&'a [u8]),
    /// Absorb bytes into a digest.
    HashUpdate(&'a [u8]),
    /// Finish a digest, keeping the first `digest_len` bytes.
    HashFinish {
        /// Requested digest length.
        digest_len: usize,
    },
    /// Restart a digest.
    HashReset,
    /// Apply a cipher key.
    SetKey {
        /// Key material.
        key: &'a [u8],
        /// Key size in bits.
        bits: usize,
    },
    /// Apply an IV or nonce.
    SetIv(&'a [u8]),
    /// Set GCM additional authenticated data.
    SetAad(&'a [u8]),
    /// Set the GCM tag to verify on decryption.
    SetTag(&'a [u8]),
    /// Encrypt or decrypt.
    Crypt {
        /// Direction.
        direction: Direction,
        /// Input bytes.
        input: &'a [u8],
    },
    /// Read the last GCM tag.
    Tag,
}

impl Request<'_> {
    /// Family the request belongs to.
    pub const fn family(&self) -> Family {
        match self {
            Self::NextU32 | Self::Fill { .. } => Family::Rng,
            Self::CrcConfigure(_) | Self::CrcUpdate(_) => Family::Crc,
            Self::HashUpdate(_) | Self::HashFinish { .. } | Self::HashReset => Family::Hash,
            Self::SetKey { .. }
            | Self::SetIv(_)
            | Self::SetAad(_)
            | Self::SetTag(_)
            | Self::Crypt { .. }
            | Self::Tag => Family::Symmetric,
        }
    }
}

/// Result of a successful [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Operation completed with no output.
    Done,
    /// Random word.
    Random(u32),
    /// Random bytes.
    Bytes(Vec<u8>),
    /// CRC value.
    Crc(u32),
    /// Truncated digest.
    Digest(Vec<u8>),
    /// Cipher output.
    Output(Vec<u8>),
    /// GCM tag.
    Tag([u8; TAG_LEN]),
}

impl<B: Backend> Context<'_, B> {
    /// Executes `request` against this context.
    ///
    /// A request for another family fails with
    /// [`Error::WrongFamily`](crate::Error::WrongFamily) and leaves the
    /// context untouched.
    pub fn execute(&mut self, request: Request<'_>) -> Result<Response> {
        match request {
            Request::NextU32 => self.next_u32().map(Response::Random),
            Request::Fill { len } => {
                let mut bytes = vec![0u8; len];
                self.fill(&mut bytes)?;
                Ok(Response::Bytes(bytes))
            },
            Request::CrcConfigure(config) => self.crc_configure(config).map(|()| Response::Done),
            Request::CrcUpdate(data) => self.crc_update(data).map(Response::Crc),
            Request::HashUpdate(data) => self.hash_update(data).map(|()| Response::Done),
            Request::HashFinish { digest_len } => {
                // Longer than any native digest; the length check rejects it.
                let mut out = vec![0u8; digest_len.min(MAX_DIGEST_LEN + 1)];
                self.hash_finish(&mut out, digest_len)?;
                Ok(Response::Digest(out))
            },
            Request::HashReset => self.hash_reset().map(|()| Response::Done),
            Request::SetKey { key, bits } => self.set_key(key, bits).map(|()| Response::Done),
            Request::SetIv(iv) => self.set_iv(iv).map(|()| Response::Done),
            Request::SetAad(aad) => self.set_aad(aad).map(|()| Response::Done),
            Request::SetTag(tag) => self.set_tag(tag).map(|()| Response::Done),
            Request::Crypt { direction, input } => {
                let mut output = vec![0u8; input.len()];
                self.crypt(direction, input, &mut output)?;
                Ok(Response::Output(output))
            },
            Request::Tag => {
                let mut tag = [0u8; TAG_LEN];
                self.tag(&mut tag)?;
                Ok(Response::Tag(tag))
            },
        }
    }
}
