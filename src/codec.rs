//! Serialize structured data.
//!
//! A small binary codec used by every proof type in this crate to:
//! - serialize proofs into their wire layout
//! - deserialize untrusted bytes back into validated proof types
//!
//! Decoding is where validation lives: a value that exists in memory is
//! always well-formed (canonical scalars, prime-order points), so [Read]
//! implementations must reject anything that would violate those
//! invariants before a value is constructed.

use bytes::{Buf, BufMut};
use thiserror::Error;

/// Errors that can occur when decoding data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("end of buffer")]
    EndOfBuffer,
    #[error("extra data: {0} bytes")]
    ExtraData(usize),
    #[error("invalid data: {0} ({1})")]
    Invalid(&'static str, &'static str),
    #[error("invalid length: {0}")]
    InvalidLength(usize),
}

/// Trait for types that can be written to a buffer.
pub trait Write {
    /// Writes this value to the buffer.
    fn write(&self, buf: &mut impl BufMut);
}

/// Trait for types whose encoded size is known before writing.
pub trait EncodeSize {
    /// Returns the encoded size of this value (in bytes).
    fn encode_size(&self) -> usize;
}

/// Trait for types that can be read from a buffer.
///
/// Unlike [Write], reading can fail: the buffer may be truncated or the
/// payload may be invalid (non-canonical scalar, point outside the
/// prime-order subgroup). Implementations must not panic on untrusted
/// input.
pub trait Read: Sized {
    /// Reads a value from the buffer.
    fn read(buf: &mut impl Buf) -> Result<Self, Error>;
}

/// Trait for types with a fixed-length encoding.
pub trait FixedSize {
    /// The encoded size of this value (in bytes).
    const SIZE: usize;
}

impl<T: FixedSize> EncodeSize for T {
    fn encode_size(&self) -> usize {
        Self::SIZE
    }
}

/// Extension trait for one-shot encoding.
pub trait Encode: Write + EncodeSize {
    /// Encodes a value to bytes.
    fn encode(&self) -> Vec<u8> {
        let size = self.encode_size();
        let mut buf = Vec::with_capacity(size);
        self.write(&mut buf);
        assert_eq!(buf.len(), size, "encode_size does not match written bytes");
        buf
    }
}

impl<T: Write + EncodeSize> Encode for T {}

/// Extension trait for one-shot decoding.
pub trait Decode: Read {
    /// Decodes a value from a buffer, requiring the buffer to be fully
    /// consumed.
    fn decode(mut buf: impl Buf) -> Result<Self, Error> {
        let result = Self::read(&mut buf)?;
        let remaining = buf.remaining();
        if remaining > 0 {
            return Err(Error::ExtraData(remaining));
        }
        Ok(result)
    }
}

impl<T: Read> Decode for T {}

impl Write for u8 {
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u8(*self);
    }
}

impl Read for u8 {
    fn read(buf: &mut impl Buf) -> Result<Self, Error> {
        if buf.remaining() < 1 {
            return Err(Error::EndOfBuffer);
        }
        Ok(buf.get_u8())
    }
}

impl FixedSize for u8 {
    const SIZE: usize = 1;
}

impl<const N: usize> Write for [u8; N] {
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(self);
    }
}

impl<const N: usize> Read for [u8; N] {
    fn read(buf: &mut impl Buf) -> Result<Self, Error> {
        if buf.remaining() < N {
            return Err(Error::EndOfBuffer);
        }
        let mut out = [0u8; N];
        buf.copy_to_slice(&mut out);
        Ok(out)
    }
}

impl<const N: usize> FixedSize for [u8; N] {
    const SIZE: usize = N;
}
