//! TL wire primitives
//!
//! Everything is little-endian. Naturals, magics and counts are `u32`.
//! Strings carry a one-byte length when shorter than 254 bytes, otherwise the
//! marker byte `0xFE` and a three-byte length; both forms are zero-padded to
//! a four-byte boundary.

use thiserror::Error;
use tlgen_core::Magic;

/// Magic of an absent `Maybe`
pub const MAYBE_ABSENT: Magic = 0x2793_0a7b;
/// Magic of a present `Maybe`, followed by the value
pub const MAYBE_PRESENT: Magic = 0x3f9c_8ef8;

/// Longest string the three-byte length form can carry
pub const MAX_STRING_LEN: usize = (1 << 24) - 1;

const SHORT_STRING_LIMIT: usize = 254;
const LONG_STRING_MARKER: u8 = 0xfe;

/// Errors raised while storing or fetching values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} left")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("invalid string: {0}")]
    InvalidString(String),

    #[error("unknown constructor magic 0x{magic:08x} for type `{type_name}`")]
    UnknownConstructor { type_name: String, magic: Magic },

    #[error("magic mismatch: expected 0x{expected:08x}, found 0x{found:08x}")]
    MagicMismatch { expected: Magic, found: Magic },

    #[error("invalid Maybe magic 0x{0:08x}")]
    InvalidMaybeMagic(Magic),

    #[error("missing field `{field}` of `{entity}`")]
    MissingField { entity: String, field: String },

    #[error("expected {expected}, found {found}")]
    ValueMismatch { expected: String, found: String },

    #[error("no generated codec for {0}")]
    MissingCodec(String),

    #[error("length {len} exceeds limit {limit}")]
    LengthOverflow { len: usize, limit: usize },

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("statement not valid in {0}")]
    InvalidStatement(String),
}

/// Append-only output buffer
#[derive(Debug, Clone, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a vector or dictionary element count.
    pub fn write_count(&mut self, count: usize) -> Result<(), CodecError> {
        let count = u32::try_from(count).map_err(|_| CodecError::LengthOverflow {
            len: count,
            limit: u32::MAX as usize,
        })?;
        self.write_u32(count);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        let bytes = value.as_bytes();
        let len = bytes.len();
        let header = if len < SHORT_STRING_LIMIT {
            self.buf.push(len as u8);
            1
        } else if len <= MAX_STRING_LEN {
            self.buf.push(LONG_STRING_MARKER);
            self.buf.extend_from_slice(&(len as u32).to_le_bytes()[..3]);
            4
        } else {
            return Err(CodecError::LengthOverflow {
                len,
                limit: MAX_STRING_LEN,
            });
        };
        self.buf.extend_from_slice(bytes);
        let padding = (4 - (header + len) % 4) % 4;
        self.buf.resize(self.buf.len() + padding, 0);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over caller-owned input
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.take_array().map(i32::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        self.take_array().map(i64::from_le_bytes)
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        self.take_array().map(f64::from_le_bytes)
    }

    /// Read an element count, refusing counts larger than the remaining input.
    pub fn read_count(&mut self) -> Result<usize, CodecError> {
        self.read_count_of(1)
    }

    /// Read a count of elements occupying at least `min_item_size` bytes each.
    /// Zero-sized elements are never bounded by the remaining input.
    pub fn read_count_of(&mut self, min_item_size: usize) -> Result<usize, CodecError> {
        let count = self.read_u32()? as usize;
        if min_item_size == 0 {
            return Ok(count);
        }
        if count.saturating_mul(min_item_size) > self.remaining() {
            return Err(CodecError::LengthOverflow {
                len: count,
                limit: self.remaining() / min_item_size,
            });
        }
        Ok(count)
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let first = self.take(1)?[0];
        let (header, len) = if first == LONG_STRING_MARKER {
            let [a, b, c] = self.take_array::<3>()?;
            (4, u32::from_le_bytes([a, b, c, 0]) as usize)
        } else if usize::from(first) < SHORT_STRING_LIMIT {
            (1, usize::from(first))
        } else {
            return Err(CodecError::InvalidString(format!(
                "reserved length byte 0x{first:02x}"
            )));
        };
        let bytes = self.take(len)?;
        let padding = (4 - (header + len) % 4) % 4;
        self.take(padding)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::InvalidString(e.to_string()))
    }
}
