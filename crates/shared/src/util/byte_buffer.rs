// ByteBuffer - Bounds-checked binary serialization/deserialization
// Little-endian reader/writer used by the AIMesh decoder and encoder

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// Errors raised by read operations on a [`ByteBuffer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A read would run past the end of the buffer.
    #[error("read of {wanted} bytes at offset {offset} runs past end of buffer ({available} bytes available)")]
    UnexpectedEof {
        offset: usize,
        wanted: usize,
        available: usize,
    },
}

/// A byte buffer with a read cursor that advances by the exact width of
/// each field. Every read is checked against the end of the buffer and
/// fails instead of reading out of bounds.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl ByteBuffer {
    /// Create with a pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Wrap existing bytes for reading, cursor at offset 0
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        ByteBuffer {
            data: data.into(),
            read_pos: 0,
        }
    }

    /// Bytes left between the read cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.data.len() - self.read_pos
    }

    /// Consume the buffer, returning the written bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    // ---- Write operations (append) ----

    /// Append raw bytes
    pub fn append(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    pub fn write_i16(&mut self, val: i16) {
        let start = self.grow(2);
        LittleEndian::write_i16(&mut self.data[start..], val);
    }

    pub fn write_i32(&mut self, val: i32) {
        let start = self.grow(4);
        LittleEndian::write_i32(&mut self.data[start..], val);
    }

    pub fn write_f32(&mut self, val: f32) {
        let start = self.grow(4);
        LittleEndian::write_f32(&mut self.data[start..], val);
    }

    fn grow(&mut self, count: usize) -> usize {
        let start = self.data.len();
        self.data.resize(start + count, 0);
        start
    }

    // ---- Read operations ----

    pub fn read_i16(&mut self) -> Result<i16, BufferError> {
        self.take(2).map(LittleEndian::read_i16)
    }

    pub fn read_i32(&mut self) -> Result<i32, BufferError> {
        self.take(4).map(LittleEndian::read_i32)
    }

    pub fn read_f32(&mut self) -> Result<f32, BufferError> {
        self.take(4).map(LittleEndian::read_f32)
    }

    /// Read a fixed-size byte array (e.g. a magic tag)
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn take(&mut self, count: usize) -> Result<&[u8], BufferError> {
        let start = self.read_pos;
        let end = start
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or(BufferError::UnexpectedEof {
                offset: start,
                wanted: count,
                available: self.data.len() - start,
            })?;
        self.read_pos = end;
        Ok(&self.data[start..end])
    }
}
