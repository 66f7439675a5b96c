//! Binary reading and writing utilities for the kurve protocol.
//!
//! All values are little-endian. Strings are null-terminated UTF-8.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::ProtocolError;

/// A reader for parsing binary protocol messages.
///
/// Every getter checks the remaining length first, so a truncated packet
/// surfaces as [`ProtocolError::UnexpectedEof`] instead of a panic.
#[derive(Debug)]
pub struct BinaryReader {
    buf: Bytes,
}

impl BinaryReader {
    /// Create a new reader from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { buf: data.into() }
    }

    /// Returns remaining bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    fn ensure(&self, n: usize) -> Result<(), ProtocolError> {
        if self.buf.remaining() >= n {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedEof)
        }
    }

    #[inline]
    pub fn get_u8(&mut self) -> Result<u8, ProtocolError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    #[inline]
    pub fn get_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.get_u8()? != 0)
    }

    #[inline]
    pub fn get_u32(&mut self) -> Result<u32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    #[inline]
    pub fn get_i32(&mut self) -> Result<i32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    #[inline]
    pub fn get_u64(&mut self) -> Result<u64, ProtocolError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64_le())
    }

    #[inline]
    pub fn get_f32(&mut self) -> Result<f32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_f32_le())
    }

    /// Read a null-terminated UTF-8 string.
    ///
    /// A missing terminator is tolerated at the end of the buffer.
    pub fn get_string(&mut self) -> String {
        let mut bytes = Vec::new();
        while self.buf.has_remaining() {
            let b = self.buf.get_u8();
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// A writer for building binary protocol messages.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    /// Create a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Returns the current length.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    #[inline]
    pub fn put_bool(&mut self, v: bool) {
        self.buf.put_u8(v as u8);
    }

    #[inline]
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    #[inline]
    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32_le(v);
    }

    #[inline]
    pub fn put_u64(&mut self, v: u64) {
        self.buf.put_u64_le(v);
    }

    #[inline]
    pub fn put_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    /// Write a length prefix for a list. Lists never exceed `u32::MAX` entries.
    #[inline]
    pub fn put_len(&mut self, len: usize) {
        self.buf.put_u32_le(len as u32);
    }

    /// Write a null-terminated UTF-8 string.
    ///
    /// Interior NULs are dropped so the terminator stays unambiguous.
    pub fn put_string(&mut self, s: &str) {
        for b in s.bytes().filter(|&b| b != 0) {
            self.buf.put_u8(b);
        }
        self.buf.put_u8(0);
    }

    /// Consume the writer and return the built buffer.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Get current buffer as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_read_is_eof() {
        let mut r = BinaryReader::new(vec![0x01, 0x02]);
        assert_eq!(r.get_u32(), Err(ProtocolError::UnexpectedEof));
        // The failed read must not consume anything.
        assert_eq!(r.remaining(), 2);
        assert_eq!(r.get_u8(), Ok(0x01));
        assert_eq!(r.get_u8(), Ok(0x02));
    }

    #[test]
    fn test_string_strips_interior_nul() {
        let mut w = BinaryWriter::new();
        w.put_string("ab\0c");
        w.put_u8(7);
        let mut r = BinaryReader::new(w.finish());
        assert_eq!(r.get_string(), "abc");
        assert_eq!(r.get_u8(), Ok(7));
    }

    #[test]
    fn test_unterminated_string() {
        let mut r = BinaryReader::new(b"name".to_vec());
        assert_eq!(r.get_string(), "name");
        assert_eq!(r.remaining(), 0);
    }
}
