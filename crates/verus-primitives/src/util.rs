//! Binary serialization utilities.
//!
//! Provides VarInt encoding/decoding and cursor-based `ByteReader` /
//! `ByteWriter` types used by every record in this crate. All multi-byte
//! integers are little-endian; variable-length fields are VarInt
//! length-prefixed.

use crate::PrimitivesError;

/// A variable-length integer.
///
/// Uses 1, 3, 5, or 9 bytes depending on the magnitude of the value,
/// with `0xfd`/`0xfe`/`0xff` prefixes marking the wider size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Return the wire-format byte length of this VarInt.
    pub fn length(&self) -> usize {
        if self.0 < 0xfd {
            1
        } else if self.0 < 0x10000 {
            3
        } else if self.0 < 0x1_0000_0000 {
            5
        } else {
            9
        }
    }

    /// Encode the VarInt into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let v = self.0;
        let mut buf = Vec::with_capacity(self.length());
        if v < 0xfd {
            buf.push(v as u8);
        } else if v < 0x10000 {
            buf.push(0xfd);
            buf.extend_from_slice(&(v as u16).to_le_bytes());
        } else if v < 0x1_0000_0000 {
            buf.push(0xfe);
            buf.extend_from_slice(&(v as u32).to_le_bytes());
        } else {
            buf.push(0xff);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    /// Return the underlying u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VarInt {
    fn from(v: u64) -> Self {
        VarInt(v)
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

/// A cursor-based reader over record bytes.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        // n comes off the wire; pos + n can overflow usize.
        if n > self.data.len() - self.pos {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Read a VarInt value.
    pub fn read_varint(&mut self) -> Result<u64, PrimitivesError> {
        match self.read_u8()? {
            0xff => self.read_u64_le(),
            0xfe => Ok(self.read_u32_le()? as u64),
            0xfd => Ok(self.read_u16_le()? as u64),
            b => Ok(b as u64),
        }
    }

    /// Read a VarInt element count for a collection.
    ///
    /// Every element occupies at least one byte, so a count larger than
    /// the unread remainder is malformed. Rejecting it here keeps wire
    /// counts safe to preallocate with.
    pub fn read_count(&mut self) -> Result<usize, PrimitivesError> {
        let count = self.read_varint()?;
        if count > self.remaining() as u64 {
            return Err(PrimitivesError::UnexpectedEof);
        }
        Ok(count as usize)
    }

    /// Read a VarInt length prefix followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>, PrimitivesError> {
        let len = self.read_varint()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_var_string(&mut self) -> Result<String, PrimitivesError> {
        let bytes = self.read_var_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| PrimitivesError::InvalidValue(format!("invalid UTF-8 string: {e}")))
    }

    /// Return the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// A buffer-based writer for record bytes.
#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a VarInt value.
    pub fn write_varint(&mut self, val: u64) {
        self.buf.extend_from_slice(&VarInt(val).to_bytes());
    }

    /// Append a VarInt length prefix followed by the bytes.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn write_var_string(&mut self, s: &str) {
        self.write_var_bytes(s.as_bytes());
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_byte_length() {
        assert_eq!(VarInt(0).to_bytes().len(), 1);
        assert_eq!(VarInt(252).to_bytes().len(), 1);
        assert_eq!(VarInt(253).to_bytes().len(), 3);
        assert_eq!(VarInt(65535).to_bytes().len(), 3);
        assert_eq!(VarInt(65536).to_bytes().len(), 5);
        assert_eq!(VarInt(4294967295).to_bytes().len(), 5);
        assert_eq!(VarInt(4294967296).to_bytes().len(), 9);
        assert_eq!(VarInt(u64::MAX).to_bytes().len(), 9);
    }

    #[test]
    fn test_varint_encoding() {
        let cases: Vec<(u64, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (252, vec![0xfc]),
            (253, vec![0xfd, 0xfd, 0x00]),
            (65535, vec![0xfd, 0xff, 0xff]),
            (65536, vec![0xfe, 0x00, 0x00, 0x01, 0x00]),
        ];
        for (value, expected) in cases {
            assert_eq!(VarInt(value).to_bytes(), expected, "mismatch for {value}");
        }
    }

    #[test]
    fn test_reader_writer_roundtrip() {
        let mut w = ByteWriter::new();
        w.write_u8(0x42);
        w.write_varint(300);
        w.write_var_bytes(b"hello");
        w.write_var_string("world@");

        let data = w.into_bytes();
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 0x42);
        assert_eq!(r.read_varint().unwrap(), 300);
        assert_eq!(r.read_var_bytes().unwrap(), b"hello");
        assert_eq!(r.read_var_string().unwrap(), "world@");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_reader_eof() {
        let mut r = ByteReader::new(&[0x01]);
        assert!(r.read_u8().is_ok());
        assert!(r.read_u8().is_err());
    }

    #[test]
    fn test_oversized_var_bytes_length_is_eof() {
        // 9-byte VarInt claiming u64::MAX bytes follow.
        let mut data = vec![0xff];
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        let mut r = ByteReader::new(&data);
        assert!(matches!(
            r.read_var_bytes(),
            Err(PrimitivesError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_count_beyond_remaining_is_eof() {
        let mut data = vec![0xff];
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        let mut r = ByteReader::new(&data);
        assert!(matches!(r.read_count(), Err(PrimitivesError::UnexpectedEof)));

        let mut r = ByteReader::new(&[0x02, 0x00]);
        assert!(matches!(r.read_count(), Err(PrimitivesError::UnexpectedEof)));
        let mut r = ByteReader::new(&[0x01, 0x00]);
        assert_eq!(r.read_count().unwrap(), 1);
    }

    #[test]
    fn test_var_string_rejects_bad_utf8() {
        let mut w = ByteWriter::new();
        w.write_var_bytes(&[0xff, 0xfe]);
        let data = w.into_bytes();
        let mut r = ByteReader::new(&data);
        assert!(r.read_var_string().is_err());
    }
}
