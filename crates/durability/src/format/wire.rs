//! Big-endian wire primitives shared by the state and record formats.
//!
//! # Encodings
//!
//! ```text
//! int        4 bytes, big-endian, two's complement
//! long       8 bytes, big-endian, two's complement
//! bool       1 byte, 0 = false, anything else = true
//! utf        u16 length + "modified UTF-8" bytes
//! opt string bool presence + utf when present
//! opt int    bool presence + int when present
//! ```
//!
//! "Modified UTF-8" encodes each UTF-16 code unit separately: NUL becomes
//! `C0 80` and supplementary characters become two 3-byte surrogates. Records
//! written by older devices use this encoding, so it is kept bit-exact.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Longest encoded string a `utf` field can carry.
pub const MAX_UTF_LEN: usize = u16::MAX as usize;

/// Errors produced while reading or writing wire primitives.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Stream ended in the middle of a field
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// Byte sequence is not valid modified UTF-8
    #[error("Malformed string at byte {offset}")]
    MalformedUtf {
        /// Offset within the string payload
        offset: usize,
    },

    /// String is too long for a 2-byte length prefix
    #[error("Encoded string length {len} exceeds {max} bytes", max = MAX_UTF_LEN)]
    StringTooLong {
        /// Encoded length that was rejected
        len: usize,
    },

    /// Byte payload length does not fit a 4-byte length prefix
    #[error("Payload length {len} is not representable")]
    PayloadTooLarge {
        /// Offending length
        len: usize,
    },

    /// Negative length read from the stream
    #[error("Negative length prefix {0}")]
    NegativeLength(i32),

    /// Underlying reader or writer failed
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            WireError::UnexpectedEof
        } else {
            WireError::Io(e)
        }
    }
}

/// Encode a string as modified UTF-8 (no length prefix).
pub fn encode_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

/// Decode modified UTF-8 bytes (no length prefix).
///
/// A surrogate without its pair decodes to U+FFFD.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String, WireError> {
    let continuation = |offset: usize| -> Result<u16, WireError> {
        match bytes.get(offset) {
            Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
            _ => Err(WireError::MalformedUtf { offset }),
        }
    };

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b >> 4 {
            0..=7 => {
                units.push(b as u16);
                i += 1;
            }
            12 | 13 => {
                let low = continuation(i + 1)?;
                units.push((((b & 0x1F) as u16) << 6) | low);
                i += 2;
            }
            14 => {
                let mid = continuation(i + 1)?;
                let low = continuation(i + 2)?;
                units.push((((b & 0x0F) as u16) << 12) | (mid << 6) | low);
                i += 3;
            }
            _ => return Err(WireError::MalformedUtf { offset: i }),
        }
    }

    Ok(String::from_utf16_lossy(&units))
}

/// Big-endian primitive writer.
pub struct DataWriter<W> {
    inner: W,
}

impl<W: Write> DataWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        DataWriter { inner }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write a 4-byte integer.
    pub fn write_i32(&mut self, value: i32) -> Result<(), WireError> {
        self.inner.write_i32::<BigEndian>(value)?;
        Ok(())
    }

    /// Write an 8-byte integer.
    pub fn write_i64(&mut self, value: i64) -> Result<(), WireError> {
        self.inner.write_i64::<BigEndian>(value)?;
        Ok(())
    }

    /// Write a 1-byte boolean.
    pub fn write_bool(&mut self, value: bool) -> Result<(), WireError> {
        self.inner.write_u8(value as u8)?;
        Ok(())
    }

    /// Write a length-prefixed modified UTF-8 string.
    pub fn write_utf(&mut self, value: &str) -> Result<(), WireError> {
        let encoded = encode_modified_utf8(value);
        if encoded.len() > MAX_UTF_LEN {
            return Err(WireError::StringTooLong { len: encoded.len() });
        }
        self.inner.write_u16::<BigEndian>(encoded.len() as u16)?;
        self.inner.write_all(&encoded)?;
        Ok(())
    }

    /// Write a presence flag followed by the string when present.
    pub fn write_opt_string(&mut self, value: Option<&str>) -> Result<(), WireError> {
        match value {
            Some(s) => {
                self.write_bool(true)?;
                self.write_utf(s)
            }
            None => self.write_bool(false),
        }
    }

    /// Write a presence flag followed by the integer when present.
    pub fn write_opt_i32(&mut self, value: Option<i32>) -> Result<(), WireError> {
        match value {
            Some(v) => {
                self.write_bool(true)?;
                self.write_i32(v)
            }
            None => self.write_bool(false),
        }
    }

    /// Write a 4-byte length followed by the raw bytes.
    pub fn write_len_prefixed(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let len = i32::try_from(bytes.len())
            .map_err(|_| WireError::PayloadTooLarge { len: bytes.len() })?;
        self.write_i32(len)?;
        self.inner.write_all(bytes)?;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), WireError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Big-endian primitive reader.
pub struct DataReader<R> {
    inner: R,
}

impl<R: Read> DataReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        DataReader { inner }
    }

    /// Read a 4-byte integer.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        Ok(self.inner.read_i32::<BigEndian>()?)
    }

    /// Read an 8-byte integer.
    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        Ok(self.inner.read_i64::<BigEndian>()?)
    }

    /// Read a 1-byte boolean.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        Ok(self.inner.read_u8()? != 0)
    }

    /// Read a length-prefixed modified UTF-8 string.
    pub fn read_utf(&mut self) -> Result<String, WireError> {
        let len = self.inner.read_u16::<BigEndian>()? as usize;
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        decode_modified_utf8(&buf)
    }

    /// Read a presence flag and the string when present.
    pub fn read_opt_string(&mut self) -> Result<Option<String>, WireError> {
        if self.read_bool()? {
            Ok(Some(self.read_utf()?))
        } else {
            Ok(None)
        }
    }

    /// Read a presence flag and the integer when present.
    pub fn read_opt_i32(&mut self) -> Result<Option<i32>, WireError> {
        if self.read_bool()? {
            Ok(Some(self.read_i32()?))
        } else {
            Ok(None)
        }
    }

    /// Read a 4-byte length followed by that many raw bytes.
    ///
    /// The buffer grows with the bytes actually present; a forged length
    /// never allocates up front.
    pub fn read_len_prefixed(&mut self) -> Result<Vec<u8>, WireError> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(WireError::NegativeLength(len));
        }
        let mut buf = Vec::new();
        (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len as usize {
            return Err(WireError::UnexpectedEof);
        }
        Ok(buf)
    }
}
