//! Big-endian cursor over a seekable resource stream
//!
//! Every record decoder reads through a [`BinaryReader`]. The reader tracks
//! the absolute stream offset and the [`Stage`] currently being decoded, so
//! a short read surfaces as [`Error::UnexpectedEof`] naming both.

use crate::error::{Error, Result, Stage};
use byteorder::{BigEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Open a resource file for decoding.
///
/// The handle is owned by the returned reader and closed when it is dropped,
/// whether or not decoding succeeded.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or its length queried.
pub fn open_resource<P: AsRef<Path>>(path: P) -> Result<BinaryReader<BufReader<File>>> {
    let file = File::open(path.as_ref())?;
    BinaryReader::new(BufReader::new(file))
}

/// Positioned big-endian reader.
#[derive(Debug)]
pub struct BinaryReader<R> {
    inner: R,
    position: u64,
    len: u64,
    stage: Stage,
}

impl<R: BufRead + Seek> BinaryReader<R> {
    /// Wrap a stream, starting at its current position.
    pub fn new(mut inner: R) -> Result<Self> {
        let position = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(position))?;
        Ok(Self {
            inner,
            position,
            len,
            stage: Stage::FileHeader,
        })
    }

    /// Give back the wrapped stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Stage that short reads are reported against.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    /// Absolute offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total stream length, fixed when the reader was created.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes left between the current position and the end of the stream.
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    /// Move to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.position = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Whether the stream has no more bytes, without consuming any.
    pub fn at_end(&mut self) -> Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    /// Fail with [`Error::SizeViolation`] unless `bytes` more bytes are left.
    ///
    /// `origin` is the offset reported in the error, normally the start of
    /// the chunk that declared the size.
    pub fn require(&self, bytes: u64, origin: u64, what: &str) -> Result<()> {
        let remaining = self.remaining();
        if bytes > remaining {
            return Err(Error::SizeViolation {
                stage: self.stage,
                position: origin,
                message: format!("{what} needs {bytes} bytes but only {remaining} remain"),
            });
        }
        Ok(())
    }

    fn eof_or_io(&self, err: io::Error, start: u64) -> Error {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof {
                stage: self.stage,
                position: start,
            }
        } else {
            Error::Io(err)
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let start = self.position;
        let value = self.inner.read_u8().map_err(|e| self.eof_or_io(e, start))?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let start = self.position;
        let value = self
            .inner
            .read_u16::<BigEndian>()
            .map_err(|e| self.eof_or_io(e, start))?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        let start = self.position;
        let value = self
            .inner
            .read_i16::<BigEndian>()
            .map_err(|e| self.eof_or_io(e, start))?;
        self.position += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let start = self.position;
        let value = self
            .inner
            .read_u32::<BigEndian>()
            .map_err(|e| self.eof_or_io(e, start))?;
        self.position += 4;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let start = self.position;
        let value = self
            .inner
            .read_i32::<BigEndian>()
            .map_err(|e| self.eof_or_io(e, start))?;
        self.position += 4;
        Ok(value)
    }

    /// Read a 32-bit word and reinterpret its bits as an IEEE float.
    pub fn read_f32_bits(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read exactly `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let start = self.position;
        self.require(count as u64, start, "byte block")?;
        let mut buf = vec![0u8; count];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| self.eof_or_io(e, start))?;
        self.position += count as u64;
        Ok(buf)
    }

    /// Read a NUL-terminated string. The terminator is consumed but not returned.
    ///
    /// An empty string is valid. Running out of bytes before the terminator
    /// is an [`Error::UnexpectedEof`].
    pub fn read_c_string(&mut self) -> Result<String> {
        let start = self.position;
        let mut buf = Vec::new();
        let read = self.inner.read_until(0, &mut buf)?;
        self.position += read as u64;
        if buf.pop() != Some(0) {
            return Err(Error::UnexpectedEof {
                stage: self.stage,
                position: start,
            });
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Read a `len`-byte field holding a string, cut at the first NUL.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Read one text line without its line ending. `None` at end of stream.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.inner.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        self.position += read as u64;
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
