//! Endian-aware primitive reading and writing, the layer every other part of
//! the crate is built on.
//!
//! Strings are always UTF-8, prefixed by their byte length as an unsigned
//! 16 bit integer. There is no terminator.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::Tag;

/// Default size of the scratch buffer used when copying streams.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// The byte order of multi-byte primitives. Java Edition data is big endian,
/// Bedrock Edition data little endian.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

macro_rules! read_endian {
    ($self:ident, $method:ident) => {
        match $self.endian {
            Endian::Big => $self.inner.$method::<BigEndian>()?,
            Endian::Little => $self.inner.$method::<LittleEndian>()?,
        }
    };
}

macro_rules! write_endian {
    ($self:ident, $method:ident, $val:expr) => {
        match $self.endian {
            Endian::Big => $self.inner.$method::<BigEndian>($val)?,
            Endian::Little => $self.inner.$method::<LittleEndian>($val)?,
        }
    };
}

/// Counts the bytes that pass through a reader. Lets callers know how much
/// of a stream was consumed without needing `Seek`.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes read so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// Counts the bytes that pass through a writer.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes written so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn eof() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "unexpectedly ran out of input",
    ))
}

/// Converts a length read from the stream, rejecting negative values.
pub(crate) fn try_len(len: i32) -> Result<usize> {
    usize::try_from(len).map_err(|_| Error::negative_length(len))
}

/// Reads NBT primitives from any `Read`.
#[derive(Debug)]
pub struct BinaryReader<R> {
    inner: CountingReader<R>,
    endian: Endian,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(reader: R, endian: Endian) -> Self {
        Self {
            inner: CountingReader::new(reader),
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Number of bytes consumed from the underlying reader.
    pub fn position(&self) -> u64 {
        self.inner.count()
    }

    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.inner.read_i8()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(read_endian!(self, read_i16))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(read_endian!(self, read_u16))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(read_endian!(self, read_i32))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(read_endian!(self, read_i64))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(read_endian!(self, read_f32))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(read_endian!(self, read_f64))
    }

    /// Reads a tag id, rejecting ids outside the known range.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let id = self.read_u8()?;
        Tag::try_from(id).map_err(|_| Error::invalid_tag(id))
    }

    /// Reads a length, rejecting negative values.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_i32()?;
        try_len(len)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let buf = self.read_bytes(len)?;
        String::from_utf8(buf).map_err(|e| Error::nonunicode_string(e.as_bytes()))
    }

    /// Reads exactly `n` bytes. The buffer grows as data arrives, so a bogus
    /// length in corrupt input fails with EOF rather than a huge allocation.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut self.inner).take(n as u64).read_to_end(&mut buf)?;
        if buf.len() != n {
            return Err(eof());
        }
        Ok(buf)
    }

    pub fn read_i32s(&mut self, n: usize) -> Result<Vec<i32>> {
        let byte_len = n
            .checked_mul(4)
            .ok_or_else(|| Error::format("int array too large"))?;
        let bytes = self.read_bytes(byte_len)?;
        let mut out = vec![0; n];
        match self.endian {
            Endian::Big => BigEndian::read_i32_into(&bytes, &mut out),
            Endian::Little => LittleEndian::read_i32_into(&bytes, &mut out),
        }
        Ok(out)
    }

    /// Discards `n` bytes. Works on streams that cannot seek; running out of
    /// input before `n` bytes is an error.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        let copied = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        if copied != n {
            return Err(eof());
        }
        Ok(())
    }

    pub fn skip_string(&mut self) -> Result<()> {
        let len = self.read_u16()?;
        self.skip(len as u64)
    }
}

/// Writes NBT primitives to any `Write`.
#[derive(Debug)]
pub struct BinaryWriter<W> {
    inner: CountingWriter<W>,
    endian: Endian,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(writer: W, endian: Endian) -> Self {
        Self {
            inner: CountingWriter::new(writer),
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Number of bytes written to the underlying writer.
    pub fn position(&self) -> u64 {
        self.inner.count()
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut W {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        Ok(self.inner.write_u8(v)?)
    }

    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        Ok(self.inner.write_i8(v)?)
    }

    pub fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.write_u8(tag.into())
    }

    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        write_endian!(self, write_i16, v);
        Ok(())
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        write_endian!(self, write_u16, v);
        Ok(())
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        write_endian!(self, write_i32, v);
        Ok(())
    }

    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        write_endian!(self, write_i64, v);
        Ok(())
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        write_endian!(self, write_f32, v);
        Ok(())
    }

    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        write_endian!(self, write_f64, v);
        Ok(())
    }

    /// Writes a length as an i32, rejecting lengths that do not fit.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| Error::bespoke("length too large"))?;
        self.write_i32(len)
    }

    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len()).map_err(|_| {
            Error::bespoke(format!(
                "string of {} bytes is longer than the 65535 byte limit",
                s.len()
            ))
        })?;
        self.write_u16(len)?;
        self.write_bytes(s.as_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.inner.write_all(bytes)?)
    }

    pub fn write_i32s(&mut self, values: &[i32]) -> Result<()> {
        for v in values {
            self.write_i32(*v)?;
        }
        Ok(())
    }

    /// Copies exactly `count` bytes from `src`, going through `buffer` or a
    /// default sized one when none is given.
    pub fn write_from_reader<S: Read>(
        &mut self,
        src: &mut S,
        count: u64,
        buffer: Option<&mut [u8]>,
    ) -> Result<()> {
        let mut owned;
        let buffer = match buffer {
            Some(b) if b.is_empty() => return Err(Error::bespoke("copy buffer is empty")),
            Some(b) => b,
            None => {
                owned = vec![0u8; count.min(DEFAULT_BUFFER_SIZE as u64).max(1) as usize];
                owned.as_mut_slice()
            }
        };

        let mut remaining = count;
        while remaining > 0 {
            let want = remaining.min(buffer.len() as u64) as usize;
            let n = match src.read(&mut buffer[..want]) {
                Ok(0) => return Err(eof()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.inner.write_all(&buffer[..n])?;
            remaining -= n as u64;
        }
        Ok(())
    }
}
