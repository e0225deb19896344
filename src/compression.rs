//! Compression framing around NBT data: raw, GZip, or ZLib.
//!
//! Reading can detect the framing from the first byte when the stream is
//! seekable; see [`open`]. ZLib output is produced by [`ZlibWriter`], which
//! writes the RFC 1950 header and trailer itself around a raw deflate
//! stream, keeping a running [`Adler32`] of the uncompressed bytes.
//!
//! ```
//! use std::io::{Cursor, Read, Write};
//! use nbtio::compression::{self, Compression, Encoder};
//!
//! # fn main() -> nbtio::error::Result<()> {
//! let mut enc = Encoder::new(Vec::new(), Compression::ZLib)?;
//! enc.write_all(b"\x0a\x00\x00\x00")?;
//! let bytes = enc.finish()?;
//! assert_eq!(&bytes[..2], &[0x78, 0x01]);
//!
//! let mut dec = compression::open(Cursor::new(bytes), Compression::AutoDetect)?;
//! assert_eq!(dec.compression(), Compression::ZLib);
//! let mut plain = vec![];
//! dec.read_to_end(&mut plain)?;
//! assert_eq!(plain, b"\x0a\x00\x00\x00");
//! # Ok(())
//! # }
//! ```

use std::io::{self, Chain, Cursor, Read, Seek, SeekFrom, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// First byte of a ZLib stream using deflate with a 32K window.
pub const ZLIB_CMF: u8 = 0x78;

/// Header written in front of ZLib output: deflate, 32K window, fastest
/// level, no preset dictionary.
pub const ZLIB_HEADER: [u8; 2] = [ZLIB_CMF, 0x01];

const GZIP_MAGIC: u8 = 0x1F;
const COMPOUND_ID: u8 = 0x0A;

/// Largest number of bytes that can be summed before the Adler-32
/// accumulators must be reduced to stay within a u32.
const ADLER_NMAX: usize = 5552;
const ADLER_MOD: u32 = 65521;

/// How NBT data is framed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Work it out from the first byte. Only possible when reading a
    /// seekable stream.
    AutoDetect,
    /// Raw NBT.
    None,
    GZip,
    /// RFC 1950 framing with an Adler-32 trailer.
    ZLib,
}

/// Peeks at the first byte of `reader` to find its compression, then seeks
/// back so nothing is consumed.
pub fn detect<R: Read + Seek>(reader: &mut R) -> Result<Compression> {
    let start = reader.stream_position()?;
    let mut first = [0u8; 1];
    let read = reader.read_exact(&mut first);
    reader.seek(SeekFrom::Start(start))?;

    match read {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(Error::format("cannot detect compression of an empty stream"))
        }
        Err(e) => return Err(e.into()),
    }

    let compression = match first[0] {
        COMPOUND_ID => Compression::None,
        GZIP_MAGIC => Compression::GZip,
        ZLIB_CMF => Compression::ZLib,
        b => {
            return Err(Error::format(format!(
                "unrecognized compression, first byte is {:#04x}",
                b
            )))
        }
    };
    debug!("detected {:?} compression", compression);
    Ok(compression)
}

/// Opens a decoder, detecting the compression first if asked to.
pub fn open<R: Read + Seek>(mut reader: R, compression: Compression) -> Result<Decoder<R>> {
    let compression = match compression {
        Compression::AutoDetect => detect(&mut reader)?,
        other => other,
    };
    Decoder::new(reader, compression)
}

fn check_zlib_header(header: [u8; 2]) -> Result<()> {
    let [cmf, flg] = header;
    let check = (u16::from(cmf) << 8) | u16::from(flg);
    let has_dictionary = flg & 0x20 != 0;

    if cmf != ZLIB_CMF || check % 31 != 0 || has_dictionary {
        return Err(Error::format(format!(
            "invalid zlib header: {:#04x} {:#04x}",
            cmf, flg
        )));
    }
    Ok(())
}

/// Reads decompressed NBT.
pub struct Decoder<R> {
    inner: DecoderInner<R>,
}

enum DecoderInner<R> {
    None(R),
    GZip(GzDecoder<R>),
    // The header is checked up front and then handed back to the decoder so
    // it can also verify the trailer.
    ZLib(ZlibDecoder<Chain<Cursor<[u8; 2]>, R>>),
}

impl<R: Read> Decoder<R> {
    /// Wraps a reader with a known compression. Works on streams that cannot
    /// seek, so [`Compression::AutoDetect`] is rejected here; use [`open`].
    pub fn new(mut reader: R, compression: Compression) -> Result<Self> {
        let inner = match compression {
            Compression::AutoDetect => {
                return Err(Error::bespoke(
                    "compression auto-detection needs a seekable stream",
                ))
            }
            Compression::None => DecoderInner::None(reader),
            Compression::GZip => DecoderInner::GZip(GzDecoder::new(reader)),
            Compression::ZLib => {
                let mut header = [0u8; 2];
                reader.read_exact(&mut header)?;
                check_zlib_header(header)?;
                DecoderInner::ZLib(ZlibDecoder::new(Cursor::new(header).chain(reader)))
            }
        };
        Ok(Self { inner })
    }

    pub fn compression(&self) -> Compression {
        match self.inner {
            DecoderInner::None(_) => Compression::None,
            DecoderInner::GZip(_) => Compression::GZip,
            DecoderInner::ZLib(_) => Compression::ZLib,
        }
    }

    pub fn into_inner(self) -> R {
        match self.inner {
            DecoderInner::None(r) => r,
            DecoderInner::GZip(d) => d.into_inner(),
            DecoderInner::ZLib(d) => d.into_inner().into_inner().1,
        }
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            DecoderInner::None(r) => r.read(buf),
            DecoderInner::GZip(d) => d.read(buf),
            DecoderInner::ZLib(d) => d.read(buf),
        }
    }
}

/// Writes compressed NBT. Call [`Encoder::finish`] when done, dropping the
/// encoder loses the ZLib trailer.
pub enum Encoder<W: Write> {
    None(W),
    GZip(GzEncoder<W>),
    ZLib(ZlibWriter<W>),
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W, compression: Compression) -> Result<Self> {
        Ok(match compression {
            Compression::AutoDetect => {
                return Err(Error::bespoke("a compression must be chosen for writing"))
            }
            Compression::None => Encoder::None(writer),
            Compression::GZip => Encoder::GZip(GzEncoder::new(writer, flate2::Compression::default())),
            Compression::ZLib => Encoder::ZLib(ZlibWriter::new(writer)?),
        })
    }

    pub fn compression(&self) -> Compression {
        match self {
            Encoder::None(_) => Compression::None,
            Encoder::GZip(_) => Compression::GZip,
            Encoder::ZLib(_) => Compression::ZLib,
        }
    }

    /// Flushes all compressed data and any trailer, returning the writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Encoder::None(mut w) => {
                w.flush()?;
                Ok(w)
            }
            Encoder::GZip(e) => e.finish(),
            Encoder::ZLib(e) => e.finish(),
        }
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Encoder::None(w) => w.write(buf),
            Encoder::GZip(e) => e.write(buf),
            Encoder::ZLib(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Encoder::None(w) => w.flush(),
            Encoder::GZip(e) => e.flush(),
            Encoder::ZLib(e) => e.flush(),
        }
    }
}

/// ZLib (RFC 1950) writer: header, raw deflate body, big-endian Adler-32 of
/// the uncompressed data.
pub struct ZlibWriter<W: Write> {
    deflate: DeflateEncoder<W>,
    adler: Adler32,
}

impl<W: Write> ZlibWriter<W> {
    /// Writes the header straight away.
    pub fn new(mut writer: W) -> io::Result<Self> {
        writer.write_all(&ZLIB_HEADER)?;
        Ok(Self {
            deflate: DeflateEncoder::new(writer, flate2::Compression::fast()),
            adler: Adler32::new(),
        })
    }

    /// Checksum of everything written so far.
    pub fn checksum(&self) -> u32 {
        self.adler.checksum()
    }

    pub fn finish(self) -> io::Result<W> {
        let checksum = self.adler.checksum();
        let mut writer = self.deflate.finish()?;
        writer.write_all(&checksum.to_be_bytes())?;
        writer.flush()?;
        Ok(writer)
    }
}

impl<W: Write> Write for ZlibWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.deflate.write(buf)?;
        self.adler.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.deflate.flush()
    }
}

/// Incremental Adler-32.
///
/// ```
/// # use nbtio::compression::Adler32;
/// assert_eq!(Adler32::of(b"Wikipedia"), 0x11E6_0398);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Adler32 {
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    pub fn of(bytes: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(bytes);
        adler.checksum()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(ADLER_NMAX) {
            for &byte in chunk {
                self.a += u32::from(byte);
                self.b += self.a;
            }
            self.a %= ADLER_MOD;
            self.b %= ADLER_MOD;
        }
    }

    pub fn checksum(&self) -> u32 {
        (self.b << 16) | self.a
    }
}
