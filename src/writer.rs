//! Write NBT directly to a stream, without building a tree first.

use std::io::{Read, Write};

use log::trace;

use crate::codec::BinaryWriter;
use crate::error::{Error, Result};
use crate::ser::{write_named, write_payload};
use crate::{NamedTag, Settings, Tag, Value};

#[derive(Debug, Clone, Copy)]
enum Context {
    Compound,
    List { kind: Tag, size: usize, written: usize },
}

/// Streaming NBT writer.
///
/// The root compound is opened on construction. Tags inside a compound need
/// a name, list elements must not have one. Lists have their element kind
/// and size declared up front, and both are checked as elements are
/// written. Every check happens before anything is written, so a rejected
/// call leaves the output untouched.
///
/// ```
/// # use nbtio::{Tag, Writer};
/// # fn main() -> nbtio::error::Result<()> {
/// let mut writer = Writer::new(Vec::new(), "hello world")?;
/// writer.write_string(Some("name"), "Bananrama")?;
/// writer.begin_list(Some("pos"), Tag::Double, 3)?;
/// for v in [1.0, 64.0, -2.5] {
///     writer.write_double(None, v)?;
/// }
/// writer.end_list()?;
/// writer.end_compound()?;
///
/// let bytes = writer.finish()?;
/// # assert_eq!(bytes[0], 10);
/// # Ok(())
/// # }
/// ```
pub struct Writer<W: Write> {
    writer: BinaryWriter<W>,
    stack: Vec<Context>,
    done: bool,
    buffer_size: usize,
}

macro_rules! write_scalar {
    ($fn:ident, $ty:ty, $tag:ident, $write:ident) => {
        pub fn $fn(&mut self, name: Option<&str>, v: $ty) -> Result<()> {
            self.begin_tag(name, Tag::$tag)?;
            self.writer.$write(v)
        }
    };
}

impl<W: Write> Writer<W> {
    /// Starts a document whose root compound is called `root_name`.
    pub fn new(writer: W, root_name: &str) -> Result<Self> {
        Self::with_settings(writer, root_name, &Settings::default())
    }

    pub fn with_settings(writer: W, root_name: &str, settings: &Settings) -> Result<Self> {
        check_name(root_name)?;
        let mut writer = BinaryWriter::new(writer, settings.endian);
        writer.write_tag(Tag::Compound)?;
        writer.write_string(root_name)?;

        Ok(Self {
            writer,
            stack: vec![Context::Compound],
            done: false,
            buffer_size: settings.buffer_size.max(1),
        })
    }

    /// True once the root compound has been closed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns the underlying writer. Fails if the root compound is still
    /// open.
    pub fn finish(self) -> Result<W> {
        if !self.done {
            return Err(Error::bespoke(format!(
                "cannot finish, {} containers are still open",
                self.stack.len()
            )));
        }
        let mut writer = self.writer;
        writer.flush()?;
        Ok(writer.into_inner())
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Gets a mutable reference to the underlying writer. Writing to it
    /// directly will corrupt the output.
    pub fn get_mut(&mut self) -> &mut W {
        self.writer.get_mut()
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.writer.position()
    }

    pub fn begin_compound(&mut self, name: Option<&str>) -> Result<()> {
        self.begin_tag(name, Tag::Compound)?;
        self.stack.push(Context::Compound);
        Ok(())
    }

    /// Closes the innermost compound. Closing the root compound finishes
    /// the document.
    pub fn end_compound(&mut self) -> Result<()> {
        self.check_not_done()?;
        match self.stack.last() {
            Some(Context::Compound) => {}
            _ => return Err(Error::bespoke("not inside a compound, cannot end it")),
        }

        self.writer.write_tag(Tag::End)?;
        self.stack.pop();
        if self.stack.is_empty() {
            trace!("finished nbt document, {} bytes", self.writer.position());
            self.done = true;
        }
        Ok(())
    }

    /// Opens a list of exactly `size` elements of kind `kind`.
    pub fn begin_list(&mut self, name: Option<&str>, kind: Tag, size: usize) -> Result<()> {
        if kind == Tag::End && size > 0 {
            return Err(Error::bespoke("only an empty list can have End elements"));
        }
        if i32::try_from(size).is_err() {
            return Err(Error::bespoke(format!("list of {} elements is too long", size)));
        }

        self.begin_tag(name, Tag::List)?;
        self.writer.write_tag(kind)?;
        self.writer.write_len(size)?;
        self.stack.push(Context::List {
            kind,
            size,
            written: 0,
        });
        Ok(())
    }

    /// Closes the innermost list, which must have all its elements written.
    pub fn end_list(&mut self) -> Result<()> {
        self.check_not_done()?;
        match self.stack.last().copied() {
            Some(Context::List { size, written, .. }) if written < size => {
                Err(Error::bespoke(format!(
                    "list incomplete, {} of {} elements written",
                    written, size
                )))
            }
            Some(Context::List { .. }) => {
                self.stack.pop();
                Ok(())
            }
            _ => Err(Error::bespoke("not inside a list, cannot end it")),
        }
    }

    write_scalar!(write_byte, i8, Byte, write_i8);
    write_scalar!(write_short, i16, Short, write_i16);
    write_scalar!(write_int, i32, Int, write_i32);
    write_scalar!(write_long, i64, Long, write_i64);
    write_scalar!(write_float, f32, Float, write_f32);
    write_scalar!(write_double, f64, Double, write_f64);

    pub fn write_string(&mut self, name: Option<&str>, v: &str) -> Result<()> {
        check_name(v)?;
        self.begin_tag(name, Tag::String)?;
        self.writer.write_string(v)
    }

    pub fn write_byte_array(&mut self, name: Option<&str>, data: &[u8]) -> Result<()> {
        check_array_len(data.len())?;
        self.begin_tag(name, Tag::ByteArray)?;
        self.writer.write_len(data.len())?;
        self.writer.write_bytes(data)
    }

    /// Writes `count` bytes of `data` starting at `offset`.
    pub fn write_byte_array_slice(
        &mut self,
        name: Option<&str>,
        data: &[u8],
        offset: usize,
        count: usize,
    ) -> Result<()> {
        let range = slice_range(data.len(), offset, count)?;
        self.write_byte_array(name, &data[range])
    }

    /// Writes a byte array of `count` bytes copied from `src`. The copy goes
    /// through `buffer`, or one of the configured buffer size.
    pub fn write_byte_array_from_reader<S: Read>(
        &mut self,
        name: Option<&str>,
        src: &mut S,
        count: usize,
        buffer: Option<&mut [u8]>,
    ) -> Result<()> {
        check_array_len(count)?;
        check_buffer(&buffer)?;
        self.begin_tag(name, Tag::ByteArray)?;
        self.writer.write_len(count)?;
        self.copy_from(src, count as u64, buffer)
    }

    pub fn write_int_array(&mut self, name: Option<&str>, data: &[i32]) -> Result<()> {
        check_array_len(data.len())?;
        self.begin_tag(name, Tag::IntArray)?;
        self.writer.write_len(data.len())?;
        self.writer.write_i32s(data)
    }

    pub fn write_int_array_slice(
        &mut self,
        name: Option<&str>,
        data: &[i32],
        offset: usize,
        count: usize,
    ) -> Result<()> {
        let range = slice_range(data.len(), offset, count)?;
        self.write_int_array(name, &data[range])
    }

    /// Writes an int array of `count` ints copied from `src`. The source
    /// must already hold the ints in this writer's byte order, 4 bytes each.
    pub fn write_int_array_from_reader<S: Read>(
        &mut self,
        name: Option<&str>,
        src: &mut S,
        count: usize,
        buffer: Option<&mut [u8]>,
    ) -> Result<()> {
        check_array_len(count)?;
        check_buffer(&buffer)?;
        self.begin_tag(name, Tag::IntArray)?;
        self.writer.write_len(count)?;
        self.copy_from(src, count as u64 * 4, buffer)
    }

    /// Writes a complete tag, including everything inside it.
    pub fn write_tag(&mut self, tag: &NamedTag) -> Result<()> {
        self.write_value(tag.name(), &tag.value)
    }

    pub fn write_value(&mut self, name: Option<&str>, value: &Value) -> Result<()> {
        check_value(value)?;
        self.enforce(name, value.tag())?;
        match name {
            Some(name) => write_named(&mut self.writer, name, value),
            None => write_payload(&mut self.writer, value),
        }
    }

    fn copy_from<S: Read>(
        &mut self,
        src: &mut S,
        bytes: u64,
        buffer: Option<&mut [u8]>,
    ) -> Result<()> {
        match buffer {
            Some(buffer) => self.writer.write_from_reader(src, bytes, Some(buffer)),
            None => {
                let size = bytes.min(self.buffer_size as u64).max(1) as usize;
                let mut buffer = vec![0u8; size];
                self.writer.write_from_reader(src, bytes, Some(&mut buffer))
            }
        }
    }

    /// Checks a tag may go here, then writes its id and name if it is not a
    /// list element.
    fn begin_tag(&mut self, name: Option<&str>, tag: Tag) -> Result<()> {
        self.enforce(name, tag)?;
        if let Some(name) = name {
            self.writer.write_tag(tag)?;
            self.writer.write_string(name)?;
        }
        Ok(())
    }

    fn check_not_done(&self) -> Result<()> {
        if self.done {
            return Err(Error::bespoke("document is already finished"));
        }
        Ok(())
    }

    fn enforce(&mut self, name: Option<&str>, tag: Tag) -> Result<()> {
        self.check_not_done()?;
        if let Some(name) = name {
            check_name(name)?;
        }

        match self.stack.last_mut() {
            Some(Context::List {
                kind,
                size,
                written,
            }) => {
                if name.is_some() {
                    return Err(Error::bespoke("list elements cannot be named"));
                }
                if tag != *kind {
                    return Err(Error::bespoke(format!(
                        "cannot write {} to a list of {}",
                        tag, kind
                    )));
                }
                if *written >= *size {
                    return Err(Error::bespoke(format!(
                        "list is full, it was declared with {} elements",
                        size
                    )));
                }
                *written += 1;
            }
            Some(Context::Compound) => {
                if name.is_none() {
                    return Err(Error::bespoke(format!(
                        "{} inside a compound must be named",
                        tag
                    )));
                }
            }
            None => return Err(Error::bespoke("document is already finished")),
        }
        Ok(())
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.len() > u16::MAX as usize {
        return Err(Error::bespoke(format!(
            "string of {} bytes is longer than the 65535 byte limit",
            name.len()
        )));
    }
    Ok(())
}

/// Checks every string and length inside `value` fits the format, so a
/// tree is either written whole or not at all.
fn check_value(value: &Value) -> Result<()> {
    match value {
        Value::String(s) => check_name(s),
        Value::ByteArray(v) => check_array_len(v.len()),
        Value::IntArray(v) => check_array_len(v.len()),
        Value::List(list) => {
            check_array_len(list.len())?;
            list.iter().try_for_each(check_value)
        }
        Value::Compound(c) => c.iter().try_for_each(|(name, v)| {
            check_name(name)?;
            check_value(v)
        }),
        _ => Ok(()),
    }
}

fn check_array_len(len: usize) -> Result<()> {
    if i32::try_from(len).is_err() {
        return Err(Error::bespoke(format!("array of {} elements is too long", len)));
    }
    Ok(())
}

fn check_buffer(buffer: &Option<&mut [u8]>) -> Result<()> {
    match buffer {
        Some(b) if b.is_empty() => Err(Error::bespoke("copy buffer is empty")),
        _ => Ok(()),
    }
}

fn slice_range(len: usize, offset: usize, count: usize) -> Result<std::ops::Range<usize>> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(offset..end),
        _ => Err(Error::bespoke(format!(
            "{} elements from offset {} is out of range for length {}",
            count, offset, len
        ))),
    }
}
