//! Decoding of complete NBT trees, and byte-exact skipping of values that
//! are not wanted.

use std::io::Read;

use crate::codec::{try_len, BinaryReader};
use crate::error::{Error, Result};
use crate::{Compound, List, Tag, Value};

/// What a selector gets to see about a tag before its value is read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    /// Kind of the tag.
    pub tag: Tag,
    /// Name of the tag, `None` for list elements.
    pub name: Option<&'a str>,
    /// Nesting depth. Children of the root compound are at depth 1.
    pub depth: usize,
}

pub(crate) type Selector<'s> = &'s mut dyn FnMut(&Selection<'_>) -> bool;

/// Bytes taken by the payload of fixed-size kinds.
pub(crate) fn payload_size(tag: Tag) -> Option<u64> {
    match tag {
        Tag::Byte => Some(1),
        Tag::Short => Some(2),
        Tag::Int | Tag::Float => Some(4),
        Tag::Long | Tag::Double => Some(8),
        _ => None,
    }
}

/// Reads a list header, returning `None` for the element kind of an
/// untyped empty list.
pub(crate) fn read_list_header<R: Read>(
    reader: &mut BinaryReader<R>,
) -> Result<(Option<Tag>, usize)> {
    let kind = reader.read_tag()?;
    let len = try_len(reader.read_i32()?)?;
    match kind {
        Tag::End if len > 0 => Err(Error::format(format!(
            "list of End tags cannot have {} elements",
            len
        ))),
        Tag::End => Ok((None, 0)),
        kind => Ok((Some(kind), len)),
    }
}

/// Consumes the payload of a value of kind `tag` without keeping it.
pub(crate) fn skip_value<R: Read>(reader: &mut BinaryReader<R>, tag: Tag) -> Result<()> {
    match tag {
        Tag::End => Err(Error::unexpected_end()),
        Tag::Byte | Tag::Short | Tag::Int | Tag::Long | Tag::Float | Tag::Double => {
            reader.skip(payload_size(tag).unwrap_or_default())
        }
        Tag::String => reader.skip_string(),
        Tag::ByteArray => {
            let len = reader.read_len()?;
            reader.skip(len as u64)
        }
        Tag::IntArray => {
            let len = reader.read_len()?;
            reader.skip(len as u64 * 4)
        }
        Tag::List => {
            let (kind, len) = read_list_header(reader)?;
            match kind {
                None => Ok(()),
                Some(kind) => match payload_size(kind) {
                    Some(size) => reader.skip(len as u64 * size),
                    None => {
                        for _ in 0..len {
                            skip_value(reader, kind)?;
                        }
                        Ok(())
                    }
                },
            }
        }
        Tag::Compound => loop {
            let tag = reader.read_tag()?;
            if tag == Tag::End {
                return Ok(());
            }
            reader.skip_string()?;
            skip_value(reader, tag)?;
        },
    }
}

/// Reads a complete document: the root compound's name and contents. The
/// first byte has to be the Compound id.
pub(crate) fn read_root<R: Read>(
    reader: &mut BinaryReader<R>,
    selector: Option<Selector<'_>>,
) -> Result<(String, Compound)> {
    let id = reader.read_u8()?;
    if id != u8::from(Tag::Compound) {
        return Err(Error::no_root_compound());
    }
    let name = reader.read_string()?;

    let mut de = TreeReader { reader, selector };
    let root = de.read_compound(1)?;
    Ok((name, root))
}

/// Reads the payload of a single value of kind `tag`.
pub(crate) fn read_value<R: Read>(reader: &mut BinaryReader<R>, tag: Tag) -> Result<Value> {
    TreeReader {
        reader,
        selector: None,
    }
    .read_value(tag, 0)
}

struct TreeReader<'r, 's, R> {
    reader: &'r mut BinaryReader<R>,
    selector: Option<Selector<'s>>,
}

impl<'r, 's, R: Read> TreeReader<'r, 's, R> {
    fn selected(&mut self, tag: Tag, name: Option<&str>, depth: usize) -> bool {
        match &mut self.selector {
            Some(select) => select(&Selection { tag, name, depth }),
            None => true,
        }
    }

    /// `depth` is the depth of the compound's children.
    fn read_compound(&mut self, depth: usize) -> Result<Compound> {
        let mut compound = Compound::new();
        loop {
            let tag = self.reader.read_tag()?;
            if tag == Tag::End {
                return Ok(compound);
            }

            let name = self.reader.read_string()?;
            if !self.selected(tag, Some(&name), depth) {
                skip_value(self.reader, tag)?;
                continue;
            }
            if compound.contains(&name) {
                return Err(Error::format(format!(
                    "compound contains {:?} more than once",
                    name
                )));
            }

            let value = self.read_value(tag, depth)?;
            compound.insert(name, value)?;
        }
    }

    /// `depth` is the depth of the list itself.
    fn read_list(&mut self, depth: usize) -> Result<List> {
        let (kind, len) = read_list_header(self.reader)?;
        let kind = match kind {
            Some(kind) => kind,
            None => return Ok(List::new()),
        };

        let mut list = List::with_kind(kind)?;
        for _ in 0..len {
            if !self.selected(kind, None, depth + 1) {
                skip_value(self.reader, kind)?;
                continue;
            }
            let value = self.read_value(kind, depth + 1)?;
            list.push(value)?;
        }
        Ok(list)
    }

    fn read_value(&mut self, tag: Tag, depth: usize) -> Result<Value> {
        Ok(match tag {
            Tag::End => return Err(Error::unexpected_end()),
            Tag::Byte => Value::Byte(self.reader.read_i8()?),
            Tag::Short => Value::Short(self.reader.read_i16()?),
            Tag::Int => Value::Int(self.reader.read_i32()?),
            Tag::Long => Value::Long(self.reader.read_i64()?),
            Tag::Float => Value::Float(self.reader.read_f32()?),
            Tag::Double => Value::Double(self.reader.read_f64()?),
            Tag::String => Value::String(self.reader.read_string()?),
            Tag::ByteArray => {
                let len = self.reader.read_len()?;
                Value::ByteArray(self.reader.read_bytes(len)?)
            }
            Tag::IntArray => {
                let len = self.reader.read_len()?;
                Value::IntArray(self.reader.read_i32s(len)?)
            }
            Tag::List => Value::List(self.read_list(depth)?),
            Tag::Compound => Value::Compound(self.read_compound(depth + 1)?),
        })
    }
}
