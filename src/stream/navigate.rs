use std::io::Read;

use crate::codec::DEFAULT_BUFFER_SIZE;
use crate::de;
use crate::error::{Error, Result};
use crate::{Tag, Value};

use super::{Parser, State};

/// Types a whole list can be read into with
/// [`Parser::read_list_as`]. Numeric types accept any narrower numeric
/// element kind.
pub trait ListElement: Sized {
    /// Whether a list with elements of kind `tag` converts into `Self`.
    fn accepts(tag: Tag) -> bool;

    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! list_element {
    ($ty:ty, $as:ident, $($tag:ident)|+) => {
        impl ListElement for $ty {
            fn accepts(tag: Tag) -> bool {
                matches!(tag, $(Tag::$tag)|+)
            }

            fn from_value(value: Value) -> Result<Self> {
                value.$as()
            }
        }
    };
}

list_element!(i8, as_byte, Byte);
list_element!(i16, as_short, Byte | Short);
list_element!(i32, as_int, Byte | Short | Int);
list_element!(i64, as_long, Byte | Short | Int | Long);
list_element!(f32, as_float, Byte | Short | Int | Long | Float);
list_element!(f64, as_double, Byte | Short | Int | Long | Float | Double);

impl ListElement for String {
    fn accepts(tag: Tag) -> bool {
        tag == Tag::String
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::wrong_kind("String", other.tag())),
        }
    }
}

impl<R: Read> Parser<R> {
    /// Reads forward until a tag called `name`, anywhere after the current
    /// position. Returns `false` if the stream ends first.
    pub fn read_to_following_named(&mut self, name: &str) -> Result<bool> {
        while self.read_to_following()? {
            if self.name() == Some(name) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Reads forward until a tag called `name` inside the current tag.
    /// Stops and returns `false` when the current tag has been left.
    pub fn read_to_descendant(&mut self, name: &str) -> Result<bool> {
        if self.usable()? {
            let start = self.depth;
            while self.read_to_following()? {
                if self.depth <= start {
                    return Ok(false);
                }
                if self.name() == Some(name) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Moves past the current tag, including any children, to the next tag
    /// at the same depth. Returns `false` if the parent ends first.
    pub fn read_to_next_sibling(&mut self) -> Result<bool> {
        if self.usable()? {
            let start = self.depth;
            while self.read_to_following()? {
                if self.depth == start && self.tag != Some(Tag::End) {
                    return Ok(true);
                }
                if self.depth < start {
                    return Ok(false);
                }
            }
        }
        Ok(false)
    }

    pub fn read_to_next_sibling_named(&mut self, name: &str) -> Result<bool> {
        while self.read_to_next_sibling()? {
            if self.name() == Some(name) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Skips the current tag and everything after it at the same depth or
    /// deeper, stopping on the first tag outside the current parent. Returns
    /// the number of tags skipped.
    pub fn skip(&mut self) -> Result<usize> {
        let mut skipped = 0;
        if self.usable()? {
            let start = self.depth;
            while self.read_to_following()? && self.depth >= start {
                skipped += 1;
            }
        }
        Ok(skipped)
    }

    /// Reads the remaining elements of a list of bytes in one go.
    pub fn read_list_as_bytes(&mut self) -> Result<Vec<u8>> {
        let remaining = self.begin_bulk(|tag| tag == Tag::Byte)?;
        let result = self.reader.read_bytes(remaining);
        let bytes = self.poison(result)?;
        self.end_bulk(remaining);
        Ok(bytes)
    }

    /// Reads the remaining elements of a list, converting each one to `T`.
    ///
    /// Works when the current tag is a list, or when positioned on an
    /// element of one. Afterwards the next read moves past the list.
    pub fn read_list_as<T: ListElement>(&mut self) -> Result<Vec<T>> {
        let remaining = self.begin_bulk(T::accepts)?;

        let mut out = Vec::with_capacity(remaining.min(DEFAULT_BUFFER_SIZE));
        if let Some(kind) = self.element_tag {
            for _ in 0..remaining {
                let result = de::read_value(&mut self.reader, kind).and_then(T::from_value);
                out.push(self.poison(result)?);
            }
        }
        self.end_bulk(remaining);
        Ok(out)
    }

    /// `Ok(false)` at the end of the stream.
    fn usable(&self) -> Result<bool> {
        match self.state {
            State::Error => Err(Error::ReaderUnusable),
            State::StreamEnd => Ok(false),
            _ => Ok(true),
        }
    }

    /// Positions the parser inside a list for a bulk read, returning how
    /// many elements are left. Nothing changes if the list does not fit.
    fn begin_bulk(&mut self, accepts: impl Fn(Tag) -> bool) -> Result<usize> {
        self.check_readable()?;
        let fits = |kind: Option<Tag>| match kind {
            Some(kind) => accepts(kind),
            // An untyped list is always empty.
            None => true,
        };

        match self.state {
            State::ListStart if fits(self.list_type) => {
                self.descend();
                self.state = State::InList;
                Ok(self.parent_len)
            }
            State::InList if fits(self.element_tag) => {
                let next = match self.list_index {
                    Some(i) if self.at_value => i,
                    Some(i) => i + 1,
                    None => 0,
                };
                self.at_value = false;
                Ok(self.parent_len.saturating_sub(next))
            }
            _ => Err(Error::bespoke(
                "bulk list reads need a list of a matching primitive kind",
            )),
        }
    }

    fn end_bulk(&mut self, read: usize) {
        self.tags_read += read;
        if self.parent_len > 0 {
            self.list_index = Some(self.parent_len - 1);
        }
    }
}
