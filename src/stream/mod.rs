//! Allows streaming of NBT data without building the whole tree.
//!
//! [`Parser`] is a forward-only cursor. Each call to
//! [`read_to_following`][Parser::read_to_following] moves it to the next tag
//! in document order, after which the tag's kind, name, depth and so on can
//! be inspected. Values are only decoded when asked for with
//! [`read_value`][Parser::read_value]; anything not read is skipped.
//!
//! # Dump NBT
//!
//! ```
//! use nbtio::stream::Parser;
//! # use nbtio::Writer;
//! # fn main() -> nbtio::error::Result<()> {
//! # let mut w = Writer::new(Vec::new(), "")?;
//! # w.write_string(Some("name"), "Steve")?;
//! # w.end_compound()?;
//! # let data = w.finish()?;
//!
//! let mut parser = Parser::new(data.as_slice());
//! while parser.read_to_following()? {
//!     let indent = (parser.depth() - 1) * 2;
//!     print!("{:indent$}{:?} {:?}", "", parser.tag(), parser.name(), indent = indent);
//!     if parser.has_value() {
//!         print!(" = {}", parser.read_value()?);
//!     }
//!     println!();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Bad data or a failing reader puts the parser in an error state. Every
//! later call returns [`Error::ReaderUnusable`], the parser has to be
//! discarded. Misuse, such as reading a value twice, is reported as
//! [`Error::Precondition`] and leaves the parser usable.

mod navigate;

pub use navigate::ListElement;

use std::io::Read;

use log::{trace, warn};

use crate::codec::BinaryReader;
use crate::de::{self, read_list_header};
use crate::error::{Error, Result};
use crate::{Compound, List, NamedTag, Settings, Tag, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StreamStart,
    CompoundStart,
    InCompound,
    CompoundEnd,
    ListStart,
    InList,
    StreamEnd,
    Error,
}

/// What is saved when descending into a container, and restored on the way
/// back up.
#[derive(Debug, Clone)]
struct Context {
    parent_name: Option<String>,
    parent_tag: Option<Tag>,
    parent_len: usize,
    list_index: Option<usize>,
    element_tag: Option<Tag>,
}

/// Parser can take any reader and parse it as NBT data. Does not do
/// decompression, wrap the reader in a [`Decoder`][crate::compression::Decoder]
/// for that.
pub struct Parser<R> {
    reader: BinaryReader<R>,
    skip_end_tags: bool,
    cache_values: bool,

    state: State,
    stack: Vec<Context>,

    tag: Option<Tag>,
    name: Option<String>,
    root_name: Option<String>,
    depth: usize,
    tag_len: usize,
    list_type: Option<Tag>,
    tag_start: u64,
    at_value: bool,
    cached: Option<Value>,
    tags_read: usize,

    parent_name: Option<String>,
    parent_tag: Option<Tag>,
    parent_len: usize,
    list_index: Option<usize>,
    element_tag: Option<Tag>,
}

impl<R: Read> Parser<R> {
    /// Create new parser for the given reader, with default settings.
    pub fn new(reader: R) -> Self {
        Self::with_settings(reader, &Settings::default())
    }

    pub fn with_settings(reader: R, settings: &Settings) -> Self {
        Self {
            reader: BinaryReader::new(reader, settings.endian),
            skip_end_tags: settings.skip_end_tags,
            cache_values: settings.cache_values,
            state: State::StreamStart,
            stack: Vec::new(),
            tag: None,
            name: None,
            root_name: None,
            depth: 0,
            tag_len: 0,
            list_type: None,
            tag_start: 0,
            at_value: false,
            cached: None,
            tags_read: 0,
            parent_name: None,
            parent_tag: None,
            parent_len: 0,
            list_index: None,
            element_tag: None,
        }
    }

    /// Gets a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    /// Gets a mutable reference to the underlying reader. Reading from it
    /// directly will confuse the parser.
    pub fn get_mut(&mut self) -> &mut R {
        self.reader.get_mut()
    }

    /// Consumes this parser, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Kind of the current tag. `None` before the first read.
    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// Name of the current tag. List elements and End tags have none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// Name of the root compound, once it has been read.
    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    /// Nesting depth of the current tag. The root compound is at depth 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Length of the current array, or element count of the current list.
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    /// Element kind of the current list tag. `None` for an empty list
    /// written without a kind.
    pub fn list_type(&self) -> Option<Tag> {
        self.list_type
    }

    /// Byte offset of the current tag from where the parser started. For
    /// list elements this is the start of the element's payload.
    pub fn tag_start_offset(&self) -> u64 {
        self.tag_start
    }

    /// True if the current tag has a value that has not been read yet.
    pub fn has_value(&self) -> bool {
        self.at_value
    }

    pub fn is_compound(&self) -> bool {
        self.tag == Some(Tag::Compound)
    }

    pub fn is_list(&self) -> bool {
        self.tag == Some(Tag::List)
    }

    /// True if the current tag is an element of a list.
    pub fn is_list_element(&self) -> bool {
        self.parent_tag == Some(Tag::List)
    }

    pub fn parent_tag(&self) -> Option<Tag> {
        self.parent_tag
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Element count of the parent list. Zero when the parent is a compound.
    pub fn parent_len(&self) -> usize {
        self.parent_len
    }

    /// Index of the current element within its list.
    pub fn list_index(&self) -> Option<usize> {
        match self.parent_tag {
            Some(Tag::List) => self.list_index,
            _ => None,
        }
    }

    /// Number of tags visited so far, including skipped ones.
    pub fn tags_read(&self) -> usize {
        self.tags_read
    }

    pub fn is_at_stream_end(&self) -> bool {
        self.state == State::StreamEnd
    }

    pub fn is_in_error(&self) -> bool {
        self.state == State::Error
    }

    /// Moves to the next tag in the document, entering compounds and lists.
    /// Returns `false` once the root compound has been closed.
    pub fn read_to_following(&mut self) -> Result<bool> {
        let result = self.advance();
        self.poison(result)
    }

    /// Reads the value of the current tag. Only tags that are not containers
    /// have values, and each value can only be read once unless
    /// `cache_values` is set.
    pub fn read_value(&mut self) -> Result<Value> {
        self.check_readable()?;
        if !self.at_value {
            if self.cache_values {
                if let Some(v) = &self.cached {
                    return Ok(v.clone());
                }
            }
            return Err(Error::bespoke("no value to read"));
        }

        let result = self.read_current_value();
        self.poison(result)
    }

    /// Reads the current tag, including everything inside it when it is a
    /// container, as a detached tag. Afterwards the parser is positioned on
    /// the tag that follows.
    pub fn read_as_tag(&mut self) -> Result<NamedTag> {
        self.check_readable()?;
        if matches!(self.state, State::StreamStart | State::CompoundEnd) {
            self.read_to_following()?;
        }
        if self.state == State::StreamEnd {
            return Err(Error::bespoke("no tag to read"));
        }

        match self.tag {
            Some(Tag::Compound) | Some(Tag::List) => {}
            _ if self.at_value => {
                let value = self.read_value()?;
                let tag = NamedTag {
                    name: self.name.clone(),
                    value,
                };
                self.read_to_following()?;
                return Ok(tag);
            }
            _ => return Err(Error::bespoke("no value to read")),
        }

        let result = self.read_container();
        self.poison(result)
    }

    /// Materializes the container under the cursor. Children are gathered on
    /// a stack of open containers, each closed when the depth drops back to
    /// its own.
    fn read_container(&mut self) -> Result<NamedTag> {
        let start_depth = self.depth;
        let mut open = vec![(start_depth, self.empty_container()?)];

        loop {
            self.read_to_following()?;

            // Close every container the cursor has moved out of.
            while open.len() > 1 && open.last().map_or(false, |(d, _)| self.depth <= *d) {
                close_top(&mut open)?;
            }
            if self.depth <= start_depth || self.state == State::StreamEnd {
                break;
            }

            match self.tag {
                Some(Tag::Compound) | Some(Tag::List) => {
                    open.push((self.depth, self.empty_container()?));
                }
                Some(Tag::End) | None => {}
                Some(_) => {
                    let value = self.read_value()?;
                    let child = NamedTag {
                        name: self.name.clone(),
                        value,
                    };
                    if let Some((_, parent)) = open.last_mut() {
                        attach(parent, child)?;
                    }
                }
            }
        }

        while open.len() > 1 {
            close_top(&mut open)?;
        }
        open.pop()
            .map(|(_, tag)| tag)
            .ok_or_else(|| Error::bespoke("no tag to read"))
    }

    fn check_readable(&self) -> Result<()> {
        match self.state {
            State::Error => Err(Error::ReaderUnusable),
            State::StreamEnd => Err(Error::bespoke("parser is at the end of the stream")),
            _ => Ok(()),
        }
    }

    /// Bad data or io errors leave the stream at an unknown position, so the
    /// parser cannot continue.
    fn poison<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if !e.is_precondition() && self.state != State::Error {
                warn!("nbt parser stopped at byte {}: {}", self.reader.position(), e);
                self.state = State::Error;
            }
        }
        result
    }

    fn empty_container(&self) -> Result<NamedTag> {
        let value = match self.tag {
            Some(Tag::Compound) => Value::Compound(Compound::new()),
            Some(Tag::List) => Value::List(match self.list_type {
                Some(kind) => List::with_kind(kind)?,
                None => List::new(),
            }),
            _ => return Err(Error::bespoke("current tag is not a container")),
        };
        Ok(NamedTag {
            name: self.name.clone(),
            value,
        })
    }

    fn advance(&mut self) -> Result<bool> {
        loop {
            match self.state {
                State::StreamStart => {
                    self.tag_start = self.reader.position();
                    if self.reader.read_u8()? != u8::from(Tag::Compound) {
                        return Err(Error::no_root_compound());
                    }
                    self.tag = Some(Tag::Compound);
                    self.depth = 1;
                    self.read_header(true)?;
                    self.root_name = self.name.clone();
                    return Ok(true);
                }
                State::CompoundStart => {
                    self.descend();
                    self.state = State::InCompound;
                }
                State::InCompound => {
                    if self.at_value {
                        self.skip_current_value()?;
                    }

                    self.tag_start = self.reader.position();
                    let tag = self.reader.read_tag()?;
                    if tag == Tag::End {
                        self.tag = Some(Tag::End);
                        self.name = None;
                        self.tag_len = 0;
                        self.list_type = None;
                        self.cached = None;
                        self.tags_read += 1;
                        self.state = State::CompoundEnd;
                        if !self.skip_end_tags {
                            return Ok(true);
                        }
                    } else {
                        self.tag = Some(tag);
                        self.read_header(true)?;
                        return Ok(true);
                    }
                }
                State::ListStart => {
                    self.descend();
                    self.state = State::InList;
                }
                State::InList => {
                    if self.at_value {
                        self.skip_current_value()?;
                    }

                    let index = self.list_index.map_or(0, |i| i + 1);
                    if index >= self.parent_len {
                        self.ascend();
                        self.resume_parent(Tag::List)?;
                        if self.state == State::StreamEnd {
                            return Ok(false);
                        }
                    } else {
                        self.list_index = Some(index);
                        self.tag_start = self.reader.position();
                        self.tag = self.element_tag;
                        self.read_header(false)?;
                        return Ok(true);
                    }
                }
                State::CompoundEnd => {
                    self.ascend();
                    self.resume_parent(Tag::Compound)?;
                    if self.state == State::StreamEnd {
                        return Ok(false);
                    }
                }
                State::StreamEnd => return Ok(false),
                State::Error => return Err(Error::ReaderUnusable),
            }
        }
    }

    /// After leaving a container of kind `finished`, continue in whatever
    /// holds it.
    fn resume_parent(&mut self, finished: Tag) -> Result<()> {
        match self.parent_tag {
            Some(Tag::List) => {
                self.tag = Some(finished);
                self.state = State::InList;
            }
            Some(Tag::Compound) => self.state = State::InCompound,
            None => {
                trace!("reached end of nbt stream after {} tags", self.tags_read);
                self.state = State::StreamEnd;
            }
            Some(other) => {
                return Err(Error::format(format!("{} cannot contain other tags", other)))
            }
        }
        Ok(())
    }

    /// Reads the rest of a tag's header once its kind is known: the name if
    /// it has one, and the length of lists and arrays.
    fn read_header(&mut self, named: bool) -> Result<()> {
        self.tags_read += 1;
        self.name = if named {
            Some(self.reader.read_string()?)
        } else {
            None
        };
        self.cached = None;
        self.tag_len = 0;
        self.list_type = None;
        self.at_value = false;

        match self.tag {
            Some(Tag::ByteArray) | Some(Tag::IntArray) => {
                self.tag_len = self.reader.read_len()?;
                self.at_value = true;
            }
            Some(Tag::List) => {
                let (kind, len) = read_list_header(&mut self.reader)?;
                self.list_type = kind;
                self.tag_len = len;
                self.state = State::ListStart;
            }
            Some(Tag::Compound) => self.state = State::CompoundStart,
            Some(Tag::End) | None => return Err(Error::unexpected_end()),
            Some(_) => self.at_value = true,
        }

        trace!(
            "{:?} {:?} at depth {}, offset {}",
            self.tag,
            self.name,
            self.depth,
            self.tag_start
        );
        Ok(())
    }

    fn descend(&mut self) {
        self.stack.push(Context {
            parent_name: self.parent_name.take(),
            parent_tag: self.parent_tag,
            parent_len: self.parent_len,
            list_index: self.list_index,
            element_tag: self.element_tag,
        });
        self.parent_name = self.name.clone();
        self.parent_tag = self.tag;
        self.parent_len = self.tag_len;
        self.element_tag = self.list_type;
        self.list_index = None;
        self.tag_len = 0;
        self.depth += 1;
    }

    fn ascend(&mut self) {
        if let Some(ctx) = self.stack.pop() {
            self.parent_name = ctx.parent_name;
            self.parent_tag = ctx.parent_tag;
            self.parent_len = ctx.parent_len;
            self.list_index = ctx.list_index;
            self.element_tag = ctx.element_tag;
        }
        self.tag_len = 0;
        self.depth -= 1;
    }

    fn skip_current_value(&mut self) -> Result<()> {
        self.at_value = false;
        match self.tag {
            Some(Tag::ByteArray) => self.reader.skip(self.tag_len as u64),
            Some(Tag::IntArray) => self.reader.skip(self.tag_len as u64 * 4),
            Some(tag) => de::skip_value(&mut self.reader, tag),
            None => Ok(()),
        }
    }

    fn read_current_value(&mut self) -> Result<Value> {
        self.at_value = false;
        let value = match self.tag {
            Some(Tag::ByteArray) => Value::ByteArray(self.reader.read_bytes(self.tag_len)?),
            Some(Tag::IntArray) => Value::IntArray(self.reader.read_i32s(self.tag_len)?),
            Some(tag) => de::read_value(&mut self.reader, tag)?,
            None => return Err(Error::bespoke("no value to read")),
        };
        if self.cache_values {
            self.cached = Some(value.clone());
        }
        Ok(value)
    }
}

fn attach(parent: &mut NamedTag, child: NamedTag) -> Result<()> {
    match &mut parent.value {
        Value::Compound(c) => {
            if let Some(name) = child.name.as_deref() {
                if c.contains(name) {
                    return Err(Error::format(format!(
                        "compound contains {:?} more than once",
                        name
                    )));
                }
            }
            c.add(child)
        }
        Value::List(l) => l.push(child.value),
        _ => Err(Error::bespoke("current tag is not a container")),
    }
}

fn close_top(open: &mut Vec<(usize, NamedTag)>) -> Result<()> {
    if let Some((_, child)) = open.pop() {
        if let Some((_, parent)) = open.last_mut() {
            attach(parent, child)?;
        }
    }
    Ok(())
}
