//! nbtio reads and writes NBT (Named Binary Tag) data, the compact binary
//! tree format used by *Minecraft* to store world data, player files and
//! more.
//!
//! There are three ways to work with the data:
//!
//! * A full in-memory tree. Load with [`Document`], then walk and mutate
//!   [`Compound`], [`List`] and [`Value`].
//! * A forward-only [`stream::Parser`] that produces one tag at a time
//!   without building the tree, able to materialize a single subtree on
//!   demand.
//! * A streaming [`Writer`] that emits well-formed NBT directly to any
//!   [`Write`][`std::io::Write`] without an intermediate tree.
//!
//! Documents may be raw, GZip or ZLib compressed. See [`compression`].
//!
//! # Quick example
//!
//! ```
//! use nbtio::{compression::Compression, Compound, Document, List, Value};
//!
//! # fn main() -> nbtio::error::Result<()> {
//! let mut doc = Document::new("");
//! doc.root_mut().insert("health", Value::Short(20))?;
//!
//! let mut items = List::new();
//! for id in 1..=2 {
//!     let mut item = Compound::new();
//!     item.insert("id", id)?;
//!     items.push(item)?;
//! }
//! doc.root_mut().insert("items", items)?;
//!
//! let bytes = doc.to_bytes(Compression::ZLib)?;
//! let loaded = Document::from_bytes(&bytes)?;
//!
//! let items = loaded.root().get_list("items")?.unwrap();
//! assert_eq!(items.len(), 2);
//! assert_eq!(items.get(1)?.as_compound()?.get_int("id")?, Some(2));
//! # Ok(())
//! # }
//! ```
//!
//! # Streaming
//!
//! ```
//! use nbtio::{stream::Parser, Tag, Writer};
//!
//! # fn main() -> nbtio::error::Result<()> {
//! let mut writer = Writer::new(Vec::new(), "root")?;
//! writer.write_int(Some("level"), 7)?;
//! writer.begin_list(Some("scores"), Tag::Short, 2)?;
//! writer.write_short(None, 10)?;
//! writer.write_short(None, 20)?;
//! writer.end_list()?;
//! writer.end_compound()?;
//! let bytes = writer.finish()?;
//!
//! let mut parser = Parser::new(bytes.as_slice());
//! assert!(parser.read_to_following_named("scores")?);
//! assert_eq!(parser.read_list_as::<i32>()?, vec![10, 20]);
//! # Ok(())
//! # }
//! ```

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

pub mod codec;
pub mod compression;
pub mod error;
pub mod stream;

mod de;
mod document;
mod ser;
mod settings;
mod value;
mod writer;

pub use de::Selection;
pub use document::*;
pub use settings::*;
pub use value::*;
pub use writer::*;

#[cfg(test)]
mod test;

/// An NBT tag kind. This does not carry the value or the name of the data.
#[derive(
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
)]
#[repr(u8)]
pub enum Tag {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// Represents as array of bytes.
    ByteArray = 7,
    /// Represents a Unicode string.
    String = 8,
    /// Represents a list of other objects, all of the same kind.
    List = 9,
    /// Represents a struct-like structure.
    Compound = 10,
    /// Represents as array of Int (i32).
    IntArray = 11,
}

impl Tag {
    /// Fixed-size numeric kinds.
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Short | Self::Int | Self::Long | Self::Float | Self::Double
        )
    }

    pub const fn is_array(self) -> bool {
        matches!(self, Self::ByteArray | Self::IntArray)
    }

    pub const fn is_container(self) -> bool {
        matches!(self, Self::List | Self::Compound)
    }

    /// Kinds whose payload is a single value the parser can hand out with
    /// `read_value`.
    pub const fn has_value(self) -> bool {
        !matches!(self, Self::End | Self::List | Self::Compound)
    }

    /// Name used by the pretty printer, eg `TAG_Int`.
    pub const fn display_name(self) -> &'static str {
        match self {
            Tag::End => "TAG_End",
            Tag::Byte => "TAG_Byte",
            Tag::Short => "TAG_Short",
            Tag::Int => "TAG_Int",
            Tag::Long => "TAG_Long",
            Tag::Float => "TAG_Float",
            Tag::Double => "TAG_Double",
            Tag::ByteArray => "TAG_Byte_Array",
            Tag::String => "TAG_String",
            Tag::List => "TAG_List",
            Tag::Compound => "TAG_Compound",
            Tag::IntArray => "TAG_Int_Array",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
