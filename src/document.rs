use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use log::debug;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::codec::{BinaryReader, BinaryWriter, CountingReader, CountingWriter};
use crate::compression::{self, Compression, Decoder, Encoder};
use crate::de::{self, Selection};
use crate::error::{Error, Result};
use crate::ser;
use crate::stream::Parser;
use crate::value::display;
use crate::{Compound, NamedTag, Settings, Value};

/// A complete NBT file: a named root compound.
///
/// ```no_run
/// # use nbtio::{compression::Compression, Document};
/// # fn main() -> nbtio::error::Result<()> {
/// let mut doc = Document::from_file("level.dat")?;
/// let data = doc.root_mut().get_compound_mut("Data")?.unwrap();
/// data.remove("raining");
/// doc.save_to_file("level.dat", Compression::GZip)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    name: String,
    root: Compound,
}

/// A document along with how it was stored.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub document: Document,
    /// Compression found, or the one asked for.
    pub compression: Compression,
    /// Bytes taken from the underlying stream, before decompression.
    pub bytes_read: u64,
}

/// Callback deciding which tags to keep while loading. Returning `false`
/// skips the tag and everything inside it.
pub type SelectorFn<'s> = &'s mut dyn FnMut(&Selection<'_>) -> bool;

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: Compound::new(),
        }
    }

    /// Makes a document out of a named compound tag.
    pub fn from_tag(tag: NamedTag) -> Result<Self> {
        match tag {
            NamedTag {
                name: Some(name),
                value: Value::Compound(root),
            } => Ok(Self { name, root }),
            NamedTag { name: None, .. } => Err(Error::bespoke("root tag must be named")),
            NamedTag { value, .. } => Err(Error::wrong_kind("Compound", value.tag())),
        }
    }

    pub fn into_tag(self) -> NamedTag {
        NamedTag::new(self.name, self.root)
    }

    /// Name of the root compound. Often empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn root(&self) -> &Compound {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Compound {
        &mut self.root
    }

    /// Parses a document held in memory, detecting its compression.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::load(Cursor::new(bytes), &Settings::default())?.document)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::load_file(path, &Settings::default())?.document)
    }

    pub fn load_file(path: impl AsRef<Path>, settings: &Settings) -> Result<Loaded> {
        let path = path.as_ref();
        debug!("loading nbt from {}", path.display());
        let file = File::open(path)?;
        Self::load(BufReader::with_capacity(settings.buffer_size, file), settings)
    }

    /// Loads a document from a seekable stream, detecting its compression.
    pub fn load<R: Read + Seek>(reader: R, settings: &Settings) -> Result<Loaded> {
        Self::load_with_selector(reader, settings, None)
    }

    /// Like [`Document::load`], but only keeps the tags `selector` accepts.
    /// The root compound itself is always kept.
    ///
    /// ```
    /// # use std::io::Cursor;
    /// # use nbtio::{compression::Compression, Document, Settings, Tag};
    /// # fn main() -> nbtio::error::Result<()> {
    /// # let mut doc = Document::new("");
    /// # doc.root_mut().insert("keep", 1)?;
    /// # doc.root_mut().insert("blob", vec![0u8; 1024])?;
    /// # let bytes = doc.to_bytes(Compression::None)?;
    /// let mut no_arrays = |s: &nbtio::Selection<'_>| !s.tag.is_array();
    /// let loaded = Document::load_with_selector(
    ///     Cursor::new(bytes),
    ///     &Settings::default(),
    ///     Some(&mut no_arrays),
    /// )?;
    /// assert!(loaded.document.root().contains("keep"));
    /// assert!(!loaded.document.root().contains("blob"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_with_selector<R: Read + Seek>(
        mut reader: R,
        settings: &Settings,
        selector: Option<SelectorFn<'_>>,
    ) -> Result<Loaded> {
        let compression = compression::detect(&mut reader)?;
        Self::read_from(reader, compression, settings, selector)
    }

    /// Loads from a stream that cannot seek, so the compression has to be
    /// known.
    pub fn load_stream<R: Read>(
        reader: R,
        compression: Compression,
        settings: &Settings,
    ) -> Result<Loaded> {
        Self::read_from(reader, compression, settings, None)
    }

    fn read_from<R: Read>(
        reader: R,
        compression: Compression,
        settings: &Settings,
        selector: Option<SelectorFn<'_>>,
    ) -> Result<Loaded> {
        let decoder = Decoder::new(CountingReader::new(reader), compression)?;
        let mut reader = BinaryReader::new(decoder, settings.endian);
        let (name, root) = de::read_root(&mut reader, selector)?;

        let decompressed = reader.position();
        let bytes_read = reader.into_inner().into_inner().count();
        debug!(
            "loaded nbt document {:?}: {} bytes, {} decompressed, {:?}",
            name, bytes_read, decompressed, compression
        );

        Ok(Loaded {
            document: Self { name, root },
            compression,
            bytes_read,
        })
    }

    /// Writes the document, returning the number of bytes given to `writer`.
    pub fn write_to<W: Write>(
        &self,
        writer: W,
        compression: Compression,
        settings: &Settings,
    ) -> Result<u64> {
        let encoder = Encoder::new(CountingWriter::new(writer), compression)?;
        let mut out = BinaryWriter::new(encoder, settings.endian);
        ser::write_root(&mut out, &self.name, &self.root)?;

        let decompressed = out.position();
        let mut counter = out.into_inner().finish()?;
        counter.flush()?;
        let written = counter.count();
        debug!(
            "saved nbt document {:?}: {} bytes, {} decompressed, {:?}",
            self.name, written, decompressed, compression
        );
        Ok(written)
    }

    pub fn to_bytes(&self, compression: Compression) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes, compression, &Settings::default())?;
        Ok(bytes)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>, compression: Compression) -> Result<u64> {
        self.save_with_settings(path, &Settings::default().with_compression(compression))
    }

    /// Saves using the compression and byte order from `settings`.
    pub fn save_with_settings(&self, path: impl AsRef<Path>, settings: &Settings) -> Result<u64> {
        // Checked before the file is created so a bad call does not truncate
        // an existing file.
        if settings.compression == Compression::AutoDetect {
            return Err(Error::bespoke("a compression must be chosen for writing"));
        }

        let path = path.as_ref();
        debug!("saving nbt to {}", path.display());
        let file = File::create(path)?;
        let writer = BufWriter::with_capacity(settings.buffer_size, file);
        self.write_to(writer, settings.compression, settings)
    }
}

/// Reads just the name of a file's root compound.
pub fn read_root_name(path: impl AsRef<Path>) -> Result<String> {
    let file = File::open(path)?;
    read_root_name_from(BufReader::new(file))
}

/// Reads just the name of the root compound, detecting compression.
pub fn read_root_name_from<R: Read + Seek>(reader: R) -> Result<String> {
    let decoder = compression::open(reader, Compression::AutoDetect)?;
    let mut parser = Parser::new(decoder);
    parser.read_to_following()?;
    parser
        .root_name()
        .map(str::to_owned)
        .ok_or_else(Error::no_root_compound)
}

impl From<Document> for NamedTag {
    fn from(doc: Document) -> Self {
        doc.into_tag()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display::write_root(f, &self.name, &self.root)
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Document", 2)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("root", &self.root)?;
        s.end()
    }
}
