use serde::{Deserialize, Serialize};

use crate::codec::{Endian, DEFAULT_BUFFER_SIZE};
use crate::compression::Compression;

/// Options shared by documents, the streaming parser and the writer.
///
/// Settings can be deserialized from any serde format. Missing fields take
/// their default.
///
/// ```
/// # use nbtio::{codec::Endian, Settings};
/// let settings = Settings::default()
///     .with_endian(Endian::Little)
///     .with_skip_end_tags(false);
/// assert_eq!(settings.buffer_size, 8192);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Byte order of numbers and string lengths.
    pub endian: Endian,

    /// If set, the parser moves straight past the End tag of a compound
    /// instead of reporting it.
    pub skip_end_tags: bool,

    /// If set, the parser keeps the last value read so `read_value` can be
    /// called more than once for the same tag.
    pub cache_values: bool,

    /// Size of file buffers and of the scratch buffer used for stream copies.
    pub buffer_size: usize,

    /// Compression used when saving a document without naming one.
    pub compression: Compression,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endian: Endian::Big,
            skip_end_tags: true,
            cache_values: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            compression: Compression::ZLib,
        }
    }
}

impl Settings {
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_skip_end_tags(mut self, skip: bool) -> Self {
        self.skip_end_tags = skip;
        self
    }

    pub fn with_cache_values(mut self, cache: bool) -> Self {
        self.cache_values = cache;
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}
