//! Contains the Error and Result type used throughout the crate.
use std::fmt::Display;

use crate::Tag;

/// Errors that can occur while building, reading or writing NBT.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The underlying stream failed. This includes running out of input part
    /// way through a value, which shows up as
    /// [`std::io::ErrorKind::UnexpectedEof`].
    Io(std::io::Error),

    /// The bytes do not form valid NBT: unknown tag ids, negative lengths,
    /// a missing root compound, a bad compression header and so on.
    Format(String),

    /// The caller asked for something invalid: a wrong-variant access, an
    /// index out of range, a name collision, or breaking the writer's
    /// structure.
    Precondition(String),

    /// A streaming parser hit an error earlier and can no longer be used.
    /// It has to be discarded.
    ReaderUnusable,
}

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => f.write_fmt(format_args!("io error: {}", e)),
            Error::Format(msg) => f.write_fmt(format_args!("invalid nbt: {}", msg)),
            Error::Precondition(msg) => f.write_str(msg),
            Error::ReaderUnusable => {
                f.write_str("parser is in an error state and cannot be used")
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl Error {
    /// True if the error was caused by the input ending early.
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition(_))
    }

    pub(crate) fn invalid_tag(tag: u8) -> Error {
        Error::Format(format!("invalid tag id: {}", tag))
    }

    pub(crate) fn no_root_compound() -> Error {
        Error::Format("no root compound".to_owned())
    }

    pub(crate) fn unexpected_end() -> Error {
        Error::Format("unexpected End tag where a value was expected".to_owned())
    }

    pub(crate) fn negative_length(len: i32) -> Error {
        Error::Format(format!("negative length: {}", len))
    }

    pub(crate) fn nonunicode_string(data: &[u8]) -> Error {
        Error::Format(format!(
            "string is not valid UTF-8: {}",
            String::from_utf8_lossy(data)
        ))
    }

    pub(crate) fn wrong_kind(expected: &str, found: Tag) -> Error {
        Error::Precondition(format!("expected {}, found {}", expected, found))
    }

    pub(crate) fn index_out_of_range(index: usize, len: usize) -> Error {
        Error::Precondition(format!(
            "index {} out of range for list of length {}",
            index, len
        ))
    }

    pub(crate) fn bespoke(msg: impl Into<String>) -> Error {
        Error::Precondition(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Error {
        Error::Format(msg.into())
    }
}
