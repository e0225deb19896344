use std::fmt::{self, Display, Write};

use super::{Compound, List, NamedTag, Value};
use crate::Tag;

pub(crate) const DEFAULT_INDENT: &str = "  ";

/// Writes one tag and, for containers, all of its children. Arrays only show
/// their length.
pub(crate) fn write_tag<W: Write>(
    out: &mut W,
    name: Option<&str>,
    value: &Value,
    indent: &str,
    level: usize,
) -> fmt::Result {
    for _ in 0..level {
        out.write_str(indent)?;
    }
    out.write_str(value.tag().display_name())?;
    if let Some(name) = name {
        write!(out, "({:?})", name)?;
    }
    out.write_str(": ")?;

    match value {
        Value::Byte(v) => write!(out, "{}", v),
        Value::Short(v) => write!(out, "{}", v),
        Value::Int(v) => write!(out, "{}", v),
        Value::Long(v) => write!(out, "{}", v),
        Value::Float(v) => write!(out, "{}", v),
        Value::Double(v) => write!(out, "{}", v),
        Value::String(v) => write!(out, "{:?}", v),
        Value::ByteArray(v) => write!(out, "[{} bytes]", v.len()),
        Value::IntArray(v) => write!(out, "[{} ints]", v.len()),
        Value::List(list) => {
            write_open(out, list.len())?;
            for v in list {
                write_tag(out, None, v, indent, level + 1)?;
                out.write_char('\n')?;
            }
            write_close(out, indent, level)
        }
        Value::Compound(c) => write_children(out, c, indent, level),
    }
}

/// Writes a root compound the way a named compound tag is shown.
pub(crate) fn write_root<W: Write>(out: &mut W, name: &str, root: &Compound) -> fmt::Result {
    write!(out, "{}({:?}): ", Tag::Compound.display_name(), name)?;
    write_children(out, root, DEFAULT_INDENT, 0)
}

fn write_children<W: Write>(out: &mut W, c: &Compound, indent: &str, level: usize) -> fmt::Result {
    write_open(out, c.len())?;
    for (n, v) in c.iter() {
        write_tag(out, Some(n), v, indent, level + 1)?;
        out.write_char('\n')?;
    }
    write_close(out, indent, level)
}

fn write_open<W: Write>(out: &mut W, len: usize) -> fmt::Result {
    writeln!(out, "{} entries {{", len)
}

fn write_close<W: Write>(out: &mut W, indent: &str, level: usize) -> fmt::Result {
    for _ in 0..level {
        out.write_str(indent)?;
    }
    out.write_char('}')
}

impl NamedTag {
    /// Renders the tag and its children, indenting each level with `indent`.
    pub fn to_pretty_string(&self, indent: &str) -> String {
        let mut s = String::new();
        // Writing into a String cannot fail.
        let _ = write_tag(&mut s, self.name(), &self.value, indent, 0);
        s
    }
}

impl Display for NamedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tag(f, self.name(), &self.value, DEFAULT_INDENT, 0)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tag(f, None, self, DEFAULT_INDENT, 0)
    }
}

impl Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_children(f, self, DEFAULT_INDENT, 0)
    }
}

impl Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_open(f, self.len())?;
        for v in self {
            write_tag(f, None, v, DEFAULT_INDENT, 1)?;
            f.write_char('\n')?;
        }
        f.write_char('}')
    }
}
