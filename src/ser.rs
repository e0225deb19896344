//! Encoding of complete NBT trees.

use std::io::Write;

use crate::codec::BinaryWriter;
use crate::error::Result;
use crate::{Compound, Tag, Value};

/// Writes a full tag: id, name and payload.
pub(crate) fn write_named<W: Write>(
    writer: &mut BinaryWriter<W>,
    name: &str,
    value: &Value,
) -> Result<()> {
    writer.write_tag(value.tag())?;
    writer.write_string(name)?;
    write_payload(writer, value)
}

/// Writes a document: the root compound header followed by its children.
pub(crate) fn write_root<W: Write>(
    writer: &mut BinaryWriter<W>,
    name: &str,
    root: &Compound,
) -> Result<()> {
    writer.write_tag(Tag::Compound)?;
    writer.write_string(name)?;
    write_compound(writer, root)
}

fn write_compound<W: Write>(writer: &mut BinaryWriter<W>, compound: &Compound) -> Result<()> {
    for (name, value) in compound.iter() {
        write_named(writer, name, value)?;
    }
    writer.write_tag(Tag::End)
}

/// Writes only the payload, as used for list elements.
pub(crate) fn write_payload<W: Write>(writer: &mut BinaryWriter<W>, value: &Value) -> Result<()> {
    match value {
        Value::Byte(v) => writer.write_i8(*v),
        Value::Short(v) => writer.write_i16(*v),
        Value::Int(v) => writer.write_i32(*v),
        Value::Long(v) => writer.write_i64(*v),
        Value::Float(v) => writer.write_f32(*v),
        Value::Double(v) => writer.write_f64(*v),
        Value::String(v) => writer.write_string(v),
        Value::ByteArray(v) => {
            writer.write_len(v.len())?;
            writer.write_bytes(v)
        }
        Value::IntArray(v) => {
            writer.write_len(v.len())?;
            writer.write_i32s(v)
        }
        Value::List(list) => {
            // An untyped list can only be empty, and is written as a list of
            // End tags.
            writer.write_tag(list.kind().unwrap_or(Tag::End))?;
            writer.write_len(list.len())?;
            for v in list {
                write_payload(writer, v)?;
            }
            Ok(())
        }
        Value::Compound(c) => write_compound(writer, c),
    }
}
