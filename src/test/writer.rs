use std::io::Cursor;

use super::builder::Builder;
use crate::codec::Endian;
use crate::error::Result;
use crate::stream::Parser;
use crate::{Compound, Document, List, NamedTag, Settings, Tag, Value, Writer};

#[test]
fn empty_document() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "hello")?;
    assert!(!w.is_done());
    w.end_compound()?;
    assert!(w.is_done());

    let expected = Builder::new().start_compound("hello").end_compound().build();
    assert_eq!(w.finish()?, expected);
    Ok(())
}

#[test]
fn matches_builder_bytes() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    w.write_byte(Some("b"), 1)?;
    w.write_short(Some("s"), 2)?;
    w.write_long(Some("l"), 3)?;
    w.write_float(Some("f"), 0.5)?;
    w.write_string(Some("str"), "x")?;
    w.begin_list(Some("list"), Tag::Int, 2)?;
    w.write_int(None, 7)?;
    w.write_int(None, 8)?;
    w.end_list()?;
    w.begin_compound(Some("c"))?;
    w.write_double(Some("d"), 1.0)?;
    w.end_compound()?;
    w.write_byte_array(Some("ba"), &[1, 2])?;
    w.write_int_array(Some("ia"), &[3])?;
    w.end_compound()?;

    let expected = Builder::new()
        .start_compound("")
        .byte("b", 1)
        .short("s", 2)
        .long("l", 3)
        .float("f", 0.5)
        .string("str", "x")
        .start_list("list", Tag::Int, 2)
        .int_payload(7)
        .int_payload(8)
        .start_compound("c")
        .double("d", 1.0)
        .end_compound()
        .byte_array("ba", &[1, 2])
        .int_array("ia", &[3])
        .end_compound()
        .build();
    assert_eq!(w.finish()?, expected);
    Ok(())
}

#[test]
fn compound_children_need_names() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    let before = w.position();
    assert!(w.write_int(None, 1).unwrap_err().is_precondition());
    assert!(w.begin_compound(None).is_err());
    assert_eq!(w.position(), before);
    Ok(())
}

#[test]
fn list_elements_are_checked() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    w.begin_list(Some("l"), Tag::Short, 2)?;
    let before = w.position();

    assert!(w.write_short(Some("named"), 1).unwrap_err().is_precondition());
    assert!(w.write_int(None, 1).unwrap_err().is_precondition());
    assert_eq!(w.position(), before);

    w.write_short(None, 1)?;
    assert!(w.end_list().unwrap_err().is_precondition());
    w.write_short(None, 2)?;
    assert!(w.write_short(None, 3).unwrap_err().is_precondition());
    assert!(w.end_compound().is_err());
    w.end_list()?;
    w.end_compound()?;
    w.finish()?;
    Ok(())
}

#[test]
fn end_list_outside_list() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    assert!(w.end_list().unwrap_err().is_precondition());
    Ok(())
}

#[test]
fn list_of_end_must_be_empty() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    assert!(w.begin_list(Some("l"), Tag::End, 1).is_err());
    w.begin_list(Some("l"), Tag::End, 0)?;
    w.end_list()?;
    w.end_compound()?;

    let doc = Document::from_bytes(&w.finish()?)?;
    assert_eq!(doc.root().get_list("l")?.unwrap().kind(), None);
    Ok(())
}

#[test]
fn nested_lists_and_compounds() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    w.begin_list(Some("outer"), Tag::Compound, 2)?;
    w.begin_compound(None)?;
    w.begin_list(Some("inner"), Tag::List, 1)?;
    w.begin_list(None, Tag::Byte, 1)?;
    w.write_byte(None, 5)?;
    w.end_list()?;
    w.end_list()?;
    w.end_compound()?;
    w.begin_compound(None)?;
    w.end_compound()?;
    w.end_list()?;
    w.end_compound()?;

    let doc = Document::from_bytes(&w.finish()?)?;
    let outer = doc.root().get_list("outer")?.unwrap();
    assert_eq!(outer.len(), 2);
    let inner = outer.get(0)?.as_compound()?.get_list("inner")?.unwrap();
    assert_eq!(inner.get(0)?.as_list()?.get(0)?, &Value::Byte(5));
    Ok(())
}

#[test]
fn finished_writer_rejects_everything() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    w.end_compound()?;
    assert!(w.write_int(Some("late"), 1).unwrap_err().is_precondition());
    assert!(w.end_compound().is_err());
    assert!(w.begin_compound(Some("c")).is_err());
    Ok(())
}

#[test]
fn finish_requires_closed_root() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    w.begin_compound(Some("open"))?;
    assert!(w.finish().unwrap_err().is_precondition());
    Ok(())
}

#[test]
fn array_slices() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    w.write_byte_array_slice(Some("b"), &[1, 2, 3, 4], 1, 2)?;
    w.write_int_array_slice(Some("i"), &[1, 2, 3, 4], 3, 1)?;
    assert!(w
        .write_byte_array_slice(Some("bad"), &[1, 2], 1, 2)
        .unwrap_err()
        .is_precondition());
    assert!(w
        .write_int_array_slice(Some("bad"), &[1], usize::MAX, 2)
        .is_err());
    w.end_compound()?;

    let doc = Document::from_bytes(&w.finish()?)?;
    assert_eq!(doc.root().get_byte_array("b")?, Some(&[2u8, 3][..]));
    assert_eq!(doc.root().get_int_array("i")?, Some(&[4][..]));
    assert!(!doc.root().contains("bad"));
    Ok(())
}

#[test]
fn arrays_from_readers() -> Result<()> {
    let bytes: Vec<u8> = (0..=255).collect();
    let ints: Vec<u8> = [1i32, -1, 300]
        .iter()
        .flat_map(|i| i.to_be_bytes())
        .collect();

    let mut w = Writer::new(Vec::new(), "")?;
    let mut buf = [0u8; 10];
    w.write_byte_array_from_reader(Some("b"), &mut Cursor::new(&bytes), 256, Some(&mut buf))?;
    w.write_int_array_from_reader(Some("i"), &mut Cursor::new(&ints), 3, None)?;
    w.end_compound()?;

    let doc = Document::from_bytes(&w.finish()?)?;
    assert_eq!(doc.root().get_byte_array("b")?, Some(bytes.as_slice()));
    assert_eq!(doc.root().get_int_array("i")?, Some(&[1, -1, 300][..]));
    Ok(())
}

#[test]
fn array_from_short_reader_fails() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    let err = w
        .write_byte_array_from_reader(Some("b"), &mut Cursor::new(vec![1, 2]), 3, None)
        .unwrap_err();
    assert!(err.is_eof());

    let mut w = Writer::new(Vec::new(), "")?;
    let mut empty: [u8; 0] = [];
    let before = w.position();
    assert!(w
        .write_byte_array_from_reader(Some("b"), &mut Cursor::new(vec![1]), 1, Some(&mut empty))
        .unwrap_err()
        .is_precondition());
    assert_eq!(w.position(), before);
    Ok(())
}

#[test]
fn whole_tags() -> Result<()> {
    let mut inner = Compound::new();
    inner.insert("x", 1)?;
    let mut list = List::new();
    list.push("a")?;

    let mut w = Writer::new(Vec::new(), "")?;
    w.write_tag(&NamedTag::new("inner", inner.clone()))?;
    w.write_value(Some("list"), &Value::List(list.clone()))?;
    w.begin_list(Some("compounds"), Tag::Compound, 1)?;
    assert!(w
        .write_tag(&NamedTag::new("named", inner.clone()))
        .unwrap_err()
        .is_precondition());
    w.write_tag(&NamedTag::unnamed(inner.clone()))?;
    w.end_list()?;
    assert!(w.write_tag(&NamedTag::unnamed(1)).is_err());
    w.end_compound()?;

    let doc = Document::from_bytes(&w.finish()?)?;
    assert_eq!(doc.root().get_compound("inner")?, Some(&inner));
    assert_eq!(doc.root().get_list("list")?, Some(&list));
    let compounds = doc.root().get_list("compounds")?.unwrap();
    assert_eq!(compounds.get(0)?.as_compound()?, &inner);
    Ok(())
}

#[test]
fn long_strings_rejected_up_front() -> Result<()> {
    let mut w = Writer::new(Vec::new(), "")?;
    let before = w.position();
    let long = "x".repeat(70_000);
    assert!(w.write_string(Some("s"), &long).unwrap_err().is_precondition());
    assert!(w.write_int(Some(&long), 1).unwrap_err().is_precondition());
    assert_eq!(w.position(), before);
    assert!(Writer::new(Vec::new(), &long).is_err());
    Ok(())
}

#[test]
fn nested_long_strings_rejected_up_front() -> Result<()> {
    let long = "x".repeat(70_000);
    let mut bad_key = Compound::new();
    bad_key.insert(long.as_str(), 1)?;
    let mut bad_string = Compound::new();
    bad_string.insert("s", long.as_str())?;
    let mut deep = Compound::new();
    deep.insert("inner", bad_string.clone())?;

    let mut w = Writer::new(Vec::new(), "")?;
    w.begin_list(Some("l"), Tag::Compound, 1)?;
    let before = w.position();

    for bad in [bad_key, bad_string, deep] {
        let err = w.write_tag(&NamedTag::unnamed(bad)).unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(w.position(), before);
    }

    // Nothing was counted, so the list still wants its element.
    assert!(w.end_list().is_err());
    let mut ok = Compound::new();
    ok.insert("a", 1)?;
    w.write_tag(&NamedTag::unnamed(ok.clone()))?;
    w.end_list()?;
    w.end_compound()?;

    let doc = Document::from_bytes(&w.finish()?)?;
    let list = doc.root().get_list("l")?.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.get(0)?.as_compound()?, &ok);
    Ok(())
}

#[test]
fn little_endian_output() -> Result<()> {
    let settings = Settings::default().with_endian(Endian::Little);
    let mut w = Writer::with_settings(Vec::new(), "r", &settings)?;
    w.write_int(Some("i"), 0x01020304)?;
    w.end_compound()?;
    let bytes = w.finish()?;
    assert_eq!(&bytes[..4], &[10, 1, 0, b'r']);
    assert_eq!(&bytes[8..12], &[4, 3, 2, 1]);

    let mut parser = Parser::with_settings(bytes.as_slice(), &settings);
    assert!(parser.read_to_following_named("i")?);
    assert_eq!(parser.read_value()?, Value::Int(0x01020304));
    Ok(())
}

#[test]
fn writes_through_a_reference() -> Result<()> {
    let mut out = Vec::new();
    let mut w = Writer::new(&mut out, "")?;
    w.write_int(Some("a"), 1)?;
    w.end_compound()?;
    w.finish()?;
    assert_eq!(out.len(), 1 + 2 + 1 + 2 + 1 + 4 + 1);
    Ok(())
}
