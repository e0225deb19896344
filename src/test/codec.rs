use std::io::Cursor;

use crate::codec::{BinaryReader, BinaryWriter, CountingReader, Endian};
use crate::error::Result;
use crate::Tag;

#[test]
fn primitives_big_endian() -> Result<()> {
    let mut w = BinaryWriter::new(Vec::new(), Endian::Big);
    w.write_i16(0x0102)?;
    w.write_i32(-2)?;
    w.write_string("hi")?;
    let bytes = w.into_inner();
    assert_eq!(bytes, [1, 2, 0xff, 0xff, 0xff, 0xfe, 0, 2, b'h', b'i']);

    let mut r = BinaryReader::new(bytes.as_slice(), Endian::Big);
    assert_eq!(r.read_i16()?, 0x0102);
    assert_eq!(r.read_i32()?, -2);
    assert_eq!(r.read_string()?, "hi");
    assert_eq!(r.position(), 10);
    Ok(())
}

#[test]
fn primitives_little_endian() -> Result<()> {
    let mut w = BinaryWriter::new(Vec::new(), Endian::Little);
    w.write_i16(0x0102)?;
    w.write_string("é")?;
    w.write_f64(1.5)?;
    let bytes = w.into_inner();
    assert_eq!(&bytes[..6], &[2, 1, 2, 0, 0xc3, 0xa9]);

    let mut r = BinaryReader::new(bytes.as_slice(), Endian::Little);
    assert_eq!(r.read_i16()?, 0x0102);
    assert_eq!(r.read_string()?, "é");
    assert_eq!(r.read_f64()?, 1.5);
    Ok(())
}

#[test]
fn int_arrays_follow_endian() -> Result<()> {
    for endian in [Endian::Big, Endian::Little] {
        let mut w = BinaryWriter::new(Vec::new(), endian);
        w.write_i32s(&[1, -1, i32::MAX])?;
        let bytes = w.into_inner();
        let mut r = BinaryReader::new(bytes.as_slice(), endian);
        assert_eq!(r.read_i32s(3)?, vec![1, -1, i32::MAX]);
    }
    Ok(())
}

#[test]
fn string_too_long_for_prefix() {
    let mut w = BinaryWriter::new(Vec::new(), Endian::Big);
    let long = "a".repeat(65536);
    assert!(w.write_string(&long).unwrap_err().is_precondition());
    assert!(w.into_inner().is_empty());

    let mut w = BinaryWriter::new(Vec::new(), Endian::Big);
    w.write_string(&"a".repeat(65535)).unwrap();
    assert_eq!(w.position(), 65537);
}

#[test]
fn invalid_utf8_is_format_error() {
    let bytes = [0, 2, 0xff, 0xfe];
    let mut r = BinaryReader::new(&bytes[..], Endian::Big);
    assert!(r.read_string().unwrap_err().is_format());
}

#[test]
fn unknown_tag_id() {
    let mut r = BinaryReader::new(&[12u8, 10][..], Endian::Big);
    assert!(r.read_tag().unwrap_err().is_format());
    assert_eq!(r.read_tag().unwrap(), Tag::Compound);
}

#[test]
fn negative_length() {
    let bytes = (-1i32).to_be_bytes();
    let mut r = BinaryReader::new(&bytes[..], Endian::Big);
    assert!(r.read_len().unwrap_err().is_format());
}

#[test]
fn short_input_is_eof() {
    let mut r = BinaryReader::new(&[0u8, 1][..], Endian::Big);
    assert!(r.read_i32().unwrap_err().is_eof());

    let mut r = BinaryReader::new(&[1u8, 2, 3][..], Endian::Big);
    assert!(r.read_bytes(4).unwrap_err().is_eof());

    let mut r = BinaryReader::new(&[1u8, 2, 3][..], Endian::Big);
    assert!(r.skip(4).unwrap_err().is_eof());
}

#[test]
fn skip_consumes_exactly() -> Result<()> {
    let mut r = BinaryReader::new(&[1u8, 2, 3, 4, 5][..], Endian::Big);
    r.skip(3)?;
    assert_eq!(r.read_u8()?, 4);
    assert_eq!(r.position(), 4);
    Ok(())
}

#[test]
fn copy_from_reader_with_small_buffer() -> Result<()> {
    let src: Vec<u8> = (0..100).collect();
    let mut w = BinaryWriter::new(Vec::new(), Endian::Big);
    let mut buf = [0u8; 7];
    w.write_from_reader(&mut Cursor::new(&src), 100, Some(&mut buf))?;
    assert_eq!(w.into_inner(), src);
    Ok(())
}

#[test]
fn copy_from_reader_errors() {
    let mut w = BinaryWriter::new(Vec::new(), Endian::Big);
    let mut empty: [u8; 0] = [];
    let err = w
        .write_from_reader(&mut Cursor::new(vec![1, 2]), 2, Some(&mut empty))
        .unwrap_err();
    assert!(err.is_precondition());

    let err = w
        .write_from_reader(&mut Cursor::new(vec![1, 2]), 3, None)
        .unwrap_err();
    assert!(err.is_eof());
}

#[test]
fn counting_reader_counts() -> Result<()> {
    let mut r = BinaryReader::new(CountingReader::new(&[0u8; 16][..]), Endian::Big);
    r.read_i64()?;
    r.skip(4)?;
    assert_eq!(r.get_ref().count(), 12);
    Ok(())
}
