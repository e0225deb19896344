use std::io::Cursor;

use tempfile::tempdir;

use super::builder::{sample, Builder};
use crate::codec::Endian;
use crate::compression::Compression;
use crate::error::Result;
use crate::{
    read_root_name, read_root_name_from, Compound, Document, List, NamedTag, Selection,
    Settings, Tag, Value,
};

const MODES: [Compression; 3] = [Compression::None, Compression::GZip, Compression::ZLib];

fn player() -> Result<Document> {
    let mut doc = Document::new("");
    doc.root_mut().insert("health", Value::Short(20))?;

    let mut items = List::new();
    for id in 1..=2 {
        let mut item = Compound::new();
        item.insert("id", id)?;
        items.push(item)?;
    }
    doc.root_mut().insert("items", items)?;
    Ok(doc)
}

fn everything() -> Result<Document> {
    let mut doc = Document::new("everything");
    let root = doc.root_mut();
    root.insert("byte", 1i8)?;
    root.insert("short", 2i16)?;
    root.insert("int", 3i32)?;
    root.insert("long", 4i64)?;
    root.insert("float", 5.5f32)?;
    root.insert("double", 6.25f64)?;
    root.insert("string", "héllo")?;
    root.insert("bytes", vec![1u8, 2, 3])?;
    root.insert("ints", vec![-1i32, 0, 1])?;
    root.insert("empty", List::new())?;
    root.insert("typed empty", List::with_kind(Tag::Double)?)?;
    let mut nested = Compound::new();
    nested.insert("deep", Compound::new())?;
    root.insert("nested", nested)?;
    Ok(doc)
}

#[test]
fn player_scenario_zlib() -> Result<()> {
    let bytes = player()?.to_bytes(Compression::ZLib)?;
    assert_eq!(bytes[0], 0x78);

    let loaded = Document::load(Cursor::new(&bytes), &Settings::default())?;
    assert_eq!(loaded.compression, Compression::ZLib);
    assert_eq!(loaded.bytes_read, bytes.len() as u64);

    let root = loaded.document.root();
    assert_eq!(root.get_short("health")?, Some(20));
    let items = root.get_list("items")?.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items.get(1)?.as_compound()?.get_int("id")?, Some(2));
    Ok(())
}

#[test]
fn round_trip_every_mode() -> Result<()> {
    let doc = everything()?;
    for mode in MODES {
        let bytes = doc.to_bytes(mode)?;
        let back = Document::from_bytes(&bytes)?;
        assert_eq!(back, doc, "{:?}", mode);
        assert_eq!(back.name(), "everything");

        let names: Vec<&str> = back.root().names().collect();
        let expected: Vec<&str> = doc.root().names().collect();
        assert_eq!(names, expected);
    }
    Ok(())
}

#[test]
fn untyped_empty_list_stays_untyped() -> Result<()> {
    let bytes = everything()?.to_bytes(Compression::None)?;
    let back = Document::from_bytes(&bytes)?;
    assert_eq!(back.root().get_list("empty")?.unwrap().kind(), None);
    assert_eq!(
        back.root().get_list("typed empty")?.unwrap().kind(),
        Some(Tag::Double)
    );
    Ok(())
}

#[test]
fn uncompressed_bytes_match_builder() -> Result<()> {
    let expected = Builder::new()
        .start_compound("")
        .short("health", 20)
        .start_list("items", Tag::Compound, 2)
        .start_anon_compound()
        .int("id", 1)
        .end_compound()
        .start_anon_compound()
        .int("id", 2)
        .end_compound()
        .end_compound()
        .build();
    assert_eq!(player()?.to_bytes(Compression::None)?, expected);
    Ok(())
}

#[test]
fn duplicate_names_in_data_are_rejected() {
    let bytes = Builder::new()
        .start_compound("")
        .int("a", 1)
        .int("a", 2)
        .end_compound()
        .build();
    assert!(Document::from_bytes(&bytes).unwrap_err().is_format());
}

#[test]
fn truncated_data_is_eof() {
    let mut bytes = sample();
    bytes.truncate(bytes.len() - 3);
    assert!(Document::from_bytes(&bytes).unwrap_err().is_eof());
}

#[test]
fn load_stream_needs_a_known_compression() -> Result<()> {
    let bytes = player()?.to_bytes(Compression::GZip)?;
    let loaded = Document::load_stream(bytes.as_slice(), Compression::GZip, &Settings::default())?;
    assert_eq!(loaded.document, player()?);

    let err = Document::load_stream(bytes.as_slice(), Compression::AutoDetect, &Settings::default())
        .unwrap_err();
    assert!(err.is_precondition());
    Ok(())
}

#[test]
fn selector_skips_whole_subtrees() -> Result<()> {
    let bytes = sample();
    let mut seen = vec![];
    let mut select = |s: &Selection<'_>| {
        seen.push((s.tag, s.name.map(str::to_owned), s.depth));
        s.name != Some("list") && s.name != Some("ints")
    };
    let loaded = Document::load_with_selector(
        Cursor::new(&bytes),
        &Settings::default(),
        Some(&mut select),
    )?;
    let root = loaded.document.root();

    assert!(!root.contains("list"));
    assert!(!root.get_compound("nested")?.unwrap().contains("ints"));
    assert_eq!(
        root.get_compound("nested")?.unwrap().get_str("name")?,
        Some("inner")
    );
    assert_eq!(root.get_byte_array("bytes")?, Some(&[0, 1, 2, 3, 4][..]));
    assert_eq!(root.get_double("last")?, Some(3.5));

    // Nothing inside a skipped list is offered.
    assert!(!seen.iter().any(|(_, n, _)| n.as_deref() == Some("id")));
    assert!(seen.contains(&(Tag::Byte, Some("byte".to_owned()), 1)));
    assert!(seen.contains(&(Tag::String, Some("name".to_owned()), 2)));
    assert!(seen.contains(&(Tag::Short, None, 2)));
    Ok(())
}

#[test]
fn selector_on_list_elements() -> Result<()> {
    let bytes = sample();
    let mut first_only = {
        let mut n = 0;
        move |s: &Selection<'_>| {
            if s.tag == Tag::Short && s.name.is_none() {
                n += 1;
                return n == 1;
            }
            true
        }
    };
    let loaded = Document::load_with_selector(
        Cursor::new(&bytes),
        &Settings::default(),
        Some(&mut first_only),
    )?;
    let shorts = loaded.document.root().get_list("shorts")?.unwrap();
    assert_eq!(shorts.len(), 1);
    assert_eq!(shorts.get(0)?, &Value::Short(10));
    Ok(())
}

#[test]
fn from_tag_checks_root() -> Result<()> {
    assert!(Document::from_tag(NamedTag::new("x", 1)).is_err());
    assert!(Document::from_tag(NamedTag::unnamed(Compound::new())).is_err());

    let doc = Document::from_tag(NamedTag::new("x", Compound::new()))?;
    assert_eq!(doc.name(), "x");
    assert_eq!(NamedTag::from(doc), NamedTag::new("x", Compound::new()));
    Ok(())
}

#[test]
fn little_endian_documents() -> Result<()> {
    let doc = everything()?;
    let settings = Settings::default().with_endian(Endian::Little);
    let mut bytes = vec![];
    doc.write_to(&mut bytes, Compression::None, &settings)?;

    let loaded = Document::load(Cursor::new(&bytes), &settings)?;
    assert_eq!(loaded.document, doc);
    assert!(Document::load(Cursor::new(&bytes), &Settings::default()).is_err());
    Ok(())
}

#[test]
fn write_to_reports_transport_bytes() -> Result<()> {
    let doc = player()?;
    for mode in MODES {
        let mut bytes = vec![];
        let written = doc.write_to(&mut bytes, mode, &Settings::default())?;
        assert_eq!(written, bytes.len() as u64);
    }
    assert!(doc
        .to_bytes(Compression::AutoDetect)
        .unwrap_err()
        .is_precondition());
    Ok(())
}

#[test]
fn files() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("player.dat");
    let doc = player()?;

    for mode in MODES {
        let written = doc.save_to_file(&path, mode)?;
        assert_eq!(written, std::fs::metadata(&path)?.len());

        let loaded = Document::load_file(&path, &Settings::default())?;
        assert_eq!(loaded.compression, mode);
        assert_eq!(loaded.document, doc);
        assert_eq!(read_root_name(&path)?, "");
    }

    // A bad save leaves the file alone.
    assert!(doc.save_to_file(&path, Compression::AutoDetect).is_err());
    assert_eq!(Document::from_file(&path)?, doc);
    Ok(())
}

#[test]
fn save_uses_settings_compression() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("level.dat");
    let settings = Settings::default().with_compression(Compression::GZip);
    player()?.save_with_settings(&path, &settings)?;
    assert_eq!(std::fs::read(&path)?[0], 0x1f);
    Ok(())
}

#[test]
fn root_name_only() -> Result<()> {
    let mut doc = player()?;
    doc.set_name("Level");
    let bytes = doc.to_bytes(Compression::GZip)?;
    assert_eq!(read_root_name_from(Cursor::new(bytes))?, "Level");

    assert!(read_root_name_from(Cursor::new(vec![0x0a, 0, 5, b'a'])).is_err());
    Ok(())
}

#[test]
fn display_and_json() -> Result<()> {
    let doc = player()?;
    let text = doc.to_string();
    assert!(text.starts_with("TAG_Compound(\"\"): 2 entries {\n"));
    assert!(text.contains("  TAG_Short(\"health\"): 20\n"));
    assert!(text.contains("      TAG_Int(\"id\"): 2\n"));
    assert!(text.ends_with('}'));

    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "name": "",
            "root": {"health": 20, "items": [{"id": 1}, {"id": 2}]}
        })
    );
    Ok(())
}

#[test]
fn settings_from_json() {
    let settings: Settings =
        serde_json::from_str(r#"{"endian": "Little", "compression": "GZip"}"#).unwrap();
    assert_eq!(settings.endian, Endian::Little);
    assert_eq!(settings.compression, Compression::GZip);
    assert!(settings.skip_end_tags);
    assert_eq!(settings.buffer_size, 8192);

    let back: Settings = serde_json::from_str(&serde_json::to_string(&settings).unwrap()).unwrap();
    assert_eq!(back, settings);
    assert_eq!(Settings::default().with_buffer_size(0).buffer_size, 1);
}
