use std::fs::File;
use std::io::BufReader;

use clap::{App, Arg};
use env_logger::Env;
use log::info;
use nbtio::compression::{self, Compression};
use nbtio::stream::Parser;
use nbtio::{Document, Settings, Value};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// The parser only hands out values for scalars and arrays.
fn payload(value: &Value) -> String {
    match value {
        Value::Byte(v) => v.to_string(),
        Value::Short(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Long(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::String(v) => format!("{:?}", v),
        Value::ByteArray(v) => format!("[{} bytes]", v.len()),
        Value::IntArray(v) => format!("[{} ints]", v.len()),
        Value::List(v) => format!("{} entries", v.len()),
        Value::Compound(v) => format!("{} entries", v.len()),
    }
}

/// Prints every tag as the parser meets it, without loading the tree.
fn dump_stream(path: &str) -> Result<()> {
    let file = BufReader::new(File::open(path)?);
    let decoder = compression::open(file, Compression::AutoDetect)?;
    let mut parser = Parser::new(decoder);

    while parser.read_to_following()? {
        let indent = (parser.depth() - 1) * 2;
        let tag = parser.tag().map(|t| t.display_name()).unwrap_or_default();
        match parser.name() {
            Some(name) => print!("{:indent$}{}({:?})", "", tag, name, indent = indent),
            None => print!("{:indent$}{}", "", tag, indent = indent),
        }
        if parser.has_value() {
            print!(": {}", payload(&parser.read_value()?));
        } else if parser.is_list() {
            print!(": {} entries", parser.tag_len());
        }
        println!();
    }
    info!("{} tags read", parser.tags_read());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new("nbt-dump")
        .about("print the contents of an NBT file")
        .arg(Arg::with_name("file").required(true).index(1))
        .arg(
            Arg::with_name("stream")
                .long("stream")
                .help("walk the file with the streaming parser"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .conflicts_with("stream")
                .help("print the tree as JSON"),
        )
        .get_matches();

    let path = matches.value_of("file").ok_or("no file given")?;
    if matches.is_present("stream") {
        return dump_stream(path);
    }

    let loaded = Document::load_file(path, &Settings::default())?;
    info!(
        "{:?} compression, {} bytes read",
        loaded.compression, loaded.bytes_read
    );
    if matches.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&loaded.document)?);
    } else {
        println!("{}", loaded.document);
    }
    Ok(())
}
