#[cfg(debug_assertions)]
fn main() {}
#[cfg(not(debug_assertions))]
fn main() {
  use std::io::Read;
  use json_tree::{ParserConfig, TempFileProvider};

  // Generate a 256 MB string inside an array
  let string = [String::from_utf8(vec![b'A'; 256 * 1024 * 1024]).unwrap()];

  {
    let start = std::time::Instant::now();
    let mut serialization = vec![];
    serde_json::to_writer(&mut serialization, &string).unwrap();
    let _ = core::hint::black_box(serialization);
    println!(
      "serde_json took {}ms to serialize a 256 MB ASCII string",
      start.elapsed().as_millis()
    );
  }

  let serialization = "[\"".to_string() + &string[0] + "\"]";
  drop(string);

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(
      serde_json::from_reader::<&[u8], serde_json::Value>(serialization.as_bytes()).unwrap(),
    );
    println!(
      "serde_json took {}ms to deserialize a 256 MB ASCII string",
      start.elapsed().as_millis()
    );
  }

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(json_tree::parse(&serialization).unwrap());
    println!(
      "json-tree took {}ms to deserialize a 256 MB ASCII string",
      start.elapsed().as_millis()
    );
  }

  let dir = tempfile::tempdir().unwrap();
  let config = ParserConfig::default().with_spill(TempFileProvider::in_dir(dir.path()));
  let spilled = {
    let start = std::time::Instant::now();
    let spilled = json_tree::parse_with(&serialization, &config).unwrap();
    println!(
      "json-tree took {}ms to deserialize a 256 MB ASCII string, spilling it to a file",
      start.elapsed().as_millis()
    );
    spilled
  };

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(spilled.to_bytes().unwrap());
    println!(
      "json-tree took {}ms to serialize a spilled 256 MB ASCII string",
      start.elapsed().as_millis()
    );
  }

  {
    let start = std::time::Instant::now();
    let mut streamed = vec![];
    spilled.stream(false, true).unwrap().read_to_end(&mut streamed).unwrap();
    let _ = core::hint::black_box(streamed);
    println!(
      "json-tree took {}ms to stream a spilled 256 MB ASCII string from a worker thread",
      start.elapsed().as_millis()
    );
  }

  spilled.dispose().unwrap();
}
