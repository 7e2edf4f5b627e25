#[cfg(debug_assertions)]
fn main() {}
#[cfg(not(debug_assertions))]
#[allow(clippy::unit_arg)]
fn main() {
  use json_tree_traits::ToJson;

  // Generate a array which will be ~64 MB once serialized
  let array = vec![(); 64 * 1024 * 1024 / 5];

  {
    let start = std::time::Instant::now();
    let mut serialization = vec![];
    serde_json::to_writer(&mut serialization, &array).unwrap();
    let _ = core::hint::black_box(serialization);
    println!("serde_json took {}ms to serialize a 64 MB null array", start.elapsed().as_millis());
  }

  let tree = array.to_json();
  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(tree.to_bytes().unwrap());
    println!("json-tree took {}ms to serialize a 64 MB null array", start.elapsed().as_millis());
  }
  drop(tree);

  let serialization = serde_json::to_string(&array).unwrap();

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(
      serde_json::from_reader::<&[u8], serde_json::Value>(serialization.as_bytes()).unwrap(),
    );
    println!("serde_json took {}ms to deserialize a 64 MB null array", start.elapsed().as_millis());
  }

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(json_tree::parse(&serialization).unwrap());
    println!("json-tree took {}ms to deserialize a 64 MB null array", start.elapsed().as_millis());
  }

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(json_tree::parse_reader(serialization.as_bytes()).unwrap());
    println!(
      "json-tree took {}ms to deserialize a 64 MB null array from a reader",
      start.elapsed().as_millis()
    );
  }
}
