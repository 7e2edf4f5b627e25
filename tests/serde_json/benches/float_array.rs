#[cfg(not(debug_assertions))]
use rand_core::{RngCore, OsRng};

#[cfg(debug_assertions)]
fn main() {}
#[cfg(not(debug_assertions))]
fn main() {
  use json_tree_traits::{FromJson, ToJson};

  // Generate a 64 MB array
  let mut array = vec![0f64; 64 * 1024 * 1024 / 8];
  for e in &mut array {
    *e = loop {
      if let Some(float) = serde_json::Number::from_f64(f64::from_bits(OsRng.next_u64())) {
        break float.as_f64().unwrap();
      }
    };
  }

  {
    let start = std::time::Instant::now();
    let mut serialization = vec![];
    serde_json::to_writer(&mut serialization, &array).unwrap();
    let _ = core::hint::black_box(serialization);
    println!("serde_json took {}ms to serialize a 64 MB f64 array", start.elapsed().as_millis());
  }

  {
    let tree = array.to_json();
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(tree.to_bytes().unwrap());
    println!("json-tree took {}ms to serialize a 64 MB f64 array", start.elapsed().as_millis());
  }

  let serialization = serde_json::to_string(&array).unwrap();

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(
      serde_json::from_reader::<&[u8], serde_json::Value>(serialization.as_bytes()).unwrap(),
    );
    println!("serde_json took {}ms to deserialize a 64 MB f64 array", start.elapsed().as_millis());
  }

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(json_tree::parse(&serialization).unwrap());
    println!("json-tree took {}ms to deserialize a 64 MB f64 array", start.elapsed().as_millis());
  }

  {
    let start = std::time::Instant::now();
    for value in serde_json::from_reader::<&[u8], Vec<f64>>(serialization.as_bytes()).unwrap() {
      let _ = core::hint::black_box(value);
    }
    println!(
      "serde_json took {}ms to deserialize and statically-typed read a 64 MB f64 array",
      start.elapsed().as_millis()
    );
  }

  {
    let start = std::time::Instant::now();
    for value in Vec::<f64>::from_json_str(&serialization).unwrap() {
      let _ = core::hint::black_box(value);
    }
    println!(
      "json-tree-traits took {}ms to deserialize and statically-typed read a 64 MB f64 array",
      start.elapsed().as_millis()
    );
  }
}
