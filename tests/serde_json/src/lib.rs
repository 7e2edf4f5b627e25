use serde_json::Value;

/*
  Differential checks between `json-tree` and `serde_json`. Each value within the
  `serde_json::Value` is compared against the value at the same path within the tree, with
  objects compared by key as `serde_json` doesn't preserve the order of their entries.
*/

pub fn check_float(number: f64, expected: f64) {
  // 0.1% of the smaller number
  let allowed_deviation = number.min(expected).abs() / 1000.0;
  assert!((number - expected).abs() <= allowed_deviation, "{number} != {expected}");
}

fn check_number(number: &json_tree::Number, expected: &serde_json::Number) {
  if expected.is_i64() || expected.is_u64() {
    // Integers are kept exactly, including those past the range of an `i64`
    assert_eq!(number.to_string(), expected.to_string());
  } else {
    check_float(number.as_f64(), expected.as_f64().unwrap());
  }
}

/// Check a tree holds the same values, at the same paths, as a `serde_json::Value`.
pub fn check_value(tree: &json_tree::Value, value: &Value) {
  match value {
    Value::Null => assert!(tree.is_null()),
    Value::Bool(bool) => assert_eq!(tree.as_bool(), Some(*bool)),
    Value::Number(number) => check_number(tree.as_number().unwrap(), number),
    Value::String(string) => assert_eq!(tree.to_str().unwrap(), string.as_str()),
    Value::Array(array) => {
      let tree = tree.as_array().unwrap();
      assert_eq!(json_tree::Container::len(tree), array.len());
      for (tree, value) in tree.iter().zip(array) {
        check_value(tree, value);
      }
    }
    Value::Object(object) => {
      let tree = tree.as_object().unwrap();
      assert_eq!(json_tree::Container::len(tree), object.len());
      for (key, value) in object {
        check_value(json_tree::Container::get(tree, key.as_str()).unwrap(), value);
      }
    }
  }
}

/// Check two `serde_json::Value`s are equivalent, allowing floats to deviate.
pub fn check_values_equivalent(a: &Value, b: &Value) {
  match a {
    Value::Null | Value::Bool(_) | Value::String(_) => assert_eq!(a, b),
    Value::Number(number) => {
      check_float(number.as_f64().unwrap(), b.as_number().unwrap().as_f64().unwrap());
    }
    Value::Array(array) => {
      let b = b.as_array().unwrap();
      assert_eq!(array.len(), b.len());
      for (a, b) in array.iter().zip(b) {
        check_values_equivalent(a, b);
      }
    }
    Value::Object(object) => {
      let b = b.as_object().unwrap();
      assert_eq!(object.len(), b.len());
      for (key, value) in object {
        check_values_equivalent(value, &b[key]);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{io::Read, str::FromStr};
  use rand_core::{RngCore, OsRng};
  use json_tree::{ParserConfig, TempFileProvider, WriterConfig};
  use super::*;

  #[allow(clippy::cast_possible_truncation)]
  fn random_string() -> String {
    let mut res = String::new();
    for _ in 0 .. (OsRng.next_u64() % 128) {
      if (OsRng.next_u64() % 2) == 1 {
        // ASCII
        res.push(char::from_u32((OsRng.next_u64() % 128) as u32).unwrap());
      } else {
        // Unicode
        res.push(loop {
          if let Some(char) = char::from_u32(OsRng.next_u64() as u32) {
            // Skip ASCII as those are intended to be included by the other branch
            if char.is_ascii() {
              continue;
            }
            break char;
          }
        });
      }
    }
    res
  }

  // Each level multiplies the expected size of a tree, so this is kept shallow
  const MAX_RANDOM_DEPTH: usize = 5;

  fn random_value(depth: usize) -> Value {
    let modulus = if depth == MAX_RANDOM_DEPTH { 4 } else { 6 };
    match OsRng.next_u64() % modulus {
      0 => Value::Null,
      1 => Value::Bool((OsRng.next_u64() % 2) == 1),
      2 => Value::Number(match OsRng.next_u64() % 3 {
        0 => serde_json::Number::from(OsRng.next_u64()),
        #[allow(clippy::cast_possible_wrap)]
        1 => serde_json::Number::from(OsRng.next_u64() as i64),
        2 => loop {
          if let Some(float) = serde_json::Number::from_f64(f64::from_bits(OsRng.next_u64())) {
            break float;
          }
        },
        _ => unreachable!(),
      }),
      3 => Value::String(random_string()),
      4 => Value::Array({
        let mut res = vec![];
        for _ in 0 .. (OsRng.next_u64() % 8) {
          res.push(random_value(depth + 1));
        }
        res
      }),
      5 => Value::Object({
        let mut res = serde_json::Map::new();
        for _ in 0 .. (OsRng.next_u64() % 8) {
          res.insert(random_string(), random_value(depth + 1));
        }
        res
      }),
      _ => unreachable!(),
    }
  }

  fn random_root() -> Value {
    loop {
      let value = random_value(0);
      if matches!(value, Value::Object(_) | Value::Array(_)) {
        break value;
      }
    }
  }

  #[test]
  fn fuzz() {
    let strict = ParserConfig::default().strict();
    for _ in 0 .. 48 {
      let value = random_root();
      let encoding = value.to_string();

      let tree = json_tree::parse_with(&encoding, &strict).unwrap();
      check_value(&tree, &value);
      assert_eq!(json_tree::parse(&encoding).unwrap(), tree);

      let configs = [
        WriterConfig::compact(),
        WriterConfig::pretty(2),
        WriterConfig::compact().ascii_only(true),
      ];
      for config in configs {
        let mut serialization = vec![];
        tree.write_with(&mut serialization, config).unwrap();
        if config.ascii_only {
          assert!(serialization.is_ascii());
        }
        let reparsed =
          serde_json::Value::from_str(std::str::from_utf8(&serialization).unwrap()).unwrap();
        check_values_equivalent(&value, &reparsed);
        assert_eq!(json_tree::parse_with(&serialization, &strict).unwrap(), tree);
      }
    }
  }

  #[test]
  fn fuzz_spilled() {
    let dir = tempfile::tempdir().unwrap();
    let config = ParserConfig::default()
      .with_spill(TempFileProvider::in_dir(dir.path()))
      .with_spill_threshold(16);
    for _ in 0 .. 12 {
      let value = random_root();
      let encoding = value.to_string();

      let tree = json_tree::parse_with(&encoding, &config).unwrap();
      check_value(&tree, &value);

      let reparsed = serde_json::Value::from_str(&tree.to_json_string().unwrap()).unwrap();
      check_values_equivalent(&value, &reparsed);

      tree.dispose().unwrap();
      assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0, "spill files weren't deleted");
    }
  }

  #[test]
  fn fuzz_streamed() {
    for _ in 0 .. 12 {
      let value = random_root();
      let tree = json_tree::parse(value.to_string()).unwrap();

      let mut piped = vec![];
      tree.stream(false, true).unwrap().read_to_end(&mut piped).unwrap();
      assert_eq!(piped, tree.to_bytes().unwrap());
      check_values_equivalent(&value, &serde_json::from_slice(&piped).unwrap());
    }
  }
}
