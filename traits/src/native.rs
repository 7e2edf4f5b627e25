use crate::{
  Array, Binary, FromJson, JsonError, JsonString, Number, Object, ToJson, Value,
  indexmap::IndexMap, wrong_type,
};

/// A plain-data rendering of a tree.
///
/// `null` has no variant of its own and is instead the absence of a `Native`, as with the
/// `Option<Native>` held by lists and maps.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Native {
  /// A boolean.
  Bool(bool),
  /// A number.
  Number(Number),
  /// A string, left spilled if it was.
  String(JsonString),
  /// A blob.
  Binary(Binary),
  /// An array.
  List(Vec<Option<Native>>),
  /// An object, in the order of its entries.
  Map(IndexMap<String, Option<Native>>),
}

/// Convert a tree to plain data.
///
/// This never fails, with `null` becoming `None`. `to_json` is its inverse.
#[must_use]
pub fn to_native(value: &Value) -> Option<Native> {
  Some(match value {
    Value::Null => None?,
    Value::Bool(bool) => Native::Bool(*bool),
    Value::Number(number) => Native::Number(number.clone()),
    Value::String(string) => Native::String(string.clone()),
    Value::Binary(binary) => Native::Binary(binary.clone()),
    Value::Array(array) => Native::List(array.iter().map(to_native).collect()),
    Value::Object(object) => {
      Native::Map(object.iter().map(|(key, value)| (key.clone(), to_native(value))).collect())
    }
  })
}

impl ToJson for Native {
  fn to_json(&self) -> Value {
    match self {
      Native::Bool(bool) => Value::Bool(*bool),
      Native::Number(number) => Value::Number(number.clone()),
      Native::String(string) => Value::String(string.clone()),
      Native::Binary(binary) => Value::Binary(binary.clone()),
      Native::List(list) => Value::Array(list.iter().map(ToJson::to_json).collect::<Array>()),
      Native::Map(map) => Value::Object(
        map.iter().map(|(key, value)| (key.as_str(), value.to_json())).collect::<Object>(),
      ),
    }
  }
}

impl FromJson for Native {
  /// `null` isn't representable as a `Native`. Read an `Option<Native>` to accept it.
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    to_native(value).ok_or_else(|| wrong_type("non-null value", value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ParserConfig, TempFileProvider, parse_with};

  #[test]
  fn shape() {
    let value = crate::parse(r#"{"z": [1, null, true], "a": {"b": "c"}, "n": null}"#).unwrap();
    let Some(Native::Map(map)) = to_native(&value) else { panic!("object wasn't a map") };
    assert_eq!(map.keys().collect::<Vec<_>>(), ["z", "a", "n"]);
    assert_eq!(
      map["z"],
      Some(Native::List(vec![
        Some(Native::Number(Number::from(1))),
        None,
        Some(Native::Bool(true)),
      ]))
    );
    assert_eq!(map["n"], None);
    assert_eq!(to_native(&Value::Null), None);
    assert!(Native::from_json(&Value::Null).is_err());
    assert_eq!(Option::<Native>::from_json(&Value::Null).unwrap(), None);
  }

  #[test]
  fn left_inverse() {
    let documents = [
      "[]",
      "{}",
      r#"[null, false, -0.5, 123456789012345678901234567890, " ", {"": []}]"#,
      r#"{"b": 1, "a": {"x": [null, {"y": null}]}}"#,
    ];
    for document in documents {
      let value = crate::parse(document).unwrap();
      assert_eq!(to_native(&value).to_json(), value, "{document}");
    }
    let blob = Value::Binary(Binary::from(&[0u8, 1, 2][..]));
    assert_eq!(to_native(&blob).to_json(), blob);
  }

  #[test]
  fn natives_survive_trees() {
    let big = "-123456789012345678901234567890".parse::<crate::BigInt>().unwrap();
    let nested = Native::Map(
      [
        ("big".to_owned(), Some(Native::Number(Number::from(big)))),
        ("bytes".to_owned(), Some(Native::Binary(Binary::from(&[0xffu8, 0, 7][..])))),
        ("none".to_owned(), None),
        (
          "list".to_owned(),
          Some(Native::List(vec![
            None,
            Some(Native::Bool(false)),
            Some(Native::Number(Number::from(0.25))),
            Some(Native::List(vec![])),
            Some(Native::Map(IndexMap::new())),
          ])),
        ),
        (
          "map".to_owned(),
          Some(Native::Map(
            [("text".to_owned(), Some(Native::String(JsonString::from("é \u{2028}"))))]
              .into_iter()
              .collect(),
          )),
        ),
      ]
      .into_iter()
      .collect(),
    );
    let natives = [
      nested,
      Native::Bool(true),
      Native::Number(Number::from(i64::MIN)),
      Native::String(JsonString::from("")),
      Native::Binary(Binary::from(Vec::<u8>::new())),
      Native::List(vec![None, None]),
    ];
    for native in natives {
      assert_eq!(to_native(&native.to_json()), Some(native.clone()));
      assert_eq!(Native::from_json(&native.to_json()).unwrap(), native);
    }
    assert_eq!(to_native(&None::<Native>.to_json()), None);
  }

  #[test]
  fn spilled_strings_stay_spilled() {
    let config =
      ParserConfig::default().with_spill(TempFileProvider::new()).with_spill_threshold(4);
    let value = parse_with(r#"["long string", "ok"]"#, &config).unwrap();
    let Some(Native::List(list)) = to_native(&value) else { panic!("array wasn't a list") };
    let Some(Native::String(long)) = &list[0] else { panic!("string wasn't a string") };
    assert!(long.is_spilled());
    let Some(Native::String(short)) = &list[1] else { panic!("string wasn't a string") };
    assert!(!short.is_spilled());
    assert_eq!(to_native(&value).to_json(), value);
  }
}
