use std::{
  collections::{BTreeMap, HashMap},
  hash::BuildHasher,
};

use crate::{FromJson, JsonError, ToJson, Value, indexmap::IndexMap};

fn to_object<'a, K: 'a + AsRef<str>, T: 'a + ToJson>(
  iter: impl IntoIterator<Item = (&'a K, &'a T)>,
) -> Value {
  Value::Object(iter.into_iter().map(|(key, value)| (key.as_ref(), value.to_json())).collect())
}

/// Convert each value within an object, attributing errors to their key.
fn from_object<T: FromJson, M: FromIterator<(String, T)>>(value: &Value) -> Result<M, JsonError> {
  let object = value.as_object().ok_or_else(|| crate::wrong_type("object", value))?;
  object
    .iter()
    .map(|(key, value)| Ok((key.clone(), T::from_json(value).map_err(|e| e.at(key.as_str()))?)))
    .collect()
}

impl<K: AsRef<str>, T: ToJson> ToJson for BTreeMap<K, T> {
  fn to_json(&self) -> Value {
    to_object(self)
  }
}
impl<K: AsRef<str>, T: ToJson, S> ToJson for HashMap<K, T, S> {
  /// The order of the object is the map's iteration order.
  fn to_json(&self) -> Value {
    to_object(self)
  }
}
impl<K: AsRef<str>, T: ToJson, S> ToJson for IndexMap<K, T, S> {
  fn to_json(&self) -> Value {
    to_object(self)
  }
}

impl<T: FromJson> FromJson for BTreeMap<String, T> {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    from_object(value)
  }
}
impl<T: FromJson, S: Default + BuildHasher> FromJson for HashMap<String, T, S> {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    from_object(value)
  }
}
impl<T: FromJson, S: Default + BuildHasher> FromJson for IndexMap<String, T, S> {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    from_object(value)
  }
}

#[test]
fn btree_map() {
  assert_eq!(BTreeMap::<String, u16>::new().to_json().to_json_string().unwrap(), "{}");
  let test_map = |map: BTreeMap<String, u16>| {
    let json = map.to_json().to_json_string().unwrap();
    assert_eq!(BTreeMap::<String, u16>::from_json_str(json).unwrap(), map);
  };
  test_map(BTreeMap::from([("key1".to_string(), 1)]));
  test_map(BTreeMap::from([("key1".to_string(), 1), ("key2".to_string(), 2)]));
}

#[test]
fn hash_map() {
  assert_eq!(HashMap::<String, u16>::new().to_json().to_json_string().unwrap(), "{}");
  let test_map = |map: HashMap<String, u16>| {
    let json = map.to_json().to_json_string().unwrap();
    assert_eq!(HashMap::<String, u16>::from_json_str(json).unwrap(), map);
  };
  test_map(HashMap::from([("key1".to_string(), 1)]));
  test_map(HashMap::from([("key1".to_string(), 1), ("key2".to_string(), 2)]));
}

#[test]
fn index_map() {
  let map = IndexMap::from([("z", 1), ("a", 2)]);
  let json = map.to_json().to_json_string().unwrap();
  assert_eq!(json, r#"{"z":1,"a":2}"#);
  let read = IndexMap::<String, i32>::from_json_str(&json).unwrap();
  assert_eq!(read.keys().collect::<Vec<_>>(), ["z", "a"]);

  let error = IndexMap::<String, bool>::from_json_str(r#"{"ok": true, "bad": []}"#).unwrap_err();
  assert!(matches!(
    error,
    JsonError::Access(crate::AccessError { key: crate::Key::Field(key), .. }) if key == "bad"
  ));
}
