use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::{FromJson, JsonError, ToJson, Value, conversion, indexmap::IndexSet};

fn to_array<'a, T: 'a + ToJson>(iter: impl IntoIterator<Item = &'a T>) -> Value {
  Value::Array(iter.into_iter().map(ToJson::to_json).collect())
}

/// Convert each value within an array, attributing errors to their index.
fn from_array<T: FromJson>(
  value: &Value,
) -> Result<impl Iterator<Item = Result<T, JsonError>>, JsonError> {
  let array = value.as_array().ok_or_else(|| crate::wrong_type("array", value))?;
  Ok(array.iter().enumerate().map(|(i, item)| T::from_json(item).map_err(|e| e.at(i))))
}

impl<T: ToJson> ToJson for [T] {
  fn to_json(&self) -> Value {
    to_array(self)
  }
}
impl<T: ToJson, const N: usize> ToJson for [T; N] {
  fn to_json(&self) -> Value {
    to_array(self)
  }
}
impl<T: ToJson> ToJson for Vec<T> {
  fn to_json(&self) -> Value {
    to_array(self)
  }
}
impl<T: ToJson> ToJson for VecDeque<T> {
  fn to_json(&self) -> Value {
    to_array(self)
  }
}
impl<T: ToJson> ToJson for BTreeSet<T> {
  fn to_json(&self) -> Value {
    to_array(self)
  }
}
impl<T: ToJson, S> ToJson for HashSet<T, S> {
  /// The order of the array is the set's iteration order.
  fn to_json(&self) -> Value {
    to_array(self)
  }
}
impl<T: ToJson, S> ToJson for IndexSet<T, S> {
  fn to_json(&self) -> Value {
    to_array(self)
  }
}

impl<T: FromJson> FromJson for Vec<T> {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    from_array(value)?.collect()
  }
}
impl<T: FromJson> FromJson for VecDeque<T> {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    from_array(value)?.collect()
  }
}
impl<T: FromJson, const N: usize> FromJson for [T; N] {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    let items = Vec::<T>::from_json(value)?;
    let len = items.len();
    items
      .try_into()
      .map_err(|_| conversion(format!("an array of {len} values"), "fixed-size array"))
  }
}

#[test]
fn sequences() {
  assert_eq!(Vec::<u8>::new().to_json().to_json_string().unwrap(), "[]");
  assert_eq!([1u8, 2, 3].to_json().to_json_string().unwrap(), "[1,2,3]");
  assert_eq!(VecDeque::from([true]).to_json(), vec![true].to_json());
  assert_eq!(BTreeSet::from(["b", "a"]).to_json().to_json_string().unwrap(), r#"["a","b"]"#);
  assert_eq!(IndexSet::from(["b", "a"]).to_json().to_json_string().unwrap(), r#"["b","a"]"#);
  assert_eq!(HashSet::from([5]).to_json(), [5].to_json());

  let value = crate::parse("[1, '2', 3.5]").unwrap();
  assert_eq!(Vec::<i32>::from_json(&value).unwrap(), [1, 2, 3]);
  assert_eq!(<[u64; 3]>::from_json(&value).unwrap(), [1, 2, 3]);
  assert!(matches!(<[u64; 2]>::from_json(&value), Err(JsonError::Conversion(_))));
  assert!(Vec::<u8>::from_json(&Value::from("[1]")).is_err());

  let error = Vec::<bool>::from_json(&crate::parse("[true, 1]").unwrap()).unwrap_err();
  assert!(matches!(
    error,
    JsonError::Access(crate::AccessError { key: crate::Key::Index(1), .. })
  ));
}
