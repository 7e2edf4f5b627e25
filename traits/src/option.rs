use crate::{FromJson, JsonError, ToJson, Value};

impl<T: ToJson> ToJson for Option<T> {
  /// This will convert `Some(value)` as `value` and `None` as `null`.
  fn to_json(&self) -> Value {
    self.as_ref().map_or(Value::Null, ToJson::to_json)
  }
}

impl<T: FromJson> FromJson for Option<T> {
  /// This will accept `null` as a representation of `None`.
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    if value.is_null() {
      return Ok(None);
    }
    T::from_json(value).map(Some)
  }
}

impl ToJson for () {
  fn to_json(&self) -> Value {
    Value::Null
  }
}

#[test]
fn options() {
  assert_eq!(Some(1).to_json(), Value::from(1));
  assert_eq!(None::<i32>.to_json(), Value::Null);
  assert_eq!(().to_json(), Value::Null);
  assert_eq!(Option::<u8>::from_json(&Value::Null).unwrap(), None);
  assert_eq!(Option::<u8>::from_json(&Value::from(3)).unwrap(), Some(3));
  assert!(Option::<u8>::from_json(&Value::from(true)).is_err());
}
