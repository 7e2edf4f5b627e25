use crate::{Array, Binary, FromJson, JsonError, Object, ToJson, Value, wrong_type};

impl ToJson for Value {
  fn to_json(&self) -> Value {
    self.clone()
  }
}
impl FromJson for Value {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    Ok(value.clone())
  }
}

impl ToJson for Array {
  fn to_json(&self) -> Value {
    Value::Array(self.clone())
  }
}
impl FromJson for Array {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    value.as_array().cloned().ok_or_else(|| wrong_type("array", value))
  }
}

impl ToJson for Object {
  fn to_json(&self) -> Value {
    Value::Object(self.clone())
  }
}
impl FromJson for Object {
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    value.as_object().cloned().ok_or_else(|| wrong_type("object", value))
  }
}

impl ToJson for Binary {
  fn to_json(&self) -> Value {
    Value::Binary(self.clone())
  }
}
impl FromJson for Binary {
  /// Blobs are only read from blobs, as strings aren't decoded from base64.
  fn from_json(value: &Value) -> Result<Self, JsonError> {
    value.as_binary().cloned().ok_or_else(|| wrong_type("binary", value))
  }
}

#[test]
fn trees() {
  use crate::Container;

  let value = crate::parse("{a: [1, {}]}").unwrap();
  assert_eq!(Value::from_json(&value).unwrap(), value);
  let object = Object::from_json(&value).unwrap();
  assert_eq!(object.to_json(), value);
  assert!(Array::from_json(&value).is_err());
  let array = Array::from_json(object.opt("a").unwrap()).unwrap();
  assert_eq!(array.len(), 2);

  let blob = Binary::from(&b"blob"[..]);
  assert_eq!(Binary::from_json(&blob.to_json()).unwrap(), blob);
  assert!(Binary::from_json(&Value::from("YmxvYg==")).is_err());
}
